use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::FinTrackError;
use crate::records::instrument::Instrument;
use crate::records::store::{RecordStore, StoredRecord};
use crate::types::{OwnerId, RecordId};
use crate::FinTrackResult;

#[derive(Debug)]
struct Table<T> {
    next_id: RecordId,
    rows: BTreeMap<RecordId, StoredRecord<T>>,
}

/// Process-local store, mainly for tests and the CLI.
#[derive(Debug)]
pub struct InMemoryStore<T> {
    table: RwLock<Table<T>>,
}

impl<T> Default for InMemoryStore<T> {
    fn default() -> Self {
        InMemoryStore {
            table: RwLock::new(Table {
                next_id: 1,
                rows: BTreeMap::new(),
            }),
        }
    }
}

impl<T> InMemoryStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> FinTrackResult<RwLockReadGuard<'_, Table<T>>> {
        self.table
            .read()
            .map_err(|_| FinTrackError::Storage("record table lock poisoned".into()))
    }

    fn write(&self) -> FinTrackResult<RwLockWriteGuard<'_, Table<T>>> {
        self.table
            .write()
            .map_err(|_| FinTrackError::Storage("record table lock poisoned".into()))
    }
}

impl<T: Instrument> RecordStore<T> for InMemoryStore<T> {
    fn insert(&self, owner: &OwnerId, record: T, now: DateTime<Utc>) -> FinTrackResult<StoredRecord<T>> {
        let mut table = self.write()?;
        let id = table.next_id;
        table.next_id += 1;

        let stored = StoredRecord {
            id,
            owner: owner.clone(),
            version: 0,
            created_at: now,
            updated_at: now,
            record,
        };
        table.rows.insert(id, stored.clone());
        Ok(stored)
    }

    fn save(&self, mut record: StoredRecord<T>) -> FinTrackResult<StoredRecord<T>> {
        let mut table = self.write()?;
        let current = table
            .rows
            .get(&record.id)
            .filter(|r| r.owner == record.owner)
            .ok_or_else(|| FinTrackError::NotFound {
                kind: T::KIND.into(),
                id: record.id,
            })?;

        if current.version != record.version {
            return Err(FinTrackError::Conflict {
                kind: T::KIND.into(),
                id: record.id,
                expected: record.version,
                found: current.version,
            });
        }

        record.created_at = current.created_at;
        record.version += 1;
        table.rows.insert(record.id, record.clone());
        Ok(record)
    }

    fn find_by_id(&self, id: RecordId, owner: &OwnerId) -> FinTrackResult<Option<StoredRecord<T>>> {
        Ok(self.read()?.rows.get(&id).filter(|r| &r.owner == owner).cloned())
    }

    fn find_all_by_owner(&self, owner: &OwnerId) -> FinTrackResult<Vec<StoredRecord<T>>> {
        Ok(self
            .read()?
            .rows
            .values()
            .filter(|r| &r.owner == owner)
            .cloned()
            .collect())
    }

    fn delete_by_id_and_owner(&self, id: RecordId, owner: &OwnerId) -> FinTrackResult<bool> {
        let mut table = self.write()?;
        match table.rows.get(&id) {
            Some(row) if &row.owner == owner => {
                table.rows.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loans::emi::{recompute_loan, Loan, LoanInput};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn loan() -> Loan {
        recompute_loan(LoanInput {
            name: "Car".into(),
            principal: dec!(100000),
            annual_rate_pct: dec!(12),
            total_periods: 12,
            periods_paid: 0,
        })
        .unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_insert_assigns_sequential_ids() {
        let store = InMemoryStore::<Loan>::new();
        let owner = OwnerId::new("u1");
        let a = store.insert(&owner, loan(), now()).unwrap();
        let b = store.insert(&owner, loan(), now()).unwrap();
        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(a.version, 0);
    }

    #[test]
    fn test_save_bumps_version_and_keeps_created_at() {
        let store = InMemoryStore::<Loan>::new();
        let owner = OwnerId::new("u1");
        let mut stored = store.insert(&owner, loan(), now()).unwrap();
        stored.created_at = now() + chrono::Duration::days(1);

        let saved = store.save(stored).unwrap();
        assert_eq!(saved.version, 1);
        assert_eq!(saved.created_at, now());
    }

    #[test]
    fn test_stale_save_conflicts() {
        let store = InMemoryStore::<Loan>::new();
        let owner = OwnerId::new("u1");
        let stored = store.insert(&owner, loan(), now()).unwrap();

        store.save(stored.clone()).unwrap();
        let err = store.save(stored).unwrap_err();
        assert!(matches!(
            err,
            FinTrackError::Conflict {
                expected: 0,
                found: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_owner_scoping() {
        let store = InMemoryStore::<Loan>::new();
        let alice = OwnerId::new("alice");
        let bob = OwnerId::new("bob");
        let a = store.insert(&alice, loan(), now()).unwrap();
        store.insert(&bob, loan(), now()).unwrap();

        assert_eq!(store.find_all_by_owner(&alice).unwrap().len(), 1);
        assert!(store.find_by_id(a.id, &bob).unwrap().is_none());
        assert_eq!(store.find_by_id(a.id, &alice).unwrap().map(|r| r.id), Some(a.id));
        assert!(!store.delete_by_id_and_owner(a.id, &bob).unwrap());
        assert!(store.delete_by_id_and_owner(a.id, &alice).unwrap());
        assert!(store.find_by_id(a.id, &alice).unwrap().is_none());
    }
}
