use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::records::instrument::Instrument;
use crate::types::{OwnerId, RecordId};
use crate::FinTrackResult;

/// An instrument together with its identity and audit fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord<T> {
    pub id: RecordId,
    pub owner: OwnerId,
    /// Bumped on every successful save.
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub record: T,
}

/// Persistence seam for one instrument type.
///
/// Implementations must apply each write atomically: a reader sees either
/// the old record or the new one, never a mix.
pub trait RecordStore<T: Instrument>: Send + Sync {
    /// Assign an id and store the record at version 0.
    fn insert(&self, owner: &OwnerId, record: T, now: DateTime<Utc>) -> FinTrackResult<StoredRecord<T>>;

    /// Replace a stored record. `record.version` must equal the stored
    /// version, otherwise the save fails with `Conflict`.
    fn save(&self, record: StoredRecord<T>) -> FinTrackResult<StoredRecord<T>>;

    /// The record with `id`, if it exists and belongs to `owner`.
    fn find_by_id(&self, id: RecordId, owner: &OwnerId) -> FinTrackResult<Option<StoredRecord<T>>>;

    /// All records of `owner`, in id order.
    fn find_all_by_owner(&self, owner: &OwnerId) -> FinTrackResult<Vec<StoredRecord<T>>>;

    /// Returns whether a record was removed.
    fn delete_by_id_and_owner(&self, id: RecordId, owner: &OwnerId) -> FinTrackResult<bool>;
}
