//! Generic folds shared by the per-instrument summaries.
//!
//! Nothing here knows about loans or investments; callers pass field
//! accessors. Results are left unrounded so summaries can round once.

use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Sum of a numeric field.
pub fn sum_by<'a, T: 'a, I, F>(items: I, value: F) -> Decimal
where
    I: IntoIterator<Item = &'a T>,
    F: Fn(&T) -> Decimal,
{
    items.into_iter().map(value).sum()
}

/// Mean of a numeric field; zero for an empty collection.
pub fn average_by<'a, T: 'a, I, F>(items: I, value: F) -> Decimal
where
    I: IntoIterator<Item = &'a T>,
    F: Fn(&T) -> Decimal,
{
    let mut total = Decimal::ZERO;
    let mut count: u64 = 0;
    for item in items {
        total += value(item);
        count += 1;
    }
    if count == 0 {
        Decimal::ZERO
    } else {
        total / Decimal::from(count)
    }
}

/// Number of items per category.
pub fn count_by<'a, T: 'a, K, I, F>(items: I, key: F) -> BTreeMap<K, usize>
where
    K: Ord,
    I: IntoIterator<Item = &'a T>,
    F: Fn(&T) -> K,
{
    let mut counts = BTreeMap::new();
    for item in items {
        *counts.entry(key(item)).or_insert(0) += 1;
    }
    counts
}

/// Sum of a numeric field per category.
pub fn sum_grouped_by<'a, T: 'a, K, I, FK, FV>(items: I, key: FK, value: FV) -> BTreeMap<K, Decimal>
where
    K: Ord,
    I: IntoIterator<Item = &'a T>,
    FK: Fn(&T) -> K,
    FV: Fn(&T) -> Decimal,
{
    let mut sums = BTreeMap::new();
    for item in items {
        *sums.entry(key(item)).or_insert(Decimal::ZERO) += value(item);
    }
    sums
}
