use crate::domain::model::ListingRecord;
use std::collections::HashSet;
use std::hash::Hash;

/// Keeps the first item for every key, preserving input order.
pub fn dedupe_by<T, K, F>(items: Vec<T>, mut key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: FnMut(&T) -> K,
{
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(key(item))).collect()
}

/// Exact, case-sensitive title match.
pub fn dedupe_by_title(records: Vec<ListingRecord>) -> Vec<ListingRecord> {
    dedupe_by(records, |r| r.title.clone())
}
