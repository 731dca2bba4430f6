//! Cross-reference-point aggregation.
//!
//! Merges the per-reference-point scan outputs into one entry per entity,
//! keeping the minimum distance observed from any reference point, then
//! ranks the merged set deterministically.

use std::collections::HashMap;

use crate::model::DirectoryEntity;

/// Merge per-reference-point scan outputs, keeping one entry per entity
/// at its minimum observed distance.
///
/// An entity visible from two reference locations keeps the smaller of
/// the two distances, never a sum or an average.
#[must_use]
pub fn aggregate_minimum<T: DirectoryEntity>(
    per_reference: Vec<Vec<(T, f64)>>,
) -> Vec<(T, f64)> {
    let mut best: HashMap<i64, (T, f64)> = HashMap::new();

    for hits in per_reference {
        for (entity, distance) in hits {
            match best.get(&entity.id()) {
                Some((_, existing)) if *existing <= distance => {}
                _ => {
                    best.insert(entity.id(), (entity, distance));
                }
            }
        }
    }

    best.into_values().collect()
}

/// Sort ascending by distance, breaking ties by entity creation order and
/// then id so repeated calls with identical inputs return identical
/// orderings, and cap the result count.
#[must_use]
pub fn rank<T: DirectoryEntity>(mut hits: Vec<(T, f64)>, max_results: usize) -> Vec<(T, f64)> {
    hits.sort_by(|(a, da), (b, db)| {
        da.partial_cmp(db)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.created_at().cmp(&b.created_at()))
            .then_with(|| a.id().cmp(&b.id()))
    });
    hits.truncate(max_results);
    hits
}
