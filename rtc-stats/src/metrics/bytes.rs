use super::{Direction, UNAVAILABLE};
use crate::snapshot::Series;
use log::warn;

/// Largest byte counter seen on the active candidate pair.
///
/// Counters are cumulative, so the maximum is the total for the call even
/// when a reading arrives out of order. Returns [`UNAVAILABLE`] when no
/// snapshot has an active pair reporting the counter.
pub fn total_bytes(series: &Series, direction: Direction) -> f64 {
    series
        .iter()
        .filter_map(|s| s.active_candidate_pair())
        .filter_map(|pair| {
            pair.bytes(direction).unwrap_or_else(|err| {
                warn!("total bytes: {err}, skipping sample");
                None
            })
        })
        .max()
        .map_or(UNAVAILABLE, |b| b as f64)
}
