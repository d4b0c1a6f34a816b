use super::{RoundTripTimeKind, UNAVAILABLE};
use crate::snapshot::Series;
use log::warn;

/// Average round trip time of the active candidate pair, in milliseconds.
///
/// Snapshots without an active pair contribute nothing. A reading of exactly
/// zero means the pair has not measured anything yet and is skipped as well.
/// Returns [`UNAVAILABLE`] when no sample remains.
pub fn compute_round_trip_time(series: &Series, kind: RoundTripTimeKind) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;

    for pair in series.iter().filter_map(|s| s.active_candidate_pair()) {
        match pair.round_trip_time(kind) {
            Ok(Some(rtt)) if rtt.is_finite() && rtt != 0.0 => {
                sum += 1000.0 * rtt;
                count += 1;
            }
            Ok(_) => {}
            Err(err) => warn!("{} round trip time: {err}, skipping sample", kind),
        }
    }

    if count == 0 {
        UNAVAILABLE
    } else {
        sum / count as f64
    }
}
