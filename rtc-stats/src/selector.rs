//! Selection of the active candidate pair of a snapshot.
//!
//! The active pair is resolved in order:
//!
//! 1. a pair in state `succeeded`
//! 2. otherwise a pair in state `in-progress` that already reports a
//!    `currentRoundTripTime`
//! 3. otherwise none; the tick then contributes nothing to path metrics
//!
//! When several pairs qualify at the same step, a nominated pair wins, then
//! the lexicographically smallest `id`, then the earliest reported one.

use crate::stats::StatRecord;
use crate::stats::ice_candidate_pair::{RTCIceCandidatePairStats, RTCStatsIceCandidatePairState};
use log::debug;
use std::cmp::Ordering;

/// Picks the active pair among the `candidate-pair` records of one snapshot.
pub fn select_active_pair(pairs: &[StatRecord]) -> Option<RTCIceCandidatePairStats<'_>> {
    let pairs: Vec<RTCIceCandidatePairStats<'_>> =
        pairs.iter().map(RTCIceCandidatePairStats::new).collect();

    let selected = best_of(&pairs, |p| p.state() == RTCStatsIceCandidatePairState::Succeeded)
        .or_else(|| {
            best_of(&pairs, |p| {
                p.state() == RTCStatsIceCandidatePairState::InProgress
                    && p.has_current_round_trip_time()
            })
        });

    if selected.is_none() && !pairs.is_empty() {
        debug!("no active pair among {} candidate pair(s)", pairs.len());
    }
    selected
}

fn best_of<'a, F>(
    pairs: &[RTCIceCandidatePairStats<'a>],
    eligible: F,
) -> Option<RTCIceCandidatePairStats<'a>>
where
    F: Fn(&RTCIceCandidatePairStats<'a>) -> bool,
{
    // min_by keeps the first of equal elements, which covers the position rule
    pairs
        .iter()
        .filter(|p| eligible(*p))
        .min_by(|a, b| tie_break(a, b))
        .copied()
}

fn tie_break(a: &RTCIceCandidatePairStats<'_>, b: &RTCIceCandidatePairStats<'_>) -> Ordering {
    b.nominated()
        .cmp(&a.nominated())
        .then_with(|| a.id().cmp(b.id()))
}
