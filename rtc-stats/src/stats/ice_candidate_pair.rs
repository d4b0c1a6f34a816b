//! ICE candidate pair statistics.
//!
//! This module contains the [`RTCIceCandidatePairStats`] view which reads the
//! fields of a `candidate-pair` record used for path selection, RTT and
//! transport byte counters.

use super::{Field, StatRecord};
use crate::error::Result;
use crate::metrics::{Direction, RoundTripTimeKind};
use ::serde::{Deserialize, Serialize};
use std::fmt;

/// The state of an ICE candidate pair.
///
/// This enum represents the current state of a candidate pair
/// in the ICE connectivity check process.
#[derive(Default, PartialEq, Eq, Debug, Copy, Clone, Serialize, Deserialize)]
pub enum RTCStatsIceCandidatePairState {
    /// State has not been set, or was not recognized.
    #[default]
    Unspecified,

    /// Connectivity checks have not started for this pair.
    #[serde(rename = "frozen")]
    Frozen,

    /// Connectivity checks are waiting to be performed.
    #[serde(rename = "waiting")]
    Waiting,

    /// Connectivity checks are in progress.
    #[serde(rename = "in-progress")]
    InProgress,

    /// Connectivity checks have failed for this pair.
    #[serde(rename = "failed")]
    Failed,

    /// Connectivity checks have succeeded for this pair.
    #[serde(rename = "succeeded")]
    Succeeded,
}

impl From<&str> for RTCStatsIceCandidatePairState {
    fn from(raw: &str) -> Self {
        match raw {
            "frozen" => RTCStatsIceCandidatePairState::Frozen,
            "waiting" => RTCStatsIceCandidatePairState::Waiting,
            "in-progress" => RTCStatsIceCandidatePairState::InProgress,
            "failed" => RTCStatsIceCandidatePairState::Failed,
            "succeeded" => RTCStatsIceCandidatePairState::Succeeded,
            _ => RTCStatsIceCandidatePairState::Unspecified,
        }
    }
}

impl fmt::Display for RTCStatsIceCandidatePairState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RTCStatsIceCandidatePairState::Unspecified => "unspecified",
            RTCStatsIceCandidatePairState::Frozen => "frozen",
            RTCStatsIceCandidatePairState::Waiting => "waiting",
            RTCStatsIceCandidatePairState::InProgress => "in-progress",
            RTCStatsIceCandidatePairState::Failed => "failed",
            RTCStatsIceCandidatePairState::Succeeded => "succeeded",
        };
        f.write_str(s)
    }
}

/// Typed accessors over a `candidate-pair` [`StatRecord`].
///
/// # W3C Reference
///
/// See [RTCIceCandidatePairStats](https://www.w3.org/TR/webrtc-stats/#candidatepair-dict*)
#[derive(Debug, Copy, Clone)]
pub struct RTCIceCandidatePairStats<'a> {
    record: &'a StatRecord,
}

impl<'a> RTCIceCandidatePairStats<'a> {
    pub fn new(record: &'a StatRecord) -> Self {
        Self { record }
    }

    pub fn record(&self) -> &'a StatRecord {
        self.record
    }

    pub fn id(&self) -> &'a str {
        &self.record.id
    }

    /// Current state of the candidate pair.
    pub fn state(&self) -> RTCStatsIceCandidatePairState {
        self.record
            .field("state")
            .as_str()
            .map(RTCStatsIceCandidatePairState::from)
            .unwrap_or_default()
    }

    /// Whether this candidate pair has been nominated by the controlling agent.
    pub fn nominated(&self) -> bool {
        self.record.field("nominated").as_str() == Some("true")
    }

    /// Whether a current RTT measurement is reported (not missing, not `NA`).
    pub fn has_current_round_trip_time(&self) -> bool {
        self.record.field("currentRoundTripTime").is_present()
    }

    /// Cumulative bytes sent or received over this pair.
    pub fn bytes(&self, direction: Direction) -> Result<Option<u64>> {
        self.record.parse_field(direction.bytes_field())
    }

    /// Current or total round trip time in seconds.
    pub fn round_trip_time(&self, kind: RoundTripTimeKind) -> Result<Option<f64>> {
        self.record.parse_field(kind.field_name())
    }

    pub fn timestamp_ms(&self) -> Result<Option<f64>> {
        self.record.timestamp_ms()
    }

    pub fn field(&self, name: &str) -> Field<'a> {
        self.record.field(name)
    }
}
