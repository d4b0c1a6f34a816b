//! Quality metrics reduced from a [`Series`](crate::snapshot::Series).
//!
//! All reducers are pure functions over an immutable series. A result of
//! [`UNAVAILABLE`] means no usable sample existed and is never a measured
//! zero; callers must pass it through unchanged.
//!
//! | Reducer | Minimum snapshots | Unit |
//! |---------|-------------------|------|
//! | [`compute_bitrate`] | 2 | bit/s |
//! | [`compute_audio_jitter`] | 2 | ms |
//! | [`compute_packets_loss`] | 1 | fraction |
//! | [`compute_round_trip_time`] | 0 | ms |
//! | [`total_bytes`] | 0 | bytes |

use crate::error::{Error, Result};
use crate::stats::rtp_stream::RtpCodecKind;
use ::serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

mod bitrate;
mod bytes;
mod jitter;
mod packet_loss;
mod round_trip_time;

pub use bitrate::compute_bitrate;
pub use bytes::total_bytes;
pub use jitter::compute_audio_jitter;
pub use packet_loss::compute_packets_loss;
pub use round_trip_time::compute_round_trip_time;

/// Result of a metric for which no usable sample existed.
pub const UNAVAILABLE: f64 = -1.0;

/// Direction of a byte counter.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Received media, `bytesReceived`.
    In,
    /// Sent media, `bytesSent`.
    Out,
}

impl Direction {
    pub fn bytes_field(&self) -> &'static str {
        match self {
            Direction::In => "bytesReceived",
            Direction::Out => "bytesSent",
        }
    }
}

impl FromStr for Direction {
    type Err = Error;

    /// Accepts `in`/`received` and `out`/`sent`, case-insensitively.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "in" | "received" => Ok(Direction::In),
            "out" | "sent" => Ok(Direction::Out),
            _ => Err(Error::InvalidConfig {
                what: "direction",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::In => f.write_str("in"),
            Direction::Out => f.write_str("out"),
        }
    }
}

/// Which record a byte counter is read from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MediaType {
    Audio,
    Video,
    /// The active candidate pair, i.e. the whole transport.
    CandidatePair,
}

impl MediaType {
    /// The RTP media kind, or `None` for the candidate pair.
    pub fn codec_kind(&self) -> Option<RtpCodecKind> {
        match self {
            MediaType::Audio => Some(RtpCodecKind::Audio),
            MediaType::Video => Some(RtpCodecKind::Video),
            MediaType::CandidatePair => None,
        }
    }
}

impl From<RtpCodecKind> for MediaType {
    fn from(kind: RtpCodecKind) -> Self {
        match kind {
            RtpCodecKind::Audio => MediaType::Audio,
            RtpCodecKind::Video => MediaType::Video,
        }
    }
}

impl FromStr for MediaType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "audio" => Ok(MediaType::Audio),
            "video" => Ok(MediaType::Video),
            "candidate-pair" => Ok(MediaType::CandidatePair),
            _ => Err(Error::InvalidConfig {
                what: "media type",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaType::Audio => f.write_str("audio"),
            MediaType::Video => f.write_str("video"),
            MediaType::CandidatePair => f.write_str("candidate-pair"),
        }
    }
}

/// Which round trip time field of the candidate pair to average.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundTripTimeKind {
    Current,
    Total,
}

impl RoundTripTimeKind {
    pub fn field_name(&self) -> &'static str {
        match self {
            RoundTripTimeKind::Current => "currentRoundTripTime",
            RoundTripTimeKind::Total => "totalRoundTripTime",
        }
    }
}

impl FromStr for RoundTripTimeKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "current" => Ok(RoundTripTimeKind::Current),
            "total" => Ok(RoundTripTimeKind::Total),
            _ => Err(Error::InvalidConfig {
                what: "round trip time kind",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for RoundTripTimeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundTripTimeKind::Current => f.write_str("current"),
            RoundTripTimeKind::Total => f.write_str("total"),
        }
    }
}

pub(crate) fn require_snapshots(metric: &'static str, required: usize, actual: usize) -> Result<()> {
    if actual < required {
        Err(Error::InsufficientData {
            metric,
            required,
            actual,
        })
    } else {
        Ok(())
    }
}
