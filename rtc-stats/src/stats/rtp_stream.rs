//! RTP stream statistics.
//!
//! [`RTCRtpStreamStats`] reads the counters shared by `inbound-rtp` and
//! `outbound-rtp` records.

use super::StatRecord;
use crate::error::Result;
use crate::metrics::Direction;
use ::serde::{Deserialize, Serialize};
use std::fmt;

/// The media kind carried by an RTP stream.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RtpCodecKind {
    Audio,
    Video,
}

impl RtpCodecKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RtpCodecKind::Audio => "audio",
            RtpCodecKind::Video => "video",
        }
    }
}

impl fmt::Display for RtpCodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed accessors over an `inbound-rtp` or `outbound-rtp` [`StatRecord`].
///
/// # W3C Reference
///
/// See [RTCRtpStreamStats](https://www.w3.org/TR/webrtc-stats/#rtpstreamstats-dict*)
#[derive(Debug, Copy, Clone)]
pub struct RTCRtpStreamStats<'a> {
    record: &'a StatRecord,
}

impl<'a> RTCRtpStreamStats<'a> {
    pub fn new(record: &'a StatRecord) -> Self {
        Self { record }
    }

    pub fn record(&self) -> &'a StatRecord {
        self.record
    }

    /// The media kind of this stream.
    ///
    /// Current browsers report `kind`; older ones only `mediaType`.
    pub fn kind(&self) -> Option<RtpCodecKind> {
        let raw = self
            .record
            .field("kind")
            .as_str()
            .or_else(|| self.record.field("mediaType").as_str())?;
        match raw {
            "audio" => Some(RtpCodecKind::Audio),
            "video" => Some(RtpCodecKind::Video),
            _ => None,
        }
    }

    pub fn bytes(&self, direction: Direction) -> Result<Option<u64>> {
        self.record.parse_field(direction.bytes_field())
    }

    pub fn packets_received(&self) -> Result<Option<i64>> {
        self.record.parse_field("packetsReceived")
    }

    /// Total packets lost. May be negative when duplicates arrive.
    pub fn packets_lost(&self) -> Result<Option<i64>> {
        self.record.parse_field("packetsLost")
    }

    /// Inter-arrival jitter in seconds.
    pub fn jitter(&self) -> Result<Option<f64>> {
        self.record.parse_field("jitter")
    }

    pub fn timestamp_ms(&self) -> Result<Option<f64>> {
        self.record.timestamp_ms()
    }
}
