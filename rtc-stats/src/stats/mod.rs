//! WebRTC Statistics types.
//!
//! This module contains the typed view over one `getStats()` entry:
//!
//! - [`RTCStatsType`] - the closed set of stat categories the engine understands
//! - [`StatRecord`] - one classified entry holding its textual fields
//! - [`Field`] - the presence-aware result of reading a single field
//!
//! Every value reported by the browser is kept as text. A field that is
//! missing, or that carries the [`NA`] marker, is never read as zero: all
//! accessors go through [`Field`] so "no data" stays distinguishable from a
//! measured `0`.

use ::serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

pub mod ice_candidate_pair;
pub mod rtp_stream;

/// Marker used by stat collectors for a value that is not available.
pub const NA: &str = "NA";

/// Highest number of integral digits of a millisecond epoch timestamp.
const TIMESTAMP_MS_DIGITS: f64 = 1e13;

/// The type of statistics object.
///
/// Types outside the known set are kept as [`RTCStatsType::Unknown`] so the
/// decision to drop them is made explicitly by the parser.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RTCStatsType {
    Codec,
    Track,
    Stream,
    InboundRTP,
    OutboundRTP,
    PeerConnection,
    Transport,
    CandidatePair,
    RemoteCandidate,
    LocalCandidate,
    Unknown(String),
}

impl RTCStatsType {
    /// Every category the parser materializes, in report order.
    pub const KNOWN: [RTCStatsType; 10] = [
        RTCStatsType::Codec,
        RTCStatsType::Track,
        RTCStatsType::Stream,
        RTCStatsType::InboundRTP,
        RTCStatsType::OutboundRTP,
        RTCStatsType::PeerConnection,
        RTCStatsType::Transport,
        RTCStatsType::CandidatePair,
        RTCStatsType::RemoteCandidate,
        RTCStatsType::LocalCandidate,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            RTCStatsType::Codec => "codec",
            RTCStatsType::Track => "track",
            RTCStatsType::Stream => "stream",
            RTCStatsType::InboundRTP => "inbound-rtp",
            RTCStatsType::OutboundRTP => "outbound-rtp",
            RTCStatsType::PeerConnection => "peer-connection",
            RTCStatsType::Transport => "transport",
            RTCStatsType::CandidatePair => "candidate-pair",
            RTCStatsType::RemoteCandidate => "remote-candidate",
            RTCStatsType::LocalCandidate => "local-candidate",
            RTCStatsType::Unknown(typ) => typ,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, RTCStatsType::Unknown(_))
    }
}

impl From<&str> for RTCStatsType {
    fn from(raw: &str) -> Self {
        match raw {
            "codec" => RTCStatsType::Codec,
            "track" => RTCStatsType::Track,
            "stream" => RTCStatsType::Stream,
            "inbound-rtp" => RTCStatsType::InboundRTP,
            "outbound-rtp" => RTCStatsType::OutboundRTP,
            "peer-connection" => RTCStatsType::PeerConnection,
            "transport" => RTCStatsType::Transport,
            "candidate-pair" => RTCStatsType::CandidatePair,
            "remote-candidate" => RTCStatsType::RemoteCandidate,
            "local-candidate" => RTCStatsType::LocalCandidate,
            _ => RTCStatsType::Unknown(raw.to_string()),
        }
    }
}

impl fmt::Display for RTCStatsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RTCStatsType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RTCStatsType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(RTCStatsType::from(raw.as_str()))
    }
}

/// The outcome of reading one field from a [`StatRecord`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Field<'a> {
    /// The field carries a real value.
    Present(&'a str),
    /// The field exists but was reported as [`NA`].
    Unavailable,
    /// The field is not part of the record.
    Missing,
}

impl<'a> Field<'a> {
    pub fn is_present(&self) -> bool {
        matches!(self, Field::Present(_))
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Field::Present(v) => Some(v),
            _ => None,
        }
    }
}

/// One classified entry of a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct StatRecord {
    pub typ: RTCStatsType,
    pub id: String,
    pub fields: BTreeMap<String, String>,
}

impl StatRecord {
    pub fn new(typ: RTCStatsType, id: impl Into<String>, fields: BTreeMap<String, String>) -> Self {
        Self {
            typ,
            id: id.into(),
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Field<'_> {
        match self.fields.get(name).map(String::as_str) {
            None => Field::Missing,
            Some(NA) => Field::Unavailable,
            Some(v) => Field::Present(v),
        }
    }

    /// Reads `name` and converts it, keeping absence apart from failure.
    ///
    /// Returns `Ok(None)` when the field is missing or [`NA`], and
    /// [`Error::MalformedRecord`] when a value is present but does not parse.
    pub fn parse_field<T: FromStr>(&self, name: &str) -> Result<Option<T>> {
        match self.field(name) {
            Field::Present(v) => v
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|_| Error::malformed(&self.id, name, format!("has non-numeric value {v:?}"))),
            _ => Ok(None),
        }
    }

    /// The record's `timestamp` field, normalized to epoch milliseconds.
    pub fn timestamp_ms(&self) -> Result<Option<f64>> {
        match self.field("timestamp") {
            Field::Present(v) => normalize_timestamp_ms(v)
                .map(Some)
                .ok_or_else(|| Error::malformed(&self.id, "timestamp", format!("is not a timestamp: {v:?}"))),
            _ => Ok(None),
        }
    }
}

/// Converts a reported timestamp to epoch milliseconds.
///
/// Accepts plain and scientific notation (`1.536834943435905E12`). Values
/// with more than 13 integral digits come from micro- or nanosecond clocks
/// and are scaled down to milliseconds.
pub fn normalize_timestamp_ms(raw: &str) -> Option<f64> {
    let mut ts = raw.trim().parse::<f64>().ok()?;
    if !ts.is_finite() || ts < 0.0 {
        return None;
    }
    while ts >= TIMESTAMP_MS_DIGITS {
        ts /= 10.0;
    }
    Some(ts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[(&str, &str)]) -> StatRecord {
        StatRecord::new(
            RTCStatsType::InboundRTP,
            "RTCInboundRTPAudioStream_1",
            fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_stats_type_round_trips_known_names() {
        for typ in RTCStatsType::KNOWN {
            assert_eq!(RTCStatsType::from(typ.as_str()), typ);
            assert!(typ.is_known());
        }
    }

    #[test]
    fn test_stats_type_keeps_unknown_name() {
        let typ = RTCStatsType::from("media-playout");
        assert_eq!(typ, RTCStatsType::Unknown("media-playout".to_string()));
        assert!(!typ.is_known());
        assert_eq!(typ.to_string(), "media-playout");
    }

    #[test]
    fn test_field_presence() {
        let rec = record(&[("jitter", "0.004"), ("packetsLost", "NA"), ("bytesReceived", "0")]);

        assert_eq!(rec.field("jitter"), Field::Present("0.004"));
        assert_eq!(rec.field("packetsLost"), Field::Unavailable);
        assert_eq!(rec.field("frameWidth"), Field::Missing);
        // a genuine zero is present, not unavailable
        assert_eq!(rec.field("bytesReceived"), Field::Present("0"));
    }

    #[test]
    fn test_parse_field() {
        let rec = record(&[("bytesReceived", "1200"), ("packetsLost", "NA"), ("jitter", "abc")]);

        assert_eq!(rec.parse_field::<u64>("bytesReceived").unwrap(), Some(1200));
        assert_eq!(rec.parse_field::<u64>("packetsLost").unwrap(), None);
        assert_eq!(rec.parse_field::<u64>("packetsReceived").unwrap(), None);

        let err = rec.parse_field::<f64>("jitter").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::MalformedRecord);
    }

    #[test]
    fn test_normalize_timestamp_ms() {
        assert_eq!(normalize_timestamp_ms("1000"), Some(1000.0));
        assert_eq!(
            normalize_timestamp_ms("1536834943435"),
            Some(1_536_834_943_435.0)
        );
        assert_eq!(
            normalize_timestamp_ms("1.536834943435E12"),
            Some(1_536_834_943_435.0)
        );
        // microseconds
        assert_eq!(
            normalize_timestamp_ms("1536834943435000"),
            Some(1_536_834_943_435.0)
        );
        assert_eq!(normalize_timestamp_ms("NA"), None);
        assert_eq!(normalize_timestamp_ms("-5"), None);
    }

    #[test]
    fn test_record_timestamp() {
        let rec = record(&[("timestamp", "1536834943435.5")]);
        assert_eq!(rec.timestamp_ms().unwrap(), Some(1_536_834_943_435.5));

        let rec = record(&[("timestamp", "NA")]);
        assert_eq!(rec.timestamp_ms().unwrap(), None);

        let rec = record(&[("timestamp", "yesterday")]);
        assert!(rec.timestamp_ms().is_err());
    }
}
