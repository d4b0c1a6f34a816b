//! Report assembly.
//!
//! [`ReportBuilder`] reduces a [`Series`] into a [`Report`]: a flat mapping
//! from descriptive metric name to value, gated by the configured
//! [`DirectionScope`] and media types. A metric that fails is reported as `-1` and its error
//! message is kept under `"errors"`; the other metrics are unaffected.
//!
//! ```rust
//! use rtc_stats::{DirectionScope, ReportBuilder, ReportConfig, report};
//!
//! let json = r#"[
//!     {"stats": [{"type": "candidate-pair", "id": "p", "state": "succeeded",
//!                 "bytesSent": 1000, "currentRoundTripTime": 0.02, "timestamp": 0}]},
//!     {"stats": [{"type": "candidate-pair", "id": "p", "state": "succeeded",
//!                 "bytesSent": 2000, "currentRoundTripTime": 0.04, "timestamp": 1000}]}
//! ]"#;
//!
//! let builder = ReportBuilder::new(ReportConfig::default().with_direction(DirectionScope::Out));
//! let series = builder.parse_json(json).unwrap();
//! let out = builder.build(&series);
//!
//! assert_eq!(out.get(report::AVG_SENT_BITRATE).unwrap().as_f64(), Some(8000.0));
//! assert!(out.get(report::AUDIO_JITTER).is_none());
//! ```

use crate::config::{DirectionScope, ReportConfig};
use crate::error::Result;
use crate::metrics::{
    Direction, MediaType, RoundTripTimeKind, UNAVAILABLE, compute_audio_jitter, compute_bitrate,
    compute_packets_loss, compute_round_trip_time, total_bytes,
};
use crate::snapshot::{RawDump, Series, Snapshot};
use crate::stats::rtp_stream::RtpCodecKind;
use crate::stats::{Field, NA, RTCStatsType, StatRecord};
use ::serde::{Serialize, Serializer};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::fmt;

pub const CURRENT_ROUND_TRIP_TIME: &str = "currentRoundTripTime (ms)";
pub const TOTAL_ROUND_TRIP_TIME: &str = "totalRoundTripTime (ms)";
pub const TOTAL_BYTES_SENT: &str = "totalBytesSent (Bytes)";
pub const TOTAL_BYTES_RECEIVED: &str = "totalBytesReceived (Bytes)";
pub const AVG_SENT_BITRATE: &str = "avgSentBitrate (bps)";
pub const AVG_RECEIVED_BITRATE: &str = "avgReceivedBitrate (bps)";
pub const OUTBOUND_AUDIO_BITRATE: &str = "outboundAudioBitrate (bps)";
pub const OUTBOUND_VIDEO_BITRATE: &str = "outboundVideoBitrate (bps)";
pub const INBOUND_AUDIO_BITRATE: &str = "inboundAudioBitrate (bps)";
pub const INBOUND_VIDEO_BITRATE: &str = "inboundVideoBitrate (bps)";
pub const AUDIO_JITTER: &str = "audioJitter (ms)";
pub const AUDIO_PACKETS_LOSS: &str = "audioPacketsLoss (%)";
pub const VIDEO_PACKETS_LOSS: &str = "videoPacketsLoss (%)";

/// Send side metrics, in report order.
pub const SEND_METRICS: [&str; 4] = [
    TOTAL_BYTES_SENT,
    AVG_SENT_BITRATE,
    OUTBOUND_AUDIO_BITRATE,
    OUTBOUND_VIDEO_BITRATE,
];

/// Receive side metrics, in report order.
pub const RECEIVE_METRICS: [&str; 7] = [
    TOTAL_BYTES_RECEIVED,
    AVG_RECEIVED_BITRATE,
    INBOUND_AUDIO_BITRATE,
    INBOUND_VIDEO_BITRATE,
    AUDIO_JITTER,
    AUDIO_PACKETS_LOSS,
    VIDEO_PACKETS_LOSS,
];

const CANDIDATE_PAIR_FIELDS: [&str; 5] = [
    "bytesSent",
    "bytesReceived",
    "currentRoundTripTime",
    "totalRoundTripTime",
    "timestamp",
];
const INBOUND_FIELDS: [&str; 5] = [
    "bytesReceived",
    "packetsReceived",
    "packetsLost",
    "jitter",
    "timestamp",
];
const OUTBOUND_FIELDS: [&str; 2] = ["bytesSent", "timestamp"];

/// The value of one metric in a [`Report`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    /// Bitrates and byte totals, truncated; also the `-1` sentinel.
    Integer(i64),
    /// Round trip times and jitter in milliseconds.
    Float(f64),
    /// Packet loss as a fixed 3-decimal fraction.
    Text(String),
}

impl MetricValue {
    pub const UNAVAILABLE: MetricValue = MetricValue::Integer(UNAVAILABLE as i64);

    pub fn is_unavailable(&self) -> bool {
        *self == Self::UNAVAILABLE
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Integer(v) => Some(*v as f64),
            MetricValue::Float(v) => Some(*v),
            MetricValue::Text(v) => v.parse().ok(),
        }
    }

    fn integer(value: f64) -> Self {
        MetricValue::Integer(value as i64)
    }

    fn float(value: f64) -> Self {
        MetricValue::Float(value)
    }

    fn fraction(value: f64) -> Self {
        MetricValue::Text(format!("{value:.3}"))
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Integer(v) => write!(f, "{v}"),
            MetricValue::Float(v) => write!(f, "{v}"),
            MetricValue::Text(v) => f.write_str(v),
        }
    }
}

/// The reduced metrics of one monitored connection.
///
/// Serializes as a flat JSON object keyed by metric name, followed by the
/// optional `errors` and `stats` objects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report<'a> {
    #[serde(flatten)]
    metrics: BTreeMap<&'static str, MetricValue>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    errors: BTreeMap<&'static str, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<RawDump<'a>>,
}

impl<'a> Report<'a> {
    fn new() -> Self {
        Self {
            metrics: BTreeMap::new(),
            errors: BTreeMap::new(),
            stats: None,
        }
    }

    pub fn get(&self, name: &str) -> Option<&MetricValue> {
        self.metrics.get(name)
    }

    pub fn metrics(&self) -> impl Iterator<Item = (&'static str, &MetricValue)> {
        self.metrics.iter().map(|(name, value)| (*name, value))
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Error message of a metric that failed, if it did.
    pub fn error(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }

    pub fn errors(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.errors.iter().map(|(name, err)| (*name, err.as_str()))
    }

    /// The classified raw dump, when it was requested.
    pub fn raw_dump(&self) -> Option<&RawDump<'a>> {
        self.stats.as_ref()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn insert(&mut self, name: &'static str, result: Result<f64>, to_value: fn(f64) -> MetricValue) {
        let value = match result {
            Ok(v) if v == UNAVAILABLE => MetricValue::UNAVAILABLE,
            Ok(v) => to_value(v),
            Err(err) => {
                warn!("{name}: {err}");
                self.errors.insert(name, err.to_string());
                MetricValue::UNAVAILABLE
            }
        };
        self.metrics.insert(name, value);
    }
}

/// Reports of every peer connection of one call.
///
/// Serializes as `{"localPC": .., "remotePC[0]": .., "remotePC[1]": ..}`
/// with receivers kept in the order they were given.
#[derive(Debug, Clone, PartialEq)]
pub struct CallReport<'a> {
    pub local: Report<'a>,
    pub remote: Vec<Report<'a>>,
}

impl CallReport<'_> {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Serialize for CallReport<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use ::serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(1 + self.remote.len()))?;
        map.serialize_entry("localPC", &self.local)?;
        for (i, report) in self.remote.iter().enumerate() {
            map.serialize_entry(&format!("remotePC[{i}]"), report)?;
        }
        map.end()
    }
}

/// Selected fields of the records that feed the metrics, tick by tick.
///
/// Keys are `candidate-pair_{i}`, `inbound-audio_{i}`, `inbound-video_{i}`,
/// `outbound-audio_{i}` and `outbound-video_{i}`, in tick order. A record
/// absent from a tick yields an empty object; a field reported as `NA` is
/// kept as `NA`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ExtractedStats {
    entries: Vec<(String, BTreeMap<&'static str, String>)>,
}

impl ExtractedStats {
    pub fn get(&self, key: &str) -> Option<&BTreeMap<&'static str, String>> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, fields)| fields)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, key: String, record: Option<&StatRecord>, names: &[&'static str]) {
        let mut fields = BTreeMap::new();
        if let Some(record) = record {
            for &name in names {
                match record.field(name) {
                    Field::Present(v) => {
                        fields.insert(name, v.to_string());
                    }
                    Field::Unavailable => {
                        fields.insert(name, NA.to_string());
                    }
                    Field::Missing => {}
                }
            }
        }
        self.entries.push((key, fields));
    }
}

impl Serialize for ExtractedStats {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(k, v)| (k, v)))
    }
}

/// Builds reports from parsed series.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReportBuilder {
    config: ReportConfig,
}

impl ReportBuilder {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Decodes and parses a series with the configured allow-list.
    pub fn parse_json(&self, json: &str) -> Result<Series> {
        self.config.parser().parse_json(json)
    }

    /// Reduces `series` into a report scoped by the configured direction and
    /// media types.
    pub fn build<'a>(&self, series: &'a Series) -> Report<'a> {
        self.build_scoped(series, self.config.direction)
    }

    /// Reports of a whole call.
    ///
    /// The sender is reduced to its send side and every receiver to its
    /// receive side, regardless of the configured direction. The media scope
    /// still applies.
    pub fn build_call<'a>(&self, sender: &'a Series, receivers: &'a [Series]) -> CallReport<'a> {
        CallReport {
            local: self.build_scoped(sender, DirectionScope::Out),
            remote: receivers
                .iter()
                .map(|series| self.build_scoped(series, DirectionScope::In))
                .collect(),
        }
    }

    /// Per tick view of the records feeding the metrics.
    ///
    /// Scoped by the configured direction and media types.
    pub fn extract(&self, series: &Series) -> ExtractedStats {
        let direction = self.config.direction;
        let kinds: Vec<RtpCodecKind> = [RtpCodecKind::Audio, RtpCodecKind::Video]
            .into_iter()
            .filter(|&kind| self.config.includes_media(MediaType::from(kind)))
            .collect();
        let mut extracted = ExtractedStats::default();

        for (i, snapshot) in series.iter().enumerate() {
            if self.config.includes_media(MediaType::CandidatePair) {
                extracted.push(
                    format!("candidate-pair_{i}"),
                    snapshot.active_candidate_pair().map(|p| p.record()),
                    &CANDIDATE_PAIR_FIELDS,
                );
            }
            if direction.includes_in() {
                for &kind in &kinds {
                    extracted.push(
                        format!("inbound-{kind}_{i}"),
                        stream_record(snapshot, &RTCStatsType::InboundRTP, kind),
                        &INBOUND_FIELDS,
                    );
                }
            }
            if direction.includes_out() {
                for &kind in &kinds {
                    extracted.push(
                        format!("outbound-{kind}_{i}"),
                        stream_record(snapshot, &RTCStatsType::OutboundRTP, kind),
                        &OUTBOUND_FIELDS,
                    );
                }
            }
        }

        extracted
    }

    fn build_scoped<'a>(&self, series: &'a Series, direction: DirectionScope) -> Report<'a> {
        let mut report = Report::new();
        let transport = self.config.includes_media(MediaType::CandidatePair);

        if transport {
            report.insert(
                CURRENT_ROUND_TRIP_TIME,
                Ok(compute_round_trip_time(series, RoundTripTimeKind::Current)),
                MetricValue::float,
            );
            report.insert(
                TOTAL_ROUND_TRIP_TIME,
                Ok(compute_round_trip_time(series, RoundTripTimeKind::Total)),
                MetricValue::float,
            );
        }

        for (dir, bytes_name, bitrates) in [
            (
                Direction::Out,
                TOTAL_BYTES_SENT,
                [
                    (AVG_SENT_BITRATE, MediaType::CandidatePair),
                    (OUTBOUND_AUDIO_BITRATE, MediaType::Audio),
                    (OUTBOUND_VIDEO_BITRATE, MediaType::Video),
                ],
            ),
            (
                Direction::In,
                TOTAL_BYTES_RECEIVED,
                [
                    (AVG_RECEIVED_BITRATE, MediaType::CandidatePair),
                    (INBOUND_AUDIO_BITRATE, MediaType::Audio),
                    (INBOUND_VIDEO_BITRATE, MediaType::Video),
                ],
            ),
        ] {
            if !direction.includes(dir) {
                continue;
            }
            if transport {
                report.insert(bytes_name, Ok(total_bytes(series, dir)), MetricValue::integer);
            }
            for (name, media) in bitrates {
                if self.config.includes_media(media) {
                    report.insert(name, compute_bitrate(series, dir, media), MetricValue::integer);
                }
            }
        }

        if direction.includes_in() {
            if self.config.includes_media(MediaType::Audio) {
                report.insert(AUDIO_JITTER, compute_audio_jitter(series), MetricValue::float);
                report.insert(
                    AUDIO_PACKETS_LOSS,
                    compute_packets_loss(series, MediaType::Audio),
                    MetricValue::fraction,
                );
            }
            if self.config.includes_media(MediaType::Video) {
                report.insert(
                    VIDEO_PACKETS_LOSS,
                    compute_packets_loss(series, MediaType::Video),
                    MetricValue::fraction,
                );
            }
        }

        if self.config.include_raw {
            report.stats = Some(series.raw_dump());
        }

        debug!(
            "built {direction} report over {} snapshot(s): {} metric(s), {} error(s)",
            series.len(),
            report.metrics.len(),
            report.errors.len()
        );
        report
    }
}

fn stream_record<'a>(
    snapshot: &'a Snapshot,
    typ: &RTCStatsType,
    kind: RtpCodecKind,
) -> Option<&'a StatRecord> {
    snapshot.rtp_stream(typ, kind).map(|s| s.record())
}
