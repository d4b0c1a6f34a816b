//! Classification of raw `getStats()` entries.
//!
//! [`StatRecordParser`] turns the flat, loosely typed entry list of one tick
//! into [`StatRecord`]s grouped by [`RTCStatsType`]:
//!
//! - entries without a `type`, or with a type outside
//!   [`RTCStatsType::KNOWN`], are dropped without failing the snapshot
//! - entries that are not objects, or carry nested objects, are malformed:
//!   they are logged and skipped
//! - an allow-list restricts which categories are materialized

use crate::error::{Error, Result};
use crate::sdp::{RTCSessionDescription, SessionDescriptionPair};
use crate::snapshot::{RawSeries, RawSnapshot, Series, Snapshot};
use crate::stats::{NA, RTCStatsType, StatRecord, normalize_timestamp_ms};
use log::{trace, warn};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Classifies raw stat entries into typed categories.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StatRecordParser {
    allowed: Option<BTreeSet<RTCStatsType>>,
}

impl StatRecordParser {
    /// A parser materializing every known category.
    pub fn new() -> Self {
        Self::default()
    }

    /// A parser materializing only the listed categories.
    ///
    /// An empty list materializes nothing.
    pub fn with_allowed<I>(allowed: I) -> Self
    where
        I: IntoIterator<Item = RTCStatsType>,
    {
        Self {
            allowed: Some(allowed.into_iter().collect()),
        }
    }

    pub fn is_allow_listed(&self) -> bool {
        self.allowed.is_some()
    }

    /// Whether records of `typ` are materialized by this parser.
    pub fn accepts(&self, typ: &RTCStatsType) -> bool {
        typ.is_known() && self.allowed.as_ref().is_none_or(|allowed| allowed.contains(typ))
    }

    /// Reads the category of one entry.
    ///
    /// Returns `None` when the entry carries no `type` at all.
    pub fn classify(entry: &Map<String, Value>) -> Option<RTCStatsType> {
        entry
            .get("type")
            .and_then(Value::as_str)
            .map(RTCStatsType::from)
    }

    /// Classifies the entries of one tick.
    pub fn parse(&self, entries: &[Value]) -> BTreeMap<RTCStatsType, Vec<StatRecord>> {
        let mut stats: BTreeMap<RTCStatsType, Vec<StatRecord>> = BTreeMap::new();

        for (index, entry) in entries.iter().enumerate() {
            let Value::Object(entry) = entry else {
                if !entry.is_null() {
                    warn!("skipping stat entry #{index}: not an object");
                }
                continue;
            };
            let Some(typ) = Self::classify(entry) else {
                trace!("dropping stat entry #{index} without a type");
                continue;
            };
            if !typ.is_known() {
                trace!("dropping stat entry #{index} of unknown type {typ}");
                continue;
            }
            if !self.accepts(&typ) {
                continue;
            }

            match Self::to_record(typ, index, entry) {
                Ok(record) => stats.entry(record.typ.clone()).or_default().push(record),
                Err(err) => warn!("skipping stat entry #{index}: {err}"),
            }
        }

        stats
    }

    /// Parses one tick, including captured session descriptions.
    pub fn parse_snapshot(&self, raw: &RawSnapshot) -> Snapshot {
        let timestamp = raw
            .timestamp
            .as_ref()
            .and_then(|v| scalar_to_text(v))
            .and_then(|ts| normalize_timestamp_ms(&ts));

        let sdp = if raw.offer.is_some() || raw.answer.is_some() {
            Some(SessionDescriptionPair {
                offer: raw.offer.as_ref().and_then(RTCSessionDescription::from_value),
                answer: raw.answer.as_ref().and_then(RTCSessionDescription::from_value),
            })
        } else {
            None
        };

        Snapshot {
            timestamp,
            stats: self.parse(&raw.stats),
            sdp,
        }
    }

    /// Parses a whole monitoring window.
    pub fn parse_series(&self, raw: &RawSeries) -> Series {
        let snapshots: Vec<Snapshot> = raw
            .snapshots
            .iter()
            .map(|s| self.parse_snapshot(s))
            .collect();

        let decreasing = snapshots
            .windows(2)
            .filter(|w| matches!((w[0].timestamp, w[1].timestamp), (Some(a), Some(b)) if b <= a))
            .count();
        if decreasing > 0 {
            warn!("{decreasing} snapshot(s) are not later than their predecessor");
        }

        Series::with_allow_list(snapshots, self.is_allow_listed())
    }

    /// Decodes a JSON document and parses it as a series.
    pub fn parse_json(&self, json: &str) -> Result<Series> {
        Ok(self.parse_series(&RawSeries::from_json(json)?))
    }

    fn to_record(typ: RTCStatsType, index: usize, entry: &Map<String, Value>) -> Result<StatRecord> {
        let id = match entry.get("id") {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            _ => format!("{typ}_{index}"),
        };

        let mut fields = BTreeMap::new();
        for (name, value) in entry {
            let text = scalar_to_text(value).ok_or_else(|| {
                Error::malformed(&id, name, "holds a nested object")
            })?;
            fields.insert(name.clone(), text);
        }

        Ok(StatRecord::new(typ, id, fields))
    }
}

/// Textual form of a reported value.
///
/// `null` becomes [`NA`]; arrays of scalars are joined with commas. Nested
/// objects have no textual form.
fn scalar_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(NA.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Array(_) | Value::Object(_) => None,
                _ => scalar_to_text(item),
            })
            .collect::<Option<Vec<_>>>()
            .map(|parts| parts.join(",")),
        Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entries() -> Vec<Value> {
        vec![
            json!({"type": "codec", "id": "RTCCodec_96", "mimeType": "video/VP8"}),
            json!({"type": "inbound-rtp", "id": "in_a", "kind": "audio", "jitter": 0.004, "packetsLost": null}),
            json!({"type": "candidate-pair", "id": "pair_1", "state": "succeeded", "nominated": true}),
            json!({"type": "media-playout", "id": "playout"}),
            json!({"id": "no-type"}),
            json!("not an object"),
            json!({"type": "transport", "id": "bad", "nested": {"x": 1}}),
            json!({"type": "stream", "id": "stream_1", "trackIds": ["t1", "t2"]}),
            json!({"type": "track"}),
        ]
    }

    #[test]
    fn test_parse_classifies_known_types() {
        let stats = StatRecordParser::new().parse(&entries());

        let keys: Vec<_> = stats.keys().cloned().collect();
        assert_eq!(
            keys,
            vec![
                RTCStatsType::Codec,
                RTCStatsType::Track,
                RTCStatsType::Stream,
                RTCStatsType::InboundRTP,
                RTCStatsType::CandidatePair,
            ]
        );
    }

    #[test]
    fn test_parse_normalizes_values_to_text() {
        let stats = StatRecordParser::new().parse(&entries());

        let inbound = &stats[&RTCStatsType::InboundRTP][0];
        assert_eq!(inbound.fields["jitter"], "0.004");
        assert_eq!(inbound.fields["packetsLost"], NA);
        assert_eq!(inbound.fields["type"], "inbound-rtp");

        let pair = &stats[&RTCStatsType::CandidatePair][0];
        assert_eq!(pair.fields["nominated"], "true");

        let stream = &stats[&RTCStatsType::Stream][0];
        assert_eq!(stream.fields["trackIds"], "t1,t2");
    }

    #[test]
    fn test_parse_synthesizes_missing_id() {
        let stats = StatRecordParser::new().parse(&entries());
        assert_eq!(stats[&RTCStatsType::Track][0].id, "track_8");
    }

    #[test]
    fn test_parse_skips_malformed_record_only() {
        let stats = StatRecordParser::new().parse(&entries());
        assert!(!stats.contains_key(&RTCStatsType::Transport));
        assert_eq!(stats.values().map(Vec::len).sum::<usize>(), 5);
    }

    #[test]
    fn test_parse_with_allow_list() {
        let parser =
            StatRecordParser::with_allowed([RTCStatsType::CandidatePair, RTCStatsType::InboundRTP]);
        let stats = parser.parse(&entries());

        let keys: Vec<_> = stats.keys().cloned().collect();
        assert_eq!(
            keys,
            vec![RTCStatsType::InboundRTP, RTCStatsType::CandidatePair]
        );
    }

    #[test]
    fn test_parse_with_empty_allow_list() {
        let parser = StatRecordParser::with_allowed(Vec::<RTCStatsType>::new());
        assert!(parser.parse(&entries()).is_empty());
    }

    #[test]
    fn test_unknown_type_is_never_accepted() {
        let parser = StatRecordParser::with_allowed([RTCStatsType::from("media-playout")]);
        assert!(!parser.accepts(&RTCStatsType::from("media-playout")));
        assert!(parser.parse(&entries()).is_empty());
    }

    #[test]
    fn test_parse_snapshot_reads_sdp_and_timestamp() {
        let raw = RawSnapshot {
            timestamp: Some(json!(1.536834943435E12)),
            stats: entries(),
            offer: Some(json!({"type": "offer", "sdp": "v=0"})),
            answer: Some(json!("unknown")),
        };
        let snapshot = StatRecordParser::new().parse_snapshot(&raw);

        assert_eq!(snapshot.timestamp, Some(1_536_834_943_435.0));
        let sdp = snapshot.sdp.unwrap();
        assert_eq!(sdp.offer.unwrap().sdp, "v=0");
        assert!(sdp.answer.is_none());
    }

    #[test]
    fn test_parse_json_series() {
        let json = r#"[
            {"stats": [{"type": "candidate-pair", "id": "p", "state": "succeeded"}]},
            {"stats": [{"type": "candidate-pair", "id": "p", "state": "succeeded"}]}
        ]"#;
        let series = StatRecordParser::new().parse_json(json).unwrap();
        assert_eq!(series.len(), 2);
        assert!(!series.is_allow_listed());

        let series = StatRecordParser::with_allowed([RTCStatsType::Codec])
            .parse_json(json)
            .unwrap();
        assert!(series.is_allow_listed());
        assert!(series.iter().all(|s| s.stats.is_empty()));
    }
}
