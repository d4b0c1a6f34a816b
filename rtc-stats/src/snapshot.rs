//! Snapshots and series of classified statistics.
//!
//! A [`RawSnapshot`] is what a sampling collaborator hands over for one tick:
//! the flat `getStats()` entry list and, for the first tick, the captured
//! session descriptions. [`StatRecordParser`](crate::parser::StatRecordParser)
//! turns it into a [`Snapshot`], and a monitoring window of snapshots forms a
//! [`Series`].
//!
//! A [`Series`] exposes two independent views: [`Series::raw_dump`] for
//! archival, and the metric reducers in [`crate::metrics`].

use crate::error::Result;
use crate::sdp::SessionDescriptionPair;
use crate::selector::select_active_pair;
use crate::stats::ice_candidate_pair::RTCIceCandidatePairStats;
use crate::stats::rtp_stream::{RTCRtpStreamStats, RtpCodecKind};
use crate::stats::{RTCStatsType, StatRecord};
use ::serde::ser::SerializeMap;
use ::serde::{Deserialize, Serialize, Serializer};
use log::warn;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};

/// One unparsed sampling tick.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSnapshot {
    /// Capture time of the tick, if the collaborator recorded one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Value>,
    /// The flat `getStats()` entries, each carrying a `type` discriminator.
    #[serde(default)]
    pub stats: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSeriesRepr {
    List(Vec<RawSnapshot>),
    Wrapped { snapshots: Vec<RawSnapshot> },
}

impl From<RawSeriesRepr> for RawSeries {
    fn from(repr: RawSeriesRepr) -> Self {
        match repr {
            RawSeriesRepr::List(snapshots) | RawSeriesRepr::Wrapped { snapshots } => {
                RawSeries { snapshots }
            }
        }
    }
}

/// The unparsed ticks of one monitoring window.
///
/// Decodes either from a bare JSON array of snapshots or from
/// `{"snapshots": [...]}`.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSeriesRepr")]
pub struct RawSeries {
    pub snapshots: Vec<RawSnapshot>,
}

impl RawSeries {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// One sampled instant of classified statistics.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Snapshot {
    /// Capture time in epoch milliseconds, if known.
    pub timestamp: Option<f64>,
    pub stats: BTreeMap<RTCStatsType, Vec<StatRecord>>,
    pub sdp: Option<SessionDescriptionPair>,
}

impl Snapshot {
    /// Records of one category, in the order they were reported.
    pub fn records(&self, typ: &RTCStatsType) -> &[StatRecord] {
        self.stats.get(typ).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn categories(&self) -> impl Iterator<Item = &RTCStatsType> {
        self.stats.keys()
    }

    pub fn candidate_pairs(&self) -> &[StatRecord] {
        self.records(&RTCStatsType::CandidatePair)
    }

    /// The candidate pair carrying media at this tick, if any.
    pub fn active_candidate_pair(&self) -> Option<RTCIceCandidatePairStats<'_>> {
        select_active_pair(self.candidate_pairs())
    }

    /// RTP streams of `typ` (`inbound-rtp` or `outbound-rtp`) carrying `kind`.
    pub fn rtp_streams(
        &self,
        typ: &RTCStatsType,
        kind: RtpCodecKind,
    ) -> impl Iterator<Item = RTCRtpStreamStats<'_>> {
        self.records(typ)
            .iter()
            .map(RTCRtpStreamStats::new)
            .filter(move |s| s.kind() == Some(kind))
    }

    /// The first RTP stream of `typ` carrying `kind`.
    pub fn rtp_stream(&self, typ: &RTCStatsType, kind: RtpCodecKind) -> Option<RTCRtpStreamStats<'_>> {
        self.rtp_streams(typ, kind).next()
    }
}

/// Records of one category keyed by id.
///
/// A repeated id is dumped as `{id}#1`, `{id}#2`, ... so no record is lost.
struct RecordsById<'a>(&'a [StatRecord]);

impl Serialize for RecordsById<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        let mut seen: HashSet<Cow<'_, str>> = HashSet::with_capacity(self.0.len());
        for record in self.0 {
            let mut key = Cow::Borrowed(record.id.as_str());
            let mut n = 0;
            while seen.contains(&key) {
                n += 1;
                key = Cow::Owned(format!("{}#{n}", record.id));
            }
            if n > 0 {
                warn!("duplicate {} id {:?} dumped as {key:?}", record.typ, record.id);
            }
            map.serialize_entry(&key, &record.fields)?;
            seen.insert(key);
        }
        map.end()
    }
}

/// Serializes as `{category: {id: {field: value}}}`.
impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.stats.len()))?;
        for (typ, records) in &self.stats {
            map.serialize_entry(typ, &RecordsById(records))?;
        }
        map.end()
    }
}

/// The ordered snapshots of one monitored connection.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Series {
    snapshots: Vec<Snapshot>,
    allow_listed: bool,
}

impl Series {
    pub fn new(snapshots: Vec<Snapshot>) -> Self {
        Self {
            snapshots,
            allow_listed: false,
        }
    }

    pub(crate) fn with_allow_list(snapshots: Vec<Snapshot>, allow_listed: bool) -> Self {
        Self {
            snapshots,
            allow_listed,
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.snapshots.iter()
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn first(&self) -> Option<&Snapshot> {
        self.snapshots.first()
    }

    pub fn last(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    /// Whether the series was parsed with a category allow-list.
    pub fn is_allow_listed(&self) -> bool {
        self.allow_listed
    }

    /// Session descriptions captured with the first snapshot.
    pub fn session_descriptions(&self) -> Option<&SessionDescriptionPair> {
        self.first().and_then(|s| s.sdp.as_ref())
    }

    /// The full classified dump of every snapshot, for archival.
    pub fn raw_dump(&self) -> RawDump<'_> {
        RawDump {
            sdp: if self.allow_listed {
                None
            } else {
                self.session_descriptions()
            },
            stats_array: &self.snapshots,
        }
    }
}

/// Archival view of a [`Series`].
///
/// Session descriptions are only included when the series was not
/// restricted by an allow-list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawDump<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sdp: Option<&'a SessionDescriptionPair>,
    #[serde(rename = "statsArray")]
    pub stats_array: &'a [Snapshot],
}
