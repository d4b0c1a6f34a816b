//! Builders shared by the unit tests.

use crate::snapshot::{Series, Snapshot};
use crate::stats::{RTCStatsType, StatRecord};
use std::collections::BTreeMap;

pub(crate) fn record(typ: RTCStatsType, id: &str, fields: &[(&str, &str)]) -> StatRecord {
    StatRecord::new(
        typ,
        id,
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

pub(crate) fn pair(id: &str, fields: &[(&str, &str)]) -> StatRecord {
    record(RTCStatsType::CandidatePair, id, fields)
}

pub(crate) fn inbound(id: &str, fields: &[(&str, &str)]) -> StatRecord {
    record(RTCStatsType::InboundRTP, id, fields)
}

pub(crate) fn outbound(id: &str, fields: &[(&str, &str)]) -> StatRecord {
    record(RTCStatsType::OutboundRTP, id, fields)
}

pub(crate) fn snapshot(records: Vec<StatRecord>) -> Snapshot {
    let mut stats: BTreeMap<RTCStatsType, Vec<StatRecord>> = BTreeMap::new();
    for r in records {
        stats.entry(r.typ.clone()).or_default().push(r);
    }
    Snapshot {
        timestamp: None,
        stats,
        sdp: None,
    }
}

pub(crate) fn series(snapshots: Vec<Vec<StatRecord>>) -> Series {
    Series::new(snapshots.into_iter().map(snapshot).collect())
}
