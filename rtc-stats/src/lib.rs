//! # rtc-stats
//!
//! Aggregation of WebRTC `getStats()` telemetry into quality-of-service
//! metrics.
//!
//! A sampling collaborator (a browser driver, a test harness, a native peer
//! connection) calls `getStats()` at a fixed interval over a monitoring
//! window and hands the ticks over as one document. This crate turns that
//! document into a flat report of bitrate, jitter, round trip time, packet
//! loss and cumulative bytes, suitable for automated assertions and
//! archival.
//!
//! ## Pipeline
//!
//! ```text
//! RawSeries ──▶ StatRecordParser ──▶ Series ──▶ metrics ──▶ ReportBuilder ──▶ Report
//!                                      │            ▲
//!                                      │   select_active_pair
//!                                      └──▶ raw dump (archival)
//! ```
//!
//! - [`StatRecordParser`] classifies the loosely typed entries of each tick
//!   into [`RTCStatsType`] categories, dropping unknown types and skipping
//!   malformed records
//! - [`select_active_pair`](selector::select_active_pair) picks the candidate
//!   pair carrying media in one snapshot
//! - the reducers in [`metrics`] are pure functions over a [`Series`]
//! - [`ReportBuilder`] assembles the reducers' results into a [`Report`]
//!
//! ## No data is not zero
//!
//! Collectors report unavailable values as `"NA"` or leave them out. Field
//! access goes through [`Field`](stats::Field) and `Option`, so such values
//! are never read as `0`. A metric without any usable sample is reported as
//! `-1`.
//!
//! ## Quick Start
//!
//! ```rust
//! use rtc_stats::{DirectionScope, ReportBuilder, ReportConfig};
//!
//! let json = r#"{"snapshots": [
//!     {"timestamp": 1536834943435, "stats": [
//!         {"type": "candidate-pair", "id": "CP_1", "state": "succeeded",
//!          "bytesReceived": 1000, "currentRoundTripTime": 0.5},
//!         {"type": "inbound-rtp", "id": "IA_1", "kind": "audio",
//!          "packetsReceived": 40, "packetsLost": 0, "jitter": 0.25}
//!     ]},
//!     {"timestamp": 1536834944435, "stats": [
//!         {"type": "candidate-pair", "id": "CP_1", "state": "succeeded",
//!          "bytesReceived": 3000, "currentRoundTripTime": "NA"},
//!         {"type": "inbound-rtp", "id": "IA_1", "kind": "audio",
//!          "packetsReceived": 98, "packetsLost": 2, "jitter": 0.25}
//!     ]}
//! ]}"#;
//!
//! let builder = ReportBuilder::new(ReportConfig::default().with_direction(DirectionScope::In));
//! let series = builder.parse_json(json)?;
//! let report = builder.build(&series);
//!
//! let value: serde_json::Value = serde_json::from_str(&report.to_json()?)?;
//! assert_eq!(value["avgReceivedBitrate (bps)"], 16000);
//! assert_eq!(value["currentRoundTripTime (ms)"], 500.0);
//! assert_eq!(value["audioJitter (ms)"], 250.0);
//! assert_eq!(value["audioPacketsLoss (%)"], "0.020");
//! assert_eq!(value["videoPacketsLoss (%)"], -1);
//! assert!(value.get("avgSentBitrate (bps)").is_none());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod metrics;
pub mod parser;
pub mod report;
pub mod sdp;
pub mod selector;
pub mod snapshot;
pub mod stats;

#[cfg(test)]
mod fixtures;

pub use config::{DirectionScope, ReportConfig};
pub use error::{Error, ErrorKind, Result};
pub use metrics::{Direction, MediaType, RoundTripTimeKind, UNAVAILABLE};
pub use parser::StatRecordParser;
pub use report::{CallReport, ExtractedStats, MetricValue, Report, ReportBuilder};
pub use snapshot::{RawSeries, RawSnapshot, Series, Snapshot};
pub use stats::{RTCStatsType, StatRecord};
