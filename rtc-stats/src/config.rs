//! Configuration of a report.
//!
//! [`ReportConfig`] scopes what a [`ReportBuilder`](crate::report::ReportBuilder)
//! computes and emits.
//!
//! ```rust
//! use rtc_stats::{DirectionScope, MediaType, RTCStatsType, ReportConfig};
//!
//! let config = ReportConfig::default()
//!     .with_direction(DirectionScope::Out)
//!     .with_allowed_stats(vec![RTCStatsType::CandidatePair, RTCStatsType::OutboundRTP])
//!     .with_media_types(vec![MediaType::CandidatePair, MediaType::Video])
//!     .with_include_raw(true);
//! ```
//!
//! The configuration is serde-(de)serializable, so it can be loaded from a
//! JSON file:
//!
//! ```rust
//! use rtc_stats::{DirectionScope, ReportConfig};
//!
//! let config: ReportConfig = serde_json::from_str(r#"{"direction": "in"}"#).unwrap();
//! assert_eq!(config.direction, DirectionScope::In);
//! assert!(!config.include_raw);
//! ```

use crate::error::{Error, Result};
use crate::metrics::{Direction, MediaType};
use crate::parser::StatRecordParser;
use crate::stats::RTCStatsType;
use ::serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default direction scope, both halves of the metrics.
pub(crate) const DEFAULT_DIRECTION: DirectionScope = DirectionScope::Both;

/// Which half of the metrics a report carries.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectionScope {
    /// Receive side only.
    In,
    /// Send side only.
    Out,
    #[default]
    Both,
}

impl DirectionScope {
    pub fn includes(&self, direction: Direction) -> bool {
        match direction {
            Direction::In => self.includes_in(),
            Direction::Out => self.includes_out(),
        }
    }

    pub fn includes_in(&self) -> bool {
        matches!(self, DirectionScope::In | DirectionScope::Both)
    }

    pub fn includes_out(&self) -> bool {
        matches!(self, DirectionScope::Out | DirectionScope::Both)
    }
}

impl From<Direction> for DirectionScope {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::In => DirectionScope::In,
            Direction::Out => DirectionScope::Out,
        }
    }
}

impl FromStr for DirectionScope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("both") {
            return Ok(DirectionScope::Both);
        }
        s.parse::<Direction>()
            .map(DirectionScope::from)
            .map_err(|_| Error::InvalidConfig {
                what: "direction scope",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for DirectionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DirectionScope::In => "in",
            DirectionScope::Out => "out",
            DirectionScope::Both => "both",
        };
        write!(f, "{s}")
    }
}

/// Configuration of a report.
///
/// # Fields
///
/// - `direction`: which half of the metrics to compute (default: both)
/// - `allowed_stats`: categories to materialize while parsing (default: all)
/// - `media_types`: which metric families to compute (default: all)
/// - `include_raw`: whether to nest the classified raw dump (default: false)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportConfig {
    pub direction: DirectionScope,

    /// Categories materialized by the parser.
    ///
    /// `None` materializes every known category. Restricting the categories
    /// shrinks the raw dump; metrics whose inputs were filtered out report
    /// the unavailable sentinel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_stats: Option<Vec<RTCStatsType>>,

    /// Metric families emitted.
    ///
    /// [`MediaType::CandidatePair`] covers round trip times, byte totals and
    /// the transport bitrates; [`MediaType::Audio`] and [`MediaType::Video`]
    /// cover the per-kind bitrates, jitter and packet loss. `None` emits all
    /// of them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_types: Option<Vec<MediaType>>,

    pub include_raw: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            direction: DEFAULT_DIRECTION,
            allowed_stats: None,
            media_types: None,
            include_raw: false,
        }
    }
}

impl ReportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_direction(mut self, direction: DirectionScope) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_allowed_stats(mut self, allowed_stats: Vec<RTCStatsType>) -> Self {
        self.allowed_stats = Some(allowed_stats);
        self
    }

    pub fn with_media_types(mut self, media_types: Vec<MediaType>) -> Self {
        self.media_types = Some(media_types);
        self
    }

    pub fn with_include_raw(mut self, include_raw: bool) -> Self {
        self.include_raw = include_raw;
        self
    }

    /// Whether metrics of `media` are in scope.
    pub fn includes_media(&self, media: MediaType) -> bool {
        self.media_types
            .as_ref()
            .is_none_or(|media_types| media_types.contains(&media))
    }

    /// The parser matching `allowed_stats`.
    pub fn parser(&self) -> StatRecordParser {
        match &self.allowed_stats {
            Some(allowed) => StatRecordParser::with_allowed(allowed.iter().cloned()),
            None => StatRecordParser::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_direction_scope_from_str() {
        assert_eq!("both".parse::<DirectionScope>().unwrap(), DirectionScope::Both);
        assert_eq!("IN".parse::<DirectionScope>().unwrap(), DirectionScope::In);
        assert_eq!(
            "received".parse::<DirectionScope>().unwrap(),
            DirectionScope::In
        );
        assert_eq!("sent".parse::<DirectionScope>().unwrap(), DirectionScope::Out);
        let err = "sideways".parse::<DirectionScope>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert_eq!(err.to_string(), r#"invalid direction scope: "sideways""#);
    }

    #[test]
    fn test_direction_scope_gating() {
        assert!(DirectionScope::Both.includes(Direction::In));
        assert!(DirectionScope::Both.includes(Direction::Out));
        assert!(DirectionScope::In.includes_in());
        assert!(!DirectionScope::In.includes_out());
        assert!(!DirectionScope::Out.includes_in());
        assert_eq!(DirectionScope::Out.to_string(), "out");
    }

    #[test]
    fn test_report_config_builder() {
        let config = ReportConfig::default();
        assert_eq!(config.direction, DirectionScope::Both);
        assert!(config.allowed_stats.is_none());
        assert!(!config.include_raw);
        assert!(!config.parser().is_allow_listed());
        assert!(config.includes_media(MediaType::Audio));
        assert!(config.includes_media(MediaType::CandidatePair));

        let config = ReportConfig::new()
            .with_direction(DirectionScope::In)
            .with_allowed_stats(vec![RTCStatsType::InboundRTP])
            .with_include_raw(true);
        assert_eq!(config.direction, DirectionScope::In);
        assert!(config.include_raw);
        let parser = config.parser();
        assert!(parser.accepts(&RTCStatsType::InboundRTP));
        assert!(!parser.accepts(&RTCStatsType::CandidatePair));
    }

    #[test]
    fn test_report_config_media_types() {
        let config = ReportConfig::default().with_media_types(vec![MediaType::Video]);
        assert!(config.includes_media(MediaType::Video));
        assert!(!config.includes_media(MediaType::Audio));
        assert!(!config.includes_media(MediaType::CandidatePair));

        let config = ReportConfig::default().with_media_types(vec![]);
        for media in [MediaType::Audio, MediaType::Video, MediaType::CandidatePair] {
            assert!(!config.includes_media(media), "{media}");
        }

        let config: ReportConfig =
            serde_json::from_str(r#"{"mediaTypes": ["audio", "candidate-pair"]}"#).unwrap();
        assert_eq!(
            config.media_types,
            Some(vec![MediaType::Audio, MediaType::CandidatePair])
        );
        assert!(serde_json::from_str::<ReportConfig>(r#"{"mediaTypes": ["screen"]}"#).is_err());
    }

    #[test]
    fn test_report_config_serde() {
        let config: ReportConfig = serde_json::from_str(
            r#"{"direction": "out", "allowedStats": ["candidate-pair", "outbound-rtp"], "includeRaw": true}"#,
        )
        .unwrap();
        assert_eq!(
            config,
            ReportConfig::default()
                .with_direction(DirectionScope::Out)
                .with_allowed_stats(vec![RTCStatsType::CandidatePair, RTCStatsType::OutboundRTP])
                .with_include_raw(true)
        );

        let json = serde_json::to_string(&ReportConfig::default()).unwrap();
        assert_eq!(json, r#"{"direction":"both","includeRaw":false}"#);

        assert!(serde_json::from_str::<ReportConfig>(r#"{"direction": "up"}"#).is_err());
    }
}
