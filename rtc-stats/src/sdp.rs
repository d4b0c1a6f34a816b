//! Offer/answer session descriptions captured alongside the first snapshot.

use ::serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Marker a capture script returns when a description is not set yet.
const UNKNOWN_DESCRIPTION: &str = "unknown";

const SDP_TYPE_OFFER_STR: &str = "offer";
const SDP_TYPE_PRANSWER_STR: &str = "pranswer";
const SDP_TYPE_ANSWER_STR: &str = "answer";
const SDP_TYPE_ROLLBACK_STR: &str = "rollback";
const SDP_TYPE_UNSPECIFIED_STR: &str = "unspecified";

/// Describes the type of a session description in the SDP offer/answer model.
#[derive(Default, Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
pub enum RTCSdpType {
    #[default]
    #[serde(rename = "unspecified")]
    Unspecified,
    #[serde(rename = "offer")]
    Offer,
    #[serde(rename = "pranswer")]
    Pranswer,
    #[serde(rename = "answer")]
    Answer,
    #[serde(rename = "rollback")]
    Rollback,
}

/// creates an SDPType from a string
impl From<&str> for RTCSdpType {
    fn from(raw: &str) -> Self {
        match raw {
            SDP_TYPE_OFFER_STR => RTCSdpType::Offer,
            SDP_TYPE_PRANSWER_STR => RTCSdpType::Pranswer,
            SDP_TYPE_ANSWER_STR => RTCSdpType::Answer,
            SDP_TYPE_ROLLBACK_STR => RTCSdpType::Rollback,
            _ => RTCSdpType::Unspecified,
        }
    }
}

impl fmt::Display for RTCSdpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            RTCSdpType::Offer => write!(f, "{SDP_TYPE_OFFER_STR}"),
            RTCSdpType::Pranswer => write!(f, "{SDP_TYPE_PRANSWER_STR}"),
            RTCSdpType::Answer => write!(f, "{SDP_TYPE_ANSWER_STR}"),
            RTCSdpType::Rollback => write!(f, "{SDP_TYPE_ROLLBACK_STR}"),
            RTCSdpType::Unspecified => write!(f, "{SDP_TYPE_UNSPECIFIED_STR}"),
        }
    }
}

/// A session description as read back from the peer connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RTCSessionDescription {
    #[serde(rename = "type")]
    pub sdp_type: RTCSdpType,
    pub sdp: String,
}

impl RTCSessionDescription {
    /// Reads a captured description.
    ///
    /// Returns `None` for `null`, for the `"unknown"` marker and for any shape
    /// without an `sdp` string.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(map) => {
                let sdp = map.get("sdp")?.as_str()?.to_string();
                let sdp_type = map
                    .get("type")
                    .and_then(Value::as_str)
                    .map(RTCSdpType::from)
                    .unwrap_or_default();
                Some(Self { sdp_type, sdp })
            }
            Value::String(s) if s != UNKNOWN_DESCRIPTION => {
                log::debug!("ignoring session description given as bare string");
                None
            }
            _ => None,
        }
    }
}

/// The remote offer and local answer of one monitored connection.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescriptionPair {
    pub offer: Option<RTCSessionDescription>,
    pub answer: Option<RTCSessionDescription>,
}

impl SessionDescriptionPair {
    pub fn is_empty(&self) -> bool {
        self.offer.is_none() && self.answer.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sdp_type_from_str() {
        assert_eq!(RTCSdpType::from("offer"), RTCSdpType::Offer);
        assert_eq!(RTCSdpType::from("pranswer"), RTCSdpType::Pranswer);
        assert_eq!(RTCSdpType::from("answer"), RTCSdpType::Answer);
        assert_eq!(RTCSdpType::from("rollback"), RTCSdpType::Rollback);
        assert_eq!(RTCSdpType::from("what"), RTCSdpType::Unspecified);
        assert_eq!(RTCSdpType::Answer.to_string(), "answer");
    }

    #[test]
    fn test_description_from_value() {
        let desc = RTCSessionDescription::from_value(&json!({
            "type": "offer",
            "sdp": "v=0\r\n"
        }))
        .unwrap();
        assert_eq!(desc.sdp_type, RTCSdpType::Offer);
        assert_eq!(desc.sdp, "v=0\r\n");

        assert!(RTCSessionDescription::from_value(&json!("unknown")).is_none());
        assert!(RTCSessionDescription::from_value(&Value::Null).is_none());
        assert!(RTCSessionDescription::from_value(&json!({"type": "answer"})).is_none());
    }

    #[test]
    fn test_description_serializes_type_key() {
        let desc = RTCSessionDescription {
            sdp_type: RTCSdpType::Answer,
            sdp: "v=0".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&desc).unwrap(),
            json!({"type": "answer", "sdp": "v=0"})
        );
    }
}
