use super::{Direction, MediaType, UNAVAILABLE, require_snapshots};
use crate::error::{Error, Result};
use crate::snapshot::{Series, Snapshot};
use crate::stats::RTCStatsType;
use log::{debug, warn};

const METRIC: &str = "bitrate";

/// Average bitrate in bit/s over the whole series.
///
/// Reads `bytesSent` or `bytesReceived` from the active candidate pair
/// ([`MediaType::CandidatePair`]) or from the first `inbound-rtp` /
/// `outbound-rtp` stream of the given kind. The byte span is the observed
/// maximum minus the observed minimum, so one out-of-order sample does not
/// distort the result.
///
/// Both ends of the time span are read from the same clock, in order of
/// preference:
///
/// 1. the record timestamps of the first and last snapshot;
/// 2. the capture times of the first and last snapshot;
/// 3. the record timestamps of the first and last snapshot that produced a
///    byte sample.
///
/// Returns [`UNAVAILABLE`] when no byte sample exists or when none of these
/// spans is available.
///
/// # Errors
///
/// [`Error::InsufficientData`] with fewer than two snapshots, and
/// [`Error::DivisionUndefined`] when both ends of the span coincide.
pub fn compute_bitrate(series: &Series, direction: Direction, media: MediaType) -> Result<f64> {
    require_snapshots(METRIC, 2, series.len())?;

    let samples: Vec<Sample> = series
        .iter()
        .map(|snapshot| Sample::read(snapshot, direction, media))
        .collect();

    let range = samples
        .iter()
        .filter_map(|s| s.bytes)
        .fold(None::<(u64, u64)>, |range, b| match range {
            Some((lo, hi)) => Some((b.min(lo), b.max(hi))),
            None => Some((b, b)),
        });
    let Some((min, max)) = range else {
        debug!("{METRIC}: no {} sample for {media}", direction.bytes_field());
        return Ok(UNAVAILABLE);
    };
    let Some((first, last)) = time_span(series, &samples) else {
        warn!("{METRIC}: no time span on a single clock for {media}");
        return Ok(UNAVAILABLE);
    };
    if first == last {
        return Err(Error::DivisionUndefined {
            metric: METRIC,
            timestamp: first,
        });
    }

    Ok((8000.0 * (max - min) as f64 / (last - first)).abs())
}

/// The byte counter and record timestamp selected in one snapshot.
struct Sample {
    bytes: Option<u64>,
    timestamp: Option<f64>,
}

impl Sample {
    fn read(snapshot: &Snapshot, direction: Direction, media: MediaType) -> Self {
        let (bytes, timestamp) = match media.codec_kind() {
            None => match snapshot.active_candidate_pair() {
                Some(pair) => (pair.bytes(direction), pair.timestamp_ms()),
                None => return Self::EMPTY,
            },
            Some(kind) => {
                let typ = match direction {
                    Direction::In => RTCStatsType::InboundRTP,
                    Direction::Out => RTCStatsType::OutboundRTP,
                };
                match snapshot.rtp_stream(&typ, kind) {
                    Some(stream) => (stream.bytes(direction), stream.timestamp_ms()),
                    None => return Self::EMPTY,
                }
            }
        };

        Self {
            bytes: bytes.unwrap_or_else(|err| {
                warn!("{METRIC}: {err}, skipping sample");
                None
            }),
            timestamp: timestamp.unwrap_or_else(|err| {
                warn!("{METRIC}: {err}, ignoring record timestamp");
                None
            }),
        }
    }

    const EMPTY: Sample = Sample {
        bytes: None,
        timestamp: None,
    };
}

fn time_span(series: &Series, samples: &[Sample]) -> Option<(f64, f64)> {
    if let (Some(first), Some(last)) = (samples.first()?.timestamp, samples.last()?.timestamp) {
        return Some((first, last));
    }
    if let (Some(first), Some(last)) = (series.first()?.timestamp, series.last()?.timestamp) {
        return Some((first, last));
    }
    let mut sampled = samples
        .iter()
        .filter(|s| s.bytes.is_some())
        .filter_map(|s| s.timestamp);
    let first = sampled.next()?;
    let last = sampled.last()?;
    Some((first, last))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::fixtures::{inbound, outbound, pair, series};

    #[test]
    fn test_bitrate_needs_two_snapshots() {
        let s = series(vec![vec![pair(
            "p",
            &[("state", "succeeded"), ("bytesSent", "1000"), ("timestamp", "0")],
        )]]);
        let err = compute_bitrate(&s, Direction::Out, MediaType::CandidatePair).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);

        let err = compute_bitrate(&series(vec![]), Direction::Out, MediaType::CandidatePair)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
    }

    #[test]
    fn test_bitrate_candidate_pair() {
        let s = series(vec![
            vec![pair(
                "p",
                &[("state", "succeeded"), ("bytesSent", "1000"), ("timestamp", "0")],
            )],
            vec![pair(
                "p",
                &[("state", "succeeded"), ("bytesSent", "2000"), ("timestamp", "1000")],
            )],
        ]);
        assert_eq!(
            compute_bitrate(&s, Direction::Out, MediaType::CandidatePair).unwrap(),
            8000.0
        );
    }

    #[test]
    fn test_bitrate_uses_min_max_not_first_last() {
        let s = series(vec![
            vec![pair(
                "p",
                &[("state", "succeeded"), ("bytesReceived", "1500"), ("timestamp", "0")],
            )],
            vec![pair(
                "p",
                &[("state", "succeeded"), ("bytesReceived", "1000"), ("timestamp", "1000")],
            )],
            vec![pair(
                "p",
                &[("state", "succeeded"), ("bytesReceived", "3000"), ("timestamp", "2000")],
            )],
        ]);
        // (3000 - 1000) bytes over 2 s
        assert_eq!(
            compute_bitrate(&s, Direction::In, MediaType::CandidatePair).unwrap(),
            8000.0
        );
    }

    #[test]
    fn test_bitrate_rtp_stream_by_kind() {
        let s = series(vec![
            vec![
                inbound("a", &[("kind", "audio"), ("bytesReceived", "0"), ("timestamp", "1000")]),
                inbound("v", &[("kind", "video"), ("bytesReceived", "0"), ("timestamp", "1000")]),
            ],
            vec![
                inbound("a", &[("kind", "audio"), ("bytesReceived", "4000"), ("timestamp", "2000")]),
                inbound("v", &[("kind", "video"), ("bytesReceived", "125000"), ("timestamp", "2000")]),
            ],
        ]);
        assert_eq!(
            compute_bitrate(&s, Direction::In, MediaType::Audio).unwrap(),
            32000.0
        );
        assert_eq!(
            compute_bitrate(&s, Direction::In, MediaType::Video).unwrap(),
            1_000_000.0
        );
        // no outbound streams at all
        assert_eq!(
            compute_bitrate(&s, Direction::Out, MediaType::Video).unwrap(),
            UNAVAILABLE
        );
    }

    #[test]
    fn test_bitrate_zero_time_span() {
        let s = series(vec![
            vec![outbound("o", &[("kind", "video"), ("bytesSent", "10"), ("timestamp", "5")])],
            vec![outbound("o", &[("kind", "video"), ("bytesSent", "20"), ("timestamp", "5")])],
        ]);
        let err = compute_bitrate(&s, Direction::Out, MediaType::Video).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DivisionUndefined);
    }

    #[test]
    fn test_bitrate_skips_malformed_and_unavailable_samples() {
        let s = series(vec![
            vec![pair(
                "p",
                &[("state", "succeeded"), ("bytesSent", "1000"), ("timestamp", "0")],
            )],
            vec![pair(
                "p",
                &[("state", "succeeded"), ("bytesSent", "garbage"), ("timestamp", "500")],
            )],
            vec![pair(
                "p",
                &[("state", "succeeded"), ("bytesSent", "NA"), ("timestamp", "750")],
            )],
            vec![pair(
                "p",
                &[("state", "succeeded"), ("bytesSent", "2000"), ("timestamp", "1000")],
            )],
        ]);
        assert_eq!(
            compute_bitrate(&s, Direction::Out, MediaType::CandidatePair).unwrap(),
            8000.0
        );
    }

    #[test]
    fn test_bitrate_without_active_pair_uses_snapshot_time() {
        let mut s = series(vec![
            vec![pair("p", &[("state", "failed"), ("bytesSent", "999")])],
            vec![pair("p", &[("state", "succeeded"), ("bytesSent", "1000")])],
            vec![pair("p", &[("state", "succeeded"), ("bytesSent", "2000")])],
        ]);
        let snapshots: Vec<_> = s
            .iter()
            .cloned()
            .zip([0.0, 500.0, 1000.0])
            .map(|(mut snap, ts)| {
                snap.timestamp = Some(ts);
                snap
            })
            .collect();
        s = Series::new(snapshots);

        assert_eq!(
            compute_bitrate(&s, Direction::Out, MediaType::CandidatePair).unwrap(),
            8000.0
        );
    }

    #[test]
    fn test_bitrate_span_never_mixes_clocks() {
        // capture clock on the first tick only, record clock from the second
        let mut s = series(vec![
            vec![pair("p", &[("state", "failed"), ("bytesSent", "999")])],
            vec![pair(
                "p",
                &[("state", "succeeded"), ("bytesSent", "1000"), ("timestamp", "1000")],
            )],
            vec![pair(
                "p",
                &[("state", "succeeded"), ("bytesSent", "2000"), ("timestamp", "2000")],
            )],
        ]);
        let mut snapshots: Vec<_> = s.iter().cloned().collect();
        snapshots[0].timestamp = Some(5_000_000.0);
        s = Series::new(snapshots);

        assert_eq!(
            compute_bitrate(&s, Direction::Out, MediaType::CandidatePair).unwrap(),
            8000.0
        );
    }

    #[test]
    fn test_bitrate_prefers_record_clock_of_first_and_last_snapshot() {
        let mut s = series(vec![
            vec![outbound("o", &[("kind", "audio"), ("bytesSent", "0"), ("timestamp", "0")])],
            vec![outbound("o", &[("kind", "audio"), ("bytesSent", "4000"), ("timestamp", "1000")])],
        ]);
        let snapshots: Vec<_> = s
            .iter()
            .cloned()
            .zip([7.0, 9.0])
            .map(|(mut snap, ts)| {
                snap.timestamp = Some(ts);
                snap
            })
            .collect();
        s = Series::new(snapshots);

        assert_eq!(
            compute_bitrate(&s, Direction::Out, MediaType::Audio).unwrap(),
            32000.0
        );
    }

    #[test]
    fn test_bitrate_single_timed_sample_is_unavailable() {
        let s = series(vec![
            vec![pair("p", &[("state", "failed")])],
            vec![pair(
                "p",
                &[("state", "succeeded"), ("bytesSent", "2000"), ("timestamp", "2000")],
            )],
        ]);
        assert_eq!(
            compute_bitrate(&s, Direction::Out, MediaType::CandidatePair).unwrap(),
            UNAVAILABLE
        );
    }

    #[test]
    fn test_bitrate_without_timestamps_is_unavailable() {
        let s = series(vec![
            vec![pair("p", &[("state", "succeeded"), ("bytesSent", "1000")])],
            vec![pair("p", &[("state", "succeeded"), ("bytesSent", "2000")])],
        ]);
        assert_eq!(
            compute_bitrate(&s, Direction::Out, MediaType::CandidatePair).unwrap(),
            UNAVAILABLE
        );
    }
}
