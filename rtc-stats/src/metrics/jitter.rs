use super::{UNAVAILABLE, require_snapshots};
use crate::error::Result;
use crate::snapshot::Series;
use crate::stats::RTCStatsType;
use crate::stats::rtp_stream::RtpCodecKind;
use log::warn;

const METRIC: &str = "audio jitter";

/// Average inbound audio jitter in milliseconds.
///
/// Every inbound audio stream of every snapshot that reports a numeric
/// `jitter` contributes one sample. Returns [`UNAVAILABLE`] when there is no
/// sample.
///
/// # Errors
///
/// [`Error::InsufficientData`](crate::error::Error::InsufficientData) with
/// fewer than two snapshots.
pub fn compute_audio_jitter(series: &Series) -> Result<f64> {
    require_snapshots(METRIC, 2, series.len())?;

    let mut sum = 0.0;
    let mut count = 0usize;
    for snapshot in series.iter() {
        for stream in snapshot.rtp_streams(&RTCStatsType::InboundRTP, RtpCodecKind::Audio) {
            match stream.jitter() {
                Ok(Some(jitter)) if jitter.is_finite() => {
                    sum += 1000.0 * jitter;
                    count += 1;
                }
                Ok(_) => {}
                Err(err) => warn!("{METRIC}: {err}, skipping sample"),
            }
        }
    }

    if count == 0 {
        return Ok(UNAVAILABLE);
    }
    Ok(sum / count as f64)
}
