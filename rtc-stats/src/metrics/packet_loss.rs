use super::{MediaType, UNAVAILABLE, require_snapshots};
use crate::error::Result;
use crate::snapshot::Series;
use crate::stats::RTCStatsType;
use log::{debug, warn};

const METRIC: &str = "packets loss";

/// Fraction of inbound packets lost, from the last snapshot only.
///
/// `packetsLost / (packetsReceived + packetsLost)` of the first inbound
/// stream of the given kind, truncated to whole per-mille. Counters are
/// cumulative, so the last reading covers the whole window. A negative
/// `packetsLost`, reported when duplicates outnumber losses, counts as no
/// loss. Returns [`UNAVAILABLE`] when either counter is
/// missing or non-numeric, when the total is not positive, and for
/// [`MediaType::CandidatePair`], which has no inbound stream.
///
/// # Errors
///
/// [`Error::InsufficientData`](crate::error::Error::InsufficientData) for an
/// empty series.
pub fn compute_packets_loss(series: &Series, media: MediaType) -> Result<f64> {
    require_snapshots(METRIC, 1, series.len())?;

    let Some(kind) = media.codec_kind() else {
        return Ok(UNAVAILABLE);
    };
    let Some(stream) = series
        .last()
        .and_then(|s| s.rtp_stream(&RTCStatsType::InboundRTP, kind))
    else {
        debug!("{METRIC}: no inbound {kind} stream in the last snapshot");
        return Ok(UNAVAILABLE);
    };

    let counters = stream
        .packets_received()
        .and_then(|received| Ok((received, stream.packets_lost()?)));
    let (received, lost) = match counters {
        Ok((Some(received), Some(lost))) => (received, lost),
        Ok(_) => return Ok(UNAVAILABLE),
        Err(err) => {
            warn!("{METRIC}: {err}");
            return Ok(UNAVAILABLE);
        }
    };

    let lost = lost.max(0);
    let total = received.saturating_add(lost);
    if total <= 0 {
        return Ok(UNAVAILABLE);
    }
    let per_mille = lost.saturating_mul(1000) / total;
    Ok(per_mille as f64 / 1000.0)
}
