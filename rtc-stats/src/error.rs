use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// The coarse failure classes a caller can branch on.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Fewer snapshots than the metric needs.
    InsufficientData,
    /// A single stat record (or one of its fields) could not be interpreted.
    MalformedRecord,
    /// A rate was requested over a zero-length time window.
    DivisionUndefined,
    /// The raw input document could not be decoded at all.
    Decode,
    /// A configuration value was not recognized.
    Config,
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("{metric}: needs at least {required} snapshot(s), got {actual}")]
    InsufficientData {
        metric: &'static str,
        required: usize,
        actual: usize,
    },
    #[error("malformed stat record {id}: field `{field}` {reason}")]
    MalformedRecord {
        id: String,
        field: String,
        reason: String,
    },
    #[error("{metric}: first and last timestamps are both {timestamp} ms")]
    DivisionUndefined {
        metric: &'static str,
        timestamp: f64,
    },
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid {what}: {value:?}")]
    InvalidConfig { what: &'static str, value: String },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InsufficientData { .. } => ErrorKind::InsufficientData,
            Error::MalformedRecord { .. } => ErrorKind::MalformedRecord,
            Error::DivisionUndefined { .. } => ErrorKind::DivisionUndefined,
            Error::Json(_) => ErrorKind::Decode,
            Error::InvalidConfig { .. } => ErrorKind::Config,
        }
    }

    pub(crate) fn malformed(id: &str, field: &str, reason: impl Into<String>) -> Self {
        Error::MalformedRecord {
            id: id.to_string(),
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
