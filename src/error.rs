use thiserror::Error;

use crate::settings::{DatabaseType, Metric};

/// Failure of a single load or save round trip with the backend.
///
/// Neither kind is retried automatically; the caller decides what to do.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The request could not be sent, or the backend answered with a non-2xx status.
    #[error("network failure: {0}")]
    Network(String),

    /// The response body did not parse into a well-formed settings value.
    #[error("decode failure: {0}")]
    Decode(String),
}

impl SyncError {
    pub fn kind(&self) -> &'static str {
        match self {
            SyncError::Network(_) => "network_failure",
            SyncError::Decode(_) => "decode_failure",
        }
    }
}

/// A metric was requested that is not in the current database's domain.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("metric {metric} is not available for database {database}")]
pub struct InvalidMetric {
    pub metric: Metric,
    pub database: DatabaseType,
}
