//! Error types for RateVault operations.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur in the rate store and cache service.
#[derive(Debug, Error)]
pub enum RateError {
    /// No record stored for the requested day.
    #[error("no rate stored for {0}")]
    NotFound(NaiveDate),

    /// A day string that does not parse as an ISO calendar day.
    #[error("invalid date {input:?}: {source}")]
    InvalidDate {
        input: String,
        source: chrono::ParseError,
    },

    /// The remote source failed at the transport level or answered with
    /// a non-success status.
    #[error("rate source error: {0}")]
    Source(String),
}

impl RateError {
    /// Whether retrying the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RateError::Source(_))
    }
}

/// Result type alias for RateVault operations.
pub type RateResult<T> = Result<T, RateError>;
