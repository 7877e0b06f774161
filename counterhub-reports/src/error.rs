//! Report conversion error types.

use counterhub_core::HarvestError;
use thiserror::Error;

/// Errors raised while converting a payload into a report file.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The payload did not have the shape its release requires.
    #[error("Normalization error: {0}")]
    Normalization(String),

    /// The canonical report could not be laid out.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ReportError {
    /// Builds a normalization error with a location prefix.
    pub fn shape(context: &str, detail: impl std::fmt::Display) -> Self {
        ReportError::Normalization(format!("{context}: {detail}"))
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(e: serde_json::Error) -> Self {
        ReportError::Normalization(e.to_string())
    }
}

impl From<ReportError> for HarvestError {
    fn from(e: ReportError) -> Self {
        match e {
            ReportError::Normalization(message) => HarvestError::Normalization { message },
            ReportError::Serialization(message) => HarvestError::Serialization { message },
        }
    }
}
