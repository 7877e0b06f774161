//! Core error types for `Counterhub`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::ProtocolException;

/// Core error type for `Counterhub` operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Vendor not found or not configured.
    #[error("Vendor not found: {0}")]
    VendorNotFound(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid data, such as a malformed date token.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// IO error reported by a collaborator.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

/// Code carried by the locally constructed timeout error.
pub const TIMEOUT_CODE: i64 = -1;

/// Why a single (vendor, report) call failed.
///
/// Every variant is owned data so a failure can be kept on its
/// [`FetchResult`](crate::FetchResult), written to the run log, and
/// serialized into JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HarvestError {
    /// The vendor never answered (connection refused, DNS, TLS, reset).
    #[error("No response from vendor: {message}")]
    Network {
        /// Transport error description.
        message: String,
    },

    /// An attempt exceeded the configured request timeout.
    #[error("Request timed out after {seconds}s (code {code})")]
    Timeout {
        /// Always [`TIMEOUT_CODE`].
        code: i64,
        /// Configured timeout in seconds.
        seconds: u64,
    },

    /// The vendor embedded a protocol exception in its payload.
    #[error("{0}")]
    ProtocolException(ProtocolException),

    /// Non-success HTTP status without an exception payload.
    #[error("HTTP {status} {status_text}")]
    Http {
        /// Status code.
        status: u16,
        /// Canonical reason phrase.
        status_text: String,
    },

    /// Body could not be parsed as JSON.
    #[error("Malformed payload: {message}")]
    MalformedPayload {
        /// Parser error description.
        message: String,
    },

    /// JSON parsed but had a shape the normalizer does not accept.
    #[error("Normalization failed: {message}")]
    Normalization {
        /// What was unexpected and where.
        message: String,
    },

    /// The canonical report could not be rendered as TSV.
    #[error("Serialization failed: {message}")]
    Serialization {
        /// What went wrong.
        message: String,
    },

    /// The TSV file could not be written.
    #[error("Failed to write {path}")]
    WriteFailed {
        /// Destination path.
        path: String,
    },

    /// Report discovery did not return a list of reports.
    #[error("Report discovery failed")]
    DiscoveryFailed,

    /// The vendor has no connection block for the requested release.
    #[error("Vendor has no connection for release {release}")]
    NotConnected {
        /// Requested release string.
        release: String,
    },

    /// The batch was cancelled before this report was requested.
    #[error("Cancelled before the report was requested")]
    Cancelled,
}

impl HarvestError {
    /// Numeric code for timeouts and protocol exceptions.
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Timeout { code, .. } => Some(*code),
            Self::ProtocolException(e) => Some(e.code),
            _ => None,
        }
    }

    /// Creates a timeout error for the given timeout in seconds.
    pub fn timeout(seconds: u64) -> Self {
        Self::Timeout {
            code: TIMEOUT_CODE,
            seconds,
        }
    }
}

impl From<ProtocolException> for HarvestError {
    fn from(e: ProtocolException) -> Self {
        Self::ProtocolException(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_code() {
        let err = HarvestError::timeout(30);
        assert_eq!(err.code(), Some(-1));
        assert!(err.to_string().contains("30s"));
    }

    #[test]
    fn test_protocol_exception_code() {
        let err = HarvestError::from(ProtocolException::new(3030, "No usage"));
        assert_eq!(err.code(), Some(3030));
        assert_eq!(HarvestError::DiscoveryFailed.code(), None);
    }

    #[test]
    fn test_tagged_serialization() {
        let json = serde_json::to_value(HarvestError::Http {
            status: 500,
            status_text: "Internal Server Error".to_string(),
        })
        .unwrap();
        assert_eq!(json["kind"], "http");
        assert_eq!(json["status"], 500);
    }
}
