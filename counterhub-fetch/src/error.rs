//! Fetch error types.

use thiserror::Error;

/// Error type for transport and request construction.
///
/// These never reach a `FetchResult` directly; the client turns them into
/// an attempt outcome that the validator classifies.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The vendor base URL or a derived URL is invalid.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<url::ParseError> for FetchError {
    fn from(e: url::ParseError) -> Self {
        FetchError::InvalidUrl(e.to_string())
    }
}
