//! Transport abstraction.
//!
//! The report client issues requests through [`Transport`] so the attempt
//! policy and the orchestrator can be driven by a scripted transport in
//! tests.

use async_trait::async_trait;
use url::Url;

use crate::error::FetchError;

/// A received HTTP response, body read to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Canonical reason phrase, empty when unknown.
    pub status_text: String,
    /// Response body.
    pub body: String,
}

impl RawResponse {
    /// Creates a response.
    pub fn new(status: u16, status_text: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            body: body.into(),
        }
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether the vendor asked us to slow down.
    pub fn is_rate_limited(&self) -> bool {
        self.status == 429
    }
}

/// What one attempt produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// A response arrived.
    Response(RawResponse),
    /// The request failed before any response.
    NoResponse(String),
    /// The timer won the race.
    TimedOut {
        /// The timeout that expired.
        seconds: u64,
    },
}

impl AttemptOutcome {
    /// Whether this attempt was answered with 429.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Response(r) if r.is_rate_limited())
    }
}

/// Issues a single GET request.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a GET to `url` and reads the body.
    async fn get(&self, url: &Url) -> Result<RawResponse, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_status_helpers() {
        assert!(RawResponse::new(200, "OK", "").is_success());
        assert!(!RawResponse::new(404, "Not Found", "").is_success());
        assert!(AttemptOutcome::Response(RawResponse::new(429, "", "")).is_rate_limited());
        assert!(!AttemptOutcome::TimedOut { seconds: 1 }.is_rate_limited());
    }
}
