//! HTTP transport backed by `reqwest`.
//!
//! The client sets no request timeout of its own. Each attempt is bounded by
//! the attempt policy's timer instead, so a slow vendor surfaces as a
//! timeout outcome rather than a transport error.

use async_trait::async_trait;
use reqwest::{Client, header};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use crate::error::FetchError;
use crate::transport::{RawResponse, Transport};

/// Connect timeout for vendor endpoints.
const CONNECT_TIMEOUT_SECS: u64 = 30;

/// User agent string for Counterhub.
const USER_AGENT: &str = concat!("Counterhub/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// HTTP Client
// ============================================================================

/// `reqwest` client wrapper with tracing.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
}

impl HttpClient {
    /// Creates a client with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self, FetchError> {
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { inner })
    }

    /// Wraps an existing `reqwest` client.
    pub fn from_client(inner: Client) -> Self {
        Self { inner }
    }

    /// Returns the inner reqwest client for advanced operations.
    pub fn inner(&self) -> &Client {
        &self.inner
    }
}

#[async_trait]
impl Transport for HttpClient {
    #[instrument(skip_all, fields(url = %url.path()))]
    async fn get(&self, url: &Url) -> Result<RawResponse, FetchError> {
        debug!("GET request");

        let response = self
            .inner
            .get(url.clone())
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        debug!(status = %status, "Response received");

        let body = response.text().await?;
        Ok(RawResponse::new(
            status.as_u16(),
            status.canonical_reason().unwrap_or_default(),
            body,
        ))
    }
}
