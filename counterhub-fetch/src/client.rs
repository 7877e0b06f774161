//! Report client: discovery and retrieval.

use counterhub_core::{
    HarvestError, HarvestSettings, MonthRange, ProtocolVersion, ReportDefinition,
    VendorConnection,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::attempt::AttemptPolicy;
use crate::query;
use crate::transport::{AttemptOutcome, Transport};
use crate::validator::{Classification, ResponseValidator};

/// Issues discovery and retrieval calls against one vendor endpoint.
#[derive(Clone)]
pub struct ReportClient {
    transport: Arc<dyn Transport>,
    validator: ResponseValidator,
}

impl std::fmt::Debug for ReportClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportClient").finish_non_exhaustive()
    }
}

impl ReportClient {
    /// Creates a client over `transport`.
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self::from_arc(Arc::new(transport))
    }

    /// Creates a client over a shared transport.
    pub fn from_arc(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            validator: ResponseValidator::new(),
        }
    }

    /// The validator used for classification.
    pub fn validator(&self) -> &ResponseValidator {
        &self.validator
    }

    /// Lists the report ids a vendor offers, uppercased.
    ///
    /// Returns `None` when the call fails or the body is not a list.
    #[instrument(skip_all, fields(customer = %connection.customer_id))]
    pub async fn discover(
        &self,
        connection: &VendorConnection,
        settings: &HarvestSettings,
    ) -> Option<Vec<String>> {
        let url = match query::discovery_url(connection) {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "Cannot build discovery URL");
                return None;
            }
        };

        let outcome = AttemptPolicy::single(settings.request_timeout)
            .run(|_| self.attempt(&url))
            .await;

        let Classification::ValidPayload(Value::Array(entries)) = self.validator.classify(&outcome)
        else {
            warn!("Report discovery returned no list");
            return None;
        };

        let ids: Vec<String> = entries
            .iter()
            .filter_map(|entry| entry.get("Report_ID").and_then(Value::as_str))
            .map(|id| id.trim().to_uppercase())
            .collect();
        debug!(count = ids.len(), "Reports discovered");
        Some(ids)
    }

    /// Retrieves one report, returning the final attempt's outcome.
    #[instrument(skip_all, fields(report = %definition.id, version = %version))]
    pub async fn retrieve(
        &self,
        connection: &VendorConnection,
        definition: &ReportDefinition,
        version: ProtocolVersion,
        range: MonthRange,
        settings: &HarvestSettings,
    ) -> AttemptOutcome {
        let url = match query::report_url(connection, definition, version, range) {
            Ok(url) => url,
            Err(e) => return AttemptOutcome::NoResponse(e.to_string()),
        };

        AttemptPolicy::for_connection(connection, settings)
            .run(|attempt| {
                debug!(attempt, "Requesting report");
                self.attempt(&url)
            })
            .await
    }

    /// Retrieves and validates one report.
    ///
    /// # Errors
    ///
    /// Returns the [`HarvestError`] for any outcome that is not a valid
    /// payload.
    pub async fn fetch(
        &self,
        connection: &VendorConnection,
        definition: &ReportDefinition,
        version: ProtocolVersion,
        range: MonthRange,
        settings: &HarvestSettings,
    ) -> Result<Value, HarvestError> {
        let outcome = self
            .retrieve(connection, definition, version, range, settings)
            .await;
        self.validator.validate(&outcome)
    }

    async fn attempt(&self, url: &Url) -> AttemptOutcome {
        match self.transport.get(url).await {
            Ok(response) => AttemptOutcome::Response(response),
            Err(e) => AttemptOutcome::NoResponse(e.to_string()),
        }
    }
}
