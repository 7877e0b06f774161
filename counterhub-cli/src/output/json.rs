//! JSON output formatting.

use anyhow::Result;
use counterhub_core::{FetchResult, HarvestError, ReportDefinition, SummaryCounts, Vendor};
use counterhub_fetch::HarvestOutcome;
use serde::Serialize;
use std::path::Path;

// ============================================================================
// Output Types
// ============================================================================

/// JSON output for a harvest.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HarvestOutput {
    pub main: SummaryCounts,
    pub custom: SummaryCounts,
    pub vendors_completed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
    pub results: Vec<ResultOutput>,
}

/// One (vendor, report) result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultOutput {
    pub vendor: String,
    pub report: String,
    pub success: bool,
    pub custom: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<HarvestError>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub timestamp: String,
}

impl From<&FetchResult> for ResultOutput {
    fn from(result: &FetchResult) -> Self {
        Self {
            vendor: result.vendor_name.clone(),
            report: result.report_id.clone(),
            success: result.success,
            custom: result.custom,
            file: result.output_path.clone(),
            errors: result.errors.clone(),
            warnings: result.warnings.clone(),
            timestamp: result.timestamp.to_rfc3339(),
        }
    }
}

/// Vendor info output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorOutput {
    pub id: String,
    pub name: String,
    pub releases: Vec<String>,
}

/// Report definition output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionOutput {
    pub id: String,
    pub name: String,
    pub custom: bool,
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats a harvest outcome.
    pub fn format_harvest(&self, outcome: &HarvestOutcome, log_file: Option<&Path>) -> Result<String> {
        let output = HarvestOutput {
            main: outcome.summary.main,
            custom: outcome.summary.custom,
            vendors_completed: outcome.summary.vendors_completed,
            log_file: log_file.map(|p| p.display().to_string()),
            results: outcome.results.iter().map(ResultOutput::from).collect(),
        };
        self.format(&output)
    }

    /// Formats the vendor list.
    pub fn format_vendors(&self, vendors: &[Vendor]) -> Result<String> {
        let outputs: Vec<VendorOutput> = vendors
            .iter()
            .map(|v| VendorOutput {
                id: v.id.clone(),
                name: v.name.clone(),
                releases: v
                    .supported_versions()
                    .iter()
                    .map(ToString::to_string)
                    .collect(),
            })
            .collect();
        self.format(&outputs)
    }

    /// Formats the report definition list.
    pub fn format_definitions(&self, definitions: &[ReportDefinition]) -> Result<String> {
        let outputs: Vec<DefinitionOutput> = definitions
            .iter()
            .map(|d| DefinitionOutput {
                id: d.normalized_id(),
                name: d.name.clone(),
                custom: d.is_custom(),
            })
            .collect();
        self.format(&outputs)
    }
}
