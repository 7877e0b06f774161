//! Fetch results and batch summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::HarvestError;

// ============================================================================
// Harvest Settings
// ============================================================================

/// Request pacing used by a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarvestSettings {
    /// Spacing between successive requests to a throttled vendor.
    pub request_interval: Duration,
    /// Upper bound for a single attempt.
    pub request_timeout: Duration,
}

impl Default for HarvestSettings {
    fn default() -> Self {
        Self {
            request_interval: Duration::from_secs(2),
            request_timeout: Duration::from_secs(120),
        }
    }
}

// ============================================================================
// Fetch Result
// ============================================================================

/// Outcome of one (vendor, report) call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchResult {
    /// Report id requested.
    pub report_id: String,
    /// Vendor display name.
    pub vendor_name: String,
    /// Whether a file was produced.
    pub success: bool,
    /// Whether the definition was a custom one.
    pub custom: bool,
    /// Failures, in the order they happened.
    pub errors: Vec<HarvestError>,
    /// Non-fatal notes.
    pub warnings: Vec<String>,
    /// When the call finished.
    pub timestamp: DateTime<Utc>,
    /// Written file, on success.
    pub output_path: Option<String>,
}

impl FetchResult {
    /// Creates a pending (unsuccessful, error-free) result.
    pub fn new(report_id: impl Into<String>, vendor_name: impl Into<String>, custom: bool) -> Self {
        Self {
            report_id: report_id.into(),
            vendor_name: vendor_name.into(),
            success: false,
            custom,
            errors: Vec::new(),
            warnings: Vec::new(),
            timestamp: Utc::now(),
            output_path: None,
        }
    }

    /// Marks the result as succeeded with the written path.
    #[must_use]
    pub fn succeeded(mut self, output_path: impl Into<String>) -> Self {
        self.success = true;
        self.output_path = Some(output_path.into());
        self.timestamp = Utc::now();
        self
    }

    /// Marks the result as failed with `error`.
    #[must_use]
    pub fn failed(mut self, error: HarvestError) -> Self {
        self.success = false;
        self.errors.push(error);
        self.timestamp = Utc::now();
        self
    }

    /// Adds a warning.
    pub fn warn(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }
}

// ============================================================================
// Batch Summary
// ============================================================================

/// Succeeded/failed counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryCounts {
    /// Reports written.
    pub succeeded: usize,
    /// Reports that failed.
    pub failed: usize,
}

impl SummaryCounts {
    /// Total attempted.
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    fn record(&mut self, success: bool) {
        if success {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// What a batch produced, split by standard vs custom definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Standard definitions.
    pub main: SummaryCounts,
    /// Custom definitions.
    pub custom: SummaryCounts,
    /// Vendors that finished (one per selected vendor).
    pub vendors_completed: usize,
    /// Full run log.
    pub log: String,
}

impl BatchSummary {
    /// Aggregates `results` into counts.
    pub fn from_results(
        results: &[FetchResult],
        vendors_completed: usize,
        log_lines: Vec<String>,
    ) -> Self {
        let mut summary = Self {
            vendors_completed,
            log: log_lines.join("\n"),
            ..Self::default()
        };
        for result in results {
            if result.custom {
                summary.custom.record(result.success);
            } else {
                summary.main.record(result.success);
            }
        }
        summary
    }

    /// Total failures across both groups.
    pub fn failed(&self) -> usize {
        self.main.failed + self.custom.failed
    }

    /// Total successes across both groups.
    pub fn succeeded(&self) -> usize {
        self.main.succeeded + self.custom.succeeded
    }
}
