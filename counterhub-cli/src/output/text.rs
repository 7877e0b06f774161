//! Text output formatting with colors.

use counterhub_core::{BatchSummary, FetchResult, ReportDefinition, SummaryCounts, Vendor};
use std::path::Path;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    // ========================================================================
    // Harvest
    // ========================================================================

    /// Formats one (vendor, report) result.
    ///
    /// `✓ Acme Press  PR  -> /out/2023/...` on success, the first error
    /// otherwise. Warnings follow on indented lines.
    pub fn format_result_line(&self, result: &FetchResult) -> String {
        let mut line = if result.success {
            format!(
                "{} {:<20} {:<10} {}",
                self.green("✓"),
                result.vendor_name,
                result.report_id,
                self.dim(&format!("-> {}", result.output_path.as_deref().unwrap_or_default()))
            )
        } else {
            let error = result
                .errors
                .first()
                .map_or_else(|| "failed".to_string(), ToString::to_string);
            format!(
                "{} {:<20} {:<10} {}",
                self.red("✗"),
                result.vendor_name,
                result.report_id,
                self.red(&error)
            )
        };

        for warning in &result.warnings {
            line.push_str(&format!("\n    {}", self.yellow(&format!("warning: {warning}"))));
        }
        line
    }

    /// Formats the batch summary.
    pub fn format_summary(&self, summary: &BatchSummary, log_file: Option<&Path>) -> String {
        let mut lines = vec![self.bold("Harvest Summary"), "─".repeat(40)];
        lines.push(format!("Main reports:    {}", self.format_counts(summary.main)));
        lines.push(format!("Custom reports:  {}", self.format_counts(summary.custom)));
        lines.push(format!("Vendors:         {} completed", summary.vendors_completed));
        if let Some(path) = log_file {
            lines.push(format!("Log file:        {}", path.display()));
        }
        lines.join("\n")
    }

    /// Formats succeeded/failed counts.
    pub fn format_counts(&self, counts: SummaryCounts) -> String {
        let failed = format!("{} failed", counts.failed);
        let failed = if counts.failed > 0 {
            self.red(&failed)
        } else {
            self.dim(&failed)
        };
        format!("{} succeeded, {failed}", self.green(&counts.succeeded.to_string()))
    }

    // ========================================================================
    // Listings
    // ========================================================================

    /// Formats vendor list header.
    pub fn format_vendors_header(&self) -> String {
        format!(
            "{:<24} {:<12} {}",
            self.bold("Vendor"),
            self.bold("Releases"),
            self.bold("Policy")
        )
    }

    /// Formats a single vendor line.
    pub fn format_vendor_line(&self, vendor: &Vendor) -> String {
        let releases: Vec<String> = vendor
            .supported_versions()
            .iter()
            .map(ToString::to_string)
            .collect();

        let mut policy = Vec::new();
        for connection in [&vendor.legacy, &vendor.current].into_iter().flatten() {
            if connection.require_requests_throttled && !policy.contains(&"throttled") {
                policy.push("throttled");
            }
            if connection.require_two_attempts_per_report && !policy.contains(&"two attempts") {
                policy.push("two attempts");
            }
            if connection.require_ip_checking && !policy.contains(&"ip checked") {
                policy.push("ip checked");
            }
        }

        format!(
            "{:<24} {:<12} {}",
            vendor.name,
            releases.join(", "),
            self.dim(&policy.join(", "))
        )
    }

    /// Formats report definition list header.
    pub fn format_definitions_header(&self) -> String {
        format!(
            "{:<10} {:<40} {}",
            self.bold("ID"),
            self.bold("Name"),
            self.bold("Type")
        )
    }

    /// Formats a single report definition line.
    pub fn format_definition_line(&self, definition: &ReportDefinition) -> String {
        let kind = if definition.is_custom() {
            self.yellow("custom")
        } else {
            self.dim("standard")
        };
        format!("{:<10} {:<40} {kind}", definition.normalized_id(), definition.name)
    }

    // ========================================================================
    // Color Helpers
    // ========================================================================

    fn paint(&self, code: &str, s: &str) -> String {
        if self.use_colors {
            format!("{code}{s}{RESET}")
        } else {
            s.to_string()
        }
    }

    fn bold(&self, s: &str) -> String {
        self.paint(BOLD, s)
    }

    fn dim(&self, s: &str) -> String {
        self.paint(DIM, s)
    }

    fn green(&self, s: &str) -> String {
        self.paint(GREEN, s)
    }

    fn yellow(&self, s: &str) -> String {
        self.paint(YELLOW, s)
    }

    fn red(&self, s: &str) -> String {
        self.paint(RED, s)
    }
}
