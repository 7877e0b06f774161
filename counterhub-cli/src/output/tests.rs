//! CLI output formatting tests.
//!
//! These tests verify that CLI output is correctly formatted for both
//! text and JSON output modes.

#[cfg(test)]
mod text_formatter_tests {
    use super::super::text::TextFormatter;
    use counterhub_core::{
        BatchSummary, FetchResult, HarvestError, ProtocolException, ProtocolVersion,
        ReportDefinition, SummaryCounts, Vendor, VendorConnection,
    };
    use std::path::Path;

    #[test]
    fn test_success_line() {
        let formatter = TextFormatter::new(false);
        let result = FetchResult::new("PR", "Acme Press", false).succeeded("/out/a.tsv");

        let line = formatter.format_result_line(&result);

        assert!(line.starts_with("✓ Acme Press"));
        assert!(line.contains("PR"));
        assert!(line.ends_with("-> /out/a.tsv"));
    }

    #[test]
    fn test_failure_line_shows_first_error_and_warnings() {
        let formatter = TextFormatter::new(false);
        let mut result = FetchResult::new("TR", "Beta", false);
        result.warn("Beta authenticates by IP address");
        let result = result.failed(HarvestError::from(ProtocolException::new(2010, "denied")));

        let line = formatter.format_result_line(&result);

        assert!(line.starts_with("✗ Beta"));
        assert!(line.contains("Exception 2010"));
        assert!(line.contains("\n    warning: Beta authenticates by IP address"));
    }

    #[test]
    fn test_summary_lists_groups_and_log() {
        let formatter = TextFormatter::new(false);
        let summary = BatchSummary {
            main: SummaryCounts { succeeded: 3, failed: 1 },
            custom: SummaryCounts { succeeded: 1, failed: 0 },
            vendors_completed: 2,
            log: String::new(),
        };

        let text = formatter.format_summary(&summary, Some(Path::new("/out/logs/h.log")));

        assert!(text.contains("Main reports:    3 succeeded, 1 failed"));
        assert!(text.contains("Custom reports:  1 succeeded, 0 failed"));
        assert!(text.contains("Vendors:         2 completed"));
        assert!(text.contains("Log file:        /out/logs/h.log"));
    }

    #[test]
    fn test_counts_colored() {
        let formatter = TextFormatter::new(true);
        let text = formatter.format_counts(SummaryCounts { succeeded: 1, failed: 2 });
        assert!(text.contains("\x1b[32m1\x1b[0m"));
        assert!(text.contains("\x1b[31m2 failed\x1b[0m"));
    }

    #[test]
    fn test_vendor_line() {
        let formatter = TextFormatter::new(false);
        let mut connection = VendorConnection::new("https://x.test", "c");
        connection.require_requests_throttled = true;
        let vendor = Vendor::new("acme", "Acme Press")
            .with_connection(ProtocolVersion::Legacy, VendorConnection::new("https://x.test", "c"))
            .with_connection(ProtocolVersion::Current, connection);

        let line = formatter.format_vendor_line(&vendor);

        assert!(line.starts_with("Acme Press"));
        assert!(line.contains("5, 5.1"));
        assert!(line.ends_with("throttled"));
    }

    #[test]
    fn test_definition_line() {
        let formatter = TextFormatter::new(false);
        let line = formatter.format_definition_line(&ReportDefinition::new("tr", "Custom TR"));
        assert!(line.starts_with("TR "));
        assert!(line.ends_with("custom"));
    }
}

#[cfg(test)]
mod json_formatter_tests {
    use super::super::json::JsonFormatter;
    use counterhub_core::{
        BatchSummary, FetchResult, HarvestError, ProtocolVersion, ReportDefinition, Vendor,
        VendorConnection,
    };
    use counterhub_fetch::HarvestOutcome;
    use std::path::Path;

    fn outcome() -> HarvestOutcome {
        let results = vec![
            FetchResult::new("PR", "Acme", false).succeeded("/out/a.tsv"),
            FetchResult::new("TR", "Acme", true).failed(HarvestError::timeout(120)),
        ];
        let summary = BatchSummary::from_results(&results, 1, vec!["line".into()]);
        HarvestOutcome { results, summary }
    }

    #[test]
    fn test_harvest_output_shape() {
        let formatter = JsonFormatter::new(false);
        let json = formatter
            .format_harvest(&outcome(), Some(Path::new("/out/logs/h.log")))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["main"]["succeeded"], 1);
        assert_eq!(value["custom"]["failed"], 1);
        assert_eq!(value["vendorsCompleted"], 1);
        assert_eq!(value["logFile"], "/out/logs/h.log");
        assert_eq!(value["results"][0]["file"], "/out/a.tsv");
        assert!(value["results"][0].get("errors").is_none());
        assert_eq!(value["results"][1]["errors"][0]["kind"], "timeout");
        assert_eq!(value["results"][1]["errors"][0]["code"], -1);
    }

    #[test]
    fn test_pretty_output() {
        let formatter = JsonFormatter::new(true);
        let json = formatter.format_harvest(&outcome(), None).unwrap();
        assert!(json.contains('\n'));
        assert!(!json.contains("logFile"));
    }

    #[test]
    fn test_vendors_output() {
        let formatter = JsonFormatter::new(false);
        let vendor = Vendor::new("acme", "Acme").with_connection(
            ProtocolVersion::Current,
            VendorConnection::new("https://x.test", "c"),
        );
        let value: serde_json::Value =
            serde_json::from_str(&formatter.format_vendors(&[vendor]).unwrap()).unwrap();
        assert_eq!(value[0]["releases"], serde_json::json!(["5.1"]));
    }

    #[test]
    fn test_definitions_output() {
        let formatter = JsonFormatter::new(false);
        let json = formatter
            .format_definitions(&[ReportDefinition::new("pr", "Platform Master Report")])
            .unwrap();
        assert_eq!(json, r#"[{"id":"PR","name":"Platform Master Report","custom":false}]"#);
    }
}
