//! Integration tests for core model types.

use counterhub_core::{
    BatchSummary, FetchResult, HarvestError, MonthRange, Period, ReportDefinition, YearMonth,
};

#[test]
fn test_period_spanning_quarter() {
    let period = Period::new(
        "2023-01-01".parse().unwrap(),
        "2023-03-31".parse().unwrap(),
    );
    let months: Vec<String> = period.months().iter().map(ToString::to_string).collect();
    assert_eq!(months, vec!["2023-01", "2023-02", "2023-03"]);
}

#[test]
fn test_month_range_months() {
    let begin: YearMonth = "2023-11".parse().unwrap();
    let end: YearMonth = "2024-02".parse().unwrap();
    let range = MonthRange::new(begin, end).unwrap();
    assert_eq!(range.months().len(), 4);
}

#[test]
fn test_catalogue_is_standard() {
    assert!(
        ReportDefinition::standard_catalogue()
            .iter()
            .all(|d| !d.is_custom())
    );
}

#[test]
fn test_summary_empty_batch() {
    let summary = BatchSummary::from_results(&[], 0, Vec::new());
    assert_eq!(summary.main.total(), 0);
    assert_eq!(summary.custom.total(), 0);
    assert!(summary.log.is_empty());
}

#[test]
fn test_result_timeout_code() {
    let result = FetchResult::new("TR", "Vendor", false).failed(HarvestError::timeout(10));
    assert_eq!(result.errors[0].code(), Some(-1));
}
