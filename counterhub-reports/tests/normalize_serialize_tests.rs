//! End-to-end tests: raw payload through normalization to TSV text.

use counterhub_core::{
    CanonicalReport, Instance, ItemIdentity, MonthRange, Period, ProtocolVersion, ReportHeader,
    ReportItem, ReportKind, YearMonth,
};
use counterhub_reports::serializer::allocate_evenly;
use counterhub_reports::{ReportNormalizer, ReportSerializer};
use serde_json::{Value, json};

fn ym(s: &str) -> YearMonth {
    s.parse().unwrap()
}

fn jan_to_mar() -> MonthRange {
    MonthRange::new(ym("2023-01"), ym("2023-03")).unwrap()
}

fn january_platform_payload() -> Value {
    json!({
        "Report_Header": {
            "Report_Name": "Platform Master Report",
            "Report_ID": "PR",
            "Release": "5.1",
            "Institution_Name": "Example University",
            "Created": "2023-04-01T00:00:00Z",
            "Created_By": "Acme Press"
        },
        "Report_Items": [{
            "Platform": "AcmeHost",
            "Attribute_Performance": [
                {"Performance": {"Total_Item_Requests": {"2023-01": 5}}}
            ]
        }]
    })
}

// ============================================================================
// Scenario: January-only usage over a January-March request
// ============================================================================

#[test]
fn test_january_only_payload() {
    let normalizer = ReportNormalizer::new(ProtocolVersion::Current, ReportKind::Platform);
    let report = normalizer.normalize(&january_platform_payload()).unwrap();

    assert_eq!(report.items.len(), 1);
    assert_eq!(report.items[0].performance.len(), 1);
    assert_eq!(
        report.items[0].performance[0].period,
        Period::for_month(ym("2023-01"))
    );
    assert_eq!(
        report.items[0].performance[0].instances,
        vec![Instance::new("Total_Item_Requests", 5)]
    );

    let tsv = ReportSerializer::with_range(jan_to_mar()).serialize(&report).unwrap();
    let mut lines = tsv.lines().skip_while(|l| !l.is_empty()).skip(1);
    assert_eq!(
        lines.next(),
        Some("Platform\tMetric_Type\tReporting_Period_Total\tJan-2023\tFeb-2023\tMar-2023")
    );
    assert_eq!(lines.next(), Some("AcmeHost\tTotal_Item_Requests\t5\t5\t0\t0"));
    assert_eq!(lines.next(), None);
}

#[test]
fn test_current_header_lines() {
    let report = ReportNormalizer::new(ProtocolVersion::Current, ReportKind::Platform)
        .normalize(&january_platform_payload())
        .unwrap();
    let tsv = ReportSerializer::new().serialize(&report).unwrap();
    let names: Vec<&str> = tsv
        .lines()
        .take_while(|l| !l.is_empty())
        .filter_map(|l| l.split('\t').next())
        .collect();
    assert_eq!(
        names,
        vec![
            "Report_Name",
            "Report_ID",
            "Release",
            "Institution_Name",
            "Institution_ID",
            "Report_Filters",
            "Metric_Types",
            "Report_Attributes",
            "Exceptions",
            "Reporting_Period",
            "Created",
            "Created_By",
            "Registry_Record",
        ]
    );
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_allocation_conserves_counts() {
    for months in 1..=24 {
        for count in [0_u64, 1, 7, 100, 12_345] {
            let shares = allocate_evenly(count, months);
            assert_eq!(shares.len(), months);
            let sum: f64 = shares.iter().sum();
            #[allow(clippy::cast_precision_loss)]
            let expected = count as f64;
            assert!((sum - expected).abs() < 1e-6, "count {count} over {months} months");
        }
    }
}

#[test]
fn test_row_totals_conserve_multi_month_periods() {
    let header = ReportHeader {
        report_id: "TR".to_string(),
        ..ReportHeader::default()
    };
    let mut report = CanonicalReport::new(ProtocolVersion::Legacy, ReportKind::Title, header);
    let mut item = ReportItem::new(
        "AcmeHost",
        ItemIdentity::Title {
            title: "Journal".to_string(),
            publisher: String::new(),
            publisher_id: Vec::new(),
            item_id: Vec::new(),
        },
    );
    item.add_instances(
        Period::new(ym("2023-01").first_day(), ym("2023-07").last_day()),
        [Instance::new("Total_Item_Requests", 10)],
    );
    item.add_instances(
        Period::for_month(ym("2023-08")),
        [Instance::new("Total_Item_Requests", 1)],
    );
    report.items.push(item);

    let table = ReportSerializer::new().table(&report).unwrap();
    assert_eq!(table.months.len(), 8);
    assert!((table.rows[0].total - 11.0).abs() < 1e-9);
}

#[test]
fn test_normalization_is_idempotent() {
    let payload = json!({
        "Report_Header": {"Report_ID": "TR_J1", "Release": "5"},
        "Report_Items": [{
            "Title": "Journal",
            "Platform": "AcmeHost",
            "Item_ID": {"Print_ISSN": "1111-2222"},
            "Performance": [
                {"Period": {"Begin_Date": "2023-01-01", "End_Date": "2023-01-31"},
                 "Instance": [{"Metric_Type": "Total_Item_Requests", "Count": 3}]}
            ]
        }]
    });
    let normalizer = ReportNormalizer::for_report(ProtocolVersion::Legacy, "TR_J1");
    let first = normalizer.normalize(&payload).unwrap();
    let second = normalizer.normalize(&payload).unwrap();
    assert_eq!(first, second);

    let serializer = ReportSerializer::new();
    assert_eq!(
        serializer.serialize(&first).unwrap(),
        serializer.serialize(&second).unwrap()
    );
}

#[test]
fn test_item_report_rows() {
    let payload = json!({
        "Report_Header": {"Report_ID": "IR"},
        "Report_Items": [{
            "Title": "Parent",
            "Platform": "AcmeHost",
            "Items": [{
                "Item": "Article",
                "Item_ID": {"DOI": "10.1/a"},
                "YOP": "2019",
                "Attribute_Performance": [{"Performance": {
                    "Total_Item_Requests": {"2023-01": 2, "2023-02": 3}}}]
            }]
        }]
    });
    let report = ReportNormalizer::new(ProtocolVersion::Current, ReportKind::Item)
        .normalize(&payload)
        .unwrap();
    let tsv = ReportSerializer::new().serialize(&report).unwrap();
    let body: Vec<&str> = tsv.lines().skip_while(|l| !l.is_empty()).skip(1).collect();

    assert_eq!(
        body[0],
        "Item\tPlatform\tDOI\tYOP\tMetric_Type\tReporting_Period_Total\tJan-2023\tFeb-2023"
    );
    assert_eq!(body[1], "Parent\tAcmeHost\t10.1/a\t2019\tTotal_Item_Requests\t2\t2\t0");
    assert_eq!(body[2], "Parent\tAcmeHost\t10.1/a\t2019\tTotal_Item_Requests\t3\t0\t3");
}
