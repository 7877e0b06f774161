//! Release 5 payload parser.

use counterhub_core::{
    CanonicalReport, Instance, ItemIdentity, Period, ProtocolVersion, ReportHeader, ReportItem,
    ReportKind,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::ReportError;
use crate::shared::{
    IdentifierList, Scalar, find_id, flatten_ids, parse_date, parse_exceptions,
};

// ============================================================================
// Wire Structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct LegacyReport {
    #[serde(rename = "Report_Header")]
    header: LegacyHeader,
    #[serde(rename = "Report_Items", default)]
    items: Vec<LegacyItem>,
}

#[derive(Debug, Deserialize)]
struct LegacyHeader {
    #[serde(rename = "Report_Name", default)]
    report_name: Option<String>,
    #[serde(rename = "Report_ID", default)]
    report_id: Option<String>,
    #[serde(rename = "Release", default)]
    release: Option<Scalar>,
    #[serde(rename = "Institution_Name", default)]
    institution_name: Option<String>,
    #[serde(rename = "Institution_ID", default)]
    institution_id: Option<IdentifierList>,
    #[serde(rename = "Report_Filters", default)]
    report_filters: Option<IdentifierList>,
    #[serde(rename = "Created", default)]
    created: Option<String>,
    #[serde(rename = "Created_By", default)]
    created_by: Option<String>,
    #[serde(rename = "Exceptions", default)]
    exceptions: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct LegacyItem {
    #[serde(rename = "Platform", default)]
    platform: Option<String>,
    #[serde(rename = "Title", default)]
    title: Option<String>,
    #[serde(rename = "Item", default)]
    item: Option<String>,
    #[serde(rename = "Database", default)]
    database: Option<String>,
    #[serde(rename = "Publisher", default)]
    publisher: Option<String>,
    #[serde(rename = "Publisher_ID", default)]
    publisher_id: Option<IdentifierList>,
    #[serde(rename = "Item_ID", default)]
    item_id: Option<IdentifierList>,
    #[serde(rename = "YOP", default)]
    yop: Option<Scalar>,
    #[serde(rename = "Performance", default)]
    performance: Vec<LegacyPerformance>,
}

#[derive(Debug, Deserialize)]
struct LegacyPerformance {
    #[serde(rename = "Period")]
    period: LegacyPeriod,
    #[serde(rename = "Instance", default)]
    instances: Vec<LegacyInstance>,
}

#[derive(Debug, Deserialize)]
struct LegacyPeriod {
    #[serde(rename = "Begin_Date")]
    begin_date: String,
    #[serde(rename = "End_Date")]
    end_date: String,
}

#[derive(Debug, Deserialize)]
struct LegacyInstance {
    #[serde(rename = "Metric_Type")]
    metric_type: String,
    #[serde(rename = "Count")]
    count: u64,
}

// ============================================================================
// Parser
// ============================================================================

/// Parses a release 5 payload into a canonical report of `kind`.
///
/// # Errors
///
/// Returns [`ReportError::Normalization`] when any part of the payload has an
/// unexpected shape. No partial report is produced.
pub fn parse_legacy_report(payload: &Value, kind: ReportKind) -> Result<CanonicalReport, ReportError> {
    let wire = LegacyReport::deserialize(payload)
        .map_err(|e| ReportError::shape("release 5 report", e))?;

    let header = convert_header(wire.header);
    let mut report = CanonicalReport::new(ProtocolVersion::Legacy, kind, header);

    for (index, item) in wire.items.into_iter().enumerate() {
        let context = format!("Report_Items[{index}]");
        report.items.push(convert_item(item, kind, &context)?);
    }

    debug!(
        kind = %kind,
        items = report.items.len(),
        instances = report.instance_count(),
        "Release 5 report parsed"
    );

    Ok(report)
}

fn convert_header(header: LegacyHeader) -> ReportHeader {
    let exceptions = parse_exceptions(header.exceptions.as_ref());
    ReportHeader {
        report_name: header.report_name.unwrap_or_default(),
        report_id: header.report_id.unwrap_or_default(),
        release: header
            .release
            .map_or_else(|| ProtocolVersion::Legacy.release().to_string(), |r| r.render()),
        institution_name: header.institution_name.unwrap_or_default(),
        institution_id: flatten_ids(header.institution_id.as_ref()),
        report_filters: flatten_ids(header.report_filters.as_ref()),
        created: header.created,
        created_by: header.created_by,
        exceptions: exceptions.parsed,
        unparsed_exceptions: exceptions.unparsed,
        extras: None,
    }
}

fn convert_item(item: LegacyItem, kind: ReportKind, context: &str) -> Result<ReportItem, ReportError> {
    let item_id = flatten_ids(item.item_id.as_ref());
    let identity = match kind {
        ReportKind::Platform => ItemIdentity::Platform,
        ReportKind::Database => ItemIdentity::Database {
            database: item.database.unwrap_or_default(),
            publisher: item.publisher.unwrap_or_default(),
            publisher_id: flatten_ids(item.publisher_id.as_ref()),
            item_id,
        },
        ReportKind::Title => ItemIdentity::Title {
            title: item.title.unwrap_or_default(),
            publisher: item.publisher.unwrap_or_default(),
            publisher_id: flatten_ids(item.publisher_id.as_ref()),
            item_id,
        },
        ReportKind::Item => ItemIdentity::Item {
            title: item.item.or(item.title).unwrap_or_default(),
            doi: find_id(&item_id, "DOI"),
            yop: item
                .yop
                .map(|y| y.render())
                .or_else(|| find_id(&item_id, "YOP")),
        },
    };

    let mut converted = ReportItem::new(item.platform.unwrap_or_default(), identity);
    for (index, performance) in item.performance.into_iter().enumerate() {
        let context = format!("{context}.Performance[{index}].Period");
        let begin = parse_date(&performance.period.begin_date, &context)?;
        let end = parse_date(&performance.period.end_date, &context)?;
        if end < begin {
            return Err(ReportError::shape(
                &context,
                format!("end {end} precedes begin {begin}"),
            ));
        }
        converted.add_instances(
            Period::new(begin, end),
            performance
                .instances
                .into_iter()
                .map(|i| Instance::new(i.metric_type, i.count)),
        );
    }

    Ok(converted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn title_payload() -> Value {
        json!({
            "Report_Header": {
                "Report_Name": "Journal Requests (Excluding OA_Gold)",
                "Report_ID": "TR_J1",
                "Release": "5",
                "Institution_Name": "Example University",
                "Institution_ID": [{"Type": "Proprietary", "Value": "acme:123"}],
                "Report_Filters": [{"Name": "Begin_Date", "Value": "2023-01-01"}],
                "Created": "2023-04-02T10:00:00Z",
                "Created_By": "Acme Press"
            },
            "Report_Items": [{
                "Title": "Journal of Tests",
                "Platform": "AcmeHost",
                "Publisher": "Acme",
                "Publisher_ID": [{"Type": "ISNI", "Value": "0000"}],
                "Item_ID": [{"Type": "Online_ISSN", "Value": "1234-5678"}],
                "Performance": [
                    {"Period": {"Begin_Date": "2023-01-01", "End_Date": "2023-01-31"},
                     "Instance": [{"Metric_Type": "Total_Item_Requests", "Count": 5}]},
                    {"Period": {"Begin_Date": "2023-01-01", "End_Date": "2023-01-31"},
                     "Instance": [{"Metric_Type": "Unique_Item_Requests", "Count": 4}]}
                ]
            }]
        })
    }

    #[test]
    fn test_parse_title_report() {
        let report = parse_legacy_report(&title_payload(), ReportKind::Title).unwrap();
        assert_eq!(report.version, ProtocolVersion::Legacy);
        assert_eq!(report.header.report_id, "TR_J1");
        assert_eq!(report.header.institution_id[0].value, "acme:123");
        assert!(report.header.extras.is_none());

        let item = &report.items[0];
        assert_eq!(item.platform, "AcmeHost");
        assert_eq!(item.performance.len(), 1, "same period must be merged");
        assert_eq!(item.performance[0].instances.len(), 2);
        match &item.identity {
            ItemIdentity::Title { title, item_id, .. } => {
                assert_eq!(title, "Journal of Tests");
                assert_eq!(item_id[0].name, "Online_ISSN");
            }
            other => panic!("unexpected identity: {other:?}"),
        }
    }

    #[test]
    fn test_header_maps_are_flattened() {
        let payload = json!({
            "Report_Header": {
                "Report_ID": "PR",
                "Institution_ID": {"ISNI": "0000000419369078"},
                "Report_Filters": {"Begin_Date": "2023-01-01", "End_Date": "2023-03-31"}
            }
        });
        let report = parse_legacy_report(&payload, ReportKind::Platform).unwrap();
        assert_eq!(report.header.institution_id[0].name, "ISNI");
        assert_eq!(report.header.report_filters.len(), 2);
        assert!(report.items.is_empty());
    }

    #[test]
    fn test_item_report_doi_and_yop() {
        let payload = json!({
            "Report_Header": {"Report_ID": "IR"},
            "Report_Items": [{
                "Item": "An Article",
                "Platform": "AcmeHost",
                "YOP": 2020,
                "Item_ID": [{"Type": "DOI", "Value": "10.1000/xyz"}],
                "Performance": []
            }]
        });
        let report = parse_legacy_report(&payload, ReportKind::Item).unwrap();
        assert_eq!(
            report.items[0].identity,
            ItemIdentity::Item {
                title: "An Article".to_string(),
                doi: Some("10.1000/xyz".to_string()),
                yop: Some("2020".to_string()),
            }
        );
    }

    #[test]
    fn test_inverted_period_rejected() {
        let payload = json!({
            "Report_Header": {"Report_ID": "PR"},
            "Report_Items": [{
                "Platform": "AcmeHost",
                "Performance": [{
                    "Period": {"Begin_Date": "2023-03-01", "End_Date": "2023-01-31"},
                    "Instance": []
                }]
            }]
        });
        assert!(parse_legacy_report(&payload, ReportKind::Platform).is_err());
    }
}
