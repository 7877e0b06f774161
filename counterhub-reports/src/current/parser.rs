//! Release 5.1 payload parser.

use counterhub_core::{
    CanonicalReport, CurrentHeaderExtras, Instance, ItemIdentity, NameValue, Period,
    ProtocolVersion, ReportHeader, ReportItem, ReportKind, YearMonth,
};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::ReportError;
use crate::shared::{
    IdentifierList, Scalar, find_id, flatten_ids, parse_exceptions, render_optional,
};

// ============================================================================
// Wire Structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct CurrentReport {
    #[serde(rename = "Report_Header")]
    header: CurrentHeader,
    #[serde(rename = "Report_Items", default)]
    items: Vec<CurrentItem>,
}

#[derive(Debug, Deserialize)]
struct CurrentHeader {
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
    #[serde(rename = "Metric_Types", alias = "Metric_Type", default)]
    metric_types: Option<Value>,
    #[serde(rename = "Report_Attributes", default)]
    report_attributes: Option<Value>,
    #[serde(rename = "Exceptions", default)]
    exceptions: Option<Value>,
    #[serde(rename = "Reporting_Period", default)]
    reporting_period: Option<Value>,
    #[serde(rename = "Registry_Record", default)]
    registry_record: Option<Value>,
    #[serde(rename = "Created", default)]
    created: Option<String>,
    #[serde(rename = "Created_By", default)]
    created_by: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CurrentItem {
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
    #[serde(rename = "Attribute_Performance", default)]
    attribute_performance: Vec<AttributePerformance>,
    #[serde(rename = "Items", default)]
    items: Option<Vec<CurrentSubItem>>,
}

#[derive(Debug, Deserialize)]
struct CurrentSubItem {
    #[serde(rename = "Item", default)]
    item: Option<String>,
    #[serde(rename = "Item_ID", default)]
    item_id: Option<IdentifierList>,
    #[serde(rename = "YOP", default)]
    yop: Option<Scalar>,
    #[serde(rename = "Attribute_Performance", default)]
    attribute_performance: Vec<AttributePerformance>,
}

/// `metric -> {"YYYY-MM" -> count}`; sibling attribute columns are ignored.
#[derive(Debug, Deserialize)]
struct AttributePerformance {
    #[serde(rename = "Performance")]
    performance: BTreeMap<String, BTreeMap<String, u64>>,
}

// ============================================================================
// Parser
// ============================================================================

/// Parses a release 5.1 payload into a canonical report of `kind`.
///
/// Every (block, metric, month) triple becomes an instance on the period
/// covering that calendar month. Instances that land on the same period of
/// the same item are merged into one performance entry.
///
/// # Errors
///
/// Returns [`ReportError::Normalization`] when any part of the payload has an
/// unexpected shape. No partial report is produced.
pub fn parse_current_report(payload: &Value, kind: ReportKind) -> Result<CanonicalReport, ReportError> {
    let wire = CurrentReport::deserialize(payload)
        .map_err(|e| ReportError::shape("release 5.1 report", e))?;

    let header = convert_header(wire.header);
    let mut report = CanonicalReport::new(ProtocolVersion::Current, kind, header);

    for (index, item) in wire.items.into_iter().enumerate() {
        let context = format!("Report_Items[{index}]");
        if kind == ReportKind::Item {
            report.items.extend(convert_item_report_entry(item, &context)?);
        } else {
            report.items.push(convert_item(item, kind, &context)?);
        }
    }

    debug!(
        kind = %kind,
        items = report.items.len(),
        instances = report.instance_count(),
        "Release 5.1 report parsed"
    );

    Ok(report)
}

fn convert_header(header: CurrentHeader) -> ReportHeader {
    let extras = CurrentHeaderExtras {
        metric_types: render_optional(header.metric_types.as_ref()),
        report_attributes: render_optional(header.report_attributes.as_ref()),
        exceptions: render_optional(header.exceptions.as_ref()),
        reporting_period: render_optional(header.reporting_period.as_ref()),
        registry_record: render_optional(header.registry_record.as_ref()),
    };

    let exceptions = parse_exceptions(header.exceptions.as_ref());
    ReportHeader {
        report_name: header.report_name.unwrap_or_default(),
        report_id: header.report_id.unwrap_or_default(),
        release: header
            .release
            .map_or_else(|| ProtocolVersion::Current.release().to_string(), |r| r.render()),
        institution_name: header.institution_name.unwrap_or_default(),
        institution_id: flatten_ids(header.institution_id.as_ref()),
        report_filters: flatten_ids(header.report_filters.as_ref()),
        created: header.created,
        created_by: header.created_by,
        exceptions: exceptions.parsed,
        unparsed_exceptions: exceptions.unparsed,
        extras: Some(extras),
    }
}

fn convert_item(item: CurrentItem, kind: ReportKind, context: &str) -> Result<ReportItem, ReportError> {
    let identity = match kind {
        ReportKind::Database => ItemIdentity::Database {
            database: item.database.unwrap_or_default(),
            publisher: item.publisher.unwrap_or_default(),
            publisher_id: flatten_ids(item.publisher_id.as_ref()),
            item_id: flatten_ids(item.item_id.as_ref()),
        },
        ReportKind::Title => ItemIdentity::Title {
            title: item.title.unwrap_or_default(),
            publisher: item.publisher.unwrap_or_default(),
            publisher_id: flatten_ids(item.publisher_id.as_ref()),
            item_id: flatten_ids(item.item_id.as_ref()),
        },
        ReportKind::Platform | ReportKind::Item => ItemIdentity::Platform,
    };

    let mut converted = ReportItem::new(item.platform.unwrap_or_default(), identity);
    for (month, instances) in collect_months(&item.attribute_performance, context)? {
        converted.add_instances(Period::for_month(month), instances);
    }
    Ok(converted)
}

/// Expands one item-report entry into one canonical item per (sub-item, month).
///
/// Entries without an `Items` list are treated as their own single sub-item.
fn convert_item_report_entry(item: CurrentItem, context: &str) -> Result<Vec<ReportItem>, ReportError> {
    let platform = item.platform.unwrap_or_default();
    let parent_title = item.title.or(item.item.clone());

    let sub_items = match item.items {
        Some(sub_items) => sub_items,
        None => vec![CurrentSubItem {
            item: item.item,
            item_id: item.item_id,
            yop: item.yop,
            attribute_performance: item.attribute_performance,
        }],
    };

    let mut converted = Vec::new();
    for (index, sub) in sub_items.into_iter().enumerate() {
        let context = format!("{context}.Items[{index}]");
        let ids: Vec<NameValue> = flatten_ids(sub.item_id.as_ref());
        let title = parent_title.clone().or(sub.item).unwrap_or_default();
        let doi = find_id(&ids, "DOI");
        let yop = sub.yop.map(|y| y.render()).or_else(|| find_id(&ids, "YOP"));

        for (month, instances) in collect_months(&sub.attribute_performance, &context)? {
            let mut entry = ReportItem::new(
                platform.clone(),
                ItemIdentity::Item {
                    title: title.clone(),
                    doi: doi.clone(),
                    yop: yop.clone(),
                },
            );
            entry.add_instances(Period::for_month(month), instances);
            converted.push(entry);
        }
    }
    Ok(converted)
}

/// Groups every block's counts by month, keeping block then metric order.
fn collect_months(
    blocks: &[AttributePerformance],
    context: &str,
) -> Result<BTreeMap<YearMonth, Vec<Instance>>, ReportError> {
    let mut months: BTreeMap<YearMonth, Vec<Instance>> = BTreeMap::new();
    for (index, block) in blocks.iter().enumerate() {
        for (metric, counts) in &block.performance {
            for (token, count) in counts {
                let month: YearMonth = token.parse().map_err(|e| {
                    ReportError::shape(
                        &format!("{context}.Attribute_Performance[{index}].{metric}"),
                        e,
                    )
                })?;
                months
                    .entry(month)
                    .or_default()
                    .push(Instance::new(metric.clone(), *count));
            }
        }
    }
    Ok(months)
}
