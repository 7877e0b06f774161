//! Tab-delimited report layout.
//!
//! Output is a header block of `Name\tValue` lines, a blank line, a column
//! header row and one data row per (item, metric type).

use counterhub_core::{CanonicalReport, ItemIdentity, MonthRange, NameValue, ReportItem, ReportKind, YearMonth};
use std::collections::BTreeSet;
use tracing::debug;

use crate::error::ReportError;

// ============================================================================
// Table Model
// ============================================================================

/// One data row.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    /// Identity column values, in column order.
    pub identity: Vec<String>,
    /// Metric type of the row.
    pub metric_type: String,
    /// Sum of `values`.
    pub total: f64,
    /// Allocated count per month column.
    pub values: Vec<f64>,
}

/// The body of a report before it is rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    /// Identity column headings.
    pub identity_columns: Vec<&'static str>,
    /// Month columns, sorted.
    pub months: Vec<YearMonth>,
    /// Data rows.
    pub rows: Vec<ReportRow>,
}

/// Splits `count` evenly over `months` months.
///
/// A zero month span yields no shares.
#[allow(clippy::cast_precision_loss)]
pub fn allocate_evenly(count: u64, months: usize) -> Vec<f64> {
    if months == 0 {
        return Vec::new();
    }
    let share = count as f64 / months as f64;
    vec![share; months]
}

/// Identity column headings for `kind`.
pub fn identity_columns(kind: ReportKind) -> Vec<&'static str> {
    match kind {
        ReportKind::Platform => vec!["Platform"],
        ReportKind::Database => vec!["Database", "Publisher", "Publisher_ID", "Platform", "Item_ID"],
        ReportKind::Title => vec!["Title", "Publisher", "Publisher_ID", "Platform", "Item_ID"],
        ReportKind::Item => vec!["Item", "Platform", "DOI", "YOP"],
    }
}

// ============================================================================
// Serializer
// ============================================================================

/// Lays a [`CanonicalReport`] out as TSV text.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportSerializer {
    range: Option<MonthRange>,
}

impl ReportSerializer {
    /// Creates a serializer whose month columns come from the data only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a serializer that always includes every month of `range`.
    pub fn with_range(range: MonthRange) -> Self {
        Self { range: Some(range) }
    }

    /// Renders `report` as a complete TSV document.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Serialization`] if an item's identity does not
    /// match the report kind.
    pub fn serialize(&self, report: &CanonicalReport) -> Result<String, ReportError> {
        let table = self.table(report)?;

        let mut out = String::new();
        write_header(&mut out, report);
        out.push('\n');

        let mut columns: Vec<String> = table.identity_columns.iter().map(ToString::to_string).collect();
        columns.push("Metric_Type".to_string());
        columns.push("Reporting_Period_Total".to_string());
        columns.extend(table.months.iter().map(YearMonth::column_label));
        out.push_str(&columns.join("\t"));
        out.push('\n');

        for row in &table.rows {
            let mut cells: Vec<String> = row.identity.iter().map(|c| clean(c)).collect();
            cells.push(clean(&row.metric_type));
            cells.push(format_count(row.total));
            cells.extend(row.values.iter().map(|v| format_count(*v)));
            out.push_str(&cells.join("\t"));
            out.push('\n');
        }

        debug!(
            report = %report.header.report_id,
            rows = table.rows.len(),
            months = table.months.len(),
            "Report serialized"
        );

        Ok(out)
    }

    /// Computes the month columns and allocated rows for `report`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Serialization`] if an item's identity does not
    /// match the report kind.
    pub fn table(&self, report: &CanonicalReport) -> Result<ReportTable, ReportError> {
        let months = self.month_columns(report);

        let mut rows = Vec::new();
        for (index, item) in report.items.iter().enumerate() {
            if item.identity.kind() != report.kind {
                return Err(ReportError::Serialization(format!(
                    "item {index} is a {} item in a {} report",
                    item.identity.kind(),
                    report.kind
                )));
            }
            let identity = identity_values(item);
            for metric in item.metric_types() {
                let values = allocate_row(item, metric, &months);
                rows.push(ReportRow {
                    identity: identity.clone(),
                    metric_type: metric.to_string(),
                    total: values.iter().sum(),
                    values,
                });
            }
        }

        Ok(ReportTable {
            identity_columns: identity_columns(report.kind),
            months,
            rows,
        })
    }

    fn month_columns(&self, report: &CanonicalReport) -> Vec<YearMonth> {
        let mut months: BTreeSet<YearMonth> = report
            .items
            .iter()
            .flat_map(|i| &i.performance)
            .flat_map(|p| p.period.months())
            .collect();
        if let Some(range) = self.range {
            months.extend(range.months());
        }
        months.into_iter().collect()
    }
}

fn allocate_row(item: &ReportItem, metric: &str, months: &[YearMonth]) -> Vec<f64> {
    let mut values = vec![0.0; months.len()];
    for performance in &item.performance {
        let spanned = performance.period.months();
        for instance in performance.instances.iter().filter(|i| i.metric_type == metric) {
            for (month, share) in spanned.iter().zip(allocate_evenly(instance.count, spanned.len())) {
                if let Ok(column) = months.binary_search(month) {
                    values[column] += share;
                }
            }
        }
    }
    values
}

fn identity_values(item: &ReportItem) -> Vec<String> {
    match &item.identity {
        ItemIdentity::Platform => vec![item.platform.clone()],
        ItemIdentity::Database { database: name, publisher, publisher_id, item_id }
        | ItemIdentity::Title { title: name, publisher, publisher_id, item_id } => vec![
            name.clone(),
            publisher.clone(),
            NameValue::join(publisher_id, ":"),
            item.platform.clone(),
            NameValue::join(item_id, ":"),
        ],
        ItemIdentity::Item { title, doi, yop } => vec![
            title.clone(),
            item.platform.clone(),
            doi.clone().unwrap_or_default(),
            yop.clone().unwrap_or_default(),
        ],
    }
}

fn write_header(out: &mut String, report: &CanonicalReport) {
    let header = &report.header;
    let mut line = |name: &str, value: &str| {
        out.push_str(&format!("{name}\t{}\n", clean(value)));
    };

    line("Report_Name", &header.report_name);
    line("Report_ID", &header.report_id);
    line("Release", &header.release);
    line("Institution_Name", &header.institution_name);
    line("Institution_ID", &NameValue::join(&header.institution_id, ":"));
    line("Report_Filters", &NameValue::join(&header.report_filters, "="));
    if let Some(extras) = &header.extras {
        line("Metric_Types", extras.metric_types.as_deref().unwrap_or_default());
        line("Report_Attributes", extras.report_attributes.as_deref().unwrap_or_default());
        line("Exceptions", extras.exceptions.as_deref().unwrap_or_default());
        line("Reporting_Period", extras.reporting_period.as_deref().unwrap_or_default());
    }
    line("Created", header.created.as_deref().unwrap_or_default());
    line("Created_By", header.created_by.as_deref().unwrap_or_default());
    if let Some(extras) = &header.extras {
        line("Registry_Record", extras.registry_record.as_deref().unwrap_or_default());
    }
}

/// Tabs and line breaks would shift columns.
fn clean(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}

fn format_count(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{:.0}", value.round())
    } else {
        let text = format!("{value:.4}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
