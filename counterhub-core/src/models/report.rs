//! Canonical report model.
//!
//! Both wire releases normalize into these types. A [`CanonicalReport`] is
//! built for one (vendor, report) call, handed to the serializer, and then
//! dropped.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::calendar::YearMonth;
use super::exception::ProtocolException;
use super::vendor::ProtocolVersion;

// ============================================================================
// Report Kind
// ============================================================================

/// Report family, resolved once from the report id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    /// `PR*` and anything unrecognised.
    Platform,
    /// `DR*`.
    Database,
    /// `TR*`.
    Title,
    /// `IR*`.
    Item,
}

impl ReportKind {
    /// Resolves the kind from the leading characters of a report id.
    pub fn from_report_id(id: &str) -> Self {
        let id = id.trim().to_uppercase();
        if id.starts_with("TR") {
            Self::Title
        } else if id.starts_with("IR") {
            Self::Item
        } else if id.starts_with("DR") {
            Self::Database
        } else {
            Self::Platform
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Platform => "platform",
            Self::Database => "database",
            Self::Title => "title",
            Self::Item => "item",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Header
// ============================================================================

/// A flattened identifier or filter entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameValue {
    /// Identifier type or filter name.
    pub name: String,
    /// Value.
    pub value: String,
}

impl NameValue {
    /// Creates an entry.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Joins entries as `name:value; name:value`.
    pub fn join(entries: &[NameValue], separator: &str) -> String {
        entries
            .iter()
            .map(|e| format!("{}{separator}{}", e.name, e.value))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Header members only the current release carries, each pre-rendered
/// to a single string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentHeaderExtras {
    /// Metric types requested.
    pub metric_types: Option<String>,
    /// Report attributes applied.
    pub report_attributes: Option<String>,
    /// Exceptions the vendor attached to the header.
    pub exceptions: Option<String>,
    /// Reporting period.
    pub reporting_period: Option<String>,
    /// Registry record URL.
    pub registry_record: Option<String>,
}

/// Report header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportHeader {
    /// Report name.
    pub report_name: String,
    /// Report id as returned by the vendor.
    pub report_id: String,
    /// Release string.
    pub release: String,
    /// Institution name.
    pub institution_name: String,
    /// Institution identifiers.
    pub institution_id: Vec<NameValue>,
    /// Filters the vendor applied.
    pub report_filters: Vec<NameValue>,
    /// Creation timestamp as sent.
    pub created: Option<String>,
    /// Creating system.
    pub created_by: Option<String>,
    /// Exceptions attached to an otherwise valid report.
    pub exceptions: Vec<ProtocolException>,
    /// Header exception entries without a readable code.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unparsed_exceptions: Vec<String>,
    /// Current-release-only members.
    pub extras: Option<CurrentHeaderExtras>,
}

// ============================================================================
// Items
// ============================================================================

/// Kind-specific identity of a report item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemIdentity {
    /// Platform reports carry no further identity.
    Platform,
    /// Database reports.
    Database {
        /// Database name.
        database: String,
        /// Publisher name.
        publisher: String,
        /// Publisher identifiers.
        publisher_id: Vec<NameValue>,
        /// Item identifiers.
        item_id: Vec<NameValue>,
    },
    /// Title reports.
    Title {
        /// Title.
        title: String,
        /// Publisher name.
        publisher: String,
        /// Publisher identifiers.
        publisher_id: Vec<NameValue>,
        /// Item identifiers.
        item_id: Vec<NameValue>,
    },
    /// Item reports.
    Item {
        /// Item title.
        title: String,
        /// DOI of the item.
        doi: Option<String>,
        /// Year of publication.
        yop: Option<String>,
    },
}

impl ItemIdentity {
    /// The report kind this identity belongs to.
    pub fn kind(&self) -> ReportKind {
        match self {
            Self::Platform => ReportKind::Platform,
            Self::Database { .. } => ReportKind::Database,
            Self::Title { .. } => ReportKind::Title,
            Self::Item { .. } => ReportKind::Item,
        }
    }
}

/// Reporting period of a performance entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    /// First day.
    pub begin: NaiveDate,
    /// Last day.
    pub end: NaiveDate,
}

impl Period {
    /// Creates a period.
    pub fn new(begin: NaiveDate, end: NaiveDate) -> Self {
        Self { begin, end }
    }

    /// The whole of one calendar month.
    pub fn for_month(month: YearMonth) -> Self {
        Self {
            begin: month.first_day(),
            end: month.last_day(),
        }
    }

    /// Month containing `begin`.
    pub fn begin_month(&self) -> YearMonth {
        YearMonth::from_date(self.begin)
    }

    /// Month containing `end`.
    pub fn end_month(&self) -> YearMonth {
        YearMonth::from_date(self.end)
    }

    /// Every month the period touches.
    pub fn months(&self) -> Vec<YearMonth> {
        self.begin_month().iter_through(self.end_month()).collect()
    }
}

/// One metric count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    /// Metric type, e.g. `Total_Item_Requests`.
    pub metric_type: String,
    /// Non-negative count.
    pub count: u64,
}

impl Instance {
    /// Creates an instance.
    pub fn new(metric_type: impl Into<String>, count: u64) -> Self {
        Self {
            metric_type: metric_type.into(),
            count,
        }
    }
}

/// Counts for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Performance {
    /// Period covered.
    pub period: Period,
    /// Counts within the period.
    pub instances: Vec<Instance>,
}

/// One row-group of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportItem {
    /// Platform name.
    pub platform: String,
    /// Kind-specific identity.
    pub identity: ItemIdentity,
    /// Performance entries, at most one per period.
    pub performance: Vec<Performance>,
}

impl ReportItem {
    /// Creates an item with no performance yet.
    pub fn new(platform: impl Into<String>, identity: ItemIdentity) -> Self {
        Self {
            platform: platform.into(),
            identity,
            performance: Vec::new(),
        }
    }

    /// Adds instances for `period`, merging into an existing entry with the
    /// same period.
    pub fn add_instances(&mut self, period: Period, instances: impl IntoIterator<Item = Instance>) {
        if let Some(existing) = self.performance.iter_mut().find(|p| p.period == period) {
            existing.instances.extend(instances);
        } else {
            self.performance.push(Performance {
                period,
                instances: instances.into_iter().collect(),
            });
        }
    }

    /// Distinct metric types in first-seen order.
    pub fn metric_types(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for instance in self.performance.iter().flat_map(|p| &p.instances) {
            if !seen.contains(&instance.metric_type.as_str()) {
                seen.push(&instance.metric_type);
            }
        }
        seen
    }
}

// ============================================================================
// Canonical Report
// ============================================================================

/// Release-independent report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalReport {
    /// Release the payload was parsed as.
    pub version: ProtocolVersion,
    /// Report family.
    pub kind: ReportKind,
    /// Header block.
    pub header: ReportHeader,
    /// Items in payload order.
    pub items: Vec<ReportItem>,
}

impl CanonicalReport {
    /// Creates an empty report.
    pub fn new(version: ProtocolVersion, kind: ReportKind, header: ReportHeader) -> Self {
        Self {
            version,
            kind,
            header,
            items: Vec::new(),
        }
    }

    /// Total number of instances across all items.
    pub fn instance_count(&self) -> usize {
        self.items
            .iter()
            .flat_map(|i| &i.performance)
            .map(|p| p.instances.len())
            .sum()
    }
}
