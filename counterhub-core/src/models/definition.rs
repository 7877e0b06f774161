//! Report definitions.
//!
//! A definition names a report and optionally narrows it with filters and
//! attributes. Standard definitions carry neither; a "custom" definition is
//! one the user edited, recognised by its name.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sentinel filter value meaning "no restriction".
pub const ALL_SENTINEL: &str = "All";

/// Value of a report filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Allowed values, joined with `|` on the wire.
    Values(Vec<String>),
    /// A single value, possibly the `All` sentinel.
    Single(String),
}

impl FilterValue {
    /// Returns true for the `All` sentinel.
    pub fn is_all(&self) -> bool {
        match self {
            Self::Single(v) => v.eq_ignore_ascii_case(ALL_SENTINEL),
            Self::Values(vs) => vs.len() == 1 && vs[0].eq_ignore_ascii_case(ALL_SENTINEL),
        }
    }

    /// Wire representation.
    pub fn to_query_value(&self) -> String {
        match self {
            Self::Single(v) => v.clone(),
            Self::Values(vs) => vs.join("|"),
        }
    }
}

/// Value of a report attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Boolean switch.
    Flag(bool),
    /// Columns to show.
    Columns(Vec<String>),
}

/// A named report template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDefinition {
    /// Report identifier, e.g. `TR_J1`.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Filter name to value.
    #[serde(default)]
    pub filters: BTreeMap<String, FilterValue>,
    /// Attribute name to value.
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
}

const STANDARD_REPORTS: &[(&str, &str)] = &[
    ("PR", "Platform Master Report"),
    ("PR_P1", "Platform Usage"),
    ("DR", "Database Master Report"),
    ("DR_D1", "Database Search and Item Usage"),
    ("DR_D2", "Database Access Denied"),
    ("TR", "Title Master Report"),
    ("TR_B1", "Book Requests (Excluding OA_Gold)"),
    ("TR_B2", "Book Access Denied"),
    ("TR_B3", "Book Usage by Access Type"),
    ("TR_J1", "Journal Requests (Excluding OA_Gold)"),
    ("TR_J2", "Journal Access Denied"),
    ("TR_J3", "Journal Usage by Access Type"),
    ("TR_J4", "Journal Requests by YOP (Excluding OA_Gold)"),
    ("IR", "Item Master Report"),
    ("IR_A1", "Journal Article Requests"),
    ("IR_M1", "Multimedia Item Requests"),
];

impl ReportDefinition {
    /// Creates a definition with no filters or attributes.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            filters: BTreeMap::new(),
            attributes: BTreeMap::new(),
        }
    }

    /// Adds a filter.
    #[must_use]
    pub fn with_filter(mut self, name: impl Into<String>, value: FilterValue) -> Self {
        self.filters.insert(name.into(), value);
        self
    }

    /// Adds an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Built-in standard definitions.
    pub fn standard_catalogue() -> Vec<ReportDefinition> {
        STANDARD_REPORTS
            .iter()
            .map(|(id, name)| Self::new(*id, *name))
            .collect()
    }

    /// Upper-cased report id, the form discovery returns.
    pub fn normalized_id(&self) -> String {
        self.id.trim().to_uppercase()
    }

    /// Whether this definition was user-edited from its template.
    pub fn is_custom(&self) -> bool {
        self.name.to_lowercase().contains("custom")
    }

    /// Report token used in output file names.
    ///
    /// Custom definitions append a slug of their name, so two customs of
    /// the same report in one batch write to different files.
    pub fn file_token(&self) -> String {
        if self.is_custom() {
            format!("{}_{}", self.normalized_id(), slug(&self.name))
        } else {
            self.normalized_id()
        }
    }
}

/// Lowercase ASCII letters and digits with single dashes between words.
fn slug(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
