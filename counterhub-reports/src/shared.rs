//! Wire fragments common to both releases.

use chrono::NaiveDate;
use counterhub_core::{NameValue, ProtocolException};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::ReportError;

// ============================================================================
// Scalars
// ============================================================================

/// A string, number or boolean as vendors send them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Text value.
    Text(String),
    /// Numeric value, kept as written.
    Number(serde_json::Number),
    /// Boolean value.
    Flag(bool),
}

impl Scalar {
    /// Renders the value as text.
    pub fn render(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => n.to_string(),
            Self::Flag(b) => b.to_string(),
        }
    }
}

/// One scalar or a list of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ScalarOrList {
    /// Single value.
    One(Scalar),
    /// Several values.
    Many(Vec<Scalar>),
}

impl ScalarOrList {
    /// Renders the value, joining lists with `|`.
    pub fn render(&self) -> String {
        match self {
            Self::One(s) => s.render(),
            Self::Many(items) => items.iter().map(Scalar::render).collect::<Vec<_>>().join("|"),
        }
    }
}

// ============================================================================
// Identifier Lists
// ============================================================================

/// A `{Type|Name, Value}` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct WirePair {
    /// Identifier type or filter name.
    #[serde(rename = "Type", alias = "Name")]
    pub name: String,
    /// Identifier value.
    #[serde(rename = "Value")]
    pub value: ScalarOrList,
}

/// Identifier and filter lists arrive either as an array of pairs or as a
/// `name -> value` object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IdentifierList {
    /// `[{"Type": "ISNI", "Value": "..."}]`
    Pairs(Vec<WirePair>),
    /// `{"ISNI": ["..."]}`
    Map(BTreeMap<String, ScalarOrList>),
}

impl IdentifierList {
    /// Flattens the list into name/value pairs.
    pub fn flatten(&self) -> Vec<NameValue> {
        match self {
            Self::Pairs(pairs) => pairs
                .iter()
                .map(|p| NameValue::new(&p.name, p.value.render()))
                .collect(),
            Self::Map(map) => map
                .iter()
                .map(|(name, value)| NameValue::new(name, value.render()))
                .collect(),
        }
    }
}

/// Flattens an optional identifier list.
pub fn flatten_ids(list: Option<&IdentifierList>) -> Vec<NameValue> {
    list.map(IdentifierList::flatten).unwrap_or_default()
}

/// Finds the value of identifier `name` (case-insensitive).
pub fn find_id(ids: &[NameValue], name: &str) -> Option<String> {
    ids.iter()
        .find(|id| id.name.eq_ignore_ascii_case(name))
        .map(|id| id.value.clone())
}

// ============================================================================
// Exceptions
// ============================================================================

/// Header exceptions as read from a report.
#[derive(Debug, Default)]
pub struct HeaderExceptions {
    /// Entries with a readable code.
    pub parsed: Vec<ProtocolException>,
    /// Entries without a usable code, rendered as text.
    pub unparsed: Vec<String>,
}

/// Parses a header `Exceptions` member (an array or a single object).
///
/// Never fails: a code may be a number or a numeric string, and any entry
/// without a usable code is kept as rendered text.
pub fn parse_exceptions(value: Option<&Value>) -> HeaderExceptions {
    let mut out = HeaderExceptions::default();
    let entries = match value {
        None | Some(Value::Null) => return out,
        Some(Value::Array(entries)) => entries.iter().collect::<Vec<_>>(),
        Some(other) => vec![other],
    };
    for entry in entries {
        match parse_exception(entry) {
            Some(exception) => out.parsed.push(exception),
            None => out.unparsed.push(render_value(entry)),
        }
    }
    out
}

fn parse_exception(entry: &Value) -> Option<ProtocolException> {
    let Value::Object(fields) = entry else {
        return None;
    };
    let field = |name: &str| {
        fields
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    };
    let code = match field("Code")? {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    let text = |name: &str| field(name).filter(|v| !v.is_null()).map(render_value);
    Some(
        ProtocolException::new(code, text("Message").unwrap_or_default())
            .with_severity(text("Severity"))
            .with_data(text("Data")),
    )
}

// ============================================================================
// Rendering
// ============================================================================

/// Renders an arbitrary header member as one string.
///
/// Lists are joined with `|` and objects become `key=value` pairs joined
/// with `;`.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items.iter().map(render_value).collect::<Vec<_>>().join("|"),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{k}={}", render_value(v)))
            .collect::<Vec<_>>()
            .join(";"),
    }
}

/// Renders an optional header member, dropping nulls.
pub fn render_optional(value: Option<&Value>) -> Option<String> {
    value.filter(|v| !v.is_null()).map(render_value)
}

// ============================================================================
// Dates
// ============================================================================

/// Parses a `YYYY-MM-DD` period bound.
pub fn parse_date(raw: &str, context: &str) -> Result<NaiveDate, ReportError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| ReportError::shape(context, format!("invalid date {raw:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identifier_pairs_and_map() {
        let pairs: IdentifierList =
            serde_json::from_value(json!([{"Type": "ISNI", "Value": "0000"}])).unwrap();
        assert_eq!(pairs.flatten(), vec![NameValue::new("ISNI", "0000")]);

        let map: IdentifierList =
            serde_json::from_value(json!({"Proprietary": ["a:1", "b:2"]})).unwrap();
        assert_eq!(map.flatten(), vec![NameValue::new("Proprietary", "a:1|b:2")]);
    }

    #[test]
    fn test_filter_pairs_use_name() {
        let list: IdentifierList =
            serde_json::from_value(json!([{"Name": "Begin_Date", "Value": "2023-01-01"}]))
                .unwrap();
        assert_eq!(list.flatten()[0].name, "Begin_Date");
    }

    #[test]
    fn test_render_value() {
        let value = json!({"Attributes_To_Show": ["YOP", "Access_Type"], "Granularity": "Month"});
        assert_eq!(
            render_value(&value),
            "Attributes_To_Show=YOP|Access_Type;Granularity=Month"
        );
        assert_eq!(render_value(&json!(["A", "B"])), "A|B");
    }

    #[test]
    fn test_parse_exceptions_variants() {
        let one = json!({"Code": 3040, "Message": "Partial", "Severity": "Warning"});
        let list = json!([{"code": 3031, "message": "Not ready"}]);

        let parsed = parse_exceptions(Some(&one)).parsed;
        assert_eq!(parsed[0].code, 3040);
        assert_eq!(parsed[0].severity.as_deref(), Some("Warning"));
        assert_eq!(parse_exceptions(Some(&list)).parsed[0].code, 3031);
        assert!(parse_exceptions(None).parsed.is_empty());
    }

    #[test]
    fn test_parse_exceptions_lenient() {
        let mixed = json!([
            {"Code": "3040", "Message": "Partial"},
            {"Message": "no code here"},
            {"Code": "soon"}
        ]);

        let exceptions = parse_exceptions(Some(&mixed));
        assert_eq!(exceptions.parsed.len(), 1);
        assert_eq!(exceptions.parsed[0].code, 3040);
        assert_eq!(exceptions.parsed[0].meaning, "Partial Data Returned");
        assert_eq!(exceptions.unparsed, vec!["Message=no code here", "Code=soon"]);

        let scalar = parse_exceptions(Some(&json!("oops")));
        assert!(scalar.parsed.is_empty());
        assert_eq!(scalar.unparsed, vec!["oops"]);
    }
}
