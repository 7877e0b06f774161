//! Request URL building.
//!
//! Discovery is `GET {base}?customer_id=..&requestor_id=..[&api_key=..]`.
//! Retrieval is `GET {base}/{report id, lowercase}` with the same credentials
//! plus `begin_date`/`end_date` and, for custom definitions, the filter and
//! attribute parameters.

use counterhub_core::{
    AttributeValue, MonthRange, ProtocolVersion, ReportDefinition, VendorConnection,
};
use url::Url;

use crate::error::FetchError;

/// Attribute that maps to the release 5 `granularity` parameter.
pub const MONTHLY_DETAIL_ATTRIBUTE: &str = "Exclude_Monthly_Details";

/// Filter whose "All" value is never sent.
pub const YOP_FILTER: &str = "YOP";

/// Builds the discovery URL for `connection`.
///
/// # Errors
///
/// Returns [`FetchError::InvalidUrl`] if the base URL does not parse.
pub fn discovery_url(connection: &VendorConnection) -> Result<Url, FetchError> {
    let mut url = Url::parse(connection.base_url.trim())?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("customer_id", &connection.customer_id);
        query.append_pair("requestor_id", &connection.requestor_id);
        if let Some(key) = api_key(connection) {
            query.append_pair("api_key", key);
        }
    }
    Ok(url)
}

/// Builds the retrieval URL for one definition over `range`.
///
/// # Errors
///
/// Returns [`FetchError::InvalidUrl`] if the base URL does not parse.
pub fn report_url(
    connection: &VendorConnection,
    definition: &ReportDefinition,
    version: ProtocolVersion,
    range: MonthRange,
) -> Result<Url, FetchError> {
    let base = connection.base_url.trim().trim_end_matches('/');
    let mut url = Url::parse(&format!("{base}/{}", definition.id.trim().to_lowercase()))?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("customer_id", &connection.customer_id);
        query.append_pair("requestor_id", &connection.requestor_id);
        query.append_pair("begin_date", &range.begin.to_string());
        query.append_pair("end_date", &range.end.to_string());
        if let Some(key) = api_key(connection) {
            query.append_pair("api_key", key);
        }

        if definition.is_custom() {
            for (name, value) in &definition.filters {
                if skip_filter(name, value.is_all(), version) {
                    continue;
                }
                query.append_pair(&name.to_lowercase(), &value.to_query_value());
            }

            for (name, value) in &definition.attributes {
                match value {
                    AttributeValue::Flag(flag) if name.eq_ignore_ascii_case(MONTHLY_DETAIL_ATTRIBUTE) => {
                        if version == ProtocolVersion::Legacy {
                            query.append_pair("granularity", if *flag { "totals" } else { "month" });
                        }
                    }
                    AttributeValue::Flag(true) => {
                        query.append_key_only(&name.to_lowercase());
                    }
                    AttributeValue::Flag(false) => {}
                    AttributeValue::Columns(columns) => {
                        if !columns.is_empty() {
                            query.append_pair(&name.to_lowercase(), &columns.join("|"));
                        }
                    }
                }
            }
        }
    }
    Ok(url)
}

fn api_key(connection: &VendorConnection) -> Option<&str> {
    connection
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
}

fn skip_filter(name: &str, is_all: bool, version: ProtocolVersion) -> bool {
    let lower = name.to_lowercase();
    // Dates come from the requested range.
    if lower == "begin_date" || lower == "end_date" {
        return true;
    }
    if name.eq_ignore_ascii_case(YOP_FILTER) && is_all {
        return true;
    }
    version == ProtocolVersion::Current && lower.starts_with("access")
}

#[cfg(test)]
mod tests {
    use super::*;
    use counterhub_core::FilterValue;

    fn connection() -> VendorConnection {
        let mut conn = VendorConnection::new("https://sushi.acme.test/r5/", "C1");
        conn.requestor_id = "R1".to_string();
        conn
    }

    fn range() -> MonthRange {
        MonthRange::new("2023-01".parse().unwrap(), "2023-03".parse().unwrap()).unwrap()
    }

    fn pairs(url: &Url) -> Vec<(String, String)> {
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    fn custom_tr() -> ReportDefinition {
        ReportDefinition::new("TR", "Custom TR")
            .with_filter("Data_Type", FilterValue::Values(vec!["Book".into(), "Journal".into()]))
            .with_filter("YOP", FilterValue::Single("All".into()))
            .with_filter("Access_Type", FilterValue::Values(vec!["Controlled".into()]))
            .with_filter("Platform", FilterValue::Single("All".into()))
            .with_attribute(MONTHLY_DETAIL_ATTRIBUTE, AttributeValue::Flag(true))
            .with_attribute("Include_Parent_Details", AttributeValue::Flag(true))
            .with_attribute("Include_Component_Details", AttributeValue::Flag(false))
            .with_attribute(
                "Attributes_To_Show",
                AttributeValue::Columns(vec!["YOP".into(), "Access_Type".into()]),
            )
    }

    #[test]
    fn test_discovery_url() {
        let mut conn = connection();
        conn.api_key = Some("k".to_string());
        let url = discovery_url(&conn).unwrap();
        assert_eq!(url.path(), "/r5/");
        assert_eq!(
            pairs(&url),
            vec![
                ("customer_id".into(), "C1".into()),
                ("requestor_id".into(), "R1".into()),
                ("api_key".into(), "k".into()),
            ]
        );
    }

    #[test]
    fn test_standard_report_url() {
        let def = ReportDefinition::new("TR_J1", "Journal Requests").with_filter(
            "Data_Type",
            FilterValue::Single("Journal".into()),
        );
        let url = report_url(&connection(), &def, ProtocolVersion::Current, range()).unwrap();
        assert_eq!(url.path(), "/r5/tr_j1");
        assert_eq!(
            pairs(&url),
            vec![
                ("customer_id".into(), "C1".into()),
                ("requestor_id".into(), "R1".into()),
                ("begin_date".into(), "2023-01".into()),
                ("end_date".into(), "2023-03".into()),
            ]
        );
    }

    #[test]
    fn test_custom_legacy_params() {
        let url = report_url(&connection(), &custom_tr(), ProtocolVersion::Legacy, range()).unwrap();
        let query = pairs(&url);

        assert!(query.contains(&("data_type".into(), "Book|Journal".into())));
        assert!(query.contains(&("access_type".into(), "Controlled".into())));
        assert!(query.contains(&("platform".into(), "All".into())));
        assert!(query.contains(&("granularity".into(), "totals".into())));
        assert!(query.contains(&("include_parent_details".into(), String::new())));
        assert!(query.contains(&("attributes_to_show".into(), "YOP|Access_Type".into())));
        assert!(!query.iter().any(|(k, _)| k == "yop"));
        assert!(!query.iter().any(|(k, _)| k == "include_component_details"));
        assert!(url.as_str().contains("&include_parent_details&") || url.as_str().ends_with("&include_parent_details"));
    }

    #[test]
    fn test_custom_current_params() {
        let url = report_url(&connection(), &custom_tr(), ProtocolVersion::Current, range()).unwrap();
        let query = pairs(&url);

        assert!(!query.iter().any(|(k, _)| k.starts_with("access")));
        assert!(!query.iter().any(|(k, _)| k == "granularity"));
        assert!(query.contains(&("data_type".into(), "Book|Journal".into())));
    }

    #[test]
    fn test_invalid_base_url() {
        let conn = VendorConnection::new("not a url", "C1");
        assert!(matches!(discovery_url(&conn), Err(FetchError::InvalidUrl(_))));
    }
}
