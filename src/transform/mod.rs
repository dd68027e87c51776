//! Stateless data transforms behind the view endpoints.
//!
//! Every function here is a pure, single-pass transform over rows fetched
//! from the database. Per-row parse problems are logged and the row dropped;
//! they never abort a request.

mod alerts;
mod filters;
mod map;
mod survey;

pub use alerts::{prepare_alert_data, prepare_alert_statistics, transform_to_geojson};
pub use filters::{
    filter_data_by_extension, filter_geo_data, filter_out_unwanted_values, filter_unwanted_keys,
};
pub use map::prepare_map_data;
pub use survey::transform_survey_data;

/// A table row surfaced as a JSON object.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Split a comma-separated config string into trimmed, non-empty entries.
pub fn csv_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a geometry coordinates value, which arrives either as a JSON text
/// column or as native JSON.
pub(crate) fn parse_coordinates(value: &serde_json::Value) -> Option<serde_json::Value> {
    match value {
        serde_json::Value::String(s) => match serde_json::from_str(s) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("malformed coordinates {:?}: {}", s, e);
                None
            }
        },
        serde_json::Value::Array(_) => Some(value.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_list() {
        assert_eq!(csv_list("a, b ,c"), vec!["a", "b", "c"]);
        assert_eq!(csv_list("  "), Vec::<String>::new());
        assert_eq!(csv_list(""), Vec::<String>::new());
        assert_eq!(csv_list("one,,two,"), vec!["one", "two"]);
    }

    #[test]
    fn test_parse_coordinates() {
        let text = serde_json::json!("[102.5, 0.5]");
        assert_eq!(
            parse_coordinates(&text),
            Some(serde_json::json!([102.5, 0.5]))
        );

        let native = serde_json::json!([1.0, 2.0]);
        assert_eq!(parse_coordinates(&native), Some(native.clone()));

        assert_eq!(parse_coordinates(&serde_json::json!("not json")), None);
        assert_eq!(parse_coordinates(&serde_json::json!(42)), None);
    }
}
