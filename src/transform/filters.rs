//! Row and column filters driven by the views configuration.

use std::collections::HashSet;

use serde_json::Value;

use super::{csv_list, parse_coordinates, Row};
use crate::db::ColumnDef;

/// Drop configured columns from every row.
///
/// `unwanted_columns` is an exact-name blacklist and `unwanted_substrings` a
/// substring blacklist, both comma-separated. When a `__columns` mapping is
/// present the blacklists are matched against the original column names and
/// resolved to SQL column names; row keys are always matched directly as
/// well, which covers tables without a mapping.
pub fn filter_unwanted_keys(
    rows: Vec<Row>,
    columns: Option<&[ColumnDef]>,
    unwanted_columns: &str,
    unwanted_substrings: &str,
) -> Vec<Row> {
    let names: HashSet<String> = csv_list(unwanted_columns).into_iter().collect();
    let substrings = csv_list(unwanted_substrings);

    if names.is_empty() && substrings.is_empty() {
        return rows;
    }

    let unwanted = |name: &str| {
        names.contains(name) || substrings.iter().any(|sub| name.contains(sub.as_str()))
    };

    let mapped: HashSet<&str> = columns
        .unwrap_or_default()
        .iter()
        .filter(|c| unwanted(&c.original_column))
        .map(|c| c.sql_column.as_str())
        .collect();

    rows.into_iter()
        .map(|row| {
            row.into_iter()
                .filter(|(key, _)| !mapped.contains(key.as_str()) && !unwanted(key))
                .collect()
        })
        .collect()
}

/// Drop rows whose value in `filter_column` matches one of the
/// comma-separated `filter_values`.
pub fn filter_out_unwanted_values(
    rows: Vec<Row>,
    filter_column: &str,
    filter_values: &str,
) -> Vec<Row> {
    let values: HashSet<String> = csv_list(filter_values).into_iter().collect();
    if filter_column.is_empty() || values.is_empty() {
        return rows;
    }

    rows.into_iter()
        .filter(|row| match row.get(filter_column) {
            Some(Value::String(s)) => !values.contains(s.trim()),
            Some(Value::Null) | None => true,
            Some(other) => !values.contains(other.to_string().as_str()),
        })
        .collect()
}

/// Keep rows carrying a parseable, valid `g__coordinates` geometry.
pub fn filter_geo_data(rows: Vec<Row>) -> Vec<Row> {
    rows.into_iter()
        .filter(|row| {
            row.get("g__coordinates")
                .and_then(parse_coordinates)
                .map(|coords| is_valid_geolocation(&coords))
                .unwrap_or(false)
        })
        .collect()
}

/// Validate a coordinates structure.
///
/// A flat array of numbers must be non-empty, of even length, and all
/// finite; nested arrays are validated recursively. Anything else is
/// invalid.
pub fn is_valid_geolocation(coordinates: &Value) -> bool {
    let finite = |v: &Value| v.as_f64().map(f64::is_finite).unwrap_or(false);

    match coordinates {
        Value::Array(items) if items.iter().all(Value::is_number) => {
            !items.is_empty() && items.len() % 2 == 0 && items.iter().all(finite)
        }
        Value::Array(items) => !items.is_empty() && items.iter().all(is_valid_geolocation),
        _ => false,
    }
}

/// Keep rows where some value references a file with one of the configured
/// media extensions (comma-separated, with or without leading dots).
pub fn filter_data_by_extension(rows: Vec<Row>, extensions: &str) -> Vec<Row> {
    let suffixes: Vec<String> = csv_list(extensions)
        .into_iter()
        .map(|ext| format!(".{}", ext.trim_start_matches('.').to_lowercase()))
        .collect();

    if suffixes.is_empty() {
        return Vec::new();
    }

    rows.into_iter()
        .filter(|row| {
            row.values().any(|value| match value {
                Value::String(s) => {
                    let lower = s.to_lowercase();
                    suffixes.iter().any(|suffix| {
                        // match "photo.jpg" and "photo.jpg, photo2.jpg"
                        lower.split(|c: char| c == ',' || c.is_whitespace()).any(
                            |candidate| !candidate.is_empty() && candidate.ends_with(suffix),
                        )
                    })
                }
                _ => false,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: serde_json::Value) -> Row {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_filter_unwanted_keys_without_mapping() {
        let rows = vec![row(json!({
            "name": "Rio Claro",
            "deviceid": "abc-123",
            "meta_instance_id": "uuid:1",
            "notes": "clear water"
        }))];

        let filtered = filter_unwanted_keys(rows, None, "deviceid", "meta_");
        let keys: Vec<&String> = filtered[0].keys().collect();
        assert_eq!(keys, vec!["name", "notes"]);
    }

    #[test]
    fn test_filter_unwanted_keys_resolves_column_mapping() {
        let columns = vec![
            ColumnDef {
                original_column: "Device ID".to_string(),
                sql_column: "p__device_id".to_string(),
            },
            ColumnDef {
                original_column: "River name".to_string(),
                sql_column: "p__river_name".to_string(),
            },
        ];
        let rows = vec![row(json!({
            "p__device_id": "abc",
            "p__river_name": "Rio Claro"
        }))];

        let filtered = filter_unwanted_keys(rows, Some(&columns), "Device ID", "");
        let keys: Vec<&String> = filtered[0].keys().collect();
        assert_eq!(keys, vec!["p__river_name"]);
    }

    #[test]
    fn test_filter_unwanted_keys_noop_without_config() {
        let rows = vec![row(json!({"a": 1, "b": 2}))];
        let filtered = filter_unwanted_keys(rows.clone(), None, "", "");
        assert_eq!(filtered, rows);
    }

    #[test]
    fn test_filter_out_unwanted_values() {
        let rows = vec![
            row(json!({"status": "approved", "id": 1})),
            row(json!({"status": "rejected", "id": 2})),
            row(json!({"status": "pending", "id": 3})),
            row(json!({"id": 4})),
        ];

        let kept = filter_out_unwanted_values(rows, "status", "rejected, pending");
        let ids: Vec<i64> = kept
            .iter()
            .map(|r| r.get("id").unwrap().as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn test_is_valid_geolocation() {
        assert!(is_valid_geolocation(&json!([102.5, 0.5])));
        assert!(is_valid_geolocation(&json!([[102.0, 0.0], [103.0, 1.0]])));
        assert!(is_valid_geolocation(&json!([[
            [100.0, 0.0],
            [101.0, 0.0],
            [101.0, 1.0],
            [100.0, 0.0]
        ]])));

        // odd-length point array
        assert!(!is_valid_geolocation(&json!([102.5, 0.5, 1.0])));
        // non-finite / non-numeric leaves
        assert!(!is_valid_geolocation(&json!([102.5, "0.5"])));
        assert!(!is_valid_geolocation(&json!([[102.0, 0.0], "oops"])));
        // empty or not an array
        assert!(!is_valid_geolocation(&json!([])));
        assert!(!is_valid_geolocation(&json!("102.5,0.5")));
        assert!(!is_valid_geolocation(&json!(null)));
    }

    #[test]
    fn test_filter_geo_data() {
        let rows = vec![
            row(json!({"id": 1, "g__coordinates": "[102.5, 0.5]"})),
            row(json!({"id": 2, "g__coordinates": "oops"})),
            row(json!({"id": 3})),
            row(json!({"id": 4, "g__coordinates": [1.0, 2.0]})),
        ];

        let kept = filter_geo_data(rows);
        let ids: Vec<i64> = kept
            .iter()
            .map(|r| r.get("id").unwrap().as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn test_filter_data_by_extension() {
        let rows = vec![
            row(json!({"photo": "IMG_001.JPG"})),
            row(json!({"audio": "interview.mp3"})),
            row(json!({"note": "no media here"})),
            row(json!({"photos": "a.png, b.jpg"})),
        ];

        let kept = filter_data_by_extension(rows.clone(), "jpg, .png");
        assert_eq!(kept.len(), 2);

        // no configured extensions means no gallery rows
        assert!(filter_data_by_extension(rows, "").is_empty());
    }
}
