//! Cosmetic renaming of survey keys and values for display.
//!
//! Keys like `p__river_name` become `River name`; enum-style values like
//! `blue_heron` become `Blue heron`. Geometry keys (`g__*`), URLs, and
//! dates pass through untouched.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use super::Row;

/// Apply display renaming to every row.
pub fn transform_survey_data(rows: Vec<Row>) -> Vec<Row> {
    rows.into_iter()
        .map(|row| {
            row.into_iter()
                .map(|(key, value)| {
                    if key.starts_with("g__") {
                        (key, value)
                    } else {
                        (transform_key(&key), transform_value(value))
                    }
                })
                .collect()
        })
        .collect()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// The display name a raw column ends up with after renaming. Used by the
/// map view to resolve its configured filter column against renamed rows.
pub(crate) fn display_key(key: &str) -> String {
    transform_key(key)
}

/// Strip survey prefixes and turn snake_case into a sentence-case label.
fn transform_key(key: &str) -> String {
    let stripped = key.strip_prefix("p__").unwrap_or(key);
    let stripped = stripped.trim_start_matches('_');
    capitalize(&stripped.replace('_', " "))
}

fn looks_like_date(s: &str) -> bool {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").is_ok()
        || DateTime::parse_from_rfc3339(s).is_ok()
}

/// Prettify enum-style string values; leave URLs, dates, and non-strings
/// alone.
fn transform_value(value: Value) -> Value {
    match value {
        Value::String(s) => {
            if s.starts_with("http://") || s.starts_with("https://") || looks_like_date(&s) {
                Value::String(s)
            } else {
                Value::String(capitalize(&s.replace('_', " ")))
            }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_transform_key() {
        assert_eq!(transform_key("p__river_name"), "River name");
        assert_eq!(transform_key("water_quality"), "Water quality");
        assert_eq!(transform_key("_id"), "Id");
        assert_eq!(transform_key("notes"), "Notes");
    }

    #[test]
    fn test_transform_survey_data() {
        let rows = vec![json!({
            "p__animal_type": "blue_heron",
            "photo_url": "https://example.com/a_b.jpg",
            "p__survey_date": "2023-04-12",
            "g__type": "Point",
            "g__coordinates": "[1.0, 2.0]",
            "count": 3
        })
        .as_object()
        .unwrap()
        .clone()];

        let out = transform_survey_data(rows);
        let row = &out[0];

        assert_eq!(row.get("Animal type"), Some(&json!("Blue heron")));
        // URLs and dates pass through
        assert_eq!(
            row.get("Photo url"),
            Some(&json!("https://example.com/a_b.jpg"))
        );
        assert_eq!(row.get("Survey date"), Some(&json!("2023-04-12")));
        // geometry keys untouched
        assert_eq!(row.get("g__type"), Some(&json!("Point")));
        assert_eq!(row.get("g__coordinates"), Some(&json!("[1.0, 2.0]")));
        // non-strings untouched
        assert_eq!(row.get("Count"), Some(&json!(3)));
    }
}
