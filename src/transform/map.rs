//! Map view shaping: per-category colors and geometry normalization.

use std::collections::HashMap;

use rand::Rng;
use serde_json::Value;

use super::{parse_coordinates, Row};

const GEOMETRY_TYPES: [&str; 6] = [
    "Point",
    "LineString",
    "Polygon",
    "MultiPoint",
    "MultiLineString",
    "MultiPolygon",
];

/// Normalize a geometry type value to its canonical GeoJSON spelling.
/// Unknown types pass through unchanged.
fn normalize_geometry_type(value: &str) -> String {
    GEOMETRY_TYPES
        .iter()
        .find(|t| t.eq_ignore_ascii_case(value.trim()))
        .map(|t| t.to_string())
        .unwrap_or_else(|| value.to_string())
}

fn random_color(rng: &mut impl Rng) -> String {
    format!("#{:06x}", rng.gen_range(0..0x100_0000u32))
}

/// The filter column is configured by its raw name, but rows may already
/// carry display-renamed keys. Try both.
fn filter_value<'a>(row: &'a Row, filter_column: &str, display_column: &str) -> Option<&'a str> {
    row.get(filter_column)
        .or_else(|| row.get(display_column))
        .and_then(Value::as_str)
}

/// Prepare rows for the map view.
///
/// Every distinct value of the configured filter column gets a random
/// `#rrggbb` color, attached to its rows as `filter-color` so the client can
/// style categories consistently. Geometry columns are normalized: the type
/// to canonical GeoJSON spelling, the coordinates from JSON text to a JSON
/// array.
pub fn prepare_map_data(rows: Vec<Row>, filter_column: &str) -> Vec<Row> {
    let display_column = super::survey::display_key(filter_column);

    let mut rng = rand::thread_rng();
    let mut colors: HashMap<String, String> = HashMap::new();
    for row in &rows {
        if let Some(value) = filter_value(row, filter_column, &display_column) {
            colors
                .entry(value.to_string())
                .or_insert_with(|| random_color(&mut rng));
        }
    }

    rows.into_iter()
        .map(|mut row| {
            let color = filter_value(&row, filter_column, &display_column)
                .and_then(|v| colors.get(v))
                .cloned()
                .unwrap_or_else(|| "#3333ff".to_string());
            row.insert("filter-color".to_string(), Value::String(color));

            if let Some(Value::String(t)) = row.get("g__type").cloned() {
                row.insert(
                    "g__type".to_string(),
                    Value::String(normalize_geometry_type(&t)),
                );
            }
            if let Some(coords) = row.get("g__coordinates").and_then(parse_coordinates) {
                row.insert("g__coordinates".to_string(), coords);
            }
            row
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
    fn test_normalize_geometry_type() {
        assert_eq!(normalize_geometry_type("point"), "Point");
        assert_eq!(normalize_geometry_type(" linestring "), "LineString");
        assert_eq!(normalize_geometry_type("multipolygon"), "MultiPolygon");
        assert_eq!(normalize_geometry_type("Blob"), "Blob");
    }

    #[test]
    fn test_prepare_map_data_colors_by_category() {
        let rows = vec![
            row(json!({"kind": "spring", "g__type": "point", "g__coordinates": "[1.0, 2.0]"})),
            row(json!({"kind": "spring", "g__type": "Point", "g__coordinates": "[3.0, 4.0]"})),
            row(json!({"kind": "well", "g__type": "POINT", "g__coordinates": "[5.0, 6.0]"})),
        ];

        let out = prepare_map_data(rows, "kind");
        assert_eq!(out.len(), 3);

        let color = |i: usize| out[i].get("filter-color").unwrap().as_str().unwrap();
        // same category, same color; different category may differ
        assert_eq!(color(0), color(1));
        assert!(color(0).starts_with('#'));
        assert_eq!(color(0).len(), 7);

        for r in &out {
            assert_eq!(r.get("g__type"), Some(&json!("Point")));
            assert!(r.get("g__coordinates").unwrap().is_array());
        }
    }

    #[test]
    fn test_prepare_map_data_without_filter_column() {
        let rows = vec![row(json!({"g__type": "polygon", "g__coordinates": [[[0.0, 0.0]]]}))];
        let out = prepare_map_data(rows, "");
        assert_eq!(out[0].get("filter-color"), Some(&json!("#3333ff")));
        assert_eq!(out[0].get("g__type"), Some(&json!("Polygon")));
    }
}
