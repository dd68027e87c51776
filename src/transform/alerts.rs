//! Alert view shaping: recency partitioning, GeoJSON construction, and
//! trailing-twelve-month statistics.
//!
//! Alert rows come from two pipelines distinguished by `data_source`:
//! Global Forest Watch rows carry detection date ranges
//! (`date_start_t1`/`date_end_t1`), proprietary rows carry
//! `year_detec`/`month_detec`.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use super::{parse_coordinates, Row};

const GFW_SOURCE: &str = "Global Forest Watch";

/// Alerts split by detection recency.
#[derive(Debug, Clone, Default)]
pub struct AlertPartition {
    /// Alerts detected in the latest month present in the data.
    pub most_recent: Vec<Row>,
    /// Everything else, including undatable rows.
    pub previous: Vec<Row>,
}

fn str_or_number(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Detection month of an alert as `(year, month)`.
///
/// GFW rows are dated by the end of their detection range; proprietary rows
/// by their explicit year/month fields.
fn detection_month(row: &Row) -> Option<(i32, u32)> {
    let source = row.get("data_source").and_then(Value::as_str).unwrap_or("");

    if source == GFW_SOURCE {
        let raw = row.get("date_end_t1").and_then(str_or_number)?;
        let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d").ok()?;
        return Some((date.year(), date.month()));
    }

    let year: i32 = row.get("year_detec").and_then(str_or_number)?.parse().ok()?;
    let month: u32 = row
        .get("month_detec")
        .and_then(str_or_number)?
        .parse()
        .ok()?;
    (1..=12).contains(&month).then_some((year, month))
}

/// Partition alerts into most-recent (latest detection month in the set)
/// and previous. The two sides always sum to the input length.
pub fn prepare_alert_data(rows: Vec<Row>) -> AlertPartition {
    let latest = rows.iter().filter_map(detection_month).max();

    let Some(latest) = latest else {
        return AlertPartition {
            most_recent: Vec::new(),
            previous: rows,
        };
    };

    let mut partition = AlertPartition::default();
    for row in rows {
        if detection_month(&row) == Some(latest) {
            partition.most_recent.push(row);
        } else {
            partition.previous.push(row);
        }
    }
    partition
}

/// Stable numeric feature id derived from the alert id.
fn feature_id(alert_id: &str) -> u32 {
    let digest = Sha256::digest(alert_id.as_bytes());
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

/// Build a GeoJSON FeatureCollection from alert rows.
///
/// One feature per row; geometry from the `g__*` columns (null when absent
/// or unparseable), all other columns as properties. Feature ids are stable
/// hashes of `alert_id` so client-side selection state survives reloads.
pub fn transform_to_geojson(rows: &[Row]) -> Value {
    let features: Vec<Value> = rows
        .iter()
        .map(|row| {
            let alert_id = row
                .get("alert_id")
                .and_then(str_or_number)
                .unwrap_or_default();

            let geometry = match (
                row.get("g__type").and_then(Value::as_str),
                row.get("g__coordinates").and_then(parse_coordinates),
            ) {
                (Some(geo_type), Some(coordinates)) => json!({
                    "type": geo_type,
                    "coordinates": coordinates,
                }),
                _ => Value::Null,
            };

            let properties: serde_json::Map<String, Value> = row
                .iter()
                .filter(|(key, _)| !key.starts_with("g__"))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();

            json!({
                "type": "Feature",
                "id": feature_id(&alert_id),
                "geometry": geometry,
                "properties": properties,
            })
        })
        .collect();

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

/// Aggregate alert statistics for the dashboard header.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AlertStatistics {
    /// Total number of alert rows.
    pub total_alerts: usize,
    /// Trailing twelve months ending at the latest detection month,
    /// oldest first, formatted `MM-YYYY`.
    pub months: Vec<String>,
    /// Alert counts per month, aligned with `months`.
    pub counts_per_month: Vec<u64>,
    /// Affected hectares per month, aligned with `months`.
    pub hectares_per_month: Vec<f64>,
    /// Alerts inside the twelve-month window.
    pub twelve_month_count: u64,
    /// Hectares inside the twelve-month window.
    pub twelve_month_hectares: f64,
    /// Earliest detection month present, `MM-YYYY`.
    pub earliest_alert_month: Option<String>,
    /// Latest detection month present, `MM-YYYY`.
    pub latest_alert_month: Option<String>,
    /// Distinct data sources seen.
    pub data_sources: Vec<String>,
}

fn month_label(year: i32, month: u32) -> String {
    format!("{:02}-{}", month, year)
}

fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

fn hectares(row: &Row) -> f64 {
    row.get("area_alert_ha")
        .and_then(str_or_number)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|h| h.is_finite())
        .unwrap_or(0.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Bucket alerts into the trailing twelve months ending at the latest
/// detection month present in the data.
pub fn prepare_alert_statistics(rows: &[Row]) -> AlertStatistics {
    let dated: Vec<((i32, u32), &Row)> = rows
        .iter()
        .filter_map(|row| detection_month(row).map(|m| (m, row)))
        .collect();

    let data_sources: Vec<String> = rows
        .iter()
        .filter_map(|row| row.get("data_source").and_then(Value::as_str))
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let Some(&(latest, _)) = dated.iter().max_by_key(|(m, _)| *m) else {
        return AlertStatistics {
            total_alerts: rows.len(),
            months: Vec::new(),
            counts_per_month: Vec::new(),
            hectares_per_month: Vec::new(),
            twelve_month_count: 0,
            twelve_month_hectares: 0.0,
            earliest_alert_month: None,
            latest_alert_month: None,
            data_sources,
        };
    };
    let earliest = dated.iter().map(|(m, _)| *m).min().unwrap_or(latest);

    // window months, oldest first
    let mut window = Vec::with_capacity(12);
    let mut cursor = latest;
    for _ in 0..12 {
        window.push(cursor);
        cursor = previous_month(cursor.0, cursor.1);
    }
    window.reverse();

    let mut counts = vec![0u64; 12];
    let mut areas = vec![0f64; 12];
    for (month, row) in &dated {
        if let Some(idx) = window.iter().position(|w| w == month) {
            counts[idx] += 1;
            areas[idx] += hectares(row);
        }
    }

    let twelve_month_count = counts.iter().sum();
    let twelve_month_hectares = round2(areas.iter().sum());

    AlertStatistics {
        total_alerts: rows.len(),
        months: window.iter().map(|&(y, m)| month_label(y, m)).collect(),
        counts_per_month: counts,
        hectares_per_month: areas.into_iter().map(round2).collect(),
        twelve_month_count,
        twelve_month_hectares,
        earliest_alert_month: Some(month_label(earliest.0, earliest.1)),
        latest_alert_month: Some(month_label(latest.0, latest.1)),
        data_sources,
    }
}
