//! View data endpoints: table data, map, gallery, alerts.
//!
//! Every handler composes the same pipeline shape: fetch config, fetch raw
//! rows, drop configured columns and rows, then apply the view-specific
//! shaping from [`crate::transform`].

use std::collections::HashSet;

use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Map, Value};
use tokio_postgres::Client;

use super::super::error::ApiError;
use super::super::AppState;
use crate::db::{self, DbError, TableData};
use crate::transform::{
    csv_list, filter_data_by_extension, filter_geo_data, filter_out_unwanted_values,
    filter_unwanted_keys, prepare_alert_data, prepare_alert_statistics, prepare_map_data,
    transform_survey_data, transform_to_geojson, Row,
};

/// A table's views configuration blob, with string-typed accessors for the
/// ad hoc keys the pipelines read.
struct ViewsConfig(Map<String, Value>);

impl ViewsConfig {
    fn get(&self, key: &str) -> &str {
        self.0.get(key).and_then(Value::as_str).unwrap_or("")
    }

    /// All `mapbox*` keys, passed through to map-based views verbatim.
    fn mapbox_passthrough(&self) -> Map<String, Value> {
        self.0
            .iter()
            .filter(|(key, _)| key.starts_with("mapbox"))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

async fn fetch_views_config(client: &Client, table: &str) -> Result<ViewsConfig, DbError> {
    let mut config = db::fetch_config(client).await?;
    match config.remove(table) {
        Some(Value::Object(map)) => Ok(ViewsConfig(map)),
        Some(_) | None => Err(DbError::ConfigNotFound(table.to_string())),
    }
}

/// Shared head of every view pipeline: fetch everything, then drop
/// configured columns and blacklisted rows.
fn apply_common_filters(data: TableData, config: &ViewsConfig) -> (Vec<Row>, TableData) {
    let TableData {
        rows,
        columns,
        metadata,
    } = data;

    let rows = filter_unwanted_keys(
        rows,
        columns.as_deref(),
        config.get("unwanted_columns"),
        config.get("unwanted_substrings"),
    );
    let rows = filter_out_unwanted_values(
        rows,
        config.get("filter_by_column"),
        config.get("filter_out_values"),
    );

    (
        rows,
        TableData {
            rows: Vec::new(),
            columns,
            metadata,
        },
    )
}

/// `GET /api/:table/data` - filtered rows plus the column name mapping.
pub async fn table_data(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let client = state.pool.get().await.map_err(DbError::from)?;

    let config = fetch_views_config(&client, &table).await?;
    let data = db::fetch_data(&client, &table).await?;
    let (rows, rest) = apply_common_filters(data, &config);

    Ok(Json(json!({
        "data": rows,
        "columns": rest.columns,
    })))
}

/// `GET /api/:table/map` - geometry-bearing rows with styling, plus the
/// Mapbox configuration passthrough.
pub async fn table_map(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let client = state.pool.get().await.map_err(DbError::from)?;

    let config = fetch_views_config(&client, &table).await?;
    let data = db::fetch_data(&client, &table).await?;
    let (rows, _) = apply_common_filters(data, &config);

    let rows = filter_geo_data(rows);
    let rows = transform_survey_data(rows);
    let rows = prepare_map_data(rows, config.get("front_end_filter_column"));

    let mut response = Map::new();
    response.insert("data".to_string(), json!(rows));
    response.extend(config.mapbox_passthrough());

    Ok(Json(Value::Object(response)))
}

/// `GET /api/:table/gallery` - rows referencing configured media file
/// extensions.
pub async fn table_gallery(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let client = state.pool.get().await.map_err(DbError::from)?;

    let config = fetch_views_config(&client, &table).await?;
    let data = db::fetch_data(&client, &table).await?;
    let (rows, _) = apply_common_filters(data, &config);

    let rows = filter_data_by_extension(rows, config.get("media_extensions"));
    let rows = transform_survey_data(rows);

    Ok(Json(json!({ "data": rows })))
}

/// Fetch the configured Mapeo table and keep rows matching the configured
/// category ids. Absent configuration or a missing table yields `None`.
async fn fetch_mapeo_data(client: &Client, config: &ViewsConfig) -> Option<Vec<Row>> {
    let mapeo_table = config.get("mapeo_table");
    let category_ids: HashSet<String> = csv_list(config.get("mapeo_category_ids"))
        .into_iter()
        .collect();
    if mapeo_table.is_empty() || category_ids.is_empty() {
        return None;
    }

    let data = match db::fetch_data(client, mapeo_table).await {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!("mapeo table {} unavailable: {}", mapeo_table, e);
            return None;
        }
    };

    let rows = data
        .rows
        .into_iter()
        .filter(|row| {
            row.get("category")
                .or_else(|| row.get("category_id"))
                .and_then(Value::as_str)
                .map(|c| category_ids.contains(c))
                .unwrap_or(false)
        })
        .collect();
    Some(rows)
}

/// `GET /api/:table/alerts` - alerts partitioned by recency as GeoJSON,
/// statistics, table metadata, the optional Mapeo cross-reference, and the
/// Mapbox passthrough.
pub async fn table_alerts(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let client = state.pool.get().await.map_err(DbError::from)?;

    let config = fetch_views_config(&client, &table).await?;
    let data = db::fetch_data(&client, &table).await?;
    let (rows, rest) = apply_common_filters(data, &config);

    let statistics = prepare_alert_statistics(&rows);
    let partition = prepare_alert_data(rows);

    let mapeo_data = fetch_mapeo_data(&client, &config).await;

    let mut response = Map::new();
    response.insert(
        "most_recent".to_string(),
        transform_to_geojson(&partition.most_recent),
    );
    response.insert(
        "previous".to_string(),
        transform_to_geojson(&partition.previous),
    );
    response.insert("statistics".to_string(), json!(statistics));
    response.insert("metadata".to_string(), json!(rest.metadata));
    response.insert("mapeo_data".to_string(), json!(mapeo_data));
    response.extend(config.mapbox_passthrough());

    Ok(Json(Value::Object(response)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_views_config_accessors() {
        let blob = json!({
            "views": "map,alerts",
            "mapbox_style": "mapbox://styles/standard",
            "mapbox_zoom": 9,
            "media_extensions": "jpg,png"
        });
        let config = ViewsConfig(blob.as_object().unwrap().clone());

        assert_eq!(config.get("views"), "map,alerts");
        assert_eq!(config.get("missing"), "");
        // non-string values read as empty rather than panicking
        assert_eq!(config.get("mapbox_zoom"), "");

        let passthrough = config.mapbox_passthrough();
        assert_eq!(passthrough.len(), 2);
        assert_eq!(passthrough.get("mapbox_zoom"), Some(&json!(9)));
        assert!(passthrough.get("media_extensions").is_none());
    }
}
