//! Views configuration CRUD endpoints.

use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

use super::super::error::ApiError;
use super::super::AppState;
use crate::db::{self, DbError};

/// `GET /api/config` - the full views configuration plus the tables that
/// could be configured but are not yet.
pub async fn get_config(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let client = state.pool.get().await.map_err(DbError::from)?;

    let config = db::fetch_config(&client).await?;
    let tables = db::fetch_table_names(&client).await?;

    let unconfigured: Vec<&String> = tables.iter().filter(|t| !config.contains_key(*t)).collect();

    Ok(Json(json!([config, unconfigured])))
}

/// `POST /api/config/update_config/:table` - replace a table's config blob.
pub async fn update_config(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let client = state.pool.get().await.map_err(DbError::from)?;
    db::update_config(&client, &table, &body).await?;

    tracing::info!("views configuration updated for table {}", table);
    Ok(Json(json!({
        "message": format!("Configuration for table {} updated", table)
    })))
}

/// `POST /api/config/new_table/:table` - register a table for the
/// dashboard.
pub async fn new_table(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let client = state.pool.get().await.map_err(DbError::from)?;
    db::add_table(&client, &table).await?;

    Ok(Json(json!({
        "message": format!("Table {} added to configuration", table)
    })))
}

/// `POST /api/config/delete_table/:table` - drop a table's dashboard
/// configuration (the data table itself is untouched).
pub async fn delete_table(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let client = state.pool.get().await.map_err(DbError::from)?;
    db::remove_table(&client, &table).await?;

    Ok(Json(json!({
        "message": format!("Table {} removed from configuration", table)
    })))
}
