//! Server-rendered operator dashboard pages.
//!
//! These pages sit on top of the same config store operations as the JSON
//! API; the editor takes the whole `views_config` blob as JSON text and
//! validates it server-side before saving.

use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;
use serde_json::Value;

use super::super::error::ApiError;
use super::super::templates;
use super::super::AppState;
use crate::db::{self, DbError};

/// `GET /` - configured and unconfigured tables.
pub async fn dashboard(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let client = state.pool.get().await.map_err(DbError::from)?;

    let config = db::fetch_config(&client).await?;
    let tables = db::fetch_table_names(&client).await?;

    let configured: Vec<(String, String)> = config
        .iter()
        .map(|(table, blob)| {
            let views = blob
                .get("views")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string();
            (table.clone(), views)
        })
        .collect();
    let unconfigured: Vec<String> = tables
        .into_iter()
        .filter(|t| !config.contains_key(t))
        .collect();

    Ok(Html(templates::dashboard_page(&configured, &unconfigured)))
}

/// `GET /config/:table` - JSON editor for one table's config blob.
pub async fn config_editor(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> Result<Html<String>, ApiError> {
    let client = state.pool.get().await.map_err(DbError::from)?;

    let config = db::fetch_config(&client).await?;
    let blob = config
        .get(&table)
        .ok_or_else(|| DbError::ConfigNotFound(table.clone()))?;

    let pretty =
        serde_json::to_string_pretty(blob).map_err(|e| ApiError::Internal(e.into()))?;
    Ok(Html(templates::config_editor_page(&table, &pretty, None)))
}

/// Form body for the config editor.
#[derive(Debug, Deserialize)]
pub struct ConfigForm {
    pub views_config: String,
}

/// `POST /config/:table` - validate and save the edited blob.
pub async fn config_submit(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Form(form): Form<ConfigForm>,
) -> Result<Response, ApiError> {
    let client = state.pool.get().await.map_err(DbError::from)?;

    let parsed: Value = match serde_json::from_str(&form.views_config) {
        Ok(value) => value,
        Err(e) => {
            // re-render the editor with the rejected text and the parse error
            let page = templates::config_editor_page(
                &table,
                &form.views_config,
                Some(&format!("Not valid JSON: {}", e)),
            );
            return Ok(Html(page).into_response());
        }
    };

    db::update_config(&client, &table, &parsed).await?;
    Ok(Redirect::to(&format!("/config/{}", table)).into_response())
}

/// `POST /config/:table/new` - register an unconfigured table, then open
/// its editor.
pub async fn page_new_table(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> Result<Redirect, ApiError> {
    let client = state.pool.get().await.map_err(DbError::from)?;
    db::add_table(&client, &table).await?;
    Ok(Redirect::to(&format!("/config/{}", table)))
}

/// `POST /config/:table/delete` - drop a table's configuration.
pub async fn page_delete_table(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> Result<Redirect, ApiError> {
    let client = state.pool.get().await.map_err(DbError::from)?;
    db::remove_table(&client, &table).await?;
    Ok(Redirect::to("/"))
}
