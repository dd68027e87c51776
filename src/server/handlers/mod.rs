//! Route handlers.

mod config_api;
mod pages;
mod views_api;

pub use config_api::{delete_table, get_config, new_table, update_config};
pub use pages::{config_editor, config_submit, dashboard, page_delete_table, page_new_table};
pub use views_api::{table_alerts, table_data, table_gallery, table_map};

use axum::http::StatusCode;
use axum::response::IntoResponse;

/// Health check endpoint for container orchestration.
pub async fn health() -> impl IntoResponse {
    StatusCode::OK
}
