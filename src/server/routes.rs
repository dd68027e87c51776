//! Router configuration for the dashboard server.

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use super::{auth, handlers, AppState};

/// Create the main router with all routes.
///
/// The `/api` subtree is guarded by the `x-api-key` middleware and the
/// operator pages by HTTP Basic auth against the same key; only the health
/// check is open.
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        // Views configuration CRUD
        .route("/config", get(handlers::get_config))
        .route(
            "/config/update_config/:table",
            post(handlers::update_config),
        )
        .route("/config/new_table/:table", post(handlers::new_table))
        .route("/config/delete_table/:table", post(handlers::delete_table))
        // View data
        .route("/:table/data", get(handlers::table_data))
        .route("/:table/map", get(handlers::table_map))
        .route("/:table/gallery", get(handlers::table_gallery))
        .route("/:table/alerts", get(handlers::table_alerts))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ));

    let pages = Router::new()
        // Operator dashboard
        .route("/", get(handlers::dashboard))
        .route(
            "/config/:table",
            get(handlers::config_editor).post(handlers::config_submit),
        )
        .route("/config/:table/new", post(handlers::page_new_table))
        .route("/config/:table/delete", post(handlers::page_delete_table))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_operator_auth,
        ));

    Router::new()
        .merge(pages)
        .route("/health", get(handlers::health))
        .nest("/api", api)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
