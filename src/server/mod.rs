//! Web server for the dashboard.
//!
//! Serves the JSON API consumed by view clients (map, gallery, alerts) and
//! a small server-rendered operator surface for editing the per-table views
//! configuration.

mod auth;
mod error;
mod handlers;
mod routes;
mod templates;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Settings;
use crate::db::{self, DbPool};

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        let pool = db::create_pool(&settings)?;
        Ok(Self {
            pool,
            settings: Arc::new(settings),
        })
    }
}

/// Start the web server.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    if settings.api_key.is_empty() {
        tracing::warn!("no API key configured (TERRASCOPE_API_KEY); /api requests will be denied");
    }

    let host = settings.host.clone();
    let port = settings.port;
    let state = AppState::new(settings)?;
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    // The pool is lazy: no connection is opened until a handler asks for
    // one, so auth and health behavior is testable without a database.
    fn test_app(api_key: &str) -> axum::Router {
        let settings = Settings {
            database_url: "postgres://terrascope@localhost:5432/unused".to_string(),
            api_key: api_key.to_string(),
            no_tls: true,
            ..Settings::default()
        };
        let state = AppState::new(settings).unwrap();
        create_router(state)
    }

    #[tokio::test]
    async fn test_health_unguarded() {
        let app = test_app("secret");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_api_requires_key() {
        let app = test_app("secret");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/config")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["error"].as_str().unwrap().contains("x-api-key"));
    }

    #[tokio::test]
    async fn test_api_rejects_wrong_key() {
        let app = test_app("secret");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/rivers/data")
                    .header("x-api-key", "nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_pages_require_basic_auth() {
        let app = test_app("secret");

        // mutating page routes must not reach the config store unauthenticated
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/config/rivers/delete")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key("www-authenticate"));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_pages_accept_basic_password() {
        use base64::Engine;

        let app = test_app("secret");
        let credentials = base64::engine::general_purpose::STANDARD.encode("operator:secret");

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/config/rivers/delete")
                    .header("authorization", format!("Basic {}", credentials))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        // past the auth gate; the handler then fails on the absent database
        assert_ne!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_api_locked_when_key_unconfigured() {
        let app = test_app("");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/config")
                    .header("x-api-key", "")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
