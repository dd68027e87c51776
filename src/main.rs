//! Terrascope - configurable dashboard views over PostgreSQL tables.
//!
//! Serves map, gallery, and alert views derived from survey tables in a
//! PostgreSQL database, plus the configuration store that controls which
//! views each table exposes and how they are rendered.

mod cli;
mod config;
mod db;
mod server;
mod transform;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    // Initialize logging based on verbosity
    let default_filter = if cli::is_verbose() {
        "terrascope=info"
    } else {
        "terrascope=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Run CLI
    cli::run().await
}
