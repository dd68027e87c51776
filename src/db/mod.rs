//! PostgreSQL access layer.
//!
//! Dashboard tables are operator-defined and have no compile-time schema, so
//! everything here goes through the raw `tokio-postgres` client: rows are
//! read as `jsonb` objects and table names are validated before they are
//! interpolated into statements.

mod config_store;
mod tables;
mod tls;

pub use config_store::{
    add_table, fetch_config, fetch_table_names, remove_table, update_config,
};
pub use tables::{fetch_data, ColumnDef, TableData};

use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use thiserror::Error;
use tokio_postgres::NoTls;

use crate::config::Settings;

/// Pooled PostgreSQL connections shared across requests.
pub type DbPool = Pool;

/// Database layer errors.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("table {0} does not exist")]
    TableNotFound(String),

    #[error("no views configuration found for table {0}")]
    ConfigNotFound(String),

    #[error("invalid table name {0:?}")]
    InvalidTableName(String),

    #[error("database error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),
}

impl DbError {
    /// Whether this error means a requested resource is absent rather than
    /// the database misbehaving.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::TableNotFound(_) | DbError::ConfigNotFound(_))
    }
}

/// Create a connection pool from settings.
///
/// TLS is on by default; `no_tls` switches to plaintext connections for
/// local development databases.
pub fn create_pool(settings: &Settings) -> anyhow::Result<DbPool> {
    let pg_config: tokio_postgres::Config = settings
        .database_url
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid database URL: {}", e))?;

    let manager_config = ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    };

    let manager = if settings.no_tls {
        Manager::from_config(pg_config, NoTls, manager_config)
    } else {
        Manager::from_config(pg_config, tls::make_tls_connector(), manager_config)
    };

    Pool::builder(manager)
        .max_size(10)
        .build()
        .map_err(|e| anyhow::anyhow!("failed to build connection pool: {}", e))
}

/// Connect with a single client and spawn its connection task.
///
/// Used by CLI commands that run one sequence of queries and exit; the
/// server uses [`create_pool`] instead.
pub async fn connect(settings: &Settings) -> Result<tokio_postgres::Client, DbError> {
    if settings.no_tls {
        let (client, connection) =
            tokio_postgres::connect(&settings.database_url, NoTls).await?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("PostgreSQL connection error: {}", e);
            }
        });
        Ok(client)
    } else {
        let tls = tls::make_tls_connector();
        let (client, connection) = tokio_postgres::connect(&settings.database_url, tls).await?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("PostgreSQL connection error: {}", e);
            }
        });
        Ok(client)
    }
}
