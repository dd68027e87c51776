//! Views configuration store.
//!
//! One row per dashboard table in the `config` table:
//! `(table_name TEXT PRIMARY KEY, views_config TEXT)`. The `views_config`
//! blob is opaque JSON interpreted by the view pipelines and the operator
//! dashboard. Updates are single statements, last write wins.

use std::collections::BTreeMap;

use serde_json::Value;
use tokio_postgres::Client;

use super::DbError;

const CREATE_CONFIG_TABLE: &str = "CREATE TABLE IF NOT EXISTS config (
        table_name TEXT PRIMARY KEY,
        views_config TEXT
    )";

/// Fetch the full views configuration, creating the `config` table if it
/// does not exist yet.
///
/// A row whose blob fails to parse is surfaced as an empty object rather
/// than failing the whole request.
pub async fn fetch_config(client: &Client) -> Result<BTreeMap<String, Value>, DbError> {
    client.execute(CREATE_CONFIG_TABLE, &[]).await?;

    let rows = client
        .query(
            "SELECT table_name, views_config FROM config ORDER BY table_name",
            &[],
        )
        .await?;

    let mut config = BTreeMap::new();
    for row in rows {
        let table: String = row.get(0);
        let raw: Option<String> = row.get(1);

        let parsed = match raw.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(blob) => serde_json::from_str(blob).unwrap_or_else(|e| {
                tracing::warn!("unparseable views_config for table {}: {}", table, e);
                Value::Object(Default::default())
            }),
            None => Value::Object(Default::default()),
        };
        config.insert(table, parsed);
    }

    Ok(config)
}

/// Replace the views configuration for a table.
pub async fn update_config(client: &Client, table: &str, config: &Value) -> Result<(), DbError> {
    let blob = config.to_string();
    let updated = client
        .execute(
            "UPDATE config SET views_config = $1 WHERE table_name = $2",
            &[&blob, &table],
        )
        .await?;

    if updated == 0 {
        return Err(DbError::ConfigNotFound(table.to_string()));
    }
    Ok(())
}

/// Register a table in the configuration store with an empty config.
pub async fn add_table(client: &Client, table: &str) -> Result<(), DbError> {
    client.execute(CREATE_CONFIG_TABLE, &[]).await?;
    client
        .execute(
            "INSERT INTO config (table_name, views_config) VALUES ($1, '{}')
             ON CONFLICT (table_name) DO NOTHING",
            &[&table],
        )
        .await?;
    Ok(())
}

/// Remove a table from the configuration store.
pub async fn remove_table(client: &Client, table: &str) -> Result<(), DbError> {
    client
        .execute("DELETE FROM config WHERE table_name = $1", &[&table])
        .await?;
    Ok(())
}

/// List candidate dashboard tables in the public schema.
///
/// Excludes the config table itself, side tables (`*__columns`,
/// `*__metadata`), and PostGIS bookkeeping.
pub async fn fetch_table_names(client: &Client) -> Result<Vec<String>, DbError> {
    let rows = client
        .query(
            "SELECT table_name FROM information_schema.tables
             WHERE table_schema = 'public' AND table_type = 'BASE TABLE'
             ORDER BY table_name",
            &[],
        )
        .await?;

    let names = rows
        .into_iter()
        .map(|row| row.get::<_, String>(0))
        .filter(|name| {
            name != "config"
                && name != "spatial_ref_sys"
                && !name.ends_with("__columns")
                && !name.ends_with("__metadata")
        })
        .collect();

    Ok(names)
}
