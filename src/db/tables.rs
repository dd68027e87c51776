//! Dynamic table data access.
//!
//! Dashboard tables have operator-defined columns, so rows are read with
//! `SELECT to_jsonb(t.*)` and surfaced as JSON objects. Each table may carry
//! two side tables: `<table>__columns` (original to SQL column name mapping)
//! and `<table>__metadata` (free-form rows passed through to the alerts
//! view).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_postgres::Client;

use super::DbError;
use crate::transform::Row;

/// Mapping from a source column name to its SQL column name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub original_column: String,
    pub sql_column: String,
}

/// Everything fetched for one dashboard table.
#[derive(Debug, Clone)]
pub struct TableData {
    /// All rows of the main table, as JSON objects.
    pub rows: Vec<Row>,
    /// Column name mapping, if `<table>__columns` exists.
    pub columns: Option<Vec<ColumnDef>>,
    /// Metadata rows, if `<table>__metadata` exists.
    pub metadata: Option<Vec<Row>>,
}

/// Validate a table name arriving from an HTTP path before it is
/// interpolated into a statement. Only plain SQL identifiers are accepted.
pub fn validate_identifier(name: &str) -> Result<(), DbError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(DbError::InvalidTableName(name.to_string()))
    }
}

/// Check whether a relation exists via `to_regclass`.
async fn relation_exists(client: &Client, name: &str) -> Result<bool, DbError> {
    let row = client
        .query_one("SELECT to_regclass($1)::text", &[&name])
        .await?;
    Ok(row.get::<_, Option<String>>(0).is_some())
}

/// Read all rows of a table as JSON objects. No pagination or limits; the
/// dashboard renders whole tables.
async fn fetch_rows(client: &Client, table: &str) -> Result<Vec<Row>, DbError> {
    let statement = format!("SELECT to_jsonb(t.*) FROM \"{}\" t", table);
    let rows = client.query(&statement, &[]).await?;

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        match row.get::<_, Value>(0) {
            Value::Object(map) => out.push(map),
            other => {
                tracing::warn!("skipping non-object row from {}: {}", table, other);
            }
        }
    }
    Ok(out)
}

fn parse_column_defs(rows: Vec<Row>) -> Vec<ColumnDef> {
    rows.into_iter()
        .filter_map(|row| {
            let original = row.get("original_column")?.as_str()?.to_string();
            let sql = row.get("sql_column")?.as_str()?.to_string();
            Some(ColumnDef {
                original_column: original,
                sql_column: sql,
            })
        })
        .collect()
}

/// Fetch a dashboard table with its side tables.
///
/// The main table must exist; missing side tables yield `None`.
pub async fn fetch_data(client: &Client, table: &str) -> Result<TableData, DbError> {
    validate_identifier(table)?;

    if !relation_exists(client, table).await? {
        return Err(DbError::TableNotFound(table.to_string()));
    }
    let rows = fetch_rows(client, table).await?;

    let columns_table = format!("{}__columns", table);
    let columns = if relation_exists(client, &columns_table).await? {
        Some(parse_column_defs(fetch_rows(client, &columns_table).await?))
    } else {
        None
    };

    let metadata_table = format!("{}__metadata", table);
    let metadata = if relation_exists(client, &metadata_table).await? {
        Some(fetch_rows(client, &metadata_table).await?)
    } else {
        None
    };

    Ok(TableData {
        rows,
        columns,
        metadata,
    })
}
