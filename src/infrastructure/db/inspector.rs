use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::path::Path;
use tracing::debug;

use crate::domain::change::{ColumnDescriptor, RowMap};
use crate::domain::ports::TableReader;
use crate::domain::value_objects::{KeyColumns, TableName};
use crate::infrastructure::db::row_mapper::row_to_map;

/// Read access to one SQLite snapshot file.
pub struct SqliteInspector {
    pool: SqlitePool,
}

/// Open a snapshot read-only and return a `SqliteInspector`.
pub async fn open(path: impl AsRef<Path>) -> Result<SqliteInspector> {
    let path = path.as_ref();
    let options = SqliteConnectOptions::new()
        .filename(path)
        .read_only(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open snapshot {}", path.display()))?;

    debug!(path = %path.display(), "opened snapshot");
    Ok(SqliteInspector { pool })
}

impl SqliteInspector {
    /// Wrap an existing pool (used by tests with in-memory databases).
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn table_info(&self, table: &TableName) -> Result<Vec<PragmaColumn>> {
        let sql = format!("PRAGMA table_info({})", quote_ident(&table.0));
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Failed to introspect table '{}'", table))?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in &rows {
            columns.push(PragmaColumn {
                name: row.try_get("name")?,
                col_type: row.try_get("type")?,
                notnull: row.try_get::<i64, _>("notnull")? != 0,
                default: row.try_get::<Option<String>, _>("dflt_value")?,
                pk: row.try_get::<i64, _>("pk")?,
            });
        }
        Ok(columns)
    }
}

/// One row of `PRAGMA table_info` output.
struct PragmaColumn {
    name: String,
    col_type: String,
    notnull: bool,
    default: Option<String>,
    pk: i64,
}

#[async_trait]
impl TableReader for SqliteInspector {
    async fn table_names(&self) -> Result<Vec<TableName>> {
        let names: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
             ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list tables")?;

        Ok(names.into_iter().map(TableName).collect())
    }

    async fn columns(&self, table: &TableName) -> Result<Vec<ColumnDescriptor>> {
        // PRAGMA table_info yields no rows for a table absent from this
        // snapshot, which is exactly the empty column list the diff expects.
        Ok(self
            .table_info(table)
            .await?
            .into_iter()
            .map(|c| ColumnDescriptor {
                name: c.name,
                col_type: c.col_type,
                nullable: !c.notnull,
                // raw SQL default expression, kept verbatim
                default: c.default.map(Value::String),
            })
            .collect())
    }

    async fn key_columns(&self, table: &TableName) -> Result<KeyColumns> {
        let mut keyed: Vec<(i64, String)> = self
            .table_info(table)
            .await?
            .into_iter()
            .filter(|c| c.pk > 0)
            .map(|c| (c.pk, c.name))
            .collect();
        keyed.sort_by_key(|(pos, _)| *pos);
        Ok(KeyColumns(keyed.into_iter().map(|(_, name)| name).collect()))
    }

    async fn rows(&self, table: &TableName, keys: &KeyColumns) -> Result<Vec<RowMap>> {
        if self.table_info(table).await?.is_empty() {
            return Ok(Vec::new());
        }

        let order = if keys.is_empty() {
            "rowid".to_string()
        } else {
            keys.iter()
                .map(quote_ident)
                .collect::<Vec<_>>()
                .join(", ")
        };
        let sql = format!(
            "SELECT * FROM {} ORDER BY {}",
            quote_ident(&table.0),
            order
        );

        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Failed to fetch rows of '{}'", table))?;

        rows.iter().map(row_to_map).collect()
    }
}

/// Double-quote an identifier, doubling embedded quotes.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
