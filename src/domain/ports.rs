use crate::domain::{
    change::{ColumnDescriptor, DataChange, RowMap},
    document::ComparisonDocument,
    value_objects::{KeyColumns, TableName},
};
use anyhow::Result;
use async_trait::async_trait;

/// Port: read access to one database snapshot (implemented by SqliteInspector)
#[async_trait]
pub trait TableReader: Send + Sync {
    /// All user table names in the snapshot, in a stable order.
    async fn table_names(&self) -> Result<Vec<TableName>>;

    /// Ordered column definitions for one table. Empty when the table does
    /// not exist in this snapshot.
    async fn columns(&self, table: &TableName) -> Result<Vec<ColumnDescriptor>>;

    /// Declared primary-key columns for one table, in key order.
    async fn key_columns(&self, table: &TableName) -> Result<KeyColumns>;

    /// All rows of one table, ordered by the key columns for reproducible
    /// diff output. Empty when the table does not exist in this snapshot.
    async fn rows(&self, table: &TableName, keys: &KeyColumns) -> Result<Vec<RowMap>>;
}

/// Port: row-level diff algorithm (implemented by RowDiffer)
pub trait Differ: Send + Sync {
    fn diff_rows(
        &self,
        old: &[RowMap],
        new: &[RowMap],
        keys: &KeyColumns,
        table: &TableName,
    ) -> Result<Vec<DataChange>>;
}

/// Port: output formatting (implemented by JsonWriter, HtmlWriter)
pub trait OutputWriter: Send + Sync {
    /// Serialises the comparison document to a string (JSON, HTML, etc.)
    fn format(&self, doc: &ComparisonDocument) -> Result<String>;
    /// Extension of the produced file (e.g. "json", "html")
    fn extension(&self) -> &'static str;
}
