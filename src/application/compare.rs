use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

use crate::application::schema_diff::diff_columns;
use crate::domain::{
    document::ComparisonDocument,
    ports::{Differ, TableReader},
    table_change::TableChange,
    value_objects::{KeyColumns, TableName},
};
use crate::infrastructure::config::TableConfig;

/// Which half of the comparison to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Scope {
    Schema,
    Data,
    #[default]
    Both,
}

impl Scope {
    fn includes_schema(self) -> bool {
        matches!(self, Scope::Schema | Scope::Both)
    }

    fn includes_data(self) -> bool {
        matches!(self, Scope::Data | Scope::Both)
    }
}

// ─── Compare Service ───

/// Runs the per-table schema and data diffs and assembles the
/// [`ComparisonDocument`]. Each table is a pure function of its two snapshots,
/// so tables are diffed as independent tokio tasks.
pub struct CompareService {
    source: Arc<dyn TableReader>,
    target: Arc<dyn TableReader>,
    differ: Arc<dyn Differ>,
}

impl CompareService {
    pub fn new(
        source: Arc<dyn TableReader>,
        target: Arc<dyn TableReader>,
        differ: Arc<dyn Differ>,
    ) -> Self {
        Self {
            source,
            target,
            differ,
        }
    }

    pub async fn run(
        &self,
        source_label: &str,
        target_label: &str,
        scope: Scope,
        table_overrides: &[TableConfig],
    ) -> Result<ComparisonDocument> {
        let tables = self.compared_tables().await?;
        info!(tables = tables.len(), ?scope, "starting comparison");

        let mut handles = Vec::with_capacity(tables.len());
        for table in tables {
            let source = Arc::clone(&self.source);
            let target = Arc::clone(&self.target);
            let differ = Arc::clone(&self.differ);
            let key_override = table_overrides
                .iter()
                .find(|t| t.name == table.0)
                .map(|t| KeyColumns(t.key.clone()));

            let handle = tokio::spawn(async move {
                diff_one_table(&*source, &*target, &*differ, &table, key_override, scope).await
            });
            handles.push(handle);
        }

        let mut changes = Vec::new();
        let mut unchanged = 0usize;
        for handle in handles {
            match handle.await?? {
                Some(change) => changes.push(change),
                None => unchanged += 1,
            }
        }

        Ok(ComparisonDocument::new(
            source_label,
            target_label,
            unchanged,
            changes,
        ))
    }

    /// Union of both snapshots' table lists in first-seen order: source
    /// tables first, then tables that exist only in the target.
    async fn compared_tables(&self) -> Result<Vec<TableName>> {
        let mut tables = self.source.table_names().await?;
        for table in self.target.table_names().await? {
            if !tables.contains(&table) {
                tables.push(table);
            }
        }
        Ok(tables)
    }
}

/// Diff one table across the two snapshots. Returns `None` when the table is
/// identical on both sides — empty TableChanges never enter the document.
async fn diff_one_table(
    source: &dyn TableReader,
    target: &dyn TableReader,
    differ: &dyn Differ,
    table: &TableName,
    key_override: Option<KeyColumns>,
    scope: Scope,
) -> Result<Option<TableChange>> {
    let schema = if scope.includes_schema() {
        let (old_cols, new_cols) =
            tokio::try_join!(source.columns(table), target.columns(table))?;
        diff_columns(&old_cols, &new_cols)
    } else {
        Vec::new()
    };

    let data = if scope.includes_data() {
        let keys = match key_override {
            Some(keys) => keys,
            None => {
                // Prefer the source's declared key; a table that exists only
                // in the target has no source key to ask for.
                let declared = source.key_columns(table).await?;
                if declared.is_empty() {
                    target.key_columns(table).await?
                } else {
                    declared
                }
            }
        };

        let (old_rows, new_rows) =
            tokio::try_join!(source.rows(table, &keys), target.rows(table, &keys))?;
        differ.diff_rows(&old_rows, &new_rows, &keys, table)?
    } else {
        Vec::new()
    };

    let change = TableChange {
        name: table.0.clone(),
        schema,
        data,
    };

    if change.is_empty() {
        debug!(table = %table, "no changes");
        Ok(None)
    } else {
        info!(
            table = %table,
            schema_changes = change.schema.len(),
            data_changes = change.data.len(),
            "table changed"
        );
        Ok(Some(change))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::data_diff::RowDiffer;
    use crate::domain::change::{ChangeKind, ColumnDescriptor, RowMap};
    use anyhow::Result;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::BTreeMap;

    struct FakeTable {
        columns: Vec<ColumnDescriptor>,
        keys: KeyColumns,
        rows: Vec<RowMap>,
    }

    #[derive(Default)]
    struct FakeReader {
        order: Vec<String>,
        tables: BTreeMap<String, FakeTable>,
    }

    impl FakeReader {
        fn with_table(mut self, name: &str, keys: &[&str], rows: Vec<RowMap>) -> Self {
            let columns = rows
                .first()
                .map(|r| {
                    r.keys()
                        .map(|c| ColumnDescriptor {
                            name: c.clone(),
                            col_type: "Text".to_string(),
                            nullable: true,
                            default: None,
                        })
                        .collect()
                })
                .unwrap_or_default();
            self.order.push(name.to_string());
            self.tables.insert(
                name.to_string(),
                FakeTable {
                    columns,
                    keys: KeyColumns(keys.iter().map(|s| s.to_string()).collect()),
                    rows,
                },
            );
            self
        }
    }

    #[async_trait]
    impl TableReader for FakeReader {
        async fn table_names(&self) -> Result<Vec<TableName>> {
            Ok(self.order.iter().map(|n| TableName(n.clone())).collect())
        }

        async fn columns(&self, table: &TableName) -> Result<Vec<ColumnDescriptor>> {
            Ok(self
                .tables
                .get(&table.0)
                .map(|t| t.columns.clone())
                .unwrap_or_default())
        }

        async fn key_columns(&self, table: &TableName) -> Result<KeyColumns> {
            Ok(self
                .tables
                .get(&table.0)
                .map(|t| t.keys.clone())
                .unwrap_or_default())
        }

        async fn rows(&self, table: &TableName, _keys: &KeyColumns) -> Result<Vec<RowMap>> {
            Ok(self
                .tables
                .get(&table.0)
                .map(|t| t.rows.clone())
                .unwrap_or_default())
        }
    }

    fn row(pairs: &[(&str, Value)]) -> RowMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn service(source: FakeReader, target: FakeReader) -> CompareService {
        CompareService::new(
            Arc::new(source),
            Arc::new(target),
            Arc::new(RowDiffer::new()),
        )
    }

    #[tokio::test]
    async fn unchanged_tables_are_counted_not_materialised() {
        let rows = vec![row(&[("id", json!(1)), ("v", json!(5))])];
        let source = FakeReader::default()
            .with_table("same", &["id"], rows.clone())
            .with_table("grown", &["id"], rows.clone());
        let target = FakeReader::default()
            .with_table("same", &["id"], rows.clone())
            .with_table(
                "grown",
                &["id"],
                vec![rows[0].clone(), row(&[("id", json!(2)), ("v", json!(6))])],
            );

        let doc = service(source, target)
            .run("old.db", "new.db", Scope::Both, &[])
            .await
            .unwrap();

        assert_eq!(doc.changes.len(), 1);
        assert_eq!(doc.changes[0].name, "grown");
        assert!(doc.table("same").is_none());

        let summary = doc.summary();
        assert_eq!(summary.total_tables, 2);
        assert_eq!(summary.tables_with_changes, 1);
        assert_eq!(summary.data_changes, 1);
    }

    #[tokio::test]
    async fn table_only_in_target_is_all_added() {
        let source = FakeReader::default();
        let target = FakeReader::default().with_table(
            "fresh",
            &["id"],
            vec![row(&[("id", json!(1)), ("v", json!(1))])],
        );

        let doc = service(source, target)
            .run("old.db", "new.db", Scope::Both, &[])
            .await
            .unwrap();

        let change = doc.table("fresh").unwrap();
        assert!(change
            .schema
            .iter()
            .all(|c| c.kind() == ChangeKind::Added));
        assert!(change.data.iter().all(|c| c.kind() == ChangeKind::Added));
        assert_eq!(change.data.len(), 1);
    }

    #[tokio::test]
    async fn schema_scope_skips_row_comparison() {
        let source = FakeReader::default().with_table(
            "t",
            &["id"],
            vec![row(&[("id", json!(1)), ("v", json!(1))])],
        );
        let target = FakeReader::default().with_table(
            "t",
            &["id"],
            vec![row(&[("id", json!(1)), ("v", json!(2))])],
        );

        let doc = service(source, target)
            .run("old.db", "new.db", Scope::Schema, &[])
            .await
            .unwrap();

        // columns are identical, the row difference is out of scope
        assert!(doc.changes.is_empty());
        assert_eq!(doc.unchanged_tables, 1);
    }

    #[tokio::test]
    async fn key_override_takes_precedence_over_declared_key() {
        // declared key is "id" with duplicate values; the override keys on
        // "code" and makes the diff resolvable
        let source = FakeReader::default().with_table(
            "t",
            &["id"],
            vec![
                row(&[("id", json!(1)), ("code", json!("a"))]),
                row(&[("id", json!(1)), ("code", json!("b"))]),
            ],
        );
        let target = FakeReader::default().with_table(
            "t",
            &["id"],
            vec![
                row(&[("id", json!(1)), ("code", json!("a"))]),
                row(&[("id", json!(1)), ("code", json!("b"))]),
            ],
        );

        let overrides = vec![TableConfig {
            name: "t".to_string(),
            key: vec!["code".to_string()],
        }];

        let doc = service(source, target)
            .run("old.db", "new.db", Scope::Data, &overrides)
            .await
            .unwrap();
        assert!(doc.changes.is_empty());
    }
}
