use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::table_change::TableChange;

/// The root comparison artifact: one entry per table with changes, produced
/// once by the diff stage and read-only for the lifetime of any renderer.
///
/// `unchanged_tables` counts compared tables that produced no diff, so the
/// derived [`Summary`] can still report the full table universe even though
/// unchanged tables are never materialised into `changes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonDocument {
    pub comparison_id: String,
    pub source: String,
    pub target: String,
    pub created_at: String,
    #[serde(default)]
    pub unchanged_tables: usize,
    pub changes: Vec<TableChange>,
}

/// Summary figures derived by folding over the change sequence — never
/// stored, always recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_tables: usize,
    pub tables_with_changes: usize,
    pub schema_changes: usize,
    pub data_changes: usize,
    pub total_changes: usize,
}

impl ComparisonDocument {
    /// Assemble a document from per-table diffs. Callers must pass only
    /// non-empty `TableChange`s; empty ones belong in `unchanged_tables`.
    pub fn new(
        source: &str,
        target: &str,
        unchanged_tables: usize,
        changes: Vec<TableChange>,
    ) -> Self {
        ComparisonDocument {
            comparison_id: format!(
                "cmp_{}_{}",
                Utc::now().format("%Y%m%d_%H%M%S"),
                Uuid::new_v4().simple()
            ),
            source: source.to_string(),
            target: target.to_string(),
            created_at: Utc::now().to_rfc3339(),
            unchanged_tables,
            changes,
        }
    }

    pub fn summary(&self) -> Summary {
        let schema_changes: usize = self.changes.iter().map(|t| t.schema.len()).sum();
        let data_changes: usize = self.changes.iter().map(|t| t.data.len()).sum();
        Summary {
            total_tables: self.changes.len() + self.unchanged_tables,
            tables_with_changes: self.changes.len(),
            schema_changes,
            data_changes,
            total_changes: schema_changes + data_changes,
        }
    }

    /// Look up the change entry for one table.
    pub fn table(&self, name: &str) -> Option<&TableChange> {
        self.changes.iter().find(|t| t.name == name)
    }

    /// Re-load a previously written report.
    ///
    /// Malformed change entries (neither `old` nor `new` present) are
    /// rejected here, before any renderer sees the document.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Failed to parse comparison document")
    }
}
