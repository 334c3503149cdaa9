use anyhow::Result;
use serde::Serialize;

use crate::domain::{
    document::{ComparisonDocument, Summary},
    ports::OutputWriter,
    table_change::TableChange,
};

// ─── Serialisation view type ──────────────────────────────────────────────────
//
// Mirrors the document's wire shape but appends the derived summary figures,
// so consumers of the file get the counts without re-folding the changes.
// Presentation-only: `ComparisonDocument::from_json` ignores the extra field
// when re-loading.

#[derive(Serialize)]
struct JsonDocument<'a> {
    comparison_id: &'a str,
    source: &'a str,
    target: &'a str,
    created_at: &'a str,
    unchanged_tables: usize,
    changes: &'a [TableChange],
    summary: Summary,
}

// ─── Writer ───────────────────────────────────────────────────────────────────

pub struct JsonWriter;

impl OutputWriter for JsonWriter {
    fn format(&self, doc: &ComparisonDocument) -> Result<String> {
        let view = JsonDocument {
            comparison_id: &doc.comparison_id,
            source: &doc.source,
            target: &doc.target,
            created_at: &doc.created_at,
            unchanged_tables: doc.unchanged_tables,
            changes: &doc.changes,
            summary: doc.summary(),
        };

        Ok(serde_json::to_string_pretty(&view)?)
    }

    fn extension(&self) -> &'static str {
        "json"
    }
}
