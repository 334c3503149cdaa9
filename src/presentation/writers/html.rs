use anyhow::Result;
use sailfish::TemplateSimple;

use crate::domain::{
    document::ComparisonDocument, ports::OutputWriter, table_change::TableChange,
};
use crate::presentation::report::{column_union, data_cells, schema_cells};

// ─── Template view types ──────────────────────────────────────────────────────
//
// Everything is pre-formatted to plain strings before the template runs, so
// the template itself only loops and escapes. The static export materialises
// every row: windowing only applies to the interactive renderer.

struct CellView {
    text: String,
    changed: bool,
}

struct DataRowView {
    kind: String,
    cells: Vec<CellView>,
}

struct SchemaRowView {
    kind: String,
    cells: Vec<String>,
}

struct TableView {
    name: String,
    change_count: usize,
    schema_rows: Vec<SchemaRowView>,
    data_columns: Vec<String>,
    data_rows: Vec<DataRowView>,
}

#[derive(TemplateSimple)]
#[template(path = "html/report.stpl")] // base dir declared inside sailfish.toml
struct ReportTemplate {
    comparison_id: String,
    source: String,
    target: String,
    created_at: String,
    total_tables: usize,
    tables_with_changes: usize,
    schema_changes: usize,
    data_changes: usize,
    tables: Vec<TableView>,
}

fn build_table_view(change: &TableChange) -> TableView {
    let schema_rows = change
        .schema
        .iter()
        .map(|c| SchemaRowView {
            kind: c.kind().as_str().to_string(),
            cells: schema_cells(c),
        })
        .collect();

    let data_columns = column_union(&change.data);
    let data_rows = change
        .data
        .iter()
        .map(|c| DataRowView {
            kind: c.kind().as_str().to_string(),
            cells: data_cells(c, &data_columns)
                .into_iter()
                .map(|(text, changed)| CellView { text, changed })
                .collect(),
        })
        .collect();

    TableView {
        name: change.name.clone(),
        change_count: change.change_count(),
        schema_rows,
        data_columns,
        data_rows,
    }
}

// ─── Writer ───────────────────────────────────────────────────────────────────

pub struct HtmlWriter;

impl OutputWriter for HtmlWriter {
    fn format(&self, doc: &ComparisonDocument) -> Result<String> {
        let summary = doc.summary();
        let template = ReportTemplate {
            comparison_id: doc.comparison_id.clone(),
            source: doc.source.clone(),
            target: doc.target.clone(),
            created_at: doc.created_at.clone(),
            total_tables: summary.total_tables,
            tables_with_changes: summary.tables_with_changes,
            schema_changes: summary.schema_changes,
            data_changes: summary.data_changes,
            tables: doc.changes.iter().map(build_table_view).collect(),
        };
        Ok(template.render_once()?)
    }

    fn extension(&self) -> &'static str {
        "html"
    }
}
