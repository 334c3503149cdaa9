//! Interactive report rendering.
//!
//! The renderer owns the presentation of one [`ComparisonDocument`]: summary
//! counters, one collapsible section per changed table, and — for large data
//! diffs — a virtual window over the row list. It is built once per report
//! load with the document injected through the constructor; all per-table
//! visibility and window state lives in an explicit [`RenderState`] map, and
//! every surface mutation goes through the [`Surface`] seam.

pub mod surface;
pub mod window;

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, error, warn};

use crate::domain::change::{DataChange, SchemaChange};
use crate::domain::document::ComparisonDocument;
use crate::presentation::report::surface::{CounterSlot, NodeId, NodeKind, Surface};
use crate::presentation::report::window::{WindowBounds, WindowConfig};

/// Placeholder for a field or attribute that has no value on one side.
pub const PLACEHOLDER: &str = "—";

/// Per-table render state: collapse/expand flag, whether the content panel
/// has been built, and the current window for windowed data lists. Rebuilt
/// from scratch on every report load, never persisted.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct RenderState {
    pub expanded: bool,
    pub built: bool,
    pub window: Option<WindowBounds>,
}

struct SectionNodes {
    section: NodeId,
    panel: Option<NodeId>,
    data_table: Option<NodeId>,
    data_columns: Vec<String>,
}

pub struct ReportRenderer<'a, S: Surface> {
    doc: &'a ComparisonDocument,
    surface: S,
    cfg: WindowConfig,
    states: BTreeMap<String, RenderState>,
    sections: BTreeMap<String, SectionNodes>,
}

impl<'a, S: Surface> ReportRenderer<'a, S> {
    pub fn new(doc: &'a ComparisonDocument, surface: S, cfg: WindowConfig) -> Self {
        Self {
            doc,
            surface,
            cfg,
            states: BTreeMap::new(),
            sections: BTreeMap::new(),
        }
    }

    /// Initial load: summary counters plus one collapsed header per table.
    /// Section content is not built until the first expansion.
    pub fn load(&mut self) {
        let summary = self.doc.summary();
        self.surface
            .set_counter(CounterSlot::TotalTables, summary.total_tables);
        self.surface
            .set_counter(CounterSlot::TablesWithChanges, summary.tables_with_changes);
        self.surface
            .set_counter(CounterSlot::SchemaChanges, summary.schema_changes);
        self.surface
            .set_counter(CounterSlot::DataChanges, summary.data_changes);

        for change in &self.doc.changes {
            let section = self.surface.create(None, NodeKind::Section);
            let header = self.surface.create(Some(section), NodeKind::Header);
            self.surface.set_text(
                header,
                &format!("{} ({} changes)", change.name, change.change_count()),
            );
            self.states.insert(change.name.clone(), RenderState::default());
            self.sections.insert(
                change.name.clone(),
                SectionNodes {
                    section,
                    panel: None,
                    data_table: None,
                    data_columns: Vec::new(),
                },
            );
        }
    }

    /// Expand or collapse one section. The first expansion builds the
    /// content; later toggles only flip visibility. A failure while building
    /// is contained to this section: it renders an inline error and the rest
    /// of the report stays intact.
    pub fn toggle(&mut self, table: &str) {
        if !self.sections.contains_key(table) {
            warn!(table, "toggle for a table not present in the report");
            return;
        }

        let built = self.states[table].built;
        if built {
            let state = self.states.get_mut(table).expect("state exists");
            state.expanded = !state.expanded;
            let expanded = state.expanded;
            if let Some(panel) = self.sections[table].panel {
                self.surface.set_visible(panel, expanded);
            }
            return;
        }

        let section = self.sections[table].section;
        let panel = self.surface.create(Some(section), NodeKind::Panel);
        if let Err(err) = self.build_panel(table, panel) {
            error!(table, error = %err, "failed to build section content");
            let note = self.surface.create(Some(panel), NodeKind::ErrorNote);
            self.surface.set_text(
                note,
                &format!("Could not render section '{}': {:#}", table, err),
            );
        }
        let sec = self.sections.get_mut(table).expect("section exists");
        sec.panel = Some(panel);
        let state = self.states.get_mut(table).expect("state exists");
        state.built = true;
        state.expanded = true;
        self.surface.set_visible(panel, true);
    }

    /// Scroll-position change inside one section's data table. Recomputes
    /// the window from scratch and rebuilds the materialised slice.
    pub fn scroll(&mut self, table: &str, offset: f64) {
        let doc = self.doc;
        let Some(change) = doc.table(table) else {
            warn!(table, "scroll for a table not present in the report");
            return;
        };
        let total = change.data.len();
        if total <= self.cfg.max_visible_rows {
            // direct path: everything is already materialised
            return;
        }
        let Some(sec) = self.sections.get(table) else {
            warn!(table, "scroll before load");
            return;
        };
        let Some(data_table) = sec.data_table else {
            debug!(table, "scroll before first expansion");
            return;
        };
        let columns = sec.data_columns.clone();

        let bounds = WindowBounds::compute(offset, total, &self.cfg);
        self.surface.clear_children(data_table);
        render_column_header(&mut self.surface, data_table, &columns);
        render_data_rows(&mut self.surface, data_table, &change.data, &columns, bounds);

        self.states.get_mut(table).expect("state exists").window = Some(bounds);
    }

    /// Search/filter entry point. Semantics are deliberately unspecified
    /// upstream, so this records the request and changes nothing.
    pub fn filter(&mut self, query: &str) {
        debug!(query, "filter requested but not implemented");
    }

    pub fn state(&self, table: &str) -> Option<&RenderState> {
        self.states.get(table)
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    fn build_panel(&mut self, table: &str, panel: NodeId) -> Result<()> {
        let doc = self.doc;
        let change = doc
            .table(table)
            .context("table missing from comparison document")?;

        if !change.schema.is_empty() {
            build_schema_table(&mut self.surface, panel, &change.schema);
        }

        if !change.data.is_empty() {
            let columns = column_union(&change.data);
            if columns.is_empty() {
                bail!("data changes carry no column values");
            }

            let data_table = self.surface.create(Some(panel), NodeKind::DataTable);
            render_column_header(&mut self.surface, data_table, &columns);

            let total = change.data.len();
            let windowed = total > self.cfg.max_visible_rows;
            let bounds = if windowed {
                WindowBounds::compute(0.0, total, &self.cfg)
            } else {
                WindowBounds::full(total)
            };
            render_data_rows(&mut self.surface, data_table, &change.data, &columns, bounds);

            let sec = self.sections.get_mut(table).expect("section exists");
            sec.data_table = Some(data_table);
            sec.data_columns = columns;
            if windowed {
                self.states.get_mut(table).expect("state exists").window = Some(bounds);
            }
        }

        Ok(())
    }
}

// ─── Content builders ────────────────────────────────────────────────────────

const SCHEMA_HEADERS: [&str; 7] = [
    "column",
    "old type",
    "new type",
    "old nullable",
    "new nullable",
    "old default",
    "new default",
];

fn build_schema_table<S: Surface>(surface: &mut S, panel: NodeId, changes: &[SchemaChange]) {
    let table = surface.create(Some(panel), NodeKind::SchemaTable);

    let header = surface.create(Some(table), NodeKind::Row);
    surface.set_tag(header, "header");
    for title in SCHEMA_HEADERS {
        let cell = surface.create(Some(header), NodeKind::Cell);
        surface.set_text(cell, title);
    }

    for change in changes {
        let row = surface.create(Some(table), NodeKind::Row);
        surface.set_tag(row, change.kind().as_str());
        for text in schema_cells(change) {
            let cell = surface.create(Some(row), NodeKind::Cell);
            surface.set_text(cell, &text);
        }
    }
}

/// The seven cell texts of one schema-change row; absent sides and absent
/// defaults become the placeholder rather than being dropped.
pub(crate) fn schema_cells(change: &SchemaChange) -> Vec<String> {
    let type_of = |side: Option<&crate::domain::change::ColumnDescriptor>| {
        side.map(|c| c.col_type.clone())
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    };
    let nullable_of = |side: Option<&crate::domain::change::ColumnDescriptor>| {
        side.map(|c| c.nullable.to_string())
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    };
    let default_of = |side: Option<&crate::domain::change::ColumnDescriptor>| {
        side.and_then(|c| c.default.as_ref())
            .map(format_value)
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    };

    vec![
        change.name().to_string(),
        type_of(change.old()),
        type_of(change.new()),
        nullable_of(change.old()),
        nullable_of(change.new()),
        default_of(change.old()),
        default_of(change.new()),
    ]
}

fn render_column_header<S: Surface>(surface: &mut S, data_table: NodeId, columns: &[String]) {
    let header = surface.create(Some(data_table), NodeKind::Row);
    surface.set_tag(header, "header");
    for column in columns {
        let cell = surface.create(Some(header), NodeKind::Cell);
        surface.set_text(cell, column);
    }
}

/// Materialise the rows `[bounds.start, bounds.end)` with spacers around
/// them. The direct path passes `WindowBounds::full`, so both paths share
/// this one row builder and necessarily agree on row content.
fn render_data_rows<S: Surface>(
    surface: &mut S,
    data_table: NodeId,
    changes: &[DataChange],
    columns: &[String],
    bounds: WindowBounds,
) {
    if bounds.leading_px > 0 {
        let spacer = surface.create(Some(data_table), NodeKind::Spacer);
        surface.set_height(spacer, bounds.leading_px);
    }

    for change in &changes[bounds.start..bounds.end] {
        let row = surface.create(Some(data_table), NodeKind::Row);
        surface.set_tag(row, change.kind().as_str());
        for (text, changed) in data_cells(change, columns) {
            let cell = surface.create(Some(row), NodeKind::Cell);
            surface.set_text(cell, &text);
            if changed {
                surface.set_tag(cell, "changed");
            }
        }
    }

    if bounds.trailing_px > 0 {
        let spacer = surface.create(Some(data_table), NodeKind::Spacer);
        surface.set_height(spacer, bounds.trailing_px);
    }
}

/// Cell texts for one data row, one per table column, with a flag marking
/// cells whose field actually differs. Added/removed rows show their single
/// side; a modified row shows `old → new` only for the differing fields.
pub(crate) fn data_cells(change: &DataChange, columns: &[String]) -> Vec<(String, bool)> {
    let fmt = |row: Option<&crate::domain::change::RowMap>, col: &str| {
        row.and_then(|r| r.get(col))
            .map(format_value)
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    };

    match change {
        DataChange::Added { .. } | DataChange::Removed { .. } => columns
            .iter()
            .map(|col| (fmt(change.old().or(change.new()), col), false))
            .collect(),
        DataChange::Modified { old, new } => {
            let changed = change.changed_fields();
            columns
                .iter()
                .map(|col| {
                    if changed.contains(&col.as_str()) {
                        let text = format!(
                            "{} → {}",
                            fmt(Some(old), col),
                            fmt(Some(new), col)
                        );
                        (text, true)
                    } else {
                        (fmt(Some(old), col), false)
                    }
                })
                .collect()
        }
    }
}

/// Union of all field names across every change's old/new row, in first-seen
/// order.
pub(crate) fn column_union(changes: &[DataChange]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for change in changes {
        for row in [change.old(), change.new()].into_iter().flatten() {
            for name in row.keys() {
                if !columns.contains(name) {
                    columns.push(name.clone());
                }
            }
        }
    }
    columns
}

/// Human-readable form of one field value.
pub(crate) fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::change::{ChangeKind, ColumnDescriptor, RowMap};
    use crate::domain::table_change::TableChange;
    use crate::presentation::report::surface::TreeSurface;
    use serde_json::json;

    fn col(name: &str, col_type: &str, nullable: bool) -> ColumnDescriptor {
        ColumnDescriptor {
            name: name.to_string(),
            col_type: col_type.to_string(),
            nullable,
            default: None,
        }
    }

    fn row(pairs: &[(&str, Value)]) -> RowMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn small_doc() -> ComparisonDocument {
        let cells = TableChange {
            name: "cells".to_string(),
            schema: vec![SchemaChange::Modified {
                name: "Value".to_string(),
                old: col("Value", "Integer", true),
                new: col("Value", "Integer", false),
            }],
            data: vec![
                DataChange::Modified {
                    old: row(&[("id", json!(1)), ("Value", json!(5))]),
                    new: row(&[("id", json!(1)), ("Value", json!(6))]),
                },
                DataChange::Added {
                    new: row(&[("id", json!(2)), ("Value", json!(7))]),
                },
            ],
        };
        let labels = TableChange {
            name: "labels".to_string(),
            schema: vec![SchemaChange::Added {
                name: "Label".to_string(),
                new: col("Label", "Text", true),
            }],
            data: vec![],
        };
        ComparisonDocument::new("old.db", "new.db", 1, vec![cells, labels])
    }

    fn large_doc(total: usize) -> ComparisonDocument {
        let data = (0..total)
            .map(|i| DataChange::Added {
                new: row(&[("id", json!(i as i64)), ("v", json!("x"))]),
            })
            .collect();
        let tc = TableChange {
            name: "big".to_string(),
            schema: vec![],
            data,
        };
        ComparisonDocument::new("old.db", "new.db", 0, vec![tc])
    }

    fn renderer(doc: &ComparisonDocument, cfg: WindowConfig) -> ReportRenderer<'_, TreeSurface> {
        let mut r = ReportRenderer::new(doc, TreeSurface::new(), cfg);
        r.load();
        r
    }

    fn data_rows(surface: &TreeSurface) -> Vec<NodeId> {
        let tables: Vec<NodeId> = surface
            .roots()
            .iter()
            .flat_map(|&s| surface.descendants_of_kind(s, NodeKind::DataTable))
            .collect();
        tables
            .iter()
            .flat_map(|&t| surface.children(t).to_vec())
            .filter(|&n| {
                surface.node(n).kind == NodeKind::Row && surface.node(n).tag != "header"
            })
            .collect()
    }

    fn row_texts(surface: &TreeSurface, rows: &[NodeId]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|&r| {
                surface
                    .children(r)
                    .iter()
                    .map(|&c| surface.node(c).text.clone())
                    .collect()
            })
            .collect()
    }

    #[test]
    fn load_sets_counters_and_collapsed_headers() {
        let doc = small_doc();
        let r = renderer(&doc, WindowConfig::default());
        let s = r.surface();

        assert_eq!(s.counter(CounterSlot::TotalTables), 3);
        assert_eq!(s.counter(CounterSlot::TablesWithChanges), 2);
        assert_eq!(s.counter(CounterSlot::SchemaChanges), 2);
        assert_eq!(s.counter(CounterSlot::DataChanges), 2);

        assert_eq!(s.roots().len(), 2);
        let header = s.children(s.roots()[0])[0];
        assert_eq!(s.node(header).kind, NodeKind::Header);
        assert_eq!(s.node(header).text, "cells (3 changes)");
        // content is lazy: nothing but the header exists yet
        assert_eq!(s.children(s.roots()[0]).len(), 1);
    }

    #[test]
    fn first_toggle_builds_content_later_toggles_flip_visibility() {
        let doc = small_doc();
        let mut r = renderer(&doc, WindowConfig::default());

        r.toggle("cells");
        let state = *r.state("cells").unwrap();
        assert!(state.built && state.expanded);

        let section = r.surface().roots()[0];
        let panel = r.surface().children(section)[1];
        assert_eq!(r.surface().node(panel).kind, NodeKind::Panel);
        let schema_tables = r.surface().descendants_of_kind(section, NodeKind::SchemaTable);
        assert_eq!(schema_tables.len(), 1);

        let built_nodes = r.surface().descendants_of_kind(section, NodeKind::Cell).len();

        r.toggle("cells");
        assert!(!r.state("cells").unwrap().expanded);
        assert!(!r.surface().node(panel).visible);
        // collapse/expand never rebuilds
        assert_eq!(
            r.surface().descendants_of_kind(section, NodeKind::Cell).len(),
            built_nodes
        );

        r.toggle("cells");
        assert!(r.surface().node(panel).visible);
    }

    #[test]
    fn schema_rows_render_placeholders_for_absent_sides() {
        let doc = small_doc();
        let mut r = renderer(&doc, WindowConfig::default());
        r.toggle("labels");

        let section = r.surface().roots()[1];
        let table = r.surface().descendants_of_kind(section, NodeKind::SchemaTable)[0];
        let rows = r.surface().children(table);
        // header + one added column
        assert_eq!(rows.len(), 2);
        let texts: Vec<String> = r
            .surface()
            .children(rows[1])
            .iter()
            .map(|&c| r.surface().node(c).text.clone())
            .collect();
        assert_eq!(
            texts,
            vec!["Label", PLACEHOLDER, "Text", PLACEHOLDER, "true", PLACEHOLDER, PLACEHOLDER]
        );
        assert_eq!(r.surface().node(rows[1]).tag, "added");
    }

    #[test]
    fn modified_rows_mark_only_differing_fields() {
        let doc = small_doc();
        let mut r = renderer(&doc, WindowConfig::default());
        r.toggle("cells");

        let rows = data_rows(r.surface());
        assert_eq!(rows.len(), 2);
        assert_eq!(r.surface().node(rows[0]).tag, "modified");
        assert_eq!(r.surface().node(rows[1]).tag, "added");

        // column union order: id, Value (first-seen)
        let cells: Vec<(String, String)> = r
            .surface()
            .children(rows[0])
            .iter()
            .map(|&c| (r.surface().node(c).text.clone(), r.surface().node(c).tag.clone()))
            .collect();
        assert_eq!(cells[0], ("1".to_string(), String::new()));
        assert_eq!(cells[1], ("5 → 6".to_string(), "changed".to_string()));
    }

    #[test]
    fn large_lists_are_windowed_with_spacers() {
        let doc = large_doc(1000);
        let cfg = WindowConfig {
            row_height: 35,
            max_visible_rows: 50,
        };
        let mut r = renderer(&doc, cfg);
        r.toggle("big");

        assert_eq!(data_rows(r.surface()).len(), 50);

        let section = r.surface().roots()[0];
        let spacers = r.surface().descendants_of_kind(section, NodeKind::Spacer);
        assert_eq!(spacers.len(), 1); // no leading spacer at offset 0
        assert_eq!(r.surface().node(spacers[0]).height, 950 * 35);

        let w = r.state("big").unwrap().window.unwrap();
        assert_eq!((w.start, w.end), (0, 50));
    }

    #[test]
    fn scroll_rebuilds_the_window() {
        let doc = large_doc(1000);
        let cfg = WindowConfig {
            row_height: 35,
            max_visible_rows: 50,
        };
        let mut r = renderer(&doc, cfg);
        r.toggle("big");
        r.scroll("big", 700.0);

        let w = r.state("big").unwrap().window.unwrap();
        assert_eq!((w.start, w.end), (20, 70));

        let rows = data_rows(r.surface());
        assert_eq!(rows.len(), 50);
        let texts = row_texts(r.surface(), &rows);
        assert_eq!(texts[0][0], "20");

        let section = r.surface().roots()[0];
        let spacers: Vec<u64> = r
            .surface()
            .descendants_of_kind(section, NodeKind::Spacer)
            .iter()
            .map(|&s| r.surface().node(s).height)
            .filter(|&h| h > 0)
            .collect();
        assert_eq!(spacers, vec![20 * 35, 930 * 35]);
    }

    #[test]
    fn windowed_and_direct_paths_agree_on_row_content() {
        let doc = large_doc(10);

        let mut direct = renderer(&doc, WindowConfig { row_height: 35, max_visible_rows: 50 });
        direct.toggle("big");
        let direct_texts = row_texts(direct.surface(), &data_rows(direct.surface()));

        let mut windowed = renderer(&doc, WindowConfig { row_height: 35, max_visible_rows: 4 });
        windowed.toggle("big");
        let windowed_texts = row_texts(windowed.surface(), &data_rows(windowed.surface()));

        assert_eq!(windowed_texts.len(), 4);
        assert_eq!(windowed_texts[..], direct_texts[..4]);
    }

    #[test]
    fn small_lists_ignore_scroll_events() {
        let doc = small_doc();
        let mut r = renderer(&doc, WindowConfig::default());
        r.toggle("cells");
        let before = row_texts(r.surface(), &data_rows(r.surface()));
        r.scroll("cells", 5000.0);
        assert_eq!(before, row_texts(r.surface(), &data_rows(r.surface())));
        assert!(r.state("cells").unwrap().window.is_none());
    }

    #[test]
    fn unknown_table_events_are_ignored() {
        let doc = small_doc();
        let mut r = renderer(&doc, WindowConfig::default());
        let roots = r.surface().roots().len();
        r.toggle("ghost");
        r.scroll("ghost", 100.0);
        r.filter("anything");
        assert_eq!(r.surface().roots().len(), roots);
        assert!(r.state("ghost").is_none());
    }

    #[test]
    fn malformed_section_fails_inline_without_touching_the_rest() {
        // wire-level document whose data rows carry no resolvable columns
        let text = r#"{
            "comparison_id": "cmp_x",
            "source": "a.db",
            "target": "b.db",
            "created_at": "2026-01-01T00:00:00Z",
            "unchanged_tables": 0,
            "changes": [
                {"name": "broken", "schema": [], "data": [{"old": {}}]},
                {"name": "fine", "schema": [],
                 "data": [{"new": {"id": 1}}]}
            ]
        }"#;
        let doc = ComparisonDocument::from_json(text).unwrap();
        let mut r = renderer(&doc, WindowConfig::default());

        r.toggle("broken");
        let broken = r.surface().roots()[0];
        let errors = r.surface().descendants_of_kind(broken, NodeKind::ErrorNote);
        assert_eq!(errors.len(), 1);
        assert!(r.surface().node(errors[0]).text.contains("broken"));

        r.toggle("fine");
        let fine = r.surface().roots()[1];
        assert!(r.surface().descendants_of_kind(fine, NodeKind::ErrorNote).is_empty());
        assert_eq!(data_rows(r.surface()).len(), 1);
        assert_eq!(r.surface().counter(CounterSlot::DataChanges), 2);
    }

    #[test]
    fn data_kind_partition_is_exhaustive_on_rendered_rows() {
        let doc = small_doc();
        let mut r = renderer(&doc, WindowConfig::default());
        r.toggle("cells");
        for row in data_rows(r.surface()) {
            let tag = &r.surface().node(row).tag;
            assert!(
                [
                    ChangeKind::Added.as_str(),
                    ChangeKind::Removed.as_str(),
                    ChangeKind::Modified.as_str()
                ]
                .contains(&tag.as_str()),
                "unexpected tag {tag}"
            );
        }
    }
}
