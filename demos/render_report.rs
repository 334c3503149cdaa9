//! Drive the interactive renderer against an in-memory surface.
//!
//! Builds a small comparison document in code, loads it into a
//! `ReportRenderer` over a `TreeSurface`, then expands a section and scrolls
//! its windowed data table, printing what the surface holds after each step.
//!
//! Run with: `cargo run --example render_report`

use dbdelta::presentation::report::surface::{CounterSlot, NodeKind};
use dbdelta::{
    ComparisonDocument, DataChange, ReportRenderer, RowMap, TableChange, TreeSurface,
    WindowConfig,
};
use serde_json::json;

fn row(pairs: &[(&str, serde_json::Value)]) -> RowMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn main() {
    let data = (0..500)
        .map(|i| DataChange::Added {
            new: row(&[("id", json!(i)), ("Value", json!(i * 10))]),
        })
        .collect();
    let table = TableChange {
        name: "cells".to_string(),
        schema: vec![],
        data,
    };
    let doc = ComparisonDocument::new("old.db", "new.db", 2, vec![table]);

    let cfg = WindowConfig::default(); // 35 px rows, 50 visible
    let mut renderer = ReportRenderer::new(&doc, TreeSurface::new(), cfg);
    renderer.load();

    println!(
        "loaded: {} tables, {} with changes, {} data changes",
        renderer.surface().counter(CounterSlot::TotalTables),
        renderer.surface().counter(CounterSlot::TablesWithChanges),
        renderer.surface().counter(CounterSlot::DataChanges),
    );

    renderer.toggle("cells");
    let window = renderer.state("cells").unwrap().window.unwrap();
    println!(
        "expanded 'cells': rows {}..{} materialised out of 500",
        window.start, window.end
    );

    renderer.scroll("cells", 4200.0);
    let window = renderer.state("cells").unwrap().window.unwrap();
    println!(
        "scrolled to 4200 px: rows {}..{}, spacers {} px / {} px",
        window.start, window.end, window.leading_px, window.trailing_px
    );

    let surface = renderer.into_surface();
    let section = surface.roots()[0];
    let materialised = surface
        .descendants_of_kind(section, NodeKind::Row)
        .iter()
        .filter(|&&r| surface.node(r).tag != "header")
        .count();
    println!("surface holds {materialised} materialised rows");
}
