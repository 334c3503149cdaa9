use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

// ─── Log level ────────────────────────────────────────────────────────────────

/// Controls the verbosity of dbdelta's internal tracing output.
///
/// Pass to [`init_tracing`] before calling any async entry point.
///
/// | Variant | `tracing` level | When to use                          |
/// |---------|-----------------|--------------------------------------|
/// | `Error` | `error`         | `--quiet` / CI scripting             |
/// | `Info`  | `info`          | Default — shows per-table progress   |
/// | `Debug` | `debug`         | `--verbose` — shows snapshot queries |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Error,
    #[default]
    Info,
    Debug,
}

/// Initialise the global `tracing` subscriber for dbdelta.
///
/// This is a convenience wrapper around `tracing_subscriber`. It respects
/// `RUST_LOG` when set, falling back to `level` otherwise.
///
/// Call this **once** at application startup, before any dbdelta async
/// function. Library consumers who manage their own subscriber should skip
/// this and configure tracing themselves.
///
/// Only available when the `cli` feature is enabled (pulls in
/// `tracing-subscriber`).
#[cfg(feature = "cli")]
pub fn init_tracing(level: LogLevel) {
    use tracing_subscriber::fmt::format::FmtSpan;

    let default_filter = match level {
        LogLevel::Error => "dbdelta=error",
        LogLevel::Info => "dbdelta=info",
        LogLevel::Debug => "dbdelta=debug",
    };

    tracing_subscriber::fmt()
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}

// ─── Public API Facade ───

pub use application::compare::{CompareService, Scope};
pub use application::data_diff::RowDiffer;
pub use application::monitoring::PerfReport;
pub use application::schema_diff::diff_columns;
pub use domain::change::{ChangeKind, ColumnDescriptor, DataChange, RowMap, SchemaChange};
pub use domain::document::{ComparisonDocument, Summary};
pub use domain::ports::{Differ, OutputWriter, TableReader};
pub use domain::table_change::TableChange;
pub use domain::value_objects::{KeyColumns, TableName};
pub use infrastructure::config::{
    AppConfig, DiffConfig, OutputConfig, ReportConfig, TableConfig,
};
pub use presentation::report::surface::{Surface, TreeSurface};
pub use presentation::report::window::{WindowBounds, WindowConfig};
pub use presentation::report::{RenderState, ReportRenderer};

use crate::application::monitoring::{MonitoringDiffer, MonitoringReader};
use crate::infrastructure::db::inspector;

// ─── Public entry points ───

/// Compare two SQLite snapshot files.
///
/// Returns the assembled [`ComparisonDocument`].
/// Use [`compare_with_timing`] if you also want a performance report.
pub async fn compare(
    source: &Path,
    target: &Path,
    scope: Scope,
    cfg: &AppConfig,
) -> Result<ComparisonDocument> {
    let (doc, _) = compare_with_timing(source, target, scope, cfg).await?;
    Ok(doc)
}

/// Compare two snapshots with performance timing.
///
/// Returns the document and a [`PerfReport`] containing per-table fetch and
/// diff timings.
pub async fn compare_with_timing(
    source: &Path,
    target: &Path,
    scope: Scope,
    cfg: &AppConfig,
) -> Result<(ComparisonDocument, PerfReport)> {
    let report = PerfReport::new();

    let source_reader = build_reader(source, Arc::clone(&report)).await?;
    let target_reader = build_reader(target, Arc::clone(&report)).await?;
    let differ = Arc::new(MonitoringDiffer::new(
        Arc::new(RowDiffer::new()),
        Arc::clone(&report),
    ));

    let service = CompareService::new(source_reader, target_reader, differ);
    let doc = service
        .run(
            &source.display().to_string(),
            &target.display().to_string(),
            scope,
            &cfg.diff.tables,
        )
        .await?;

    let perf = report.lock().unwrap().clone();
    Ok((doc, perf))
}

/// Build an interactive renderer over `surface` for a previously produced
/// document, windowed per the report configuration.
pub fn renderer_for<'a, S: Surface>(
    doc: &'a ComparisonDocument,
    surface: S,
    cfg: &ReportConfig,
) -> ReportRenderer<'a, S> {
    ReportRenderer::new(
        doc,
        surface,
        WindowConfig {
            row_height: cfg.row_height,
            max_visible_rows: cfg.max_visible_rows,
        },
    )
}

// ─── Private helpers ──────────────────────────────────────────────────────────

/// Open a snapshot and wrap the reader in the monitoring decorator.
///
/// The shared `report` accumulates timings from both snapshots of the same
/// run, giving a unified view across source and target.
async fn build_reader(
    path: &Path,
    report: Arc<std::sync::Mutex<PerfReport>>,
) -> Result<Arc<dyn TableReader>> {
    let reader = Arc::new(inspector::open(path).await?);
    Ok(Arc::new(MonitoringReader::new(reader, report)))
}
