use crate::domain::ports::{Differ, TableReader};
use crate::domain::{
    change::{ColumnDescriptor, DataChange, RowMap},
    value_objects::{KeyColumns, TableName},
};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{info, instrument};

// ─── PerfReport ──────────────────────────────────────────────────────────────

/// A single timed operation.
#[derive(Debug, Clone, serde::Serialize)]
pub struct OpTiming {
    /// Operation name: "fetch_rows", "fetch_columns" or "diff_rows".
    pub operation: &'static str,
    /// Table this operation was performed on.
    pub table: String,
    /// Elapsed wall time in milliseconds.
    pub duration_ms: u128,
    /// Number of rows involved (fetched or diffed).
    pub rows: usize,
}

/// Accumulated performance timings for a single comparison run.
///
/// Shared across all decorator instances for one run via `Arc<Mutex<_>>`.
/// After the run, pass to `print_perf_summary` to render a human-readable
/// table.
#[derive(Debug, Default, Clone, serde::Serialize)]
pub struct PerfReport {
    pub timings: Vec<OpTiming>,
    pub total_rows_fetched: usize,
    pub total_ms: u128,
}

impl PerfReport {
    pub fn new() -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(Self::default()))
    }

    fn record(report: &Arc<Mutex<Self>>, timing: OpTiming) {
        if let Ok(mut r) = report.lock() {
            r.total_ms += timing.duration_ms;
            if timing.operation == "fetch_rows" {
                r.total_rows_fetched += timing.rows;
            }
            r.timings.push(timing);
        }
    }
}

// ─── MonitoringReader ────────────────────────────────────────────────────────

/// Decorator: wraps any `TableReader`, measures wall time per fetch, and
/// appends the result to the shared `PerfReport`.
pub struct MonitoringReader {
    inner: Arc<dyn TableReader>,
    report: Arc<Mutex<PerfReport>>,
}

impl MonitoringReader {
    pub fn new(inner: Arc<dyn TableReader>, report: Arc<Mutex<PerfReport>>) -> Self {
        Self { inner, report }
    }
}

#[async_trait]
impl TableReader for MonitoringReader {
    async fn table_names(&self) -> Result<Vec<TableName>> {
        self.inner.table_names().await
    }

    #[instrument(name = "fetch_columns", skip(self, table), fields(db.table = %table), level = "info")]
    async fn columns(&self, table: &TableName) -> Result<Vec<ColumnDescriptor>> {
        let start = Instant::now();
        let columns = self.inner.columns(table).await?;
        PerfReport::record(
            &self.report,
            OpTiming {
                operation: "fetch_columns",
                table: table.0.clone(),
                duration_ms: start.elapsed().as_millis(),
                rows: columns.len(),
            },
        );
        Ok(columns)
    }

    async fn key_columns(&self, table: &TableName) -> Result<KeyColumns> {
        self.inner.key_columns(table).await
    }

    #[instrument(name = "fetch_rows", skip(self, table, keys), fields(db.table = %table), level = "info")]
    async fn rows(&self, table: &TableName, keys: &KeyColumns) -> Result<Vec<RowMap>> {
        let start = Instant::now();
        let rows = self.inner.rows(table, keys).await?;
        let duration_ms = start.elapsed().as_millis();

        info!(table = %table, rows = rows.len(), duration_ms, "fetch_rows completed");

        PerfReport::record(
            &self.report,
            OpTiming {
                operation: "fetch_rows",
                table: table.0.clone(),
                duration_ms,
                rows: rows.len(),
            },
        );

        Ok(rows)
    }
}

// ─── MonitoringDiffer ────────────────────────────────────────────────────────

/// Decorator: wraps any `Differ`, measures wall time per `diff_rows` call,
/// and appends the result to the shared `PerfReport`.
pub struct MonitoringDiffer {
    inner: Arc<dyn Differ>,
    report: Arc<Mutex<PerfReport>>,
}

impl MonitoringDiffer {
    pub fn new(inner: Arc<dyn Differ>, report: Arc<Mutex<PerfReport>>) -> Self {
        Self { inner, report }
    }
}

impl Differ for MonitoringDiffer {
    #[instrument(
        name = "diff_rows",
        skip(self, old, new, keys, table),
        fields(
            db.table = %table,
            old.rows = old.len(),
            new.rows = new.len(),
        ),
        level = "info"
    )]
    fn diff_rows(
        &self,
        old: &[RowMap],
        new: &[RowMap],
        keys: &KeyColumns,
        table: &TableName,
    ) -> Result<Vec<DataChange>> {
        let start = Instant::now();
        let result = self.inner.diff_rows(old, new, keys, table)?;
        let duration_ms = start.elapsed().as_millis();

        info!(table = %table, changes = result.len(), duration_ms, "diff_rows completed");

        PerfReport::record(
            &self.report,
            OpTiming {
                operation: "diff_rows",
                table: table.0.clone(),
                duration_ms,
                rows: old.len() + new.len(),
            },
        );

        Ok(result)
    }
}
