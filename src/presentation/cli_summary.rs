use crate::application::monitoring::PerfReport;
use crate::domain::change::ChangeKind;
use crate::domain::document::ComparisonDocument;
use colored::*;
use tabled::settings::{object::Columns, Alignment, Modify, Style};
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct TableRow {
    table: String,
    schema: String,
    added: String,
    modified: String,
    removed: String,
}

#[derive(Tabled)]
struct SummaryRow {
    metric: String,
    value: String,
}

pub fn print_summary(doc: &ComparisonDocument) {
    println!();

    println!("{}", "DBDELTA COMPARISON SUMMARY".bold().cyan());
    println!("{} → {}", doc.source.blue(), doc.target.green());
    println!("Comparison: {}", doc.comparison_id.bright_yellow());
    println!();

    let summary = doc.summary();
    if summary.total_changes == 0 {
        println!("{}", "No changes detected.".italic());
        return;
    }

    let rows: Vec<TableRow> = doc
        .changes
        .iter()
        .filter(|t| !t.is_empty())
        .map(|t| TableRow {
            table: t.name.bold().to_string(),
            schema: t.schema.len().to_string().cyan().to_string(),
            added: t
                .data_count(ChangeKind::Added)
                .to_string()
                .green()
                .to_string(),
            modified: t
                .data_count(ChangeKind::Modified)
                .to_string()
                .yellow()
                .to_string(),
            removed: t
                .data_count(ChangeKind::Removed)
                .to_string()
                .red()
                .to_string(),
        })
        .collect();

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..=4)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    let summary_rows = vec![
        SummaryRow {
            metric: "Total tables".into(),
            value: summary.total_tables.to_string(),
        },
        SummaryRow {
            metric: "Tables with changes".into(),
            value: summary.tables_with_changes.to_string().bold().to_string(),
        },
        SummaryRow {
            metric: "Schema changes".into(),
            value: summary.schema_changes.to_string().cyan().to_string(),
        },
        SummaryRow {
            metric: "Data changes".into(),
            value: summary.data_changes.to_string().yellow().to_string(),
        },
        SummaryRow {
            metric: "Total changes".into(),
            value: summary.total_changes.to_string().bold().to_string(),
        },
    ];

    let summary_table = Table::new(summary_rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..=1)).with(Alignment::right()))
        .to_string();

    println!();
    println!("{summary_table}");
    println!();
}

// ─── Performance summary ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct PerfRow {
    operation: String,
    table: String,
    #[tabled(rename = "rows")]
    rows: String,
    #[tabled(rename = "time (ms)")]
    duration_ms: String,
}

/// Print a performance timing table to stdout.
pub fn print_perf_summary(report: &PerfReport) {
    if report.timings.is_empty() {
        return;
    }

    println!("{}", "PERFORMANCE".bold().cyan());

    let rows: Vec<PerfRow> = report
        .timings
        .iter()
        .map(|t| PerfRow {
            operation: t.operation.dimmed().to_string(),
            table: t.table.bold().to_string(),
            rows: t.rows.to_string(),
            duration_ms: format_duration(t.duration_ms),
        })
        .collect();

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..=3)).with(Alignment::right()))
        .to_string();

    println!("{table}");

    println!(
        "  Total: {} row(s) fetched  ·  {} ms elapsed",
        report.total_rows_fetched.to_string().bold(),
        format_duration(report.total_ms),
    );
    println!();
}

fn format_duration(ms: u128) -> String {
    if ms >= 1_000 {
        format!("{:.1}s", ms as f64 / 1_000.0).yellow().to_string()
    } else if ms >= 100 {
        ms.to_string().yellow().to_string()
    } else {
        ms.to_string().green().to_string()
    }
}
