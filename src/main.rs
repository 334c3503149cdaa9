use anyhow::Result;
use chrono::Local;
use clap::Parser;
use dbdelta::presentation::cli_summary::{print_perf_summary, print_summary};
use dbdelta::presentation::writers::{all_writers, write_to_file, writer_for};
use dbdelta::{AppConfig, LogLevel, Scope};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "dbdelta",
    about = "dbdelta — Compare two SQLite snapshots and report every change."
)]
struct Cli {
    /// Old snapshot file
    source: PathBuf,

    /// New snapshot file
    target: PathBuf,

    /// Which half of the comparison to run
    #[arg(long, value_enum, default_value = "both")]
    scope: Scope,

    /// Optional TOML config (identity keys per table, report tuning)
    #[arg(short, long)]
    config: Option<String>,

    /// Output format: json, html or all
    #[arg(short, long, default_value = "all")]
    format: String,

    /// Override the configured output directory
    #[arg(short, long)]
    output: Option<String>,

    /// Print the terminal summary instead of writing report files
    #[arg(long)]
    dry_run: bool,

    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.quiet {
        LogLevel::Error
    } else if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };
    dbdelta::init_tracing(level);

    let cfg = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    let (doc, perf) =
        dbdelta::compare_with_timing(&cli.source, &cli.target, cli.scope, &cfg).await?;

    if cli.dry_run {
        print_summary(&doc);
        if !cli.quiet {
            print_perf_summary(&perf);
        }
        return Ok(());
    }

    // --- generate subdirectory per comparison ---
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let out_dir = cli.output.as_deref().unwrap_or(&cfg.output.dir);
    let subdir_name = format!("{}_{}", timestamp, doc.comparison_id);
    let output_subdir = Path::new(out_dir).join(&subdir_name);

    match cli.format.as_str() {
        "all" => {
            for writer in all_writers() {
                write_to_file(&*writer, &doc, &output_subdir)?;
            }
        }
        fmt => {
            let writer =
                writer_for(fmt).ok_or_else(|| anyhow::anyhow!("Unknown format: {}", fmt))?;
            write_to_file(&*writer, &doc, &output_subdir)?;
        }
    }

    print_summary(&doc);
    println!("Report written to {}", output_subdir.display());

    Ok(())
}
