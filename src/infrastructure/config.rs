use anyhow::{Context, Result};
use serde::Deserialize;

/// Optional TOML configuration. Everything has a sensible default: the
/// snapshot paths come from the CLI, identity keys default to each table's
/// declared primary key, and the report knobs default to the values below.
#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub diff: DiffConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct DiffConfig {
    #[serde(default)]
    pub tables: Vec<TableConfig>,
}

/// Per-table override for the identity-key columns, for tables whose
/// declared primary key is absent or unsuitable.
#[derive(Debug, Deserialize, Clone)]
pub struct TableConfig {
    pub name: String,
    pub key: Vec<String>,
}

/// Renderer tuning: estimated row height and the windowing threshold.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct ReportConfig {
    #[serde(default = "default_row_height")]
    pub row_height: u32,
    #[serde(default = "default_max_visible_rows")]
    pub max_visible_rows: usize,
}

fn default_row_height() -> u32 {
    35
}

fn default_max_visible_rows() -> usize {
    50
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            row_height: default_row_height(),
            max_visible_rows: default_max_visible_rows(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: String,
}

fn default_output_dir() -> String {
    "reports".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            dir: default_output_dir(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;
        let cfg: AppConfig =
            toml::from_str(&content).with_context(|| "Failed to parse config TOML")?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_falls_back_to_defaults() {
        let cfg: AppConfig = toml::from_str("").unwrap();
        assert!(cfg.diff.tables.is_empty());
        assert_eq!(cfg.report.row_height, 35);
        assert_eq!(cfg.report.max_visible_rows, 50);
        assert_eq!(cfg.output.dir, "reports");
    }

    #[test]
    fn table_key_overrides_parse() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [[diff.tables]]
            name = "TableCell"
            key = ["CellID", "TableVID"]

            [report]
            max_visible_rows = 100
            "#,
        )
        .unwrap();
        assert_eq!(cfg.diff.tables.len(), 1);
        assert_eq!(cfg.diff.tables[0].key.len(), 2);
        assert_eq!(cfg.report.max_visible_rows, 100);
        assert_eq!(cfg.report.row_height, 35);
    }
}
