use crate::domain::{document::ComparisonDocument, ports::OutputWriter};
use anyhow::Result;
use std::fs;
use std::path::Path;

use self::{html::HtmlWriter, json::JsonWriter};

pub mod html;
pub mod json;

/// Register available writers - OCP: add new ones without touching main.rs
pub fn all_writers() -> Vec<Box<dyn OutputWriter>> {
    vec![Box::new(JsonWriter), Box::new(HtmlWriter)]
}

pub fn writer_for(format: &str) -> Option<Box<dyn OutputWriter>> {
    match format {
        "json" => Some(Box::new(JsonWriter)),
        "html" => Some(Box::new(HtmlWriter)),
        _ => None,
    }
}

/// Writes the comparison document to disk via the chosen writer
pub fn write_to_file(
    writer: &dyn OutputWriter,
    doc: &ComparisonDocument,
    dir: &Path,
) -> Result<()> {
    fs::create_dir_all(dir)?;

    let content = writer.format(doc)?;
    let path = dir.join(format!("{}.{}", doc.comparison_id, writer.extension()));
    fs::write(&path, &content)?;
    Ok(())
}
