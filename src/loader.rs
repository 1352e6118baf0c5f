use crate::model::{Delimiter, FileFormat};
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs;
use std::path::Path;

/// A loaded export before normalization: column names in first-seen order
/// plus one map of column -> cell per row. Delimited cells are always
/// strings; JSON cells keep their original type.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<HashMap<String, Value>>,
}

impl RawTable {
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column == name)
    }
}

pub fn format_for_path(path: &Path) -> Result<FileFormat> {
    let extension = path
        .extension()
        .and_then(OsStr::to_str)
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("json") => Ok(FileFormat::Json),
        Some("csv") | Some("tsv") | Some("txt") => Ok(FileFormat::Delimited),
        _ => bail!(
            "unsupported file type: {} (expected .json, .csv, .tsv or .txt)",
            path.display()
        ),
    }
}

pub fn load_table(path: &Path, delimiter: Delimiter) -> Result<RawTable> {
    let format = format_for_path(path)?;
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    if raw.trim().is_empty() {
        bail!("{} is empty, nothing to parse", path.display());
    }
    match format {
        FileFormat::Json => parse_json(&raw),
        FileFormat::Delimited => parse_delimited(&raw, delimiter),
    }
}

#[derive(Debug, Deserialize)]
#[serde(transparent)]
struct JsonRow {
    cells: serde_json::Map<String, Value>,
}

fn parse_json(raw: &str) -> Result<RawTable> {
    let rows: Vec<JsonRow> =
        serde_json::from_str(raw).context("expected a JSON array of play-event objects")?;

    let mut table = RawTable::default();
    for row in rows {
        let mut cells = HashMap::with_capacity(row.cells.len());
        for (column, value) in row.cells {
            if !table.has_column(&column) {
                table.columns.push(column.clone());
            }
            cells.insert(column, value);
        }
        table.rows.push(cells);
    }

    if table.columns.is_empty() {
        bail!("no columns to parse; the JSON array is empty or holds no fields");
    }
    Ok(table)
}

fn parse_delimited(raw: &str, delimiter: Delimiter) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter.byte())
        .from_reader(raw.as_bytes());

    let headers = reader.headers().context("failed to read the header row")?;
    if headers.iter().all(|header| header.trim().is_empty()) {
        bail!("no columns to parse; check the file format and delimiter");
    }
    let columns: Vec<String> = headers.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        // Header is line 1, so data row N sits on line N + 1.
        let record = record.with_context(|| format!("failed to parse line {}", index + 2))?;
        let mut cells = HashMap::with_capacity(columns.len());
        for (column, cell) in columns.iter().zip(record.iter()) {
            cells.insert(column.clone(), Value::String(cell.to_string()));
        }
        rows.push(cells);
    }

    Ok(RawTable { columns, rows })
}
