//! Row sources: spreadsheet-like records keyed by column header.
//!
//! The core only ever sees fully materialized [`Row`]s. This module provides
//! the thin readers used by the CLI and the upload endpoint: CSV (header row
//! required) and JSON arrays of objects.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{PeshiError, Result};

/// One record: column header → cell value.
pub type Row = BTreeMap<String, CellValue>;

/// A single spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Empty,
}

impl CellValue {
    /// The cell's text form, or `None` for an empty cell.
    pub fn to_text(&self) -> Option<String> {
        match self {
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Number(n) => Some(n.to_string()),
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::Empty => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_text() {
            Some(s) => f.write_str(&s),
            None => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

/// Build a row from `(column, value)` pairs.
pub fn row<K, V, I>(cells: I) -> Row
where
    K: Into<String>,
    V: Into<CellValue>,
    I: IntoIterator<Item = (K, V)>,
{
    cells
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Column headers of a dataset, taken from its first row.
pub fn columns(rows: &[Row]) -> Vec<String> {
    rows.first()
        .map(|r| r.keys().cloned().collect())
        .unwrap_or_default()
}

/// Parse CSV text. Blank cells are kept as [`CellValue::Empty`] so every
/// row carries the full header set.
pub fn from_csv_reader<R: Read>(reader: R) -> Result<Vec<Row>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(PeshiError::RowSource("no columns found in CSV".to_string()));
    }

    let mut rows = Vec::new();
    for (row_idx, result) in csv_reader.records().enumerate() {
        let record = result?;
        if record.len() > headers.len() {
            tracing::warn!(
                row = row_idx + 1,
                "row has more cells than columns, truncating"
            );
        }

        let row: Row = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !h.is_empty())
            .map(|(i, header)| {
                let value = match record.get(i) {
                    Some(cell) if !cell.is_empty() => CellValue::Text(cell.to_string()),
                    _ => CellValue::Empty,
                };
                (header.clone(), value)
            })
            .collect();

        // Skip fully blank lines
        if row.values().all(|v| *v == CellValue::Empty) {
            continue;
        }
        rows.push(row);
    }

    Ok(rows)
}

/// Parse a CSV file.
pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Vec<Row>> {
    let file = File::open(path.as_ref())?;
    from_csv_reader(BufReader::new(file))
}

/// Parse a JSON array of objects.
pub fn from_json_str(json: &str) -> Result<Vec<Row>> {
    Ok(serde_json::from_str(json)?)
}

/// Load rows from a `.csv` or `.json` file, chosen by extension.
pub fn load_path(path: impl AsRef<Path>) -> Result<Vec<Row>> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "csv" => from_csv_path(path),
        "json" => from_json_str(&std::fs::read_to_string(path)?),
        other => Err(PeshiError::RowSource(format!(
            "unsupported row file '{}' (extension '{}'); use .csv or .json",
            path.display(),
            other
        ))),
    }
}
