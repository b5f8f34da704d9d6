//! # Schema Reconciliation
//!
//! Turns a spreadsheet [`Row`] into a [`ValueBag`] keyed by the logical
//! field names a template expects.
//!
//! Two lookup modes:
//!
//! - **Preset** (no mapping): `row[field.name]`, exact key match only.
//! - **Custom** (with a [`ColumnMapping`]): `row[mapping[field.name]]`,
//!   exact match first, then a case-insensitive fallback.
//!
//! Preset mode deliberately has no case-insensitive fallback, so a preset
//! template fed a sheet with a `Code` header resolves no `code` value.
//!
//! A value that cannot be found is simply absent from the bag. The renderer
//! decides what an absent value means for each field type.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::error::{PeshiError, Result};
use crate::rows::{self, Row};
use crate::template::TemplateDefinition;

/// Field name checked by the pre-flight validation.
pub const CODE_COLUMN: &str = "code";
/// Accepted spellings of the color column.
pub const COLOR_COLUMNS: [&str; 2] = ["color", "colour"];

/// Resolved field values for a single row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueBag(BTreeMap<String, String>);

impl ValueBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value, which may be an empty string.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Value if present and non-empty.
    pub fn non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|v| !v.is_empty())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ValueBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Logical field name → source column name.
///
/// Keys are lowercased to match template field names. Entries with an empty
/// column ("no column selected") are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>")]
pub struct ColumnMapping(BTreeMap<String, String>);

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, field: &str, column: &str) -> Self {
        self.insert(field, column);
        self
    }

    pub fn insert(&mut self, field: &str, column: &str) {
        let field = field.trim().to_lowercase();
        if field.is_empty() || column.is_empty() {
            return;
        }
        self.0.insert(field, column.to_string());
    }

    /// Column mapped to a field, if any.
    pub fn column_for(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<String, String>> for ColumnMapping {
    fn from(map: BTreeMap<String, String>) -> Self {
        let mut mapping = ColumnMapping::new();
        for (field, column) in &map {
            mapping.insert(field, column);
        }
        mapping
    }
}

/// Resolve one row against a template.
pub fn reconcile(
    row: &Row,
    template: &TemplateDefinition,
    mapping: Option<&ColumnMapping>,
) -> ValueBag {
    let mut values = BTreeMap::new();

    match mapping {
        None => {
            for name in template.field_names() {
                if let Some(value) = row.get(name).and_then(|cell| cell.to_text()) {
                    values.insert(name.to_string(), value);
                }
            }
        }
        Some(mapping) => {
            // lowercase → header as written, built once per row
            let lookup: HashMap<String, &str> = row
                .keys()
                .map(|k| (k.to_lowercase(), k.as_str()))
                .collect();

            for name in template.field_names() {
                let Some(column) = mapping.column_for(name) else {
                    continue;
                };

                let cell = row.get(column).or_else(|| {
                    lookup
                        .get(&column.to_lowercase())
                        .and_then(|actual| row.get(*actual))
                });

                match cell.and_then(|c| c.to_text()) {
                    Some(value) => {
                        tracing::debug!(field = name, column, %value, "mapped field");
                        values.insert(name.to_string(), value);
                    }
                    None => {
                        tracing::debug!(field = name, column, "no value for mapped column");
                    }
                }
            }
        }
    }

    ValueBag(values)
}

/// Check that a header set contains a code column and a color column,
/// case-insensitively.
pub fn check_columns<'a, I>(columns: I) -> Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let lower: Vec<String> = columns.into_iter().map(str::to_lowercase).collect();
    let has = |name: &str| lower.iter().any(|c| c == name);

    let mut missing = Vec::new();
    if !has(CODE_COLUMN) {
        missing.push(CODE_COLUMN.to_string());
    }
    if !COLOR_COLUMNS.iter().any(|c| has(c)) {
        missing.push(COLOR_COLUMNS[0].to_string());
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(PeshiError::SchemaValidation { missing })
    }
}

/// Pre-flight validation of a whole dataset, using its first row's headers.
///
/// Returns the dataset's columns on success.
pub fn validate_columns(rows: &[Row]) -> Result<Vec<String>> {
    if rows.is_empty() {
        return Err(PeshiError::EmptyDataset);
    }
    let columns = rows::columns(rows);
    tracing::debug!(?columns, "validating dataset columns");
    check_columns(columns.iter().map(String::as_str))?;
    Ok(columns)
}
