//! # Preset Template Catalog
//!
//! Built-in country templates, loaded from a single JSON configuration file
//! (`templates/presets.json`). The file is embedded at compile time and can
//! be replaced at runtime with [`TemplateCatalog::from_path`].
//!
//! ## Usage
//!
//! ```
//! use peshi::template::TemplateCatalog;
//!
//! let catalog = TemplateCatalog::built_in().unwrap();
//! let usa = catalog.get("USA").unwrap();
//! assert_eq!(usa.native_size.width, 300);
//! ```

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use super::TemplateDefinition;
use crate::error::{PeshiError, Result};

/// Embedded preset catalog.
const BUILT_IN_CATALOG: &str = include_str!("../../templates/presets.json");

/// Catalog file layout.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    version: u32,
    templates: BTreeMap<String, TemplateDefinition>,
}

/// Identifier → template lookup table.
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    version: u32,
    templates: BTreeMap<String, TemplateDefinition>,
}

impl TemplateCatalog {
    /// The catalog compiled into the binary.
    pub fn built_in() -> Result<Self> {
        Self::from_json(BUILT_IN_CATALOG)
    }

    /// Parse a catalog from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(json)
            .map_err(|e| PeshiError::InvalidTemplate(format!("malformed catalog: {}", e)))?;

        let templates = file
            .templates
            .into_iter()
            .map(|(id, template)| {
                let id = id.trim().to_lowercase();
                (id.clone(), template.with_id(id))
            })
            .collect::<BTreeMap<_, _>>();

        if templates.is_empty() {
            return Err(PeshiError::InvalidTemplate(
                "catalog contains no templates".to_string(),
            ));
        }

        tracing::debug!(
            version = file.version,
            count = templates.len(),
            "loaded template catalog"
        );

        Ok(Self {
            version: file.version,
            templates,
        })
    }

    /// Load a catalog from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }

    /// Load from `path` if given, otherwise use the built-in catalog.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_path(p),
            None => Self::built_in(),
        }
    }

    /// Look up a preset by identifier (case insensitive).
    pub fn get(&self, id: &str) -> Result<&TemplateDefinition> {
        self.templates
            .get(&id.trim().to_lowercase())
            .ok_or_else(|| PeshiError::TemplateNotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.templates.contains_key(&id.trim().to_lowercase())
    }

    /// All identifiers, sorted.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// All `(identifier, template)` pairs, sorted by identifier.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TemplateDefinition)> {
        self.templates.iter().map(|(id, t)| (id.as_str(), t))
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
