//! # Batch Generation
//!
//! One immutable [`GenerationRequest`] in, one ordered [`GenerationResult`]
//! out. The pipeline is:
//!
//! ```text
//! resolve template ─▶ pre-flight column check ─▶ par_iter over rows
//!                                                  reconcile ─▶ render
//! ```
//!
//! Template resolution and the column check are batch-level and abort the
//! whole request before any row is rendered. Per-row resolution gaps never
//! fail: they surface as placeholders or missing text in that row's
//! artifact.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::error::Result;
use crate::layout::{self, RenderedArtifact, SizeClass};
use crate::reconcile::{self, ColumnMapping, ValueBag};
use crate::rows::Row;
use crate::template::{Size, TemplateCatalog, TemplateDefinition};

/// Sticker name used when the request doesn't supply one.
pub const DEFAULT_STICKER_NAME: &str = "sticker";
/// Stand-in for a code or color that no row value supplied.
pub const NOT_AVAILABLE: &str = "N/A";

/// Which template a batch renders with.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateSelector {
    /// Catalog identifier, case-insensitive.
    Preset(String),
    /// Inline user-authored template.
    Custom(TemplateDefinition),
}

/// Everything needed to render a batch.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub template: TemplateSelector,
    pub rows: Vec<Row>,
    /// Field → column mapping. An empty mapping counts as none.
    pub mapping: Option<ColumnMapping>,
    pub size: SizeClass,
    pub sticker_name: String,
}

impl GenerationRequest {
    pub fn new(template: TemplateSelector, rows: Vec<Row>) -> Self {
        Self {
            template,
            rows,
            mapping: None,
            size: SizeClass::default(),
            sticker_name: DEFAULT_STICKER_NAME.to_string(),
        }
    }

    pub fn with_mapping(mut self, mapping: ColumnMapping) -> Self {
        self.mapping = Some(mapping);
        self
    }

    pub fn with_size(mut self, size: SizeClass) -> Self {
        self.size = size;
        self
    }

    pub fn with_sticker_name(mut self, name: impl Into<String>) -> Self {
        self.sticker_name = name.into();
        self
    }
}

/// One rendered row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedSticker {
    pub id: String,
    /// Display name, e.g. "Sticker 3".
    pub name: String,
    pub code: String,
    pub color: String,
    /// Suggested file stem, safe for any filesystem.
    pub filename: String,
    pub size: Size,
    pub artifact: RenderedArtifact,
}

impl GeneratedSticker {
    pub fn html(&self) -> String {
        self.artifact.to_html()
    }
}

/// A rendered batch, in row order.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub template: TemplateDefinition,
    pub size: Size,
    pub size_class: SizeClass,
    pub stickers: Vec<GeneratedSticker>,
}

impl GenerationResult {
    pub fn len(&self) -> usize {
        self.stickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stickers.is_empty()
    }

    pub fn artifacts(&self) -> impl Iterator<Item = &RenderedArtifact> {
        self.stickers.iter().map(|s| &s.artifact)
    }
}

/// Resolve a selector to a template.
pub fn resolve_template<'a>(
    selector: &'a TemplateSelector,
    catalog: &'a TemplateCatalog,
) -> Result<Cow<'a, TemplateDefinition>> {
    match selector {
        TemplateSelector::Preset(id) => catalog.get(id).map(Cow::Borrowed),
        TemplateSelector::Custom(template) => Ok(Cow::Borrowed(template)),
    }
}

/// Render every row of a request.
pub fn generate(request: &GenerationRequest, catalog: &TemplateCatalog) -> Result<GenerationResult> {
    let template = resolve_template(&request.template, catalog)?;
    reconcile::validate_columns(&request.rows)?;

    let size = request.size.output_size(template.native_size);
    let mapping = request.mapping.as_ref().filter(|m| !m.is_empty());
    let sticker_name = match request.sticker_name.trim() {
        "" => DEFAULT_STICKER_NAME,
        name => name,
    };
    let key = template.id.as_str();

    tracing::info!(
        template = key,
        rows = request.rows.len(),
        size_class = %request.size,
        width = size.width,
        height = size.height,
        mapped = mapping.is_some(),
        "generating stickers"
    );

    let stickers: Vec<GeneratedSticker> = request
        .rows
        .par_iter()
        .enumerate()
        .map(|(i, row)| {
            let values = reconcile::reconcile(row, &template, mapping);
            let mut artifact = layout::render(&template, &values, size);
            artifact.size_class = Some(request.size);

            let code = resolved(&values, row, "code");
            let color = resolved(&values, row, "color");
            let filename = sanitize_filename(&format!(
                "{}_{}_{}_{}",
                sticker_name,
                key,
                i + 1,
                code.as_deref().unwrap_or("unknown")
            ));

            GeneratedSticker {
                id: format!("sticker_{}_{}", key, i),
                name: format!("Sticker {}", i + 1),
                code: code.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                color: color.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                filename,
                size,
                artifact,
            }
        })
        .collect();

    tracing::info!(count = stickers.len(), template = key, "generation complete");

    Ok(GenerationResult {
        template: template.into_owned(),
        size,
        size_class: request.size,
        stickers,
    })
}

/// Value of a logical field, then the raw row cell with the same name.
fn resolved(values: &ValueBag, row: &Row, name: &str) -> Option<String> {
    values
        .non_empty(name)
        .map(str::to_string)
        .or_else(|| row.get(name).and_then(|c| c.to_text()).filter(|s| !s.is_empty()))
}

/// Replace anything outside `[A-Za-z0-9._-]` with `_`.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    match cleaned.trim_start_matches('.') {
        "" => DEFAULT_STICKER_NAME.to_string(),
        s => s.to_string(),
    }
}
