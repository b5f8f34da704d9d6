//! # Template Definitions
//!
//! A template describes a sticker layout in its own *native* coordinate
//! space: a canvas size plus a list of fields placed on it.
//!
//! ## Wire Format
//!
//! Templates are authored as JSON, either in the preset catalog
//! (`templates/presets.json`) or by the custom template editor:
//!
//! ```json
//! {
//!   "name": "USA Standard",
//!   "size": {"width": 300, "height": 200},
//!   "positions": [
//!     {"name": "code", "x": 60, "y": 110, "fontSize": 22, "color": "#0052CC"},
//!     {"name": "color", "type": "color", "x": 200, "y": 105, "width": 45, "height": 25}
//!   ]
//! }
//! ```
//!
//! A position with `"type": "color"` is a color swatch; anything else is a
//! text slot. The distinction is resolved once, when the template is loaded,
//! into the [`FieldSpec`] enum.
//!
//! ## Invariants
//!
//! - Native width and height are both non-zero.
//! - Field names are lowercase and unique within a template.
//!
//! Both are checked on deserialization and by [`TemplateDefinition::new`].

pub mod catalog;

pub use catalog::TemplateCatalog;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{PeshiError, Result};

/// Default native size for custom templates that don't declare one.
pub const DEFAULT_CUSTOM_SIZE: Size = Size {
    width: 300,
    height: 200,
};

/// Display name used for templates supplied without one.
pub const CUSTOM_TEMPLATE_NAME: &str = "Custom Template";

/// Identifier carried by every template that doesn't come from the catalog.
pub const CUSTOM_TEMPLATE_ID: &str = "custom";

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Multiply both dimensions by `factor`, rounding each independently.
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            width: (self.width as f64 * factor).round() as u32,
            height: (self.height as f64 * factor).round() as u32,
        }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    /// Parse an alignment keyword. Unknown values fall back to left.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "center" | "centre" => Alignment::Center,
            "right" => Alignment::Right,
            _ => Alignment::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }
}

/// A text slot. Every style attribute is optional; the renderer applies
/// defaults for anything unset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextField {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub font_size: Option<f64>,
    pub color: Option<String>,
    pub align: Option<Alignment>,
    pub font_family: Option<String>,
    pub font_weight: Option<String>,
    pub font_style: Option<String>,
    pub text_decoration: Option<String>,
    /// Extra spacing between characters, in pixels.
    pub letter_spacing: Option<f64>,
    /// Line height as a multiple of the font size.
    pub line_height: Option<f64>,
    pub text_shadow: Option<String>,
}

/// A color swatch slot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColorField {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

/// One placeholder in a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawField", into = "RawField")]
pub enum FieldSpec {
    Text(TextField),
    Color(ColorField),
}

impl FieldSpec {
    pub fn name(&self) -> &str {
        match self {
            FieldSpec::Text(t) => &t.name,
            FieldSpec::Color(c) => &c.name,
        }
    }

    /// Position in native coordinates.
    pub fn position(&self) -> (f64, f64) {
        match self {
            FieldSpec::Text(t) => (t.x, t.y),
            FieldSpec::Color(c) => (c.x, c.y),
        }
    }

    pub fn is_color(&self) -> bool {
        matches!(self, FieldSpec::Color(_))
    }
}

/// A complete sticker layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTemplate", into = "RawTemplate")]
pub struct TemplateDefinition {
    /// Catalog identifier (e.g. "usa"), or [`CUSTOM_TEMPLATE_ID`].
    /// Assigned by the catalog, never read from the wire.
    pub id: String,
    /// Display label (e.g. "USA Standard").
    pub name: String,
    /// Coordinate space all field positions are authored in.
    pub native_size: Size,
    pub fields: Vec<FieldSpec>,
    /// Opaque reference to a background image (data URL or file path).
    pub background_image: Option<String>,
}

impl TemplateDefinition {
    /// Build a template, checking its invariants.
    pub fn new(
        name: impl Into<String>,
        native_size: Size,
        fields: Vec<FieldSpec>,
        background_image: Option<String>,
    ) -> Result<Self> {
        let template = Self {
            id: CUSTOM_TEMPLATE_ID.to_string(),
            name: name.into(),
            native_size,
            fields,
            background_image,
        };
        template.validate().map_err(PeshiError::InvalidTemplate)?;
        Ok(template)
    }

    /// Replace the identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Whether this template is a user-supplied one rather than a preset.
    pub fn is_custom(&self) -> bool {
        self.id == CUSTOM_TEMPLATE_ID
    }

    /// Check size and field-name invariants.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.native_size.is_empty() {
            return Err(format!(
                "native size must be non-zero, got {}x{}",
                self.native_size.width, self.native_size.height
            ));
        }
        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.name().is_empty() {
                return Err("field name cannot be empty".to_string());
            }
            if !seen.insert(field.name()) {
                return Err(format!("duplicate field name '{}'", field.name()));
            }
        }
        Ok(())
    }

    /// Look up a field by logical name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Logical names of all fields, in template order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(FieldSpec::name)
    }
}

// ============================================================================
// WIRE FORMAT
// ============================================================================

/// CSS-ish numeric value: accepts `2`, `2.5`, `"2px"` or `"1.2"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum CssNumber {
    Number(f64),
    Text(String),
}

/// Custom deserializer for optional CSS numbers. Unparseable strings are
/// treated as unset so the renderer default applies.
fn deserialize_css_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<CssNumber> = Option::deserialize(deserializer)?;
    Ok(match opt {
        None => None,
        Some(CssNumber::Number(n)) => Some(n),
        Some(CssNumber::Text(s)) => s.trim().trim_end_matches("px").trim().parse().ok(),
    })
}

fn is_color_kind(kind: Option<&str>) -> bool {
    kind.is_some_and(|k| k.eq_ignore_ascii_case("color"))
}

/// Duck-typed field as it appears in JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawField {
    name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    x: f64,
    y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    align: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    font_weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    font_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text_decoration: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_css_number",
        skip_serializing_if = "Option::is_none"
    )]
    letter_spacing: Option<f64>,
    #[serde(
        default,
        deserialize_with = "deserialize_css_number",
        skip_serializing_if = "Option::is_none"
    )]
    line_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text_shadow: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    height: Option<f64>,
}

impl TryFrom<RawField> for FieldSpec {
    type Error = String;

    fn try_from(raw: RawField) -> std::result::Result<Self, Self::Error> {
        let name = raw.name.trim().to_lowercase();
        if name.is_empty() {
            return Err("field name cannot be empty".to_string());
        }

        if is_color_kind(raw.kind.as_deref()) {
            return Ok(FieldSpec::Color(ColorField {
                name,
                x: raw.x,
                y: raw.y,
                width: raw.width,
                height: raw.height,
            }));
        }

        Ok(FieldSpec::Text(TextField {
            name,
            x: raw.x,
            y: raw.y,
            font_size: raw.font_size,
            color: raw.color,
            align: raw.align.as_deref().map(Alignment::parse),
            font_family: raw.font_family,
            font_weight: raw.font_weight,
            font_style: raw.font_style,
            text_decoration: raw.text_decoration,
            letter_spacing: raw.letter_spacing,
            line_height: raw.line_height,
            text_shadow: raw.text_shadow,
        }))
    }
}

impl From<FieldSpec> for RawField {
    fn from(field: FieldSpec) -> Self {
        match field {
            FieldSpec::Text(t) => RawField {
                name: t.name,
                kind: None,
                x: t.x,
                y: t.y,
                font_size: t.font_size,
                color: t.color,
                align: t.align.map(|a| a.as_str().to_string()),
                font_family: t.font_family,
                font_weight: t.font_weight,
                font_style: t.font_style,
                text_decoration: t.text_decoration,
                letter_spacing: t.letter_spacing,
                line_height: t.line_height,
                text_shadow: t.text_shadow,
                width: None,
                height: None,
            },
            FieldSpec::Color(c) => RawField {
                name: c.name,
                kind: Some("color".to_string()),
                x: c.x,
                y: c.y,
                font_size: None,
                color: None,
                align: None,
                font_family: None,
                font_weight: None,
                font_style: None,
                text_decoration: None,
                letter_spacing: None,
                line_height: None,
                text_shadow: None,
                width: c.width,
                height: c.height,
            },
        }
    }
}

fn default_template_name() -> String {
    CUSTOM_TEMPLATE_NAME.to_string()
}

fn default_native_size() -> Size {
    DEFAULT_CUSTOM_SIZE
}

/// Template as it appears in JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawTemplate {
    #[serde(default = "default_template_name")]
    name: String,
    #[serde(default = "default_native_size")]
    size: Size,
    positions: Vec<FieldSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image: Option<String>,
}

impl TryFrom<RawTemplate> for TemplateDefinition {
    type Error = String;

    fn try_from(raw: RawTemplate) -> std::result::Result<Self, Self::Error> {
        let template = TemplateDefinition {
            id: CUSTOM_TEMPLATE_ID.to_string(),
            name: raw.name,
            native_size: raw.size,
            fields: raw.positions,
            background_image: raw.image.filter(|s| !s.trim().is_empty()),
        };
        template.validate()?;
        Ok(template)
    }
}

impl From<TemplateDefinition> for RawTemplate {
    fn from(t: TemplateDefinition) -> Self {
        RawTemplate {
            name: t.name,
            size: t.native_size,
            positions: t.fields,
            image: t.background_image,
        }
    }
}
