//! # Layout / Render Engine
//!
//! Resolves a template plus one row's [`ValueBag`] into a [`RenderedArtifact`]:
//! a list of positioned, sized and styled primitives at a requested output
//! size, plus a decoration layer.
//!
//! ## Scaling Model
//!
//! ```text
//! scale_x = output.width  / native.width
//! scale_y = output.height / native.height
//!
//! position   x' = round(x * scale_x)          y' = round(y * scale_y)
//! swatch     w' = round((w ?? 50) * scale_x)  h' = round((h ?? 30) * scale_y)
//! font size  f' = round((f ?? 14) * min(scale_x, scale_y))
//! ```
//!
//! Axes scale independently, so a stretched output stretches the layout too.
//! Font sizes use the smaller factor so text never outgrows its axis.
//! Rounding is half away from zero (`f64::round`) everywhere.
//!
//! ## Example
//!
//! ```
//! use peshi::layout::{self, SizeClass};
//! use peshi::reconcile::ValueBag;
//! use peshi::template::TemplateCatalog;
//!
//! let catalog = TemplateCatalog::built_in().unwrap();
//! let usa = catalog.get("usa").unwrap();
//! let values: ValueBag = [("code", "ABC001"), ("color", "#FF0000")].into_iter().collect();
//!
//! let size = SizeClass::Small.output_size(usa.native_size);
//! let artifact = layout::render(usa, &values, size);
//! assert_eq!((artifact.size.width, artifact.size.height), (210, 140));
//! ```

pub mod html;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::reconcile::ValueBag;
use crate::template::{Alignment, ColorField, FieldSpec, Size, TemplateDefinition, TextField};

/// Font size for text fields that don't declare one.
pub const DEFAULT_FONT_SIZE: f64 = 14.0;
/// Swatch dimensions for color fields that don't declare them.
pub const DEFAULT_SWATCH_WIDTH: f64 = 50.0;
pub const DEFAULT_SWATCH_HEIGHT: f64 = 30.0;
/// Fill for swatches with no resolvable color.
pub const PLACEHOLDER_COLOR: &str = "#CCCCCC";
/// Value consulted when a swatch's own field is empty.
pub const FALLBACK_COLOR_FIELD: &str = "color";

/// Native font size of the preset header label.
pub const HEADER_FONT_SIZE: f64 = 16.0;
/// Header distance from the top edge, in output pixels.
pub const HEADER_TOP: i32 = 10;
/// Dashed inner border inset, in output pixels.
pub const BORDER_INSET: i32 = 5;
/// Solid outer border width, in output pixels.
pub const BORDER_WIDTH: u32 = 3;
/// Opacity of the dashed inner border.
pub const INSET_OPACITY: f64 = 0.3;

/// Text style defaults.
pub const DEFAULT_TEXT_COLOR: &str = "#000000";
pub const DEFAULT_FONT_FAMILY: &str = "Arial, sans-serif";
pub const DEFAULT_FONT_WEIGHT: &str = "normal";
pub const DEFAULT_FONT_STYLE: &str = "normal";
pub const DEFAULT_TEXT_DECORATION: &str = "none";
pub const DEFAULT_LINE_HEIGHT: f64 = 1.2;
pub const DEFAULT_LETTER_SPACING: f64 = 0.0;
pub const DEFAULT_TEXT_SHADOW: &str = "none";

/// Accent color of a preset template's decoration.
///
/// Expects the lowercase catalog identifier; matching is exact, so `"USA"`
/// is unknown. Unknown identifiers (including custom templates) are black.
pub fn accent_color(template_id: &str) -> &'static str {
    match template_id {
        "usa" => "#0052CC",
        "uk" => "#000080",
        "canada" => "#FF0000",
        "australia" => "#0066CC",
        "germany" => "#000000",
        "france" => "#0055AA",
        "japan" => "#CC0000",
        "india" => "#FF6600",
        _ => "#000000",
    }
}

// ============================================================================
// OUTPUT SIZE
// ============================================================================

/// Named output sizes, relative to a template's native size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeClass {
    Small,
    #[default]
    Medium,
    Large,
}

impl SizeClass {
    pub const ALL: [SizeClass; 3] = [SizeClass::Small, SizeClass::Medium, SizeClass::Large];

    pub fn factor(self) -> f64 {
        match self {
            SizeClass::Small => 0.7,
            SizeClass::Medium => 1.0,
            SizeClass::Large => 1.3,
        }
    }

    /// Output size for a template's native size.
    pub fn output_size(self, native: Size) -> Size {
        match self {
            SizeClass::Medium => native,
            other => native.scaled(other.factor()),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SizeClass::Small => "small",
            SizeClass::Medium => "medium",
            SizeClass::Large => "large",
        }
    }

    /// Lenient parse: anything other than small/large is medium.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SizeClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "small" => Ok(SizeClass::Small),
            "medium" => Ok(SizeClass::Medium),
            "large" => Ok(SizeClass::Large),
            other => Err(format!(
                "Unknown size '{}'. Use 'small', 'medium' or 'large'",
                other
            )),
        }
    }
}

impl<'de> Deserialize<'de> for SizeClass {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(SizeClass::parse_lenient(&s))
    }
}

/// Per-axis scale factors from native to output space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub x: f64,
    pub y: f64,
}

impl Scale {
    pub fn between(native: Size, output: Size) -> Self {
        Self {
            x: output.width as f64 / native.width as f64,
            y: output.height as f64 / native.height as f64,
        }
    }

    /// Factor applied to font sizes: the smaller of the two axes.
    #[inline]
    pub fn uniform(&self) -> f64 {
        self.x.min(self.y)
    }

    #[inline]
    pub fn scale_x(&self, v: f64) -> i32 {
        (v * self.x).round() as i32
    }

    #[inline]
    pub fn scale_y(&self, v: f64) -> i32 {
        (v * self.y).round() as i32
    }

    #[inline]
    pub fn scale_font(&self, size: f64) -> u32 {
        (size * self.uniform()).round().max(0.0) as u32
    }
}

// ============================================================================
// ARTIFACT
// ============================================================================

/// Fully resolved text styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub color: String,
    pub font_family: String,
    pub font_weight: String,
    pub font_style: String,
    pub text_decoration: String,
    pub align: Alignment,
    pub line_height: f64,
    /// In pixels, unscaled.
    pub letter_spacing: f64,
    pub text_shadow: String,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            color: DEFAULT_TEXT_COLOR.to_string(),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_weight: DEFAULT_FONT_WEIGHT.to_string(),
            font_style: DEFAULT_FONT_STYLE.to_string(),
            text_decoration: DEFAULT_TEXT_DECORATION.to_string(),
            align: Alignment::Left,
            line_height: DEFAULT_LINE_HEIGHT,
            letter_spacing: DEFAULT_LETTER_SPACING,
            text_shadow: DEFAULT_TEXT_SHADOW.to_string(),
        }
    }
}

/// Non-empty string or the fallback.
fn or_default(value: &Option<String>, fallback: &str) -> String {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => fallback.to_string(),
    }
}

impl TextStyle {
    fn resolve(field: &TextField) -> Self {
        Self {
            color: or_default(&field.color, DEFAULT_TEXT_COLOR),
            font_family: or_default(&field.font_family, DEFAULT_FONT_FAMILY),
            font_weight: or_default(&field.font_weight, DEFAULT_FONT_WEIGHT),
            font_style: or_default(&field.font_style, DEFAULT_FONT_STYLE),
            text_decoration: or_default(&field.text_decoration, DEFAULT_TEXT_DECORATION),
            align: field.align.unwrap_or_default(),
            line_height: field.line_height.unwrap_or(DEFAULT_LINE_HEIGHT),
            letter_spacing: field.letter_spacing.unwrap_or(DEFAULT_LETTER_SPACING),
            text_shadow: or_default(&field.text_shadow, DEFAULT_TEXT_SHADOW),
        }
    }

    /// Whether the weight reads as bold (`bold`, `bolder`, or 600+).
    pub fn is_bold(&self) -> bool {
        let w = self.font_weight.trim().to_lowercase();
        w == "bold" || w == "bolder" || w.parse::<u32>().is_ok_and(|n| n >= 600)
    }

    pub fn is_italic(&self) -> bool {
        let s = self.font_style.to_lowercase();
        s.contains("italic") || s.contains("oblique")
    }
}

/// A positioned run of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    /// Field this node was produced from.
    pub field: String,
    pub content: String,
    pub x: i32,
    pub y: i32,
    pub font_size: u32,
    pub style: TextStyle,
}

/// A filled rectangle (color swatch).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectNode {
    pub field: String,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub fill: String,
    /// True when no value resolved and the fill is [`PLACEHOLDER_COLOR`].
    pub placeholder: bool,
}

/// One visual element of a sticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Primitive {
    Text(TextNode),
    Rect(RectNode),
}

impl Primitive {
    pub fn field(&self) -> &str {
        match self {
            Primitive::Text(t) => &t.field,
            Primitive::Rect(r) => &r.field,
        }
    }
}

/// Background layer of a sticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Decoration {
    /// Full-bleed background image (custom templates).
    Background { image: String },
    /// Generated header label and borders (preset templates).
    Preset {
        /// Uppercased template identifier.
        label: String,
        color: String,
        header_font_size: u32,
        header_top: i32,
        border_inset: i32,
        border_width: u32,
    },
}

/// The fully resolved visual description of one sticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedArtifact {
    /// Identifier of the template it was rendered from.
    pub template: String,
    pub size: Size,
    /// Named size class, when the size came from one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_class: Option<SizeClass>,
    pub decoration: Decoration,
    pub primitives: Vec<Primitive>,
}

impl RenderedArtifact {
    pub fn texts(&self) -> impl Iterator<Item = &TextNode> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Text(t) => Some(t),
            _ => None,
        })
    }

    pub fn rects(&self) -> impl Iterator<Item = &RectNode> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Rect(r) => Some(r),
            _ => None,
        })
    }

    /// Primitive produced from a given field, if any.
    pub fn primitive(&self, field: &str) -> Option<&Primitive> {
        self.primitives.iter().find(|p| p.field() == field)
    }
}

// ============================================================================
// RENDER
// ============================================================================

/// Render one row's values onto a template at `output` size.
///
/// Pure: identical inputs always give identical artifacts.
pub fn render(template: &TemplateDefinition, values: &ValueBag, output: Size) -> RenderedArtifact {
    let scale = Scale::between(template.native_size, output);
    tracing::debug!(
        template = %template.id,
        scale_x = scale.x,
        scale_y = scale.y,
        "rendering sticker"
    );

    let primitives = template
        .fields
        .iter()
        .filter_map(|field| match field {
            FieldSpec::Color(c) => Some(Primitive::Rect(render_swatch(c, values, &scale))),
            FieldSpec::Text(t) => render_text(t, values, &scale).map(Primitive::Text),
        })
        .collect();

    RenderedArtifact {
        template: template.id.clone(),
        size: output,
        size_class: None,
        decoration: decoration(template, &scale),
        primitives,
    }
}

fn render_swatch(field: &ColorField, values: &ValueBag, scale: &Scale) -> RectNode {
    let resolved = values
        .non_empty(&field.name)
        .or_else(|| values.non_empty(FALLBACK_COLOR_FIELD));

    let rect = RectNode {
        field: field.name.clone(),
        x: scale.scale_x(field.x),
        y: scale.scale_y(field.y),
        width: scale.scale_x(field.width.unwrap_or(DEFAULT_SWATCH_WIDTH)),
        height: scale.scale_y(field.height.unwrap_or(DEFAULT_SWATCH_HEIGHT)),
        fill: resolved.unwrap_or(PLACEHOLDER_COLOR).to_string(),
        placeholder: resolved.is_none(),
    };
    tracing::debug!(
        field = %rect.field,
        x = rect.x,
        y = rect.y,
        width = rect.width,
        height = rect.height,
        fill = %rect.fill,
        "color block"
    );
    rect
}

fn render_text(field: &TextField, values: &ValueBag, scale: &Scale) -> Option<TextNode> {
    let content = values.non_empty(&field.name)?;
    let node = TextNode {
        field: field.name.clone(),
        content: content.to_string(),
        x: scale.scale_x(field.x),
        y: scale.scale_y(field.y),
        font_size: scale.scale_font(field.font_size.unwrap_or(DEFAULT_FONT_SIZE)),
        style: TextStyle::resolve(field),
    };
    tracing::debug!(
        field = %node.field,
        x = node.x,
        y = node.y,
        font_size = node.font_size,
        "text element"
    );
    Some(node)
}

fn decoration(template: &TemplateDefinition, scale: &Scale) -> Decoration {
    match &template.background_image {
        Some(image) => Decoration::Background {
            image: image.clone(),
        },
        None => Decoration::Preset {
            label: template.id.to_uppercase(),
            color: accent_color(&template.id).to_string(),
            header_font_size: scale.scale_font(HEADER_FONT_SIZE),
            header_top: HEADER_TOP,
            border_inset: BORDER_INSET,
            border_width: BORDER_WIDTH,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{CUSTOM_TEMPLATE_ID, TemplateCatalog};
    use pretty_assertions::assert_eq;

    fn square_template() -> TemplateDefinition {
        TemplateDefinition::new(
            "Square",
            Size::new(100, 100),
            vec![
                FieldSpec::Color(ColorField {
                    name: "swatch".into(),
                    x: 10.0,
                    y: 10.0,
                    width: Some(20.0),
                    height: Some(20.0),
                }),
                FieldSpec::Text(TextField {
                    name: "code".into(),
                    x: 30.0,
                    y: 40.0,
                    font_size: Some(14.0),
                    ..Default::default()
                }),
            ],
            None,
        )
        .unwrap()
    }

    fn values(pairs: &[(&str, &str)]) -> ValueBag {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_identity_scale() {
        let t = square_template();
        let artifact = render(&t, &values(&[("code", "A1")]), t.native_size);

        let rect = artifact.rects().next().unwrap();
        assert_eq!((rect.x, rect.y, rect.width, rect.height), (10, 10, 20, 20));
        let text = artifact.texts().next().unwrap();
        assert_eq!((text.x, text.y, text.font_size), (30, 40, 14));
    }

    #[test]
    fn test_anisotropic_scale() {
        let t = square_template();
        let artifact = render(&t, &values(&[("code", "A1")]), Size::new(200, 100));

        let rect = artifact.rects().next().unwrap();
        assert_eq!((rect.x, rect.y), (20, 10));
        assert_eq!((rect.width, rect.height), (40, 20));
    }

    #[test]
    fn test_font_uses_smaller_axis() {
        let t = square_template();
        let artifact = render(&t, &values(&[("code", "A1")]), Size::new(200, 100));
        let text = artifact.texts().next().unwrap();
        assert_eq!(text.font_size, 14);
        assert_eq!((text.x, text.y), (60, 40));
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        let scale = Scale { x: 0.5, y: 0.5 };
        assert_eq!(scale.scale_x(5.0), 3);
        assert_eq!(scale.scale_x(-5.0), -3);
        assert_eq!(scale.scale_font(21.0), 11);
    }

    #[test]
    fn test_empty_text_suppressed() {
        let t = square_template();
        let artifact = render(&t, &values(&[("code", "")]), t.native_size);
        assert_eq!(artifact.texts().count(), 0);

        let artifact = render(&t, &ValueBag::new(), t.native_size);
        assert_eq!(artifact.texts().count(), 0);
        // the swatch is still drawn
        assert_eq!(artifact.primitives.len(), 1);
    }

    #[test]
    fn test_swatch_fallback_chain() {
        let t = square_template();

        let own = render(&t, &values(&[("swatch", "#112233"), ("color", "#445566")]), t.native_size);
        assert_eq!(own.rects().next().unwrap().fill, "#112233");

        let shared = render(&t, &values(&[("swatch", ""), ("color", "#445566")]), t.native_size);
        assert_eq!(shared.rects().next().unwrap().fill, "#445566");

        let none = render(&t, &ValueBag::new(), t.native_size);
        let rect = none.rects().next().unwrap();
        assert_eq!(rect.fill, PLACEHOLDER_COLOR);
        assert!(rect.placeholder);
    }

    #[test]
    fn test_default_swatch_size_and_font() {
        let t = TemplateDefinition::new(
            "Defaults",
            Size::new(100, 100),
            vec![
                FieldSpec::Color(ColorField {
                    name: "color".into(),
                    ..Default::default()
                }),
                FieldSpec::Text(TextField {
                    name: "title".into(),
                    ..Default::default()
                }),
            ],
            None,
        )
        .unwrap();
        let artifact = render(&t, &values(&[("title", "Hi")]), Size::new(200, 200));

        let rect = artifact.rects().next().unwrap();
        assert_eq!((rect.width, rect.height), (100, 60));
        let text = artifact.texts().next().unwrap();
        assert_eq!(text.font_size, 28);
        assert_eq!(text.style, TextStyle::default());
    }

    #[test]
    fn test_text_style_passthrough() {
        let t = TemplateDefinition::new(
            "Styled",
            Size::new(100, 100),
            vec![FieldSpec::Text(TextField {
                name: "title".into(),
                color: Some("#123456".into()),
                font_weight: Some("700".into()),
                font_style: Some("italic".into()),
                align: Some(Alignment::Right),
                letter_spacing: Some(2.0),
                ..Default::default()
            })],
            None,
        )
        .unwrap();
        let artifact = render(&t, &values(&[("title", "Hi")]), t.native_size);
        let style = &artifact.texts().next().unwrap().style;
        assert_eq!(style.color, "#123456");
        assert!(style.is_bold());
        assert!(style.is_italic());
        assert_eq!(style.align, Alignment::Right);
        assert_eq!(style.letter_spacing, 2.0);
        assert_eq!(style.font_family, DEFAULT_FONT_FAMILY);
    }

    #[test]
    fn test_preset_decoration() {
        let catalog = TemplateCatalog::built_in().unwrap();
        let usa = catalog.get("usa").unwrap();
        let artifact = render(usa, &ValueBag::new(), SizeClass::Large.output_size(usa.native_size));

        assert_eq!(artifact.size, Size::new(390, 260));
        assert_eq!(
            artifact.decoration,
            Decoration::Preset {
                label: "USA".into(),
                color: "#0052CC".into(),
                header_font_size: 21,
                header_top: HEADER_TOP,
                border_inset: BORDER_INSET,
                border_width: BORDER_WIDTH,
            }
        );
    }

    #[test]
    fn test_background_replaces_decoration() {
        let t = TemplateDefinition::new(
            "Custom",
            Size::new(100, 100),
            vec![],
            Some("data:image/png;base64,AAAA".into()),
        )
        .unwrap();
        let artifact = render(&t, &ValueBag::new(), t.native_size);
        assert_eq!(
            artifact.decoration,
            Decoration::Background {
                image: "data:image/png;base64,AAAA".into()
            }
        );
    }

    #[test]
    fn test_custom_without_background_is_black() {
        let t = square_template();
        let artifact = render(&t, &ValueBag::new(), t.native_size);
        match artifact.decoration {
            Decoration::Preset { label, color, .. } => {
                assert_eq!(label, CUSTOM_TEMPLATE_ID.to_uppercase());
                assert_eq!(color, "#000000");
            }
            other => panic!("expected preset decoration, got {:?}", other),
        }
    }

    #[test]
    fn test_size_classes() {
        let native = Size::new(300, 200);
        assert_eq!(SizeClass::Small.output_size(native), Size::new(210, 140));
        assert_eq!(SizeClass::Medium.output_size(native), native);
        assert_eq!(SizeClass::Large.output_size(native), Size::new(390, 260));
    }

    #[test]
    fn test_size_class_parsing() {
        assert_eq!("LARGE".parse::<SizeClass>(), Ok(SizeClass::Large));
        assert!("huge".parse::<SizeClass>().is_err());
        assert_eq!(SizeClass::parse_lenient("huge"), SizeClass::Medium);
        let parsed: SizeClass = serde_json::from_str(r#""small""#).unwrap();
        assert_eq!(parsed, SizeClass::Small);
    }

    #[test]
    fn test_negative_positions_pass_through() {
        let t = TemplateDefinition::new(
            "Offset",
            Size::new(100, 100),
            vec![FieldSpec::Color(ColorField {
                name: "color".into(),
                x: -10.0,
                y: 150.0,
                ..Default::default()
            })],
            None,
        )
        .unwrap();
        let artifact = render(&t, &ValueBag::new(), Size::new(50, 50));
        let rect = artifact.rects().next().unwrap();
        assert_eq!((rect.x, rect.y), (-5, 75));
    }

    #[test]
    fn test_render_is_deterministic() {
        let t = square_template();
        let v = values(&[("code", "A1"), ("swatch", "#FF0000")]);
        let a = render(&t, &v, Size::new(173, 91));
        let b = render(&t, &v, Size::new(173, 91));
        assert_eq!(a, b);
        assert_eq!(a.to_html(), b.to_html());
    }

    #[test]
    fn test_accent_table_uses_lowercase_ids() {
        assert_eq!(accent_color("usa"), "#0052CC");
        assert_eq!(accent_color("india"), "#FF6600");
        assert_eq!(accent_color("USA"), "#000000");
        assert_eq!(accent_color("custom"), "#000000");
    }
}
