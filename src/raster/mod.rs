//! # Artifact to PNG Rasterizer
//!
//! Draws a [`RenderedArtifact`] onto an RGBA canvas and encodes it as PNG.
//!
//! ## Architecture
//!
//! ```text
//! RenderedArtifact → PreviewRasterizer → RgbaImage → PNG bytes
//!                        ↓
//!                  1. Decoration background (gradient or cover image)
//!                  2. Outer border (preset decoration)
//!                  3. Header label
//!                  4. Primitives in order (swatches, text)
//!                  5. Dashed inset border
//! ```
//!
//! Every coordinate is multiplied by the pixel ratio, so a ratio of 2 gives
//! a 2× sharper image of the same layout.
//!
//! Text is drawn with Spleen bitmap glyphs, left-anchored at the node's
//! position. Text boxes shrink to fit their content, so alignment has no
//! visible effect here (it only matters for the HTML preview's box model).

mod background;
pub mod color;
pub mod font;

use image::{Rgba, RgbaImage};
use rayon::prelude::*;
use std::path::Path;
use thiserror::Error;

use crate::layout::{Decoration, INSET_OPACITY, Primitive, RectNode, RenderedArtifact, TextNode};
use color::{BLACK, lerp, parse_color, with_opacity};

/// Pixel ratio used for PNG export.
pub const DEFAULT_PIXEL_RATIO: u32 = 2;

/// Largest canvas side the rasterizer will allocate, in pixels.
pub const MAX_CANVAS_SIDE: u32 = 8192;

/// Tallest glyph cell drawn, in device pixels. Larger text is drawn at this size.
const MAX_TEXT_CELL: usize = 4 * MAX_CANVAS_SIDE as usize;

const GRADIENT_FROM: Rgba<u8> = Rgba([0xf8, 0xf9, 0xfa, 255]);
const GRADIENT_TO: Rgba<u8> = Rgba([0xe9, 0xec, 0xef, 255]);
const CORNER_RADIUS: u32 = 8;
const DASH: u32 = 3;

/// Errors that can occur while rasterizing.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("Background image error: {0}")]
    Background(String),

    #[error("Font error: {0}")]
    Font(String),

    #[error("Image encoding error: {0}")]
    Encode(String),

    #[error("Canvas too large: {width}x{height} (max side {max})")]
    TooLarge { width: u32, height: u32, max: u32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Turns an artifact into pixels.
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, artifact: &RenderedArtifact) -> Result<RgbaImage, RasterError>;
}

/// Built-in rasterizer with bitmap text.
///
/// Background images are only read from the local filesystem when
/// [`with_file_paths`](Self::with_file_paths) allows it. Otherwise only
/// `data:` URLs are accepted.
#[derive(Debug, Clone, Copy)]
pub struct PreviewRasterizer {
    pixel_ratio: u32,
    allow_file_paths: bool,
}

impl Default for PreviewRasterizer {
    fn default() -> Self {
        Self::new(DEFAULT_PIXEL_RATIO)
    }
}

impl PreviewRasterizer {
    /// The ratio is clamped to `1..=MAX_CANVAS_SIDE`.
    pub fn new(pixel_ratio: u32) -> Self {
        Self {
            pixel_ratio: pixel_ratio.clamp(1, MAX_CANVAS_SIDE),
            allow_file_paths: false,
        }
    }

    /// Allow background references that are local file paths.
    pub fn with_file_paths(mut self, allow: bool) -> Self {
        self.allow_file_paths = allow;
        self
    }

    pub fn pixel_ratio(&self) -> u32 {
        self.pixel_ratio
    }

    pub fn allows_file_paths(&self) -> bool {
        self.allow_file_paths
    }
}

impl Rasterizer for PreviewRasterizer {
    fn rasterize(&self, artifact: &RenderedArtifact) -> Result<RgbaImage, RasterError> {
        let r = self.pixel_ratio;
        let width = artifact.size.width.saturating_mul(r);
        let height = artifact.size.height.saturating_mul(r);
        if width > MAX_CANVAS_SIDE || height > MAX_CANVAS_SIDE {
            return Err(RasterError::TooLarge {
                width,
                height,
                max: MAX_CANVAS_SIDE,
            });
        }

        let mut canvas = Canvas::new(width, height, r as i64);
        match &artifact.decoration {
            Decoration::Background { image } => {
                let bg = background::load(image, self.allow_file_paths)?;
                canvas.img = background::cover(&bg, width, height);
                for p in &artifact.primitives {
                    canvas.draw_primitive(p)?;
                }
            }
            Decoration::Preset {
                label,
                color,
                header_font_size,
                header_top,
                border_inset,
                border_width,
            } => {
                let accent = parse_color(color).unwrap_or(BLACK);
                canvas.fill_gradient(GRADIENT_FROM, GRADIENT_TO);
                canvas.stroke_rect(
                    0,
                    0,
                    artifact.size.width as i64,
                    artifact.size.height as i64,
                    *border_width as i64,
                    accent,
                );

                let cell = text_cell(*header_font_size, r);
                let text_w = font::measure(label, cell, 0) as i64;
                let x = (width as i64 - text_w) / 2;
                let y = *header_top as i64 * r as i64;
                let ink = Ink {
                    color: accent,
                    bold: true,
                    shear: 0.0,
                };
                canvas.draw_line(label, cell, 0, x, y, ink)?;

                for p in &artifact.primitives {
                    canvas.draw_primitive(p)?;
                }

                let inset = *border_inset as i64;
                canvas.dashed_rect(
                    inset,
                    inset,
                    artifact.size.width as i64 - 2 * inset,
                    artifact.size.height as i64 - 2 * inset,
                    with_opacity(accent, INSET_OPACITY),
                );
                canvas.round_corners(CORNER_RADIUS * r);
            }
        }

        Ok(canvas.img)
    }
}

/// Encode an image as PNG bytes.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, RasterError> {
    use image::ImageEncoder;

    let mut png_bytes = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
    encoder
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e: image::ImageError| RasterError::Encode(e.to_string()))?;
    Ok(png_bytes)
}

/// Rasterize one artifact straight to PNG bytes.
pub fn render_png<R: Rasterizer + ?Sized>(
    rasterizer: &R,
    artifact: &RenderedArtifact,
) -> Result<Vec<u8>, RasterError> {
    encode_png(&rasterizer.rasterize(artifact)?)
}

/// Rasterize and write one artifact to `path`.
pub fn export_png<R: Rasterizer + ?Sized>(
    rasterizer: &R,
    artifact: &RenderedArtifact,
    path: &Path,
) -> Result<(), RasterError> {
    let bytes = render_png(rasterizer, artifact)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Rasterize a batch in parallel. One result per artifact, in input order.
pub fn export_batch<R: Rasterizer + ?Sized>(
    rasterizer: &R,
    artifacts: &[RenderedArtifact],
) -> Vec<Result<Vec<u8>, RasterError>> {
    artifacts
        .par_iter()
        .enumerate()
        .map(|(i, artifact)| {
            let result = render_png(rasterizer, artifact);
            if let Err(e) = &result {
                tracing::warn!(index = i, template = %artifact.template, error = %e, "export failed");
            }
            result
        })
        .collect()
}

// ============================================================================
// CANVAS
// ============================================================================

/// Device cell height for a CSS font size.
fn text_cell(font_size: u32, ratio: u32) -> usize {
    (font_size as usize)
        .saturating_mul(ratio as usize)
        .min(MAX_TEXT_CELL)
}

/// Extra columns bold adds to the right of each glyph pixel.
fn embolden(cell_height: usize, bold: bool) -> i64 {
    if bold {
        (cell_height as i64 / 16).max(1)
    } else {
        0
    }
}

/// How a text mask is composited.
#[derive(Debug, Clone, Copy)]
struct Ink {
    color: Rgba<u8>,
    bold: bool,
    /// Rightward slant per row going up (italic).
    shear: f64,
}

/// RGBA canvas addressed in CSS pixels, scaled by `ratio`.
struct Canvas {
    img: RgbaImage,
    ratio: i64,
}

impl Canvas {
    fn new(width: u32, height: u32, ratio: i64) -> Self {
        Self {
            img: RgbaImage::new(width, height),
            ratio,
        }
    }

    /// Source-over blend of one device pixel. Out-of-bounds is ignored.
    fn blend(&mut self, x: i64, y: i64, src: Rgba<u8>) {
        if x < 0 || y < 0 || x >= self.img.width() as i64 || y >= self.img.height() as i64 {
            return;
        }
        let sa = src[3] as f64 / 255.0;
        if sa <= 0.0 {
            return;
        }
        let dst = self.img.get_pixel_mut(x as u32, y as u32);
        let da = dst[3] as f64 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        for c in 0..3 {
            let v = (src[c] as f64 * sa + dst[c] as f64 * da * (1.0 - sa)) / out_a;
            dst[c] = v.round().clamp(0.0, 255.0) as u8;
        }
        dst[3] = (out_a * 255.0).round() as u8;
    }

    /// Fill a rectangle given in device pixels.
    fn fill_device(&mut self, x: i64, y: i64, w: i64, h: i64, color: Rgba<u8>) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = x.saturating_add(w).min(self.img.width() as i64);
        let y1 = y.saturating_add(h).min(self.img.height() as i64);
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend(px, py, color);
            }
        }
    }

    /// Fill a rectangle given in CSS pixels.
    fn fill_rect(&mut self, x: i64, y: i64, w: i64, h: i64, color: Rgba<u8>) {
        let r = self.ratio;
        self.fill_device(x * r, y * r, w * r, h * r, color);
    }

    /// Solid border of `width` CSS pixels drawn inside the rectangle.
    fn stroke_rect(&mut self, x: i64, y: i64, w: i64, h: i64, width: i64, color: Rgba<u8>) {
        if w <= 0 || h <= 0 || width <= 0 {
            return;
        }
        let bw = width.min(w / 2 + 1).min(h / 2 + 1);
        self.fill_rect(x, y, w, bw, color);
        self.fill_rect(x, y + h - bw, w, bw, color);
        self.fill_rect(x, y + bw, bw, h - 2 * bw, color);
        self.fill_rect(x + w - bw, y + bw, bw, h - 2 * bw, color);
    }

    /// 1 CSS pixel dashed outline.
    fn dashed_rect(&mut self, x: i64, y: i64, w: i64, h: i64, color: Rgba<u8>) {
        if w <= 0 || h <= 0 {
            return;
        }
        let dash = DASH as i64;
        let mut i = 0;
        while i < w {
            let len = dash.min(w - i);
            self.fill_rect(x + i, y, len, 1, color);
            self.fill_rect(x + i, y + h - 1, len, 1, color);
            i += 2 * dash;
        }
        let mut j = 0;
        while j < h {
            let len = dash.min(h - j);
            self.fill_rect(x, y + j, 1, len, color);
            self.fill_rect(x + w - 1, y + j, 1, len, color);
            j += 2 * dash;
        }
    }

    /// 135° linear gradient over the whole canvas.
    fn fill_gradient(&mut self, from: Rgba<u8>, to: Rgba<u8>) {
        let (w, h) = self.img.dimensions();
        let span = (w + h).saturating_sub(2).max(1) as f64;
        for (x, y, px) in self.img.enumerate_pixels_mut() {
            *px = lerp(from, to, (x + y) as f64 / span);
        }
    }

    /// Clear pixels outside rounded corners.
    fn round_corners(&mut self, radius: u32) {
        let (w, h) = self.img.dimensions();
        let r = radius.min(w / 2).min(h / 2);
        if r == 0 {
            return;
        }
        let rf = r as f64;
        for y in 0..r {
            for x in 0..r {
                let dx = rf - x as f64 - 0.5;
                let dy = rf - y as f64 - 0.5;
                if dx * dx + dy * dy > rf * rf {
                    for (px, py) in [(x, y), (w - 1 - x, y), (x, h - 1 - y), (w - 1 - x, h - 1 - y)] {
                        self.img.put_pixel(px, py, color::TRANSPARENT);
                    }
                }
            }
        }
    }

    /// Rasterize the part of a text line that can reach the canvas and
    /// composite it with its top-left corner at device position `(x, y)`.
    fn draw_line(
        &mut self,
        text: &str,
        cell: usize,
        spacing: i32,
        x: i64,
        y: i64,
        ink: Ink,
    ) -> Result<(), RasterError> {
        let (w, h) = (self.img.width() as i64, self.img.height() as i64);
        // A source column lands up to `reach` pixels to its right
        let reach = (cell as f64 * ink.shear).ceil() as i64 + embolden(cell, ink.bold);

        let col_start = x.saturating_neg().saturating_sub(reach).max(0);
        let col_end = w.saturating_sub(x).max(0);
        let row_start = y.saturating_neg().max(0);
        let row_end = h.saturating_sub(y).max(0);
        if col_start >= col_end || row_start >= row_end {
            return Ok(());
        }

        let mask = font::render_window(
            text,
            cell,
            spacing,
            col_start as usize..col_end as usize,
            row_start as usize..row_end as usize,
        )?;
        self.blit_mask(&mask, x, y, ink);
        Ok(())
    }

    /// Composite a text mask whose full line starts at device `(x, y)`.
    fn blit_mask(&mut self, mask: &font::TextMask, x: i64, y: i64, ink: Ink) {
        let embolden = embolden(mask.cell_height, ink.bold);
        let (width, height) = (self.img.width() as i64, self.img.height() as i64);
        let (ox, oy) = (mask.origin.0 as i64, mask.origin.1 as i64);
        for my in 0..mask.height {
            let line_y = oy + my as i64;
            let py = y.saturating_add(line_y);
            if py < 0 || py >= height {
                continue;
            }
            let offset = ((mask.cell_height as i64 - line_y) as f64 * ink.shear).round() as i64;

            // Bold widens each pixel to the right; overlapping runs blend once
            let mut covered = i64::MIN;
            for mx in 0..mask.width {
                if !mask.get(mx, my) {
                    continue;
                }
                let px = x.saturating_add(ox + mx as i64 + offset);
                let start = px.max(covered).max(0);
                let end = px.saturating_add(embolden + 1).min(width);
                for cx in start..end {
                    self.blend(cx, py, ink.color);
                }
                covered = covered.max(end);
            }
        }
    }

    fn draw_primitive(&mut self, primitive: &Primitive) -> Result<(), RasterError> {
        match primitive {
            Primitive::Rect(rect) => {
                self.draw_swatch(rect);
                Ok(())
            }
            Primitive::Text(text) => self.draw_text(text),
        }
    }

    /// Swatch with a 1px black border around its content box.
    fn draw_swatch(&mut self, rect: &RectNode) {
        let (x, y) = (rect.x as i64, rect.y as i64);
        let (w, h) = (rect.width.max(0) as i64, rect.height.max(0) as i64);
        if let Some(fill) = parse_color(&rect.fill) {
            self.fill_rect(x + 1, y + 1, w, h, fill);
        }
        self.stroke_rect(x, y, w + 2, h + 2, 1, BLACK);
    }

    fn draw_text(&mut self, node: &TextNode) -> Result<(), RasterError> {
        let style = &node.style;
        let r = self.ratio;
        let cell = text_cell(node.font_size, r as u32);
        if cell == 0 {
            return Ok(());
        }

        let spacing = (style.letter_spacing * r as f64).round() as i32;

        // Half-leading: glyphs sit centered in the line box
        let line_box = (cell as f64 * style.line_height.max(0.0)).round() as i64;
        let x = node.x as i64 * r;
        let y = (node.y as i64 * r).saturating_add((line_box - cell as i64) / 2);

        let ink = Ink {
            color: parse_color(&style.color).unwrap_or(BLACK),
            bold: style.is_bold(),
            shear: if style.is_italic() { 0.2 } else { 0.0 },
        };

        if let Some((dx, dy, shadow)) = parse_text_shadow(&style.text_shadow) {
            let sx = x.saturating_add(dx.saturating_mul(r));
            let sy = y.saturating_add(dy.saturating_mul(r));
            self.draw_line(&node.content, cell, spacing, sx, sy, Ink { color: shadow, ..ink })?;
        }
        self.draw_line(&node.content, cell, spacing, x, y, ink)?;

        let cell = cell as i64;
        let line_width = font::measure(&node.content, cell as usize, spacing) as i64;
        let thickness = (cell / 14).max(1);
        let decoration = style.text_decoration.to_lowercase();
        if decoration.contains("underline") {
            self.fill_device(x, y.saturating_add(cell * 9 / 10), line_width, thickness, ink.color);
        }
        if decoration.contains("line-through") {
            self.fill_device(x, y.saturating_add(cell / 2), line_width, thickness, ink.color);
        }
        if decoration.contains("overline") {
            self.fill_device(x, y, line_width, thickness, ink.color);
        }
        Ok(())
    }
}

/// Parse `<dx>px <dy>px [blur] <color>` into an offset and color.
/// Only the first shadow of a list is used; blur is ignored.
fn parse_text_shadow(s: &str) -> Option<(i64, i64, Rgba<u8>)> {
    let first = s.split(',').next()?.trim();
    if first.is_empty() || first.eq_ignore_ascii_case("none") {
        return None;
    }

    let mut lengths = Vec::new();
    let mut color = None;
    for token in first.split_whitespace() {
        let number = token.trim_end_matches("px");
        match number.parse::<f64>() {
            Ok(v) => lengths.push(v.round() as i64),
            Err(_) => color = parse_color(token),
        }
    }

    match lengths.as_slice() {
        [dx, dy, ..] => Some((*dx, *dy, color.unwrap_or(with_opacity(BLACK, 0.5)))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{self, SizeClass};
    use crate::reconcile::ValueBag;
    use crate::template::{
        ColorField, FieldSpec, Size, TemplateCatalog, TemplateDefinition, TextField,
    };
    use std::time::{Duration, Instant};

    fn usa_artifact(size: SizeClass) -> RenderedArtifact {
        let catalog = TemplateCatalog::built_in().unwrap();
        let usa = catalog.get("usa").unwrap();
        let values: ValueBag = [("code", "ABC001"), ("color", "#FF0000"), ("title", "Red")]
            .into_iter()
            .collect();
        layout::render(usa, &values, size.output_size(usa.native_size))
    }

    #[test]
    fn test_canvas_matches_size_and_ratio() {
        let artifact = usa_artifact(SizeClass::Small);
        let img = PreviewRasterizer::new(2).rasterize(&artifact).unwrap();
        assert_eq!(img.dimensions(), (420, 280));

        let img = PreviewRasterizer::new(0).rasterize(&artifact).unwrap();
        assert_eq!(img.dimensions(), (210, 140));
    }

    #[test]
    fn test_swatch_is_filled() {
        let artifact = usa_artifact(SizeClass::Medium);
        let rect = artifact.rects().next().unwrap().clone();
        let img = PreviewRasterizer::new(1).rasterize(&artifact).unwrap();

        let cx = (rect.x + 1 + rect.width / 2) as u32;
        let cy = (rect.y + 1 + rect.height / 2) as u32;
        assert_eq!(img.get_pixel(cx, cy), &Rgba([255, 0, 0, 255]));
        // border pixel
        assert_eq!(img.get_pixel(rect.x as u32, cy), &BLACK);
    }

    #[test]
    fn test_preset_outer_border_uses_accent() {
        let artifact = usa_artifact(SizeClass::Medium);
        let img = PreviewRasterizer::new(1).rasterize(&artifact).unwrap();
        assert_eq!(img.get_pixel(150, 1), &Rgba([0x00, 0x52, 0xCC, 255]));
        // rounded corner is cleared
        assert_eq!(img.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn test_placeholder_swatch() {
        let t = TemplateDefinition::new(
            "Swatch",
            Size::new(100, 100),
            vec![FieldSpec::Color(ColorField {
                name: "tint".into(),
                x: 10.0,
                y: 10.0,
                ..Default::default()
            })],
            None,
        )
        .unwrap();
        let artifact = layout::render(&t, &ValueBag::new(), t.native_size);
        let img = PreviewRasterizer::new(1).rasterize(&artifact).unwrap();
        assert_eq!(img.get_pixel(30, 25), &Rgba([0xCC, 0xCC, 0xCC, 255]));
    }

    #[test]
    fn test_too_large_is_rejected() {
        let t = TemplateDefinition::new("Huge", Size::new(5000, 10), vec![], None).unwrap();
        let artifact = layout::render(&t, &ValueBag::new(), t.native_size);
        assert!(matches!(
            PreviewRasterizer::new(2).rasterize(&artifact),
            Err(RasterError::TooLarge { .. })
        ));
    }

    fn title_artifact(font_size: f64, content: &str) -> RenderedArtifact {
        let t = TemplateDefinition::new(
            "Title",
            Size::new(100, 100),
            vec![FieldSpec::Text(TextField {
                name: "title".into(),
                x: 10.0,
                y: 10.0,
                font_size: Some(font_size),
                ..Default::default()
            })],
            None,
        )
        .unwrap();
        let values: ValueBag = [("title", content)].into_iter().collect();
        layout::render(&t, &values, t.native_size)
    }

    #[test]
    fn test_huge_font_only_rasterizes_visible_pixels() {
        let artifact = title_artifact(4000.0, "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789");
        let started = Instant::now();
        let img = PreviewRasterizer::new(2).rasterize(&artifact).unwrap();
        assert_eq!(img.dimensions(), (200, 200));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_extreme_text_geometry() {
        let mut artifact = title_artifact(14.0, "Overflow");
        for p in &mut artifact.primitives {
            if let Primitive::Text(t) = p {
                t.x = i32::MIN;
                t.y = i32::MAX;
                t.font_size = u32::MAX;
                t.style.font_weight = "bold".into();
                t.style.font_style = "italic".into();
                t.style.text_decoration = "underline line-through overline".into();
                t.style.letter_spacing = -1e12;
                t.style.line_height = 1e300;
                t.style.text_shadow = "99999999999999px -99999999999999px red".into();
            }
        }
        let img = PreviewRasterizer::new(3).rasterize(&artifact).unwrap();
        assert_eq!(img.dimensions(), (300, 300));
    }

    #[test]
    fn test_huge_header_font_size() {
        let mut artifact = usa_artifact(SizeClass::Small);
        if let Decoration::Preset {
            header_font_size, ..
        } = &mut artifact.decoration
        {
            *header_font_size = u32::MAX;
        }

        assert!(matches!(
            PreviewRasterizer::new(u32::MAX).rasterize(&artifact),
            Err(RasterError::TooLarge { .. })
        ));

        let started = Instant::now();
        let img = PreviewRasterizer::new(4).rasterize(&artifact).unwrap();
        assert_eq!(img.dimensions(), (840, 560));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_pixel_ratio_is_clamped() {
        assert_eq!(PreviewRasterizer::new(0).pixel_ratio(), 1);
        assert_eq!(PreviewRasterizer::new(u32::MAX).pixel_ratio(), MAX_CANVAS_SIDE);
        assert!(!PreviewRasterizer::default().allows_file_paths());
        assert!(PreviewRasterizer::default().with_file_paths(true).allows_file_paths());
    }

    #[test]
    fn test_file_background_refused_by_default() {
        let t = TemplateDefinition::new(
            "Photo",
            Size::new(20, 20),
            vec![],
            Some("/etc/peshi/background.png".into()),
        )
        .unwrap();
        let artifact = layout::render(&t, &ValueBag::new(), t.native_size);
        match PreviewRasterizer::new(1).rasterize(&artifact) {
            Err(RasterError::Background(msg)) => assert!(msg.contains("data URL")),
            other => panic!("expected background error, got {:?}", other.map(|i| i.dimensions())),
        }
    }

    #[test]
    fn test_encode_png_signature() {
        let artifact = usa_artifact(SizeClass::Small);
        let bytes = render_png(&PreviewRasterizer::default(), &artifact).unwrap();
        assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn test_batch_isolates_failures() {
        let good = usa_artifact(SizeClass::Small);
        let bad_template = TemplateDefinition::new(
            "Broken",
            Size::new(50, 50),
            vec![],
            Some("data:image/png;base64,notanimage".into()),
        )
        .unwrap();
        let bad = layout::render(&bad_template, &ValueBag::new(), bad_template.native_size);

        let results = export_batch(&PreviewRasterizer::new(1), &[good.clone(), bad, good]);
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(RasterError::Background(_))));
        assert!(results[2].is_ok());
    }

    #[test]
    fn test_text_shadow_parsing() {
        assert_eq!(
            parse_text_shadow("2px 3px 4px #FF0000"),
            Some((2, 3, Rgba([255, 0, 0, 255])))
        );
        assert_eq!(parse_text_shadow("1px 1px"), Some((1, 1, Rgba([0, 0, 0, 128]))));
        assert_eq!(parse_text_shadow("none"), None);
        assert_eq!(parse_text_shadow(""), None);
    }
}
