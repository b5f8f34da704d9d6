//! Bitmap text using the Spleen PSF2 fonts.
//!
//! A line of text is rasterized into a [`TextMask`] (one bool per pixel) at
//! the requested cell height. The source face is the Spleen size closest to
//! the target, scaled with nearest neighbor. Styling (color, bold, italic,
//! decorations, shadow) is applied by the caller when compositing the mask.

use spleen_font::{FONT_6X12, FONT_8X16, FONT_12X24, PSF2Font};
use std::ops::Range;

use super::RasterError;

/// Spleen faces available to the rasterizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Face {
    Small,
    Medium,
    Large,
}

impl Face {
    /// Closest face for a target cell height.
    fn for_height(px: usize) -> Self {
        match px {
            0..=13 => Face::Small,
            14..=19 => Face::Medium,
            _ => Face::Large,
        }
    }

    fn dims(self) -> (usize, usize) {
        match self {
            Face::Small => (6, 12),
            Face::Medium => (8, 16),
            Face::Large => (12, 24),
        }
    }

    fn data(self) -> &'static [u8] {
        match self {
            Face::Small => FONT_6X12,
            Face::Medium => FONT_8X16,
            Face::Large => FONT_12X24,
        }
    }
}

/// A monochrome coverage bitmap covering part of a rendered line.
///
/// `origin` is the offset of the mask's top-left pixel within the full line
/// and `cell_height` the height of that line.
#[derive(Debug, Clone, PartialEq)]
pub struct TextMask {
    pub width: usize,
    pub height: usize,
    pub origin: (usize, usize),
    pub cell_height: usize,
    bits: Vec<bool>,
}

impl TextMask {
    fn new(width: usize, height: usize, origin: (usize, usize), cell_height: usize) -> Self {
        Self {
            width,
            height,
            origin,
            cell_height,
            bits: vec![false; width * height],
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.bits[y * self.width + x]
    }

    #[inline]
    fn set(&mut self, x: usize, y: usize) {
        if x < self.width && y < self.height {
            self.bits[y * self.width + x] = true;
        }
    }

    /// Number of set pixels.
    pub fn coverage(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }
}

/// Width of one character cell at a given height.
pub fn cell_width(cell_height: usize) -> usize {
    let (w, h) = Face::for_height(cell_height).dims();
    ((cell_height * w) as f64 / h as f64).round().max(1.0) as usize
}

/// Horizontal distance between consecutive characters.
fn advance(cell_height: usize, letter_spacing: i32) -> usize {
    (cell_width(cell_height) as i64 + letter_spacing as i64).max(1) as usize
}

/// Pixel width of a line of text.
pub fn measure(text: &str, cell_height: usize, letter_spacing: i32) -> usize {
    let n = text.chars().count();
    if n == 0 {
        return 0;
    }
    advance(cell_height, letter_spacing) * (n - 1) + cell_width(cell_height)
}

/// Rasterize one line of text at `cell_height` pixels.
pub fn render_line(
    text: &str,
    cell_height: usize,
    letter_spacing: i32,
) -> Result<TextMask, RasterError> {
    let width = measure(text, cell_height, letter_spacing);
    render_window(text, cell_height, letter_spacing, 0..width, 0..cell_height)
}

/// Rasterize only the `columns` × `rows` window of a line.
///
/// Glyphs outside the window are never scaled, so the cost is bounded by
/// the window size rather than the full line.
pub fn render_window(
    text: &str,
    cell_height: usize,
    letter_spacing: i32,
    columns: Range<usize>,
    rows: Range<usize>,
) -> Result<TextMask, RasterError> {
    let face = Face::for_height(cell_height);
    let (src_w, src_h) = face.dims();
    let mut font = PSF2Font::new(face.data())
        .map_err(|_| RasterError::Font(format!("cannot load {}x{} face", src_w, src_h)))?;

    let full_width = measure(text, cell_height, letter_spacing);
    let columns = columns.start.min(full_width)..columns.end.min(full_width);
    let rows = rows.start.min(cell_height)..rows.end.min(cell_height);
    let mut mask = TextMask::new(
        columns.len(),
        rows.len(),
        (columns.start, rows.start),
        cell_height,
    );
    if mask.width == 0 || mask.height == 0 {
        return Ok(mask);
    }

    let cell_w = cell_width(cell_height);
    let step = advance(cell_height, letter_spacing);
    let first = columns.start.saturating_sub(cell_w) / step;

    for (i, ch) in text.chars().enumerate().skip(first) {
        let x0 = i * step;
        if x0 >= columns.end {
            break;
        }
        if x0 + cell_w <= columns.start {
            continue;
        }

        let mut src = vec![false; src_w * src_h];
        let utf8 = ch.to_string();
        if let Some(glyph) = font.glyph_for_utf8(utf8.as_bytes()) {
            for (row_y, row) in glyph.enumerate() {
                for (col_x, on) in row.enumerate() {
                    if on && row_y < src_h && col_x < src_w {
                        src[row_y * src_w + col_x] = true;
                    }
                }
            }
        } else if !ch.is_whitespace() {
            draw_box(&mut src, src_w, src_h);
        } else {
            continue;
        }

        let dx_start = columns.start.saturating_sub(x0);
        let dx_end = (columns.end - x0).min(cell_w);
        for dy in rows.clone() {
            let sy = dy * src_h / cell_height;
            for dx in dx_start..dx_end {
                let sx = dx * src_w / cell_w;
                if src[sy * src_w + sx] {
                    mask.set(x0 + dx - columns.start, dy - rows.start);
                }
            }
        }
    }

    Ok(mask)
}

/// Box outline for characters the font doesn't cover.
fn draw_box(glyph: &mut [bool], width: usize, height: usize) {
    for x in 1..width - 1 {
        glyph[2 * width + x] = true;
        glyph[(height - 3) * width + x] = true;
    }
    for y in 2..height - 2 {
        glyph[y * width + 1] = true;
        glyph[y * width + width - 2] = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_selection() {
        assert_eq!(Face::for_height(10), Face::Small);
        assert_eq!(Face::for_height(16), Face::Medium);
        assert_eq!(Face::for_height(48), Face::Large);
    }

    #[test]
    fn test_measure() {
        assert_eq!(cell_width(24), 12);
        assert_eq!(measure("", 24, 0), 0);
        assert_eq!(measure("AB", 24, 0), 24);
        assert_eq!(measure("AB", 24, 4), 28);
        // spacing never collapses characters onto each other
        assert_eq!(measure("AB", 24, -50), 13);
    }

    #[test]
    fn test_render_line_has_ink() {
        let mask = render_line("ABC001", 28, 0).unwrap();
        assert_eq!(mask.height, 28);
        assert_eq!(mask.width, measure("ABC001", 28, 0));
        assert!(mask.coverage() > 0);
    }

    #[test]
    fn test_window_matches_full_line() {
        let full = render_line("ABC001", 28, 2).unwrap();
        let window = render_window("ABC001", 28, 2, 20..60, 5..20).unwrap();
        assert_eq!((window.width, window.height), (40, 15));
        assert_eq!(window.origin, (20, 5));
        assert_eq!(window.cell_height, 28);
        for y in 0..window.height {
            for x in 0..window.width {
                assert_eq!(window.get(x, y), full.get(x + 20, y + 5));
            }
        }
    }

    #[test]
    fn test_window_is_clamped_to_line() {
        let mask = render_window("AB", 4000, 0, 0..300, 0..200).unwrap();
        assert_eq!((mask.width, mask.height), (300, 200));

        let past_end = render_window("AB", 24, 0, 1000..2000, 0..24).unwrap();
        assert_eq!(past_end.width, 0);
        assert_eq!(past_end.coverage(), 0);
    }

    #[test]
    fn test_space_is_blank() {
        let mask = render_line(" ", 24, 0).unwrap();
        assert_eq!(mask.coverage(), 0);
    }
}
