//! HTML preview fragments.
//!
//! Emits the same absolutely-positioned markup the web preview has always
//! used: a `sticker-container` div sized to the artifact, with one child per
//! primitive and the decoration layer around them.
//!
//! Text content and every interpolated value are escaped. Style values come
//! from template authors, so they are also stripped of characters that could
//! close the `style` attribute or start a new declaration.

use std::fmt::Write;

use super::{
    Decoration, INSET_OPACITY, Primitive, RectNode, RenderedArtifact, SizeClass, TextNode,
};

/// Escape text for use in HTML content or a quoted attribute.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Make a value safe to place inside a CSS declaration.
fn css_value(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .filter(|c| !matches!(c, ';' | '{' | '}' | '<' | '>' | '"' | '\\'))
        .collect();
    escape_html(cleaned.trim())
}

/// Format a pixel quantity without a trailing `.0`.
fn px(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}px", v as i64)
    } else {
        format!("{}px", v)
    }
}

impl RenderedArtifact {
    /// Render the artifact as an HTML fragment.
    pub fn to_html(&self) -> String {
        let size_class = self.size_class.unwrap_or(SizeClass::Medium);
        let mut html = String::new();

        let (container_style, header, border) = match &self.decoration {
            Decoration::Background { image } => (
                format!(
                    "position: relative; width: {}px; height: {}px; \
                     background-image: url('{}'); background-size: cover; \
                     background-position: center; background-repeat: no-repeat; \
                     overflow: hidden; box-shadow: 0 4px 8px rgba(0,0,0,0.1);",
                    self.size.width,
                    self.size.height,
                    css_url(image),
                ),
                String::new(),
                String::new(),
            ),
            Decoration::Preset {
                label,
                color,
                header_font_size,
                header_top,
                border_inset,
                border_width,
            } => {
                let color = css_value(color);
                let container = format!(
                    "position: relative; width: {}px; height: {}px; \
                     background: linear-gradient(135deg, #f8f9fa 0%, #e9ecef 100%); \
                     border: {}px solid {}; border-radius: 8px; overflow: hidden; \
                     box-shadow: 0 4px 8px rgba(0,0,0,0.1);",
                    self.size.width, self.size.height, border_width, color,
                );
                let header = format!(
                    "<div class=\"country-header\" style=\"position: absolute; top: {}px; \
                     left: 50%; transform: translateX(-50%); font-size: {}px; \
                     font-weight: bold; color: {}; text-transform: uppercase;\">{}</div>",
                    header_top,
                    header_font_size,
                    color,
                    escape_html(label),
                );
                let border = format!(
                    "<div class=\"sticker-border\" style=\"position: absolute; top: {inset}px; \
                     left: {inset}px; right: {inset}px; bottom: {inset}px; \
                     border: 1px dashed {color}; border-radius: 4px; opacity: {opacity};\"></div>",
                    inset = border_inset,
                    color = color,
                    opacity = INSET_OPACITY,
                );
                (container, header, border)
            }
        };

        let _ = write!(
            html,
            "<div class=\"sticker-container {} {}\" style=\"{}\">",
            escape_html(&self.template),
            size_class,
            container_style
        );
        html.push_str(&header);
        for primitive in &self.primitives {
            match primitive {
                Primitive::Rect(rect) => push_rect(&mut html, rect),
                Primitive::Text(text) => push_text(&mut html, text),
            }
        }
        html.push_str(&border);
        html.push_str("</div>");
        html
    }
}

/// Quote-safe image reference for `url('...')`.
fn css_url(image: &str) -> String {
    escape_html(&image.replace(['\'', '\\', '\n', '\r'], ""))
}

fn push_rect(html: &mut String, rect: &RectNode) {
    let _ = write!(
        html,
        "<div class=\"color-box\" style=\"position: absolute; left: {}px; top: {}px; \
         width: {}px; height: {}px; background-color: {}; border: 1px solid #000;\"></div>",
        rect.x,
        rect.y,
        rect.width,
        rect.height,
        css_value(&rect.fill),
    );
}

fn push_text(html: &mut String, text: &TextNode) {
    let s = &text.style;
    let _ = write!(
        html,
        "<div class=\"sticker-text\" style=\"position: absolute; left: {}px; top: {}px; \
         font-size: {}px; color: {} !important; font-family: {} !important; \
         font-weight: {} !important; font-style: {} !important; \
         text-decoration: {} !important; text-align: {} !important; \
         line-height: {} !important; letter-spacing: {} !important; \
         text-shadow: {} !important; white-space: nowrap !important; \
         z-index: 999 !important; display: block !important;\">{}</div>",
        text.x,
        text.y,
        text.font_size,
        css_value(&s.color),
        css_value(&s.font_family),
        css_value(&s.font_weight),
        css_value(&s.font_style),
        css_value(&s.text_decoration),
        s.align.as_str(),
        s.line_height,
        px(s.letter_spacing),
        css_value(&s.text_shadow),
        escape_html(&text.content),
    );
}
