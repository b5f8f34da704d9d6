//! Background image loading for custom templates.
//!
//! A background reference is either a `data:` URL with a base64 payload
//! (what the template editor produces) or, when the caller allows it, a path
//! on the local filesystem. The HTTP server never allows paths.
//! The decoded image is scaled to cover the canvas and center-cropped, like
//! CSS `background-size: cover; background-position: center`.

use base64::Engine;
use image::{RgbaImage, imageops::FilterType};

use super::RasterError;

/// Decode a background reference into an image.
pub fn load(reference: &str, allow_file_paths: bool) -> Result<RgbaImage, RasterError> {
    let reference = reference.trim();
    let bytes = if let Some(rest) = reference.strip_prefix("data:") {
        decode_data_url(rest)?
    } else if reference.starts_with("http://") || reference.starts_with("https://") {
        return Err(RasterError::Background(format!(
            "remote background images are not supported: {}",
            reference
        )));
    } else if !allow_file_paths {
        return Err(RasterError::Background(
            "background must be a base64 data URL".to_string(),
        ));
    } else {
        std::fs::read(reference).map_err(|e| {
            RasterError::Background(format!("cannot read '{}': {}", reference, e))
        })?
    };

    let img = image::load_from_memory(&bytes)
        .map_err(|e| RasterError::Background(format!("cannot decode image: {}", e)))?;
    Ok(img.to_rgba8())
}

/// Decode the part of a data URL after `data:`.
fn decode_data_url(rest: &str) -> Result<Vec<u8>, RasterError> {
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| RasterError::Background("malformed data URL".to_string()))?;
    if !meta.ends_with(";base64") {
        return Err(RasterError::Background(
            "only base64 data URLs are supported".to_string(),
        ));
    }
    let payload: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(payload.as_bytes())
        .map_err(|e| RasterError::Background(format!("invalid base64 payload: {}", e)))
}

/// Scale `img` to cover `width`×`height` and crop the center.
pub fn cover(img: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let (iw, ih) = img.dimensions();
    if iw == 0 || ih == 0 || width == 0 || height == 0 {
        return RgbaImage::new(width, height);
    }

    let scale = (width as f64 / iw as f64).max(height as f64 / ih as f64);
    let sw = ((iw as f64 * scale).ceil() as u32).max(width);
    let sh = ((ih as f64 * scale).ceil() as u32).max(height);
    let scaled = image::imageops::resize(img, sw, sh, FilterType::Triangle);

    let x = (sw - width) / 2;
    let y = (sh - height) / 2;
    image::imageops::crop_imm(&scaled, x, y, width, height).to_image()
}
