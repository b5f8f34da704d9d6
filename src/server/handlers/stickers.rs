//! Row upload, batch generation and PNG rendering handlers.

use axum::{
    Json,
    extract::{Multipart, State},
    http::header,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::generate::{self, GeneratedSticker, GenerationRequest, TemplateSelector};
use crate::layout::{RenderedArtifact, SizeClass};
use crate::raster::{self, DEFAULT_PIXEL_RATIO, PreviewRasterizer};
use crate::reconcile::{self, ColumnMapping};
use crate::rows::{self, Row};
use crate::template::{Size, TemplateDefinition};

use super::super::state::AppState;
use super::{ApiError, run_blocking};

/// Multipart field carrying the row file.
pub const ROWS_FIELD: &str = "rows";

/// Response from the row upload endpoint.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub data: Vec<Row>,
    pub columns: Vec<String>,
    pub count: usize,
}

/// POST /api/upload-rows - Parse an uploaded CSV (or JSON) sheet.
pub async fn upload_rows(mut multipart: Multipart) -> Result<Json<UploadResponse>, ApiError> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Multipart error: {}", e)))?
    {
        if field.name() == Some(ROWS_FIELD) {
            let filename = field.file_name().unwrap_or("rows.csv").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;
            upload = Some((filename, bytes.to_vec()));
            break;
        }
    }

    let (filename, bytes) = upload.ok_or_else(|| ApiError::bad_request("No file uploaded"))?;
    tracing::info!(%filename, bytes = bytes.len(), "row upload");

    let data = if filename.to_lowercase().ends_with(".json") {
        let text = String::from_utf8(bytes)
            .map_err(|_| ApiError::bad_request("Upload is not valid UTF-8"))?;
        rows::from_json_str(&text)?
    } else {
        rows::from_csv_reader(bytes.as_slice())?
    };
    let columns = reconcile::validate_columns(&data)?;

    Ok(Json(UploadResponse {
        success: true,
        count: data.len(),
        data,
        columns,
    }))
}

/// Request body for batch generation, in the shape the web client sends.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBody {
    #[serde(default)]
    pub country: Option<String>,
    pub data: Vec<Row>,
    #[serde(default)]
    pub sticker_name: Option<String>,
    #[serde(default)]
    pub sticker_size: Option<SizeClass>,
    #[serde(default)]
    pub custom_template: Option<serde_json::Value>,
    #[serde(default)]
    pub column_mapping: Option<ColumnMapping>,
}

impl GenerateBody {
    /// A custom template is used only when it carries positions.
    fn into_request(self) -> Result<GenerationRequest, ApiError> {
        let custom = self
            .custom_template
            .filter(|v| v.get("positions").is_some_and(|p| !p.is_null()));

        let selector = match (custom, self.country) {
            (Some(value), _) => {
                let template: TemplateDefinition = serde_json::from_value(value)
                    .map_err(|e| ApiError::bad_request(format!("Invalid custom template: {}", e)))?;
                TemplateSelector::Custom(template)
            }
            (None, Some(country)) if !country.trim().is_empty() => TemplateSelector::Preset(country),
            (None, _) => {
                return Err(ApiError::bad_request(
                    "Either a country or a custom template is required",
                ));
            }
        };

        let mut request = GenerationRequest::new(selector, self.data)
            .with_size(self.sticker_size.unwrap_or_default());
        if let Some(name) = self.sticker_name {
            request = request.with_sticker_name(name);
        }
        if let Some(mapping) = self.column_mapping {
            request = request.with_mapping(mapping);
        }
        Ok(request)
    }
}

/// One sticker in the generation response.
#[derive(Debug, Serialize)]
pub struct StickerView {
    #[serde(flatten)]
    pub sticker: GeneratedSticker,
    pub html: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub batch_id: Uuid,
    pub generated_at: String,
    pub count: usize,
    pub size: Size,
    pub size_class: SizeClass,
    pub stickers: Vec<StickerView>,
    pub template: TemplateDefinition,
}

/// POST /api/generate-stickers - Render one sticker per row.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GenerateBody>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let request = body.into_request()?;

    let response = run_blocking(move || {
        let result = generate::generate(&request, &state.catalog)?;
        let stickers = result
            .stickers
            .into_iter()
            .map(|sticker| StickerView {
                html: sticker.html(),
                sticker,
            })
            .collect::<Vec<_>>();

        Ok(GenerateResponse {
            success: true,
            batch_id: Uuid::new_v4(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            count: stickers.len(),
            size: result.size,
            size_class: result.size_class,
            stickers,
            template: result.template,
        })
    })
    .await?;

    Ok(Json(response))
}

/// Request body for PNG rendering.
#[derive(Debug, Deserialize)]
pub struct RenderPngBody {
    pub artifact: RenderedArtifact,
    #[serde(default)]
    pub pixel_ratio: Option<u32>,
}

/// POST /api/render/png - Rasterize one artifact.
///
/// Backgrounds must be `data:` URLs; server-side file paths are refused.
pub async fn render_png(Json(body): Json<RenderPngBody>) -> Result<impl IntoResponse, ApiError> {
    let ratio = body.pixel_ratio.unwrap_or(DEFAULT_PIXEL_RATIO);
    let png_bytes = run_blocking(move || {
        let rasterizer = PreviewRasterizer::new(ratio);
        Ok(raster::render_png(&rasterizer, &body.artifact)?)
    })
    .await?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png_bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_body_prefers_custom_template() {
        let body: GenerateBody = serde_json::from_value(json!({
            "country": "usa",
            "data": [],
            "customTemplate": {
                "positions": [{"name": "code", "x": 1, "y": 2}],
                "image": "data:image/png;base64,AAAA"
            },
            "columnMapping": {"code": "SKU"}
        }))
        .unwrap();
        let request = body.into_request().unwrap();
        match request.template {
            TemplateSelector::Custom(t) => assert_eq!(t.native_size, Size::new(300, 200)),
            other => panic!("expected custom template, got {:?}", other),
        }
        assert!(request.mapping.is_some());
    }

    #[test]
    fn test_body_without_positions_uses_country() {
        let body: GenerateBody = serde_json::from_value(json!({
            "country": "japan",
            "data": [],
            "stickerSize": "large",
            "stickerName": "shelf",
            "customTemplate": {"image": "x"}
        }))
        .unwrap();
        let request = body.into_request().unwrap();
        assert_eq!(request.template, TemplateSelector::Preset("japan".into()));
        assert_eq!(request.size, SizeClass::Large);
        assert_eq!(request.sticker_name, "shelf");
    }

    #[test]
    fn test_body_needs_a_template() {
        let body: GenerateBody = serde_json::from_value(json!({"data": []})).unwrap();
        assert!(body.into_request().is_err());
    }
}
