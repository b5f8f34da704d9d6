//! HTTP handlers for the server.

pub mod health;
pub mod stickers;
pub mod templates;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::PeshiError;
use crate::raster::RasterError;

/// Handler error: a status code and a message, sent as
/// `{"success": false, "error": "..."}`.
#[derive(Debug)]
pub struct ApiError(pub StatusCode, pub String);

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(StatusCode::BAD_REQUEST, msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self(StatusCode::INTERNAL_SERVER_ERROR, msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let ApiError(status, message) = self;
        if status.is_server_error() {
            tracing::error!(%status, error = %message, "request failed");
        } else {
            tracing::debug!(%status, error = %message, "request rejected");
        }
        (status, Json(json!({ "success": false, "error": message }))).into_response()
    }
}

impl From<PeshiError> for ApiError {
    fn from(e: PeshiError) -> Self {
        let status = match &e {
            PeshiError::TemplateNotFound(_) => StatusCode::NOT_FOUND,
            PeshiError::Raster(inner) => return inner.into(),
            other if other.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self(status, e.to_string())
    }
}

impl From<&RasterError> for ApiError {
    fn from(e: &RasterError) -> Self {
        let status = match e {
            RasterError::Background(_) | RasterError::TooLarge { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self(status, e.to_string())
    }
}

impl From<RasterError> for ApiError {
    fn from(e: RasterError) -> Self {
        (&e).into()
    }
}

/// Join a blocking task, flattening panics into a 500.
pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::internal(format!("Task error: {}", e)))?
}
