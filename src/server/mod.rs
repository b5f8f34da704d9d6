//! # HTTP Server for Sticker Generation
//!
//! JSON API used by the web front end: list templates, upload a sheet of
//! rows, generate a batch of stickers, and rasterize a sticker to PNG.
//!
//! ## Usage
//!
//! ```bash
//! peshi serve --listen 0.0.0.0:3000
//! ```
//!
//! ## Routes
//!
//! | Method | Path                      | Purpose                          |
//! |--------|---------------------------|----------------------------------|
//! | GET    | `/api/health`             | Liveness and uptime              |
//! | GET    | `/api/templates`          | Preset summaries                 |
//! | GET    | `/api/template/:id`       | One preset definition            |
//! | POST   | `/api/upload-rows`        | Multipart CSV/JSON row upload    |
//! | POST   | `/api/generate-stickers`  | Render a batch                   |
//! | POST   | `/api/render/png`         | Rasterize one artifact           |

mod handlers;
mod state;

pub use state::{AppState, DEFAULT_UPLOAD_LIMIT, ServerConfig};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::error::{PeshiError, Result};

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let limit = state.config.upload_limit;

    Router::new()
        .route("/api/health", get(handlers::health::health))
        .route("/api/templates", get(handlers::templates::list))
        .route("/api/template/:id", get(handlers::templates::get))
        .route("/api/upload-rows", post(handlers::stickers::upload_rows))
        .route(
            "/api/generate-stickers",
            post(handlers::stickers::generate),
        )
        .route("/api/render/png", post(handlers::stickers::render_png))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(limit)),
        )
        .with_state(state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use peshi::server::{serve, ServerConfig};
///
/// # async fn example() -> Result<(), peshi::PeshiError> {
/// let config = ServerConfig {
///     listen_addr: "127.0.0.1:3000".to_string(),
///     ..Default::default()
/// };
///
/// serve(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig) -> Result<()> {
    let state = Arc::new(AppState::new(config.clone())?);
    let app = router(state.clone());

    tracing::info!(
        listen = %config.listen_addr,
        templates = state.catalog.len(),
        catalog_version = state.catalog.version(),
        "peshi HTTP server starting"
    );

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| {
            PeshiError::Server(format!("Failed to bind to {}: {}", config.listen_addr, e))
        })?;

    axum::serve(listener, app)
        .await
        .map_err(|e| PeshiError::Server(format!("Server error: {}", e)))?;

    Ok(())
}
