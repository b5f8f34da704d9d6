//! Server state and configuration.

use std::path::PathBuf;
use std::time::Instant;

use crate::error::Result;
use crate::template::TemplateCatalog;

/// Default request body limit for uploads and generation requests.
pub const DEFAULT_UPLOAD_LIMIT: usize = 50 * 1024 * 1024;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:3000")
    pub listen_addr: String,
    /// Preset catalog to serve instead of the built-in one
    pub catalog_path: Option<PathBuf>,
    /// Maximum request body size in bytes
    pub upload_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3000".to_string(),
            catalog_path: None,
            upload_limit: DEFAULT_UPLOAD_LIMIT,
        }
    }
}

/// Application state shared across handlers.
pub struct AppState {
    pub config: ServerConfig,
    pub catalog: TemplateCatalog,
    pub started: Instant,
}

impl AppState {
    /// Build state, loading the configured catalog.
    pub fn new(config: ServerConfig) -> Result<Self> {
        let catalog = TemplateCatalog::load(config.catalog_path.as_deref())?;
        Ok(Self::with_catalog(config, catalog))
    }

    pub fn with_catalog(config: ServerConfig, catalog: TemplateCatalog) -> Self {
        Self {
            config,
            catalog,
            started: Instant::now(),
        }
    }
}
