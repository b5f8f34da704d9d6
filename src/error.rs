//! # Error Types
//!
//! This module defines error types used throughout the peshi library.
//!
//! Only batch-level problems are errors. A field whose value cannot be
//! resolved for a given row is not an error: the renderer falls back to a
//! placeholder swatch or drops the text node.

use thiserror::Error;

/// Result type alias using [`PeshiError`].
pub type Result<T> = std::result::Result<T, PeshiError>;

/// Main error type for peshi operations
#[derive(Debug, Error)]
pub enum PeshiError {
    /// The dataset's header row lacks required columns. Aborts the whole batch.
    #[error("Dataset must contain \"Code\" and \"Color\" columns (missing: {})", .missing.join(", "))]
    SchemaValidation { missing: Vec<String> },

    /// The dataset has no rows at all.
    #[error("Dataset is empty")]
    EmptyDataset,

    /// Unknown preset template identifier.
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    /// Template definition violates an invariant (size, duplicate names, ...).
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    /// Row source could not be read or interpreted.
    #[error("Row source error: {0}")]
    RowSource(String),

    /// Rasterization or PNG export failure
    #[error("Image error: {0}")]
    Raster(#[from] crate::raster::RasterError),

    /// HTTP server error (bind, serve)
    #[error("Server error: {0}")]
    Server(String),

    /// CSV error wrapper
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON error wrapper
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PeshiError {
    /// Whether the error was caused by caller input rather than the system.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PeshiError::SchemaValidation { .. }
                | PeshiError::EmptyDataset
                | PeshiError::TemplateNotFound(_)
                | PeshiError::InvalidTemplate(_)
                | PeshiError::RowSource(_)
                | PeshiError::Csv(_)
                | PeshiError::Json(_)
        )
    }
}
