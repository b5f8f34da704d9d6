//! # Peshi - Sticker Label Generator
//!
//! Peshi maps spreadsheet rows onto label templates and renders one sticker
//! per row. It provides:
//!
//! - **Templates**: eight country presets plus user-authored custom layouts
//! - **Schema reconciliation**: column → field mapping, tolerant of header case
//! - **Layout engine**: deterministic rescaling of a template to any output size
//! - **Export**: HTML preview fragments and PNG rasterization
//!
//! ## Quick Start
//!
//! ```
//! use peshi::{
//!     generate::{generate, GenerationRequest, TemplateSelector},
//!     layout::SizeClass,
//!     rows::row,
//!     template::TemplateCatalog,
//! };
//!
//! let catalog = TemplateCatalog::built_in()?;
//! let rows = vec![
//!     row([("code", "ABC001"), ("color", "#FF0000"), ("title", "Red Product")]),
//!     row([("code", "XYZ002"), ("color", "#00FF00"), ("title", "Green Product")]),
//! ];
//!
//! let request = GenerationRequest::new(TemplateSelector::Preset("usa".into()), rows)
//!     .with_size(SizeClass::Small)
//!     .with_sticker_name("shelf");
//! let result = generate(&request, &catalog)?;
//!
//! assert_eq!(result.stickers[0].filename, "shelf_usa_1_ABC001");
//! assert_eq!(result.size.width, 210);
//! # Ok::<(), peshi::PeshiError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`template`] | Template definitions and the preset catalog |
//! | [`rows`] | Row sources (CSV, JSON) |
//! | [`reconcile`] | Row → value bag resolution and column checks |
//! | [`layout`] | Render engine and HTML output |
//! | [`raster`] | PNG rasterization |
//! | [`generate`] | Batch pipeline |
//! | [`server`] | HTTP API |
//! | [`error`] | Error types |

pub mod error;
pub mod generate;
pub mod layout;
pub mod raster;
pub mod reconcile;
pub mod rows;
pub mod server;
pub mod template;

// Re-exports for convenience
pub use error::PeshiError;
pub use layout::{RenderedArtifact, SizeClass};
pub use template::{TemplateCatalog, TemplateDefinition};
