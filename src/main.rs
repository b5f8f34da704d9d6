//! # Peshi CLI
//!
//! Command-line interface for batch sticker generation.
//!
//! ## Usage
//!
//! ```bash
//! # List preset templates
//! peshi templates
//!
//! # Render one PNG per row with a preset
//! peshi generate --template usa --rows products.csv --size large --out stickers/
//!
//! # Custom template with a column mapping, plus HTML previews
//! peshi generate --custom shelf.json --mapping mapping.json --rows products.json --html
//!
//! # Run the HTTP API
//! peshi serve --listen 0.0.0.0:3000
//! ```

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use peshi::{
    PeshiError, SizeClass, TemplateCatalog, TemplateDefinition,
    generate::{self, GenerationRequest, TemplateSelector},
    raster::{self, DEFAULT_PIXEL_RATIO, PreviewRasterizer},
    reconcile::ColumnMapping,
    rows,
    server::{self, DEFAULT_UPLOAD_LIMIT, ServerConfig},
};

/// Default log filter when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "peshi=info,tower_http=info";

/// Peshi - Sticker label generator
#[derive(Parser, Debug)]
#[command(name = "peshi")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List preset templates
    Templates {
        /// Preset catalog file (defaults to the built-in catalog)
        #[arg(long, value_name = "FILE")]
        catalog: Option<PathBuf>,
    },

    /// Render stickers from a row file
    Generate {
        /// Preset template identifier (e.g. usa, japan)
        #[arg(long, conflicts_with = "custom", required_unless_present = "custom")]
        template: Option<String>,

        /// Custom template JSON file
        #[arg(long, value_name = "FILE")]
        custom: Option<PathBuf>,

        /// Row file (.csv or .json)
        #[arg(long, value_name = "FILE")]
        rows: PathBuf,

        /// Field → column mapping JSON file
        #[arg(long, value_name = "FILE")]
        mapping: Option<PathBuf>,

        /// Output size: small, medium or large
        #[arg(long, default_value = "medium")]
        size: SizeClass,

        /// Sticker name used as the filename prefix
        #[arg(long, default_value = generate::DEFAULT_STICKER_NAME)]
        name: String,

        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,

        /// Also write an HTML preview per sticker
        #[arg(long)]
        html: bool,

        /// PNG pixel ratio
        #[arg(long, default_value_t = DEFAULT_PIXEL_RATIO)]
        pixel_ratio: u32,

        /// Preset catalog file (defaults to the built-in catalog)
        #[arg(long, value_name = "FILE")]
        catalog: Option<PathBuf>,
    },

    /// Run the HTTP API server
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "0.0.0.0:3000")]
        listen: String,

        /// Preset catalog file (defaults to the built-in catalog)
        #[arg(long, value_name = "FILE")]
        catalog: Option<PathBuf>,

        /// Maximum request body size in bytes
        #[arg(long, default_value_t = DEFAULT_UPLOAD_LIMIT)]
        upload_limit: usize,
    },
}

fn main() {
    init_tracing();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<(), PeshiError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Templates { catalog } => {
            let catalog = TemplateCatalog::load(catalog.as_deref())?;
            println!("Available templates (catalog v{}):", catalog.version());
            for (id, template) in catalog.iter() {
                println!(
                    "  {:<10} {:<20} {}x{}",
                    id, template.name, template.native_size.width, template.native_size.height
                );
            }
            Ok(())
        }

        Commands::Generate {
            template,
            custom,
            rows,
            mapping,
            size,
            name,
            out,
            html,
            pixel_ratio,
            catalog,
        } => {
            let catalog = TemplateCatalog::load(catalog.as_deref())?;
            let selector = match (template, custom) {
                (_, Some(path)) => TemplateSelector::Custom(read_json::<TemplateDefinition>(&path)?),
                (Some(id), None) => TemplateSelector::Preset(id),
                (None, None) => {
                    return Err(PeshiError::InvalidTemplate(
                        "either --template or --custom is required".to_string(),
                    ));
                }
            };

            let mut request = GenerationRequest::new(selector, rows::load_path(&rows)?)
                .with_size(size)
                .with_sticker_name(name);
            if let Some(path) = mapping {
                request = request.with_mapping(read_json::<ColumnMapping>(&path)?);
            }

            let result = generate::generate(&request, &catalog)?;
            std::fs::create_dir_all(&out)?;

            if html {
                for sticker in &result.stickers {
                    let path = out.join(format!("{}.html", sticker.filename));
                    std::fs::write(&path, sticker.html())?;
                }
            }

            let artifacts: Vec<_> = result.artifacts().cloned().collect();
            let rasterizer = PreviewRasterizer::new(pixel_ratio).with_file_paths(true);
            let pngs = raster::export_batch(&rasterizer, &artifacts);

            let mut written = 0;
            let mut failed = 0;
            for (sticker, png) in result.stickers.iter().zip(pngs) {
                let path = out.join(format!("{}.png", sticker.filename));
                match png.map_err(PeshiError::from).and_then(|bytes| {
                    std::fs::write(&path, bytes)?;
                    Ok(())
                }) {
                    Ok(()) => {
                        written += 1;
                        println!("  {} -> {}", sticker.name, path.display());
                    }
                    Err(e) => {
                        failed += 1;
                        eprintln!("  {} failed: {}", sticker.name, e);
                    }
                }
            }

            println!(
                "Generated {} sticker(s) at {}x{} ({}) in {}",
                written,
                result.size.width,
                result.size.height,
                result.size_class,
                out.display()
            );
            if failed > 0 {
                eprintln!("{} sticker(s) failed to export", failed);
            }
            Ok(())
        }

        Commands::Serve {
            listen,
            catalog,
            upload_limit,
        } => {
            let config = ServerConfig {
                listen_addr: listen,
                catalog_path: catalog,
                upload_limit,
            };
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::serve(config))
        }
    }
}

/// Read and deserialize a JSON file.
fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, PeshiError> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}
