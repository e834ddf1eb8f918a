//! # qrbatch CLI
//!
//! Command-line interface for captioned QR code batches.
//!
//! ## Usage
//!
//! ```bash
//! # Render entries from a JSON file into qr_codes.zip
//! qrbatch generate --input entries.json
//!
//! # Entries on the command line, PNGs also written to a directory
//! qrbatch generate --entry "Team A=https://example.com/a" --images-dir out/
//!
//! # Lower error correction, smaller modules
//! qrbatch generate --input entries.json --error-correction M --module-size 10
//!
//! # Start the web form
//! qrbatch serve --listen 0.0.0.0:8080
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use qrbatch::{
    BatchConfig, Entry, Pipeline, QrBatchError,
    archive::ARCHIVE_NAME,
    config::parse_hex_color,
    error::BatchError,
    intake,
    render::qr::ErrorCorrection,
    server::{self, ServerConfig},
};

/// qrbatch - Captioned QR code batch generator
#[derive(Parser, Debug)]
#[command(name = "qrbatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render entries and write the ZIP archive
    Generate {
        /// JSON file with entries (`[{"label", "target"}]` or `{"entries": [...]}`)
        #[arg(long, short, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Entry as LABEL=URL (repeatable)
        #[arg(long = "entry", value_name = "LABEL=URL")]
        entries: Vec<String>,

        /// Archive output path
        #[arg(long, short, default_value = ARCHIVE_NAME)]
        output: PathBuf,

        /// Also write each PNG into this directory
        #[arg(long, value_name = "DIR")]
        images_dir: Option<PathBuf>,

        #[command(flatten)]
        options: RenderOptions,
    },

    /// Start the HTTP server
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "0.0.0.0:8080")]
        listen: String,

        #[command(flatten)]
        options: RenderOptions,
    },
}

/// Overrides applied on top of the config file (or defaults).
#[derive(Args, Debug)]
struct RenderOptions {
    /// JSON config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// TTF/OTF font for captions
    #[arg(long, value_name = "FILE")]
    font: Option<PathBuf>,

    /// Caption font size in pixels
    #[arg(long)]
    font_size: Option<f32>,

    /// Error correction level (L, M, Q, H)
    #[arg(long)]
    error_correction: Option<ErrorCorrection>,

    /// Largest QR version to try
    #[arg(long)]
    max_version: Option<i16>,

    /// Pixels per QR module
    #[arg(long)]
    module_size: Option<u32>,

    /// Quiet zone in modules
    #[arg(long)]
    border: Option<u32>,

    /// Character budget per caption line
    #[arg(long)]
    max_line_chars: Option<usize>,

    /// Foreground color (RRGGBB)
    #[arg(long, value_parser = parse_hex_color)]
    foreground: Option<[u8; 3]>,

    /// Background color (RRGGBB)
    #[arg(long, value_parser = parse_hex_color)]
    background: Option<[u8; 3]>,

    /// Worker threads (defaults to one per core)
    #[arg(long)]
    workers: Option<usize>,
}

impl RenderOptions {
    fn into_config(self) -> Result<BatchConfig, BatchError> {
        let mut config = match &self.config {
            Some(path) => BatchConfig::from_json_file(path)?,
            None => BatchConfig::default(),
        };

        if let Some(font) = self.font {
            config.font_path = font;
        }
        if let Some(size) = self.font_size {
            config.font_size = size;
        }
        if let Some(level) = self.error_correction {
            config.error_correction = level;
        }
        if let Some(version) = self.max_version {
            config.max_version = version;
        }
        if let Some(size) = self.module_size {
            config.module_size = size;
        }
        if let Some(border) = self.border {
            config.border = border;
        }
        if let Some(chars) = self.max_line_chars {
            config.max_line_chars = chars;
        }
        if let Some(color) = self.foreground {
            config.foreground = color;
        }
        if let Some(color) = self.background {
            config.background = color;
        }
        if self.workers.is_some() {
            config.workers = self.workers;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), QrBatchError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            input,
            entries,
            output,
            images_dir,
            options,
        } => {
            let mut batch: Vec<Entry> = Vec::new();
            if let Some(path) = input {
                let json = std::fs::read_to_string(&path)?;
                batch.extend(intake::entries_from_json(&json)?);
            }
            for pair in &entries {
                batch.push(intake::parse_pair(pair)?);
            }

            let pipeline = Pipeline::from_config(options.into_config()?)?;
            let bundle = pipeline.run(&batch)?;

            for skipped in &bundle.skipped {
                eprintln!(
                    "Skipped #{} '{}': {}",
                    skipped.index + 1,
                    skipped.label,
                    skipped.reason
                );
            }

            if let Some(dir) = images_dir {
                std::fs::create_dir_all(&dir)?;
                for image in &bundle.images {
                    std::fs::write(dir.join(&image.filename), &image.png)?;
                }
            }

            std::fs::write(&output, &bundle.archive)?;
            println!(
                "Wrote {} image(s) to {}",
                bundle.images.len(),
                output.display()
            );
        }
        Commands::Serve { listen, options } => {
            let pipeline = Pipeline::from_config(options.into_config()?)?;
            let config = ServerConfig {
                listen_addr: listen,
            };

            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::serve(config, pipeline))?;
        }
    }

    Ok(())
}
