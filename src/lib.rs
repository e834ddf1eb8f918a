//! # qrbatch - Captioned QR Code Batches
//!
//! qrbatch turns a list of `(label, target URL)` pairs into labeled QR code
//! PNGs and packages them into one ZIP archive. It provides:
//!
//! - **QR encoding** at a chosen error-correction level and version ceiling
//! - **Caption layout**: pixel-accurate wrapping that never overflows the code
//! - **Compositing** of code and caption onto one canvas
//! - **Batch orchestration** with skip-and-continue error handling and
//!   order-preserving parallelism
//! - **Packaging** into a deterministic ZIP archive
//!
//! ## Quick Start
//!
//! ```no_run
//! use qrbatch::{batch::{self, Entry}, config::BatchConfig};
//!
//! let entries = vec![
//!     Entry::new("Team A", "https://example.com/a"),
//!     Entry::new("Team B", "https://example.com/b"),
//! ];
//!
//! // Loads the font named in the config, renders, and zips.
//! let bundle = batch::run(&entries, &BatchConfig::default())?;
//!
//! for image in &bundle.images {
//!     println!("{} ({}x{})", image.filename, image.width, image.height);
//! }
//! std::fs::write("qr_codes.zip", &bundle.archive)?;
//!
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`render`] | QR encoding, caption layout, compositing |
//! | [`batch`] | Pipeline orchestration |
//! | [`archive`] | ZIP packaging |
//! | [`naming`] | Label to filename mapping |
//! | [`font`] | Font metrics and glyph rasterization |
//! | [`config`] | Batch options |
//! | [`intake`] | Entries from JSON, `LABEL=URL` pairs and form columns |
//! | [`server`] | HTTP form and JSON endpoints |
//! | [`error`] | Error types |

pub mod archive;
pub mod batch;
pub mod config;
pub mod error;
pub mod font;
pub mod intake;
pub mod naming;
pub mod render;
pub mod server;

// Re-exports for convenience
pub use batch::{Entry, OutputBundle, Pipeline, RenderedImage};
pub use config::BatchConfig;
pub use error::QrBatchError;
