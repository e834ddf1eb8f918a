//! # Rendering Module
//!
//! Per-entry image production, leaves first.
//!
//! ## Modules
//!
//! - [`qr`]: target string to QR module grid
//! - [`caption`]: label to lines that fit the code width
//! - [`compose`]: grid and caption onto one RGB canvas
//!
//! ## Usage Example
//!
//! ```no_run
//! use qrbatch::font::TtfFace;
//! use qrbatch::render::caption::{Caption, LineMetrics};
//! use qrbatch::render::compose::{self, Palette};
//! use qrbatch::render::qr::{self, ErrorCorrection};
//!
//! let face = TtfFace::load("/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf", 60.0)?;
//! let matrix = qr::encode("https://example.com", ErrorCorrection::H, 4, 20, 4)?;
//! let metrics = LineMetrics::from_face(&face, 10.0, 10.0, 20.0);
//! let caption = Caption::new("Example", &face, matrix.rendered_size() as f32, 30, metrics);
//! let image = compose::compose(&matrix, &caption, &face, Palette::default());
//! image.save("example.png")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod caption;
pub mod compose;
pub mod qr;
