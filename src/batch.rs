//! # Batch Orchestrator
//!
//! Drives entries through the pipeline and collects the results:
//!
//! ```text
//! Entry ─▶ filter ─▶ qr::encode ─▶ caption::layout ─▶ compose ─▶ PNG ─▶ naming
//!                                                                        │
//!                       OutputBundle { images, archive } ◀── archive::pack
//! ```
//!
//! Entries are independent, so they fan out across a rayon pool. Results are
//! collected by index, which keeps the output in input order regardless of
//! which worker finishes first. Per-entry failures are logged and skipped;
//! only a batch with no surviving entries fails as a whole.
//!
//! ## Example
//!
//! ```no_run
//! use qrbatch::batch::{self, Entry};
//! use qrbatch::config::BatchConfig;
//!
//! let entries = vec![Entry::new("Team A", "https://example.com/a")];
//! let bundle = batch::run(&entries, &BatchConfig::default())?;
//! std::fs::write("qr_codes.zip", &bundle.archive)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use image::RgbImage;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::archive;
use crate::config::{BatchConfig, MAX_CANVAS_SIDE};
use crate::error::{BatchError, EntryError};
use crate::font::{Face, TtfFace};
use crate::naming;
use crate::render::caption::{Caption, LineMetrics};
use crate::render::compose::{self, Palette};
use crate::render::qr;

/// One `(label, target)` pair to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub label: String,
    pub target: String,
}

impl Entry {
    pub fn new(label: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target: target.into(),
        }
    }
}

/// A composited, PNG-encoded image ready for packaging.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedImage {
    pub filename: String,
    pub width: u32,
    pub height: u32,
    pub pixels: RgbImage,
    /// Encoded PNG bytes, as written into the archive.
    pub png: Vec<u8>,
}

/// An entry left out of the output, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    /// Position in the input sequence.
    pub index: usize,
    pub label: String,
    pub reason: EntryError,
}

/// Everything a batch run produces.
#[derive(Debug, Clone)]
pub struct OutputBundle {
    /// One image per distinct filename, in input order.
    pub images: Vec<RenderedImage>,
    /// ZIP archive of `images`.
    pub archive: Vec<u8>,
    pub skipped: Vec<SkippedEntry>,
}

type TargetPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// An immutable configuration plus a loaded font, reusable across batches.
#[derive(Clone)]
pub struct Pipeline {
    config: BatchConfig,
    face: Arc<dyn Face>,
    accept: Option<TargetPredicate>,
}

impl Pipeline {
    /// Build a pipeline around an already-loaded face.
    pub fn new(config: BatchConfig, face: Arc<dyn Face>) -> Result<Self, BatchError> {
        config.validate()?;
        Ok(Self {
            config,
            face,
            accept: None,
        })
    }

    /// Validate `config` and load the font it names.
    pub fn from_config(config: BatchConfig) -> Result<Self, BatchError> {
        config.validate()?;
        let face = TtfFace::load(&config.font_path, config.font_size)?;
        Self::new(config, Arc::new(face))
    }

    /// Replace the prefix-based target filter.
    pub fn with_target_predicate<F>(mut self, accept: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.accept = Some(Arc::new(accept));
        self
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    fn accepts(&self, target: &str) -> bool {
        match &self.accept {
            Some(accept) => !target.is_empty() && accept(target),
            None => self.config.accepts_target(target),
        }
    }

    /// Render every valid entry and package the results.
    pub fn run(&self, entries: &[Entry]) -> Result<OutputBundle, BatchError> {
        let results = match self.config.workers {
            Some(workers) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .build()
                    .map_err(|e| BatchError::WorkerPool(e.to_string()))?;
                pool.install(|| self.render_all(entries))
            }
            None => self.render_all(entries),
        };

        let mut images = Vec::with_capacity(results.len());
        let mut skipped = Vec::new();

        for (index, (entry, result)) in entries.iter().zip(results).enumerate() {
            match result {
                Ok(image) => images.push(image),
                Err(reason) => {
                    match &reason {
                        EntryError::EmptyLabel | EntryError::InvalidTarget(_) => {
                            tracing::debug!(index, label = %entry.label, %reason, "entry filtered")
                        }
                        _ => tracing::warn!(index, label = %entry.label, %reason, "entry skipped"),
                    }
                    skipped.push(SkippedEntry {
                        index,
                        label: entry.label.clone(),
                        reason,
                    });
                }
            }
        }

        if images.is_empty() {
            tracing::warn!(entries = entries.len(), "no valid entries in batch");
            return Err(BatchError::NoValidEntries);
        }

        // `images` must match the archive, so collapse duplicates before packing.
        let rendered = images.len();
        let images = archive::last_write_wins(images, |img| img.filename.as_str());
        if images.len() < rendered {
            tracing::info!(
                overwritten = rendered - images.len(),
                "duplicate filenames resolved by last write"
            );
        }

        let archive = archive::pack(&images)?;

        tracing::info!(
            entries = entries.len(),
            images = images.len(),
            skipped = skipped.len(),
            archive_bytes = archive.len(),
            "batch complete"
        );

        Ok(OutputBundle {
            images,
            archive,
            skipped,
        })
    }

    /// Render each entry in parallel; the result vector is index-aligned with `entries`.
    fn render_all(&self, entries: &[Entry]) -> Vec<Result<RenderedImage, EntryError>> {
        entries
            .par_iter()
            .map(|entry| self.render_entry(entry))
            .collect()
    }

    /// Filter, encode, lay out, composite and name a single entry.
    pub fn render_entry(&self, entry: &Entry) -> Result<RenderedImage, EntryError> {
        if entry.label.trim().is_empty() {
            return Err(EntryError::EmptyLabel);
        }
        if !self.accepts(&entry.target) {
            return Err(EntryError::InvalidTarget(entry.target.clone()));
        }

        let config = &self.config;
        let matrix = qr::encode(
            &entry.target,
            config.error_correction,
            config.max_version,
            config.module_size,
            config.border,
        )?;

        let face = self.face.as_ref();
        let metrics = LineMetrics::from_face(
            face,
            config.line_gap,
            config.top_margin,
            config.bottom_margin,
        );
        if !(metrics.line_height().is_finite() && metrics.line_height() > 0.0) {
            return Err(EntryError::RenderFailure(format!(
                "font reports unusable line height {}",
                metrics.line_height()
            )));
        }

        let caption = Caption::new(
            &entry.label,
            face,
            matrix.rendered_size() as f32,
            config.max_line_chars,
            metrics,
        );
        match matrix.rendered_size().checked_add(caption.height()) {
            Some(height) if height <= MAX_CANVAS_SIDE => {}
            _ => {
                return Err(EntryError::RenderFailure(format!(
                    "caption of {} lines exceeds the {} px canvas limit",
                    caption.lines.len(),
                    MAX_CANVAS_SIDE
                )));
            }
        }
        let palette: Palette = config.palette();
        let pixels = compose::compose(&matrix, &caption, face, palette);
        let png = compose::encode_png(&pixels)
            .map_err(|e| EntryError::RenderFailure(format!("PNG encoding failed: {}", e)))?;

        tracing::debug!(
            label = %entry.label,
            version = matrix.version,
            lines = caption.lines.len(),
            width = pixels.width(),
            height = pixels.height(),
            "rendered entry"
        );

        Ok(RenderedImage {
            filename: naming::file_name(&entry.label),
            width: pixels.width(),
            height: pixels.height(),
            pixels,
            png,
        })
    }
}

/// Load the font named by `config` and run one batch.
pub fn run(entries: &[Entry], config: &BatchConfig) -> Result<OutputBundle, BatchError> {
    Pipeline::from_config(config.clone())?.run(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::BoxFace;
    use pretty_assertions::assert_eq;

    fn pipeline() -> Pipeline {
        let config = BatchConfig {
            module_size: 4,
            ..BatchConfig::default()
        };
        Pipeline::new(config, Arc::new(BoxFace::new(10.0))).unwrap()
    }

    fn names(bundle: &OutputBundle) -> Vec<&str> {
        bundle.images.iter().map(|i| i.filename.as_str()).collect()
    }

    #[test]
    fn test_skip_not_abort() {
        let entries = vec![
            Entry::new("Alice", "https://a"),
            Entry::new("Bad", "ftp://x"),
            Entry::new("Bob", "https://b"),
        ];
        let bundle = pipeline().run(&entries).unwrap();
        assert_eq!(names(&bundle), vec!["Alice.png", "Bob.png"]);
        assert_eq!(
            bundle.skipped,
            vec![SkippedEntry {
                index: 1,
                label: "Bad".to_string(),
                reason: EntryError::InvalidTarget("ftp://x".to_string()),
            }]
        );
    }

    #[test]
    fn test_all_invalid_is_batch_error() {
        let entries = vec![Entry::new("A", "ftp://x"), Entry::new("B", "mailto:b")];
        let err = pipeline().run(&entries).unwrap_err();
        assert!(matches!(err, BatchError::NoValidEntries));
    }

    #[test]
    fn test_empty_batch_is_batch_error() {
        assert!(matches!(
            pipeline().run(&[]).unwrap_err(),
            BatchError::NoValidEntries
        ));
    }

    #[test]
    fn test_empty_label_and_target_skipped() {
        let entries = vec![
            Entry::new("", "https://a"),
            Entry::new("No target", ""),
            Entry::new("Ok", "https://ok"),
        ];
        let bundle = pipeline().run(&entries).unwrap();
        assert_eq!(names(&bundle), vec!["Ok.png"]);
        assert_eq!(bundle.skipped[0].reason, EntryError::EmptyLabel);
        assert_eq!(
            bundle.skipped[1].reason,
            EntryError::InvalidTarget(String::new())
        );
    }

    #[test]
    fn test_payload_too_large_skipped() {
        let long = format!("https://example.com/{}", "x".repeat(60));
        let entries = vec![Entry::new("Long", long), Entry::new("Short", "https://s")];
        let bundle = pipeline().run(&entries).unwrap();
        assert_eq!(names(&bundle), vec!["Short.png"]);
        assert!(matches!(
            bundle.skipped[0].reason,
            EntryError::PayloadTooLarge(_)
        ));
    }

    #[test]
    fn test_custom_target_predicate() {
        let pipeline = pipeline().with_target_predicate(|t| t.starts_with("https://"));
        let entries = vec![Entry::new("Plain", "http://a"), Entry::new("Tls", "https://a")];
        let bundle = pipeline.run(&entries).unwrap();
        assert_eq!(names(&bundle), vec!["Tls.png"]);
    }

    #[test]
    fn test_duplicate_filenames_last_write_wins() {
        let entries = vec![
            Entry::new("a-b", "https://first"),
            Entry::new("c", "https://c"),
            Entry::new("a.b", "https://second"),
        ];
        let pipeline = pipeline();
        let bundle = pipeline.run(&entries).unwrap();
        assert_eq!(names(&bundle), vec!["a_b.png", "c.png"]);

        let second = pipeline.render_entry(&entries[2]).unwrap();
        assert_eq!(bundle.images[0].png, second.png);
    }

    #[test]
    fn test_order_preserved_with_workers() {
        let entries: Vec<Entry> = (0..32)
            .map(|i| Entry::new(format!("Entry {}", i), format!("https://e/{}", i)))
            .collect();
        let config = BatchConfig {
            module_size: 2,
            workers: Some(4),
            ..BatchConfig::default()
        };
        let pipeline = Pipeline::new(config, Arc::new(BoxFace::new(10.0))).unwrap();
        let bundle = pipeline.run(&entries).unwrap();

        let expected: Vec<String> = (0..32).map(|i| format!("Entry_{}.png", i)).collect();
        assert_eq!(names(&bundle), expected);
    }

    #[test]
    fn test_runs_are_deterministic() {
        let entries = vec![
            Entry::new("Team A", "https://example.com/a"),
            Entry::new("Team B", "https://example.com/b"),
        ];
        let a = pipeline().run(&entries).unwrap();
        let b = pipeline().run(&entries).unwrap();
        assert_eq!(a.archive, b.archive);
        for (x, y) in a.images.iter().zip(&b.images) {
            assert_eq!(x.png, y.png);
        }
    }

    #[test]
    fn test_image_dimensions() {
        let bundle = pipeline()
            .run(&[Entry::new("Team A", "https://example.com/a")])
            .unwrap();
        let image = &bundle.images[0];
        let matrix = qr::encode("https://example.com/a", qr::ErrorCorrection::H, 4, 4, 4).unwrap();
        assert_eq!(image.width, matrix.rendered_size());
        // BoxFace line height 8 + 2 + 10, margins 10 + 20
        assert_eq!(image.height, matrix.rendered_size() + 20 + 30);
        assert_eq!(image.pixels.dimensions(), (image.width, image.height));
    }

    #[test]
    fn test_invalid_config_rejected() {
        for module_size in [0, 200_000_000] {
            let config = BatchConfig {
                module_size,
                ..BatchConfig::default()
            };
            assert!(matches!(
                Pipeline::new(config, Arc::new(BoxFace::new(10.0))),
                Err(BatchError::Config(_))
            ));
        }
    }

    #[test]
    fn test_oversize_caption_skipped() {
        // One char per line at 20px each runs far past the canvas limit.
        let tall = vec!["x"; 3_000].join(" ");
        let config = BatchConfig {
            module_size: 4,
            max_line_chars: 1,
            ..BatchConfig::default()
        };
        let pipeline = Pipeline::new(config, Arc::new(BoxFace::new(10.0))).unwrap();
        let bundle = pipeline
            .run(&[Entry::new(tall, "https://a"), Entry::new("Ok", "https://b")])
            .unwrap();
        assert_eq!(names(&bundle), vec!["Ok.png"]);
        assert!(matches!(
            bundle.skipped[0].reason,
            EntryError::RenderFailure(_)
        ));
    }
}
