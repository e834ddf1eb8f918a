//! TTF font loading, measurement and glyph rasterization.
//!
//! The caption layout engine only needs a width measure; the compositor
//! also needs vertical metrics and coverage values. Both go through the
//! [`Face`] trait so a batch can share one loaded font read-only across
//! worker threads.

use ab_glyph::{Font, FontArc, GlyphId, PxScale, ScaleFont};
use std::path::Path;

use crate::error::BatchError;

/// Default caption font (DejaVu Sans Bold, as shipped by most Linux distributions).
pub const DEFAULT_FONT_PATH: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf";

/// Font metrics and rasterization at a fixed pixel size.
pub trait Face: Send + Sync {
    /// Rendered width of `text` in pixels.
    fn measure(&self, text: &str) -> f32;

    /// Distance from baseline to the top of the tallest glyph (positive).
    fn ascent(&self) -> f32;

    /// Distance from baseline to the bottom of the lowest glyph (negative).
    fn descent(&self) -> f32;

    /// Rasterize `text` with its left edge at `x` and baseline at `baseline`.
    ///
    /// `plot` receives absolute pixel coordinates and a coverage in `0.0..=1.0`.
    /// Coordinates may fall outside the caller's canvas.
    fn draw(&self, text: &str, x: f32, baseline: f32, plot: &mut dyn FnMut(i32, i32, f32));
}

/// A TrueType/OpenType face at a fixed pixel height.
#[derive(Clone)]
pub struct TtfFace {
    font: FontArc,
    scale: PxScale,
}

impl TtfFace {
    /// Parse font bytes and bind them to a pixel height.
    pub fn from_bytes(bytes: Vec<u8>, pixel_height: f32) -> Result<Self, BatchError> {
        let font = FontArc::try_from_vec(bytes)
            .map_err(|e| BatchError::Font(format!("invalid font data: {}", e)))?;
        Ok(Self {
            font,
            scale: PxScale::from(pixel_height),
        })
    }

    /// Load a font file from disk.
    pub fn load(path: impl AsRef<Path>, pixel_height: f32) -> Result<Self, BatchError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            BatchError::Font(format!("failed to read {}: {}", path.display(), e))
        })?;
        tracing::debug!(path = %path.display(), pixel_height, "loaded caption font");
        Self::from_bytes(bytes, pixel_height)
    }

    pub fn pixel_height(&self) -> f32 {
        self.scale.y
    }

    /// Glyph ids and pen positions (relative to the line start) for `text`.
    fn layout_glyphs(&self, text: &str) -> (Vec<(GlyphId, f32)>, f32) {
        let scaled = self.font.as_scaled(self.scale);
        let mut glyphs = Vec::with_capacity(text.len());
        let mut caret_x = 0.0f32;
        let mut prev: Option<GlyphId> = None;

        for ch in text.chars() {
            let glyph_id = scaled.glyph_id(ch);
            if let Some(prev) = prev {
                caret_x += scaled.kern(prev, glyph_id);
            }
            glyphs.push((glyph_id, caret_x));
            caret_x += scaled.h_advance(glyph_id);
            prev = Some(glyph_id);
        }

        (glyphs, caret_x)
    }
}

impl Face for TtfFace {
    fn measure(&self, text: &str) -> f32 {
        self.layout_glyphs(text).1
    }

    fn ascent(&self) -> f32 {
        self.font.as_scaled(self.scale).ascent()
    }

    fn descent(&self) -> f32 {
        self.font.as_scaled(self.scale).descent()
    }

    fn draw(&self, text: &str, x: f32, baseline: f32, plot: &mut dyn FnMut(i32, i32, f32)) {
        let (glyphs, _) = self.layout_glyphs(text);

        for (glyph_id, glyph_x) in glyphs {
            let glyph =
                glyph_id.with_scale_and_position(self.scale, ab_glyph::point(x + glyph_x, baseline));

            if let Some(outlined) = self.font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|px, py, coverage| {
                    plot(
                        px as i32 + bounds.min.x as i32,
                        py as i32 + bounds.min.y as i32,
                        coverage,
                    );
                });
            }
        }
    }
}

/// DejaVu Sans Bold at 60px, bundled for tests so they do not depend on host fonts.
#[cfg(test)]
pub(crate) fn dejavu_bold() -> TtfFace {
    TtfFace::from_bytes(include_bytes!("fonts/DejaVuSans-Bold.ttf").to_vec(), 60.0)
        .expect("bundled font parses")
}

/// Fixed-advance face for tests: every char is `advance` wide and drawn
/// as a solid box, so widths are exact and no font file is needed.
#[cfg(test)]
pub(crate) struct BoxFace {
    pub advance: f32,
    pub ascent: f32,
    pub descent: f32,
}

#[cfg(test)]
impl BoxFace {
    pub fn new(advance: f32) -> Self {
        Self {
            advance,
            ascent: 8.0,
            descent: -2.0,
        }
    }
}

#[cfg(test)]
impl Face for BoxFace {
    fn measure(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.advance
    }

    fn ascent(&self) -> f32 {
        self.ascent
    }

    fn descent(&self) -> f32 {
        self.descent
    }

    fn draw(&self, text: &str, x: f32, baseline: f32, plot: &mut dyn FnMut(i32, i32, f32)) {
        let top = (baseline - self.ascent) as i32;
        for (i, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let left = (x + i as f32 * self.advance) as i32;
            // One-pixel gap between boxes.
            for py in top..baseline as i32 {
                for px in left..left + self.advance as i32 - 1 {
                    plot(px, py, 1.0);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_font_file() {
        let err = TtfFace::load("/nonexistent/font.ttf", 60.0).err().unwrap();
        assert!(matches!(err, BatchError::Font(_)));
    }

    #[test]
    fn test_invalid_font_bytes() {
        let err = TtfFace::from_bytes(b"not a font".to_vec(), 60.0).err().unwrap();
        assert!(matches!(err, BatchError::Font(_)));
    }

    #[test]
    fn test_ttf_metrics() {
        let face = dejavu_bold();
        assert_eq!(face.pixel_height(), 60.0);
        assert!((face.ascent() - 47.8).abs() < 0.5, "ascent {}", face.ascent());
        assert!((face.descent() + 12.2).abs() < 0.5, "descent {}", face.descent());
    }

    #[test]
    fn test_ttf_measure() {
        let face = dejavu_bold();
        assert_eq!(face.measure(""), 0.0);
        assert!((face.measure("Team A") - 209.6).abs() < 1.0);

        let widths: Vec<f32> = ["T", "Team", "Team A", "Team A wins"]
            .iter()
            .map(|s| face.measure(s))
            .collect();
        assert!(widths.windows(2).all(|w| w[0] < w[1]), "{:?}", widths);
    }

    #[test]
    fn test_ttf_kerning_never_widens() {
        let face = dejavu_bold();
        assert!(face.measure("AV") <= face.measure("A") + face.measure("V") + 0.01);
    }

    #[test]
    fn test_ttf_ink_within_line_box() {
        let face = dejavu_bold();
        let (x, baseline) = (10.0, 100.0);
        let width = face.measure("Team A");

        let mut ink = Vec::new();
        face.draw("Team A", x, baseline, &mut |px, py, coverage| {
            if coverage > 0.0 {
                ink.push((px, py, coverage));
            }
        });
        assert!(!ink.is_empty());

        let min_x = ink.iter().map(|p| p.0).min().unwrap();
        let max_x = ink.iter().map(|p| p.0).max().unwrap();
        let min_y = ink.iter().map(|p| p.1).min().unwrap();
        let max_y = ink.iter().map(|p| p.1).max().unwrap();

        assert!(min_x >= x as i32 - 1, "min_x {}", min_x);
        assert!(max_x <= (x + width).ceil() as i32 + 1, "max_x {}", max_x);
        assert!(min_y >= (baseline - face.ascent()).floor() as i32 - 1, "min_y {}", min_y);
        assert!(max_y <= (baseline - face.descent()).ceil() as i32, "max_y {}", max_y);
        // No descenders in "Team A": ink ends at the baseline.
        assert!(max_y <= baseline as i32 + 1, "max_y {}", max_y);

        // Anti-aliased edges.
        assert!(ink.iter().any(|p| p.2 > 0.01 && p.2 < 0.99));
    }

    #[test]
    fn test_box_face_metrics() {
        let face = BoxFace::new(10.0);
        assert_eq!(face.measure("abc"), 30.0);
        assert_eq!(face.measure(""), 0.0);

        let mut hits = 0;
        face.draw("a b", 0.0, 8.0, &mut |_, _, _| hits += 1);
        // Two boxes of 9x8, space skipped.
        assert_eq!(hits, 2 * 9 * 8);
    }
}
