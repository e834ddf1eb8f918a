//! # Image Compositor
//!
//! Renders a QR matrix and its caption onto one RGB canvas.
//!
//! ```text
//! +-----------------------+  y = 0
//! |  quiet zone           |
//! |    +-------------+    |
//! |    |  QR modules |    |
//! |    +-------------+    |
//! |                       |  y = matrix height
//! |      top margin       |
//! |    centered line 1    |  + line height
//! |    centered line 2    |
//! |     bottom margin     |
//! +-----------------------+  y = matrix height + caption height
//! ```

use image::{ImageFormat, Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

use crate::font::Face;
use crate::render::caption::Caption;
use crate::render::qr::QrMatrix;

/// Foreground (modules and text) and background colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub foreground: [u8; 3],
    pub background: [u8; 3],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            foreground: [0, 0, 0],
            background: [255, 255, 255],
        }
    }
}

/// Composite `matrix` and `caption` into a single image.
///
/// Canvas width equals the matrix rendered width; the caption strip is
/// appended below the matrix.
pub fn compose(matrix: &QrMatrix, caption: &Caption, face: &dyn Face, palette: Palette) -> RgbImage {
    let qr_size = matrix.rendered_size();
    let width = qr_size;
    let height = qr_size + caption.height();

    let mut canvas = RgbImage::from_pixel(width, height, Rgb(palette.background));

    draw_matrix(&mut canvas, matrix, Rgb(palette.foreground));

    let metrics = caption.metrics;
    let line_height = metrics.line_height();
    let top = qr_size as f32 + metrics.top_margin;

    for (i, line) in caption.lines.iter().enumerate() {
        if line.content.is_empty() {
            continue;
        }
        let x = ((width as f32 - line.pixel_width) / 2.0).floor();
        let baseline = top + i as f32 * line_height + metrics.ascent;
        draw_text(&mut canvas, face, &line.content, x, baseline, palette.foreground);
    }

    canvas
}

/// Paint dark modules, offset by the quiet zone.
fn draw_matrix(canvas: &mut RgbImage, matrix: &QrMatrix, color: Rgb<u8>) {
    let cell = matrix.module_size;
    let offset = matrix.border * cell;

    for qy in 0..matrix.size {
        for qx in 0..matrix.size {
            if !matrix.is_dark(qx, qy) {
                continue;
            }

            let left = offset + qx as u32 * cell;
            let top = offset + qy as u32 * cell;
            for py in top..top + cell {
                for px in left..left + cell {
                    canvas.put_pixel(px, py, color);
                }
            }
        }
    }
}

/// Blend glyph coverage toward `color`, clipping at the canvas edges.
fn draw_text(canvas: &mut RgbImage, face: &dyn Face, text: &str, x: f32, baseline: f32, color: [u8; 3]) {
    let (width, height) = canvas.dimensions();

    face.draw(text, x, baseline, &mut |px, py, coverage| {
        if px < 0 || py < 0 || px as u32 >= width || py as u32 >= height {
            return;
        }
        let coverage = coverage.clamp(0.0, 1.0);
        let pixel = canvas.get_pixel_mut(px as u32, py as u32);
        for (channel, target) in pixel.0.iter_mut().zip(color) {
            let current = *channel as f32;
            *channel = (current + (target as f32 - current) * coverage).round() as u8;
        }
    });
}

/// Encode an image as PNG bytes.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}
