//! # QR Encoder
//!
//! Turns a target string into a square module grid using the `qrcode` crate.
//!
//! The encoder picks the smallest symbol version, up to a configurable
//! ceiling, that holds the payload at the requested error-correction level.
//! Payloads that fit no version under the ceiling are rejected rather than
//! silently growing the symbol.
//!
//! ## Capacity at the default ceiling (version 4)
//!
//! | Level | Binary bytes | Alphanumeric chars |
//! |-------|--------------|--------------------|
//! | L | 78 | 114 |
//! | M | 62 | 90 |
//! | Q | 46 | 67 |
//! | H | 34 | 50 |

use qrcode::types::QrError;
use qrcode::{Color, EcLevel, QrCode, Version};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EncodeError;

/// Highest QR symbol version (177x177 modules).
pub const MAX_SYMBOL_VERSION: i16 = 40;

/// QR code error correction level
///
/// Higher levels allow more damage recovery but reduce data capacity.
///
/// | Level | Recovery |
/// |-------|----------|
/// | L | ~7% |
/// | M | ~15% |
/// | Q | ~25% |
/// | H | ~30% (default) |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ErrorCorrection {
    L,
    M,
    Q,
    #[default]
    H,
}

impl ErrorCorrection {
    fn ec_level(self) -> EcLevel {
        match self {
            ErrorCorrection::L => EcLevel::L,
            ErrorCorrection::M => EcLevel::M,
            ErrorCorrection::Q => EcLevel::Q,
            ErrorCorrection::H => EcLevel::H,
        }
    }
}

impl fmt::Display for ErrorCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCorrection::L => "L",
            ErrorCorrection::M => "M",
            ErrorCorrection::Q => "Q",
            ErrorCorrection::H => "H",
        };
        f.write_str(s)
    }
}

impl FromStr for ErrorCorrection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L" => Ok(ErrorCorrection::L),
            "M" => Ok(ErrorCorrection::M),
            "Q" => Ok(ErrorCorrection::Q),
            "H" => Ok(ErrorCorrection::H),
            other => Err(format!("unknown error correction level '{}'", other)),
        }
    }
}

/// An encoded QR symbol plus the parameters used to rasterize it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrMatrix {
    /// Modules per side (21 for version 1, +4 per version).
    pub size: usize,
    /// Row-major, `true` = dark module.
    pub cells: Vec<bool>,
    pub version: i16,
    pub error_correction: ErrorCorrection,
    /// Pixels per module.
    pub module_size: u32,
    /// Quiet-zone width in modules, on each side.
    pub border: u32,
}

impl QrMatrix {
    /// Whether the module at column `x`, row `y` is dark.
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        self.cells[y * self.size + x]
    }

    /// Side length in pixels including the quiet zone.
    pub fn rendered_size(&self) -> u32 {
        (self.size as u32 + 2 * self.border) * self.module_size
    }
}

/// Encode `target` at the smallest version up to `max_version` that fits.
///
/// ## Example
///
/// ```
/// use qrbatch::render::qr::{encode, ErrorCorrection};
///
/// let matrix = encode("https://example.com", ErrorCorrection::H, 4, 20, 4).unwrap();
/// assert_eq!(matrix.rendered_size(), (matrix.size as u32 + 8) * 20);
/// ```
pub fn encode(
    target: &str,
    error_correction: ErrorCorrection,
    max_version: i16,
    module_size: u32,
    border: u32,
) -> Result<QrMatrix, EncodeError> {
    let ceiling = max_version.clamp(1, MAX_SYMBOL_VERSION);
    let ec_level = error_correction.ec_level();

    for version in 1..=ceiling {
        match QrCode::with_version(target.as_bytes(), Version::Normal(version), ec_level) {
            Ok(code) => {
                let size = code.width();
                let cells = code
                    .to_colors()
                    .into_iter()
                    .map(|c| c == Color::Dark)
                    .collect();
                return Ok(QrMatrix {
                    size,
                    cells,
                    version,
                    error_correction,
                    module_size,
                    border,
                });
            }
            Err(QrError::DataTooLong) => continue,
            Err(e) => return Err(EncodeError::Unencodable(e.to_string())),
        }
    }

    Err(EncodeError::PayloadTooLarge {
        len: target.len(),
        level: error_correction,
        max_version: ceiling,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_target_uses_small_version() {
        let m = encode("https://a", ErrorCorrection::H, 4, 20, 4).unwrap();
        assert!(m.version <= 2);
        assert_eq!(m.size, 17 + 4 * m.version as usize);
        assert_eq!(m.cells.len(), m.size * m.size);
    }

    #[test]
    fn test_rendered_size_includes_border() {
        let m = encode("https://a", ErrorCorrection::L, 4, 20, 4).unwrap();
        assert_eq!(m.version, 1);
        assert_eq!(m.rendered_size(), (21 + 8) * 20);
    }

    #[test]
    fn test_finder_pattern_corners_are_dark() {
        let m = encode("https://example.com", ErrorCorrection::M, 4, 1, 0).unwrap();
        let last = m.size - 1;
        assert!(m.is_dark(0, 0));
        assert!(m.is_dark(last, 0));
        assert!(m.is_dark(0, last));
        // The separator next to each finder is light.
        assert!(!m.is_dark(7, 0));
    }

    #[test]
    fn test_payload_too_large_at_ceiling() {
        let target = format!("https://example.com/{}", "x".repeat(40));
        let err = encode(&target, ErrorCorrection::H, 4, 20, 4).unwrap_err();
        assert_eq!(
            err,
            EncodeError::PayloadTooLarge {
                len: target.len(),
                level: ErrorCorrection::H,
                max_version: 4,
            }
        );
    }

    #[test]
    fn test_lower_level_fits_more() {
        let target = format!("https://example.com/{}", "x".repeat(40));
        assert!(encode(&target, ErrorCorrection::L, 4, 20, 4).is_ok());
    }

    #[test]
    fn test_raising_ceiling_accepts_long_payload() {
        let target = format!("https://example.com/{}", "x".repeat(100));
        assert!(encode(&target, ErrorCorrection::H, 4, 20, 4).is_err());
        let m = encode(&target, ErrorCorrection::H, 15, 20, 4).unwrap();
        assert!(m.version > 4);
    }

    #[test]
    fn test_deterministic() {
        let a = encode("https://example.com/a", ErrorCorrection::H, 4, 20, 4).unwrap();
        let b = encode("https://example.com/a", ErrorCorrection::H, 4, 20, 4).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_error_correction_parse() {
        assert_eq!("h".parse::<ErrorCorrection>(), Ok(ErrorCorrection::H));
        assert_eq!(" Q ".parse::<ErrorCorrection>(), Ok(ErrorCorrection::Q));
        assert!("X".parse::<ErrorCorrection>().is_err());
        assert_eq!(ErrorCorrection::default(), ErrorCorrection::H);
        assert_eq!(ErrorCorrection::M.to_string(), "M");
    }
}
