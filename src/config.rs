//! # Batch Configuration
//!
//! One immutable [`BatchConfig`] is built per batch (or once per server) and
//! passed to the pipeline. Every field has a default, so a JSON config file
//! only needs the fields it changes:
//!
//! ```
//! use qrbatch::config::BatchConfig;
//! use qrbatch::render::qr::ErrorCorrection;
//!
//! let config = BatchConfig::from_json(r#"{ "error_correction": "M", "module_size": 10 }"#).unwrap();
//! assert_eq!(config.error_correction, ErrorCorrection::M);
//! assert_eq!(config.module_size, 10);
//! assert_eq!(config.border, 4);
//! ```
//!
//! ## Defaults
//!
//! | Field | Default |
//! |-------|---------|
//! | `error_correction` | H |
//! | `max_version` | 4 |
//! | `module_size` | 20 px |
//! | `border` | 4 modules |
//! | `font_path` | DejaVu Sans Bold |
//! | `font_size` | 60 px |
//! | `max_line_chars` | 30 |
//! | `line_gap` / `top_margin` / `bottom_margin` | 10 / 10 / 20 px |
//! | `foreground` / `background` | black / white |
//! | `accepted_prefixes` | `["http"]` |
//! | `workers` | rayon default |

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::BatchError;
use crate::font::DEFAULT_FONT_PATH;
use crate::render::compose::Palette;
use crate::render::qr::{ErrorCorrection, MAX_SYMBOL_VERSION};

/// Largest canvas side (pixels) a config may produce.
pub const MAX_CANVAS_SIDE: u32 = 40_000;

/// Options recognized by a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub error_correction: ErrorCorrection,
    /// Largest QR version tried before giving up with `PayloadTooLarge`.
    pub max_version: i16,
    /// Pixels per QR module.
    pub module_size: u32,
    /// Quiet zone in modules.
    pub border: u32,
    pub font_path: PathBuf,
    /// Caption font pixel height.
    pub font_size: f32,
    /// Character budget for the first wrap pass.
    pub max_line_chars: usize,
    pub line_gap: f32,
    pub top_margin: f32,
    pub bottom_margin: f32,
    pub foreground: [u8; 3],
    pub background: [u8; 3],
    /// A target is accepted if it starts with any of these.
    pub accepted_prefixes: Vec<String>,
    /// Worker threads for per-entry rendering (`None` = rayon's global pool).
    pub workers: Option<usize>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        let palette = Palette::default();
        Self {
            error_correction: ErrorCorrection::H,
            max_version: 4,
            module_size: 20,
            border: 4,
            font_path: PathBuf::from(DEFAULT_FONT_PATH),
            font_size: 60.0,
            max_line_chars: 30,
            line_gap: 10.0,
            top_margin: 10.0,
            bottom_margin: 20.0,
            foreground: palette.foreground,
            background: palette.background,
            accepted_prefixes: vec!["http".to_string()],
            workers: None,
        }
    }
}

impl BatchConfig {
    /// Parse a (possibly partial) JSON config and validate it.
    pub fn from_json(json: &str) -> Result<Self, BatchError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| BatchError::Config(format!("invalid config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, BatchError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| BatchError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Reject settings that cannot produce an image.
    pub fn validate(&self) -> Result<(), BatchError> {
        if self.module_size == 0 {
            return Err(BatchError::Config("module_size must be at least 1".into()));
        }
        if self.max_line_chars == 0 {
            return Err(BatchError::Config("max_line_chars must be at least 1".into()));
        }
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return Err(BatchError::Config(format!(
                "font_size must be positive, got {}",
                self.font_size
            )));
        }
        if !(1..=MAX_SYMBOL_VERSION).contains(&self.max_version) {
            return Err(BatchError::Config(format!(
                "max_version must be in 1..={}, got {}",
                MAX_SYMBOL_VERSION, self.max_version
            )));
        }
        if self.workers == Some(0) {
            return Err(BatchError::Config("workers must be at least 1".into()));
        }
        if self.font_size > MAX_CANVAS_SIDE as f32 {
            return Err(BatchError::Config(format!(
                "font_size must be at most {}, got {}",
                MAX_CANVAS_SIDE, self.font_size
            )));
        }
        for (name, value) in [
            ("line_gap", self.line_gap),
            ("top_margin", self.top_margin),
            ("bottom_margin", self.bottom_margin),
        ] {
            if !(value.is_finite() && (0.0..=MAX_CANVAS_SIDE as f32).contains(&value)) {
                return Err(BatchError::Config(format!(
                    "{} must be in 0..={}, got {}",
                    name, MAX_CANVAS_SIDE, value
                )));
            }
        }
        match self.max_canvas_width() {
            Some(side) if side <= MAX_CANVAS_SIDE => Ok(()),
            _ => Err(BatchError::Config(format!(
                "module_size {} with border {} exceeds the {} px canvas limit at version {}",
                self.module_size, self.border, MAX_CANVAS_SIDE, self.max_version
            ))),
        }
    }

    /// Canvas width of the largest symbol `max_version` allows, or `None` on overflow.
    pub fn max_canvas_width(&self) -> Option<u32> {
        let modules = 17 + 4 * u32::try_from(self.max_version).ok()?;
        self.border
            .checked_mul(2)?
            .checked_add(modules)?
            .checked_mul(self.module_size)
    }

    pub fn palette(&self) -> Palette {
        Palette {
            foreground: self.foreground,
            background: self.background,
        }
    }

    /// Default target predicate: prefix match against `accepted_prefixes`.
    pub fn accepts_target(&self, target: &str) -> bool {
        !target.is_empty()
            && self
                .accepted_prefixes
                .iter()
                .any(|prefix| target.starts_with(prefix.as_str()))
    }
}

/// Parse `RRGGBB` or `#RRGGBB` into an RGB triple.
pub fn parse_hex_color(s: &str) -> Result<[u8; 3], String> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(format!("expected RRGGBB, got '{}'", s));
    }
    let mut rgb = [0u8; 3];
    for (i, slot) in rgb.iter_mut().enumerate() {
        *slot = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
            .map_err(|_| format!("invalid hex color '{}'", s))?;
    }
    Ok(rgb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = BatchConfig::default();
        assert_eq!(config.error_correction, ErrorCorrection::H);
        assert_eq!(config.module_size, 20);
        assert_eq!(config.border, 4);
        assert_eq!(config.font_size, 60.0);
        assert_eq!(config.max_line_chars, 30);
        assert_eq!(config.palette(), Palette::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(BatchConfig::from_json("{}").unwrap(), BatchConfig::default());
    }

    #[test]
    fn test_partial_json() {
        let config = BatchConfig::from_json(
            r#"{ "foreground": [0, 0, 128], "accepted_prefixes": ["https://"], "workers": 2 }"#,
        )
        .unwrap();
        assert_eq!(config.foreground, [0, 0, 128]);
        assert_eq!(config.accepted_prefixes, vec!["https://".to_string()]);
        assert_eq!(config.workers, Some(2));
        assert_eq!(config.module_size, 20);
    }

    #[test]
    fn test_invalid_values_rejected() {
        for json in [
            r#"{ "module_size": 0 }"#,
            r#"{ "max_line_chars": 0 }"#,
            r#"{ "font_size": 0.0 }"#,
            r#"{ "max_version": 41 }"#,
            r#"{ "workers": 0 }"#,
            r#"{ "error_correction": "Z" }"#,
            r#"{ "module_size": 200000000 }"#,
            r#"{ "border": 4294967295 }"#,
            r#"{ "font_size": 1e9 }"#,
            r#"{ "line_gap": -1.0 }"#,
            r#"{ "top_margin": 1e12 }"#,
            r#"{ "bottom_margin": -5.0 }"#,
        ] {
            let err = BatchConfig::from_json(json).unwrap_err();
            assert!(matches!(err, BatchError::Config(_)), "{}", json);
        }
    }

    #[test]
    fn test_canvas_limit_boundary() {
        // Version 4 is 33 modules, plus 2 * 4 border = 41 modules per side.
        let at_limit = BatchConfig {
            module_size: 975,
            ..BatchConfig::default()
        };
        assert_eq!(at_limit.max_canvas_width(), Some(39_975));
        assert!(at_limit.validate().is_ok());

        let over = BatchConfig {
            module_size: 976,
            ..BatchConfig::default()
        };
        assert!(matches!(over.validate(), Err(BatchError::Config(_))));
    }

    #[test]
    fn test_canvas_width_overflow_is_none() {
        let config = BatchConfig {
            module_size: 200_000_000,
            ..BatchConfig::default()
        };
        assert_eq!(config.max_canvas_width(), None);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_accepts_target() {
        let config = BatchConfig::default();
        assert!(config.accepts_target("https://a"));
        assert!(config.accepts_target("http://a"));
        assert!(!config.accepts_target("ftp://x"));
        assert!(!config.accepts_target(""));
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ff8000"), Ok([255, 128, 0]));
        assert_eq!(parse_hex_color("000000"), Ok([0, 0, 0]));
        assert!(parse_hex_color("#fff").is_err());
        assert!(parse_hex_color("zzzzzz").is_err());
    }
}
