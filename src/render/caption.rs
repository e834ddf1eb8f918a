//! # Caption Layout Engine
//!
//! Breaks a label into lines that fit a pixel width.
//!
//! Layout runs in two passes:
//!
//! 1. **Character wrap**: greedy whitespace word-wrap to a character budget
//!    (`max_line_chars`). Words longer than the budget are chunked.
//! 2. **Pixel fit**: each candidate line is measured. While it is too wide,
//!    the line alone is re-wrapped at half its character budget and only the
//!    first sub-line is kept. The kept part is emitted and the rest of the
//!    candidate goes through the same loop again.
//!
//! The budget never drops below one character, so the loop terminates. A
//! single glyph that is wider than the pixel budget by itself is emitted
//! as-is.
//!
//! ## Example
//!
//! ```
//! use qrbatch::render::caption::layout;
//!
//! // 10px per character, 100px available
//! let lines = layout("a label that is far too long", 100.0, |s| s.chars().count() as f32 * 10.0, 30);
//! assert!(lines.iter().all(|l| l.pixel_width <= 100.0));
//! ```

use crate::font::Face;

/// One laid-out caption line.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub content: String,
    /// Measured width in pixels.
    pub pixel_width: f32,
}

/// Vertical metrics used to size and place caption lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMetrics {
    pub ascent: f32,
    /// Negative below the baseline, as reported by the font.
    pub descent: f32,
    pub line_gap: f32,
    pub top_margin: f32,
    pub bottom_margin: f32,
}

impl LineMetrics {
    /// Take ascent/descent from `face`, spacing from the caller.
    pub fn from_face(face: &dyn Face, line_gap: f32, top_margin: f32, bottom_margin: f32) -> Self {
        Self {
            ascent: face.ascent(),
            descent: face.descent(),
            line_gap,
            top_margin,
            bottom_margin,
        }
    }

    pub fn line_height(&self) -> f32 {
        self.ascent - self.descent + self.line_gap
    }

    /// Total caption strip height for `lines` lines, rounded up to whole pixels.
    pub fn caption_height(&self, lines: usize) -> u32 {
        let height = lines as f32 * self.line_height() + self.top_margin + self.bottom_margin;
        height.max(0.0).ceil() as u32
    }
}

/// A laid-out caption ready for compositing.
#[derive(Debug, Clone, PartialEq)]
pub struct Caption {
    pub lines: Vec<TextLine>,
    pub metrics: LineMetrics,
}

impl Caption {
    /// Lay out `label` against `face` within `max_width` pixels.
    pub fn new(
        label: &str,
        face: &dyn Face,
        max_width: f32,
        max_line_chars: usize,
        metrics: LineMetrics,
    ) -> Self {
        let lines = layout(label, max_width, |s| face.measure(s), max_line_chars);
        Self { lines, metrics }
    }

    pub fn height(&self) -> u32 {
        self.metrics.caption_height(self.lines.len())
    }
}

/// Greedy whitespace word-wrap to at most `budget` characters per line.
///
/// Whitespace runs collapse to a single space. Words longer than the budget
/// are split into budget-sized chunks. Blank input yields no lines.
pub fn wrap_chars(text: &str, budget: usize) -> Vec<String> {
    let budget = budget.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        let needed = if current_len == 0 {
            word_len
        } else {
            current_len + 1 + word_len
        };

        if needed <= budget {
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.push_str(word);
            current_len += word_len;
            continue;
        }

        if current_len > 0 {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if word_len <= budget {
            current.push_str(word);
            current_len = word_len;
            continue;
        }

        let chars: Vec<char> = word.chars().collect();
        let mut chunks = chars.chunks(budget).peekable();
        while let Some(chunk) = chunks.next() {
            let piece: String = chunk.iter().collect();
            if chunks.peek().is_some() {
                lines.push(piece);
            } else {
                current = piece;
                current_len = chunk.len();
            }
        }
    }

    if current_len > 0 {
        lines.push(current);
    }

    lines
}

/// Lay out `label` into lines no wider than `max_width` pixels.
///
/// An empty or blank label yields a single empty line so the caption strip
/// still reserves space under the code.
pub fn layout<F>(label: &str, max_width: f32, measure: F, max_line_chars: usize) -> Vec<TextLine>
where
    F: Fn(&str) -> f32,
{
    let candidates = wrap_chars(label, max_line_chars);
    if candidates.is_empty() {
        return vec![TextLine {
            content: String::new(),
            pixel_width: 0.0,
        }];
    }

    let mut lines = Vec::with_capacity(candidates.len());

    for candidate in &candidates {
        let mut rest: &str = candidate;

        while !rest.is_empty() {
            let mut budget = rest.chars().count();
            let mut head = rest.to_string();
            let mut width = measure(&head);

            'shrink: while width > max_width && budget > 1 {
                budget = (budget / 2).max(1);
                // The first sub-line is always a prefix of `head`.
                match wrap_chars(&head, budget).into_iter().next() {
                    Some(sub) => head = sub,
                    None => break 'shrink,
                }
                width = measure(&head);
            }

            debug_assert!(rest.starts_with(&head));
            rest = rest[head.len()..].trim_start();
            lines.push(TextLine {
                content: head,
                pixel_width: width,
            });
        }
    }

    lines
}
