//! # Name Sanitizer
//!
//! Maps labels to filesystem-safe base names. The mapping is deterministic
//! but not injective: labels that differ only in punctuation collide, and
//! collisions are resolved downstream by last-write-wins.

/// Character substituted for anything that is not alphanumeric.
pub const REPLACEMENT: char = '_';

/// Extension of every rendered image.
pub const EXTENSION: &str = "png";

/// Replace every non-alphanumeric character with [`REPLACEMENT`].
///
/// Length (in chars) and order are preserved.
///
/// ```
/// use qrbatch::naming::sanitize;
///
/// assert_eq!(sanitize("Team A"), "Team_A");
/// assert_eq!(sanitize("a/b:c"), "a_b_c");
/// ```
pub fn sanitize(label: &str) -> String {
    label
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { REPLACEMENT })
        .collect()
}

/// Archive filename for a label, e.g. `Team_A.png`.
pub fn file_name(label: &str) -> String {
    format!("{}.{}", sanitize(label), EXTENSION)
}
