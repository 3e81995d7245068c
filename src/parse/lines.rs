//! Splits raw file text into significant lines.

/// Lines starting with this marker are comments.
pub const COMMENT_MARKER: char = '#';

/// Parsing stops at this line.
pub const EOF_MARKER: &str = "EOF";

/// Returns the trimmed, non-empty, non-comment lines of `text` that come
/// before the end-of-file marker, in their original order.
pub fn significant_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .take_while(|line| *line != EOF_MARKER)
        .filter(|line| !line.is_empty() && !line.starts_with(COMMENT_MARKER))
        .collect()
}
