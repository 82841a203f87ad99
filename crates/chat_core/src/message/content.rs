//! Message content helpers
//!
//! Text classification applied when a message is constructed.

/// Marker opening or closing a fenced code block.
const CODE_FENCE: &str = "```";

/// Returns true when the text holds a fenced code block (an opening and a
/// closing marker).
pub fn contains_code_block(text: &str) -> bool {
    text.matches(CODE_FENCE).count() >= 2
}

/// Returns the body of the first fenced block, without the info string.
pub fn first_code_block(text: &str) -> Option<&str> {
    let start = text.find(CODE_FENCE)? + CODE_FENCE.len();
    let rest = &text[start..];
    let end = rest.find(CODE_FENCE)?;
    let block = &rest[..end];

    // Skip the language tag on the opening line, e.g. ```rust
    let body = match block.find('\n') {
        Some(newline) => &block[newline + 1..],
        None => block,
    };
    Some(body.trim_end_matches('\n'))
}
