/// Appended to any text field cut down to the body size bound
pub const TRUNCATION_MARKER: &str = "...[TRUNCATED]";

/// Default size bound for bodies, console messages and DOM values (8 KiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 8 * 1024;

/// Default size bound for bodies of a single network event lookup (1 MiB)
pub const DEFAULT_MAX_DETAIL_BODY_BYTES: usize = 1024 * 1024;

/// Cut `text` to at most `max_bytes` bytes (on a char boundary) and append
/// [`TRUNCATION_MARKER`]. Text within the bound is returned unchanged.
pub fn truncate_text(text: String, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text;
    }

    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }

    let mut truncated = String::with_capacity(end + TRUNCATION_MARKER.len());
    truncated.push_str(&text[..end]);
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}

pub(crate) fn truncate_opt(text: Option<String>, max_bytes: usize) -> Option<String> {
    text.map(|t| truncate_text(t, max_bytes))
}
