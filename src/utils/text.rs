//! Cleanup of raw LLM output
//!
//! Models tend to wrap JSON and HTML in markdown code fences even when told not
//! to. Both helpers are pure and never fail: input without fences comes back
//! trimmed and otherwise unchanged.

const FENCE: &str = "```";
const JSON_FENCE: &str = "```json";
const HTML_FENCE: &str = "```html";

/// Extract the JSON payload from a fenced reply.
///
/// Takes the body of the first ```` ```json ```` block if there is one, else the
/// body of the first plain fenced block.
pub fn clean_json_response(content: &str) -> String {
    let body = if let Some((_, rest)) = content.split_once(JSON_FENCE) {
        rest.split(FENCE).next().unwrap_or(rest)
    } else if let Some((_, rest)) = content.split_once(FENCE) {
        rest.split(FENCE).next().unwrap_or(rest)
    } else {
        content
    };
    body.trim().to_string()
}

/// Strip every code-fence marker from an HTML reply
pub fn clean_html_response(content: &str) -> String {
    let cleaned = if content.contains(HTML_FENCE) {
        content.replace(HTML_FENCE, "").replace(FENCE, "")
    } else if content.contains(FENCE) {
        content.replace(FENCE, "")
    } else {
        content.to_string()
    };
    cleaned.trim().to_string()
}

/// Truncate to at most `max_chars` characters without splitting a code point
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// First `max_chars` characters for log lines
pub fn preview(text: &str, max_chars: usize) -> String {
    let head = truncate_chars(text, max_chars);
    if head.len() < text.len() {
        format!("{}...", head)
    } else {
        head.to_string()
    }
}
