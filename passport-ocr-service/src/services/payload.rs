//! Fence stripping for model output.
//!
//! Models tend to wrap JSON in markdown code fences. [`extract_json_payload`]
//! returns the text worth handing to the JSON parser.

const FENCE: &str = "```";
const JSON_FENCE: &str = "```json";

/// Extract the JSON payload from a model reply.
///
/// Precedence: the first "```json" fence, then the first generic "```"
/// fence, then the raw text unmodified. A fence that never closes runs to
/// the end of the text. Fenced payloads are trimmed; a bare language tag on
/// the opening line of a generic fence is dropped.
pub fn extract_json_payload(text: &str) -> &str {
    if let Some(start) = text.find(JSON_FENCE) {
        return fenced_body(&text[start + JSON_FENCE.len()..]).trim();
    }

    if let Some(start) = text.find(FENCE) {
        let body = fenced_body(&text[start + FENCE.len()..]);
        return strip_language_tag(body).trim();
    }

    text
}

/// Everything up to the closing fence, or to the end when there is none.
fn fenced_body(after_open: &str) -> &str {
    match after_open.find(FENCE) {
        Some(end) => &after_open[..end],
        None => after_open,
    }
}

fn strip_language_tag(body: &str) -> &str {
    match body.split_once('\n') {
        Some((first_line, rest)) if is_language_tag(first_line.trim_end_matches('\r')) => rest,
        _ => body,
    }
}

fn is_language_tag(line: &str) -> bool {
    !line.is_empty()
        && line
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+'))
}
