//! Extraction of the JSON document from surrounding noise

use super::scan::scan;

const FENCE: &str = "```";

/// Strip a BOM, markdown code fences and prose around the first JSON document
///
/// Prose after a balanced top-level value is dropped; a document that never
/// closes is kept to the end for the truncation stage.
pub fn extract_json(text: &str) -> String {
    let text = text.trim_start_matches('\u{feff}').trim();
    let text = strip_code_fences(text);

    let Some(start) = find_document_start(text) else {
        return text.to_string();
    };

    let candidate = &text[start..];
    match scan(candidate).root_end {
        Some(end) => candidate[..end].to_string(),
        None => candidate.trim_end().to_string(),
    }
}

/// Contents of the first fenced block, or the text itself when unfenced
fn strip_code_fences(text: &str) -> &str {
    let Some(open) = text.find(FENCE) else {
        return text;
    };

    // Skip the info string (```json)
    let after_fence = &text[open + FENCE.len()..];
    let body = match after_fence.find('\n') {
        Some(newline) => &after_fence[newline + 1..],
        None => after_fence.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };

    match body.find(FENCE) {
        Some(close) => body[..close].trim(),
        None => body.trim(),
    }
}

/// Byte offset of the first `{`, or of a `[` that opens a plausible document
fn find_document_start(text: &str) -> Option<usize> {
    if text.starts_with(['{', '[']) {
        return Some(0);
    }

    text.char_indices().find_map(|(i, c)| match c {
        '{' => Some(i),
        '[' => {
            let next = text[i + 1..].trim_start().chars().next();
            matches!(next, Some('{' | '[' | '"' | ']')).then_some(i)
        }
        _ => None,
    })
}
