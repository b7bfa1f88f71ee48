//! Closing of truncated documents
//!
//! A model that hits its token limit stops mid-token. The fix is to close
//! an open value string, or otherwise cut back to the last complete value,
//! and then append the closers for every open container.

use super::scan::{scan, OpenToken};
use tracing::trace;

/// Close a truncated document; text that is not truncated comes back unchanged
pub fn close_truncated(text: &str) -> String {
    let trimmed = text.trim_end();
    let state = scan(trimmed);
    if !state.is_truncated() {
        return text.to_string();
    }

    let mut repaired = trimmed.to_string();
    if state.open == OpenToken::ValueString {
        drop_partial_escape(&mut repaired, state.escape);
        repaired.push('"');
    }

    let mut state = scan(&repaired);
    if state.last_complete != Some(repaired.len()) {
        match state.last_complete {
            Some(end) => {
                trace!(cut_at = end, dropped = repaired.len() - end, "cutting back to last complete value");
                repaired.truncate(end);
                state = scan(&repaired);
            }
            None => return text.to_string(),
        }
    }

    repaired.push_str(&state.closers());
    repaired
}

/// Remove an escape sequence cut off at the end of an open string
///
/// Handles a lone trailing backslash, a partial `\uXXXX` and a high
/// surrogate whose low half never arrived.
fn drop_partial_escape(text: &mut String, pending_backslash: bool) {
    if pending_backslash {
        text.pop();
        return;
    }

    let Some(pos) = text.rfind("\\u") else {
        return;
    };
    let tail = &text[pos + 2..];
    if !tail.chars().all(|c| c.is_ascii_hexdigit()) {
        return;
    }

    let partial = tail.len() < 4;
    let lone_high_surrogate = tail.len() == 4
        && u16::from_str_radix(tail, 16).is_ok_and(|unit| (0xD800..=0xDBFF).contains(&unit));

    // An even run of backslashes means this one is itself escaped text
    let backslashes = text[..=pos].chars().rev().take_while(|&c| c == '\\').count();
    if (partial || lone_high_surrogate) && backslashes % 2 == 1 {
        text.truncate(pos);
    }
}
