//! Structural cleanup: trailing commas, raw control characters, unbalanced brackets

use super::truncation::close_truncated;
use std::fmt::Write;

/// Remove trailing commas, escape raw control characters inside strings
/// and close whatever brackets are still open
pub fn fix_structure(text: &str) -> String {
    close_truncated(&clean_tokens(text))
}

fn clean_tokens(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escape = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            if escape {
                escape = false;
                out.push(c);
                continue;
            }
            match c {
                '\\' => {
                    escape = true;
                    out.push(c);
                }
                '"' => {
                    in_string = false;
                    out.push(c);
                }
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                c if c.is_control() && (c as u32) < 0x20 => {
                    let _ = write!(out, "\\u{:04x}", c as u32);
                }
                _ => out.push(c),
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                let next = chars[i + 1..].iter().copied().find(|c| !c.is_whitespace());
                // Trailing (`,}`) or doubled (`,,`) commas are dropped
                if !matches!(next, Some('}' | ']' | ',')) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn fixed(text: &str) -> Value {
        serde_json::from_str(&fix_structure(text)).unwrap()
    }

    #[test]
    fn test_trailing_commas() {
        assert_eq!(fixed(r#"{"a": [1, 2,], "b": 3,}"#), json!({"a": [1, 2], "b": 3}));
        assert_eq!(fixed(r#"[1,, 2]"#), json!([1, 2]));
    }

    #[test]
    fn test_commas_inside_strings_survive() {
        assert_eq!(fixed(r#"{"a": "x,}",}"#), json!({"a": "x,}"}));
    }

    #[test]
    fn test_raw_control_characters() {
        assert_eq!(fixed("{\"a\": \"line one\nline two\ttab\"}"), json!({"a": "line one\nline two\ttab"}));
        assert_eq!(fixed("{\"a\": \"bell\u{7}\"}"), json!({"a": "bell\u{7}"}));
    }

    #[test]
    fn test_closes_remaining_brackets() {
        assert_eq!(fixed(r#"{"a": [1, 2,"#), json!({"a": [1, 2]}));
    }
}
