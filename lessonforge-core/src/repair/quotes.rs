//! Repairs for quote and comma artifacts inside otherwise structured output
//!
//! Three patterns are handled in one string-aware pass:
//! - a value string split at a comma, `"text", "more text"`, is merged back
//!   into one string when the second piece starts lowercase and is not a key;
//! - a key missing its opening quote (`, word":`) or both quotes (`, word:`)
//!   is quoted;
//! - a `"` inside a string that is not followed by a delimiter is escaped.

/// Per-container state; only objects distinguish keys from values
#[derive(Debug, Clone, Copy)]
struct Context {
    object: bool,
    expect_key: bool,
}

/// Apply the quote and comma repairs
pub fn fix_quotes_and_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 16);
    let mut stack: Vec<Context> = Vec::new();
    let mut in_string = false;
    let mut string_is_key = false;
    let mut escape = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if in_string {
            if escape {
                escape = false;
                out.push(c);
            } else if c == '\\' {
                escape = true;
                out.push(c);
            } else if c == '"' {
                if !closes_string(&chars, i + 1) {
                    out.push_str("\\\"");
                } else if let Some(resume) = split_continuation(&chars, i + 1)
                    .filter(|_| !string_is_key && in_object(&stack))
                {
                    // Keep the separator, drop the two quotes around it
                    out.extend(&chars[i + 1..resume - 1]);
                    i = resume;
                    continue;
                } else {
                    in_string = false;
                    out.push('"');
                }
            } else {
                out.push(c);
            }
            i += 1;
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                string_is_key = expecting_key(&stack);
                out.push(c);
            }
            '{' | '[' => {
                stack.push(Context {
                    object: c == '{',
                    expect_key: c == '{',
                });
                out.push(c);
            }
            '}' | ']' => {
                stack.pop();
                out.push(c);
            }
            ',' | ':' => {
                if let Some(top) = stack.last_mut().filter(|top| top.object) {
                    top.expect_key = c == ',';
                }
                out.push(c);
            }
            c if is_ident_start(c) && expecting_key(&stack) => {
                let end = ident_end(&chars, i);
                let ident: String = chars[i..end].iter().collect();
                match (chars.get(end).copied(), next_non_ws(&chars, end + 1)) {
                    // word":
                    (Some('"'), Some((_, ':'))) => {
                        out.push('"');
                        out.push_str(&ident);
                        out.push('"');
                        i = end + 1;
                        continue;
                    }
                    _ if matches!(next_non_ws(&chars, end), Some((_, ':'))) => {
                        out.push('"');
                        out.push_str(&ident);
                        out.push('"');
                        i = end;
                        continue;
                    }
                    _ => out.push(c),
                }
            }
            _ => out.push(c),
        }
        i += 1;
    }

    out
}

fn in_object(stack: &[Context]) -> bool {
    stack.last().is_some_and(|top| top.object)
}

fn expecting_key(stack: &[Context]) -> bool {
    stack.last().is_some_and(|top| top.object && top.expect_key)
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn ident_end(chars: &[char], start: usize) -> usize {
    chars[start..]
        .iter()
        .position(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
        .map_or(chars.len(), |offset| start + offset)
}

fn next_non_ws(chars: &[char], from: usize) -> Option<(usize, char)> {
    chars
        .iter()
        .enumerate()
        .skip(from)
        .find(|(_, c)| !c.is_whitespace())
        .map(|(i, c)| (i, *c))
}

/// Whether a `"` whose next character is at `from` ends its string
fn closes_string(chars: &[char], from: usize) -> bool {
    match next_non_ws(chars, from) {
        None => true,
        Some((_, ':' | '}' | ']')) => true,
        Some((comma, ',')) => starts_token(chars, comma + 1),
        Some(_) => false,
    }
}

/// Whether the text after a comma starts a key or value
fn starts_token(chars: &[char], from: usize) -> bool {
    match next_non_ws(chars, from) {
        None => true,
        Some((_, '"' | '{' | '[' | '}' | ']' | '-')) => true,
        Some((_, c)) if c.is_ascii_digit() => true,
        Some((at, c)) if is_ident_start(c) && is_bare_key(chars, at) => true,
        Some((at, _)) => ["true", "false", "null"].iter().any(|word| {
            let end = at + word.len();
            chars.len() >= end
                && chars[at..end].iter().copied().eq(word.chars())
                && chars.get(end).map_or(true, |c| !c.is_ascii_alphanumeric())
        }),
    }
}

/// `word":` or `word:` starting at `at`
fn is_bare_key(chars: &[char], at: usize) -> bool {
    let end = ident_end(chars, at);
    let after = if chars.get(end) == Some(&'"') { end + 1 } else { end };
    matches!(next_non_ws(chars, after), Some((_, ':')))
}

/// For `"a", "b"` positioned after the first closing quote, the index just
/// past the second opening quote when `"b"` starts lowercase and is not
/// followed by a colon
fn split_continuation(chars: &[char], from: usize) -> Option<usize> {
    let (comma, _) = next_non_ws(chars, from).filter(|(_, c)| *c == ',')?;
    let (open, _) = next_non_ws(chars, comma + 1).filter(|(_, c)| *c == '"')?;
    let close = string_end(chars, open + 1)?;
    if !chars[open + 1..close]
        .iter()
        .find(|c| !c.is_whitespace())
        .is_some_and(|c| c.is_lowercase())
    {
        return None;
    }
    match next_non_ws(chars, close + 1) {
        Some((_, ':')) => None,
        _ => Some(open + 1),
    }
}

/// Index of the unescaped `"` ending a string whose contents start at `from`
fn string_end(chars: &[char], from: usize) -> Option<usize> {
    let mut escape = false;
    for (i, c) in chars.iter().enumerate().skip(from) {
        if escape {
            escape = false;
        } else if *c == '\\' {
            escape = true;
        } else if *c == '"' {
            return Some(i);
        }
    }
    None
}
