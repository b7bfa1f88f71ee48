//! String-aware bracket scanner shared by the repair stages
//!
//! Walks the text once, tracking string state, an open-container stack and
//! what each container expects next. It never fails: stray closers are
//! ignored and mismatched ones pop down to their partner.

/// Container kind on the bracket stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Container {
    Object,
    Array,
}

impl Container {
    pub(crate) fn closer(self) -> char {
        match self {
            Container::Object => '}',
            Container::Array => ']',
        }
    }
}

/// What a container expects at the current position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Expect {
    Key,
    Colon,
    Value,
    CommaOrEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Frame {
    pub container: Container,
    pub expect: Expect,
}

/// Token still open when the text ran out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OpenToken {
    None,
    KeyString,
    ValueString,
    Literal { start: usize },
}

/// Result of scanning a piece of text
#[derive(Debug, Clone)]
pub(crate) struct ScanState {
    pub stack: Vec<Frame>,
    pub open: OpenToken,
    /// A backslash escape started on the last character
    pub escape: bool,
    /// Byte offset after which the prefix is a complete document once closers are appended
    pub last_complete: Option<usize>,
    /// Byte offset where the top-level value ended
    pub root_end: Option<usize>,
}

impl ScanState {
    fn new() -> Self {
        Self {
            stack: Vec::new(),
            open: OpenToken::None,
            escape: false,
            last_complete: None,
            root_end: None,
        }
    }

    /// The text ended inside a string, literal or container
    pub(crate) fn is_truncated(&self) -> bool {
        self.root_end.is_none() && (!self.stack.is_empty() || self.open != OpenToken::None)
    }

    /// Closers for every open container, innermost first
    pub(crate) fn closers(&self) -> String {
        self.stack.iter().rev().map(|f| f.container.closer()).collect()
    }

    fn expecting_key(&self) -> bool {
        matches!(
            self.stack.last(),
            Some(Frame {
                container: Container::Object,
                expect: Expect::Key
            })
        )
    }

    fn expecting_value(&self) -> bool {
        match self.stack.last() {
            Some(frame) => frame.expect == Expect::Value,
            None => self.root_end.is_none(),
        }
    }

    fn complete_value(&mut self, end: usize) {
        match self.stack.last_mut() {
            Some(frame) => frame.expect = Expect::CommaOrEnd,
            None => self.root_end = Some(end),
        }
        self.last_complete = Some(end);
    }

    fn open_container(&mut self, container: Container, at: usize) {
        let expect = match container {
            Container::Object => Expect::Key,
            Container::Array => Expect::Value,
        };
        self.stack.push(Frame { container, expect });
        self.last_complete = Some(at + 1);
    }

    fn close_container(&mut self, container: Container, at: usize) {
        if let Some(pos) = self.stack.iter().rposition(|f| f.container == container) {
            self.stack.truncate(pos);
            self.complete_value(at + 1);
        }
    }
}

/// Characters that may appear in a bare literal (number, true, false, null)
pub(crate) fn is_literal_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, ',' | ':' | '[' | ']' | '{' | '}' | '"')
}

/// Whether `text` is a complete JSON number or keyword
pub(crate) fn is_complete_literal(text: &str) -> bool {
    match text {
        "true" | "false" | "null" => true,
        _ => {
            text.ends_with(|c: char| c.is_ascii_digit())
                && serde_json::from_str::<serde_json::Number>(text).is_ok()
        }
    }
}

/// Scan `text` and report its structural state at the end
pub(crate) fn scan(text: &str) -> ScanState {
    let mut state = ScanState::new();

    for (i, c) in text.char_indices() {
        match state.open {
            OpenToken::KeyString | OpenToken::ValueString => {
                if state.escape {
                    state.escape = false;
                } else if c == '\\' {
                    state.escape = true;
                } else if c == '"' {
                    let was_key = state.open == OpenToken::KeyString;
                    state.open = OpenToken::None;
                    if was_key {
                        if let Some(frame) = state.stack.last_mut() {
                            frame.expect = Expect::Colon;
                        }
                    } else {
                        state.complete_value(i + 1);
                    }
                }
                continue;
            }
            OpenToken::Literal { .. } => {
                if is_literal_char(c) {
                    continue;
                }
                state.open = OpenToken::None;
                state.complete_value(i);
            }
            OpenToken::None => {}
        }

        if state.root_end.is_some() {
            break;
        }

        match c {
            '"' => {
                state.open = if state.expecting_key() {
                    OpenToken::KeyString
                } else {
                    OpenToken::ValueString
                };
            }
            '{' => state.open_container(Container::Object, i),
            '[' => state.open_container(Container::Array, i),
            '}' => state.close_container(Container::Object, i),
            ']' => state.close_container(Container::Array, i),
            ':' => {
                if let Some(frame) = state.stack.last_mut() {
                    if frame.expect == Expect::Colon {
                        frame.expect = Expect::Value;
                    }
                }
            }
            ',' => {
                if let Some(frame) = state.stack.last_mut() {
                    if frame.expect == Expect::CommaOrEnd {
                        frame.expect = match frame.container {
                            Container::Object => Expect::Key,
                            Container::Array => Expect::Value,
                        };
                    }
                }
            }
            c if c.is_whitespace() => {}
            _ => {
                if state.expecting_value() {
                    state.open = OpenToken::Literal { start: i };
                }
            }
        }
    }

    if let OpenToken::Literal { start } = state.open {
        if is_complete_literal(&text[start..]) {
            state.open = OpenToken::None;
            state.complete_value(text.len());
        }
    }

    state
}
