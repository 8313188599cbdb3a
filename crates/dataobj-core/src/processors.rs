//! Per-kind sub-processors driven by [`JsonReader`](crate::JsonReader).
//!
//! Each processor owns the node it is building and consumes one character at
//! a time. Containers never recurse on their own: when they meet the start of
//! a nested value they ask the reader to push a new processor
//! ([`Step::Descend`]) and later receive the finished child through
//! [`NodeProcessor::accept`].

use crate::error::{DataObjectError, Result};
use crate::handle::Handle;
use crate::object::DataObject;
use crate::types::DataType;

/// Position of the character being processed (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Cursor {
    pub line: usize,
    pub column: usize,
}

impl Cursor {
    pub(crate) fn start() -> Self {
        Self { line: 1, column: 0 }
    }

    pub(crate) fn advance(&mut self, ch: char) {
        if ch == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
    }

    pub(crate) fn error(self, message: impl Into<String>) -> DataObjectError {
        DataObjectError::MalformedDocument {
            line: self.line,
            column: self.column,
            message: message.into(),
        }
    }
}

/// What the reader should do after a processor saw a character.
pub(crate) enum Step {
    /// The character was consumed.
    Consumed,
    /// Push this processor and hand it the same character.
    Descend(Box<dyn NodeProcessor>),
    /// The value is complete and the character was its last one.
    Complete(DataObject),
    /// The value is complete but the character belongs to the parent.
    CompleteRetry(DataObject),
}

pub(crate) trait NodeProcessor {
    fn feed(&mut self, ch: char, at: Cursor) -> Result<Step>;

    /// Receive a finished child value.
    fn accept(&mut self, child: DataObject, at: Cursor) -> Result<()> {
        let _ = child;
        Err(at.error(format!("{} cannot hold a nested value", self.describe())))
    }

    /// Complete the value at end of input, if the grammar allows it.
    fn finish(&mut self) -> Result<Option<DataObject>> {
        Ok(None)
    }

    /// Inside a string or literal token, where stopper characters are content.
    fn in_token(&self) -> bool {
        false
    }

    fn describe(&self) -> &'static str;
}

pub(crate) fn is_ws(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r')
}

/// Entry dispatcher: choose the processor for a value starting with `ch`.
pub(crate) fn detect_json_node(ch: char, autosort: bool) -> Option<Box<dyn NodeProcessor>> {
    match ch {
        '{' => Some(Box::new(ObjectProcessor::new(autosort))),
        '[' => Some(Box::new(ArrayProcessor::new(autosort))),
        '"' => Some(Box::new(StringProcessor::new())),
        '-' | '0'..='9' | 'a'..='z' | 'A'..='Z' => Some(Box::new(LiteralProcessor::new())),
        _ => None,
    }
}

// ============================================================================
// String scanning (shared by string values and object keys)
// ============================================================================

#[derive(Debug, Default)]
enum Escape {
    #[default]
    None,
    Pending,
    Unicode { digits: u8, code: u32 },
}

/// Accumulates the body of a quoted string after its opening quote.
#[derive(Debug, Default)]
struct StringScanner {
    buf: String,
    escape: Escape,
    high_surrogate: Option<u32>,
}

impl StringScanner {
    /// Returns `true` once the closing quote was consumed.
    fn feed(&mut self, ch: char, at: Cursor) -> Result<bool> {
        if self.high_surrogate.is_some() {
            let pairing = match self.escape {
                Escape::None => ch == '\\',
                Escape::Pending => ch == 'u',
                Escape::Unicode { .. } => true,
            };
            if !pairing {
                return Err(at.error("high surrogate not followed by a \\u escape"));
            }
        }
        match self.escape {
            Escape::None => match ch {
                '"' => return Ok(true),
                '\\' => self.escape = Escape::Pending,
                '\n' | '\r' => return Err(at.error("unterminated string")),
                _ => self.buf.push(ch),
            },
            Escape::Pending => {
                self.escape = Escape::None;
                match ch {
                    'n' => self.buf.push('\n'),
                    't' => self.buf.push('\t'),
                    'r' => self.buf.push('\r'),
                    'b' => self.buf.push('\u{8}'),
                    'f' => self.buf.push('\u{c}'),
                    '"' | '\\' | '/' => self.buf.push(ch),
                    'u' => self.escape = Escape::Unicode { digits: 0, code: 0 },
                    _ => return Err(at.error(format!("invalid escape sequence '\\{ch}'"))),
                }
            }
            Escape::Unicode { digits, code } => {
                let digit = ch
                    .to_digit(16)
                    .ok_or_else(|| at.error(format!("invalid hex digit '{ch}' in \\u escape")))?;
                let code = code * 16 + digit;
                if digits + 1 < 4 {
                    self.escape = Escape::Unicode {
                        digits: digits + 1,
                        code,
                    };
                } else {
                    self.escape = Escape::None;
                    self.push_code_unit(code, at)?;
                }
            }
        }
        Ok(false)
    }

    fn push_code_unit(&mut self, code: u32, at: Cursor) -> Result<()> {
        let decoded = match (self.high_surrogate.take(), code) {
            (None, 0xD800..=0xDBFF) => {
                self.high_surrogate = Some(code);
                return Ok(());
            }
            (Some(high), 0xDC00..=0xDFFF) => {
                char::from_u32(0x10000 + ((high - 0xD800) << 10) + (code - 0xDC00))
            }
            (None, _) => char::from_u32(code),
            (Some(_), _) => None,
        };
        let ch = decoded.ok_or_else(|| at.error(format!("invalid unicode escape \\u{code:04x}")))?;
        self.buf.push(ch);
        Ok(())
    }

    fn take(&mut self) -> String {
        std::mem::take(&mut self.buf)
    }
}

// ============================================================================
// Object
// ============================================================================

enum ObjectState {
    Open,
    KeyOrClose,
    Key(StringScanner),
    Colon,
    Value,
    CommaOrClose,
    NextKey,
}

pub(crate) struct ObjectProcessor {
    node: DataObject,
    state: ObjectState,
    pending_key: String,
}

impl ObjectProcessor {
    fn new(autosort: bool) -> Self {
        let mut node = DataObject::with_type(DataType::Object);
        node.set_autosort(autosort);
        Self {
            node,
            state: ObjectState::Open,
            pending_key: String::new(),
        }
    }
}

impl NodeProcessor for ObjectProcessor {
    fn feed(&mut self, ch: char, at: Cursor) -> Result<Step> {
        match &mut self.state {
            ObjectState::Open => {
                if ch != '{' {
                    return Err(at.error(format!("expected '{{', found '{ch}'")));
                }
                self.state = ObjectState::KeyOrClose;
            }
            ObjectState::KeyOrClose | ObjectState::NextKey if is_ws(ch) => {}
            ObjectState::KeyOrClose if ch == '}' => {
                return Ok(Step::Complete(std::mem::take(&mut self.node)));
            }
            ObjectState::KeyOrClose | ObjectState::NextKey => {
                if ch != '"' {
                    return Err(at.error(format!("expected object key, found '{ch}'")));
                }
                self.state = ObjectState::Key(StringScanner::default());
            }
            ObjectState::Key(scanner) => {
                if scanner.feed(ch, at)? {
                    self.pending_key = scanner.take();
                    if self.pending_key.is_empty() {
                        return Err(at.error("empty object key"));
                    }
                    self.state = ObjectState::Colon;
                }
            }
            ObjectState::Colon => {
                if ch == ':' {
                    self.state = ObjectState::Value;
                } else if !is_ws(ch) {
                    return Err(at.error(format!(
                        "expected ':' after key '{}', found '{ch}'",
                        self.pending_key
                    )));
                }
            }
            ObjectState::Value => {
                if is_ws(ch) {
                    return Ok(Step::Consumed);
                }
                let child = detect_json_node(ch, self.node.is_autosort()).ok_or_else(|| {
                    at.error(format!(
                        "expected value for key '{}', found '{ch}'",
                        self.pending_key
                    ))
                })?;
                self.state = ObjectState::CommaOrClose;
                return Ok(Step::Descend(child));
            }
            ObjectState::CommaOrClose => match ch {
                ',' => self.state = ObjectState::NextKey,
                '}' => return Ok(Step::Complete(std::mem::take(&mut self.node))),
                _ if is_ws(ch) => {}
                _ => return Err(at.error(format!("expected ',' or '}}' in object, found '{ch}'"))),
            },
        }
        Ok(Step::Consumed)
    }

    fn accept(&mut self, child: DataObject, at: Cursor) -> Result<()> {
        let key = std::mem::take(&mut self.pending_key);
        if self.node.contains_key(&key) {
            return Err(at.error(format!("duplicate key '{key}'")));
        }
        self.node
            .add_child_keyed(key, Handle::new(child))
            .map(|_| ())
            .map_err(|e| at.error(e.to_string()))
    }

    fn in_token(&self) -> bool {
        matches!(self.state, ObjectState::Key(_))
    }

    fn describe(&self) -> &'static str {
        "object"
    }
}

// ============================================================================
// Array
// ============================================================================

enum ArrayState {
    Open,
    ValueOrClose,
    Value,
    CommaOrClose,
}

pub(crate) struct ArrayProcessor {
    node: DataObject,
    state: ArrayState,
}

impl ArrayProcessor {
    fn new(autosort: bool) -> Self {
        let mut node = DataObject::with_type(DataType::Array);
        node.set_autosort(autosort);
        Self {
            node,
            state: ArrayState::Open,
        }
    }
}

impl NodeProcessor for ArrayProcessor {
    fn feed(&mut self, ch: char, at: Cursor) -> Result<Step> {
        match self.state {
            ArrayState::Open => {
                if ch != '[' {
                    return Err(at.error(format!("expected '[', found '{ch}'")));
                }
                self.state = ArrayState::ValueOrClose;
            }
            ArrayState::ValueOrClose | ArrayState::Value if is_ws(ch) => {}
            ArrayState::ValueOrClose if ch == ']' => {
                return Ok(Step::Complete(std::mem::take(&mut self.node)));
            }
            ArrayState::ValueOrClose | ArrayState::Value => {
                let child = detect_json_node(ch, self.node.is_autosort())
                    .ok_or_else(|| at.error(format!("expected array element, found '{ch}'")))?;
                self.state = ArrayState::CommaOrClose;
                return Ok(Step::Descend(child));
            }
            ArrayState::CommaOrClose => match ch {
                ',' => self.state = ArrayState::Value,
                ']' => return Ok(Step::Complete(std::mem::take(&mut self.node))),
                _ if is_ws(ch) => {}
                _ => return Err(at.error(format!("expected ',' or ']' in array, found '{ch}'"))),
            },
        }
        Ok(Step::Consumed)
    }

    fn accept(&mut self, child: DataObject, at: Cursor) -> Result<()> {
        self.node
            .add_array_element(Handle::new(child))
            .map(|_| ())
            .map_err(|e| at.error(e.to_string()))
    }

    fn describe(&self) -> &'static str {
        "array"
    }
}

// ============================================================================
// String
// ============================================================================

pub(crate) struct StringProcessor {
    opened: bool,
    scanner: StringScanner,
}

impl StringProcessor {
    fn new() -> Self {
        Self {
            opened: false,
            scanner: StringScanner::default(),
        }
    }
}

impl NodeProcessor for StringProcessor {
    fn feed(&mut self, ch: char, at: Cursor) -> Result<Step> {
        if !self.opened {
            if ch != '"' {
                return Err(at.error(format!("expected '\"', found '{ch}'")));
            }
            self.opened = true;
            return Ok(Step::Consumed);
        }
        if self.scanner.feed(ch, at)? {
            return Ok(Step::Complete(DataObject::from(self.scanner.take())));
        }
        Ok(Step::Consumed)
    }

    fn in_token(&self) -> bool {
        self.opened
    }

    fn describe(&self) -> &'static str {
        "string"
    }
}

// ============================================================================
// Numbers and bare literals
// ============================================================================

/// Collects a bare token (`123`, `-7`, `true`, `false`, `null`) until a
/// character that cannot continue it.
pub(crate) struct LiteralProcessor {
    token: String,
    started: Cursor,
}

impl LiteralProcessor {
    fn new() -> Self {
        Self {
            token: String::new(),
            started: Cursor::start(),
        }
    }

    fn build(&self) -> Result<DataObject> {
        let at = self.started;
        match self.token.as_str() {
            "true" => return Ok(DataObject::from(true)),
            "false" => return Ok(DataObject::from(false)),
            "null" => return Ok(DataObject::with_type(DataType::Null)),
            _ => {}
        }
        let digits = self.token.strip_prefix('-').unwrap_or(&self.token);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            if self.token.starts_with(|c: char| c == '-' || c.is_ascii_digit()) {
                return Err(at.error(format!("unsupported number '{}'", self.token)));
            }
            return Err(at.error(format!("invalid literal '{}'", self.token)));
        }
        self.token
            .parse::<i64>()
            .map(DataObject::from)
            .map_err(|_| at.error(format!("integer '{}' out of range", self.token)))
    }
}

fn continues_literal(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '-' | '+' | '.')
}

impl NodeProcessor for LiteralProcessor {
    fn feed(&mut self, ch: char, at: Cursor) -> Result<Step> {
        if self.token.is_empty() {
            self.started = at;
        }
        if continues_literal(ch) {
            self.token.push(ch);
            return Ok(Step::Consumed);
        }
        Ok(Step::CompleteRetry(self.build()?))
    }

    fn finish(&mut self) -> Result<Option<DataObject>> {
        self.build().map(Some)
    }

    fn in_token(&self) -> bool {
        true
    }

    fn describe(&self) -> &'static str {
        "literal"
    }
}
