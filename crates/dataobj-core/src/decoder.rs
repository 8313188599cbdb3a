//! Streaming JSON decoder: builds a tree from text fed in pieces.
//!
//! [`JsonReader`] is a character-driven state machine. Text may arrive in
//! arbitrary chunks (a line at a time from a pipe, say) and the caller asks
//! [`JsonReader::finalized`] whether the top-level value is complete before
//! reading more.
//!
//! # Key design decisions
//!
//! - **Explicit processor stack**: the entry dispatcher picks an object, array,
//!   string or literal processor from the first significant character. Nested
//!   values push a new processor; a finished value is popped and handed to the
//!   processor below. Deep documents never deepen the Rust call stack.
//! - **Literals end on the next character**: numbers and `true`/`false`/`null`
//!   are only known to be complete when a character that cannot continue them
//!   arrives. That character is then replayed to the parent. At end of input
//!   [`JsonReader::finish`] completes a pending top-level literal.
//! - **Stopper**: characters that end the document early when the reader sits
//!   on a shared stream that carries more than one JSON value. They are ignored
//!   inside string and literal tokens.
//! - **Integers only**: numbers must be integers that fit `i64`; the tree has
//!   no floating-point kind.
//!
//! # Example
//! ```
//! use dataobj_core::JsonReader;
//!
//! let mut reader = JsonReader::new().with_stopper("E");
//! reader.process_line(r#"{"x":"#).unwrap();
//! assert!(!reader.finalized());
//! reader.process_line("1}EXTRA").unwrap();
//! assert!(reader.finalized());
//! let tree = reader.finish().unwrap();
//! assert_eq!(tree.at_key("x").unwrap().as_int().unwrap(), 1);
//! ```

use std::io::BufRead;

use tracing::debug;

use crate::error::{DataObjectError, Result};
use crate::object::DataObject;
use crate::processors::{detect_json_node, is_ws, Cursor, NodeProcessor, Step};

/// Options for [`decode_with`] and [`read_stream`].
#[derive(Debug, Clone, Default)]
pub struct DecodeOptions {
    /// Characters that end the document early (outside string/literal tokens).
    pub stopper: String,
    /// Keep decoded objects ordered by key.
    pub autosort: bool,
}

/// Incremental JSON reader.
pub struct JsonReader {
    stopper: Vec<char>,
    autosort: bool,
    stack: Vec<Box<dyn NodeProcessor>>,
    result: Option<DataObject>,
    stopped: bool,
    failure: Option<DataObjectError>,
    cursor: Cursor,
}

impl Default for JsonReader {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonReader {
    pub fn new() -> Self {
        Self {
            stopper: Vec::new(),
            autosort: false,
            stack: Vec::new(),
            result: None,
            stopped: false,
            failure: None,
            cursor: Cursor::start(),
        }
    }

    pub fn with_options(options: &DecodeOptions) -> Self {
        Self::new()
            .with_stopper(&options.stopper)
            .with_autosort(options.autosort)
    }

    /// Characters of `stopper` end the document when met between tokens.
    pub fn with_stopper(mut self, stopper: &str) -> Self {
        self.stopper = stopper.chars().collect();
        self
    }

    /// Objects built by this reader keep their children ordered by key.
    pub fn with_autosort(mut self, autosort: bool) -> Self {
        self.autosort = autosort;
        self
    }

    /// The top-level value is structurally complete.
    pub fn finalized(&self) -> bool {
        self.result.is_some()
    }

    /// A stopper character was met; further input is ignored.
    pub fn stopped(&self) -> bool {
        self.stopped
    }

    /// The finished tree, once [`finalized`](Self::finalized).
    pub fn result(&self) -> Option<&DataObject> {
        self.result.as_ref()
    }

    /// Feed one line of input; a line break is implied after it.
    pub fn process_line(&mut self, line: &str) -> Result<()> {
        let line = line.strip_suffix('\n').unwrap_or(line);
        let line = line.strip_suffix('\r').unwrap_or(line);
        self.feed(line)?;
        self.feed_char('\n')
    }

    /// Feed a chunk of input. Chunks may split tokens anywhere.
    pub fn feed(&mut self, chunk: &str) -> Result<()> {
        for ch in chunk.chars() {
            if self.stopped {
                break;
            }
            self.feed_char(ch)?;
        }
        Ok(())
    }

    fn feed_char(&mut self, ch: char) -> Result<()> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        if self.stopped {
            return Ok(());
        }
        self.cursor.advance(ch);
        let outcome = self.step(ch);
        if let Err(err) = &outcome {
            debug!(error = %err, "discarding partial document");
            self.stack.clear();
            self.result = None;
            self.failure = Some(err.clone());
        }
        outcome
    }

    fn step(&mut self, ch: char) -> Result<()> {
        let at = self.cursor;
        let in_token = self.stack.last().is_some_and(|p| p.in_token());
        if !in_token && self.at_boundary(ch) {
            return Ok(());
        }
        loop {
            let Some(top) = self.stack.last_mut() else {
                return self.start_value(ch, at);
            };
            match top.feed(ch, at)? {
                Step::Consumed => return Ok(()),
                Step::Descend(child) => self.stack.push(child),
                Step::Complete(value) => {
                    self.stack.pop();
                    return self.deliver(value, at);
                }
                Step::CompleteRetry(value) => {
                    self.stack.pop();
                    self.deliver(value, at)?;
                    if self.at_boundary(ch) {
                        return Ok(());
                    }
                    if self.stack.is_empty() {
                        return self.start_value(ch, at);
                    }
                }
            }
        }
    }

    /// Handle `ch` where no token is open: stoppers, whitespace after a
    /// finished document. Returns `true` if `ch` was dealt with.
    fn at_boundary(&mut self, ch: char) -> bool {
        if self.stopper.contains(&ch) {
            debug!(stopper = %ch, line = self.cursor.line, column = self.cursor.column, "stopper reached");
            self.stopped = true;
            return true;
        }
        self.stack.is_empty() && is_ws(ch)
    }

    /// No processor is active: `ch` must start the top-level value.
    fn start_value(&mut self, ch: char, at: Cursor) -> Result<()> {
        if self.result.is_some() {
            return Err(at.error(format!("unexpected '{ch}' after the end of the document")));
        }
        let processor = detect_json_node(ch, self.autosort)
            .ok_or_else(|| at.error(format!("unexpected '{ch}' at start of document")))?;
        self.stack.push(processor);
        match self.stack.last_mut() {
            Some(top) => match top.feed(ch, at)? {
                Step::Consumed => Ok(()),
                // A fresh processor consumes its own first character.
                _ => Err(at.error(format!("unexpected '{ch}' at start of document"))),
            },
            None => Ok(()),
        }
    }

    fn deliver(&mut self, value: DataObject, at: Cursor) -> Result<()> {
        match self.stack.last_mut() {
            Some(parent) => parent.accept(value, at),
            None => {
                debug!(kind = %value.kind(), line = at.line, "document finalized");
                self.result = Some(value);
                Ok(())
            }
        }
    }

    /// Signal end of input and take the tree.
    ///
    /// A pending top-level number or literal is completed here. Anything else
    /// left open is a [`MalformedDocument`](DataObjectError::MalformedDocument).
    pub fn finish(mut self) -> Result<DataObject> {
        if let Some(err) = self.failure.take() {
            return Err(err);
        }
        let at = self.cursor;
        if self.result.is_none() && self.stack.len() == 1 {
            if let Some(mut top) = self.stack.pop() {
                match top.finish()? {
                    Some(value) => self.result = Some(value),
                    None => self.stack.push(top),
                }
            }
        }
        if let Some(result) = self.result {
            return Ok(result);
        }
        Err(match self.stack.last() {
            Some(top) => at.error(format!("unexpected end of input inside {}", top.describe())),
            None => at.error("empty document"),
        })
    }
}

/// Decode a complete JSON text.
pub fn decode(text: &str) -> Result<DataObject> {
    decode_with(text, &DecodeOptions::default())
}

/// Decode a complete JSON text with `options`.
pub fn decode_with(text: &str, options: &DecodeOptions) -> Result<DataObject> {
    let mut reader = JsonReader::with_options(options);
    reader.feed(text)?;
    reader.finish()
}

/// Read lines from `input` until the document is finalized, a stopper is
/// met or the input ends, then return the tree.
pub fn read_stream<R: BufRead>(mut input: R, options: &DecodeOptions) -> Result<DataObject> {
    let mut reader = JsonReader::with_options(options);
    let mut line = String::new();
    while !reader.finalized() && !reader.stopped() {
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        reader.process_line(&line)?;
    }
    reader.finish()
}
