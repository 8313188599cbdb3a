//! Error types for tree access, mutation and JSON decoding.

use std::fmt;

use thiserror::Error;

use crate::object::DataObject;
use crate::types::DataType;

/// Diagnostic picture of the node an operation failed on: its key, its kind
/// and its pretty JSON rendering at the time of the failure.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSnapshot {
    pub key: String,
    pub kind: DataType,
    pub json: String,
}

impl NodeSnapshot {
    pub fn of(node: &DataObject) -> Self {
        Self {
            key: node.key().to_string(),
            kind: node.kind(),
            json: node.as_json(true, false),
        }
    }
}

impl fmt::Display for NodeSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "key: '{}' type: '{}'\n{}", self.key, self.kind, self.json)
    }
}

/// Errors raised by the tree and by the JSON reader.
///
/// The first four variants are contract violations: the caller asked the tree
/// for something its current shape does not allow.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataObjectError {
    /// A typed accessor or container operation was used on the wrong kind.
    #[error("type mismatch in {op}: expected {expected}\n{node}")]
    TypeMismatch {
        op: &'static str,
        expected: &'static str,
        node: NodeSnapshot,
    },

    /// Positional access beyond the child sequence.
    #[error("index {index} out of range (len {len}) in {op}\n{node}")]
    OutOfRange {
        op: &'static str,
        index: usize,
        len: usize,
        node: NodeSnapshot,
    },

    /// Keyed access for a key the node does not hold.
    #[error("key '{missing}' not found in {op}\n{node}")]
    KeyNotFound {
        op: &'static str,
        missing: String,
        node: NodeSnapshot,
    },

    /// Attempt to re-type or duplicate an already initialized slot.
    #[error("overwrite violation in {op}: {reason}\n{node}")]
    OverwriteViolation {
        op: &'static str,
        reason: String,
        node: NodeSnapshot,
    },

    /// A handle with no node behind it was dereferenced or attached.
    #[error("empty handle used in {0}")]
    EmptyHandle(&'static str),

    /// The JSON reader could not tokenize its input into a value.
    /// Line and column are 1-based.
    #[error("malformed document at line {line}, column {column}: {message}")]
    MalformedDocument {
        line: usize,
        column: usize,
        message: String,
    },

    /// Reading the input stream failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// A foreign value has no counterpart in the tree (e.g. a fractional number).
    #[error("unrepresentable value: {0}")]
    Unrepresentable(String),
}

impl From<std::io::Error> for DataObjectError {
    fn from(err: std::io::Error) -> Self {
        DataObjectError::Io(err.to_string())
    }
}

/// Convenience alias used throughout dataobj-core.
pub type Result<T> = std::result::Result<T, DataObjectError>;
