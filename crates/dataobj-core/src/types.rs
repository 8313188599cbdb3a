//! Node kinds of the data tree.

use std::fmt;

/// The kind tag carried by every [`DataObject`](crate::DataObject).
///
/// `Uninitialized` marks a slot that was reserved (for example by
/// [`DataObject::entry`](crate::DataObject::entry)) but never assigned. It is
/// a real, observable state and is kept apart from `Null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataType {
    #[default]
    Uninitialized,
    Null,
    Bool,
    Integer,
    String,
    Array,
    Object,
}

impl DataType {
    /// Short name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            DataType::Uninitialized => "notinit",
            DataType::Null => "null",
            DataType::Bool => "bool",
            DataType::Integer => "int",
            DataType::String => "string",
            DataType::Array => "array",
            DataType::Object => "object",
        }
    }

    /// Kinds that carry a value in the scalar slot.
    pub fn is_scalar(self) -> bool {
        matches!(self, DataType::Bool | DataType::Integer | DataType::String)
    }

    pub fn is_container(self) -> bool {
        matches!(self, DataType::Array | DataType::Object)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Value slot of a scalar node. Only meaningful when the node's kind matches.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) enum Scalar {
    #[default]
    Empty,
    Bool(bool),
    Integer(i64),
    String(String),
}

impl Scalar {
    /// Zero value for a freshly typed scalar node.
    pub(crate) fn zero(kind: DataType) -> Self {
        match kind {
            DataType::Bool => Scalar::Bool(false),
            DataType::Integer => Scalar::Integer(0),
            DataType::String => Scalar::String(String::new()),
            _ => Scalar::Empty,
        }
    }
}
