//! JSON encoder: renders a tree as fixture-compatible JSON text.
//!
//! The output is byte-for-byte what existing fixtures and their hashes rely on,
//! which means a few deliberate departures from strict JSON:
//!
//! - **Indentation**: pretty mode indents 4 spaces per depth, puts every
//!   element on its own line and writes keys as `"key" : value`; compact mode
//!   writes `"key":value` with no whitespace at all.
//! - **Escaping**: only newline (`\n`) and tab (`\t`) are escaped inside
//!   strings. Quotes and backslashes pass through untouched.
//! - **Uninitialized**: rendered as the bare token `notinit`, a diagnostic
//!   marker that never belongs in an exchanged document.
//!
//! # Example
//! ```
//! use dataobj_core::{encode, DataObject, DataType, Handle};
//!
//! let mut root = DataObject::with_type(DataType::Object);
//! root.add_child(Handle::new(DataObject::keyed("s", "line1\nline2"))).unwrap();
//! assert_eq!(encode(&root, false, false), r#"{"s":"line1\nline2"}"#);
//! assert_eq!(encode(&root, true, false), "{\n    \"s\" : \"line1\\nline2\"\n}");
//! ```

use crate::object::DataObject;
use crate::types::{DataType, Scalar};

/// Encode `node` and its subtree.
///
/// With `suppress_own_key` the node's own key is left out; the flag only
/// applies to `node` itself, descendants always print their keys.
pub fn encode(node: &DataObject, pretty: bool, suppress_own_key: bool) -> String {
    let mut out = String::new();
    encode_node(node, 0, pretty, suppress_own_key, &mut out);
    out
}

fn encode_node(node: &DataObject, depth: usize, pretty: bool, suppress_key: bool, out: &mut String) {
    push_indent(depth, pretty, out);
    if !node.key.is_empty() && !suppress_key {
        encode_key(&node.key, pretty, out);
    }
    match (node.kind, &node.scalar) {
        (DataType::Uninitialized, _) => out.push_str("notinit"),
        (DataType::Null, _) => out.push_str("null"),
        (DataType::Bool, Scalar::Bool(b)) => out.push_str(if *b { "true" } else { "false" }),
        (DataType::Integer, Scalar::Integer(i)) => out.push_str(&i.to_string()),
        (DataType::String, Scalar::String(s)) => encode_string(s, out),
        (DataType::Object, _) => encode_container(node, '{', '}', depth, pretty, out),
        (DataType::Array, _) => encode_container(node, '[', ']', depth, pretty, out),
        // A scalar kind whose slot was never filled renders as its zero value.
        (DataType::Bool, _) => out.push_str("false"),
        (DataType::Integer, _) => out.push('0'),
        (DataType::String, _) => out.push_str("\"\""),
    }
}

/// `"key" : ` in pretty mode, `"key":` in compact mode. Keys are not escaped.
fn encode_key(key: &str, pretty: bool, out: &mut String) {
    out.push('"');
    out.push_str(key);
    out.push_str(if pretty { "\" : " } else { "\":" });
}

/// Emit open bracket, one child per element (comma separated, newline after
/// each in pretty mode), then the close bracket at the container's depth.
fn encode_container(
    node: &DataObject,
    open: char,
    close: char,
    depth: usize,
    pretty: bool,
    out: &mut String,
) {
    out.push(open);
    if pretty {
        out.push('\n');
    }
    let count = node.children.len();
    for (i, child) in node.children.iter().enumerate() {
        encode_node(child, depth + 1, pretty, false, out);
        if i + 1 != count {
            out.push(',');
        }
        if pretty {
            out.push('\n');
        }
    }
    push_indent(depth, pretty, out);
    out.push(close);
}

/// Quote a string value, escaping newline and tab only.
fn encode_string(s: &str, out: &mut String) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('"');
}

fn push_indent(depth: usize, pretty: bool, out: &mut String) {
    if pretty {
        for _ in 0..depth * 4 {
            out.push(' ');
        }
    }
}
