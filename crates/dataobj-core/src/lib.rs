//! # dataobj-core
//!
//! A semi-structured data tree for JSON-like test fixtures and protocol
//! payloads, with a fixture-compatible JSON writer and a streaming JSON reader.
//!
//! Nodes hold null, bool, integer or string values, ordered arrays, or keyed
//! objects. Object children keep insertion order, or ascending key order when
//! autosort is on. Children are reference-shared and copy-on-write; deep copies
//! are explicit.
//!
//! ## Quick start
//!
//! ```rust
//! use dataobj_core::{decode, encode};
//!
//! let tree = decode(r#"{"name":"Alice","scores":[95,87,92]}"#).unwrap();
//! assert_eq!(tree.at_key("name").unwrap().as_string().unwrap(), "Alice");
//! assert_eq!(tree.at_key("scores").unwrap().at(1).unwrap().as_int().unwrap(), 87);
//!
//! // Tree → compact JSON (roundtrip)
//! assert_eq!(encode(&tree, false, true), r#"{"name":"Alice","scores":[95,87,92]}"#);
//! ```
//!
//! ## Modules
//!
//! - [`object`]: the `DataObject` node and its mutation contract
//! - [`child`]: mutable child borrows that keep the parent's key index in step
//! - [`handle`]: reference-counted node handles (`Arc`, or `Rc` with `single-thread`)
//! - [`pointer`]: `(parent, key)` pointers resolved on every use
//! - [`encoder`]: tree → JSON text
//! - [`decoder`]: streaming JSON text → tree
//! - [`hooks`]: verifier, modifier and search callbacks
//! - [`interop`]: serde / `serde_json::Value` bridge
//! - [`error`]: error types
//! - [`types`]: node kinds

pub mod child;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod handle;
pub mod hooks;
mod index;
pub mod interop;
pub mod object;
pub mod pointer;
mod processors;
pub mod types;

pub use child::ChildMut;
pub use decoder::{decode, decode_with, read_stream, DecodeOptions, JsonReader};
pub use encoder::encode;
pub use error::{DataObjectError, NodeSnapshot, Result};
pub use handle::{Handle, ATOMIC_REFCOUNT};
pub use hooks::{ModifierOption, Traversal};
pub use object::DataObject;
pub use pointer::KeyPointer;
pub use types::DataType;
