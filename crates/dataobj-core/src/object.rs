//! The tagged value tree.
//!
//! A [`DataObject`] is one node: a kind tag, an optional key naming its slot in
//! the parent, a scalar slot for `Bool`/`Integer`/`String` nodes, and for
//! containers an ordered child vector plus a key index. Children are shared
//! pointers; `Clone` is therefore shallow and cheap, while [`DataObject::copy`]
//! produces a fully independent subtree.
//!
//! # Example
//! ```
//! use dataobj_core::{DataObject, DataType, Handle};
//!
//! let mut root = DataObject::with_type(DataType::Object);
//! root.set_autosort(true);
//! root.add_child(Handle::new(DataObject::keyed("c", "x"))).unwrap();
//! root.add_child(Handle::new(DataObject::keyed("a", 1))).unwrap();
//! root.entry("b").unwrap().set_bool(true).unwrap();
//!
//! let keys: Vec<&str> = root.keys().collect();
//! assert_eq!(keys, ["a", "b", "c"]);
//! assert_eq!(root.as_json(false, false), r#"{"a":1,"b":true,"c":"x"}"#);
//! ```

use std::fmt;

use tracing::trace;

use crate::child::ChildMut;
use crate::encoder;
use crate::error::{DataObjectError, NodeSnapshot, Result};
use crate::handle::{Handle, Shared};
use crate::index::{find_ordered_key_position, KeyIndex};
use crate::pointer::KeyPointer;
use crate::types::{DataType, Scalar};

/// A node of the data tree.
#[derive(Debug, Clone, Default)]
pub struct DataObject {
    pub(crate) kind: DataType,
    pub(crate) key: String,
    pub(crate) scalar: Scalar,
    pub(crate) children: Vec<Shared<DataObject>>,
    pub(crate) index: KeyIndex,
    pub(crate) allow_overwrite: bool,
    pub(crate) autosort: bool,
}

// ============================================================================
// Construction
// ============================================================================

impl DataObject {
    /// A bare `Uninitialized` node.
    pub fn new() -> Self {
        Self::default()
    }

    /// A node of `kind`. Scalar kinds start at their zero value.
    pub fn with_type(kind: DataType) -> Self {
        Self {
            kind,
            scalar: Scalar::zero(kind),
            ..Self::default()
        }
    }

    /// A scalar (or any node) carrying `key`.
    pub fn keyed(key: impl Into<String>, value: impl Into<DataObject>) -> Self {
        let mut node = value.into();
        node.key = key.into();
        node
    }
}

impl From<&str> for DataObject {
    fn from(value: &str) -> Self {
        DataObject::from(value.to_string())
    }
}

impl From<String> for DataObject {
    fn from(value: String) -> Self {
        Self {
            kind: DataType::String,
            scalar: Scalar::String(value),
            ..Self::default()
        }
    }
}

impl From<i64> for DataObject {
    fn from(value: i64) -> Self {
        Self {
            kind: DataType::Integer,
            scalar: Scalar::Integer(value),
            ..Self::default()
        }
    }
}

impl From<i32> for DataObject {
    fn from(value: i32) -> Self {
        DataObject::from(i64::from(value))
    }
}

impl From<bool> for DataObject {
    fn from(value: bool) -> Self {
        Self {
            kind: DataType::Bool,
            scalar: Scalar::Bool(value),
            ..Self::default()
        }
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

impl DataObject {
    pub(crate) fn type_mismatch(&self, op: &'static str, expected: &'static str) -> DataObjectError {
        DataObjectError::TypeMismatch {
            op,
            expected,
            node: NodeSnapshot::of(self),
        }
    }

    pub(crate) fn out_of_range(&self, op: &'static str, index: usize) -> DataObjectError {
        DataObjectError::OutOfRange {
            op,
            index,
            len: self.children.len(),
            node: NodeSnapshot::of(self),
        }
    }

    pub(crate) fn key_not_found(&self, op: &'static str, key: &str) -> DataObjectError {
        DataObjectError::KeyNotFound {
            op,
            missing: key.to_string(),
            node: NodeSnapshot::of(self),
        }
    }

    pub(crate) fn overwrite_violation(&self, op: &'static str, reason: String) -> DataObjectError {
        DataObjectError::OverwriteViolation {
            op,
            reason,
            node: NodeSnapshot::of(self),
        }
    }
}

// ============================================================================
// Kind, key, flags and scalar access
// ============================================================================

impl DataObject {
    pub fn kind(&self) -> DataType {
        self.kind
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Set this node's own key.
    ///
    /// On a child reached through a [`ChildMut`] the parent's index follows
    /// the new key once the guard drops. [`rename_key`](Self::rename_key) and
    /// [`set_child_key`](Self::set_child_key) report a clash as an error
    /// instead.
    pub fn set_key(&mut self, key: impl Into<String>) {
        self.key = key.into();
    }

    pub fn is_autosort(&self) -> bool {
        self.autosort
    }

    /// Keep object children ordered by key. Inherited by children attached
    /// from now on; existing children are not re-sorted.
    pub fn set_autosort(&mut self, autosort: bool) {
        self.autosort = autosort;
    }

    pub fn is_overwritable(&self) -> bool {
        self.allow_overwrite
    }

    /// Permit re-typing this node and replacing existing keys of its children.
    pub fn set_overwrite(&mut self, allow: bool) {
        self.allow_overwrite = allow;
    }

    pub fn as_string(&self) -> Result<&str> {
        match (&self.kind, &self.scalar) {
            (DataType::String, Scalar::String(s)) => Ok(s.as_str()),
            _ => Err(self.type_mismatch("DataObject::as_string", "string")),
        }
    }

    pub fn as_string_mut(&mut self) -> Result<&mut String> {
        if !matches!((self.kind, &self.scalar), (DataType::String, Scalar::String(_))) {
            return Err(self.type_mismatch("DataObject::as_string_mut", "string"));
        }
        match &mut self.scalar {
            Scalar::String(s) => Ok(s),
            _ => unreachable!("string node without a string slot"),
        }
    }

    pub fn as_int(&self) -> Result<i64> {
        match (&self.kind, &self.scalar) {
            (DataType::Integer, Scalar::Integer(i)) => Ok(*i),
            _ => Err(self.type_mismatch("DataObject::as_int", "int")),
        }
    }

    pub fn as_bool(&self) -> Result<bool> {
        match (&self.kind, &self.scalar) {
            (DataType::Bool, Scalar::Bool(b)) => Ok(*b),
            _ => Err(self.type_mismatch("DataObject::as_bool", "bool")),
        }
    }

    /// Render any node as a short string without failing. For diagnostics.
    pub fn as_string_anyway(&self) -> String {
        match (&self.kind, &self.scalar) {
            (DataType::String, Scalar::String(s)) => s.clone(),
            (DataType::Integer, Scalar::Integer(i)) => i.to_string(),
            (DataType::Bool, Scalar::Bool(b)) => b.to_string(),
            (DataType::Array, _) => "Array".to_string(),
            (DataType::Object, _) => "Object".to_string(),
            (DataType::Null, _) => "Null".to_string(),
            (DataType::Uninitialized, _) => "Not initialized".to_string(),
            _ => "N/A".to_string(),
        }
    }

    fn check_assignable(&self, target: DataType, op: &'static str) -> Result<()> {
        if self.kind == target || self.kind == DataType::Uninitialized || self.allow_overwrite {
            Ok(())
        } else {
            Err(self.overwrite_violation(
                op,
                format!("cannot assign {target} to a node holding {}", self.kind),
            ))
        }
    }

    fn retype(&mut self, kind: DataType) {
        if self.kind != kind {
            self.children.clear();
            self.index.clear();
            self.kind = kind;
        }
    }

    pub fn set_string(&mut self, value: impl Into<String>) -> Result<()> {
        self.check_assignable(DataType::String, "DataObject::set_string")?;
        self.retype(DataType::String);
        self.scalar = Scalar::String(value.into());
        Ok(())
    }

    pub fn set_int(&mut self, value: i64) -> Result<()> {
        self.check_assignable(DataType::Integer, "DataObject::set_int")?;
        self.retype(DataType::Integer);
        self.scalar = Scalar::Integer(value);
        Ok(())
    }

    pub fn set_bool(&mut self, value: bool) -> Result<()> {
        self.check_assignable(DataType::Bool, "DataObject::set_bool")?;
        self.retype(DataType::Bool);
        self.scalar = Scalar::Bool(value);
        Ok(())
    }

    /// Reset to a bare node of `kind`: no key, no children, zero scalar.
    /// The autosort and overwrite flags are kept.
    pub fn clear(&mut self, kind: DataType) {
        self.kind = kind;
        self.key.clear();
        self.scalar = Scalar::zero(kind);
        self.children.clear();
        self.index.clear();
    }
}

// ============================================================================
// Child access
// ============================================================================

impl DataObject {
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Children in sequence order.
    pub fn children(&self) -> impl ExactSizeIterator<Item = &DataObject> + '_ {
        self.children.iter().map(|c| &**c)
    }

    /// Child keys in sequence order (empty strings for anonymous children).
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.children.iter().map(|c| c.key())
    }

    /// Read-only view of the key index, in ascending key order.
    pub fn key_index(&self) -> impl Iterator<Item = (&str, &DataObject)> + '_ {
        self.index
            .iter()
            .filter_map(|(k, pos)| self.children.get(pos).map(|c| (k, &**c)))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains(key)
    }

    pub fn at(&self, pos: usize) -> Result<&DataObject> {
        match self.children.get(pos) {
            Some(child) => Ok(&**child),
            None => Err(self.out_of_range("DataObject::at", pos)),
        }
    }

    pub fn at_mut(&mut self, pos: usize) -> Result<ChildMut<'_>> {
        if pos >= self.children.len() {
            return Err(self.out_of_range("DataObject::at_mut", pos));
        }
        Ok(ChildMut::new(self, pos))
    }

    pub fn at_key(&self, key: &str) -> Result<&DataObject> {
        match self.index.get(key).and_then(|pos| self.children.get(pos)) {
            Some(child) => Ok(&**child),
            None => Err(self.key_not_found("DataObject::at_key", key)),
        }
    }

    pub fn at_key_mut(&mut self, key: &str) -> Result<ChildMut<'_>> {
        match self.index.get(key) {
            Some(pos) if pos < self.children.len() => Ok(ChildMut::new(self, pos)),
            _ => Err(self.key_not_found("DataObject::at_key_mut", key)),
        }
    }

    pub fn last_child(&self) -> Result<&DataObject> {
        match self.children.last() {
            Some(child) => Ok(&**child),
            None => Err(self.out_of_range("DataObject::last_child", 0)),
        }
    }

    pub fn last_child_mut(&mut self) -> Result<ChildMut<'_>> {
        if self.children.is_empty() {
            return Err(self.out_of_range("DataObject::last_child_mut", 0));
        }
        let last = self.children.len() - 1;
        Ok(ChildMut::new(self, last))
    }

    /// A handle sharing the child at `pos` with this tree.
    pub fn at_handle(&self, pos: usize) -> Result<Handle> {
        match self.children.get(pos) {
            Some(child) => Ok(Handle::from_shared(Shared::clone(child))),
            None => Err(self.out_of_range("DataObject::at_handle", pos)),
        }
    }

    /// A handle sharing the child under `key` with this tree.
    pub fn at_key_handle(&self, key: &str) -> Result<Handle> {
        match self.index.get(key).and_then(|pos| self.children.get(pos)) {
            Some(child) => Ok(Handle::from_shared(Shared::clone(child))),
            None => Err(self.key_not_found("DataObject::at_key_handle", key)),
        }
    }

    /// A `(self, key)` pointer resolved by lookup on every use.
    pub fn key_pointer(&mut self, key: impl Into<String>) -> KeyPointer<'_> {
        KeyPointer::new(self, key.into())
    }

    /// Check that the index names exactly the keyed children of every object
    /// in this subtree, each at its own position.
    pub fn index_is_consistent(&self) -> bool {
        let own = match self.kind {
            DataType::Object => self.index.agrees_with(&self.children),
            _ => self.index.len() == 0,
        };
        own && self.children.iter().all(|c| c.index_is_consistent())
    }
}

// ============================================================================
// Structural mutation
// ============================================================================

impl DataObject {
    /// Attach `child` under its own key.
    ///
    /// An `Uninitialized` parent becomes an `Object`. Objects place keyed
    /// children by binary search when autosort is on and append otherwise;
    /// arrays always append. A key that is already present is an
    /// [`OverwriteViolation`](DataObjectError::OverwriteViolation) unless this
    /// node is overwritable, in which case the existing slot is replaced.
    ///
    /// The returned [`ChildMut`] re-syncs this node's index if the child's key
    /// is edited through it.
    pub fn add_child(&mut self, child: Handle) -> Result<ChildMut<'_>> {
        self.attach(child, None, "DataObject::add_child")
    }

    /// Attach `child` after overwriting its key with `key`.
    pub fn add_child_keyed(
        &mut self,
        key: impl Into<String>,
        child: Handle,
    ) -> Result<ChildMut<'_>> {
        self.attach(child, Some(key.into()), "DataObject::add_child_keyed")
    }

    /// Append an element to an `Array` (or `Uninitialized`) node.
    pub fn add_array_element(&mut self, element: Handle) -> Result<ChildMut<'_>> {
        const OP: &str = "DataObject::add_array_element";
        let mut node = element.into_shared().ok_or(DataObjectError::EmptyHandle(OP))?;
        if !matches!(self.kind, DataType::Uninitialized | DataType::Array) {
            return Err(self.type_mismatch(OP, "array"));
        }
        self.kind = DataType::Array;
        if node.autosort != self.autosort {
            Shared::make_mut(&mut node).autosort = self.autosort;
        }
        self.children.push(node);
        let last = self.children.len() - 1;
        Ok(ChildMut::new(self, last))
    }

    fn attach(
        &mut self,
        child: Handle,
        key_override: Option<String>,
        op: &'static str,
    ) -> Result<ChildMut<'_>> {
        let mut node = child.into_shared().ok_or(DataObjectError::EmptyHandle(op))?;
        match self.kind {
            DataType::Uninitialized => self.kind = DataType::Object,
            DataType::Object | DataType::Array => {}
            _ => return Err(self.type_mismatch(op, "object or array")),
        }

        let key = key_override.unwrap_or_else(|| node.key.clone());
        if node.key != key || node.autosort != self.autosort {
            let inner = Shared::make_mut(&mut node);
            inner.key.clone_from(&key);
            inner.autosort = self.autosort;
        }

        if self.kind == DataType::Array {
            self.children.push(node);
            let last = self.children.len() - 1;
            return Ok(ChildMut::new(self, last));
        }

        if let Some(pos) = self.index.get(&key) {
            if !self.allow_overwrite {
                return Err(self.overwrite_violation(op, format!("key '{key}' is already present")));
            }
            self.children[pos] = node;
            return Ok(ChildMut::new(self, pos));
        }

        let pos = if key.is_empty() || !self.autosort {
            self.children.len()
        } else {
            let pos = find_ordered_key_position(&key, &self.children);
            trace!(key = %key, pos, len = self.children.len(), "sorted placement");
            pos
        };
        self.children.insert(pos, node);
        self.index.insert_at(&key, pos);
        Ok(ChildMut::new(self, pos))
    }

    /// Return the child under `key`, attaching an `Uninitialized` one first if
    /// it is absent. Attaching may move existing children when autosort is on.
    pub fn entry(&mut self, key: &str) -> Result<ChildMut<'_>> {
        if !matches!(self.kind, DataType::Uninitialized | DataType::Object) {
            return Err(self.type_mismatch("DataObject::entry", "object"));
        }
        if let Some(pos) = self.index.get(key) {
            return Ok(ChildMut::new(self, pos));
        }
        self.attach(
            Handle::new(DataObject::new()),
            Some(key.to_string()),
            "DataObject::entry",
        )
    }

    /// Detach the child under `key`. Absent keys are a no-op.
    pub fn remove_key(&mut self, key: &str) -> Result<()> {
        if self.kind != DataType::Object {
            return Err(self.type_mismatch("DataObject::remove_key", "object"));
        }
        if let Some(pos) = self.index.get(key) {
            self.children.remove(pos);
            self.index.remove_at(key, pos);
        }
        Ok(())
    }

    /// Re-key without moving: this node's own key if it is `old`, and the
    /// child slot `old` if there is one.
    pub fn rename_key(&mut self, old: &str, new: &str) -> Result<()> {
        if old == new {
            return Ok(());
        }
        if let Some(pos) = self.index.get(old) {
            if self.index.contains(new) {
                return Err(self.overwrite_violation(
                    "DataObject::rename_key",
                    format!("cannot rename '{old}' to '{new}': key is already present"),
                ));
            }
            Shared::make_mut(&mut self.children[pos]).key = new.to_string();
            self.index.rename(old, new);
        }
        if self.key == old {
            self.key = new.to_string();
        }
        Ok(())
    }

    /// Re-key the child at position `pos`.
    pub fn set_child_key(&mut self, pos: usize, key: &str) -> Result<()> {
        const OP: &str = "DataObject::set_child_key";
        let Some(child) = self.children.get(pos) else {
            return Err(self.out_of_range(OP, pos));
        };
        let old = child.key.clone();
        if old == key {
            return Ok(());
        }
        if self.kind == DataType::Object && self.index.contains(key) {
            return Err(self.overwrite_violation(OP, format!("key '{key}' is already present")));
        }
        Shared::make_mut(&mut self.children[pos]).key = key.to_string();
        if self.kind == DataType::Object {
            if old.is_empty() {
                self.index.set(key, pos);
            } else {
                self.index.rename(&old, key);
            }
        }
        Ok(())
    }

    /// Move the child under `key` to position `pos`, or to the end if `pos`
    /// lies past the remaining children.
    pub fn set_key_pos(&mut self, key: &str, pos: usize) -> Result<()> {
        let from = match self.index.get(key) {
            Some(from) if !key.is_empty() => from,
            _ => return Err(self.key_not_found("DataObject::set_key_pos", key)),
        };
        if from == pos {
            return Ok(());
        }
        let node = self.children.remove(from);
        self.index.remove_at(key, from);
        let to = pos.min(self.children.len());
        self.children.insert(to, node);
        self.index.insert_at(key, to);
        trace!(key, from, to, "relocated child");
        Ok(())
    }

    /// Rebuild the key index of this node from its children.
    pub(crate) fn rebuild_index(&mut self) -> Vec<String> {
        if self.kind == DataType::Object {
            self.index.rebuild(&self.children)
        } else {
            self.index.clear();
            Vec::new()
        }
    }
}

// ============================================================================
// Copy, replace, equality
// ============================================================================

impl DataObject {
    /// Deep clone: the result shares no storage with `self`.
    pub fn copy(&self) -> DataObject {
        DataObject {
            kind: self.kind,
            key: self.key.clone(),
            scalar: self.scalar.clone(),
            children: self
                .children
                .iter()
                .map(|c| Shared::new(c.copy()))
                .collect(),
            index: self.index.clone(),
            allow_overwrite: false,
            autosort: self.autosort,
        }
    }

    /// Become a deep copy of `other`.
    ///
    /// The key is taken from `other` only when it has one. Children are
    /// attached through the normal path, so this node's autosort decides
    /// their order.
    pub fn copy_from(&mut self, other: &DataObject) -> Result<()> {
        let key = if other.key.is_empty() {
            std::mem::take(&mut self.key)
        } else {
            other.key.clone()
        };
        self.clear(other.kind);
        self.key = key;
        self.scalar = other.scalar.clone();
        for child in &other.children {
            let copy = Handle::new(child.copy());
            if other.kind == DataType::Array {
                self.add_array_element(copy)?;
            } else {
                self.add_child(copy)?;
            }
        }
        Ok(())
    }

    /// Substitute this node's content with `source`'s, in place.
    /// Children are shared with `source`, not copied.
    pub fn replace(&mut self, source: &DataObject) {
        *self = source.clone();
    }

    /// Encode as JSON text; see [`encoder::encode`].
    pub fn as_json(&self, pretty: bool, suppress_own_key: bool) -> String {
        encoder::encode(self, pretty, suppress_own_key)
    }

    /// Pretty JSON without this node's own key.
    pub fn as_json_no_first_key(&self) -> String {
        encoder::encode(self, true, true)
    }
}

impl PartialEq for DataObject {
    fn eq(&self, other: &Self) -> bool {
        if self.kind != other.kind
            || self.key != other.key
            || self.children.len() != other.children.len()
        {
            return false;
        }
        if self.kind.is_scalar() && self.scalar != other.scalar {
            return false;
        }
        self.children
            .iter()
            .zip(&other.children)
            .all(|(a, b)| Shared::ptr_eq(a, b) || **a == **b)
    }
}

impl fmt::Display for DataObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_json(true, false))
    }
}
