//! Shared ownership of tree nodes.
//!
//! Children of a container are held through a reference-counted pointer, and
//! [`Handle`] exposes the same pointer to callers together with an explicit
//! empty state. The pointer's atomicity is fixed at compile time: `Arc` by
//! default, `Rc` when the embedding application enables the `single-thread`
//! feature. Writes through a shared pointer are copy-on-write, so holding a
//! handle never lets another holder's mutation show through.

use crate::error::{DataObjectError, Result};
use crate::object::DataObject;

#[cfg(not(feature = "single-thread"))]
pub(crate) type Shared<T> = std::sync::Arc<T>;
#[cfg(feature = "single-thread")]
pub(crate) type Shared<T> = std::rc::Rc<T>;

/// Whether node reference counts are maintained with atomic operations.
pub const ATOMIC_REFCOUNT: bool = cfg!(not(feature = "single-thread"));

/// A reference-counted handle to a [`DataObject`], or nothing at all.
///
/// An empty handle is not a `Null` node: it has no node behind it.
#[derive(Debug, Clone, Default)]
pub struct Handle {
    node: Option<Shared<DataObject>>,
}

impl Handle {
    pub fn new(node: DataObject) -> Self {
        Self {
            node: Some(Shared::new(node)),
        }
    }

    pub fn empty() -> Self {
        Self { node: None }
    }

    pub(crate) fn from_shared(node: Shared<DataObject>) -> Self {
        Self { node: Some(node) }
    }

    pub(crate) fn into_shared(self) -> Option<Shared<DataObject>> {
        self.node
    }

    pub fn is_empty(&self) -> bool {
        self.node.is_none()
    }

    /// Move the node out into a new handle, leaving this one empty.
    pub fn take(&mut self) -> Handle {
        Handle {
            node: self.node.take(),
        }
    }

    /// Drop this handle's reference. The node is freed if it was the last one.
    pub fn release(&mut self) {
        self.node = None;
    }

    pub fn get(&self) -> Option<&DataObject> {
        self.node.as_deref()
    }

    /// Mutable access. Clones the node first if other handles share it.
    pub fn get_mut(&mut self) -> Option<&mut DataObject> {
        self.node.as_mut().map(Shared::make_mut)
    }

    pub fn content(&self) -> Result<&DataObject> {
        self.get()
            .ok_or(DataObjectError::EmptyHandle("Handle::content"))
    }

    pub fn content_mut(&mut self) -> Result<&mut DataObject> {
        self.get_mut()
            .ok_or(DataObjectError::EmptyHandle("Handle::content_mut"))
    }

    /// Number of handles (including tree slots) sharing the node; 0 when empty.
    pub fn ref_count(&self) -> usize {
        self.node.as_ref().map_or(0, Shared::strong_count)
    }

    /// True when both handles point at the same node allocation.
    pub fn ptr_eq(&self, other: &Handle) -> bool {
        match (&self.node, &other.node) {
            (Some(a), Some(b)) => Shared::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<DataObject> for Handle {
    fn from(node: DataObject) -> Self {
        Handle::new(node)
    }
}

impl PartialEq for Handle {
    fn eq(&self, other: &Self) -> bool {
        match (self.get(), other.get()) {
            (Some(a), Some(b)) => a == b,
            (None, None) => true,
            _ => false,
        }
    }
}
