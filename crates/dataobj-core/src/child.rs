//! Mutable access to a child that is attached to a container.

use std::fmt;
use std::ops::{Deref, DerefMut};

use tracing::warn;

use crate::handle::Shared;
use crate::object::DataObject;
use crate::types::DataType;

/// Mutable borrow of one child, handed out by the container accessors
/// ([`DataObject::at_mut`], [`DataObject::at_key_mut`], [`DataObject::entry`],
/// [`DataObject::add_child`] and friends).
///
/// Anything reachable through `&mut DataObject` may change the child's own
/// key: `set_key`, `clear`, `copy_from`, `replace`. When the guard drops, the
/// parent's key index is re-synced to that key. A new key already held by a
/// sibling is refused and the child gets its previous key back.
///
/// The child is only unshared from other handle holders on first mutable use.
pub struct ChildMut<'a> {
    parent: &'a mut DataObject,
    pos: usize,
    key: String,
}

impl<'a> ChildMut<'a> {
    pub(crate) fn new(parent: &'a mut DataObject, pos: usize) -> Self {
        let key = parent.children[pos].key.clone();
        Self { parent, pos, key }
    }

    /// Position of the child in its parent's sequence.
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl Deref for ChildMut<'_> {
    type Target = DataObject;

    fn deref(&self) -> &DataObject {
        &self.parent.children[self.pos]
    }
}

impl DerefMut for ChildMut<'_> {
    fn deref_mut(&mut self) -> &mut DataObject {
        Shared::make_mut(&mut self.parent.children[self.pos])
    }
}

impl Drop for ChildMut<'_> {
    fn drop(&mut self) {
        if self.parent.kind != DataType::Object {
            return;
        }
        let current = self.parent.children[self.pos].key.clone();
        if current == self.key {
            return;
        }
        if !current.is_empty() && self.parent.index.contains(&current) {
            warn!(
                parent = %self.parent.key,
                old = %self.key,
                new = %current,
                "child re-keyed onto a sibling's key, previous key restored"
            );
            Shared::make_mut(&mut self.parent.children[self.pos]).key = std::mem::take(&mut self.key);
            return;
        }
        if self.key.is_empty() {
            self.parent.index.set(&current, self.pos);
        } else {
            self.parent.index.rename(&self.key, &current);
        }
    }
}

impl fmt::Debug for ChildMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildMut")
            .field("pos", &self.pos)
            .field("child", &**self)
            .finish()
    }
}
