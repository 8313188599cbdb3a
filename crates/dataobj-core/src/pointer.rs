//! Non-owning "node at key" pointers.

use crate::child::ChildMut;
use crate::error::{DataObjectError, Result};
use crate::handle::Handle;
use crate::object::DataObject;

/// A `(parent, key)` pair. Nothing is cached: every call looks the key up
/// again, so the pointer stays valid while the parent's children move around.
#[derive(Debug)]
pub struct KeyPointer<'a> {
    parent: &'a mut DataObject,
    key: String,
}

impl<'a> KeyPointer<'a> {
    pub(crate) fn new(parent: &'a mut DataObject, key: String) -> Self {
        Self { parent, key }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn exists(&self) -> bool {
        self.parent.contains_key(&self.key)
    }

    pub fn get(&self) -> Result<&DataObject> {
        self.parent.at_key(&self.key)
    }

    pub fn get_mut(&mut self) -> Result<ChildMut<'_>> {
        self.parent.at_key_mut(&self.key)
    }

    /// Put `value` into the slot. An existing child is replaced where it
    /// stands; otherwise `value` is attached under the pointer's key.
    pub fn assign(&mut self, value: Handle) -> Result<ChildMut<'_>> {
        if value.is_empty() {
            return Err(DataObjectError::EmptyHandle("KeyPointer::assign"));
        }
        let saved = self.parent.is_overwritable();
        self.parent.set_overwrite(true);
        let attached = self.parent.add_child_keyed(self.key.clone(), value).map(|_| ());
        self.parent.set_overwrite(saved);
        attached?;
        self.parent.at_key_mut(&self.key)
    }
}
