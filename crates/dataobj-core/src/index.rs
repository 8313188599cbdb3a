//! Ordered key index and sorted insertion.
//!
//! An `Object` node keeps its children in a vector (the order the encoder
//! walks) and a `KeyIndex` from key to position for direct lookup. Every
//! structural change of the vector goes through this module so the two never
//! disagree.

use std::collections::BTreeMap;

use crate::handle::Shared;
use crate::object::DataObject;

/// Key → child position map mirroring the keyed children of one node.
#[derive(Debug, Clone, Default)]
pub(crate) struct KeyIndex {
    positions: BTreeMap<String, usize>,
}

impl KeyIndex {
    pub(crate) fn get(&self, key: &str) -> Option<usize> {
        self.positions.get(key).copied()
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.positions.contains_key(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.positions.len()
    }

    pub(crate) fn clear(&mut self) {
        self.positions.clear();
    }

    /// Entries in key order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.positions.iter().map(|(k, &p)| (k.as_str(), p))
    }

    /// Record a child inserted at `pos`; everything at or after `pos` moves up.
    pub(crate) fn insert_at(&mut self, key: &str, pos: usize) {
        for p in self.positions.values_mut() {
            if *p >= pos {
                *p += 1;
            }
        }
        if !key.is_empty() {
            self.positions.insert(key.to_string(), pos);
        }
    }

    /// Record removal of the child at `pos`; later positions move down.
    pub(crate) fn remove_at(&mut self, key: &str, pos: usize) {
        if !key.is_empty() {
            self.positions.remove(key);
        }
        for p in self.positions.values_mut() {
            if *p > pos {
                *p -= 1;
            }
        }
    }

    pub(crate) fn rename(&mut self, old: &str, new: &str) {
        if let Some(pos) = self.positions.remove(old) {
            if !new.is_empty() {
                self.positions.insert(new.to_string(), pos);
            }
        }
    }

    pub(crate) fn set(&mut self, key: &str, pos: usize) {
        if !key.is_empty() {
            self.positions.insert(key.to_string(), pos);
        }
    }

    /// Rebuild from scratch. Returns the keys that appeared more than once;
    /// the later occurrence wins the slot.
    pub(crate) fn rebuild(&mut self, children: &[Shared<DataObject>]) -> Vec<String> {
        self.positions.clear();
        let mut duplicates = Vec::new();
        for (pos, child) in children.iter().enumerate() {
            let key = child.key();
            if key.is_empty() {
                continue;
            }
            if self.positions.insert(key.to_string(), pos).is_some() {
                duplicates.push(key.to_string());
            }
        }
        duplicates
    }

    /// Check that the map names exactly the keyed children at their positions.
    pub(crate) fn agrees_with(&self, children: &[Shared<DataObject>]) -> bool {
        let keyed = children.iter().filter(|c| !c.key().is_empty()).count();
        keyed == self.positions.len()
            && self
                .positions
                .iter()
                .all(|(k, &p)| children.get(p).is_some_and(|c| c.key() == k))
    }
}

/// Binary search for the smallest position whose key is `>= key`.
///
/// Returns `children.len()` when every key sorts before `key`, which means
/// append. Anonymous children count as greater than any key, so keyed
/// children land ahead of the anonymous tail.
pub(crate) fn find_ordered_key_position(key: &str, children: &[Shared<DataObject>]) -> usize {
    children.partition_point(|c| !c.key().is_empty() && c.key() < key)
}
