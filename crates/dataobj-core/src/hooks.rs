//! Tree-walking callbacks: verifiers, modifiers and searches.

use tracing::warn;

use crate::error::Result;
use crate::handle::Shared;
use crate::object::DataObject;

/// How far [`DataObject::perform_modifier`] reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierOption {
    /// Only the node the modifier is called on.
    Single,
    /// The node and all its descendants.
    Recursive,
}

/// Decision returned by a modifier for the node it just visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    Continue,
    SkipSubtree,
}

impl DataObject {
    /// Run `verifier` on this node once, right away.
    pub fn set_verifier<F>(&mut self, verifier: F) -> Result<()>
    where
        F: FnOnce(&mut DataObject) -> Result<()>,
    {
        verifier(self)
    }

    /// Apply `modifier` to this node and, with [`ModifierOption::Recursive`],
    /// to its descendants in pre-order.
    ///
    /// A node whose key is listed in `exception_keys` is left alone together
    /// with its whole subtree. Returning [`Traversal::SkipSubtree`] keeps the
    /// walk out of the children of the node just modified.
    ///
    /// Objects whose children were visited get their index rebuilt. If the
    /// modifier left two children of one object under the same key, every
    /// child of that object gets back the key it had before the walk reached
    /// it and the call fails with
    /// [`OverwriteViolation`](crate::DataObjectError::OverwriteViolation).
    pub fn perform_modifier<F>(
        &mut self,
        mut modifier: F,
        option: ModifierOption,
        exception_keys: &[&str],
    ) -> Result<()>
    where
        F: FnMut(&mut DataObject) -> Traversal,
    {
        self.modify(&mut modifier, option, exception_keys)
    }

    fn modify<F>(&mut self, modifier: &mut F, option: ModifierOption, exception_keys: &[&str]) -> Result<()>
    where
        F: FnMut(&mut DataObject) -> Traversal,
    {
        if exception_keys.contains(&self.key()) {
            return Ok(());
        }
        let decision = modifier(self);
        if option == ModifierOption::Single || decision == Traversal::SkipSubtree {
            return Ok(());
        }

        let before: Vec<String> = self.children.iter().map(|c| c.key().to_string()).collect();
        let mut outcome = Ok(());
        for child in &mut self.children {
            outcome = Shared::make_mut(child).modify(modifier, option, exception_keys);
            if outcome.is_err() {
                break;
            }
        }

        let duplicates = self.rebuild_index();
        if duplicates.is_empty() {
            return outcome;
        }
        warn!(key = %self.key(), ?duplicates, "modifier left duplicate child keys");
        for (child, key) in self.children.iter_mut().zip(before) {
            if child.key() != key {
                Shared::make_mut(child).key = key;
            }
        }
        self.rebuild_index();
        outcome?;
        Err(self.overwrite_violation(
            "DataObject::perform_modifier",
            format!("modifier left duplicate child keys: {}", duplicates.join(", ")),
        ))
    }

    /// True if any node in this subtree (this one included) satisfies
    /// `predicate`. Stops at the first match.
    pub fn perform_search<F>(&self, mut predicate: F) -> bool
    where
        F: FnMut(&DataObject) -> bool,
    {
        self.search(&mut predicate)
    }

    fn search<F>(&self, predicate: &mut F) -> bool
    where
        F: FnMut(&DataObject) -> bool,
    {
        predicate(self) || self.children.iter().any(|child| child.search(predicate))
    }
}
