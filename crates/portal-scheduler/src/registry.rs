//! Action registry: a concurrency-safe map from action identifiers to
//! invocable operations.
//!
//! The registry is read by the coordination loop and by concurrently
//! executing job bodies, and written both eagerly at registration time and
//! lazily by the resolver. Entries are additive: insertion is first-writer-
//! wins, so a lazily resolved fallback can never silently replace an
//! operation that was registered deliberately.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::ActionFn;

/// Concurrent cache of action identifier -> operation.
pub struct ActionRegistry {
    actions: RwLock<HashMap<String, ActionFn>>,
}

impl ActionRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            actions: RwLock::new(HashMap::new()),
        }
    }

    /// Insert an operation unless one is already registered under this id.
    ///
    /// Returns `true` if the operation was inserted, `false` if an existing
    /// entry won.
    pub fn insert_if_absent(&self, action_id: &str, action: ActionFn) -> bool {
        let mut actions = self.actions.write().unwrap();
        if actions.contains_key(action_id) {
            return false;
        }
        actions.insert(action_id.to_string(), action);
        true
    }

    /// Look up the operation registered under `action_id`.
    pub fn get(&self, action_id: &str) -> Option<ActionFn> {
        self.actions.read().unwrap().get(action_id).cloned()
    }

    /// Check whether an operation is registered under `action_id`.
    pub fn contains(&self, action_id: &str) -> bool {
        self.actions.read().unwrap().contains_key(action_id)
    }

    /// Number of registered actions.
    pub fn len(&self) -> usize {
        self.actions.read().unwrap().len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
