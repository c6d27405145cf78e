//! Action resolution for jobs whose operation is not yet in the registry.
//!
//! Jobs reloaded from the store after a restart carry only an action
//! identifier. The resolver turns that name back into an invocable
//! operation: registry first, then the task catalog, caching any fallback
//! wrapper it builds so resolution happens at most once per identifier.

use std::sync::Arc;

use thiserror::Error;

use crate::{ActionFn, ActionRegistry, TaskCatalog};

/// Resolution failure.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No registered or catalog operation matches the action identifier.
    #[error("No operation found for action '{0}'")]
    NotFound(String),
}

/// Resolves action identifiers to invocable operations.
#[derive(Clone)]
pub struct ActionResolver {
    registry: Arc<ActionRegistry>,
    catalog: Arc<dyn TaskCatalog>,
}

impl ActionResolver {
    /// Create a resolver over a registry and a task catalog.
    pub fn new(registry: Arc<ActionRegistry>, catalog: Arc<dyn TaskCatalog>) -> Self {
        Self { registry, catalog }
    }

    /// Resolve `action_id` to an operation.
    ///
    /// Consults the registry first. On a miss, looks the name up on the
    /// catalog, binds the default-argument wrapper, and caches it into the
    /// registry (insert-if-absent, so a concurrent deliberate registration
    /// wins). A `NotFound` result skips the job for the current cycle only;
    /// the job stays scheduled and may resolve later.
    pub fn resolve(&self, action_id: &str) -> Result<ActionFn, ResolveError> {
        if let Some(action) = self.registry.get(action_id) {
            return Ok(action);
        }

        let entry = self
            .catalog
            .lookup(action_id)
            .ok_or_else(|| ResolveError::NotFound(action_id.to_string()))?;

        let action = entry.bind_defaults();
        self.registry.insert_if_absent(action_id, action.clone());

        // Return whatever the registry now holds; a racing writer wins.
        Ok(self.registry.get(action_id).unwrap_or(action))
    }
}
