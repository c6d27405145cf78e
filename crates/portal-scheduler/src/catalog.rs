//! Task catalog: the enumerable table of named maintenance operations.
//!
//! The catalog is how a job defined only by a name and a cron expression
//! regains an executable body after a restart. It is an explicit, statically
//! registered list of `(name, operation)` pairs built at startup; the
//! resolver and the self-registration helper both consume it.
//!
//! Catalog operations take [`TaskArgs`]: an optional-by-convention string
//! reference and the loop's cancellation token. When the scheduler binds an
//! operation without caller-supplied arguments, it fills in the placeholder
//! defaults (`"1"` for the reference, the loop's token for cancellation).

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::{action_fn, ActionFn};

/// Arguments passed to a catalog operation.
#[derive(Debug, Clone)]
pub struct TaskArgs {
    /// Task-specific string reference (e.g. an office partition id).
    pub reference: String,

    /// Clone of the scheduler's shutdown signal.
    pub cancel: CancellationToken,
}

impl TaskArgs {
    /// Placeholder supplied for the string reference when no caller
    /// provides one.
    pub const DEFAULT_REFERENCE: &'static str = "1";

    /// Build arguments with the placeholder reference and the given token.
    pub fn with_defaults(cancel: CancellationToken) -> Self {
        Self {
            reference: Self::DEFAULT_REFERENCE.to_string(),
            cancel,
        }
    }
}

/// Future returned by a catalog operation.
pub type CatalogFuture = BoxFuture<'static, Result<(), String>>;

/// A shareable catalog operation.
pub type CatalogOp = Arc<dyn Fn(TaskArgs) -> CatalogFuture + Send + Sync>;

/// One named operation in a task catalog.
#[derive(Clone)]
pub struct CatalogEntry {
    name: String,
    operation: CatalogOp,
}

impl CatalogEntry {
    /// Create an entry from a name and an async operation.
    pub fn new<F, Fut>(name: impl Into<String>, operation: F) -> Self
    where
        F: Fn(TaskArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), String>> + Send + 'static,
    {
        Self {
            name: name.into(),
            operation: Arc::new(move |args| Box::pin(operation(args))),
        }
    }

    /// The action identifier this operation is published under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The raw operation.
    pub fn operation(&self) -> CatalogOp {
        self.operation.clone()
    }

    /// Wrap the operation as an [`ActionFn`] with synthesized default
    /// arguments, the same construction the resolver uses for its fallback.
    pub fn bind_defaults(&self) -> ActionFn {
        let operation = self.operation.clone();
        action_fn(move |cancel| operation(TaskArgs::with_defaults(cancel)))
    }
}

impl std::fmt::Debug for CatalogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogEntry").field("name", &self.name).finish()
    }
}

/// An enumerable catalog of eligible operations.
pub trait TaskCatalog: Send + Sync {
    /// Every operation the catalog publishes.
    fn entries(&self) -> Vec<CatalogEntry>;

    /// Find the operation published under `name`.
    fn lookup(&self, name: &str) -> Option<CatalogEntry> {
        self.entries().into_iter().find(|e| e.name() == name)
    }
}

/// A catalog backed by a fixed list of entries.
#[derive(Default)]
pub struct StaticCatalog {
    entries: Vec<CatalogEntry>,
}

impl StaticCatalog {
    /// Create a catalog from a fixed entry list.
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// An empty catalog.
    pub fn empty() -> Self {
        Self::default()
    }
}

impl TaskCatalog for StaticCatalog {
    fn entries(&self) -> Vec<CatalogEntry> {
        self.entries.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_lookup_finds_entry_by_name() {
        let catalog = StaticCatalog::new(vec![
            CatalogEntry::new("alpha", |_args| async { Ok(()) }),
            CatalogEntry::new("beta", |_args| async { Ok(()) }),
        ]);

        assert!(catalog.lookup("alpha").is_some());
        assert!(catalog.lookup("beta").is_some());
        assert!(catalog.lookup("gamma").is_none());
    }

    #[tokio::test]
    async fn test_bind_defaults_supplies_placeholder_reference() {
        let seen = Arc::new(std::sync::Mutex::new(String::new()));
        let seen_clone = seen.clone();

        let entry = CatalogEntry::new("echo", move |args: TaskArgs| {
            let seen = seen_clone.clone();
            async move {
                *seen.lock().unwrap() = args.reference;
                Ok(())
            }
        });

        let action = entry.bind_defaults();
        action(CancellationToken::new()).await.unwrap();

        assert_eq!(*seen.lock().unwrap(), TaskArgs::DEFAULT_REFERENCE);
    }

    #[tokio::test]
    async fn test_bound_action_receives_cancel_token() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let entry = CatalogEntry::new("cancellable", move |args: TaskArgs| {
            let counter = counter_clone.clone();
            async move {
                if !args.cancel.is_cancelled() {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
                Ok(())
            }
        });

        let action = entry.bind_defaults();
        action(CancellationToken::new()).await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        let cancelled = CancellationToken::new();
        cancelled.cancel();
        action(cancelled).await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_catalog_has_no_entries() {
        let catalog = StaticCatalog::empty();
        assert!(catalog.entries().is_empty());
        assert!(catalog.lookup("anything").is_none());
    }
}
