//! Invocable action type.
//!
//! An action is the executable body of a job: an async operation taking the
//! loop's cancellation token and reporting success or a failure message.
//! Actions are stored behind `Arc` so the registry, the resolver, and any
//! number of concurrent executions can share one instance.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

/// Future returned by an action invocation.
pub type ActionFuture = BoxFuture<'static, Result<(), String>>;

/// A shareable, invocable asynchronous operation.
///
/// The token is a clone of the scheduler's shutdown signal; action bodies
/// should check it and exit cleanly when cancelled.
pub type ActionFn = Arc<dyn Fn(CancellationToken) -> ActionFuture + Send + Sync>;

/// Box an async closure into an [`ActionFn`].
///
/// # Example
///
/// ```
/// use portal_scheduler::action_fn;
///
/// let action = action_fn(|_cancel| async { Ok(()) });
/// ```
pub fn action_fn<F, Fut>(f: F) -> ActionFn
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), String>> + Send + 'static,
{
    Arc::new(move |cancel| Box::pin(f(cancel)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_action_fn_invokes_closure() {
        let counter = Arc::new(AtomicU32::new(0));
        let c = counter.clone();
        let action = action_fn(move |_cancel| {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        action(CancellationToken::new()).await.unwrap();
        action(CancellationToken::new()).await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_action_fn_propagates_failure() {
        let action = action_fn(|_cancel| async { Err("boom".to_string()) });
        let result = action(CancellationToken::new()).await;
        assert_eq!(result, Err("boom".to_string()));
    }

    #[tokio::test]
    async fn test_action_sees_cancellation() {
        let action = action_fn(|cancel| async move {
            if cancel.is_cancelled() {
                return Err("cancelled".to_string());
            }
            Ok(())
        });

        let token = CancellationToken::new();
        token.cancel();
        assert!(action(token).await.is_err());
    }
}
