//! Builder for query controllers.

use crate::builder::error::BuildError;
use crate::core::{LivenessProbe, DEFAULT_HISTORY_LIMIT};
use crate::effects::{action_fn, ActionFn, QueryConfig, QueryController};
use crate::host::Host;
use std::future::Future;
use std::sync::Arc;

/// Builder for constructing query controllers with a fluent API.
///
/// # Example
///
/// ```rust
/// use liveaction::builder::QueryControllerBuilder;
/// use liveaction::host::Host;
///
/// # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// # rt.block_on(async {
/// let host = Host::new("user-card");
/// let query = QueryControllerBuilder::new()
///     .action(|id: u64| async move { Ok::<_, String>(format!("user #{id}")) })
///     .args(7)
///     .mount(&host)
///     .unwrap();
///
/// host.activate();
/// query.subscribe_data().wait_for(|d| d.is_some()).await.unwrap();
/// assert_eq!(query.data().as_deref(), Some("user #7"));
/// # });
/// ```
pub struct QueryControllerBuilder<A, T, E> {
    action: Option<ActionFn<A, T, E>>,
    liveness: Option<LivenessProbe>,
    config: QueryConfig<A, T, E>,
}

impl<A, T, E> QueryControllerBuilder<A, T, E>
where
    A: Clone + Default + PartialEq + Send + 'static,
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            action: None,
            liveness: None,
            config: QueryConfig::default(),
        }
    }

    /// Set the async function to wrap (required).
    pub fn action<F, Fut>(self, f: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        self.action_fn(action_fn(f))
    }

    /// Set an already shared function (required, alternative to `.action`).
    pub fn action_fn(mut self, action: ActionFn<A, T, E>) -> Self {
        self.action = Some(action);
        self
    }

    /// Set the liveness probe (required unless built with [`mount`](Self::mount)).
    pub fn liveness(mut self, probe: LivenessProbe) -> Self {
        self.liveness = Some(probe);
        self
    }

    /// Arguments for activation fetches and argument-less refetches.
    pub fn args(mut self, args: A) -> Self {
        self.config.args = Some(args);
        self
    }

    /// Hook run with the result of each live success (optional).
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.config.on_success = Some(Arc::new(f));
        self
    }

    /// Hook run with the reason of each live failure (optional).
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.config.on_error = Some(Arc::new(f));
        self
    }

    /// Maximum retained phase transitions (optional, at least 1).
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.config.history_limit = limit;
        self
    }

    /// Build the controller without registering it with a host.
    pub fn build(self) -> Result<QueryController<A, T, E>, BuildError> {
        let action = self.action.ok_or(BuildError::MissingAction)?;
        let liveness = self.liveness.ok_or(BuildError::MissingLiveness)?;
        if self.config.history_limit == 0 {
            return Err(BuildError::InvalidHistoryLimit(0));
        }

        Ok(QueryController::new(action, liveness, self.config))
    }

    /// Build the controller inside `host` and register it as an observer,
    /// so it fetches when the host activates.
    pub fn mount(self, host: &Host) -> Result<QueryController<A, T, E>, BuildError> {
        let query = self.liveness(host.probe()).build()?;
        host.observe(Arc::new(query.clone()));
        Ok(query)
    }
}

impl<A, T, E> Default for QueryControllerBuilder<A, T, E>
where
    A: Clone + Default + PartialEq + Send + 'static,
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn builder_requires_action() {
        let host = Host::new("test");
        let result = QueryControllerBuilder::<(), (), String>::new()
            .liveness(host.probe())
            .build();

        assert!(matches!(result, Err(BuildError::MissingAction)));
    }

    #[test]
    fn builder_requires_liveness() {
        let result = QueryControllerBuilder::<(), (), String>::new()
            .action(|_: ()| async { Ok(()) })
            .build();

        assert!(matches!(result, Err(BuildError::MissingLiveness)));
    }

    #[test]
    fn builder_rejects_zero_history_limit() {
        let host = Host::new("test");
        let result = QueryControllerBuilder::<(), (), String>::new()
            .action(|_: ()| async { Ok(()) })
            .history_limit(0)
            .mount(&host);

        assert!(matches!(result, Err(BuildError::InvalidHistoryLimit(0))));
    }

    #[test]
    fn default_args_are_used_when_unset() {
        let host = Host::new("test");
        let query = QueryControllerBuilder::<u32, u32, String>::new()
            .action(|n: u32| async move { Ok(n) })
            .liveness(host.probe())
            .build()
            .unwrap();

        assert_eq!(query.args(), 0);
    }

    #[tokio::test]
    async fn build_does_not_register_observer() {
        let host = Host::new("test");
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let query = QueryControllerBuilder::<(), (), String>::new()
            .action(move |_: ()| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok(()) }
            })
            .liveness(host.probe())
            .build()
            .unwrap();

        host.activate();
        tokio::task::yield_now().await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(query.is_initial_loading());
    }

    #[tokio::test]
    async fn mount_fetches_on_activation() {
        let host = Host::new("test");
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let query = QueryControllerBuilder::new()
            .action(|n: usize| async move { Ok::<_, String>(n + 1) })
            .args(41)
            .on_success(move |_: &usize| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .mount(&host)
            .unwrap();

        host.activate();
        query
            .subscribe_status()
            .wait_for(|s| !s.is_loading)
            .await
            .unwrap();

        assert_eq!(query.data(), Some(42));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }
}
