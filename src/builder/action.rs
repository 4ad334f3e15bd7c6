//! Builder for action trackers.

use crate::builder::error::BuildError;
use crate::core::{LivenessProbe, DEFAULT_HISTORY_LIMIT};
use crate::effects::{action_fn, ActionConfig, ActionFn, ActionTracker};
use crate::host::Host;
use std::future::Future;
use std::sync::Arc;

/// Builder for constructing action trackers with a fluent API.
pub struct ActionTrackerBuilder<A, T, E> {
    action: Option<ActionFn<A, T, E>>,
    liveness: Option<LivenessProbe>,
    config: ActionConfig<T, E>,
    history_limit: usize,
}

impl<A, T, E> ActionTrackerBuilder<A, T, E>
where
    A: Send + 'static,
    T: Send + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            action: None,
            liveness: None,
            config: ActionConfig::default(),
            history_limit: DEFAULT_HISTORY_LIMIT,
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

    /// Set the liveness probe gating completion writes (required).
    pub fn liveness(mut self, probe: LivenessProbe) -> Self {
        self.liveness = Some(probe);
        self
    }

    /// Take liveness from the owning host.
    pub fn host(self, host: &Host) -> Self {
        self.liveness(host.probe())
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
        self.history_limit = limit;
        self
    }

    /// Build the tracker.
    /// Returns an error if required fields are missing.
    pub fn build(self) -> Result<ActionTracker<A, T, E>, BuildError> {
        let action = self.action.ok_or(BuildError::MissingAction)?;
        let liveness = self.liveness.ok_or(BuildError::MissingLiveness)?;
        if self.history_limit == 0 {
            return Err(BuildError::InvalidHistoryLimit(0));
        }

        Ok(ActionTracker::with_history_limit(
            action,
            liveness,
            self.config,
            self.history_limit,
        ))
    }
}

impl<A, T, E> Default for ActionTrackerBuilder<A, T, E>
where
    A: Send + 'static,
    T: Send + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
