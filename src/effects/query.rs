//! Query controller: an action tracker that fetches on activation and caches
//! the last successful result.

use crate::core::{
    ActionState, LivenessProbe, Phase, PhaseHistory, QueryState, DEFAULT_HISTORY_LIMIT,
};
use crate::effects::action::{
    ActionConfig, ActionFn, ActionTracker, ErrorCallback, SuccessCallback,
};
use crate::host::Lifecycle;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Configuration of a query.
pub struct QueryConfig<A, T, E> {
    /// Arguments used on activation and by argument-less refetches.
    /// `None` means `A::default()`.
    pub args: Option<A>,
    pub on_success: Option<SuccessCallback<T>>,
    pub on_error: Option<ErrorCallback<E>>,
    /// Maximum number of retained phase transitions.
    pub history_limit: usize,
}

impl<A, T, E> Default for QueryConfig<A, T, E> {
    fn default() -> Self {
        Self {
            args: None,
            on_success: None,
            on_error: None,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

struct QueryInner<A, T, E> {
    tracker: ActionTracker<A, T, E>,
    args: Mutex<A>,
    data: watch::Sender<Option<T>>,
}

/// Fetches on host activation and keeps the last successful result.
///
/// The controller is a [`Lifecycle`] observer: register it with the owning
/// [`Host`](crate::host::Host) and it fetches once with the configured
/// arguments when the host activates. Changing the arguments or the wrapped
/// function while live triggers exactly one more fetch.
///
/// A newer fetch supersedes an in-flight one but does not cancel it. If the
/// older call resolves last while the host is still live, its result
/// overwrites `data`; there is no per-call sequencing.
///
/// Cloning a controller yields another handle to the same state.
///
/// # Example
///
/// ```rust
/// use liveaction::effects::{action_fn, QueryConfig, QueryController};
/// use liveaction::host::Host;
/// use std::sync::Arc;
///
/// # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// # rt.block_on(async {
/// let host = Host::new("greeting");
/// let query: QueryController<String, String, String> = QueryController::new(
///     action_fn(|name: String| async move { Ok(format!("hello {name}")) }),
///     host.probe(),
///     QueryConfig {
///         args: Some("world".to_string()),
///         ..QueryConfig::default()
///     },
/// );
/// host.observe(Arc::new(query.clone()));
/// host.activate();
///
/// let mut data = query.subscribe_data();
/// data.wait_for(|d| d.is_some()).await.unwrap();
/// assert_eq!(query.data().as_deref(), Some("hello world"));
/// # });
/// ```
pub struct QueryController<A, T, E> {
    inner: Arc<QueryInner<A, T, E>>,
}

impl<A, T, E> Clone for QueryController<A, T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A, T, E> QueryController<A, T, E>
where
    A: Clone + Default + PartialEq + Send + 'static,
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Create a controller bound to `liveness`.
    ///
    /// Nothing is fetched until the controller is registered with a host
    /// that activates, or until [`fetch`](Self::fetch) or
    /// [`refetch`](Self::refetch) is called.
    pub fn new(
        action: ActionFn<A, T, E>,
        liveness: LivenessProbe,
        config: QueryConfig<A, T, E>,
    ) -> Self {
        let QueryConfig {
            args,
            on_success,
            on_error,
            history_limit,
        } = config;
        let tracker = ActionTracker::with_history_limit(
            action,
            liveness,
            ActionConfig {
                on_success,
                on_error,
            },
            history_limit,
        );
        let (data, _) = watch::channel(None);
        Self {
            inner: Arc::new(QueryInner {
                tracker,
                args: Mutex::new(args.unwrap_or_default()),
                data,
            }),
        }
    }

    /// Fetch and wait for the result to be applied.
    ///
    /// `Some(args)` is used as given; `None` falls back to the configured
    /// arguments. The call starts (and `is_loading` is set) before this
    /// returns. On success, `data` is replaced if the host is still live;
    /// failures leave `data` untouched.
    pub fn fetch(&self, args: Option<A>) -> impl Future<Output = ()> + Send + 'static {
        let args = args.unwrap_or_else(|| self.args());
        let pending = self.inner.tracker.action(args);
        let inner = Arc::clone(&self.inner);

        async move {
            if let Some(data) = pending.await {
                if inner.tracker.liveness().is_live() {
                    inner.data.send_replace(Some(data));
                }
            }
        }
    }

    /// Fire-and-forget [`fetch`](Self::fetch) on the current tokio runtime.
    ///
    /// The returned handle may be dropped; the fetch keeps running. Outside a
    /// tokio runtime nothing is started: a warning is logged, no state
    /// changes, and `None` is returned.
    ///
    /// # Example
    ///
    /// ```rust
    /// use liveaction::builder::QueryControllerBuilder;
    /// use liveaction::host::Host;
    ///
    /// let host = Host::new("search");
    /// let query = QueryControllerBuilder::new()
    ///     .action(|term: String| async move { Ok::<_, String>(term.len()) })
    ///     .liveness(host.probe())
    ///     .build()
    ///     .unwrap();
    /// host.activate();
    ///
    /// // No runtime here, so the refetch is skipped.
    /// assert!(query.refetch(Some("rust".to_string())).is_none());
    /// assert!(!query.is_loading());
    /// ```
    pub fn refetch(&self, args: Option<A>) -> Option<JoinHandle<()>> {
        match Handle::try_current() {
            Ok(handle) => Some(handle.spawn(self.fetch(args))),
            Err(_) => {
                tracing::warn!("no tokio runtime; skipping refetch");
                None
            }
        }
    }

    /// Replace the configured arguments.
    ///
    /// Returns whether they changed. A change while the host is live
    /// triggers one refetch with the new arguments.
    pub fn set_args(&self, args: A) -> bool {
        let changed = {
            let mut current = self.lock_args();
            if *current == args {
                false
            } else {
                *current = args;
                true
            }
        };
        if changed && self.inner.tracker.liveness().is_live() {
            self.trigger("args changed");
        }
        changed
    }

    /// Replace the wrapped function, keeping cached data and status.
    ///
    /// Returns whether the function identity changed. A change while the
    /// host is live triggers one refetch with the configured arguments.
    pub fn set_action(&self, action: ActionFn<A, T, E>) -> bool {
        let changed = self.inner.tracker.set_action(action);
        if changed && self.inner.tracker.liveness().is_live() {
            self.trigger("action changed");
        }
        changed
    }

    /// Currently configured arguments.
    pub fn args(&self) -> A {
        self.lock_args().clone()
    }

    fn trigger(&self, reason: &'static str) {
        tracing::debug!(reason, "automatic refetch");
        self.refetch(None);
    }

    fn lock_args(&self) -> std::sync::MutexGuard<'_, A> {
        self.inner.args.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<A, T: Clone, E: Clone> QueryController<A, T, E> {
    /// Last successful result.
    pub fn data(&self) -> Option<T> {
        self.inner.data.borrow().clone()
    }

    /// Whether the latest fetch is still pending.
    pub fn is_loading(&self) -> bool {
        self.inner.tracker.is_loading()
    }

    /// True until the first fetch completes while live.
    pub fn is_initial_loading(&self) -> bool {
        self.inner.tracker.is_initial_loading()
    }

    /// Reason of the most recent live failure. A later success keeps it.
    pub fn error(&self) -> Option<E> {
        self.inner.tracker.error()
    }

    /// Snapshot of data and status signals.
    pub fn state(&self) -> QueryState<T, E> {
        QueryState::from_parts(self.data(), self.inner.tracker.state())
    }

    /// Status signals without the cached data.
    pub fn status(&self) -> ActionState<E> {
        self.inner.tracker.state()
    }

    /// Phase after the most recent applied write.
    pub fn phase(&self) -> Phase {
        self.inner.tracker.phase()
    }

    /// Copy of the retained phase history.
    pub fn history(&self) -> PhaseHistory {
        self.inner.tracker.history()
    }

    /// Receiver notified whenever `data` is replaced.
    pub fn subscribe_data(&self) -> watch::Receiver<Option<T>> {
        self.inner.data.subscribe()
    }

    /// Receiver notified on every status write.
    pub fn subscribe_status(&self) -> watch::Receiver<ActionState<E>> {
        self.inner.tracker.subscribe()
    }
}

impl<A, T, E> Lifecycle for QueryController<A, T, E>
where
    A: Clone + Default + PartialEq + Send + 'static,
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn on_activate(&self) {
        self.trigger("host activated");
    }

    fn on_deactivate(&self) {
        tracing::debug!("host deactivated; in-flight fetches will not write");
    }

    fn name(&self) -> &'static str {
        "query"
    }
}
