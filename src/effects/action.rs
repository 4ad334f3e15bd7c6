//! Action tracker: wraps an async function and tracks its status.

use crate::core::{
    ActionState, LivenessProbe, Phase, PhaseHistory, PhaseTransition, DEFAULT_HISTORY_LIMIT,
};
use chrono::Utc;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::sync::watch;

/// Boxed future returned by a wrapped action.
pub type BoxActionFuture<T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'static>>;

/// Shared handle to the async function an action tracker wraps.
///
/// Identity matters: replacing the function with a different `Arc` counts as
/// a change, replacing it with a clone of the same `Arc` does not.
pub type ActionFn<A, T, E> = Arc<dyn Fn(A) -> BoxActionFuture<T, E> + Send + Sync>;

/// Callback invoked with the result of a successful, live completion.
pub type SuccessCallback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Callback invoked with the reason of a failed, live completion.
pub type ErrorCallback<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Wrap an async closure as an [`ActionFn`].
///
/// # Example
///
/// ```rust
/// use liveaction::effects::{action_fn, ActionFn};
///
/// let double: ActionFn<u32, u32, String> = action_fn(|n: u32| async move { Ok(n * 2) });
/// ```
pub fn action_fn<A, T, E, F, Fut>(f: F) -> ActionFn<A, T, E>
where
    A: 'static,
    T: 'static,
    E: 'static,
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    Arc::new(move |args: A| -> BoxActionFuture<T, E> { Box::pin(f(args)) })
}

/// Optional hooks run on live completions.
pub struct ActionConfig<T, E> {
    pub on_success: Option<SuccessCallback<T>>,
    pub on_error: Option<ErrorCallback<E>>,
}

impl<T, E> Default for ActionConfig<T, E> {
    fn default() -> Self {
        Self {
            on_success: None,
            on_error: None,
        }
    }
}

impl<T, E> Clone for ActionConfig<T, E> {
    fn clone(&self) -> Self {
        Self {
            on_success: self.on_success.clone(),
            on_error: self.on_error.clone(),
        }
    }
}

struct TrackerInner<A, T, E> {
    action: RwLock<ActionFn<A, T, E>>,
    config: ActionConfig<T, E>,
    liveness: LivenessProbe,
    status: watch::Sender<ActionState<E>>,
    history: Mutex<PhaseHistory>,
    invocations: AtomicU64,
}

impl<A, T, E> TrackerInner<A, T, E> {
    fn record(&self, to: Phase, invocation: u64) {
        let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        let from = history.current();
        history.record(PhaseTransition {
            from,
            to,
            timestamp: Utc::now(),
            invocation,
        });
    }
}

/// Tracks loading, initial-loading and error status of an async function.
///
/// Every invocation writes state at exactly two points: `is_loading = true`
/// when it starts (always), and the completion writes once the function
/// resolves (only if the host is still live). Overlapping invocations are not
/// sequenced; whichever completes last while live wins.
///
/// Cloning a tracker yields another handle to the same state.
///
/// # Example
///
/// ```rust
/// use liveaction::core::LivenessGuard;
/// use liveaction::effects::{action_fn, ActionConfig, ActionTracker};
///
/// # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// # rt.block_on(async {
/// let guard = LivenessGuard::new();
/// guard.activate();
///
/// let tracker: ActionTracker<u32, u32, String> = ActionTracker::new(
///     action_fn(|n: u32| async move { Ok(n + 1) }),
///     guard.probe(),
///     ActionConfig::default(),
/// );
///
/// assert!(tracker.is_initial_loading());
/// assert_eq!(tracker.action(41).await, Some(42));
/// assert!(!tracker.is_initial_loading());
/// assert!(!tracker.is_loading());
/// # });
/// ```
pub struct ActionTracker<A, T, E> {
    inner: Arc<TrackerInner<A, T, E>>,
}

impl<A, T, E> Clone for ActionTracker<A, T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A, T, E> ActionTracker<A, T, E>
where
    A: Send + 'static,
    T: Send + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Create a tracker with the default history limit.
    pub fn new(
        action: ActionFn<A, T, E>,
        liveness: LivenessProbe,
        config: ActionConfig<T, E>,
    ) -> Self {
        Self::with_history_limit(action, liveness, config, DEFAULT_HISTORY_LIMIT)
    }

    /// Create a tracker keeping at most `history_limit` phase transitions.
    pub fn with_history_limit(
        action: ActionFn<A, T, E>,
        liveness: LivenessProbe,
        config: ActionConfig<T, E>,
        history_limit: usize,
    ) -> Self {
        let (status, _) = watch::channel(ActionState::default());
        Self {
            inner: Arc::new(TrackerInner {
                action: RwLock::new(action),
                config,
                liveness,
                status,
                history: Mutex::new(PhaseHistory::with_limit(history_limit)),
                invocations: AtomicU64::new(0),
            }),
        }
    }

    /// Invoke the wrapped function.
    ///
    /// `is_loading` is set and the function is called before this returns;
    /// the returned future drives the call to completion. It resolves to the
    /// function's result, or `None` if the function failed. Failures are
    /// never re-raised: they surface through [`error`](Self::error) and the
    /// `on_error` hook instead.
    ///
    /// If the host is no longer live when the function resolves, no state is
    /// written and no hook runs. The result is still returned.
    pub fn action(&self, args: A) -> impl Future<Output = Option<T>> + Send + 'static {
        let inner = Arc::clone(&self.inner);
        let invocation = inner.invocations.fetch_add(1, Ordering::Relaxed) + 1;
        let action = Arc::clone(&*inner.action.read().unwrap_or_else(PoisonError::into_inner));

        inner.status.send_modify(|s| s.is_loading = true);
        inner.record(Phase::Loading, invocation);
        tracing::debug!(invocation, "action started");

        let pending = action(args);

        async move {
            let result = match pending.await {
                Ok(value) => {
                    if inner.liveness.is_live() {
                        if let Some(on_success) = &inner.config.on_success {
                            on_success(&value);
                        }
                    }
                    Some(value)
                }
                Err(reason) => {
                    if inner.liveness.is_live() {
                        inner.status.send_modify(|s| s.error = Some(reason.clone()));
                        if let Some(on_error) = &inner.config.on_error {
                            on_error(&reason);
                        }
                    }
                    None
                }
            };

            if inner.liveness.is_live() {
                inner.status.send_modify(|s| {
                    s.is_initial_loading = false;
                    s.is_loading = false;
                });
                let phase = if result.is_some() {
                    Phase::Succeeded
                } else {
                    Phase::Failed
                };
                inner.record(phase, invocation);
                tracing::debug!(invocation, phase = phase.name(), "action settled");
            } else {
                tracing::trace!(invocation, "host retired before completion; state untouched");
            }

            result
        }
    }

    /// Replace the wrapped function, keeping all state.
    ///
    /// Returns `true` if the new function is a different `Arc` than the
    /// current one.
    pub fn set_action(&self, action: ActionFn<A, T, E>) -> bool {
        let mut current = self
            .inner
            .action
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let changed = !Arc::ptr_eq(&current, &action);
        *current = action;
        changed
    }
}

impl<A, T, E: Clone> ActionTracker<A, T, E> {
    /// Snapshot of all status signals.
    pub fn state(&self) -> ActionState<E> {
        self.inner.status.borrow().clone()
    }

    /// Whether the most recent invocation is still awaiting its result.
    ///
    /// Set eagerly when [`action`](Self::action) is called and cleared only
    /// by a completion that lands while the host is live.
    pub fn is_loading(&self) -> bool {
        self.inner.status.borrow().is_loading
    }

    /// True until the first live completion, success or failure.
    pub fn is_initial_loading(&self) -> bool {
        self.inner.status.borrow().is_initial_loading
    }

    /// Reason of the most recent live failure.
    pub fn error(&self) -> Option<E> {
        self.inner.status.borrow().error.clone()
    }

    /// Receiver notified on every status write.
    pub fn subscribe(&self) -> watch::Receiver<ActionState<E>> {
        self.inner.status.subscribe()
    }

    /// Phase after the most recent applied write.
    pub fn phase(&self) -> Phase {
        self.inner
            .history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .current()
    }

    /// Copy of the phase history.
    pub fn history(&self) -> PhaseHistory {
        self.inner
            .history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn liveness(&self) -> &LivenessProbe {
        &self.inner.liveness
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LivenessGuard;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tokio::sync::oneshot;

    const FAKE_RESPONSE: &str = "fakeResponse";
    const FAKE_REJECT: &str = "rejected";

    fn live_guard() -> LivenessGuard {
        let guard = LivenessGuard::new();
        guard.activate();
        guard
    }

    fn resolving(guard: &LivenessGuard) -> ActionTracker<String, String, String> {
        ActionTracker::new(
            action_fn(|value: String| async move { Ok(value) }),
            guard.probe(),
            ActionConfig::default(),
        )
    }

    fn rejecting(
        guard: &LivenessGuard,
        config: ActionConfig<String, String>,
    ) -> ActionTracker<String, String, String> {
        ActionTracker::new(
            action_fn(|reason: String| async move { Err::<String, _>(reason) }),
            guard.probe(),
            config,
        )
    }

    #[test]
    fn initial_state_before_any_invocation() {
        let guard = live_guard();
        let tracker = resolving(&guard);

        assert!(!tracker.is_loading());
        assert!(tracker.is_initial_loading());
        assert_eq!(tracker.error(), None);
        assert_eq!(tracker.phase(), Phase::Initial);
    }

    #[tokio::test]
    async fn action_returns_result_on_success() {
        let guard = live_guard();
        let tracker = resolving(&guard);

        let result = tracker.action(FAKE_RESPONSE.to_string()).await;

        assert_eq!(result.as_deref(), Some(FAKE_RESPONSE));
        assert!(!tracker.is_initial_loading());
        assert!(!tracker.is_loading());
        assert_eq!(tracker.phase(), Phase::Succeeded);
    }

    #[tokio::test]
    async fn action_returns_none_on_failure() {
        let guard = live_guard();
        let tracker = rejecting(&guard, ActionConfig::default());

        let result = tracker.action(FAKE_REJECT.to_string()).await;

        assert_eq!(result, None);
        assert_eq!(tracker.error().as_deref(), Some(FAKE_REJECT));
        assert!(!tracker.is_initial_loading());
        assert!(!tracker.is_loading());
        assert_eq!(tracker.phase(), Phase::Failed);
    }

    #[tokio::test]
    async fn on_success_receives_result() {
        let guard = live_guard();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let config: ActionConfig<String, String> = ActionConfig {
            on_success: Some(Arc::new(move |value: &String| {
                sink.lock().unwrap().push(value.clone())
            })),
            on_error: None,
        };
        let tracker: ActionTracker<String, String, String> = ActionTracker::new(
            action_fn(|value: String| async move { Ok(value) }),
            guard.probe(),
            config,
        );

        tracker.action(FAKE_RESPONSE.to_string()).await;

        assert_eq!(*seen.lock().unwrap(), vec![FAKE_RESPONSE.to_string()]);
    }

    #[tokio::test]
    async fn on_error_receives_reason() {
        let guard = live_guard();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let config: ActionConfig<String, String> = ActionConfig {
            on_success: None,
            on_error: Some(Arc::new(move |reason: &String| {
                sink.lock().unwrap().push(format!("This is error: {reason}"))
            })),
        };
        let tracker = rejecting(&guard, config);

        tracker.action(FAKE_REJECT.to_string()).await;

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["This is error: rejected".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn is_loading_spans_pending_call() {
        let guard = live_guard();
        let tracker: ActionTracker<u64, &'static str, String> = ActionTracker::new(
            action_fn(|timeout: u64| async move {
                tokio::time::sleep(Duration::from_millis(timeout)).await;
                Ok("resolved")
            }),
            guard.probe(),
            ActionConfig::default(),
        );

        assert!(!tracker.is_loading());

        let pending = tokio::spawn(tracker.action(1000));
        assert!(tracker.is_loading());

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!tracker.is_loading());
        assert_eq!(pending.await.unwrap(), Some("resolved"));
    }

    #[tokio::test]
    async fn error_is_not_cleared_by_later_success() {
        let guard = live_guard();
        let tracker: ActionTracker<bool, &'static str, String> = ActionTracker::new(
            action_fn(|ok: bool| async move {
                if ok {
                    Ok("fine")
                } else {
                    Err("broken".to_string())
                }
            }),
            guard.probe(),
            ActionConfig::default(),
        );

        assert_eq!(tracker.action(false).await, None);
        assert_eq!(tracker.action(true).await, Some("fine"));

        assert_eq!(tracker.error().as_deref(), Some("broken"));
        assert_eq!(tracker.phase(), Phase::Succeeded);
    }

    #[tokio::test]
    async fn completion_after_deactivation_leaves_state_untouched() {
        let guard = live_guard();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let config: ActionConfig<u8, String> = ActionConfig {
            on_success: None,
            on_error: Some(Arc::new(move |_: &String| {
                counter.fetch_add(1, Ordering::SeqCst);
            })),
        };
        let (tx, rx) = oneshot::channel::<Result<u8, String>>();
        let rx = Arc::new(Mutex::new(Some(rx)));
        let tracker: ActionTracker<(), u8, String> = ActionTracker::new(
            action_fn(move |_: ()| {
                let rx = rx.lock().unwrap().take();
                async move {
                    match rx {
                        Some(rx) => rx.await.unwrap_or_else(|_| Err("dropped".to_string())),
                        None => Err("already used".to_string()),
                    }
                }
            }),
            guard.probe(),
            config,
        );

        let pending = tracker.action(());
        let before = tracker.state();
        assert!(before.is_loading);

        guard.deactivate();
        tx.send(Err("late".to_string())).unwrap();

        assert_eq!(pending.await, None);
        assert_eq!(tracker.state(), before);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(tracker.phase(), Phase::Loading);
    }

    #[tokio::test]
    async fn success_after_deactivation_still_returns_value() {
        let guard = live_guard();
        let tracker: ActionTracker<(), u8, String> = ActionTracker::new(
            action_fn(|_: ()| async move { Ok(9) }),
            guard.probe(),
            ActionConfig::default(),
        );

        let pending = tracker.action(());
        guard.deactivate();

        assert_eq!(pending.await, Some(9));
        assert!(tracker.is_loading());
        assert!(tracker.is_initial_loading());
    }

    #[tokio::test]
    async fn dropped_guard_blocks_later_writes() {
        let guard = live_guard();
        let tracker: ActionTracker<u8, u8, String> = ActionTracker::new(
            action_fn(|value: u8| async move { Ok(value) }),
            guard.probe(),
            ActionConfig::default(),
        );

        let pending = tracker.action(1);
        drop(guard);

        assert_eq!(pending.await, Some(1));
        assert!(tracker.is_loading());
        assert!(tracker.is_initial_loading());
        assert_eq!(tracker.phase(), Phase::Loading);
    }

    #[tokio::test]
    async fn loading_is_set_even_when_not_live() {
        let guard = LivenessGuard::new();
        let tracker = resolving(&guard);

        let result = tracker.action(FAKE_RESPONSE.to_string()).await;

        assert_eq!(result.as_deref(), Some(FAKE_RESPONSE));
        assert!(tracker.is_loading());
        assert!(tracker.is_initial_loading());
    }

    #[tokio::test]
    async fn subscribers_observe_status_writes() {
        let guard = live_guard();
        let tracker = resolving(&guard);
        let mut rx = tracker.subscribe();

        tracker.action(FAKE_RESPONSE.to_string()).await;

        assert!(rx.has_changed().unwrap());
        let state = rx.borrow_and_update().clone();
        assert!(!state.is_loading);
        assert!(!state.is_initial_loading);
    }

    #[tokio::test]
    async fn history_records_applied_phases() {
        let guard = live_guard();
        let tracker = resolving(&guard);

        tracker.action("a".to_string()).await;
        tracker.action("b".to_string()).await;

        let history = tracker.history();
        assert_eq!(
            history.get_path(),
            vec![
                Phase::Initial,
                Phase::Loading,
                Phase::Succeeded,
                Phase::Loading,
                Phase::Succeeded
            ]
        );
        let invocations: Vec<u64> = history.transitions().map(|t| t.invocation).collect();
        assert_eq!(invocations, vec![1, 1, 2, 2]);
    }

    #[test]
    fn set_action_reports_identity_change() {
        let guard = live_guard();
        let first: ActionFn<(), u8, String> = action_fn(|_: ()| async move { Ok(1) });
        let tracker = ActionTracker::new(Arc::clone(&first), guard.probe(), ActionConfig::default());

        assert!(!tracker.set_action(Arc::clone(&first)));
        assert!(tracker.set_action(action_fn(|_: ()| async move { Ok(2) })));
    }

    #[tokio::test]
    async fn clones_share_state() {
        let guard = live_guard();
        let tracker = resolving(&guard);
        let other = tracker.clone();

        other.action(FAKE_RESPONSE.to_string()).await;

        assert!(!tracker.is_initial_loading());
    }
}
