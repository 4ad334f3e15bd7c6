//! Explicit host lifecycle.
//!
//! A [`Host`] stands in for the mortal scope (a UI component, a session, a
//! request handler) that owns trackers and queries. It owns the scope's
//! [`LivenessGuard`] and fans activation/deactivation out to registered
//! [`Lifecycle`] observers, which is how queries learn to fetch on activation.
//!
//! ```text
//! Host::activate()
//!   ├─► LivenessGuard::activate()
//!   └─► for each observer (registration order): on_activate()
//!
//! Host::deactivate()  (also on drop)
//!   ├─► LivenessGuard::deactivate()
//!   └─► for each observer (registration order): on_deactivate()
//! ```

use crate::core::{LivenessGuard, LivenessProbe};
use std::borrow::Cow;
use std::sync::{Arc, Mutex, PoisonError};

/// Observer of host activation and deactivation.
///
/// Callbacks run synchronously on the thread that drives the host; anything
/// async should be spawned rather than awaited.
pub trait Lifecycle: Send + Sync + 'static {
    /// Called after the host became live.
    fn on_activate(&self);

    /// Called after the host was torn down.
    fn on_deactivate(&self) {}

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Owner of a liveness guard and its lifecycle observers.
///
/// A host activates at most once. After deactivation it stays dead; build a
/// new host (and new trackers) to start over.
///
/// # Example
///
/// ```rust
/// use liveaction::host::{Host, Lifecycle};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// struct Counter(AtomicUsize);
///
/// impl Lifecycle for Counter {
///     fn on_activate(&self) {
///         self.0.fetch_add(1, Ordering::SeqCst);
///     }
/// }
///
/// let counter = Arc::new(Counter(AtomicUsize::new(0)));
/// let host = Host::new("profile-panel");
/// host.observe(counter.clone());
///
/// host.activate();
/// assert!(host.is_live());
/// assert_eq!(counter.0.load(Ordering::SeqCst), 1);
///
/// host.deactivate();
/// host.activate();
/// assert!(!host.is_live());
/// assert_eq!(counter.0.load(Ordering::SeqCst), 1);
/// ```
pub struct Host {
    name: Cow<'static, str>,
    guard: LivenessGuard,
    observers: Mutex<Vec<Arc<dyn Lifecycle>>>,
}

impl Host {
    /// Create an inactive host. `name` only appears in logs.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            guard: LivenessGuard::new(),
            observers: Mutex::new(Vec::new()),
        }
    }

    /// Name given at construction.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Liveness handle for trackers and queries built in this host.
    pub fn probe(&self) -> LivenessProbe {
        self.guard.probe()
    }

    /// Whether the host has been activated and not yet torn down.
    pub fn is_live(&self) -> bool {
        self.guard.is_live()
    }

    /// Register an observer. Observers added after activation are not
    /// replayed; register before calling [`activate`](Self::activate).
    pub fn observe(&self, observer: Arc<dyn Lifecycle>) {
        self.lock_observers().push(observer);
    }

    /// Activate the host and notify observers.
    ///
    /// Returns `false` without notifying anyone if the host is already live
    /// or has been deactivated.
    pub fn activate(&self) -> bool {
        if self.guard.is_retired() || !self.guard.try_activate() {
            return false;
        }
        tracing::debug!(host = %self.name, "host activated");
        for observer in self.snapshot() {
            tracing::trace!(host = %self.name, observer = observer.name(), "on_activate");
            observer.on_activate();
        }
        true
    }

    /// Tear the host down and notify observers. Idempotent.
    pub fn deactivate(&self) {
        if !self.guard.deactivate() {
            return;
        }
        tracing::debug!(host = %self.name, "host deactivated");
        for observer in self.snapshot() {
            tracing::trace!(host = %self.name, observer = observer.name(), "on_deactivate");
            observer.on_deactivate();
        }
    }

    // Observers are invoked without the lock held so they may call back
    // into the host.
    fn snapshot(&self) -> Vec<Arc<dyn Lifecycle>> {
        self.lock_observers().clone()
    }

    fn lock_observers(&self) -> std::sync::MutexGuard<'_, Vec<Arc<dyn Lifecycle>>> {
        self.observers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Host {
    fn drop(&mut self) {
        self.deactivate();
    }
}
