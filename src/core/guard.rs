//! Liveness guard for host-scoped async work.
//!
//! A guard answers one question synchronously: is the owning host still
//! active? Async completions consult it before writing any state, so a
//! response that arrives after teardown cannot mutate anything.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

const PENDING: u8 = 0;
const LIVE: u8 = 1;
const RETIRED: u8 = 2;

/// Tracks whether the owning host is currently active.
///
/// The flag moves forward only: `Pending -> Live -> Retired`. Once retired a
/// guard never becomes live again; a reactivated host gets a fresh guard.
///
/// # Example
///
/// ```rust
/// use liveaction::core::LivenessGuard;
///
/// let guard = LivenessGuard::new();
/// assert!(!guard.is_live());
///
/// guard.activate();
/// assert!(guard.is_live());
///
/// guard.deactivate();
/// assert!(!guard.is_live());
///
/// // Retired guards stay retired.
/// assert!(!guard.activate());
/// assert!(!guard.is_live());
/// ```
#[derive(Debug)]
pub struct LivenessGuard {
    flag: Arc<AtomicU8>,
}

impl LivenessGuard {
    /// Create a guard for a host that has not been activated yet.
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicU8::new(PENDING)),
        }
    }

    /// Mark the host as active.
    ///
    /// Returns whether the guard is live afterwards. Activating an already
    /// live guard is a no-op; activating a retired guard is rejected.
    pub fn activate(&self) -> bool {
        self.try_activate() || self.is_live()
    }

    /// Move the guard from `Pending` to `Live`.
    ///
    /// Returns `true` only for the one call that performed the transition,
    /// so concurrent activations can tell which of them should run
    /// activation side effects.
    ///
    /// # Example
    ///
    /// ```rust
    /// use liveaction::core::LivenessGuard;
    ///
    /// let guard = LivenessGuard::new();
    /// assert!(guard.try_activate());
    /// assert!(!guard.try_activate());
    /// assert!(guard.is_live());
    /// ```
    pub fn try_activate(&self) -> bool {
        match self
            .flag
            .compare_exchange(PENDING, LIVE, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => true,
            Err(RETIRED) => {
                tracing::warn!("ignoring activation of a retired liveness guard");
                false
            }
            Err(_) => false,
        }
    }

    /// Mark the host as torn down.
    ///
    /// Returns `true` only for the call that retired the guard; later calls
    /// are no-ops returning `false`.
    pub fn deactivate(&self) -> bool {
        self.flag.swap(RETIRED, Ordering::AcqRel) != RETIRED
    }

    /// Point-in-time liveness read.
    pub fn is_live(&self) -> bool {
        self.flag.load(Ordering::Acquire) == LIVE
    }

    /// True once the guard has been deactivated.
    pub fn is_retired(&self) -> bool {
        self.flag.load(Ordering::Acquire) == RETIRED
    }

    /// Read-only handle observing this guard's flag.
    pub fn probe(&self) -> LivenessProbe {
        LivenessProbe {
            flag: Arc::clone(&self.flag),
        }
    }
}

impl Default for LivenessGuard {
    fn default() -> Self {
        Self::new()
    }
}

// Probes may outlive the guard; they must not keep reporting live.
impl Drop for LivenessGuard {
    fn drop(&mut self) {
        self.deactivate();
    }
}

/// Read-only view of a [`LivenessGuard`].
///
/// Handed to trackers and controllers built inside a host. Probes cannot
/// change the flag, only observe it.
#[derive(Clone, Debug)]
pub struct LivenessProbe {
    flag: Arc<AtomicU8>,
}

impl LivenessProbe {
    /// Point-in-time liveness read.
    pub fn is_live(&self) -> bool {
        self.flag.load(Ordering::Acquire) == LIVE
    }
}
