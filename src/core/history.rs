//! Phase transition history.
//!
//! Records every phase change a tracker actually applied, in order, with a
//! timestamp. Completions suppressed by the liveness guard never show up
//! here. The log is bounded: once full, the oldest entry is dropped.

use super::state::Phase;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Default number of transitions kept per tracker.
pub const DEFAULT_HISTORY_LIMIT: usize = 64;

/// Record of a single applied phase change.
///
/// # Example
///
/// ```rust
/// use liveaction::core::{Phase, PhaseTransition};
/// use chrono::Utc;
///
/// let transition = PhaseTransition {
///     from: Phase::Initial,
///     to: Phase::Loading,
///     timestamp: Utc::now(),
///     invocation: 1,
/// };
/// assert_eq!(transition.to, Phase::Loading);
/// ```
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct PhaseTransition {
    /// Phase before the write
    pub from: Phase,
    /// Phase after the write
    pub to: Phase,
    /// When the write was applied
    pub timestamp: DateTime<Utc>,
    /// Sequence number of the invocation that produced the write
    pub invocation: u64,
}

/// Bounded, ordered log of phase transitions.
///
/// # Example
///
/// ```rust
/// use liveaction::core::{Phase, PhaseHistory, PhaseTransition};
/// use chrono::Utc;
///
/// let mut history = PhaseHistory::new();
/// history.record(PhaseTransition {
///     from: Phase::Initial,
///     to: Phase::Loading,
///     timestamp: Utc::now(),
///     invocation: 1,
/// });
/// history.record(PhaseTransition {
///     from: Phase::Loading,
///     to: Phase::Succeeded,
///     timestamp: Utc::now(),
///     invocation: 1,
/// });
///
/// assert_eq!(history.current(), Phase::Succeeded);
/// assert_eq!(
///     history.get_path(),
///     vec![Phase::Initial, Phase::Loading, Phase::Succeeded]
/// );
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PhaseHistory {
    transitions: VecDeque<PhaseTransition>,
    limit: usize,
    current: Phase,
}

impl Default for PhaseHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseHistory {
    /// Create an empty history with [`DEFAULT_HISTORY_LIMIT`].
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }

    /// Create an empty history keeping at most `limit` transitions.
    ///
    /// A limit of zero is clamped to one.
    pub fn with_limit(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            transitions: VecDeque::with_capacity(limit.min(DEFAULT_HISTORY_LIMIT)),
            limit,
            current: Phase::Initial,
        }
    }

    /// Append a transition, evicting the oldest one when full.
    ///
    /// # Example
    ///
    /// ```rust
    /// use chrono::Utc;
    /// use liveaction::core::{Phase, PhaseHistory, PhaseTransition};
    ///
    /// let mut history = PhaseHistory::with_limit(2);
    /// for (i, (from, to)) in [
    ///     (Phase::Initial, Phase::Loading),
    ///     (Phase::Loading, Phase::Succeeded),
    ///     (Phase::Succeeded, Phase::Loading),
    /// ]
    /// .into_iter()
    /// .enumerate()
    /// {
    ///     history.record(PhaseTransition {
    ///         from,
    ///         to,
    ///         timestamp: Utc::now(),
    ///         invocation: i as u64,
    ///     });
    /// }
    ///
    /// assert_eq!(history.len(), 2);
    /// assert_eq!(history.current(), Phase::Loading);
    /// assert_eq!(
    ///     history.get_path(),
    ///     vec![Phase::Loading, Phase::Succeeded, Phase::Loading]
    /// );
    /// ```
    pub fn record(&mut self, transition: PhaseTransition) {
        if self.transitions.len() == self.limit {
            self.transitions.pop_front();
        }
        self.current = transition.to;
        self.transitions.push_back(transition);
    }

    /// Phase after the most recent transition, `Initial` if none.
    pub fn current(&self) -> Phase {
        self.current
    }

    /// Phases traversed: the first retained `from`, then every `to`.
    pub fn get_path(&self) -> Vec<Phase> {
        let mut path = Vec::with_capacity(self.transitions.len() + 1);
        if let Some(first) = self.transitions.front() {
            path.push(first.from);
        }
        path.extend(self.transitions.iter().map(|t| t.to));
        path
    }

    /// Time between the first and last retained transitions.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.transitions.front()?, self.transitions.back()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    /// Retained transitions, oldest first.
    pub fn transitions(&self) -> impl Iterator<Item = &PhaseTransition> {
        self.transitions.iter()
    }

    /// Number of retained transitions.
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// True if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Maximum number of transitions kept.
    pub fn limit(&self) -> usize {
        self.limit
    }
}
