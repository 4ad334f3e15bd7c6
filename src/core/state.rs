//! Observable state of actions and queries.
//!
//! These are plain values: trackers own them and hand out clones, so a
//! reader never holds a lock or borrows across an await.

use serde::{Deserialize, Serialize};

/// Conceptual phase of an action or query.
///
/// ```text
/// Initial -> Loading -> { Succeeded | Failed } -> Loading -> ...
/// ```
///
/// `Succeeded` and `Failed` are the ready-idle phases, tagged with the
/// outcome of the completion that produced them. No phase is final.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Phase {
    Initial,
    Loading,
    Succeeded,
    Failed,
}

impl Phase {
    /// Stable name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Initial => "Initial",
            Self::Loading => "Loading",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
        }
    }

    /// True for the phase reached through a failed completion.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed)
    }

    /// True when no completion-observed invocation is outstanding.
    pub fn is_idle(&self) -> bool {
        !matches!(self, Self::Loading)
    }
}

/// Status signals of one action tracker.
///
/// # Example
///
/// ```rust
/// use liveaction::core::ActionState;
///
/// let state: ActionState<String> = ActionState::default();
/// assert!(!state.is_loading);
/// assert!(state.is_initial_loading);
/// assert!(state.error.is_none());
/// ```
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ActionState<E> {
    /// An invocation has started and its completion was not yet observed while live.
    pub is_loading: bool,
    /// No invocation has completed while the host was live.
    pub is_initial_loading: bool,
    /// Reason of the most recent failure. Never cleared by a later success.
    pub error: Option<E>,
}

impl<E> Default for ActionState<E> {
    fn default() -> Self {
        Self {
            is_loading: false,
            is_initial_loading: true,
            error: None,
        }
    }
}

/// Status signals of a query plus its last successful result.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct QueryState<T, E> {
    /// Last successful result. Left untouched by failures.
    pub data: Option<T>,
    pub is_loading: bool,
    pub is_initial_loading: bool,
    pub error: Option<E>,
}

impl<T, E> QueryState<T, E> {
    /// Combine cached data with the tracker's status signals.
    pub fn from_parts(data: Option<T>, status: ActionState<E>) -> Self {
        Self {
            data,
            is_loading: status.is_loading,
            is_initial_loading: status.is_initial_loading,
            error: status.error,
        }
    }
}

impl<T, E> Default for QueryState<T, E> {
    fn default() -> Self {
        Self::from_parts(None, ActionState::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_name_returns_correct_value() {
        assert_eq!(Phase::Initial.name(), "Initial");
        assert_eq!(Phase::Loading.name(), "Loading");
        assert_eq!(Phase::Succeeded.name(), "Succeeded");
        assert_eq!(Phase::Failed.name(), "Failed");
    }

    #[test]
    fn only_failed_is_error() {
        assert!(!Phase::Initial.is_error());
        assert!(!Phase::Loading.is_error());
        assert!(!Phase::Succeeded.is_error());
        assert!(Phase::Failed.is_error());
    }

    #[test]
    fn loading_is_the_only_busy_phase() {
        assert!(Phase::Initial.is_idle());
        assert!(!Phase::Loading.is_idle());
        assert!(Phase::Succeeded.is_idle());
        assert!(Phase::Failed.is_idle());
    }

    #[test]
    fn default_action_state_is_initial() {
        let state: ActionState<String> = ActionState::default();
        assert!(!state.is_loading);
        assert!(state.is_initial_loading);
        assert_eq!(state.error, None);
    }

    #[test]
    fn query_state_takes_status_from_action_state() {
        let status = ActionState {
            is_loading: true,
            is_initial_loading: false,
            error: Some("boom".to_string()),
        };
        let state = QueryState::from_parts(Some(7u32), status);

        assert_eq!(state.data, Some(7));
        assert!(state.is_loading);
        assert!(!state.is_initial_loading);
        assert_eq!(state.error.as_deref(), Some("boom"));
    }

    #[test]
    fn action_state_serializes_correctly() {
        let state = ActionState {
            is_loading: false,
            is_initial_loading: false,
            error: Some("rejected".to_string()),
        };
        let json = serde_json::to_string(&state).unwrap();
        let deserialized: ActionState<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(state, deserialized);
    }
}
