//! Core liveness and state types.
//!
//! This module contains the synchronous building blocks:
//! - The liveness guard that gates every post-completion write
//! - Status values for actions and queries
//! - Bounded phase history
//!
//! Nothing in here awaits; the async shell lives in [`crate::effects`].

mod guard;
mod history;
mod state;

pub use guard::{LivenessGuard, LivenessProbe};
pub use history::{PhaseHistory, PhaseTransition, DEFAULT_HISTORY_LIMIT};
pub use state::{ActionState, Phase, QueryState};
