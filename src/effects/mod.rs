//! Async trackers around user-supplied functions.
//!
//! This module is the "imperative shell" around [`crate::core`]: it awaits
//! the wrapped function and applies the liveness-gated writes.
//!
//! # Key Concepts
//!
//! - **Action tracker**: one function, three status signals, no scheduling
//! - **Query controller**: a tracker plus fetch-on-activation and cached data
//! - **Liveness gate**: completions observed after teardown write nothing
//!
//! Both types are cheap to clone and `Send + Sync`, so they can be handed to
//! spawned tasks and UI callbacks alike.

mod action;
mod query;

pub use action::{
    action_fn, ActionConfig, ActionFn, ActionTracker, BoxActionFuture, ErrorCallback,
    SuccessCallback,
};
pub use query::{QueryConfig, QueryController};
