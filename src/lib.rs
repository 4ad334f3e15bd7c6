//! Liveaction: liveness-guarded async actions and queries
//!
//! Liveaction tracks the progress of async work started from a mortal host
//! (a UI component, a session, any scope that can be torn down while its
//! futures are still pending). Status writes that would land after teardown
//! are dropped, so a slow response can never mutate a dead host's state.
//!
//! # Core Concepts
//!
//! - **Liveness guard**: point-in-time answer to "is the host still active?"
//! - **Action tracker**: wraps an async function and exposes `is_loading`,
//!   `is_initial_loading` and `error`
//! - **Query controller**: a tracker that fetches when the host activates and
//!   caches the last successful result
//! - **Host**: the explicit lifecycle that drives guards and queries
//!
//! # Example
//!
//! ```rust
//! use liveaction::builder::QueryControllerBuilder;
//! use liveaction::host::Host;
//!
//! # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # rt.block_on(async {
//! let host = Host::new("inbox");
//! let query = QueryControllerBuilder::new()
//!     .action(|folder: String| async move {
//!         if folder == "inbox" {
//!             Ok(vec!["hello".to_string()])
//!         } else {
//!             Err(format!("unknown folder {folder}"))
//!         }
//!     })
//!     .args("inbox".to_string())
//!     .mount(&host)
//!     .unwrap();
//!
//! assert!(query.is_initial_loading());
//! host.activate();
//! query.subscribe_status().wait_for(|s| !s.is_loading).await.unwrap();
//!
//! assert_eq!(query.data(), Some(vec!["hello".to_string()]));
//!
//! query.fetch(Some("spam".to_string())).await;
//! assert_eq!(query.data(), Some(vec!["hello".to_string()]));
//! assert_eq!(query.error().as_deref(), Some("unknown folder spam"));
//! # });
//! ```

pub mod builder;
pub mod core;
pub mod effects;
pub mod host;
pub mod snapshot;

// Re-export commonly used types
pub use builder::{ActionTrackerBuilder, BuildError, QueryControllerBuilder};
pub use crate::core::{ActionState, LivenessGuard, LivenessProbe, Phase, QueryState};
pub use effects::{action_fn, ActionConfig, ActionFn, ActionTracker, QueryConfig, QueryController};
pub use host::{Host, Lifecycle};
pub use snapshot::{QuerySnapshot, SnapshotError};
