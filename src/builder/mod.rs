//! Builder API for ergonomic tracker and query construction.
//!
//! Builders validate that the required pieces (the wrapped function and a
//! liveness source) are present and return a [`BuildError`] otherwise.

pub mod action;
pub mod error;
pub mod query;

pub use action::ActionTrackerBuilder;
pub use error::BuildError;
pub use query::QueryControllerBuilder;
