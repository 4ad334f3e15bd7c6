//! Build errors for tracker and query builders.

use thiserror::Error;

/// Errors that can occur when building trackers and queries.
#[derive(Debug, Error, PartialEq)]
pub enum BuildError {
    #[error("Action not specified. Call .action(fn) before .build()")]
    MissingAction,

    #[error("Liveness not specified. Call .liveness(probe) or .host(&host) before .build()")]
    MissingLiveness,

    #[error("History limit must be at least 1, got {0}")]
    InvalidHistoryLimit(usize),
}
