//! Point-in-time export of a query's observable state.
//!
//! Snapshots are for diagnostics: attach them to bug reports, log them, diff
//! them in tests. They are never fed back into a controller, since state does
//! not outlive its host.

use crate::core::{Phase, PhaseHistory, QueryState};
use crate::effects::QueryController;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod error;

pub use error::SnapshotError;

/// Version identifier for snapshot format
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable copy of a query's data, status and phase history.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuerySnapshot<T, E> {
    /// Snapshot format version
    pub version: u32,

    /// Unique snapshot identifier
    pub id: Uuid,

    /// When the snapshot was taken
    pub taken_at: DateTime<Utc>,

    /// Data and status signals
    pub state: QueryState<T, E>,

    /// Phase at capture time
    pub phase: Phase,

    /// Retained phase transitions
    pub history: PhaseHistory,
}

impl<T, E> QuerySnapshot<T, E> {
    fn check_version(self) -> Result<Self, SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        Ok(self)
    }
}

impl<T, E> QuerySnapshot<T, E>
where
    T: Serialize + DeserializeOwned,
    E: Serialize + DeserializeOwned,
{
    /// Encode as compact JSON.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string(self).map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    /// Encode as indented JSON, for logs and bug reports.
    pub fn to_json_pretty(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    /// Decode a JSON snapshot, rejecting other format versions.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(json)
            .map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))?;
        snapshot.check_version()
    }

    /// Encode with bincode.
    pub fn to_binary(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode::serialize(self).map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    /// Decode a binary snapshot, rejecting other format versions.
    pub fn from_binary(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: Self = bincode::deserialize(bytes)
            .map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))?;
        snapshot.check_version()
    }
}

impl<A, T: Clone, E: Clone> QueryController<A, T, E> {
    /// Capture the current data, status and history.
    ///
    /// # Example
    ///
    /// ```rust
    /// use liveaction::builder::QueryControllerBuilder;
    /// use liveaction::host::Host;
    /// use liveaction::{Phase, QuerySnapshot};
    ///
    /// let host = Host::new("report");
    /// let query = QueryControllerBuilder::new()
    ///     .action(|id: u32| async move { Ok::<_, String>(id * 2) })
    ///     .liveness(host.probe())
    ///     .build()
    ///     .unwrap();
    ///
    /// let snapshot = query.snapshot();
    /// assert_eq!(snapshot.phase, Phase::Initial);
    /// assert!(snapshot.state.is_initial_loading);
    ///
    /// let json = snapshot.to_json().unwrap();
    /// let decoded: QuerySnapshot<u32, String> = QuerySnapshot::from_json(&json).unwrap();
    /// assert_eq!(decoded.id, snapshot.id);
    /// ```
    pub fn snapshot(&self) -> QuerySnapshot<T, E> {
        QuerySnapshot {
            version: SNAPSHOT_VERSION,
            id: Uuid::new_v4(),
            taken_at: Utc::now(),
            state: self.state(),
            phase: self.phase(),
            history: self.history(),
        }
    }
}
