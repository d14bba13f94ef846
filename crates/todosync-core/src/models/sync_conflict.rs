//! Sync conflict model

use serde::{Deserialize, Serialize};

/// Incoming record rejected by last-write-wins during a pull
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConflict {
    /// Conflict row identifier
    pub id: i64,
    /// Task involved in the conflict
    pub task_id: String,
    /// Local record's `sync_time` when the conflict occurred
    pub local_sync_time: i64,
    /// Incoming record's `sync_time` that was rejected
    pub incoming_sync_time: i64,
    /// Resolution timestamp (unix ms)
    pub resolved_at: i64,
    /// Resolution strategy name
    pub strategy: String,
}
