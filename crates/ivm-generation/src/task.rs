//! Observable state of one generation request

use serde::{Deserialize, Serialize};

/// Lifecycle of a generation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Nothing started, or a run was abandoned
    #[default]
    Idle,
    /// Operation in flight (includes the floor wait and the hold at 100%)
    Running,
    /// Operation resolved and the result was handed back
    Succeeded,
    /// Validation or the operation failed; `error` is set
    Failed,
}

/// Snapshot published to observers after every change
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GenerationTask {
    /// Sequence number of the run this snapshot belongs to
    pub run: u64,
    /// Current status
    pub status: TaskStatus,
    /// Synthetic progress in `[0, 100]`
    pub progress: f64,
    /// User-facing message, present only when `Failed`
    pub error: Option<String>,
}

impl GenerationTask {
    /// Whether a run is in flight
    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status == TaskStatus::Running
    }

    /// Progress rounded for display
    #[inline]
    #[must_use]
    pub fn percent(&self) -> u8 {
        // progress is clamped to [0, 100] before every publish
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let pct = self.progress.round().clamp(0.0, 100.0) as u8;
        pct
    }
}
