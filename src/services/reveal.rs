use tracing::info;

use crate::models::Status;

/// A frozen sequence of standings snapshots published by the operator tool.
/// Reveal mode walks the ranking forward one finalized team at a time: each
/// successive snapshot finalizes one more row, and the broadcast channel
/// advances an index over them instead of showing live standings.
#[derive(Debug, Default)]
pub struct RevealSequence {
    snapshots: Vec<Vec<Status>>,
}

impl RevealSequence {
    pub fn new(snapshots: Vec<Vec<Status>>) -> Self {
        info!("Loaded reveal sequence with {} snapshot(s)", snapshots.len());
        Self { snapshots }
    }

    /// Reveal mode is active while a snapshot list is loaded.
    pub fn is_active(&self) -> bool {
        !self.snapshots.is_empty()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    /// The snapshot selected by the broadcast reveal index. The operator
    /// tool owns the index; it is clamped into range so the engine stays
    /// total on any input.
    pub fn snapshot_at(&self, index: usize) -> Option<&[Status]> {
        if self.snapshots.is_empty() {
            return None;
        }
        let clamped = index.min(self.snapshots.len() - 1);
        Some(&self.snapshots[clamped])
    }
}
