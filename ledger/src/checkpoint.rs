//! Append-only checkpoint history with binary-search lookups.
//!
//! Checkpoints are kept sorted by sequence (strictly increasing). A value
//! "at" sequence `s` is the value of the last checkpoint whose sequence is
//! `<= s`, or zero when there is none.

use agora_types::Sequence;
use serde::{Deserialize, Serialize};

/// A recorded value in force from `sequence` onward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub sequence: Sequence,
    pub value: u128,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointHistory {
    checkpoints: Vec<Checkpoint>,
}

impl CheckpointHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from checkpoints that are already strictly increasing.
    /// Returns `None` if the ordering is violated.
    pub fn from_checkpoints(checkpoints: Vec<Checkpoint>) -> Option<Self> {
        let ordered = checkpoints
            .windows(2)
            .all(|pair| pair[0].sequence < pair[1].sequence);
        ordered.then_some(Self { checkpoints })
    }

    /// Record `value` at `sequence`.
    ///
    /// A write at the sequence of the latest checkpoint replaces its value,
    /// so several writes inside one operation leave a single checkpoint.
    pub fn push(&mut self, sequence: Sequence, value: u128) {
        match self.checkpoints.last_mut() {
            Some(last) if last.sequence >= sequence => {
                debug_assert_eq!(last.sequence, sequence, "checkpoint sequence went backwards");
                last.value = value;
            }
            _ => self.checkpoints.push(Checkpoint { sequence, value }),
        }
    }

    /// The most recent value, or zero.
    pub fn latest(&self) -> u128 {
        self.checkpoints.last().map_or(0, |c| c.value)
    }

    /// The value in force at `sequence`.
    pub fn at(&self, sequence: Sequence) -> u128 {
        // Fast path: most lookups target recent sequences.
        if let Some(last) = self.checkpoints.last() {
            if last.sequence <= sequence {
                return last.value;
            }
        }
        let idx = self.checkpoints.partition_point(|c| c.sequence <= sequence);
        if idx == 0 {
            0
        } else {
            self.checkpoints[idx - 1].value
        }
    }

    pub fn as_slice(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }
}
