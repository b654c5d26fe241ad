//! Logical sequence clock.
//!
//! Stands in for block height: a monotonically increasing counter owned by
//! the ledger and advanced once per mutating operation.

use agora_types::Sequence;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceClock {
    current: Sequence,
}

impl SequenceClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume a clock at a known position (snapshot restore).
    pub fn starting_at(current: Sequence) -> Self {
        Self { current }
    }

    /// The sequence of the most recently applied mutation.
    pub fn current(&self) -> Sequence {
        self.current
    }

    /// Move to the next sequence and return it.
    pub fn advance(&mut self) -> Sequence {
        self.current = self.current.saturating_add(1);
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero_and_advances_by_one() {
        let mut clock = SequenceClock::new();
        assert_eq!(clock.current(), 0);
        assert_eq!(clock.advance(), 1);
        assert_eq!(clock.advance(), 2);
        assert_eq!(clock.current(), 2);
    }

    #[test]
    fn resume_from_snapshot() {
        let mut clock = SequenceClock::starting_at(41);
        assert_eq!(clock.advance(), 42);
    }
}
