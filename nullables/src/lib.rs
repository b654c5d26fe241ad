//! Nullable infrastructure for deterministic testing.
//!
//! The governor takes time and proposal execution from its caller. This
//! crate provides test-friendly stand-ins for both that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Record what they were asked to do
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod executor;

pub use clock::NullClock;
pub use executor::{ExecutedProposal, NullExecutor};
