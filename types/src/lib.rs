//! Fundamental types for the Agora governance engine.
//!
//! This crate defines the value types shared across every other crate in the
//! workspace: account addresses, proposal ids, timestamps, the logical
//! sequence marker, and the vote / lifecycle enums.

pub mod address;
pub mod error;
pub mod hash;
pub mod time;
pub mod vote;

pub use address::Address;
pub use error::TypesError;
pub use hash::ProposalId;
pub use time::Timestamp;
pub use vote::{ProposalState, Support, VotingType};

/// Position on the ledger's logical clock.
///
/// Advanced by one on every mutating ledger operation; proposals fix one as
/// their snapshot point.
pub type Sequence = u64;
