//! Governance for the Agora token.
//!
//! Proposals carry opaque actions, fix a ledger snapshot at creation, and
//! move through a derived lifecycle:
//! Pending → Active → {Canceled, Defeated, Succeeded} → Queued → {Executed, Expired}.
//!
//! Two voting strategies are supported per proposal:
//! - **Standard**: weight equals the voter's power at the snapshot.
//! - **Quadratic**: `n` votes cost `n²` tokens, paid through an allowance to
//!   the governor's custody account; the tally grows by `n`.
//!
//! The [`Governor`] applies every operation sequentially and atomically, so
//! replaying an [`OperationRecord`] log reproduces the same state.

pub mod error;
pub mod executor;
pub mod governor;
pub mod operation;
pub mod params;
pub mod persist;
pub mod proposal;
pub mod registry;
pub mod summary;
pub mod voting;

pub use error::GovernanceError;
pub use executor::{ExecutionError, ProposalExecutor};
pub use governor::Governor;
pub use operation::{Operation, OperationRecord, Outcome, RejectedOperation, ReplayReport};
pub use params::{GovernorParams, QuadraticCostPolicy};
pub use persist::GovernorSnapshot;
pub use proposal::{Proposal, ProposalAction, ProposalRequest, Tally, VoteReceipt};
pub use registry::ProposalRegistry;
pub use summary::ProposalSummary;
pub use voting::VotingEngine;
