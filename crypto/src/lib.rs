//! Hashing primitives for Agora.
//!
//! - **Blake2b-256** for content-addressed proposal ids

pub mod hash;

pub use hash::{blake2b_256, hash_proposal};
