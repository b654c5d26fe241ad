//! Blake2b hashing for proposal ids and snapshots.

use agora_types::{Address, ProposalId};
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

type Blake2b256 = Blake2b<U32>;

const PROPOSAL_DOMAIN: &[u8] = b"agora/proposal/v1";

/// Compute a 256-bit Blake2b hash of arbitrary data.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Derive the id of a proposal from its actions and description.
///
/// Every list and byte string is length-prefixed so distinct argument sets can
/// never serialize to the same preimage. The description enters as its own
/// hash. Identical arguments always produce the same id.
pub fn hash_proposal(
    targets: &[Address],
    values: &[u128],
    calldatas: &[Vec<u8>],
    description: &str,
) -> ProposalId {
    let mut hasher = Blake2b256::new();
    hasher.update(PROPOSAL_DOMAIN);

    hasher.update((targets.len() as u64).to_le_bytes());
    for target in targets {
        let bytes = target.as_str().as_bytes();
        hasher.update((bytes.len() as u64).to_le_bytes());
        hasher.update(bytes);
    }

    hasher.update((values.len() as u64).to_le_bytes());
    for value in values {
        hasher.update(value.to_le_bytes());
    }

    hasher.update((calldatas.len() as u64).to_le_bytes());
    for calldata in calldatas {
        hasher.update((calldata.len() as u64).to_le_bytes());
        hasher.update(calldata);
    }

    hasher.update(blake2b_256(description.as_bytes()));

    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    ProposalId::new(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> Address {
        Address::new("token")
    }

    #[test]
    fn blake2b_deterministic() {
        let h1 = blake2b_256(b"hello agora");
        let h2 = blake2b_256(b"hello agora");
        assert_eq!(h1, h2);
    }

    #[test]
    fn blake2b_different_inputs() {
        let h1 = blake2b_256(b"hello");
        let h2 = blake2b_256(b"world");
        assert_ne!(h1, h2);
    }

    #[test]
    fn proposal_id_is_deterministic() {
        let a = hash_proposal(&[token()], &[0], &[vec![1, 2, 3]], "Proposal #1");
        let b = hash_proposal(&[token()], &[0], &[vec![1, 2, 3]], "Proposal #1");
        assert_eq!(a, b);
        assert!(!a.is_zero());
    }

    #[test]
    fn proposal_id_depends_on_every_field() {
        let base = hash_proposal(&[token()], &[0], &[vec![1, 2, 3]], "desc");
        assert_ne!(base, hash_proposal(&[Address::new("other")], &[0], &[vec![1, 2, 3]], "desc"));
        assert_ne!(base, hash_proposal(&[token()], &[1], &[vec![1, 2, 3]], "desc"));
        assert_ne!(base, hash_proposal(&[token()], &[0], &[vec![1, 2]], "desc"));
        assert_ne!(base, hash_proposal(&[token()], &[0], &[vec![1, 2, 3]], "desc2"));
    }

    #[test]
    fn calldata_boundaries_are_framed() {
        // Same concatenated bytes, different split.
        let a = hash_proposal(&[token(), token()], &[0, 0], &[vec![1], vec![2, 3]], "d");
        let b = hash_proposal(&[token(), token()], &[0, 0], &[vec![1, 2], vec![3]], "d");
        assert_ne!(a, b);
    }
}
