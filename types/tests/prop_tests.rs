use proptest::prelude::*;

use agora_types::{ProposalId, Support, Timestamp, TypesError, VotingType};

proptest! {
    /// Hex text produced by Display always parses back to the same id.
    #[test]
    fn proposal_id_text_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let id = ProposalId::new(bytes);
        let parsed: ProposalId = id.to_string().parse().unwrap();
        prop_assert_eq!(parsed, id);
    }

    /// ProposalId bincode serialization roundtrip.
    #[test]
    fn proposal_id_bincode_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let id = ProposalId::new(bytes);
        let encoded = bincode::serialize(&id).unwrap();
        let decoded: ProposalId = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded, id);
    }

    /// Timestamp ordering: new(a) <= new(b) iff a <= b.
    #[test]
    fn timestamp_ordering(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
        let ta = Timestamp::new(a);
        let tb = Timestamp::new(b);
        prop_assert_eq!(ta <= tb, a <= b);
        prop_assert_eq!(ta == tb, a == b);
    }

    /// Timestamp has_expired agrees with manual arithmetic.
    #[test]
    fn timestamp_has_expired_correct(
        start in 0u64..500_000,
        duration in 1u64..500_000,
        offset in 0u64..1_000_000,
    ) {
        let t = Timestamp::new(start);
        let now = Timestamp::new(start.saturating_add(offset));
        prop_assert_eq!(t.has_expired(duration, now), offset >= duration);
    }

    /// plus() saturates instead of wrapping.
    #[test]
    fn timestamp_plus_saturates(start in 0u64..u64::MAX, secs in 0u64..u64::MAX) {
        let shifted = Timestamp::new(start).plus(secs);
        prop_assert!(shifted >= Timestamp::new(start));
        prop_assert_eq!(shifted.as_secs(), start.saturating_add(secs));
    }

    /// Only 0, 1 and 2 decode as a vote direction.
    #[test]
    fn support_decoding_domain(raw in 0u8..=u8::MAX) {
        match Support::try_from(raw) {
            Ok(support) => prop_assert_eq!(support.as_u8(), raw),
            Err(e) => {
                prop_assert!(raw > 2);
                prop_assert_eq!(e, TypesError::InvalidSupportValue(raw));
            }
        }
    }

    /// Only 0 and 1 decode as a voting strategy.
    #[test]
    fn voting_type_decoding_domain(raw in 0u8..=u8::MAX) {
        prop_assert_eq!(VotingType::try_from(raw).is_ok(), raw <= 1);
    }
}
