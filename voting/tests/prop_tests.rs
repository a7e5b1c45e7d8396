use proptest::prelude::*;

use verity_types::{AccountId, ProtocolParams, QuestionId, Timestamp};
use verity_voting::VotingEngine;

const WINDOW: u64 = 24 * 3600;

fn engine(quorum_bps: u32, approval_bps: u32) -> VotingEngine {
    let params = ProtocolParams {
        quorum_bps,
        approval_threshold_bps: approval_bps,
        ..ProtocolParams::default()
    };
    VotingEngine::new(&params)
}

fn qid() -> QuestionId {
    QuestionId::new([7u8; 32])
}

proptest! {
    /// The tally invariant: total_participating always equals the sum of
    /// ballot weights, and splits into for + against exactly.
    #[test]
    fn tally_conservation(
        votes in prop::collection::vec((1u128..1_000_000, any::<bool>()), 1..40),
    ) {
        let mut e = engine(3_300, 6_600);
        e.start_round(qid(), Timestamp::new(0)).unwrap();
        for (i, (weight, approve)) in votes.iter().enumerate() {
            let voter = AccountId::new(format!("voter_{i}"));
            e.cast_vote(qid(), voter, *approve, *weight, Timestamp::new(1)).unwrap();
        }
        let round = e.round(&qid()).unwrap();
        let weight_sum: u128 = round.ballots_in_order().map(|b| b.stake_weight).sum();
        prop_assert_eq!(weight_sum, round.total_participating);
        prop_assert_eq!(round.total_for + round.total_against, round.total_participating);
        prop_assert_eq!(round.voters().len(), votes.len());
    }

    /// The quorum law: whenever participation falls short of quorum the
    /// outcome is not approved, regardless of the for/against split.
    #[test]
    fn quorum_law(
        supply in 1u128..1_000_000_000,
        for_weight in 1u128..1_000_000,
        against_weight in 1u128..1_000_000,
        quorum_bps in 1u32..=10_000,
    ) {
        let mut e = engine(quorum_bps, 1);
        e.start_round(qid(), Timestamp::new(0)).unwrap();
        e.cast_vote(qid(), AccountId::new("a"), true, for_weight, Timestamp::new(1)).unwrap();
        e.cast_vote(qid(), AccountId::new("b"), false, against_weight, Timestamp::new(1)).unwrap();

        let outcome = e.outcome(qid(), supply, Timestamp::new(WINDOW)).unwrap();
        let participating = for_weight + against_weight;
        let quorum_holds = participating * 10_000 >= u128::from(quorum_bps) * supply;
        prop_assert_eq!(outcome.quorum_met, quorum_holds);
        if !quorum_holds {
            prop_assert!(!outcome.approved);
        }
    }

    /// The approval law: with quorum guaranteed, approval tracks the
    /// threshold inequality exactly — including ties.
    #[test]
    fn approval_law(
        for_weight in 0u128..1_000_000,
        against_weight in 0u128..1_000_000,
        threshold_bps in 1u32..=10_000,
    ) {
        prop_assume!(for_weight + against_weight > 0);
        let mut e = engine(0, threshold_bps);
        e.start_round(qid(), Timestamp::new(0)).unwrap();
        if for_weight > 0 {
            e.cast_vote(qid(), AccountId::new("a"), true, for_weight, Timestamp::new(1)).unwrap();
        }
        if against_weight > 0 {
            e.cast_vote(qid(), AccountId::new("b"), false, against_weight, Timestamp::new(1)).unwrap();
        }
        // Zero supply with nonzero participation always meets quorum.
        let outcome = e.outcome(qid(), 0, Timestamp::new(WINDOW)).unwrap();
        prop_assert!(outcome.quorum_met);
        let participating = for_weight + against_weight;
        let expected = for_weight * 10_000 >= u128::from(threshold_bps) * participating;
        prop_assert_eq!(outcome.approved, expected);
    }

    /// A duplicate ballot never changes the tallies.
    #[test]
    fn duplicate_vote_rejected(
        first_weight in 1u128..1_000_000,
        second_weight in 1u128..1_000_000,
        first_approve in any::<bool>(),
        second_approve in any::<bool>(),
    ) {
        let mut e = engine(3_300, 6_600);
        e.start_round(qid(), Timestamp::new(0)).unwrap();
        let voter = AccountId::new("voter");
        e.cast_vote(qid(), voter.clone(), first_approve, first_weight, Timestamp::new(1)).unwrap();
        let before = e.round(&qid()).unwrap().clone();
        prop_assert!(e
            .cast_vote(qid(), voter, second_approve, second_weight, Timestamp::new(2))
            .is_err());
        let after = e.round(&qid()).unwrap();
        prop_assert_eq!(before.total_for, after.total_for);
        prop_assert_eq!(before.total_against, after.total_against);
        prop_assert_eq!(before.total_participating, after.total_participating);
    }
}
