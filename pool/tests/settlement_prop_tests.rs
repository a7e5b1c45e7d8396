//! Property tests for settlement conservation: whatever the electorate does,
//! no token is ever created or lost except by explicit slash burns.

use proptest::prelude::*;

use verity_pool::{VerityPool, VoterOutcome};
use verity_types::{AccountId, Authorities, ContentHash, ProtocolParams, Timestamp};

const WINDOW: u64 = 1_000;

fn params() -> ProtocolParams {
    ProtocolParams {
        question_text_min: 4,
        question_text_max: 256,
        max_reference_urls: 4,
        min_question_fee: 100,
        min_stake: 1,
        unstake_lock_secs: 0,
        reward_rate: 0,
        voting_window_secs: WINDOW,
        quorum_bps: 3_300,
        approval_threshold_bps: 6_600,
        reward_pool_bps: 7_000,
        treasury_bps: 1_000,
        relayer_bps: 2_000,
        slash_bps: 1_000,
    }
}

fn pool() -> VerityPool {
    let authorities = Authorities {
        relayer: AccountId::new("relayer"),
        treasury: AccountId::new("treasury"),
        settlement: AccountId::new("settlement"),
    };
    VerityPool::new(params(), authorities, Timestamp::EPOCH).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Across any mix of stakes, turnout and ballot splits — approved,
    /// rejected or no-quorum — the system-wide token total only ever drops
    /// by the amounts explicitly burned through slashing, and the escrowed
    /// fee is disbursed exactly once.
    #[test]
    fn tokens_conserved_for_any_electorate(
        stakers in prop::collection::vec(
            (1u128..1_000_000, any::<bool>(), any::<bool>()),
            1..12,
        ),
        fee_extra in 0u128..1_000_000,
    ) {
        let mut p = pool();
        let fee = 100 + fee_extra;
        let asker = AccountId::new("asker");
        p.credit(&asker, fee).unwrap();

        let mut accounts = vec![
            asker.clone(),
            AccountId::new("relayer"),
            AccountId::new("treasury"),
        ];
        let mut initial_total = fee;
        for (i, (stake, _, _)) in stakers.iter().enumerate() {
            let voter = AccountId::new(format!("voter_{i}"));
            p.credit(&voter, *stake).unwrap();
            p.stake(&voter, *stake, Timestamp::EPOCH).unwrap();
            initial_total += stake;
            accounts.push(voter);
        }

        let qid = p
            .submit_question(asker, "does this settle cleanly?".into(), vec![], fee, Timestamp::new(10))
            .unwrap();
        p.submit_answer(
            &AccountId::new("relayer"),
            qid,
            "it should".into(),
            String::new(),
            ContentHash::new([1u8; 32]),
            ContentHash::new([2u8; 32]),
            ContentHash::new([3u8; 32]),
            ContentHash::new([4u8; 32]),
            Timestamp::new(20),
        )
        .unwrap();

        for (i, (_, votes, approve)) in stakers.iter().enumerate() {
            if *votes {
                let voter = AccountId::new(format!("voter_{i}"));
                p.cast_vote(&voter, qid, *approve, Timestamp::new(100)).unwrap();
            }
        }

        let report = p.finalize(qid, Timestamp::new(20 + WINDOW)).unwrap();

        let burned: u128 = report
            .voters
            .iter()
            .map(|v| match v.outcome {
                VoterOutcome::Slashed(amount) => amount,
                _ => 0,
            })
            .sum();
        let total_after: u128 = accounts.iter().map(|a| p.spendable(a)).sum::<u128>()
            + p.total_staked_supply();
        prop_assert_eq!(total_after, initial_total - burned);

        // And the fee itself was disbursed exactly once: a retry fails.
        prop_assert!(p.finalize(qid, Timestamp::new(20 + WINDOW + 1)).is_err());
    }
}
