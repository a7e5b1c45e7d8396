//! The voting engine — round lifecycle and outcome tally.

use crate::error::VotingError;
use crate::round::{Ballot, VotingRound};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;
use verity_types::params::BPS_DENOMINATOR;
use verity_types::{AccountId, ProtocolParams, QuestionId, Timestamp};

/// The tallied result of a closed round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Approved iff quorum was met and the approval threshold was reached.
    pub approved: bool,
    /// Whether participation reached the quorum. Settlement treats
    /// no-quorum differently from a quorum-met rejection.
    pub quorum_met: bool,
    pub total_participating: u128,
    pub total_for: u128,
    pub total_against: u128,
}

/// Engine owning all round and ballot records.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VotingEngine {
    rounds: HashMap<QuestionId, VotingRound>,
    voting_window_secs: u64,
    quorum_bps: u32,
    approval_threshold_bps: u32,
}

impl VotingEngine {
    pub fn new(params: &ProtocolParams) -> Self {
        Self {
            rounds: HashMap::new(),
            voting_window_secs: params.voting_window_secs,
            quorum_bps: params.quorum_bps,
            approval_threshold_bps: params.approval_threshold_bps,
        }
    }

    /// Open the round for a question. Exactly one round may ever exist per
    /// question; a second attempt fails.
    pub fn start_round(&mut self, question_id: QuestionId, now: Timestamp) -> Result<(), VotingError> {
        if self.rounds.contains_key(&question_id) {
            return Err(VotingError::RoundExists(question_id));
        }
        let round = VotingRound::new(question_id, now, self.voting_window_secs);
        debug!(question = %question_id, ends_at = %round.ends_at, "voting round opened");
        self.rounds.insert(question_id, round);
        Ok(())
    }

    /// Cast a ballot with the given snapshot weight.
    ///
    /// The caller reads the voter's *current* stake and passes it in; the
    /// weight is frozen into the ballot and never re-read. All checks happen
    /// before any tally mutation, so a rejected vote leaves the round
    /// untouched.
    pub fn cast_vote(
        &mut self,
        question_id: QuestionId,
        voter: AccountId,
        approve: bool,
        stake_weight: u128,
        now: Timestamp,
    ) -> Result<(), VotingError> {
        let round = self
            .rounds
            .get_mut(&question_id)
            .ok_or(VotingError::RoundNotFound(question_id))?;
        if !round.is_open(now) {
            return Err(VotingError::VotingClosed { ends_at: round.ends_at });
        }
        if stake_weight == 0 {
            return Err(VotingError::NoStake(voter.to_string()));
        }
        if round.has_voted(&voter) {
            return Err(VotingError::AlreadyVoted(voter.to_string()));
        }
        let new_participating = round
            .total_participating
            .checked_add(stake_weight)
            .ok_or(VotingError::Overflow)?;
        if approve {
            round.total_for = round
                .total_for
                .checked_add(stake_weight)
                .ok_or(VotingError::Overflow)?;
        } else {
            round.total_against = round
                .total_against
                .checked_add(stake_weight)
                .ok_or(VotingError::Overflow)?;
        }
        round.total_participating = new_participating;
        round.record(Ballot {
            voter,
            approve,
            stake_weight,
            cast_at: now,
        });
        Ok(())
    }

    /// Tally a closed round.
    ///
    /// Quorum: `participating × 10_000 ≥ quorum_bps × total_staked_supply`.
    /// No quorum ⇒ not approved, whatever the split. With quorum:
    /// approved iff `for × 10_000 ≥ approval_threshold_bps × participating`.
    /// Ties resolve purely by these inequalities — no special-casing.
    pub fn outcome(
        &self,
        question_id: QuestionId,
        total_staked_supply: u128,
        now: Timestamp,
    ) -> Result<Outcome, VotingError> {
        let round = self
            .rounds
            .get(&question_id)
            .ok_or(VotingError::RoundNotFound(question_id))?;
        if round.is_open(now) {
            return Err(VotingError::VotingStillOpen { ends_at: round.ends_at });
        }
        // An empty round can never be approved, even when the quorum
        // inequality degenerates (zero supply, zero quorum).
        let quorum_met = round.total_participating > 0
            && round
                .total_participating
                .checked_mul(BPS_DENOMINATOR)
                .ok_or(VotingError::Overflow)?
                >= u128::from(self.quorum_bps)
                    .checked_mul(total_staked_supply)
                    .ok_or(VotingError::Overflow)?;
        let approved = quorum_met
            && round
                .total_for
                .checked_mul(BPS_DENOMINATOR)
                .ok_or(VotingError::Overflow)?
                >= u128::from(self.approval_threshold_bps)
                    .checked_mul(round.total_participating)
                    .ok_or(VotingError::Overflow)?;
        Ok(Outcome {
            approved,
            quorum_met,
            total_participating: round.total_participating,
            total_for: round.total_for,
            total_against: round.total_against,
        })
    }

    /// Mark a closed round finalized. The idempotency guard for settlement:
    /// a second call fails cleanly with the round unchanged.
    pub fn mark_finalized(&mut self, question_id: QuestionId, now: Timestamp) -> Result<(), VotingError> {
        let round = self
            .rounds
            .get_mut(&question_id)
            .ok_or(VotingError::RoundNotFound(question_id))?;
        if round.is_open(now) {
            return Err(VotingError::VotingStillOpen { ends_at: round.ends_at });
        }
        if round.finalized {
            return Err(VotingError::AlreadyFinalized(question_id));
        }
        round.finalized = true;
        Ok(())
    }

    // ── Read accessors ───────────────────────────────────────────────────

    pub fn round(&self, question_id: &QuestionId) -> Option<&VotingRound> {
        self.rounds.get(question_id)
    }

    pub fn ballot(&self, question_id: &QuestionId, voter: &AccountId) -> Option<&Ballot> {
        self.rounds.get(question_id).and_then(|r| r.ballot(voter))
    }

    pub fn voters(&self, question_id: &QuestionId) -> &[AccountId] {
        self.rounds
            .get(question_id)
            .map(|round| round.voters())
            .unwrap_or(&[])
    }

    pub fn is_finalized(&self, question_id: &QuestionId) -> bool {
        self.rounds.get(question_id).is_some_and(|r| r.finalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: u64 = 86_400;

    fn engine() -> VotingEngine {
        // quorum 33%, approval 66% — the worked examples from the protocol
        // docs use these.
        VotingEngine::new(&ProtocolParams::default())
    }

    fn qid(n: u8) -> QuestionId {
        QuestionId::new([n; 32])
    }

    fn voter(n: u8) -> AccountId {
        AccountId::new(format!("voter_{n}"))
    }

    #[test]
    fn second_round_for_same_question_fails() {
        let mut e = engine();
        e.start_round(qid(1), Timestamp::new(100)).unwrap();
        assert!(matches!(
            e.start_round(qid(1), Timestamp::new(200)),
            Err(VotingError::RoundExists(_))
        ));
    }

    #[test]
    fn window_is_exactly_the_configured_duration() {
        let mut e = engine();
        e.start_round(qid(1), Timestamp::new(1_000)).unwrap();
        let round = e.round(&qid(1)).unwrap();
        assert_eq!(round.ends_at, Timestamp::new(1_000 + WINDOW));
        // Last second of the window is open, the boundary itself is closed.
        assert!(round.is_open(Timestamp::new(1_000 + WINDOW - 1)));
        assert!(!round.is_open(Timestamp::new(1_000 + WINDOW)));
    }

    #[test]
    fn vote_at_or_after_end_rejected() {
        let mut e = engine();
        e.start_round(qid(1), Timestamp::new(0)).unwrap();
        let err = e
            .cast_vote(qid(1), voter(1), true, 100, Timestamp::new(WINDOW))
            .unwrap_err();
        assert!(matches!(err, VotingError::VotingClosed { .. }));
    }

    #[test]
    fn vote_before_round_exists_rejected() {
        let mut e = engine();
        assert!(matches!(
            e.cast_vote(qid(1), voter(1), true, 100, Timestamp::new(1)),
            Err(VotingError::RoundNotFound(_))
        ));
    }

    #[test]
    fn zero_stake_vote_rejected() {
        let mut e = engine();
        e.start_round(qid(1), Timestamp::new(0)).unwrap();
        assert!(matches!(
            e.cast_vote(qid(1), voter(1), true, 0, Timestamp::new(1)),
            Err(VotingError::NoStake(_))
        ));
    }

    #[test]
    fn duplicate_ballot_rejected_and_tallies_unchanged() {
        let mut e = engine();
        e.start_round(qid(1), Timestamp::new(0)).unwrap();
        e.cast_vote(qid(1), voter(1), true, 100, Timestamp::new(1)).unwrap();
        let err = e
            .cast_vote(qid(1), voter(1), false, 500, Timestamp::new(2))
            .unwrap_err();
        assert!(matches!(err, VotingError::AlreadyVoted(_)));
        let round = e.round(&qid(1)).unwrap();
        assert_eq!(round.total_for, 100);
        assert_eq!(round.total_against, 0);
        assert_eq!(round.total_participating, 100);
    }

    #[test]
    fn participating_equals_sum_of_ballot_weights() {
        let mut e = engine();
        e.start_round(qid(1), Timestamp::new(0)).unwrap();
        e.cast_vote(qid(1), voter(1), true, 700, Timestamp::new(1)).unwrap();
        e.cast_vote(qid(1), voter(2), false, 300, Timestamp::new(2)).unwrap();
        e.cast_vote(qid(1), voter(3), true, 250, Timestamp::new(3)).unwrap();
        let round = e.round(&qid(1)).unwrap();
        let sum: u128 = round.ballots_in_order().map(|b| b.stake_weight).sum();
        assert_eq!(sum, round.total_participating);
        assert_eq!(round.total_for + round.total_against, round.total_participating);
    }

    #[test]
    fn outcome_before_window_close_rejected() {
        let mut e = engine();
        e.start_round(qid(1), Timestamp::new(0)).unwrap();
        assert!(matches!(
            e.outcome(qid(1), 10_000, Timestamp::new(WINDOW - 1)),
            Err(VotingError::VotingStillOpen { .. })
        ));
        assert!(e.outcome(qid(1), 10_000, Timestamp::new(WINDOW)).is_ok());
    }

    #[test]
    fn quorum_failure_rejects_regardless_of_split() {
        // Supply 10_000, 1_000 participating (700 for / 300 against).
        // Quorum 33% needs ≥ 3_300 participating.
        let mut e = engine();
        e.start_round(qid(1), Timestamp::new(0)).unwrap();
        e.cast_vote(qid(1), voter(1), true, 700, Timestamp::new(1)).unwrap();
        e.cast_vote(qid(1), voter(2), false, 300, Timestamp::new(2)).unwrap();
        let outcome = e.outcome(qid(1), 10_000, Timestamp::new(WINDOW)).unwrap();
        assert!(!outcome.quorum_met);
        assert!(!outcome.approved);
        assert_eq!(outcome.total_participating, 1_000);
    }

    #[test]
    fn approval_law_with_quorum_met() {
        // Supply 10_000, 4_000 participating (40% ≥ 33%), 3_000 for /
        // 1_000 against → 75% ≥ 66% → approved.
        let mut e = engine();
        e.start_round(qid(1), Timestamp::new(0)).unwrap();
        e.cast_vote(qid(1), voter(1), true, 3_000, Timestamp::new(1)).unwrap();
        e.cast_vote(qid(1), voter(2), false, 1_000, Timestamp::new(2)).unwrap();
        let outcome = e.outcome(qid(1), 10_000, Timestamp::new(WINDOW)).unwrap();
        assert!(outcome.quorum_met);
        assert!(outcome.approved);
    }

    #[test]
    fn below_approval_threshold_rejected_with_quorum() {
        // 4_000 participating, 2_000 for → 50% < 66% → rejected, quorum met.
        let mut e = engine();
        e.start_round(qid(1), Timestamp::new(0)).unwrap();
        e.cast_vote(qid(1), voter(1), true, 2_000, Timestamp::new(1)).unwrap();
        e.cast_vote(qid(1), voter(2), false, 2_000, Timestamp::new(2)).unwrap();
        let outcome = e.outcome(qid(1), 10_000, Timestamp::new(WINDOW)).unwrap();
        assert!(outcome.quorum_met);
        assert!(!outcome.approved);
    }

    #[test]
    fn exact_threshold_boundary_approves() {
        // Exactly 66% for of 10_000 participating: inequality is ≥.
        let mut e = engine();
        e.start_round(qid(1), Timestamp::new(0)).unwrap();
        e.cast_vote(qid(1), voter(1), true, 6_600, Timestamp::new(1)).unwrap();
        e.cast_vote(qid(1), voter(2), false, 3_400, Timestamp::new(2)).unwrap();
        let outcome = e.outcome(qid(1), 10_000, Timestamp::new(WINDOW)).unwrap();
        assert!(outcome.approved);
    }

    #[test]
    fn empty_round_is_never_approved() {
        let mut e = engine();
        e.start_round(qid(1), Timestamp::new(0)).unwrap();
        let outcome = e.outcome(qid(1), 0, Timestamp::new(WINDOW)).unwrap();
        assert!(!outcome.quorum_met);
        assert!(!outcome.approved);
    }

    #[test]
    fn finalize_guard_is_idempotent_safe() {
        let mut e = engine();
        e.start_round(qid(1), Timestamp::new(0)).unwrap();
        assert!(matches!(
            e.mark_finalized(qid(1), Timestamp::new(1)),
            Err(VotingError::VotingStillOpen { .. })
        ));
        e.mark_finalized(qid(1), Timestamp::new(WINDOW)).unwrap();
        assert!(matches!(
            e.mark_finalized(qid(1), Timestamp::new(WINDOW + 1)),
            Err(VotingError::AlreadyFinalized(_))
        ));
    }

    #[test]
    fn voters_returned_in_cast_order() {
        let mut e = engine();
        e.start_round(qid(1), Timestamp::new(0)).unwrap();
        e.cast_vote(qid(1), voter(3), true, 10, Timestamp::new(1)).unwrap();
        e.cast_vote(qid(1), voter(1), false, 10, Timestamp::new(2)).unwrap();
        e.cast_vote(qid(1), voter(2), true, 10, Timestamp::new(3)).unwrap();
        let order: Vec<_> = e.voters(&qid(1)).iter().map(|v| v.to_string()).collect();
        assert_eq!(order, vec!["voter_3", "voter_1", "voter_2"]);
    }
}
