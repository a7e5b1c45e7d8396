//! Voting round and ballot state.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use verity_types::{AccountId, QuestionId, Timestamp};

/// One voter's ballot. Unique per (question, voter).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Ballot {
    pub voter: AccountId,
    pub approve: bool,
    /// The voter's staked amount, frozen at cast time.
    pub stake_weight: u128,
    pub cast_at: Timestamp,
}

/// The single voting round for a question.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VotingRound {
    pub question_id: QuestionId,
    pub started_at: Timestamp,
    /// `started_at + voting_window_secs`. Votes land strictly before this.
    pub ends_at: Timestamp,
    pub total_for: u128,
    pub total_against: u128,
    /// Invariant: equals the sum of all ballot weights.
    pub total_participating: u128,
    pub finalized: bool,
    ballots: HashMap<AccountId, Ballot>,
    /// Voters in cast order, for deterministic settlement iteration.
    voter_order: Vec<AccountId>,
}

impl VotingRound {
    pub fn new(question_id: QuestionId, started_at: Timestamp, window_secs: u64) -> Self {
        Self {
            question_id,
            started_at,
            ends_at: started_at.plus(window_secs),
            total_for: 0,
            total_against: 0,
            total_participating: 0,
            finalized: false,
            ballots: HashMap::new(),
            voter_order: Vec::new(),
        }
    }

    /// Whether the voting window is still open at `now`.
    pub fn is_open(&self, now: Timestamp) -> bool {
        now < self.ends_at
    }

    pub fn has_voted(&self, voter: &AccountId) -> bool {
        self.ballots.contains_key(voter)
    }

    pub fn ballot(&self, voter: &AccountId) -> Option<&Ballot> {
        self.ballots.get(voter)
    }

    /// Record a ballot. The caller has already validated window, weight and
    /// the one-ballot rule.
    pub(crate) fn record(&mut self, ballot: Ballot) {
        self.voter_order.push(ballot.voter.clone());
        self.ballots.insert(ballot.voter.clone(), ballot);
    }

    /// Voters in the order their ballots were cast.
    pub fn voters(&self) -> &[AccountId] {
        &self.voter_order
    }

    /// Ballots in cast order.
    pub fn ballots_in_order(&self) -> impl Iterator<Item = &Ballot> {
        self.voter_order
            .iter()
            .filter_map(move |voter| self.ballots.get(voter))
    }
}
