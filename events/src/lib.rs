//! Append-only notification log.
//!
//! Every externally observable transition emits one event here. The engine
//! has zero knowledge of subscribers — off-chain indexers and UIs poll the
//! log (or whatever transport the embedding runtime bridges it to) and the
//! log itself only ever grows.

use serde::{Deserialize, Serialize};
use verity_types::{AccountId, QuestionId, Timestamp};

/// Everything the engine announces to the outside world.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolEvent {
    QuestionSubmitted {
        question_id: QuestionId,
        asker: AccountId,
        fee: u128,
        at: Timestamp,
    },
    AnswerSubmitted {
        question_id: QuestionId,
        relayer: AccountId,
        at: Timestamp,
    },
    VotingStarted {
        question_id: QuestionId,
        ends_at: Timestamp,
    },
    VoteCast {
        question_id: QuestionId,
        voter: AccountId,
        approve: bool,
        stake_weight: u128,
    },
    VotingFinalized {
        question_id: QuestionId,
        approved: bool,
        quorum_met: bool,
        total_participating: u128,
    },
    RewardDistributed {
        question_id: QuestionId,
        voter: AccountId,
        amount: u128,
    },
    VoterSlashed {
        question_id: QuestionId,
        voter: AccountId,
        amount: u128,
    },
    FeeRefunded {
        question_id: QuestionId,
        asker: AccountId,
        amount: u128,
    },
    /// A per-voter reward or slash failed and was skipped. Settlement
    /// continues; this is the only surface the failure is reported on.
    SettlementTransferFailed {
        question_id: QuestionId,
        voter: AccountId,
        reason: String,
    },
}

/// The append-only log.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<PoolEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: PoolEvent) {
        self.events.push(event);
    }

    pub fn all(&self) -> &[PoolEvent] {
        &self.events
    }

    /// Events appended at or after `index` — a poll cursor for indexers.
    pub fn since(&self, index: usize) -> &[PoolEvent] {
        self.events.get(index..).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
