//! Protocol parameters and privileged identities.
//!
//! Every threshold and split lives here as a named field rather than a
//! hard-coded literal. Fractions are expressed in basis points
//! (10_000 = 100%), and `validate` rejects any configuration whose fee
//! split does not account for the whole escrowed fee.

use crate::account::AccountId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Basis points denominator: 10_000 bps = 100%.
pub const BPS_DENOMINATOR: u128 = 10_000;

/// All tunable parameters of the consensus engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProtocolParams {
    // ── Questions ────────────────────────────────────────────────────────
    /// Minimum question text length in bytes.
    pub question_text_min: usize,

    /// Maximum question text length in bytes.
    pub question_text_max: usize,

    /// Maximum number of reference URLs attached to a question.
    pub max_reference_urls: usize,

    /// Minimum escrowed fee (raw units) for a question.
    pub min_question_fee: u128,

    // ── Staking ──────────────────────────────────────────────────────────
    /// Minimum amount (raw) per stake deposit.
    pub min_stake: u128,

    /// Seconds that must elapse after the *last* stake top-up before any
    /// unstake is allowed.
    pub unstake_lock_secs: u64,

    /// Pool-wide staking reward emission, raw units per second, shared by
    /// all positions proportionally to their stake.
    pub reward_rate: u128,

    // ── Voting ───────────────────────────────────────────────────────────
    /// Length of a voting round in seconds, measured from answer submission.
    pub voting_window_secs: u64,

    /// Minimum participating stake as bps of total staked supply.
    pub quorum_bps: u32,

    /// Minimum "for" stake as bps of participating stake to approve.
    pub approval_threshold_bps: u32,

    // ── Settlement ───────────────────────────────────────────────────────
    /// Share of the escrowed fee that funds the winning voters' pool (bps).
    pub reward_pool_bps: u32,

    /// Share of the escrowed fee paid to the treasury (bps).
    pub treasury_bps: u32,

    /// Share of the escrowed fee paid to the relayer (bps).
    pub relayer_bps: u32,

    /// Penalty applied to each losing voter, as bps of their ballot weight.
    pub slash_bps: u32,
}

impl ProtocolParams {
    /// Check internal consistency. Called once at pool construction.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.question_text_min >= self.question_text_max {
            return Err(ParamsError::TextBounds);
        }
        if self.voting_window_secs == 0 {
            return Err(ParamsError::ZeroVotingWindow);
        }
        for bps in [self.quorum_bps, self.approval_threshold_bps, self.slash_bps] {
            if u128::from(bps) > BPS_DENOMINATOR {
                return Err(ParamsError::BpsOutOfRange(bps));
            }
        }
        let split = u128::from(self.reward_pool_bps)
            + u128::from(self.treasury_bps)
            + u128::from(self.relayer_bps);
        if split != BPS_DENOMINATOR {
            return Err(ParamsError::FeeSplitMismatch(split));
        }
        Ok(())
    }
}

impl Default for ProtocolParams {
    fn default() -> Self {
        Self {
            question_text_min: 8,
            question_text_max: 4096,
            max_reference_urls: 8,
            min_question_fee: 1_000_000,
            min_stake: 1_000_000,
            unstake_lock_secs: 7 * 24 * 3600,
            reward_rate: 500,
            voting_window_secs: 24 * 3600,
            quorum_bps: 3_300,
            approval_threshold_bps: 6_600,
            reward_pool_bps: 7_000,
            treasury_bps: 1_000,
            relayer_bps: 2_000,
            slash_bps: 1_000,
        }
    }
}

/// The privileged identities of a deployment.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Authorities {
    /// The only account allowed to publish answers.
    pub relayer: AccountId,
    /// Receives the treasury cut of approved settlements.
    pub treasury: AccountId,
    /// The only identity allowed to slash stake. The settlement
    /// coordinator acts under this identity; nothing external should.
    pub settlement: AccountId,
}

#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("question_text_min must be below question_text_max")]
    TextBounds,

    #[error("voting window must be nonzero")]
    ZeroVotingWindow,

    #[error("basis-point value {0} exceeds 10000")]
    BpsOutOfRange(u32),

    #[error("fee split must sum to 10000 bps, got {0}")]
    FeeSplitMismatch(u128),
}
