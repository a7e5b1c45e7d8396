//! Per-account stake position state.

use serde::{Deserialize, Serialize};
use verity_types::Timestamp;

/// Fixed-point scale for the reward-per-token accumulator.
pub const REWARD_PRECISION: u128 = 1_000_000_000_000;

/// A single account's stake position.
///
/// Lightweight: only per-account data lives here. The reward-per-token
/// accumulator is global and shared — see `StakeLedger`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StakePosition {
    /// Currently staked amount (raw units).
    pub amount: u128,

    /// When the owner last topped up. The unstake lock is measured from
    /// here, so every top-up restarts the clock.
    pub last_stake_at: Timestamp,

    /// Reward debt marker: `amount × acc_reward_per_token / PRECISION` as of
    /// the last position change. Pending rewards are whatever has accrued
    /// above this mark.
    pub reward_debt: u128,

    /// Rewards settled but not yet claimed.
    pub unclaimed: u128,
}

impl StakePosition {
    /// Rewards accrued above the debt mark, given the current global
    /// accumulator. Returns `None` on arithmetic overflow.
    pub fn pending(&self, acc_reward_per_token: u128) -> Option<u128> {
        let earned = self
            .amount
            .checked_mul(acc_reward_per_token)?
            .checked_div(REWARD_PRECISION)?;
        // The debt mark can exceed `earned` after a slash shrank the
        // position; treat that as zero pending rather than underflowing.
        Some(earned.saturating_sub(self.reward_debt))
    }

    /// Recompute the debt mark after `amount` changed.
    pub fn reset_debt(&mut self, acc_reward_per_token: u128) -> Option<()> {
        self.reward_debt = self
            .amount
            .checked_mul(acc_reward_per_token)?
            .checked_div(REWARD_PRECISION)?;
        Some(())
    }
}
