//! The stake ledger engine.

use crate::error::StakeError;
use crate::position::{StakePosition, REWARD_PRECISION};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};
use verity_types::{AccountId, ProtocolParams, Timestamp};

/// A single account: spendable tokens plus an optional stake position.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Account {
    pub spendable: u128,
    pub position: StakePosition,
}

/// The stake ledger — owns all token state exclusively.
///
/// Other components never hold references into this map; cross-component
/// reads go through the accessor methods.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StakeLedger {
    accounts: HashMap<AccountId, Account>,
    /// Sum of all staked amounts. Drives the quorum denominator.
    total_staked: u128,
    /// Global reward-per-token accumulator, scaled by `REWARD_PRECISION`.
    acc_reward_per_token: u128,
    /// Last time the accumulator was refreshed.
    last_reward_update: Timestamp,
    /// Pool-wide reward emission, raw units per second.
    reward_rate: u128,
    /// Minimum per-deposit stake.
    min_stake: u128,
    /// Lock window after the last top-up.
    unstake_lock_secs: u64,
    /// The only identity allowed to slash.
    settlement_authority: AccountId,
}

impl StakeLedger {
    pub fn new(params: &ProtocolParams, settlement_authority: AccountId, genesis: Timestamp) -> Self {
        Self {
            accounts: HashMap::new(),
            total_staked: 0,
            acc_reward_per_token: 0,
            last_reward_update: genesis,
            reward_rate: params.reward_rate,
            min_stake: params.min_stake,
            unstake_lock_secs: params.unstake_lock_secs,
            settlement_authority,
        }
    }

    // ── Spendable balance operations ─────────────────────────────────────

    /// Credit an account's spendable balance, creating the account if needed.
    pub fn credit(&mut self, owner: &AccountId, amount: u128) -> Result<(), StakeError> {
        let account = self.accounts.entry(owner.clone()).or_default();
        account.spendable = account
            .spendable
            .checked_add(amount)
            .ok_or(StakeError::Overflow)?;
        Ok(())
    }

    /// Debit an account's spendable balance.
    pub fn debit(&mut self, owner: &AccountId, amount: u128) -> Result<(), StakeError> {
        let account = self
            .accounts
            .get_mut(owner)
            .ok_or_else(|| StakeError::UnknownAccount(owner.to_string()))?;
        if account.spendable < amount {
            return Err(StakeError::InsufficientBalance {
                needed: amount,
                available: account.spendable,
            });
        }
        account.spendable -= amount;
        Ok(())
    }

    pub fn spendable(&self, owner: &AccountId) -> u128 {
        self.accounts.get(owner).map_or(0, |a| a.spendable)
    }

    // ── Staking ──────────────────────────────────────────────────────────

    /// Lock `amount` from the owner's spendable balance into their stake
    /// position. Resets the unlock clock.
    pub fn stake(&mut self, owner: &AccountId, amount: u128, now: Timestamp) -> Result<(), StakeError> {
        if amount == 0 {
            return Err(StakeError::ZeroAmount);
        }
        if amount < self.min_stake {
            return Err(StakeError::BelowMinimumStake {
                minimum: self.min_stake,
                provided: amount,
            });
        }
        let available = self.spendable(owner);
        if available < amount {
            return Err(StakeError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        // Rewards already earned must be settled at the old balance before
        // the deposit changes the owner's share of future emission.
        self.update_rewards(now)?;
        let acc = self.acc_reward_per_token;
        let account = self.accounts.get_mut(owner).expect("balance checked above");
        settle_pending(&mut account.position, acc)?;
        account.spendable -= amount;
        account.position.amount = account
            .position
            .amount
            .checked_add(amount)
            .ok_or(StakeError::Overflow)?;
        account.position.last_stake_at = now;
        account.position.reset_debt(acc).ok_or(StakeError::Overflow)?;
        self.total_staked = self
            .total_staked
            .checked_add(amount)
            .ok_or(StakeError::Overflow)?;
        debug!(owner = %owner, amount, total_staked = self.total_staked, "stake deposited");
        Ok(())
    }

    /// Release `amount` of staked tokens back to spendable. Only allowed
    /// once the lock window has elapsed since the *last* top-up.
    pub fn unstake(&mut self, owner: &AccountId, amount: u128, now: Timestamp) -> Result<(), StakeError> {
        if amount == 0 {
            return Err(StakeError::ZeroAmount);
        }
        let position = &self
            .accounts
            .get(owner)
            .ok_or_else(|| StakeError::UnknownAccount(owner.to_string()))?
            .position;
        if !position.last_stake_at.has_expired(self.unstake_lock_secs, now) {
            return Err(StakeError::StakeLocked {
                unlocks_at: position.last_stake_at.plus(self.unstake_lock_secs),
            });
        }
        if position.amount < amount {
            return Err(StakeError::InsufficientStake {
                needed: amount,
                staked: position.amount,
            });
        }
        self.update_rewards(now)?;
        let acc = self.acc_reward_per_token;
        let account = self.accounts.get_mut(owner).expect("existence checked above");
        settle_pending(&mut account.position, acc)?;
        account.position.amount -= amount;
        account.position.reset_debt(acc).ok_or(StakeError::Overflow)?;
        account.spendable = account
            .spendable
            .checked_add(amount)
            .ok_or(StakeError::Overflow)?;
        self.total_staked -= amount;
        debug!(owner = %owner, amount, total_staked = self.total_staked, "stake released");
        Ok(())
    }

    /// Pay out all accrued rewards to the owner's spendable balance.
    /// Returns the amount claimed (possibly zero).
    pub fn claim_rewards(&mut self, owner: &AccountId, now: Timestamp) -> Result<u128, StakeError> {
        if !self.accounts.contains_key(owner) {
            return Err(StakeError::UnknownAccount(owner.to_string()));
        }
        self.update_rewards(now)?;
        let acc = self.acc_reward_per_token;
        let account = self.accounts.get_mut(owner).expect("existence checked above");
        settle_pending(&mut account.position, acc)?;
        let claimed = account.position.unclaimed;
        account.position.unclaimed = 0;
        account.spendable = account
            .spendable
            .checked_add(claimed)
            .ok_or(StakeError::Overflow)?;
        debug!(owner = %owner, claimed, "rewards claimed");
        Ok(claimed)
    }

    /// Burn up to `amount` of the owner's stake. Privileged: only the
    /// settlement authority may call this.
    ///
    /// The requested amount is clamped to the current position — ballot
    /// weights are snapshots and the position may have shrunk since cast.
    /// Returns the amount actually burned.
    pub fn slash(
        &mut self,
        caller: &AccountId,
        owner: &AccountId,
        amount: u128,
        now: Timestamp,
    ) -> Result<u128, StakeError> {
        if *caller != self.settlement_authority {
            return Err(StakeError::NotSettlementAuthority(caller.to_string()));
        }
        if !self.accounts.contains_key(owner) {
            return Err(StakeError::UnknownAccount(owner.to_string()));
        }
        self.update_rewards(now)?;
        let acc = self.acc_reward_per_token;
        let account = self.accounts.get_mut(owner).expect("existence checked above");
        settle_pending(&mut account.position, acc)?;
        let burned = amount.min(account.position.amount);
        if burned < amount {
            warn!(owner = %owner, requested = amount, burned, "slash clamped to current stake");
        }
        account.position.amount -= burned;
        account.position.reset_debt(acc).ok_or(StakeError::Overflow)?;
        self.total_staked -= burned;
        debug!(owner = %owner, burned, total_staked = self.total_staked, "stake slashed");
        Ok(burned)
    }

    // ── Read accessors ───────────────────────────────────────────────────

    /// The owner's current staked amount (the vote-weight snapshot source).
    pub fn staked_amount(&self, owner: &AccountId) -> u128 {
        self.accounts.get(owner).map_or(0, |a| a.position.amount)
    }

    /// Sum of all staked amounts — the quorum denominator.
    pub fn total_staked_supply(&self) -> u128 {
        self.total_staked
    }

    /// Rewards the owner could claim right now.
    pub fn pending_rewards(&self, owner: &AccountId, now: Timestamp) -> u128 {
        let Some(account) = self.accounts.get(owner) else {
            return 0;
        };
        let acc = self
            .projected_accumulator(now)
            .unwrap_or(self.acc_reward_per_token);
        account
            .position
            .unclaimed
            .saturating_add(account.position.pending(acc).unwrap_or(0))
    }

    // ── Internals ────────────────────────────────────────────────────────

    /// Refresh the global reward-per-token accumulator up to `now`.
    ///
    /// While nothing is staked no rewards are emitted; the update window
    /// simply advances.
    fn update_rewards(&mut self, now: Timestamp) -> Result<(), StakeError> {
        self.acc_reward_per_token = self.projected_accumulator(now).ok_or(StakeError::Overflow)?;
        self.last_reward_update = now;
        Ok(())
    }

    fn projected_accumulator(&self, now: Timestamp) -> Option<u128> {
        if self.total_staked == 0 {
            return Some(self.acc_reward_per_token);
        }
        let elapsed = self.last_reward_update.elapsed_since(now);
        let emitted = self.reward_rate.checked_mul(u128::from(elapsed))?;
        let per_token = emitted
            .checked_mul(REWARD_PRECISION)?
            .checked_div(self.total_staked)?;
        self.acc_reward_per_token.checked_add(per_token)
    }
}

/// Move rewards accrued above the debt mark into `unclaimed`.
fn settle_pending(position: &mut StakePosition, acc: u128) -> Result<(), StakeError> {
    let pending = position.pending(acc).ok_or(StakeError::Overflow)?;
    position.unclaimed = position
        .unclaimed
        .checked_add(pending)
        .ok_or(StakeError::Overflow)?;
    position.reset_debt(acc).ok_or(StakeError::Overflow)?;
    Ok(())
}
