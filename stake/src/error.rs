//! Stake-ledger errors.

use thiserror::Error;
use verity_types::Timestamp;

#[derive(Debug, Error)]
pub enum StakeError {
    #[error("account {0} not found")]
    UnknownAccount(String),

    #[error("insufficient balance: need {needed}, available {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    #[error("insufficient stake: need {needed}, staked {staked}")]
    InsufficientStake { needed: u128, staked: u128 },

    #[error("stake below minimum: minimum {minimum}, provided {provided}")]
    BelowMinimumStake { minimum: u128, provided: u128 },

    #[error("stake is locked until {unlocks_at}")]
    StakeLocked { unlocks_at: Timestamp },

    #[error("caller {0} is not the settlement authority")]
    NotSettlementAuthority(String),

    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("arithmetic overflow in stake accounting")]
    Overflow,
}
