//! Stake ledger — the token accounting engine.
//!
//! Owns every account's spendable balance and stake position. Rewards use a
//! lazily-updated global reward-per-token accumulator: a position change
//! first refreshes the accumulator and settles the owner's pending rewards,
//! so rewards already earned are never diluted by a new deposit.
//!
//! Slashing is capability-gated: only the configured settlement authority
//! may burn stake.

pub mod error;
pub mod ledger;
pub mod position;

pub use error::StakeError;
pub use ledger::StakeLedger;
pub use position::StakePosition;
