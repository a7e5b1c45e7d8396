//! Voting engine — one time-bounded stake-weighted ballot per question.
//!
//! Rounds move `NotStarted → Open → Closed → Finalized`. "Closed" is a
//! derived state: nothing is stored when the window elapses, any read after
//! `ends_at` simply computes the outcome. Ballot weights are snapshotted at
//! cast time and never re-read, so staking more mid-round does not inflate a
//! vote already cast, and unstaking does not retroactively shrink it.

pub mod engine;
pub mod error;
pub mod round;

pub use engine::{Outcome, VotingEngine};
pub use error::VotingError;
pub use round::{Ballot, VotingRound};
