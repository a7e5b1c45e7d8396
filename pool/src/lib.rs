//! The Verity pool — question → answer → vote → settlement.
//!
//! `VerityPool` owns one of each engine (stake ledger, question registry,
//! voting engine, event log) and exposes the inbound operations. Every
//! mutation goes through `&mut self`, which linearizes all calls exactly as
//! the on-chain execution substrate would; an embedding runtime puts the
//! pool behind its own lock or actor and gets the same serialization.
//!
//! Time is always an explicit `now` parameter. There are no timers: a round
//! closes when its window elapses and stays settleable forever — `finalize`
//! is caller-driven and may be arbitrarily late with no penalty.

pub mod error;
pub mod pool;
pub mod settlement;

pub use error::PoolError;
pub use pool::VerityPool;
pub use settlement::{SettlementReport, VoterOutcome, VoterSettlement};
