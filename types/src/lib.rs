//! Fundamental types for the Verity protocol.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: account identities, hash newtypes, timestamps, protocol
//! parameters, and the question lifecycle enum.

pub mod account;
pub mod hash;
pub mod params;
pub mod state;
pub mod time;

pub use account::AccountId;
pub use hash::{ContentHash, QuestionId};
pub use params::{Authorities, ParamsError, ProtocolParams};
pub use state::QuestionStatus;
pub use time::Timestamp;
