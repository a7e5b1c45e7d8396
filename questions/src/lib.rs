//! Question registry — escrowed questions and their answer records.
//!
//! Owns `Question` and `Answer` state exclusively. The lifecycle is
//! one-directional (`Pending → Answered → Finalized`) and only ever driven
//! through the mutating operations here; there is no external mutation path.
//!
//! The escrowed fee is released through `take_escrow`, which yields exactly
//! once — the disbursed-exactly-once invariant is structural, not a
//! convention the settlement code has to remember.

pub mod error;
pub mod question;
pub mod registry;

pub use error::QuestionError;
pub use question::{Answer, ProofBundle, Question};
pub use registry::QuestionRegistry;
