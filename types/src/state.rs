//! Question lifecycle state.

use serde::{Deserialize, Serialize};

/// Lifecycle of a question. Transitions are strictly one-directional:
/// `Pending → Answered → Finalized`. Only answer submission moves a question
/// out of `Pending`, and only settlement moves it out of `Answered`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionStatus {
    /// Submitted, fee escrowed, waiting for the relayer's answer.
    Pending,
    /// Answer published; a voting round is open or awaiting settlement.
    Answered,
    /// Settled. Fee disbursed, outcome recorded.
    Finalized,
}
