//! Voting-engine errors.

use thiserror::Error;
use verity_types::{QuestionId, Timestamp};

#[derive(Debug, Error)]
pub enum VotingError {
    #[error("a voting round already exists for question {0}")]
    RoundExists(QuestionId),

    #[error("no voting round for question {0}")]
    RoundNotFound(QuestionId),

    #[error("voting closed at {ends_at}")]
    VotingClosed { ends_at: Timestamp },

    #[error("voting is still open until {ends_at}")]
    VotingStillOpen { ends_at: Timestamp },

    #[error("voter {0} has already cast a ballot in this round")]
    AlreadyVoted(String),

    #[error("voter {0} has no stake")]
    NoStake(String),

    #[error("round for question {0} is already finalized")]
    AlreadyFinalized(QuestionId),

    #[error("arithmetic overflow in vote tally")]
    Overflow,
}
