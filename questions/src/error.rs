//! Question-registry errors.

use thiserror::Error;
use verity_types::QuestionId;

#[derive(Debug, Error)]
pub enum QuestionError {
    #[error("question {0} not found")]
    NotFound(QuestionId),

    #[error("question id collision for {0}")]
    Collision(QuestionId),

    #[error("question text too short: minimum {min} bytes, got {len}")]
    TextTooShort { min: usize, len: usize },

    #[error("question text too long: maximum {max} bytes, got {len}")]
    TextTooLong { max: usize, len: usize },

    #[error("too many reference urls: maximum {max}, got {count}")]
    TooManyReferenceUrls { max: usize, count: usize },

    #[error("fee too low: minimum {minimum}, provided {provided}")]
    FeeTooLow { minimum: u128, provided: u128 },

    #[error("answer text must be non-empty")]
    EmptyAnswer,

    #[error("storage hash must be non-zero")]
    ZeroStorageHash,

    #[error("question {0} has already been answered")]
    AlreadyAnswered(QuestionId),

    #[error("question {0} has not been answered yet")]
    NotAnswered(QuestionId),

    #[error("question {0} is already finalized")]
    AlreadyFinalized(QuestionId),

    #[error("escrow for question {0} was already released")]
    EscrowAlreadyReleased(QuestionId),
}
