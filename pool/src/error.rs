//! Pool-level errors — the component errors plus the facade's own checks.

use thiserror::Error;
use verity_questions::QuestionError;
use verity_stake::StakeError;
use verity_types::ParamsError;
use verity_voting::VotingError;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("caller {0} does not hold the relayer capability")]
    NotRelayer(String),

    #[error(transparent)]
    Params(#[from] ParamsError),

    #[error(transparent)]
    Stake(#[from] StakeError),

    #[error(transparent)]
    Question(#[from] QuestionError),

    #[error(transparent)]
    Voting(#[from] VotingError),
}
