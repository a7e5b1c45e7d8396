//! The question registry engine.

use crate::error::QuestionError;
use crate::question::{Answer, ProofBundle, Question};
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;
use verity_types::{AccountId, ProtocolParams, QuestionId, QuestionStatus, Timestamp};

type Blake2b256 = Blake2b<U32>;

/// Derive a question id from the submission tuple.
///
/// The monotonic counter makes identical (asker, text, instant) submissions
/// produce distinct ids; the collision check in `submit` covers the
/// astronomically unlikely hash clash.
pub fn derive_question_id(
    asker: &AccountId,
    text: &str,
    now: Timestamp,
    counter: u64,
) -> QuestionId {
    let mut hasher = Blake2b256::new();
    hasher.update(asker.as_str().as_bytes());
    hasher.update(text.as_bytes());
    hasher.update(now.as_secs().to_be_bytes());
    hasher.update(counter.to_be_bytes());
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    QuestionId::new(output)
}

/// Registry of questions and their answers.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct QuestionRegistry {
    questions: HashMap<QuestionId, Question>,
    answers: HashMap<QuestionId, Answer>,
}

impl QuestionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a question with its escrowed fee. All validation happens
    /// before any state change; the pool debits the asker only after this
    /// succeeds, so a rejected submission never touches the ledger.
    pub fn submit(
        &mut self,
        asker: AccountId,
        text: String,
        reference_urls: Vec<String>,
        fee: u128,
        counter: u64,
        now: Timestamp,
        params: &ProtocolParams,
    ) -> Result<QuestionId, QuestionError> {
        if text.len() < params.question_text_min {
            return Err(QuestionError::TextTooShort {
                min: params.question_text_min,
                len: text.len(),
            });
        }
        if text.len() > params.question_text_max {
            return Err(QuestionError::TextTooLong {
                max: params.question_text_max,
                len: text.len(),
            });
        }
        if reference_urls.len() > params.max_reference_urls {
            return Err(QuestionError::TooManyReferenceUrls {
                max: params.max_reference_urls,
                count: reference_urls.len(),
            });
        }
        if fee < params.min_question_fee {
            return Err(QuestionError::FeeTooLow {
                minimum: params.min_question_fee,
                provided: fee,
            });
        }
        let id = derive_question_id(&asker, &text, now, counter);
        if self.questions.contains_key(&id) {
            return Err(QuestionError::Collision(id));
        }
        self.questions.insert(
            id,
            Question {
                id,
                asker,
                text,
                reference_urls,
                escrowed_fee: fee,
                escrow_released: false,
                created_at: now,
                status: QuestionStatus::Pending,
            },
        );
        debug!(question = %id, fee, "question registered");
        Ok(id)
    }

    /// Record the relayer's answer and transition `Pending → Answered`.
    ///
    /// The relayer capability is checked by the caller; the record-level
    /// validation (non-empty text, non-zero storage hash, single answer per
    /// question) lives here.
    pub fn record_answer(
        &mut self,
        question_id: QuestionId,
        relayer: AccountId,
        text: String,
        evidence_summary: String,
        proof: ProofBundle,
        now: Timestamp,
    ) -> Result<(), QuestionError> {
        let question = self
            .questions
            .get_mut(&question_id)
            .ok_or(QuestionError::NotFound(question_id))?;
        match question.status {
            QuestionStatus::Pending => {}
            QuestionStatus::Answered | QuestionStatus::Finalized => {
                return Err(QuestionError::AlreadyAnswered(question_id));
            }
        }
        if text.is_empty() {
            return Err(QuestionError::EmptyAnswer);
        }
        if proof.storage.is_zero() {
            return Err(QuestionError::ZeroStorageHash);
        }
        question.status = QuestionStatus::Answered;
        self.answers.insert(
            question_id,
            Answer {
                question_id,
                text,
                evidence_summary,
                proof,
                relayer,
                submitted_at: now,
                verified: false,
            },
        );
        debug!(question = %question_id, "answer recorded");
        Ok(())
    }

    /// Transition `Answered → Finalized`. Settlement-only path.
    pub fn mark_finalized(&mut self, question_id: QuestionId) -> Result<(), QuestionError> {
        let question = self
            .questions
            .get_mut(&question_id)
            .ok_or(QuestionError::NotFound(question_id))?;
        match question.status {
            QuestionStatus::Answered => {
                question.status = QuestionStatus::Finalized;
                Ok(())
            }
            QuestionStatus::Pending => Err(QuestionError::NotAnswered(question_id)),
            QuestionStatus::Finalized => Err(QuestionError::AlreadyFinalized(question_id)),
        }
    }

    /// Flip the answer's verified flag. Settlement-only path.
    pub fn set_verified(&mut self, question_id: QuestionId) -> Result<(), QuestionError> {
        let answer = self
            .answers
            .get_mut(&question_id)
            .ok_or(QuestionError::NotAnswered(question_id))?;
        answer.verified = true;
        Ok(())
    }

    /// Release the escrowed fee. Yields exactly once per question; a second
    /// call fails, which makes double disbursement unrepresentable.
    pub fn take_escrow(&mut self, question_id: QuestionId) -> Result<u128, QuestionError> {
        let question = self
            .questions
            .get_mut(&question_id)
            .ok_or(QuestionError::NotFound(question_id))?;
        if question.escrow_released {
            return Err(QuestionError::EscrowAlreadyReleased(question_id));
        }
        question.escrow_released = true;
        Ok(question.escrowed_fee)
    }

    /// Re-arm the escrow after a failed (and aborted) settlement leg, so the
    /// whole finalize is retryable without losing the fee.
    pub fn restore_escrow(&mut self, question_id: QuestionId) -> Result<(), QuestionError> {
        let question = self
            .questions
            .get_mut(&question_id)
            .ok_or(QuestionError::NotFound(question_id))?;
        question.escrow_released = false;
        Ok(())
    }

    // ── Read accessors ───────────────────────────────────────────────────

    pub fn question(&self, question_id: &QuestionId) -> Option<&Question> {
        self.questions.get(question_id)
    }

    pub fn answer(&self, question_id: &QuestionId) -> Option<&Answer> {
        self.answers.get(question_id)
    }

    pub fn is_answer_verified(&self, question_id: &QuestionId) -> bool {
        self.answers.get(question_id).is_some_and(|a| a.verified)
    }

    pub fn status(&self, question_id: &QuestionId) -> Option<QuestionStatus> {
        self.questions.get(question_id).map(|q| q.status)
    }
}
