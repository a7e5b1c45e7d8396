//! Question and answer records.

use serde::{Deserialize, Serialize};
use verity_types::{AccountId, ContentHash, QuestionId, QuestionStatus, Timestamp};

/// A submitted question with its escrowed fee.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub asker: AccountId,
    pub text: String,
    pub reference_urls: Vec<String>,
    /// The fee locked at submission, disbursed exactly once at settlement.
    pub escrowed_fee: u128,
    /// Set once the escrow has been released to its destinations.
    pub escrow_released: bool,
    pub created_at: Timestamp,
    pub status: QuestionStatus,
}

/// The four proof-of-inference hashes binding an answer to the off-chain
/// computation that produced it. Opaque to the engine — stored, exposed,
/// never recomputed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofBundle {
    pub model: ContentHash,
    pub input: ContentHash,
    pub output: ContentHash,
    /// Content hash of the full evidence payload in durable storage.
    pub storage: ContentHash,
}

/// The relayer's published answer for a question. 1:1 with the question,
/// immutable after submission except for the `verified` flag.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: QuestionId,
    pub text: String,
    pub evidence_summary: String,
    pub proof: ProofBundle,
    pub relayer: AccountId,
    pub submitted_at: Timestamp,
    /// Set by settlement iff the stakers approved the answer.
    pub verified: bool,
}
