//! The pool facade — inbound operations and read queries.

use crate::error::PoolError;
use serde::{Deserialize, Serialize};
use tracing::info;
use verity_events::{EventLog, PoolEvent};
use verity_questions::{Answer, ProofBundle, Question, QuestionRegistry};
use verity_stake::StakeLedger;
use verity_types::{AccountId, Authorities, ContentHash, ProtocolParams, QuestionId, Timestamp};
use verity_voting::{Ballot, VotingEngine, VotingRound};

/// The assembled consensus engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerityPool {
    pub(crate) params: ProtocolParams,
    pub(crate) authorities: Authorities,
    pub(crate) stake: StakeLedger,
    pub(crate) questions: QuestionRegistry,
    pub(crate) voting: VotingEngine,
    pub(crate) events: EventLog,
    /// Monotonic submission counter mixed into question-id derivation.
    submission_counter: u64,
}

impl VerityPool {
    /// Build a pool. Fails if the parameter set is internally inconsistent
    /// (fee split not summing to 100%, thresholds above 100%).
    pub fn new(
        params: ProtocolParams,
        authorities: Authorities,
        genesis: Timestamp,
    ) -> Result<Self, PoolError> {
        params.validate()?;
        let stake = StakeLedger::new(&params, authorities.settlement.clone(), genesis);
        let voting = VotingEngine::new(&params);
        Ok(Self {
            params,
            authorities,
            stake,
            questions: QuestionRegistry::new(),
            voting,
            events: EventLog::new(),
            submission_counter: 0,
        })
    }

    // ── Token operations (bridged from the external token layer) ─────────

    /// Credit an account's spendable balance.
    pub fn credit(&mut self, owner: &AccountId, amount: u128) -> Result<(), PoolError> {
        self.stake.credit(owner, amount)?;
        Ok(())
    }

    pub fn stake(&mut self, owner: &AccountId, amount: u128, now: Timestamp) -> Result<(), PoolError> {
        self.stake.stake(owner, amount, now)?;
        Ok(())
    }

    pub fn unstake(&mut self, owner: &AccountId, amount: u128, now: Timestamp) -> Result<(), PoolError> {
        self.stake.unstake(owner, amount, now)?;
        Ok(())
    }

    pub fn claim_rewards(&mut self, owner: &AccountId, now: Timestamp) -> Result<u128, PoolError> {
        Ok(self.stake.claim_rewards(owner, now)?)
    }

    pub fn spendable(&self, owner: &AccountId) -> u128 {
        self.stake.spendable(owner)
    }

    pub fn staked_amount(&self, owner: &AccountId) -> u128 {
        self.stake.staked_amount(owner)
    }

    pub fn total_staked_supply(&self) -> u128 {
        self.stake.total_staked_supply()
    }

    // ── Inbound operations ───────────────────────────────────────────────

    /// Submit a question, escrowing `fee` from the asker's spendable
    /// balance. All-or-nothing: a rejected submission leaves the ledger
    /// untouched.
    pub fn submit_question(
        &mut self,
        asker: AccountId,
        text: String,
        reference_urls: Vec<String>,
        fee: u128,
        now: Timestamp,
    ) -> Result<QuestionId, PoolError> {
        // Escrow first; the registry insert is the only fallible step after
        // it, and a failure there refunds the exact debit.
        self.stake.debit(&asker, fee)?;
        let counter = self.submission_counter;
        let result = self.questions.submit(
            asker.clone(),
            text,
            reference_urls,
            fee,
            counter,
            now,
            &self.params,
        );
        let question_id = match result {
            Ok(id) => id,
            Err(err) => {
                self.stake
                    .credit(&asker, fee)
                    .expect("refunding a just-debited amount cannot overflow");
                return Err(err.into());
            }
        };
        self.submission_counter += 1;
        self.events.emit(PoolEvent::QuestionSubmitted {
            question_id,
            asker,
            fee,
            at: now,
        });
        info!(question = %question_id, fee, "question submitted");
        Ok(question_id)
    }

    /// Publish the answer for a pending question and open its voting round.
    /// Relayer-capability only.
    #[allow(clippy::too_many_arguments)]
    pub fn submit_answer(
        &mut self,
        caller: &AccountId,
        question_id: QuestionId,
        answer_text: String,
        evidence_summary: String,
        storage_hash: ContentHash,
        model_hash: ContentHash,
        input_hash: ContentHash,
        output_hash: ContentHash,
        now: Timestamp,
    ) -> Result<(), PoolError> {
        if *caller != self.authorities.relayer {
            return Err(PoolError::NotRelayer(caller.to_string()));
        }
        let proof = ProofBundle {
            model: model_hash,
            input: input_hash,
            output: output_hash,
            storage: storage_hash,
        };
        self.questions.record_answer(
            question_id,
            caller.clone(),
            answer_text,
            evidence_summary,
            proof,
            now,
        )?;
        self.voting.start_round(question_id, now)?;
        let ends_at = self
            .voting
            .round(&question_id)
            .expect("round opened above")
            .ends_at;
        self.events.emit(PoolEvent::AnswerSubmitted {
            question_id,
            relayer: caller.clone(),
            at: now,
        });
        self.events.emit(PoolEvent::VotingStarted { question_id, ends_at });
        info!(question = %question_id, %ends_at, "answer published, voting open");
        Ok(())
    }

    /// Cast a ballot. The voter's current staked amount is snapshotted into
    /// the ballot; later stake changes never re-score it.
    pub fn cast_vote(
        &mut self,
        caller: &AccountId,
        question_id: QuestionId,
        approve: bool,
        now: Timestamp,
    ) -> Result<(), PoolError> {
        let stake_weight = self.stake.staked_amount(caller);
        self.voting
            .cast_vote(question_id, caller.clone(), approve, stake_weight, now)?;
        self.events.emit(PoolEvent::VoteCast {
            question_id,
            voter: caller.clone(),
            approve,
            stake_weight,
        });
        Ok(())
    }

    // ── Read queries ─────────────────────────────────────────────────────

    pub fn question(&self, question_id: &QuestionId) -> Option<&Question> {
        self.questions.question(question_id)
    }

    /// The answer text and its verified flag.
    pub fn answer(&self, question_id: &QuestionId) -> Option<(&str, bool)> {
        self.questions
            .answer(question_id)
            .map(|a| (a.text.as_str(), a.verified))
    }

    pub fn answer_record(&self, question_id: &QuestionId) -> Option<&Answer> {
        self.questions.answer(question_id)
    }

    pub fn is_answer_verified(&self, question_id: &QuestionId) -> bool {
        self.questions.is_answer_verified(question_id)
    }

    pub fn voting_round(&self, question_id: &QuestionId) -> Option<&VotingRound> {
        self.voting.round(question_id)
    }

    pub fn vote(&self, question_id: &QuestionId, voter: &AccountId) -> Option<&Ballot> {
        self.voting.ballot(question_id, voter)
    }

    pub fn voters(&self, question_id: &QuestionId) -> &[AccountId] {
        self.voting.voters(question_id)
    }

    /// The append-only notification log.
    pub fn events(&self) -> &EventLog {
        &self.events
    }
}
