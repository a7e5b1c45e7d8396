//! Settlement — resolving a closed round into payouts, slashes and a
//! finalized question.
//!
//! Ordering inside `finalize` is what makes it effectively atomic:
//! the fee split and every per-voter amount are computed first (pure
//! arithmetic, so an overflowing fee aborts with the escrow untouched),
//! then the escrow is taken, the mandatory legs (asker refund, or the
//! treasury/relayer cuts) are paid with abort-and-restore on failure, then
//! the per-voter reward/slash batch runs failure-isolated, and only then are
//! the finalized flags set. A failed mandatory leg leaves everything
//! un-finalized and the whole call retryable; a failed per-voter transfer is
//! recorded, emitted, and skipped.

use crate::error::PoolError;
use crate::pool::VerityPool;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use verity_events::PoolEvent;
use verity_questions::QuestionError;
use verity_stake::StakeError;
use verity_types::params::BPS_DENOMINATOR;
use verity_types::{AccountId, ProtocolParams, QuestionId, Timestamp};
use verity_voting::{Outcome, VotingError};

/// How one voter fared in settlement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoterOutcome {
    /// Credited this reward amount from the fee pool.
    Rewarded(u128),
    /// This much stake burned (may be below the nominal penalty if the
    /// position shrank after the ballot was cast).
    Slashed(u128),
    /// Transfer failed; skipped without aborting settlement.
    Failed { reason: String },
}

/// Per-voter entry in the settlement batch result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterSettlement {
    pub voter: AccountId,
    pub outcome: VoterOutcome,
}

/// What a successful `finalize` did.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SettlementReport {
    pub question_id: QuestionId,
    pub outcome: Outcome,
    pub fee: u128,
    pub voters: Vec<VoterSettlement>,
}

/// The escrowed fee carved into its destinations. The treasury cut absorbs
/// integer-division dust so the three parts always sum to the fee exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct FeeSplit {
    pub reward_pool: u128,
    pub treasury: u128,
    pub relayer: u128,
}

pub(crate) fn split_fee(fee: u128, params: &ProtocolParams) -> Result<FeeSplit, PoolError> {
    let reward_pool = fee
        .checked_mul(u128::from(params.reward_pool_bps))
        .ok_or(StakeError::Overflow)?
        / BPS_DENOMINATOR;
    let relayer = fee
        .checked_mul(u128::from(params.relayer_bps))
        .ok_or(StakeError::Overflow)?
        / BPS_DENOMINATOR;
    let treasury = fee - reward_pool - relayer;
    Ok(FeeSplit {
        reward_pool,
        treasury,
        relayer,
    })
}

/// Transfers worked out before any money moves. Planning is pure
/// arithmetic, so an overflowing fee fails here with the escrow untouched
/// and the round still settleable.
struct SettlementPlan {
    split: FeeSplit,
    rewards: Vec<(AccountId, u128)>,
    losers: Vec<(AccountId, u128)>,
    dust: u128,
}

impl VerityPool {
    /// Settle a closed round. Any caller may invoke this once the voting
    /// window has elapsed; a second call on a settled question fails with
    /// `AlreadyFinalized` and changes nothing.
    pub fn finalize(
        &mut self,
        question_id: QuestionId,
        now: Timestamp,
    ) -> Result<SettlementReport, PoolError> {
        if self.voting.is_finalized(&question_id) {
            return Err(VotingError::AlreadyFinalized(question_id).into());
        }
        let outcome = self
            .voting
            .outcome(question_id, self.stake.total_staked_supply(), now)?;
        let question = self
            .questions
            .question(&question_id)
            .ok_or(QuestionError::NotFound(question_id))?;
        let asker = question.asker.clone();
        let plan = if outcome.quorum_met {
            Some(self.plan_quorum_settlement(question_id, question.escrowed_fee, &outcome)?)
        } else {
            None
        };
        let fee = self.questions.take_escrow(question_id)?;

        let voters = if let Some(plan) = plan {
            self.settle_with_quorum(question_id, &asker, fee, &outcome, plan, now)?
        } else {
            // Non-participation is not rejection: nobody is rewarded or
            // slashed, the asker gets the whole fee back. The refund is
            // mandatory — on failure the escrow is restored and the round
            // stays settleable.
            if let Err(err) = self.stake.credit(&asker, fee) {
                self.questions.restore_escrow(question_id)?;
                return Err(err.into());
            }
            self.events.emit(PoolEvent::FeeRefunded {
                question_id,
                asker: asker.clone(),
                amount: fee,
            });
            Vec::new()
        };

        // All mandatory transfers succeeded — only now do the finalized
        // flags go down, making the settlement irreversible.
        self.voting.mark_finalized(question_id, now)?;
        self.questions.mark_finalized(question_id)?;
        if outcome.approved {
            self.questions.set_verified(question_id)?;
        }
        self.events.emit(PoolEvent::VotingFinalized {
            question_id,
            approved: outcome.approved,
            quorum_met: outcome.quorum_met,
            total_participating: outcome.total_participating,
        });
        info!(
            question = %question_id,
            approved = outcome.approved,
            quorum_met = outcome.quorum_met,
            participating = outcome.total_participating,
            "round settled"
        );
        Ok(SettlementReport {
            question_id,
            outcome,
            fee,
            voters,
        })
    }

    /// Work out the fee split and every per-voter amount without touching
    /// any state. Runs before the escrow is taken.
    fn plan_quorum_settlement(
        &self,
        question_id: QuestionId,
        fee: u128,
        outcome: &Outcome,
    ) -> Result<SettlementPlan, PoolError> {
        let split = split_fee(fee, &self.params)?;
        let round = self
            .voting
            .round(&question_id)
            .expect("outcome was computed from this round");

        // Snapshot ballots by side, in cast order.
        let mut winners: Vec<(AccountId, u128)> = Vec::new();
        let mut losers: Vec<(AccountId, u128)> = Vec::new();
        for ballot in round.ballots_in_order() {
            let entry = (ballot.voter.clone(), ballot.stake_weight);
            if ballot.approve == outcome.approved {
                winners.push(entry);
            } else {
                losers.push(entry);
            }
        }

        // Each winner's proportional share of the reward pool, so the dust
        // is known before any transfer happens.
        let winning_total = if outcome.approved {
            outcome.total_for
        } else {
            outcome.total_against
        };
        let mut rewards: Vec<(AccountId, u128)> = Vec::with_capacity(winners.len());
        let mut distributed: u128 = 0;
        for (voter, weight) in winners {
            let amount = if winning_total == 0 {
                0
            } else {
                split
                    .reward_pool
                    .checked_mul(weight)
                    .ok_or(StakeError::Overflow)?
                    / winning_total
            };
            distributed += amount;
            rewards.push((voter, amount));
        }
        let dust = split.reward_pool - distributed;
        Ok(SettlementPlan {
            split,
            rewards,
            losers,
            dust,
        })
    }

    /// The quorum-met settlement path: pay the mandatory legs, then run the
    /// failure-isolated per-voter batch.
    fn settle_with_quorum(
        &mut self,
        question_id: QuestionId,
        asker: &AccountId,
        fee: u128,
        outcome: &Outcome,
        plan: SettlementPlan,
        now: Timestamp,
    ) -> Result<Vec<VoterSettlement>, PoolError> {
        let SettlementPlan {
            split,
            rewards,
            losers,
            dust,
        } = plan;

        // Mandatory legs. Approved: relayer and treasury cuts (dust goes to
        // the treasury). Rejected: the non-pool share plus dust flows back
        // to the asker; the relayer and treasury earn nothing from an
        // answer the stakers turned down.
        if outcome.approved {
            let relayer = self
                .questions
                .answer(&question_id)
                .expect("an open round implies a recorded answer")
                .relayer
                .clone();
            let treasury = self.authorities.treasury.clone();
            let treasury_cut = split.treasury + dust;
            if let Err(err) = self.stake.credit(&treasury, treasury_cut) {
                self.questions.restore_escrow(question_id)?;
                return Err(err.into());
            }
            if let Err(err) = self.stake.credit(&relayer, split.relayer) {
                self.stake
                    .debit(&treasury, treasury_cut)
                    .expect("reversing a just-credited amount cannot fail");
                self.questions.restore_escrow(question_id)?;
                return Err(err.into());
            }
        } else {
            let residual = fee - split.reward_pool + dust;
            if let Err(err) = self.stake.credit(asker, residual) {
                self.questions.restore_escrow(question_id)?;
                return Err(err.into());
            }
            self.events.emit(PoolEvent::FeeRefunded {
                question_id,
                asker: asker.clone(),
                amount: residual,
            });
        }

        // Failure-isolated batch: reward the winning side, slash the losing
        // side. One voter's failure never blocks the rest.
        let mut results = Vec::with_capacity(rewards.len() + losers.len());
        for (voter, amount) in rewards {
            match self.stake.credit(&voter, amount) {
                Ok(()) => {
                    self.events.emit(PoolEvent::RewardDistributed {
                        question_id,
                        voter: voter.clone(),
                        amount,
                    });
                    results.push(VoterSettlement {
                        voter,
                        outcome: VoterOutcome::Rewarded(amount),
                    });
                }
                Err(err) => {
                    warn!(question = %question_id, voter = %voter, %err, "reward transfer failed, skipping");
                    self.events.emit(PoolEvent::SettlementTransferFailed {
                        question_id,
                        voter: voter.clone(),
                        reason: err.to_string(),
                    });
                    results.push(VoterSettlement {
                        voter,
                        outcome: VoterOutcome::Failed {
                            reason: err.to_string(),
                        },
                    });
                }
            }
        }
        let settlement = self.authorities.settlement.clone();
        for (voter, weight) in losers {
            let penalty = weight
                .checked_mul(u128::from(self.params.slash_bps))
                .map(|p| p / BPS_DENOMINATOR);
            let applied = match penalty {
                Some(p) => self.stake.slash(&settlement, &voter, p, now),
                None => Err(StakeError::Overflow),
            };
            match applied {
                Ok(burned) => {
                    self.events.emit(PoolEvent::VoterSlashed {
                        question_id,
                        voter: voter.clone(),
                        amount: burned,
                    });
                    results.push(VoterSettlement {
                        voter,
                        outcome: VoterOutcome::Slashed(burned),
                    });
                }
                Err(err) => {
                    warn!(question = %question_id, voter = %voter, %err, "slash failed, skipping");
                    self.events.emit(PoolEvent::SettlementTransferFailed {
                        question_id,
                        voter: voter.clone(),
                        reason: err.to_string(),
                    });
                    results.push(VoterSettlement {
                        voter,
                        outcome: VoterOutcome::Failed {
                            reason: err.to_string(),
                        },
                    });
                }
            }
        }
        Ok(results)
    }
}
