use std::collections::HashSet;

use time::OffsetDateTime;
use tracing::info;

use crate::domain::phase::{require_phase, RoundOperation};
use crate::domain::prediction::{
    validate_stake, validate_wallet, Prediction, PredictionBatch, PredictionGuess,
    PredictionPayload,
};
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};
use crate::services::round_flow::mutation::RoundMutation;
use crate::services::round_flow::snapshot::{BatchReceipt, PredictionReceipt, RoundSummary};
use crate::services::round_flow::store::StoredRound;
use crate::services::round_flow::RoundFlowService;
use crate::utils::ids::generate_id;

impl RoundFlowService {
    /// Accept one prediction while the round is open.
    pub fn add_prediction(
        &self,
        room_id: &str,
        round_id: &str,
        payload: PredictionPayload,
    ) -> Result<RoundMutation<PredictionReceipt>, DomainError> {
        self.run_mutation(room_id, round_id, |state, config| {
            let round = state.round_mut(room_id, round_id)?;
            require_phase(round.phase, RoundOperation::Predict)?;
            payload.validate()?;
            ensure_slot_free(round, &payload.user_wallet, &payload.guess)?;
            let total_staked_usdc = staked_after(round, payload.stake_amount_usdc)?;

            let prediction = new_prediction(round_id, payload, OffsetDateTime::now_utc());
            round.predictions.push(prediction.clone());
            round.total_staked_usdc = total_staked_usdc;

            info!(
                room_id,
                round_id,
                user_wallet = %prediction.payload.user_wallet,
                track_id = %prediction.payload.guess.track_id,
                step_index = prediction.payload.guess.step_index,
                stake_amount_usdc = prediction.payload.stake_amount_usdc,
                "Prediction accepted"
            );

            let receipt = PredictionReceipt {
                prediction,
                prediction_count: round.predictions.len(),
                total_staked_usdc,
                round: RoundSummary::from_stored(round, &config.policy),
            };
            Ok((receipt, Vec::new()))
        })
    }

    /// Accept every guess in `batch` or none of them.
    pub fn add_predictions_batch(
        &self,
        room_id: &str,
        round_id: &str,
        batch: PredictionBatch,
    ) -> Result<RoundMutation<BatchReceipt>, DomainError> {
        self.run_mutation(room_id, round_id, |state, config| {
            let round = state.round_mut(room_id, round_id)?;
            require_phase(round.phase, RoundOperation::Predict)?;

            if batch.guesses.is_empty() {
                return Err(DomainError::validation(
                    ValidationKind::EmptyBatch,
                    "Batch must contain at least one guess",
                ));
            }
            if batch.guesses.len() > config.max_batch_guesses {
                return Err(DomainError::validation(
                    ValidationKind::Other("batch_too_large".to_string()),
                    format!(
                        "Batch may contain at most {} guesses, got {}",
                        config.max_batch_guesses,
                        batch.guesses.len()
                    ),
                ));
            }
            validate_wallet(&batch.user_wallet)?;
            validate_stake(batch.stake_amount_usdc)?;

            let mut seen = HashSet::with_capacity(batch.guesses.len());
            for guess in &batch.guesses {
                guess.validate()?;
                if !seen.insert(guess.tile()) {
                    return Err(DomainError::conflict(
                        ConflictKind::DuplicatePrediction,
                        format!(
                            "Duplicate tile in batch payload: {}:{}",
                            guess.track_id, guess.step_index
                        ),
                    ));
                }
                ensure_slot_free(round, &batch.user_wallet, guess)?;
            }

            let batch_stake = batch
                .stake_amount_usdc
                .checked_mul(batch.guesses.len() as u64)
                .ok_or_else(overflow)?;
            let total_staked_usdc = staked_after(round, batch_stake)?;

            let now = OffsetDateTime::now_utc();
            let predictions: Vec<Prediction> = batch
                .payloads()
                .map(|payload| new_prediction(round_id, payload, now))
                .collect();
            round.predictions.extend(predictions.iter().cloned());
            round.total_staked_usdc = total_staked_usdc;

            info!(
                room_id,
                round_id,
                user_wallet = %batch.user_wallet,
                accepted_count = predictions.len(),
                stake_amount_usdc = batch.stake_amount_usdc,
                "Prediction batch accepted"
            );

            let receipt = BatchReceipt {
                accepted_count: predictions.len(),
                predictions,
                prediction_count: round.predictions.len(),
                total_staked_usdc,
                round: RoundSummary::from_stored(round, &config.policy),
            };
            Ok((receipt, Vec::new()))
        })
    }
}

fn ensure_slot_free(
    round: &StoredRound,
    user_wallet: &str,
    guess: &PredictionGuess,
) -> Result<(), DomainError> {
    if round
        .predictions
        .iter()
        .any(|prediction| prediction.same_slot(user_wallet, guess))
    {
        return Err(DomainError::conflict(
            ConflictKind::DuplicatePrediction,
            format!(
                "Duplicate prediction for tile {}:{} by this user",
                guess.track_id, guess.step_index
            ),
        ));
    }
    Ok(())
}

fn staked_after(round: &StoredRound, additional_usdc: u64) -> Result<u64, DomainError> {
    round
        .total_staked_usdc
        .checked_add(additional_usdc)
        .ok_or_else(overflow)
}

fn overflow() -> DomainError {
    DomainError::validation(ValidationKind::Overflow, "Total stake overflows u64")
}

fn new_prediction(
    round_id: &str,
    payload: PredictionPayload,
    submitted_at: OffsetDateTime,
) -> Prediction {
    Prediction {
        id: generate_id("pred"),
        round_id: round_id.to_string(),
        payload,
        submitted_at,
    }
}
