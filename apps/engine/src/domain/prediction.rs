use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::pattern::{TrackId, STEPS_PER_PATTERN_V1};
use crate::errors::domain::{DomainError, ValidationKind};

/// What a participant bets on: one cell of the revealed grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionGuess {
    pub track_id: TrackId,
    pub step_index: u8,
    pub will_be_active: bool,
}

impl PredictionGuess {
    pub fn new(track_id: TrackId, step_index: u8, will_be_active: bool) -> Self {
        Self {
            track_id,
            step_index,
            will_be_active,
        }
    }

    /// The `(track, step)` tile this guess targets.
    pub fn tile(&self) -> (TrackId, u8) {
        (self.track_id, self.step_index)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if (self.step_index as usize) < STEPS_PER_PATTERN_V1 {
            Ok(())
        } else {
            Err(DomainError::validation(
                ValidationKind::Guess,
                format!(
                    "stepIndex must be below {STEPS_PER_PATTERN_V1}, got {}",
                    self.step_index
                ),
            ))
        }
    }
}

/// A prediction as submitted, before the store assigns identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionPayload {
    pub user_wallet: String,
    pub stake_amount_usdc: u64,
    pub guess: PredictionGuess,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_proof: Option<String>,
}

impl PredictionPayload {
    pub fn new(user_wallet: impl Into<String>, stake_amount_usdc: u64, guess: PredictionGuess) -> Self {
        Self {
            user_wallet: user_wallet.into(),
            stake_amount_usdc,
            guess,
            session_proof: None,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        validate_wallet(&self.user_wallet)?;
        validate_stake(self.stake_amount_usdc)?;
        self.guess.validate()
    }
}

/// Many guesses from one wallet at one stake each; accepted all-or-nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionBatch {
    pub user_wallet: String,
    pub stake_amount_usdc: u64,
    pub guesses: Vec<PredictionGuess>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_proof: Option<String>,
}

impl PredictionBatch {
    pub fn payloads(&self) -> impl Iterator<Item = PredictionPayload> + '_ {
        self.guesses.iter().map(|guess| PredictionPayload {
            user_wallet: self.user_wallet.clone(),
            stake_amount_usdc: self.stake_amount_usdc,
            guess: *guess,
            session_proof: self.session_proof.clone(),
        })
    }
}

/// A stored prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub id: String,
    pub round_id: String,
    #[serde(flatten)]
    pub payload: PredictionPayload,
    #[serde(with = "time::serde::rfc3339")]
    pub submitted_at: OffsetDateTime,
}

impl Prediction {
    /// True when this prediction occupies the same wallet/track/step slot.
    pub fn same_slot(&self, user_wallet: &str, guess: &PredictionGuess) -> bool {
        self.payload.user_wallet == user_wallet && self.payload.guess.tile() == guess.tile()
    }
}

pub fn validate_wallet(user_wallet: &str) -> Result<(), DomainError> {
    if user_wallet.trim().is_empty() {
        return Err(DomainError::validation(
            ValidationKind::Wallet,
            "userWallet must not be empty",
        ));
    }
    Ok(())
}

pub fn validate_stake(stake_amount_usdc: u64) -> Result<(), DomainError> {
    if stake_amount_usdc == 0 {
        return Err(DomainError::validation(
            ValidationKind::Stake,
            "stakeAmountUsdc must be a positive integer",
        ));
    }
    Ok(())
}
