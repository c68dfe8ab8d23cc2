//! Read-side views of rooms and rounds.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::phase::RoundPhase;
use crate::domain::prediction::Prediction;
use crate::domain::settlement::{SettlementPolicy, SettlementResult};
use crate::services::round_flow::store::{RevealRecord, StoreState, StoredRoom, StoredRound};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundSummary {
    pub id: String,
    pub room_id: String,
    pub index: u32,
    pub phase: RoundPhase,
    pub bpm: u16,
    pub commit_hash: Option<String>,
    pub pattern_version: Option<u8>,
    pub prediction_count: usize,
    pub commit_verified: Option<bool>,
    pub total_staked_usdc: u64,
    pub artist_pending_usdc: u64,
    /// Winner-pot share of stakes so far plus the carry-in.
    pub winner_pot_usdc: u64,
    pub winner_pot_carry_in_usdc: u64,
    pub liquidity_carry_in_usdc: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub locked_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub revealed_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub settled_at: Option<OffsetDateTime>,
}

impl RoundSummary {
    pub(crate) fn from_stored(round: &StoredRound, policy: &SettlementPolicy) -> Self {
        let metrics = round.stake_metrics(policy);
        Self {
            id: round.id.clone(),
            room_id: round.room_id.clone(),
            index: round.index,
            phase: round.phase,
            bpm: round.bpm,
            commit_hash: round.commit_hash.clone(),
            pattern_version: round.pattern_version,
            prediction_count: round.predictions.len(),
            commit_verified: round.reveal.as_ref().map(|reveal| reveal.commit_verified),
            total_staked_usdc: metrics.total_staked_usdc,
            artist_pending_usdc: metrics.artist_pending_usdc,
            winner_pot_usdc: metrics.winner_pot_usdc,
            winner_pot_carry_in_usdc: round.winner_pot_carry_in_usdc,
            liquidity_carry_in_usdc: round.liquidity_carry_in_usdc,
            started_at: round.started_at,
            locked_at: round.locked_at,
            revealed_at: round.revealed_at,
            settled_at: round.settled_at,
        }
    }
}

/// Full state of one round, including what only exists after reveal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundDetail {
    pub summary: RoundSummary,
    pub predictions: Vec<Prediction>,
    pub reveal: Option<RevealRecord>,
    pub settlement: Option<SettlementResult>,
}

impl RoundDetail {
    pub(crate) fn from_stored(round: &StoredRound, policy: &SettlementPolicy) -> Self {
        Self {
            summary: RoundSummary::from_stored(round, policy),
            predictions: round.predictions.clone(),
            reveal: round.reveal.clone(),
            settlement: round.settlement.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomView {
    pub id: String,
    pub code: String,
    pub title: String,
    pub artist_wallet: Option<String>,
    pub audius_handle: Option<String>,
    pub audius_profile_url: Option<String>,
    pub pending_winner_pot_carry_usdc: u64,
    pub pending_liquidity_carry_usdc: u64,
    pub round_count: usize,
    pub current_round: Option<RoundSummary>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl RoomView {
    pub(crate) fn build(state: &StoreState, room: &StoredRoom, policy: &SettlementPolicy) -> Self {
        Self {
            id: room.id.clone(),
            code: room.code.clone(),
            title: room.title.clone(),
            artist_wallet: room.artist_wallet.clone(),
            audius_handle: room.audius_handle.clone(),
            audius_profile_url: room.audius_profile_url.clone(),
            pending_winner_pot_carry_usdc: room.pending_winner_pot_carry_usdc,
            pending_liquidity_carry_usdc: room.pending_liquidity_carry_usdc,
            round_count: state.round_ids(&room.id).len(),
            current_round: state
                .current_round(&room.id)
                .map(|round| RoundSummary::from_stored(round, policy)),
            created_at: room.created_at,
            updated_at: room.updated_at,
        }
    }
}

/// Outcome of a single accepted prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionReceipt {
    pub prediction: Prediction,
    pub prediction_count: usize,
    pub total_staked_usdc: u64,
    pub round: RoundSummary,
}

/// Outcome of an accepted batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReceipt {
    pub accepted_count: usize,
    pub predictions: Vec<Prediction>,
    pub prediction_count: usize,
    pub total_staked_usdc: u64,
    pub round: RoundSummary,
}
