//! Owned arenas for rooms and rounds.
//!
//! Rooms and rounds live in separate maps keyed by id. A room never points
//! at its rounds directly: the per-room ordered id list stands in for the
//! "current round" back-reference.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::economics::split_stake;
use crate::domain::pattern::Pattern;
use crate::domain::phase::RoundPhase;
use crate::domain::prediction::Prediction;
use crate::domain::round_transition::RoundLifecycleView;
use crate::domain::settlement::{SettlementPolicy, SettlementResult};
use crate::errors::domain::{DomainError, NotFoundKind};

#[derive(Debug, Clone)]
pub(crate) struct StoredRoom {
    pub id: String,
    pub code: String,
    pub title: String,
    pub artist_wallet: Option<String>,
    pub audius_handle: Option<String>,
    pub audius_profile_url: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub pending_winner_pot_carry_usdc: u64,
    pub pending_liquidity_carry_usdc: u64,
}

/// What the artist disclosed, and whether it matched the commitment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealRecord {
    /// Normalized form of the revealed pattern.
    pub pattern: Pattern,
    pub nonce: String,
    pub commit_verified: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct StoredRound {
    pub id: String,
    pub room_id: String,
    pub index: u32,
    pub phase: RoundPhase,
    pub bpm: u16,
    pub commit_hash: Option<String>,
    pub pattern_version: Option<u8>,
    pub started_at: OffsetDateTime,
    pub locked_at: Option<OffsetDateTime>,
    pub revealed_at: Option<OffsetDateTime>,
    pub settled_at: Option<OffsetDateTime>,
    pub winner_pot_carry_in_usdc: u64,
    pub liquidity_carry_in_usdc: u64,
    pub predictions: Vec<Prediction>,
    pub total_staked_usdc: u64,
    pub reveal: Option<RevealRecord>,
    pub settlement: Option<SettlementResult>,
}

/// Live stake aggregates shown before settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct StakeMetrics {
    pub total_staked_usdc: u64,
    pub artist_pending_usdc: u64,
    pub winner_pot_usdc: u64,
}

impl StoredRound {
    pub fn lifecycle_view(&self) -> RoundLifecycleView {
        RoundLifecycleView {
            phase: self.phase,
            prediction_count: self.predictions.len(),
            commit_verified: self.reveal.as_ref().map(|reveal| reveal.commit_verified),
        }
    }

    pub fn stake_metrics(&self, policy: &SettlementPolicy) -> StakeMetrics {
        let mut metrics = StakeMetrics {
            total_staked_usdc: self.total_staked_usdc,
            artist_pending_usdc: 0,
            winner_pot_usdc: self.winner_pot_carry_in_usdc,
        };
        for prediction in &self.predictions {
            let split = split_stake(prediction.payload.stake_amount_usdc, &policy.fees);
            metrics.artist_pending_usdc =
                metrics.artist_pending_usdc.saturating_add(split.artist_pending_usdc);
            metrics.winner_pot_usdc = metrics.winner_pot_usdc.saturating_add(split.winner_pot_usdc);
        }
        metrics
    }
}

#[derive(Debug, Default)]
pub(crate) struct StoreState {
    pub rooms: HashMap<String, StoredRoom>,
    pub rounds: HashMap<String, StoredRound>,
    /// Round ids per room, in index order.
    pub room_rounds: HashMap<String, Vec<String>>,
    /// Join code -> room id.
    pub codes: HashMap<String, String>,
}

impl StoreState {
    pub fn room(&self, room_id: &str) -> Result<&StoredRoom, DomainError> {
        self.rooms
            .get(room_id)
            .ok_or_else(|| DomainError::not_found(NotFoundKind::Room, format!("Room not found: {room_id}")))
    }

    pub fn room_mut(&mut self, room_id: &str) -> Result<&mut StoredRoom, DomainError> {
        self.rooms
            .get_mut(room_id)
            .ok_or_else(|| DomainError::not_found(NotFoundKind::Room, format!("Room not found: {room_id}")))
    }

    /// A round that exists but belongs to another room is reported as missing.
    pub fn round(&self, room_id: &str, round_id: &str) -> Result<&StoredRound, DomainError> {
        self.room(room_id)?;
        self.rounds
            .get(round_id)
            .filter(|round| round.room_id == room_id)
            .ok_or_else(|| round_not_found(round_id))
    }

    pub fn round_mut(
        &mut self,
        room_id: &str,
        round_id: &str,
    ) -> Result<&mut StoredRound, DomainError> {
        self.room(room_id)?;
        self.rounds
            .get_mut(round_id)
            .filter(|round| round.room_id == room_id)
            .ok_or_else(|| round_not_found(round_id))
    }

    pub fn round_ids(&self, room_id: &str) -> &[String] {
        self.room_rounds
            .get(room_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn current_round(&self, room_id: &str) -> Option<&StoredRound> {
        self.round_ids(room_id)
            .last()
            .and_then(|round_id| self.rounds.get(round_id))
    }
}

fn round_not_found(round_id: &str) -> DomainError {
    DomainError::not_found(NotFoundKind::Round, format!("Round not found: {round_id}"))
}
