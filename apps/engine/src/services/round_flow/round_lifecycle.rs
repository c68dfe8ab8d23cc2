use time::OffsetDateTime;
use tracing::info;

use crate::domain::pattern::PATTERN_VERSION_V1;
use crate::domain::pattern_codec::{normalize, verify_commit_reveal};
use crate::domain::phase::{advance_phase, RoundOperation, RoundPhase};
use crate::domain::round_transition::RoundEvent;
use crate::domain::settlement::{settle, SettlementInput, SettlementReferences, SettlementResult};
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind, ValidationKind};
use crate::services::round_flow::mutation::RoundMutation;
use crate::services::round_flow::requests::{CommitPayload, RevealPayload};
use crate::services::round_flow::snapshot::RoundSummary;
use crate::services::round_flow::store::{RevealRecord, StoredRound};
use crate::services::round_flow::RoundFlowService;
use crate::utils::ids::generate_id;

impl RoundFlowService {
    /// Open the next round in a room.
    ///
    /// The room's pending rollover balances move into the new round's
    /// carry-in fields and the room accumulators reset to zero.
    pub fn start_round(
        &self,
        room_id: &str,
        bpm: u16,
    ) -> Result<RoundMutation<RoundSummary>, DomainError> {
        if bpm < self.config.min_bpm || bpm > self.config.max_bpm {
            return Err(DomainError::validation(
                ValidationKind::Bpm,
                format!(
                    "BPM must be between {} and {}, got {bpm}",
                    self.config.min_bpm, self.config.max_bpm
                ),
            ));
        }

        let mut state = self.state.write();
        state.room(room_id)?;

        if let Some(current) = state.current_round(room_id) {
            if current.phase != RoundPhase::Settled {
                return Err(DomainError::conflict(
                    ConflictKind::RoundInProgress,
                    format!(
                        "Round {} is still {}; settle it before starting another",
                        current.id, current.phase
                    ),
                ));
            }
        }

        let index = state.round_ids(room_id).len() as u32 + 1;
        let now = OffsetDateTime::now_utc();

        let room = state.room_mut(room_id)?;
        let winner_pot_carry_in_usdc = std::mem::take(&mut room.pending_winner_pot_carry_usdc);
        let liquidity_carry_in_usdc = std::mem::take(&mut room.pending_liquidity_carry_usdc);
        room.updated_at = now;

        let round = StoredRound {
            id: generate_id("round"),
            room_id: room_id.to_string(),
            index,
            phase: RoundPhase::AwaitingCommit,
            bpm,
            commit_hash: None,
            pattern_version: None,
            started_at: now,
            locked_at: None,
            revealed_at: None,
            settled_at: None,
            winner_pot_carry_in_usdc,
            liquidity_carry_in_usdc,
            predictions: Vec::new(),
            total_staked_usdc: 0,
            reveal: None,
            settlement: None,
        };
        let round_id = round.id.clone();
        let summary = RoundSummary::from_stored(&round, &self.config.policy);

        state.rounds.insert(round_id.clone(), round);
        state
            .room_rounds
            .entry(room_id.to_string())
            .or_default()
            .push(round_id.clone());

        info!(
            room_id,
            round_id = %round_id,
            index,
            bpm,
            winner_pot_carry_in_usdc,
            liquidity_carry_in_usdc,
            "Round started"
        );

        Ok(RoundMutation {
            room_id: room_id.to_string(),
            round_id,
            value: summary,
            events: vec![RoundEvent::RoundStarted],
        })
    }

    /// Record the artist's commitment and open predictions.
    pub fn commit_round(
        &self,
        room_id: &str,
        round_id: &str,
        payload: CommitPayload,
    ) -> Result<RoundMutation<RoundSummary>, DomainError> {
        let commit_hash = payload.commit_hash.trim().to_string();
        if commit_hash.len() < self.config.min_commit_hash_len {
            return Err(DomainError::validation(
                ValidationKind::CommitHash,
                format!(
                    "Commit hash must be at least {} characters",
                    self.config.min_commit_hash_len
                ),
            ));
        }
        if payload.pattern_version != PATTERN_VERSION_V1 {
            return Err(DomainError::validation(
                ValidationKind::Pattern,
                format!("Unsupported pattern version: {}", payload.pattern_version),
            ));
        }

        self.run_mutation(room_id, round_id, |state, config| {
            let round = state.round_mut(room_id, round_id)?;
            let next = advance_phase(round.phase, RoundOperation::Commit)?;
            if round.commit_hash.is_some() {
                return Err(DomainError::conflict(
                    ConflictKind::AlreadyCommitted,
                    format!("Round {round_id} already has a commitment"),
                ));
            }

            round.commit_hash = Some(commit_hash);
            round.pattern_version = Some(payload.pattern_version);
            round.phase = next;

            info!(room_id, round_id, "Round committed");
            Ok((RoundSummary::from_stored(round, &config.policy), Vec::new()))
        })
    }

    /// Close predictions.
    pub fn lock_round(
        &self,
        room_id: &str,
        round_id: &str,
    ) -> Result<RoundMutation<RoundSummary>, DomainError> {
        self.run_mutation(room_id, round_id, |state, config| {
            let round = state.round_mut(room_id, round_id)?;
            round.phase = advance_phase(round.phase, RoundOperation::Lock)?;
            round.locked_at = Some(OffsetDateTime::now_utc());

            info!(
                room_id,
                round_id,
                prediction_count = round.predictions.len(),
                "Round locked"
            );
            Ok((RoundSummary::from_stored(round, &config.policy), Vec::new()))
        })
    }

    /// Disclose the pattern and check it against the stored commitment.
    ///
    /// A mismatch still reveals the round; only a malformed pattern or a
    /// missing commitment is an error.
    pub fn reveal_round(
        &self,
        room_id: &str,
        round_id: &str,
        payload: RevealPayload,
    ) -> Result<RoundMutation<RevealRecord>, DomainError> {
        self.run_mutation(room_id, round_id, |state, _config| {
            let round = state.round_mut(room_id, round_id)?;
            let next = advance_phase(round.phase, RoundOperation::Reveal)?;
            let commit_hash = round.commit_hash.as_deref().ok_or_else(|| {
                DomainError::conflict(
                    ConflictKind::MissingCommitment,
                    format!("Round {round_id} has no commitment to reveal against"),
                )
            })?;
            if payload.nonce.trim().is_empty() {
                return Err(DomainError::validation(
                    ValidationKind::Nonce,
                    "Nonce must not be empty",
                ));
            }

            let pattern = normalize(&payload.pattern)?;
            let commit_verified = verify_commit_reveal(
                commit_hash,
                &pattern,
                round_id,
                &payload.nonce,
                &payload.commit_input_version,
            )?;

            let reveal = RevealRecord {
                pattern,
                nonce: payload.nonce,
                commit_verified,
            };
            round.reveal = Some(reveal.clone());
            round.revealed_at = Some(OffsetDateTime::now_utc());
            round.phase = next;

            info!(room_id, round_id, commit_verified, "Round revealed");
            Ok((reveal, Vec::new()))
        })
    }

    /// Run the settlement engine and fold rollovers back into the room.
    pub fn settle_round(
        &self,
        room_id: &str,
        round_id: &str,
    ) -> Result<RoundMutation<SettlementResult>, DomainError> {
        self.run_mutation(room_id, round_id, |state, config| {
            let round = state.round(room_id, round_id)?;
            if round.settlement.is_some() {
                return Err(DomainError::conflict(
                    ConflictKind::AlreadySettled,
                    format!("Round {round_id} is already settled"),
                ));
            }
            let next = advance_phase(round.phase, RoundOperation::Settle)?;
            let reveal = round.reveal.as_ref().ok_or_else(|| {
                DomainError::conflict(
                    ConflictKind::MissingCommitment,
                    format!("Round {round_id} has no reveal"),
                )
            })?;

            let payloads: Vec<_> = round
                .predictions
                .iter()
                .map(|prediction| prediction.payload.clone())
                .collect();
            let result = settle(
                SettlementInput {
                    round_id,
                    commit_verified: reveal.commit_verified,
                    pattern: &reveal.pattern,
                    predictions: &payloads,
                    winner_pot_carry_in_usdc: round.winner_pot_carry_in_usdc,
                    liquidity_carry_in_usdc: round.liquidity_carry_in_usdc,
                },
                &config.policy,
            )?;

            let room = state.room(room_id)?;
            let winner_pot_carry = room
                .pending_winner_pot_carry_usdc
                .checked_add(result.economics.winner_pot_rollover_usdc);
            let liquidity_carry = room
                .pending_liquidity_carry_usdc
                .checked_add(result.economics.liquidity_rollover_usdc);
            let (Some(winner_pot_carry), Some(liquidity_carry)) = (winner_pot_carry, liquidity_carry)
            else {
                return Err(DomainError::validation(
                    ValidationKind::Overflow,
                    "Room rollover balance overflows u64",
                ));
            };

            let now = OffsetDateTime::now_utc();
            let room = state.room_mut(room_id)?;
            room.pending_winner_pot_carry_usdc = winner_pot_carry;
            room.pending_liquidity_carry_usdc = liquidity_carry;
            room.updated_at = now;

            let round = state.round_mut(room_id, round_id)?;
            round.settlement = Some(result.clone());
            round.settled_at = Some(now);
            round.phase = next;

            info!(
                room_id,
                round_id,
                commit_verified = result.commit_verified,
                total_predictions = result.total_predictions,
                winning_predictions = result.winning_predictions,
                winner_pot_distributed_usdc = result.economics.winner_pot_distributed_usdc,
                winner_pot_rollover_usdc = result.economics.winner_pot_rollover_usdc,
                "Round settled"
            );
            Ok((result, Vec::new()))
        })
    }

    /// Merge external confirmation identifiers into a stored settlement.
    ///
    /// Computed economics are never touched.
    pub fn attach_settlement_references(
        &self,
        room_id: &str,
        round_id: &str,
        patch: SettlementReferences,
    ) -> Result<RoundMutation<SettlementResult>, DomainError> {
        self.run_mutation(room_id, round_id, |state, _config| {
            let round = state.round_mut(room_id, round_id)?;
            let settlement = round.settlement.as_mut().ok_or_else(|| {
                DomainError::not_found(
                    NotFoundKind::Settlement,
                    format!("Round {round_id} has no settlement"),
                )
            })?;

            if patch.is_empty() {
                return Ok((settlement.clone(), Vec::new()));
            }

            settlement
                .integrations
                .get_or_insert_with(SettlementReferences::default)
                .merge(patch);

            info!(room_id, round_id, "Settlement references attached");
            Ok((
                settlement.clone(),
                vec![RoundEvent::SettlementReferencesAttached],
            ))
        })
    }
}
