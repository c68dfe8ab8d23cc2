//! Drives complete rounds through an in-memory round store.

use beat_engine::domain::pattern::{Pattern, StepState, TrackId, STEPS_PER_PATTERN_V1};
use beat_engine::domain::pattern_codec::{create_empty_pattern, hash_pattern_commit_input};
use beat_engine::domain::prediction::{PredictionBatch, PredictionGuess};
use beat_engine::domain::round_transition::RoundEvent;
use beat_engine::domain::settlement::{SettlementReferences, SettlementResult};
use beat_engine::services::round_flow::{CommitPayload, CreateRoomRequest, RevealPayload};
use beat_engine::{DomainError, EngineConfig, RoundFlowService};
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use tracing::debug;

const TILE_COUNT: usize = TrackId::ALL.len() * STEPS_PER_PATTERN_V1;

pub struct SimulationConfig {
    pub players: usize,
    pub predictions_per_player: usize,
    pub tamper_rate: f64,
    pub min_stake_usdc: u64,
    pub max_stake_usdc: u64,
    pub density: f64,
}

/// What happened in one simulated round.
pub struct RoundOutcome {
    pub round_index: u32,
    pub round_id: String,
    pub bpm: u16,
    pub active_steps: usize,
    pub tampered: bool,
    pub settlement: SettlementResult,
    pub events: Vec<RoundEvent>,
}

pub struct Simulator {
    service: RoundFlowService,
    room_id: String,
    wallets: Vec<String>,
    config: SimulationConfig,
    rng: StdRng,
}

impl Simulator {
    pub fn new(
        engine: EngineConfig,
        config: SimulationConfig,
        seed: u64,
    ) -> Result<Self, DomainError> {
        let service = RoundFlowService::new(engine);
        let room = service.create_room(CreateRoomRequest {
            title: Some(format!("Simulation {seed}")),
            ..CreateRoomRequest::default()
        })?;
        let wallets = (0..config.players)
            .map(|n| format!("wallet_{n:03}"))
            .collect();
        Ok(Self {
            service,
            room_id: room.id,
            wallets,
            config,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    /// Start, commit, predict, lock, reveal and settle one round.
    pub fn run_round(&mut self) -> Result<RoundOutcome, DomainError> {
        let bpm = self.rng.random_range(80..=160);
        let pattern = self.random_pattern(bpm);
        let active_steps = pattern
            .tracks
            .iter()
            .flat_map(|track| &track.steps)
            .filter(|step| step.active)
            .count();

        let started = self.service.start_round(&self.room_id, bpm)?;
        let round_id = started.round_id.clone();
        let round_index = started.value.index;
        let mut events = started.events;

        let nonce = hex::encode(self.rng.random::<[u8; 16]>());
        let commit_hash = hash_pattern_commit_input(&pattern, &round_id, &nonce, "v1")?;
        events.extend(
            self.service
                .commit_round(
                    &self.room_id,
                    &round_id,
                    CommitPayload {
                        commit_hash,
                        pattern_version: pattern.version,
                    },
                )?
                .events,
        );

        for wallet_index in 0..self.wallets.len() {
            let batch = self.random_batch(wallet_index);
            events.extend(
                self.service
                    .add_predictions_batch(&self.room_id, &round_id, batch)?
                    .events,
            );
        }

        events.extend(self.service.lock_round(&self.room_id, &round_id)?.events);

        let tampered = self.rng.random_bool(self.config.tamper_rate);
        let revealed_pattern = if tampered {
            self.tamper(pattern)
        } else {
            pattern
        };
        events.extend(
            self.service
                .reveal_round(
                    &self.room_id,
                    &round_id,
                    RevealPayload::new(revealed_pattern, nonce),
                )?
                .events,
        );

        let settled = self.service.settle_round(&self.room_id, &round_id)?;
        events.extend(settled.events);

        let attached = self.service.attach_settlement_references(
            &self.room_id,
            &round_id,
            SettlementReferences {
                session_reference: Some(format!("sim-{}-{round_index}", self.room_id)),
                ..SettlementReferences::default()
            },
        )?;
        events.extend(attached.events);

        debug!(round_id = %round_id, tampered, "Simulated round complete");

        Ok(RoundOutcome {
            round_index,
            round_id,
            bpm,
            active_steps,
            tampered,
            settlement: attached.value,
            events,
        })
    }

    fn random_pattern(&mut self, bpm: u16) -> Pattern {
        let mut pattern = create_empty_pattern(bpm);
        for track in TrackId::ALL {
            for step_index in 0..STEPS_PER_PATTERN_V1 {
                if self.rng.random_bool(self.config.density) {
                    let velocity = self.rng.random_range(60..=127);
                    pattern.set_step(track, step_index, StepState::on(velocity));
                }
            }
        }
        pattern
    }

    fn random_batch(&mut self, wallet_index: usize) -> PredictionBatch {
        let amount = self.config.predictions_per_player.min(TILE_COUNT);
        let guesses = sample(&mut self.rng, TILE_COUNT, amount)
            .into_iter()
            .map(|tile| {
                let track = TrackId::ALL[tile / STEPS_PER_PATTERN_V1];
                let step_index = (tile % STEPS_PER_PATTERN_V1) as u8;
                PredictionGuess::new(track, step_index, self.rng.random_bool(0.5))
            })
            .collect();
        PredictionBatch {
            user_wallet: self.wallets[wallet_index].clone(),
            stake_amount_usdc: self
                .rng
                .random_range(self.config.min_stake_usdc..=self.config.max_stake_usdc),
            guesses,
            session_proof: None,
        }
    }

    /// Flip one random step so the reveal no longer matches the commitment.
    fn tamper(&mut self, mut pattern: Pattern) -> Pattern {
        let track = TrackId::ALL[self.rng.random_range(0..TrackId::ALL.len())];
        let step_index = self.rng.random_range(0..STEPS_PER_PATTERN_V1);
        let mut step = pattern.step(track, step_index).copied().unwrap_or_default();
        step.active = !step.active;
        pattern.set_step(track, step_index, step);
        pattern
    }
}
