//! Domain layer: pure pattern, round and settlement logic.

pub mod economics;
pub mod pattern;
pub mod pattern_codec;
pub mod phase;
pub mod prediction;
pub mod round_transition;
pub mod settlement;

#[cfg(test)]
mod tests_props_settlement;

pub use economics::{split_stake, FeeSchedule, StakeSplit};
pub use pattern::{Pattern, StepState, TrackId, TrackPattern};
pub use phase::{RoundOperation, RoundPhase};
pub use prediction::{Prediction, PredictionBatch, PredictionGuess, PredictionPayload};
pub use round_transition::RoundEvent;
pub use settlement::{
    settle, LeaderboardEntry, SettlementInput, SettlementPolicy, SettlementReferences,
    SettlementResult,
};
