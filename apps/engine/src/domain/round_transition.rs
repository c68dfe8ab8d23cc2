use serde::{Deserialize, Serialize};

use crate::domain::phase::RoundPhase;

/// The slice of a round that lifecycle events are derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundLifecycleView {
    pub phase: RoundPhase,
    pub prediction_count: usize,
    pub commit_verified: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoundEvent {
    /// Explicit: a new round was allocated.
    RoundStarted,

    /// Edge-triggered: AwaitingCommit -> PredictionOpen
    CommitReceived,

    /// Edge-triggered: prediction count grew.
    PredictionAccepted { prediction_count: usize },

    /// Edge-triggered: PredictionOpen -> Locked
    RoundLocked,

    /// Edge-triggered: Locked -> Revealed
    RoundRevealed { commit_verified: bool },

    /// Edge-triggered: Revealed -> Settled
    RoundSettled,

    /// Edge-triggered: a leaderboard exists for the first time.
    LeaderboardUpdated,

    /// Explicit: external references merged into the settlement.
    SettlementReferencesAttached,
}

/// Derive lifecycle events from before/after views of one round.
pub fn derive_round_events(
    before: &RoundLifecycleView,
    after: &RoundLifecycleView,
) -> Vec<RoundEvent> {
    let mut events = Vec::new();

    // 1. Predictions
    if after.prediction_count > before.prediction_count {
        events.push(RoundEvent::PredictionAccepted {
            prediction_count: after.prediction_count,
        });
    }

    // 2. Phase edges
    if before.phase != after.phase {
        match after.phase {
            RoundPhase::PredictionOpen => events.push(RoundEvent::CommitReceived),
            RoundPhase::Locked => events.push(RoundEvent::RoundLocked),
            RoundPhase::Revealed => events.push(RoundEvent::RoundRevealed {
                commit_verified: after.commit_verified.unwrap_or(false),
            }),
            RoundPhase::Settled => {
                events.push(RoundEvent::RoundSettled);
                events.push(RoundEvent::LeaderboardUpdated);
            }
            RoundPhase::AwaitingCommit => {}
        }
    }

    events
}
