//! Round flow service: the in-memory authority over rooms and rounds.
//!
//! Every mutation runs under one write lock, validates before touching
//! state, and reports the lifecycle events it caused. Reads take the read
//! lock and return owned views.

mod mutation;
mod player_actions;
mod queries;
pub mod requests;
mod rooms;
mod round_lifecycle;
pub mod snapshot;
mod store;

use parking_lot::RwLock;

use crate::config::EngineConfig;

pub use mutation::RoundMutation;
pub use requests::{CommitPayload, CreateRoomRequest, RevealPayload, RoomMetadataPatch};
pub use snapshot::{BatchReceipt, PredictionReceipt, RoomView, RoundDetail, RoundSummary};
pub use store::RevealRecord;

use store::StoreState;

pub struct RoundFlowService {
    config: EngineConfig,
    state: RwLock<StoreState>,
}

impl RoundFlowService {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            state: RwLock::new(StoreState::default()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl Default for RoundFlowService {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
