use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::domain::round_transition::{derive_round_events, RoundEvent};
use crate::errors::domain::DomainError;
use crate::services::round_flow::store::StoreState;
use crate::services::round_flow::RoundFlowService;

/// Result of a round mutation plus the events it produced, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundMutation<T> {
    pub room_id: String,
    pub round_id: String,
    pub value: T,
    pub events: Vec<RoundEvent>,
}

impl<T> RoundMutation<T> {
    pub fn into_value(self) -> T {
        self.value
    }
}

impl RoundFlowService {
    /// Run `mutation` against one existing round under the write lock.
    ///
    /// The closure must validate everything before it writes: on `Err` the
    /// store is expected to be untouched. Edge-triggered events come from
    /// comparing before/after views; explicit events returned by the closure
    /// are appended after them.
    pub(crate) fn run_mutation<T, F>(
        &self,
        room_id: &str,
        round_id: &str,
        mutation: F,
    ) -> Result<RoundMutation<T>, DomainError>
    where
        F: FnOnce(&mut StoreState, &EngineConfig) -> Result<(T, Vec<RoundEvent>), DomainError>,
    {
        let mut state = self.state.write();
        let before = state.round(room_id, round_id)?.lifecycle_view();

        let (value, mut explicit_events) =
            mutation(&mut *state, &self.config).inspect_err(|err| {
                warn!(room_id, round_id, error = %err, "Round mutation rejected");
            })?;

        let after = state.round(room_id, round_id)?.lifecycle_view();
        let mut events = derive_round_events(&before, &after);
        events.append(&mut explicit_events);

        for event in &events {
            debug!(room_id, round_id, event = ?event, "Round event");
        }

        Ok(RoundMutation {
            room_id: room_id.to_string(),
            round_id: round_id.to_string(),
            value,
            events,
        })
    }
}
