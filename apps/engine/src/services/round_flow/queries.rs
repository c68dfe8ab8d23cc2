use crate::domain::prediction::Prediction;
use crate::domain::settlement::SettlementResult;
use crate::errors::domain::{DomainError, NotFoundKind};
use crate::services::round_flow::snapshot::{RoundDetail, RoundSummary};
use crate::services::round_flow::RoundFlowService;

impl RoundFlowService {
    pub fn get_round(&self, room_id: &str, round_id: &str) -> Result<RoundSummary, DomainError> {
        let state = self.state.read();
        let round = state.round(room_id, round_id)?;
        Ok(RoundSummary::from_stored(round, &self.config.policy))
    }

    pub fn round_detail(&self, room_id: &str, round_id: &str) -> Result<RoundDetail, DomainError> {
        let state = self.state.read();
        let round = state.round(room_id, round_id)?;
        Ok(RoundDetail::from_stored(round, &self.config.policy))
    }

    /// Latest round of the room, settled or not. `None` before the first start.
    pub fn current_round(&self, room_id: &str) -> Result<Option<RoundSummary>, DomainError> {
        let state = self.state.read();
        state.room(room_id)?;
        Ok(state
            .current_round(room_id)
            .map(|round| RoundSummary::from_stored(round, &self.config.policy)))
    }

    /// All rounds of a room in index order.
    pub fn list_rounds(&self, room_id: &str) -> Result<Vec<RoundSummary>, DomainError> {
        let state = self.state.read();
        state.room(room_id)?;
        Ok(state
            .round_ids(room_id)
            .iter()
            .filter_map(|round_id| state.rounds.get(round_id))
            .map(|round| RoundSummary::from_stored(round, &self.config.policy))
            .collect())
    }

    pub fn predictions(&self, room_id: &str, round_id: &str) -> Result<Vec<Prediction>, DomainError> {
        let state = self.state.read();
        Ok(state.round(room_id, round_id)?.predictions.clone())
    }

    pub fn get_results(
        &self,
        room_id: &str,
        round_id: &str,
    ) -> Result<SettlementResult, DomainError> {
        let state = self.state.read();
        state
            .round(room_id, round_id)?
            .settlement
            .clone()
            .ok_or_else(|| {
                DomainError::not_found(
                    NotFoundKind::Settlement,
                    format!("Round {round_id} is not settled yet"),
                )
            })
    }
}
