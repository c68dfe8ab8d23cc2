//! Per-round metrics and the run summary.

use serde::Serialize;

use crate::simulator::RoundOutcome;

/// One JSONL record.
#[derive(Debug, Serialize)]
pub struct RoundMetrics {
    pub run_seed: u64,
    pub round_index: u32,
    pub round_id: String,
    pub bpm: u16,
    pub active_steps: usize,
    pub tampered: bool,
    pub commit_verified: bool,
    pub total_predictions: u32,
    pub winning_predictions: u32,
    pub total_staked_usdc: u64,
    pub winner_pot_carry_in_usdc: u64,
    pub winner_pot_usdc: u64,
    pub winner_pot_distributed_usdc: u64,
    pub winner_pot_rollover_usdc: u64,
    pub liquidity_rollover_usdc: u64,
    pub artist_payout_usdc: u64,
    pub artist_slashed_usdc: u64,
    pub platform_fee_usdc: u64,
    pub top_wallet: Option<String>,
    pub payouts: usize,
    pub events: Vec<String>,
    pub duration_ms: f64,
}

pub fn build_round_metrics(run_seed: u64, outcome: &RoundOutcome, duration_ms: f64) -> RoundMetrics {
    let settlement = &outcome.settlement;
    let economics = &settlement.economics;
    RoundMetrics {
        run_seed,
        round_index: outcome.round_index,
        round_id: outcome.round_id.clone(),
        bpm: outcome.bpm,
        active_steps: outcome.active_steps,
        tampered: outcome.tampered,
        commit_verified: settlement.commit_verified,
        total_predictions: settlement.total_predictions,
        winning_predictions: settlement.winning_predictions,
        total_staked_usdc: economics.total_staked_usdc,
        winner_pot_carry_in_usdc: economics.winner_pot_carry_in_usdc,
        winner_pot_usdc: economics.winner_pot_usdc,
        winner_pot_distributed_usdc: economics.winner_pot_distributed_usdc,
        winner_pot_rollover_usdc: economics.winner_pot_rollover_usdc,
        liquidity_rollover_usdc: economics.liquidity_rollover_usdc,
        artist_payout_usdc: economics.artist_payout_usdc,
        artist_slashed_usdc: economics.artist_slashed_usdc,
        platform_fee_usdc: economics.platform_fee_usdc,
        top_wallet: settlement
            .leaderboard
            .first()
            .map(|row| row.user_wallet.clone()),
        payouts: settlement.usdc_payouts.len(),
        events: outcome
            .events
            .iter()
            .map(|event| {
                serde_json::to_value(event)
                    .ok()
                    .and_then(|value| value.get("type").and_then(|t| t.as_str()).map(str::to_owned))
                    .unwrap_or_default()
            })
            .collect(),
        duration_ms,
    }
}

/// CSV summary row for quick analysis.
#[derive(Debug, Serialize)]
pub struct CsvSummaryRow {
    pub round_index: u32,
    pub round_id: String,
    pub commit_verified: bool,
    pub total_predictions: u32,
    pub winning_predictions: u32,
    pub total_staked_usdc: u64,
    pub winner_pot_usdc: u64,
    pub winner_pot_distributed_usdc: u64,
    pub winner_pot_rollover_usdc: u64,
    pub artist_payout_usdc: u64,
    pub artist_slashed_usdc: u64,
    pub top_wallet: String,
}

impl From<&RoundMetrics> for CsvSummaryRow {
    fn from(metrics: &RoundMetrics) -> Self {
        CsvSummaryRow {
            round_index: metrics.round_index,
            round_id: metrics.round_id.clone(),
            commit_verified: metrics.commit_verified,
            total_predictions: metrics.total_predictions,
            winning_predictions: metrics.winning_predictions,
            total_staked_usdc: metrics.total_staked_usdc,
            winner_pot_usdc: metrics.winner_pot_usdc,
            winner_pot_distributed_usdc: metrics.winner_pot_distributed_usdc,
            winner_pot_rollover_usdc: metrics.winner_pot_rollover_usdc,
            artist_payout_usdc: metrics.artist_payout_usdc,
            artist_slashed_usdc: metrics.artist_slashed_usdc,
            top_wallet: metrics.top_wallet.clone().unwrap_or_default(),
        }
    }
}

/// Totals across a run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub rounds: u32,
    pub failed_rounds: u32,
    pub unverified_rounds: u32,
    pub total_staked_usdc: u64,
    pub total_distributed_usdc: u64,
    pub total_slashed_usdc: u64,
    pub final_winner_pot_carry_usdc: u64,
    pub final_liquidity_carry_usdc: u64,
}

impl RunSummary {
    pub fn record(&mut self, metrics: &RoundMetrics) {
        self.rounds += 1;
        if !metrics.commit_verified {
            self.unverified_rounds += 1;
        }
        self.total_staked_usdc = self.total_staked_usdc.saturating_add(metrics.total_staked_usdc);
        self.total_distributed_usdc = self
            .total_distributed_usdc
            .saturating_add(metrics.winner_pot_distributed_usdc);
        self.total_slashed_usdc = self
            .total_slashed_usdc
            .saturating_add(metrics.artist_slashed_usdc);
        self.final_winner_pot_carry_usdc = metrics.winner_pot_rollover_usdc;
        self.final_liquidity_carry_usdc = metrics.liquidity_rollover_usdc;
    }
}
