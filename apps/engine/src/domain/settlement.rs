//! Round settlement: evaluation, stake split, pot distribution, leaderboard.
//!
//! Pure and deterministic. The store guarantees it runs at most once per
//! round; nothing here tracks that.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::economics::{split_stake, FeeSchedule, StakeSplit};
use crate::domain::pattern::Pattern;
use crate::domain::prediction::PredictionPayload;
use crate::errors::domain::{DomainError, ValidationKind};

pub const TOKEN_REWARD_UNITS_PER_CORRECT: u64 = 10;
pub const REWARD_REASON_WIN_TOKEN: &str = "round_prediction_win_token";

/// Policy values that shape a settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementPolicy {
    pub fees: FeeSchedule,
    pub reward_units_per_correct: u64,
}

impl Default for SettlementPolicy {
    fn default() -> Self {
        Self {
            fees: FeeSchedule::default(),
            reward_units_per_correct: TOKEN_REWARD_UNITS_PER_CORRECT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub user_wallet: String,
    pub correct_predictions: u32,
    pub reward_units: u64,
    pub staked_usdc: u64,
    pub usdc_won: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardLedgerEntry {
    pub user_wallet: String,
    pub units: u64,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_reference: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutReason {
    PredictionWin,
    Rollover,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsdcPayoutEntry {
    pub user_wallet: String,
    pub amount_usdc: u64,
    pub reason: PayoutReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementEconomics {
    pub total_staked_usdc: u64,
    pub artist_pending_usdc: u64,
    pub artist_payout_usdc: u64,
    pub artist_slashed_usdc: u64,
    pub platform_fee_usdc: u64,
    /// Stake shares plus carry-in.
    pub liquidity_reserve_usdc: u64,
    pub liquidity_reserve_from_stakes_usdc: u64,
    pub liquidity_carry_in_usdc: u64,
    pub liquidity_rollover_usdc: u64,
    pub winner_pot_from_stakes_usdc: u64,
    pub winner_pot_carry_in_usdc: u64,
    /// Stake shares plus carry-in.
    pub winner_pot_usdc: u64,
    pub winner_pot_distributed_usdc: u64,
    pub winner_pot_rollover_usdc: u64,
}

/// External confirmation identifiers attached after settlement.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementReferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settlement_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settled_at_iso: Option<String>,
}

impl SettlementReferences {
    /// Field-wise merge: values present in `patch` win, absent ones keep ours.
    pub fn merge(&mut self, patch: SettlementReferences) {
        if patch.settlement_reference.is_some() {
            self.settlement_reference = patch.settlement_reference;
        }
        if patch.session_reference.is_some() {
            self.session_reference = patch.session_reference;
        }
        if patch.settled_at_iso.is_some() {
            self.settled_at_iso = patch.settled_at_iso;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.settlement_reference.is_none()
            && self.session_reference.is_none()
            && self.settled_at_iso.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementResult {
    pub round_id: String,
    pub commit_verified: bool,
    pub total_predictions: u32,
    pub winning_predictions: u32,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub rewards: Vec<RewardLedgerEntry>,
    pub usdc_payouts: Vec<UsdcPayoutEntry>,
    pub economics: SettlementEconomics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_token_symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrations: Option<SettlementReferences>,
}

/// Everything `settle` needs about a round.
#[derive(Debug, Clone, Copy)]
pub struct SettlementInput<'a> {
    pub round_id: &'a str,
    pub commit_verified: bool,
    pub pattern: &'a Pattern,
    pub predictions: &'a [PredictionPayload],
    pub winner_pot_carry_in_usdc: u64,
    pub liquidity_carry_in_usdc: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluatedPrediction<'a> {
    pub payload: &'a PredictionPayload,
    pub correct: bool,
    pub reward_units: u64,
    pub split: StakeSplit,
}

/// Compare each guess with the revealed grid and split its stake.
pub fn evaluate_predictions<'a>(
    pattern: &Pattern,
    predictions: &'a [PredictionPayload],
    policy: &SettlementPolicy,
) -> Vec<EvaluatedPrediction<'a>> {
    predictions
        .iter()
        .map(|payload| {
            let guess = &payload.guess;
            let actual = pattern.is_active(guess.track_id, guess.step_index as usize);
            let correct = actual == guess.will_be_active;
            EvaluatedPrediction {
                payload,
                correct,
                reward_units: if correct {
                    policy.reward_units_per_correct
                } else {
                    0
                },
                split: split_stake(payload.stake_amount_usdc, &policy.fees),
            }
        })
        .collect()
}

/// Split `winner_pot_usdc` across wallets in proportion to correct stake.
///
/// Wallets are processed in ascending identity order; the last one takes the
/// exact remainder so the distributed total equals the pot.
pub fn distribute_winner_pot(
    correct: &[&EvaluatedPrediction<'_>],
    winner_pot_usdc: u64,
) -> Result<BTreeMap<String, u64>, DomainError> {
    let mut by_wallet_stake: BTreeMap<String, u64> = BTreeMap::new();
    for prediction in correct {
        let entry = by_wallet_stake
            .entry(prediction.payload.user_wallet.clone())
            .or_default();
        *entry = checked_sum(*entry, prediction.payload.stake_amount_usdc)?;
    }

    let total_correct_stake = by_wallet_stake
        .values()
        .try_fold(0u64, |acc, stake| checked_sum(acc, *stake))?;

    let mut payouts = BTreeMap::new();
    if by_wallet_stake.is_empty() || total_correct_stake == 0 || winner_pot_usdc == 0 {
        return Ok(payouts);
    }

    let last_index = by_wallet_stake.len() - 1;
    let mut distributed = 0u64;
    for (index, (wallet, stake)) in by_wallet_stake.into_iter().enumerate() {
        let amount = if index == last_index {
            winner_pot_usdc - distributed
        } else {
            ((winner_pot_usdc as u128 * stake as u128) / total_correct_stake as u128) as u64
        };
        distributed += amount;
        payouts.insert(wallet, amount);
    }

    Ok(payouts)
}

/// Settle a revealed round.
///
/// Fails only when monetary sums would overflow `u64`.
pub fn settle(
    input: SettlementInput<'_>,
    policy: &SettlementPolicy,
) -> Result<SettlementResult, DomainError> {
    let evaluated = evaluate_predictions(input.pattern, input.predictions, policy);

    let mut economics = SettlementEconomics {
        winner_pot_carry_in_usdc: input.winner_pot_carry_in_usdc,
        liquidity_carry_in_usdc: input.liquidity_carry_in_usdc,
        ..SettlementEconomics::default()
    };
    for prediction in &evaluated {
        economics.total_staked_usdc =
            checked_sum(economics.total_staked_usdc, prediction.payload.stake_amount_usdc)?;
        economics.artist_pending_usdc =
            checked_sum(economics.artist_pending_usdc, prediction.split.artist_pending_usdc)?;
        economics.platform_fee_usdc =
            checked_sum(economics.platform_fee_usdc, prediction.split.platform_fee_usdc)?;
        economics.liquidity_reserve_from_stakes_usdc = checked_sum(
            economics.liquidity_reserve_from_stakes_usdc,
            prediction.split.liquidity_reserve_usdc,
        )?;
        economics.winner_pot_from_stakes_usdc = checked_sum(
            economics.winner_pot_from_stakes_usdc,
            prediction.split.winner_pot_usdc,
        )?;
    }
    economics.winner_pot_usdc = checked_sum(
        economics.winner_pot_from_stakes_usdc,
        input.winner_pot_carry_in_usdc,
    )?;
    economics.liquidity_reserve_usdc = checked_sum(
        economics.liquidity_reserve_from_stakes_usdc,
        input.liquidity_carry_in_usdc,
    )?;

    let correct: Vec<&EvaluatedPrediction<'_>> =
        evaluated.iter().filter(|prediction| prediction.correct).collect();

    // Unverified reveals never pay out: the whole pot rolls over.
    let payouts = if input.commit_verified {
        distribute_winner_pot(&correct, economics.winner_pot_usdc)?
    } else {
        BTreeMap::new()
    };

    let mut leaderboard_map: BTreeMap<&str, LeaderboardEntry> = BTreeMap::new();
    let mut rewards = Vec::new();
    for prediction in &evaluated {
        let wallet = prediction.payload.user_wallet.as_str();
        let row = leaderboard_map
            .entry(wallet)
            .or_insert_with(|| LeaderboardEntry {
                user_wallet: wallet.to_string(),
                correct_predictions: 0,
                reward_units: 0,
                staked_usdc: 0,
                usdc_won: 0,
            });
        if prediction.correct {
            row.correct_predictions += 1;
        }
        row.reward_units = checked_sum(row.reward_units, prediction.reward_units)?;
        row.staked_usdc = checked_sum(row.staked_usdc, prediction.payload.stake_amount_usdc)?;

        if prediction.reward_units > 0 && input.commit_verified {
            rewards.push(RewardLedgerEntry {
                user_wallet: wallet.to_string(),
                units: prediction.reward_units,
                reason: REWARD_REASON_WIN_TOKEN.to_string(),
                external_reference: None,
            });
        }
    }
    for (wallet, amount) in &payouts {
        if let Some(row) = leaderboard_map.get_mut(wallet.as_str()) {
            row.usdc_won = *amount;
        }
    }

    let mut leaderboard: Vec<LeaderboardEntry> = leaderboard_map.into_values().collect();
    leaderboard.sort_by(leaderboard_order);

    let usdc_payouts: Vec<UsdcPayoutEntry> = payouts
        .into_iter()
        .map(|(user_wallet, amount_usdc)| UsdcPayoutEntry {
            user_wallet,
            amount_usdc,
            reason: PayoutReason::PredictionWin,
        })
        .collect();

    economics.winner_pot_distributed_usdc = usdc_payouts
        .iter()
        .map(|payout| payout.amount_usdc)
        .sum();
    economics.winner_pot_rollover_usdc =
        economics.winner_pot_usdc - economics.winner_pot_distributed_usdc;
    economics.liquidity_rollover_usdc = economics.liquidity_reserve_usdc;
    if input.commit_verified {
        economics.artist_payout_usdc = economics.artist_pending_usdc;
    } else {
        economics.artist_slashed_usdc = economics.artist_pending_usdc;
    }

    Ok(SettlementResult {
        round_id: input.round_id.to_string(),
        commit_verified: input.commit_verified,
        total_predictions: evaluated.len() as u32,
        winning_predictions: correct.len() as u32,
        leaderboard,
        rewards,
        usdc_payouts,
        economics,
        room_token_symbol: None,
        integrations: None,
    })
}

/// `usdcWon desc, rewardUnits desc, correctPredictions desc, stakedUsdc desc, wallet asc`
pub fn leaderboard_order(left: &LeaderboardEntry, right: &LeaderboardEntry) -> Ordering {
    right
        .usdc_won
        .cmp(&left.usdc_won)
        .then_with(|| right.reward_units.cmp(&left.reward_units))
        .then_with(|| right.correct_predictions.cmp(&left.correct_predictions))
        .then_with(|| right.staked_usdc.cmp(&left.staked_usdc))
        .then_with(|| left.user_wallet.cmp(&right.user_wallet))
}

fn checked_sum(left: u64, right: u64) -> Result<u64, DomainError> {
    left.checked_add(right).ok_or_else(|| {
        DomainError::validation(ValidationKind::Overflow, "settlement amount overflows u64")
    })
}
