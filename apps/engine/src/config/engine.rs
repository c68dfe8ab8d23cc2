//! Engine configuration loaded from environment variables.
//!
//! Every variable is optional; unset variables fall back to the defaults
//! below. A variable that is set but does not parse is a configuration
//! error rather than a silent default.

use std::env;
use std::str::FromStr;

use crate::domain::economics::{
    FeeSchedule, ARTIST_PENDING_BPS, LIQUIDITY_RESERVE_BPS, PLATFORM_FEE_BPS,
};
use crate::domain::pattern::{MAX_PATTERN_BPM, MIN_PATTERN_BPM};
use crate::domain::settlement::{SettlementPolicy, TOKEN_REWARD_UNITS_PER_CORRECT};
use crate::error::AppError;

pub const DEFAULT_MAX_BATCH_GUESSES: usize = 64;
pub const DEFAULT_MIN_COMMIT_HASH_LEN: usize = 32;

/// Economics knobs: basis points per bucket and reward units per hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EconomicsConfig {
    pub artist_pending_bps: u16,
    pub platform_fee_bps: u16,
    pub liquidity_reserve_bps: u16,
    pub reward_units_per_correct: u64,
}

impl Default for EconomicsConfig {
    fn default() -> Self {
        Self {
            artist_pending_bps: ARTIST_PENDING_BPS,
            platform_fee_bps: PLATFORM_FEE_BPS,
            liquidity_reserve_bps: LIQUIDITY_RESERVE_BPS,
            reward_units_per_correct: TOKEN_REWARD_UNITS_PER_CORRECT,
        }
    }
}

impl EconomicsConfig {
    /// Validated settlement policy. Fails if the explicit shares exceed 100%.
    pub fn policy(&self) -> Result<SettlementPolicy, AppError> {
        let fees = FeeSchedule::new(
            self.artist_pending_bps,
            self.platform_fee_bps,
            self.liquidity_reserve_bps,
        )
        .map_err(|err| AppError::config(err.to_string()))?;
        Ok(SettlementPolicy {
            fees,
            reward_units_per_correct: self.reward_units_per_correct,
        })
    }
}

/// Runtime limits and policy for the round store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub policy: SettlementPolicy,
    pub min_bpm: u16,
    pub max_bpm: u16,
    pub max_batch_guesses: usize,
    pub min_commit_hash_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            policy: SettlementPolicy::default(),
            min_bpm: MIN_PATTERN_BPM,
            max_bpm: MAX_PATTERN_BPM,
            max_batch_guesses: DEFAULT_MAX_BATCH_GUESSES,
            min_commit_hash_len: DEFAULT_MIN_COMMIT_HASH_LEN,
        }
    }
}

impl EngineConfig {
    /// Build from `ARTIST_PENDING_BPS`, `PLATFORM_FEE_BPS`,
    /// `LIQUIDITY_RESERVE_BPS`, `REWARD_UNITS_PER_CORRECT`, `MIN_BPM`,
    /// `MAX_BPM` and `MAX_BATCH_GUESSES`.
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = EconomicsConfig::default();
        let economics = EconomicsConfig {
            artist_pending_bps: var_or("ARTIST_PENDING_BPS", defaults.artist_pending_bps)?,
            platform_fee_bps: var_or("PLATFORM_FEE_BPS", defaults.platform_fee_bps)?,
            liquidity_reserve_bps: var_or(
                "LIQUIDITY_RESERVE_BPS",
                defaults.liquidity_reserve_bps,
            )?,
            reward_units_per_correct: var_or(
                "REWARD_UNITS_PER_CORRECT",
                defaults.reward_units_per_correct,
            )?,
        };

        let config = Self {
            policy: economics.policy()?,
            min_bpm: var_or("MIN_BPM", MIN_PATTERN_BPM)?,
            max_bpm: var_or("MAX_BPM", MAX_PATTERN_BPM)?,
            max_batch_guesses: var_or("MAX_BATCH_GUESSES", DEFAULT_MAX_BATCH_GUESSES)?,
            min_commit_hash_len: DEFAULT_MIN_COMMIT_HASH_LEN,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.min_bpm > self.max_bpm {
            return Err(AppError::config(format!(
                "MIN_BPM ({}) must not exceed MAX_BPM ({})",
                self.min_bpm, self.max_bpm
            )));
        }
        if self.min_bpm < MIN_PATTERN_BPM || self.max_bpm > MAX_PATTERN_BPM {
            return Err(AppError::config(format!(
                "bpm range must stay within {MIN_PATTERN_BPM}..={MAX_PATTERN_BPM}"
            )));
        }
        if self.max_batch_guesses == 0 {
            return Err(AppError::config("MAX_BATCH_GUESSES must be at least 1"));
        }
        Ok(())
    }
}

/// Parse an optional environment variable, defaulting when unset.
fn var_or<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| {
            AppError::config(format!(
                "Environment variable '{name}' has invalid value '{raw}'"
            ))
        }),
        Err(_) => Ok(default),
    }
}
