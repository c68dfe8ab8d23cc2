//! Integer basis-point stake splitting.

use serde::{Deserialize, Serialize};

use crate::errors::domain::{DomainError, ValidationKind};

pub const BPS_DENOMINATOR: u16 = 10_000;

pub const ARTIST_PENDING_BPS: u16 = 5_000;
pub const PLATFORM_FEE_BPS: u16 = 500;
pub const LIQUIDITY_RESERVE_BPS: u16 = 1_500;

/// Explicit basis-point shares; the winner pot takes whatever is left.
///
/// Fields are private so every schedule in circulation sums to at most
/// [`BPS_DENOMINATOR`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawFeeSchedule")]
pub struct FeeSchedule {
    artist_pending_bps: u16,
    platform_fee_bps: u16,
    liquidity_reserve_bps: u16,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFeeSchedule {
    artist_pending_bps: u16,
    platform_fee_bps: u16,
    liquidity_reserve_bps: u16,
}

impl TryFrom<RawFeeSchedule> for FeeSchedule {
    type Error = DomainError;

    fn try_from(raw: RawFeeSchedule) -> Result<Self, Self::Error> {
        FeeSchedule::new(
            raw.artist_pending_bps,
            raw.platform_fee_bps,
            raw.liquidity_reserve_bps,
        )
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            artist_pending_bps: ARTIST_PENDING_BPS,
            platform_fee_bps: PLATFORM_FEE_BPS,
            liquidity_reserve_bps: LIQUIDITY_RESERVE_BPS,
        }
    }
}

impl FeeSchedule {
    pub fn new(
        artist_pending_bps: u16,
        platform_fee_bps: u16,
        liquidity_reserve_bps: u16,
    ) -> Result<Self, DomainError> {
        let explicit =
            artist_pending_bps as u32 + platform_fee_bps as u32 + liquidity_reserve_bps as u32;
        if explicit > BPS_DENOMINATOR as u32 {
            return Err(DomainError::validation(
                ValidationKind::FeeSplit,
                format!("fee split uses {explicit} bps, at most {BPS_DENOMINATOR} allowed"),
            ));
        }
        Ok(Self {
            artist_pending_bps,
            platform_fee_bps,
            liquidity_reserve_bps,
        })
    }

    pub fn artist_pending_bps(&self) -> u16 {
        self.artist_pending_bps
    }

    pub fn platform_fee_bps(&self) -> u16 {
        self.platform_fee_bps
    }

    pub fn liquidity_reserve_bps(&self) -> u16 {
        self.liquidity_reserve_bps
    }

    /// Nominal winner-pot share. Informational only: the actual pot share of
    /// a stake is the remainder after flooring the other three buckets.
    pub fn winner_pot_bps(&self) -> u16 {
        BPS_DENOMINATOR - self.artist_pending_bps - self.platform_fee_bps - self.liquidity_reserve_bps
    }
}

/// The four buckets one stake is split into. Always sums to the stake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeSplit {
    pub artist_pending_usdc: u64,
    pub platform_fee_usdc: u64,
    pub liquidity_reserve_usdc: u64,
    pub winner_pot_usdc: u64,
}

impl StakeSplit {
    pub fn total(&self) -> u64 {
        self.artist_pending_usdc
            + self.platform_fee_usdc
            + self.liquidity_reserve_usdc
            + self.winner_pot_usdc
    }
}

/// `floor(amount * bps / 10000)`, computed without intermediate overflow.
pub fn bps_share(amount: u64, bps: u16) -> u64 {
    // bps <= 10000, so the quotient never exceeds `amount`.
    ((amount as u128 * bps as u128) / BPS_DENOMINATOR as u128) as u64
}

/// Split one stake; the winner pot is the remainder so nothing leaks to flooring.
pub fn split_stake(stake_amount_usdc: u64, schedule: &FeeSchedule) -> StakeSplit {
    let artist_pending_usdc = bps_share(stake_amount_usdc, schedule.artist_pending_bps);
    let platform_fee_usdc = bps_share(stake_amount_usdc, schedule.platform_fee_bps);
    let liquidity_reserve_usdc = bps_share(stake_amount_usdc, schedule.liquidity_reserve_bps);
    let winner_pot_usdc =
        stake_amount_usdc - artist_pending_usdc - platform_fee_usdc - liquidity_reserve_usdc;

    StakeSplit {
        artist_pending_usdc,
        platform_fee_usdc,
        liquidity_reserve_usdc,
        winner_pot_usdc,
    }
}
