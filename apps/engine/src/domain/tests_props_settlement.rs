//! Property tests for settlement economics (pure domain).
//!
//! Invariants:
//! - every stake splits into four buckets that sum back to the stake
//! - a verified round with a correct prediction distributes the whole pot
//! - distributed + rollover always equals the pot
//! - an unverified round pays nobody and slashes the artist
//! - the leaderboard is totally ordered

use proptest::prelude::*;

use crate::domain::economics::{split_stake, FeeSchedule};
use crate::domain::settlement::{leaderboard_order, settle, SettlementInput, SettlementPolicy};
use crate::domain::test_gens;
use crate::domain::test_prelude;

proptest! {
    #![proptest_config(test_prelude::proptest_config())]

    /// Property: buckets sum to the stake for any valid fee schedule.
    #[test]
    fn prop_split_conserves_stake(
        stake in any::<u64>(),
        (artist, fee, liquidity) in (0u16..=10_000)
            .prop_flat_map(|artist| (Just(artist), 0u16..=(10_000 - artist)))
            .prop_flat_map(|(artist, fee)| (Just(artist), Just(fee), 0u16..=(10_000 - artist - fee))),
    ) {
        let schedule = FeeSchedule::new(artist, fee, liquidity).unwrap();
        let split = split_stake(stake, &schedule);
        prop_assert_eq!(split.total(), stake);
    }

    /// Property: pot accounting closes exactly.
    #[test]
    fn prop_pot_accounting_closes(
        pattern in test_gens::full_pattern(),
        predictions in test_gens::predictions(24),
        commit_verified in any::<bool>(),
        winner_carry in 0u64..=10_000_000,
        liquidity_carry in 0u64..=10_000_000,
    ) {
        let result = settle(
            SettlementInput {
                round_id: "round_prop",
                commit_verified,
                pattern: &pattern,
                predictions: &predictions,
                winner_pot_carry_in_usdc: winner_carry,
                liquidity_carry_in_usdc: liquidity_carry,
            },
            &SettlementPolicy::default(),
        ).unwrap();
        let economics = result.economics;

        prop_assert_eq!(
            economics.winner_pot_distributed_usdc + economics.winner_pot_rollover_usdc,
            economics.winner_pot_usdc
        );
        prop_assert_eq!(
            economics.artist_pending_usdc
                + economics.platform_fee_usdc
                + economics.liquidity_reserve_from_stakes_usdc
                + economics.winner_pot_from_stakes_usdc,
            economics.total_staked_usdc
        );
        prop_assert_eq!(economics.liquidity_rollover_usdc, economics.liquidity_reserve_usdc);
        prop_assert_eq!(
            economics.artist_payout_usdc + economics.artist_slashed_usdc,
            economics.artist_pending_usdc
        );

        let payout_sum: u64 = result.usdc_payouts.iter().map(|payout| payout.amount_usdc).sum();
        prop_assert_eq!(payout_sum, economics.winner_pot_distributed_usdc);

        if commit_verified {
            prop_assert_eq!(economics.artist_slashed_usdc, 0);
            if result.winning_predictions > 0 {
                prop_assert_eq!(economics.winner_pot_rollover_usdc, 0);
            }
        } else {
            prop_assert!(result.usdc_payouts.is_empty());
            prop_assert!(result.rewards.is_empty());
            prop_assert_eq!(economics.artist_payout_usdc, 0);
        }
    }

    /// Property: leaderboard rows are unique per wallet and sorted.
    #[test]
    fn prop_leaderboard_sorted(
        pattern in test_gens::full_pattern(),
        predictions in test_gens::predictions(24),
    ) {
        let result = settle(
            SettlementInput {
                round_id: "round_prop",
                commit_verified: true,
                pattern: &pattern,
                predictions: &predictions,
                winner_pot_carry_in_usdc: 0,
                liquidity_carry_in_usdc: 0,
            },
            &SettlementPolicy::default(),
        ).unwrap();

        for pair in result.leaderboard.windows(2) {
            prop_assert_eq!(leaderboard_order(&pair[0], &pair[1]), std::cmp::Ordering::Less);
        }
        let staked: u64 = result.leaderboard.iter().map(|row| row.staked_usdc).sum();
        prop_assert_eq!(staked, result.economics.total_staked_usdc);
        prop_assert_eq!(result.total_predictions as usize, predictions.len());
    }
}
