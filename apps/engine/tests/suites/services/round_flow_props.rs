//! Property tests driving whole rounds through the store.

use proptest::prelude::*;

use beat_engine::domain::pattern::{Pattern, StepState, TrackId, TrackPattern};
use beat_engine::domain::prediction::{PredictionGuess, PredictionPayload};

use crate::common::open_round;
use crate::common::proptest_prelude::proptest_prelude_config;

fn pattern() -> impl Strategy<Value = Pattern> {
    (
        40u16..=240,
        prop::collection::vec(prop::collection::vec(any::<bool>(), 16), 5),
    )
        .prop_map(|(bpm, grid)| Pattern {
            version: 1,
            length: 16,
            bpm,
            tracks: TrackId::ALL
                .into_iter()
                .zip(grid)
                .map(|(id, row)| TrackPattern {
                    id,
                    steps: row
                        .into_iter()
                        .map(|active| StepState {
                            active,
                            velocity: 100,
                        })
                        .collect(),
                })
                .collect(),
        })
}

/// Distinct (wallet, tile) slots so every prediction is accepted.
fn predictions() -> impl Strategy<Value = Vec<PredictionPayload>> {
    prop::collection::btree_map(
        (0..4usize, 0..5usize, 0..16u8),
        (any::<bool>(), 1..=2_000_000u64),
        0..20,
    )
    .prop_map(|slots| {
        slots
            .into_iter()
            .map(|((wallet, track, step), (active, stake))| {
                PredictionPayload::new(
                    format!("wallet-{wallet}"),
                    stake,
                    PredictionGuess::new(TrackId::ALL[track], step, active),
                )
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(proptest_prelude_config())]

    /// Property: an honest round verifies and closes its books; the room
    /// carries exactly the settlement's rollovers.
    #[test]
    fn prop_honest_round_settles_cleanly(
        pattern in pattern(),
        predictions in predictions(),
    ) {
        let service = crate::common::service();
        let open = open_round(&service, &pattern);
        for payload in predictions.clone() {
            service.add_prediction(&open.room_id, &open.round_id, payload).unwrap();
        }
        service.lock_round(&open.room_id, &open.round_id).unwrap();
        let reveal = service
            .reveal_round(&open.room_id, &open.round_id, open.reveal.clone())
            .unwrap()
            .into_value();
        prop_assert!(reveal.commit_verified);

        let result = service.settle_round(&open.room_id, &open.round_id).unwrap().into_value();
        prop_assert_eq!(result.total_predictions as usize, predictions.len());
        prop_assert_eq!(
            result.economics.winner_pot_distributed_usdc + result.economics.winner_pot_rollover_usdc,
            result.economics.winner_pot_usdc
        );

        let room = service.get_room(&open.room_id).unwrap();
        prop_assert_eq!(room.pending_winner_pot_carry_usdc, result.economics.winner_pot_rollover_usdc);
        prop_assert_eq!(room.pending_liquidity_carry_usdc, result.economics.liquidity_rollover_usdc);
    }
}
