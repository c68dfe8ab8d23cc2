//! Prediction intake: validation, duplicates and batches.

use beat_engine::domain::pattern::TrackId;
use beat_engine::domain::prediction::{PredictionBatch, PredictionGuess};
use beat_engine::domain::round_transition::RoundEvent;
use beat_engine::errors::{ConflictKind, DomainError, ValidationKind};
use engine_test_support::unique_helpers::unique_wallet;

use crate::common::{guess, kick_only, open_round, service};

fn batch(wallet: &str, stake: u64, guesses: Vec<PredictionGuess>) -> PredictionBatch {
    PredictionBatch {
        user_wallet: wallet.to_string(),
        stake_amount_usdc: stake,
        guesses,
        session_proof: None,
    }
}

#[test]
fn test_accepted_prediction_updates_aggregates() {
    let service = service();
    let open = open_round(&service, &kick_only());
    let wallet = unique_wallet("alice");

    let first = service
        .add_prediction(
            &open.room_id,
            &open.round_id,
            guess(&wallet, TrackId::Kick, 0, true, 1_000_000),
        )
        .unwrap();
    assert_eq!(
        first.events,
        vec![RoundEvent::PredictionAccepted {
            prediction_count: 1
        }]
    );
    assert_eq!(first.value.prediction_count, 1);
    assert_eq!(first.value.total_staked_usdc, 1_000_000);
    assert!(first.value.prediction.id.starts_with("pred_"));

    let second = service
        .add_prediction(
            &open.room_id,
            &open.round_id,
            guess(&wallet, TrackId::Snare, 4, false, 500_000),
        )
        .unwrap()
        .into_value();
    assert_eq!(second.prediction_count, 2);
    assert_eq!(second.total_staked_usdc, 1_500_000);
    assert_eq!(second.round.artist_pending_usdc, 750_000);
    assert_eq!(second.round.winner_pot_usdc, 450_000);
}

#[test]
fn test_duplicate_slot_rejected_for_same_wallet_only() {
    let service = service();
    let open = open_round(&service, &kick_only());
    let alice = unique_wallet("alice");
    let bob = unique_wallet("bob");

    service
        .add_prediction(
            &open.room_id,
            &open.round_id,
            guess(&alice, TrackId::Kick, 0, true, 10),
        )
        .unwrap();

    // The opposite guess on the same tile is still a duplicate.
    let err = service
        .add_prediction(
            &open.room_id,
            &open.round_id,
            guess(&alice, TrackId::Kick, 0, false, 10),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Conflict(ConflictKind::DuplicatePrediction, _)
    ));

    service
        .add_prediction(
            &open.room_id,
            &open.round_id,
            guess(&bob, TrackId::Kick, 0, true, 10),
        )
        .unwrap();
    assert_eq!(
        service
            .predictions(&open.room_id, &open.round_id)
            .unwrap()
            .len(),
        2
    );
}

#[test]
fn test_invalid_predictions_rejected() {
    let service = service();
    let open = open_round(&service, &kick_only());

    let err = service
        .add_prediction(
            &open.room_id,
            &open.round_id,
            guess("wallet-a", TrackId::Kick, 0, true, 0),
        )
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::Stake, _)));

    let err = service
        .add_prediction(
            &open.room_id,
            &open.round_id,
            guess("wallet-a", TrackId::Kick, 16, true, 10),
        )
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::Guess, _)));

    let err = service
        .add_prediction(
            &open.room_id,
            &open.round_id,
            guess("   ", TrackId::Kick, 1, true, 10),
        )
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::Wallet, _)));

    assert!(service
        .predictions(&open.room_id, &open.round_id)
        .unwrap()
        .is_empty());
}

#[test]
fn test_batch_accepted_at_shared_stake() {
    let service = service();
    let open = open_round(&service, &kick_only());
    let wallet = unique_wallet("carol");

    let receipt = service
        .add_predictions_batch(
            &open.room_id,
            &open.round_id,
            batch(
                &wallet,
                250_000,
                vec![
                    PredictionGuess::new(TrackId::Kick, 0, true),
                    PredictionGuess::new(TrackId::Kick, 1, false),
                    PredictionGuess::new(TrackId::Clap, 7, true),
                ],
            ),
        )
        .unwrap();
    assert_eq!(
        receipt.events,
        vec![RoundEvent::PredictionAccepted {
            prediction_count: 3
        }]
    );
    let receipt = receipt.into_value();
    assert_eq!(receipt.accepted_count, 3);
    assert_eq!(receipt.prediction_count, 3);
    assert_eq!(receipt.total_staked_usdc, 750_000);
    assert!(receipt
        .predictions
        .iter()
        .all(|prediction| prediction.payload.stake_amount_usdc == 250_000
            && prediction.payload.user_wallet == wallet));
}

#[test]
fn test_batch_is_all_or_nothing() {
    let service = service();
    let open = open_round(&service, &kick_only());
    let wallet = unique_wallet("dave");

    service
        .add_prediction(
            &open.room_id,
            &open.round_id,
            guess(&wallet, TrackId::Snare, 2, true, 10),
        )
        .unwrap();

    // Duplicate against stored prediction
    let err = service
        .add_predictions_batch(
            &open.room_id,
            &open.round_id,
            batch(
                &wallet,
                10,
                vec![
                    PredictionGuess::new(TrackId::Kick, 0, true),
                    PredictionGuess::new(TrackId::Snare, 2, false),
                ],
            ),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Conflict(ConflictKind::DuplicatePrediction, _)
    ));

    // Duplicate inside the batch
    let err = service
        .add_predictions_batch(
            &open.room_id,
            &open.round_id,
            batch(
                &wallet,
                10,
                vec![
                    PredictionGuess::new(TrackId::HatOpen, 3, true),
                    PredictionGuess::new(TrackId::HatOpen, 3, true),
                ],
            ),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Conflict(ConflictKind::DuplicatePrediction, _)
    ));

    // One bad guess spoils the lot
    let err = service
        .add_predictions_batch(
            &open.room_id,
            &open.round_id,
            batch(
                &wallet,
                10,
                vec![
                    PredictionGuess::new(TrackId::Clap, 0, true),
                    PredictionGuess::new(TrackId::Clap, 20, true),
                ],
            ),
        )
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::Guess, _)));

    let stored = service.predictions(&open.room_id, &open.round_id).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(
        service
            .get_round(&open.room_id, &open.round_id)
            .unwrap()
            .total_staked_usdc,
        10
    );
}

#[test]
fn test_batch_size_limits() {
    let service = service();
    let open = open_round(&service, &kick_only());

    let err = service
        .add_predictions_batch(&open.room_id, &open.round_id, batch("w", 10, Vec::new()))
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::EmptyBatch, _)
    ));

    let too_many: Vec<PredictionGuess> = TrackId::ALL
        .into_iter()
        .flat_map(|track| (0..16u8).map(move |step| PredictionGuess::new(track, step, true)))
        .take(service.config().max_batch_guesses + 1)
        .collect();
    assert_eq!(too_many.len(), 65);
    let err = service
        .add_predictions_batch(&open.room_id, &open.round_id, batch("w", 10, too_many))
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::Other(_), _)));
}

#[test]
fn test_stake_overflow_rejected_without_mutation() {
    let service = service();
    let open = open_round(&service, &kick_only());

    service
        .add_prediction(
            &open.room_id,
            &open.round_id,
            guess("wallet-a", TrackId::Kick, 0, true, u64::MAX),
        )
        .unwrap();
    let err = service
        .add_prediction(
            &open.room_id,
            &open.round_id,
            guess("wallet-b", TrackId::Kick, 0, true, 1),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::Overflow, _)
    ));
    assert_eq!(
        service
            .predictions(&open.room_id, &open.round_id)
            .unwrap()
            .len(),
        1
    );
}
