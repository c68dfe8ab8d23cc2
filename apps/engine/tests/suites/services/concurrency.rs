//! Racing callers against one store.

use std::sync::Arc;
use std::thread;

use beat_engine::domain::pattern::TrackId;
use beat_engine::errors::{ConflictKind, DomainError};

use crate::common::{guess, kick_only, open_round, service};

#[test]
fn test_racing_duplicates_first_writer_wins() {
    let service = Arc::new(service());
    let open = open_round(&service, &kick_only());

    let handles: Vec<_> = (0..8)
        .map(|attempt| {
            let service = Arc::clone(&service);
            let room_id = open.room_id.clone();
            let round_id = open.round_id.clone();
            thread::spawn(move || {
                service.add_prediction(
                    &room_id,
                    &round_id,
                    guess("wallet-racer", TrackId::HatClosed, 5, attempt % 2 == 0, 100),
                )
            })
        })
        .collect();

    let outcomes: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();
    let accepted = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    assert_eq!(accepted, 1);
    assert!(outcomes.iter().filter_map(|o| o.as_ref().err()).all(|err| matches!(
        err,
        DomainError::Conflict(ConflictKind::DuplicatePrediction, _)
    )));
    assert_eq!(
        service
            .predictions(&open.room_id, &open.round_id)
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn test_parallel_wallets_all_land() {
    let service = Arc::new(service());
    let open = open_round(&service, &kick_only());

    let handles: Vec<_> = (0..16)
        .map(|n| {
            let service = Arc::clone(&service);
            let room_id = open.room_id.clone();
            let round_id = open.round_id.clone();
            thread::spawn(move || {
                service
                    .add_prediction(
                        &room_id,
                        &round_id,
                        guess(&format!("wallet-{n}"), TrackId::Kick, 0, true, 1_000),
                    )
                    .map(|mutation| mutation.value.prediction_count)
            })
        })
        .collect();

    let mut counts: Vec<usize> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap().unwrap())
        .collect();
    counts.sort_unstable();
    assert_eq!(counts, (1..=16).collect::<Vec<_>>());

    let summary = service.get_round(&open.room_id, &open.round_id).unwrap();
    assert_eq!(summary.total_staked_usdc, 16_000);
}

#[test]
fn test_racing_settles_settle_once() {
    let service = Arc::new(service());
    let open = open_round(&service, &kick_only());
    service.lock_round(&open.room_id, &open.round_id).unwrap();
    service
        .reveal_round(&open.room_id, &open.round_id, open.reveal.clone())
        .unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let service = Arc::clone(&service);
            let room_id = open.room_id.clone();
            let round_id = open.round_id.clone();
            thread::spawn(move || service.settle_round(&room_id, &round_id).is_ok())
        })
        .collect();
    let settled = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .filter(|ok| *ok)
        .count();
    assert_eq!(settled, 1);
}
