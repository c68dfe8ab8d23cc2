//! Settling rounds through the store: verified, tampered and carry-over.

use beat_engine::domain::pattern::{StepState, TrackId};
use beat_engine::domain::round_transition::RoundEvent;
use beat_engine::domain::settlement::SettlementReferences;
use beat_engine::errors::{ConflictKind, DomainError, NotFoundKind};

use crate::common::{guess, kick_only, open_round, open_round_in, OpenRound};
use beat_engine::RoundFlowService;

fn place_scenario_predictions(service: &RoundFlowService, open: &OpenRound) {
    for payload in [
        guess("wallet-a", TrackId::Kick, 0, true, 1_000_000),
        guess("wallet-a", TrackId::Snare, 0, true, 1_000_000),
        guess("wallet-b", TrackId::Kick, 0, true, 2_000_000),
    ] {
        service
            .add_prediction(&open.room_id, &open.round_id, payload)
            .unwrap();
    }
}

#[test]
fn test_verified_reveal_pays_winners() {
    let service = crate::common::service();
    let open = open_round(&service, &kick_only());
    place_scenario_predictions(&service, &open);
    service.lock_round(&open.room_id, &open.round_id).unwrap();
    service
        .reveal_round(&open.room_id, &open.round_id, open.reveal.clone())
        .unwrap();

    let result = service
        .settle_round(&open.room_id, &open.round_id)
        .unwrap()
        .into_value();
    assert!(result.commit_verified);
    assert_eq!(result.winning_predictions, 2);
    assert_eq!(result.leaderboard[0].user_wallet, "wallet-b");
    assert_eq!(result.usdc_payouts.len(), 2);
    assert_eq!(
        result.economics.winner_pot_distributed_usdc,
        result.economics.winner_pot_usdc
    );

    assert_eq!(
        service.get_results(&open.room_id, &open.round_id).unwrap(),
        result
    );

    // Only the liquidity reserve carries over.
    let room = service.get_room(&open.room_id).unwrap();
    assert_eq!(room.pending_winner_pot_carry_usdc, 0);
    assert_eq!(room.pending_liquidity_carry_usdc, 600_000);
}

#[test]
fn test_tampered_reveal_slashes_artist_and_carries_pot() {
    let service = crate::common::service();
    let open = open_round(&service, &kick_only());
    place_scenario_predictions(&service, &open);
    service.lock_round(&open.room_id, &open.round_id).unwrap();

    let mut tampered = open.reveal.clone();
    tampered
        .pattern
        .set_step(TrackId::Snare, 0, StepState::on(100));
    let revealed = service
        .reveal_round(&open.room_id, &open.round_id, tampered)
        .unwrap();
    assert!(!revealed.value.commit_verified);
    assert_eq!(
        revealed.events,
        vec![RoundEvent::RoundRevealed {
            commit_verified: false
        }]
    );

    let result = service
        .settle_round(&open.room_id, &open.round_id)
        .unwrap()
        .into_value();
    assert!(!result.commit_verified);
    assert!(result.usdc_payouts.is_empty());
    assert_eq!(
        result.economics.artist_slashed_usdc,
        result.economics.artist_pending_usdc
    );
    assert_eq!(
        result.economics.winner_pot_rollover_usdc,
        result.economics.winner_pot_usdc
    );

    // The rolled pot seeds the next round.
    let room = service.get_room(&open.room_id).unwrap();
    assert_eq!(
        room.pending_winner_pot_carry_usdc,
        result.economics.winner_pot_rollover_usdc
    );

    let next = open_round_in(&service, &open.room_id, &kick_only());
    let summary = service.get_round(&next.room_id, &next.round_id).unwrap();
    assert_eq!(
        summary.winner_pot_carry_in_usdc,
        result.economics.winner_pot_rollover_usdc
    );
    assert_eq!(summary.winner_pot_usdc, summary.winner_pot_carry_in_usdc);
    assert_eq!(
        summary.liquidity_carry_in_usdc,
        result.economics.liquidity_rollover_usdc
    );

    let room = service.get_room(&open.room_id).unwrap();
    assert_eq!(room.pending_winner_pot_carry_usdc, 0);
    assert_eq!(room.pending_liquidity_carry_usdc, 0);
}

#[test]
fn test_settle_twice_is_a_conflict() {
    let service = crate::common::service();
    let open = open_round(&service, &kick_only());
    service.lock_round(&open.room_id, &open.round_id).unwrap();
    service
        .reveal_round(&open.room_id, &open.round_id, open.reveal.clone())
        .unwrap();
    service.settle_round(&open.room_id, &open.round_id).unwrap();

    let err = service
        .settle_round(&open.room_id, &open.round_id)
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Conflict(ConflictKind::AlreadySettled, _)
    ));
}

#[test]
fn test_results_unavailable_before_settlement() {
    let service = crate::common::service();
    let open = open_round(&service, &kick_only());
    let err = service
        .get_results(&open.room_id, &open.round_id)
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::NotFound(NotFoundKind::Settlement, _)
    ));

    let err = service
        .attach_settlement_references(
            &open.room_id,
            &open.round_id,
            SettlementReferences {
                settlement_reference: Some("tx".into()),
                ..SettlementReferences::default()
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::NotFound(NotFoundKind::Settlement, _)
    ));
}

#[test]
fn test_references_attach_after_settlement_without_touching_economics() {
    let service = crate::common::service();
    let open = open_round(&service, &kick_only());
    place_scenario_predictions(&service, &open);
    service.lock_round(&open.room_id, &open.round_id).unwrap();
    service
        .reveal_round(&open.room_id, &open.round_id, open.reveal.clone())
        .unwrap();
    let settled = service
        .settle_round(&open.room_id, &open.round_id)
        .unwrap()
        .into_value();

    let first = service
        .attach_settlement_references(
            &open.room_id,
            &open.round_id,
            SettlementReferences {
                settlement_reference: Some("sig-1".into()),
                ..SettlementReferences::default()
            },
        )
        .unwrap();
    assert_eq!(first.events, vec![RoundEvent::SettlementReferencesAttached]);

    let second = service
        .attach_settlement_references(
            &open.room_id,
            &open.round_id,
            SettlementReferences {
                session_reference: Some("session-7".into()),
                ..SettlementReferences::default()
            },
        )
        .unwrap()
        .into_value();

    let references = second.integrations.clone().unwrap();
    assert_eq!(references.settlement_reference.as_deref(), Some("sig-1"));
    assert_eq!(references.session_reference.as_deref(), Some("session-7"));
    assert_eq!(second.economics, settled.economics);
    assert_eq!(second.leaderboard, settled.leaderboard);

    let empty = service
        .attach_settlement_references(
            &open.room_id,
            &open.round_id,
            SettlementReferences::default(),
        )
        .unwrap();
    assert!(empty.events.is_empty());
}
