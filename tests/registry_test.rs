//! Tests for the shared game registry.

use std::sync::{Arc, Barrier};
use std::thread;
use strictly_lobby::{
    GameId, GameRegistry, RegistryError, SessionStatus, Slot, seat_channel,
};

#[test]
fn test_ids_increase_and_are_never_reused() {
    let registry = GameRegistry::new();
    let first = registry.create_game().unwrap();
    let second = registry.create_game().unwrap();
    assert_eq!(first, GameId::new(1));
    assert_eq!(second, GameId::new(2));

    assert!(registry.remove_game(second));
    let third = registry.create_game().unwrap();
    assert_eq!(third, GameId::new(3));
}

#[test]
fn test_find_game_reports_status_and_seats() {
    let registry = GameRegistry::new();
    let id = registry.create_game().unwrap();

    let info = registry.find_game(id).unwrap();
    assert_eq!(*info.status(), SessionStatus::AwaitingPlayers);
    assert_eq!(*info.seated(), 0);

    let (seat, _link) = seat_channel(4);
    registry.seat_player(id, seat).unwrap();
    assert_eq!(*registry.find_game(id).unwrap().seated(), 1);

    assert_eq!(
        registry.find_game(GameId::new(999)),
        Err(RegistryError::NotFound(GameId::new(999)))
    );
}

#[test]
fn test_second_seat_starts_game_and_third_is_rejected() {
    let registry = GameRegistry::new();
    let id = registry.create_game().unwrap();

    let (seat0, _link0) = seat_channel(4);
    let first = registry.seat_player(id, seat0).unwrap();
    assert_eq!(first.slot, Slot::First);
    assert!(first.session.is_none());

    let (seat1, _link1) = seat_channel(4);
    let second = registry.seat_player(id, seat1).unwrap();
    assert_eq!(second.slot, Slot::Second);
    let session = second.session.expect("second seat should start the game");
    assert_eq!(session.id(), id);
    assert_eq!(session.status(), SessionStatus::InProgress);
    assert_eq!(session.current_turn(), Slot::First);

    let info = registry.find_game(id).unwrap();
    assert_eq!(*info.status(), SessionStatus::InProgress);
    assert_eq!(*info.seated(), 2);

    let (seat2, _link2) = seat_channel(4);
    assert_eq!(
        registry.seat_player(id, seat2).unwrap_err(),
        RegistryError::GameFull(id)
    );
}

#[test]
fn test_seat_in_missing_game_is_not_found() {
    let registry = GameRegistry::new();
    let (seat, _link) = seat_channel(4);
    assert_eq!(
        registry.seat_player(GameId::new(999), seat).unwrap_err(),
        RegistryError::NotFound(GameId::new(999))
    );
}

#[test]
fn test_concurrent_seating_assigns_each_slot_once() {
    for _ in 0..200 {
        let registry = GameRegistry::new();
        let id = registry.create_game().unwrap();
        let barrier = Arc::new(Barrier::new(2));

        let workers: Vec<_> = (0..2)
            .map(|_| {
                let registry = registry.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    let (seat, link) = seat_channel(4);
                    barrier.wait();
                    let seating = registry.seat_player(id, seat).unwrap();
                    (seating.slot, seating.session.is_some(), link)
                })
            })
            .collect();

        let mut results: Vec<(Slot, bool)> = workers
            .into_iter()
            .map(|worker| {
                let (slot, started, _link) = worker.join().unwrap();
                (slot, started)
            })
            .collect();
        results.sort();

        assert_eq!(results, vec![(Slot::First, false), (Slot::Second, true)]);
    }
}

#[test]
fn test_concurrent_joiners_only_one_wins_second_seat() {
    let registry = GameRegistry::new();
    let id = registry.create_game().unwrap();
    let (seat0, _link0) = seat_channel(4);
    registry.seat_player(id, seat0).unwrap();

    let barrier = Arc::new(Barrier::new(8));
    let workers: Vec<_> = (0..8)
        .map(|_| {
            let registry = registry.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let (seat, _link) = seat_channel(4);
                barrier.wait();
                registry.seat_player(id, seat).map(|seating| seating.slot)
            })
        })
        .collect();

    let outcomes: Vec<_> = workers.into_iter().map(|w| w.join().unwrap()).collect();
    let seated = outcomes.iter().filter(|o| o.is_ok()).count();
    assert_eq!(seated, 1);
    assert!(outcomes.contains(&Ok(Slot::Second)));
    assert!(
        outcomes
            .iter()
            .filter(|o| o.is_err())
            .all(|o| *o == Err(RegistryError::GameFull(id)))
    );
}

#[test]
fn test_remove_and_finish_are_idempotent() {
    let registry = GameRegistry::new();
    let a = registry.create_game().unwrap();
    let b = registry.create_game().unwrap();

    assert!(registry.remove_game(a));
    assert!(!registry.remove_game(a));

    assert!(registry.finish(b, SessionStatus::Draw));
    assert!(!registry.finish(b, SessionStatus::Draw));
    assert!(registry.is_empty());
}

#[test]
fn test_abandon_only_removes_waiting_games() {
    let registry = GameRegistry::new();
    let waiting = registry.create_game().unwrap();
    let (seat, _link) = seat_channel(4);
    registry.seat_player(waiting, seat).unwrap();

    let running = registry.create_game().unwrap();
    let (seat0, _link0) = seat_channel(4);
    let (seat1, _link1) = seat_channel(4);
    registry.seat_player(running, seat0).unwrap();
    let _session = registry.seat_player(running, seat1).unwrap().session;

    assert!(registry.abandon(waiting));
    assert!(!registry.abandon(running));
    assert!(!registry.abandon(GameId::new(999)));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_open_games_lists_only_half_full_games() {
    let registry = GameRegistry::new();
    let empty = registry.create_game().unwrap();
    let open = registry.create_game().unwrap();
    let full = registry.create_game().unwrap();

    let (seat, _link) = seat_channel(4);
    registry.seat_player(open, seat).unwrap();
    let (seat0, _link0) = seat_channel(4);
    let (seat1, _link1) = seat_channel(4);
    registry.seat_player(full, seat0).unwrap();
    let _session = registry.seat_player(full, seat1).unwrap().session;

    assert_eq!(registry.open_games(), vec![open]);
    assert!(!registry.open_games().contains(&empty));
}

#[tokio::test]
async fn test_abort_all_closes_registry_and_releases_waiting_players() {
    let registry = GameRegistry::new();
    let id = registry.create_game().unwrap();
    let (seat, mut link) = seat_channel(4);
    registry.seat_player(id, seat).unwrap();

    assert_eq!(registry.abort_all(), 1);
    assert!(registry.is_closed());
    assert!(registry.is_empty());

    // The waiting player is told why, then the dropped seat releases it.
    assert_eq!(
        link.next_message().await.as_deref(),
        Some("Game aborted: server shutting down.")
    );
    assert_eq!(link.next_message().await, None);

    assert_eq!(registry.create_game(), Err(RegistryError::Closed));
}
