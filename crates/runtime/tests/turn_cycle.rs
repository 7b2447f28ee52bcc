mod common;

use common::{test_runtime, token_spec};
use encounter_core::{Archetype, EntryId, Faction, InitiativeSeed, TurnError};
use runtime::RuntimeError;

#[tokio::test]
async fn start_combat_orders_by_initiative_score() {
    let runtime = test_runtime(1);
    let handle = runtime.handle();

    let a = handle
        .spawn_token(token_spec("Sigrid", Faction::Player, 1, 1))
        .await
        .unwrap();
    let b = handle
        .spawn_token(token_spec("Wren", Faction::Player, 2, 2))
        .await
        .unwrap();

    handle
        .start_combat(vec![
            InitiativeSeed::Token { id: a, score: 15 },
            InitiativeSeed::Token { id: b, score: 20 },
        ])
        .await
        .unwrap();

    let state = handle.query_session().await.unwrap();
    let current = state.turn.current_entry().expect("combat should be active");
    // The 20 acts first despite arriving second in the seed list.
    assert_eq!(current.linked_token(), Some(b));
    assert_eq!(state.turn.round, 1);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn starting_with_an_empty_order_is_rejected() {
    let runtime = test_runtime(2);
    let handle = runtime.handle();

    let err = handle.start_combat(Vec::new()).await.unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Turn(TurnError::EmptyOrder)
    ));

    let state = handle.query_session().await.unwrap();
    assert!(!state.turn.active);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn advancing_wraps_rounds_with_exact_math() {
    let runtime = test_runtime(3);
    let handle = runtime.handle();

    let mut seeds = Vec::new();
    for (index, name) in ["Sigrid", "Wren", "Tam"].iter().enumerate() {
        let id = handle
            .spawn_token(token_spec(name, Faction::Player, index as i32, 0))
            .await
            .unwrap();
        seeds.push(InitiativeSeed::Token {
            id,
            score: 20 - index as i32,
        });
    }
    handle.start_combat(seeds).await.unwrap();

    // Advancing N times through an M-entry order yields round 1 + N/M.
    for advance in 1..=7u32 {
        let report = handle.advance_turn().await.unwrap();
        assert_eq!(report.round, 1 + advance / 3);
    }

    let state = handle.query_session().await.unwrap();
    assert_eq!(state.turn.round, 3);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn group_entries_track_and_prune_defeated_members() {
    let runtime = test_runtime(4);
    let handle = runtime.handle();

    let hero = handle
        .spawn_token(token_spec("Sigrid", Faction::Player, 0, 0))
        .await
        .unwrap();
    let mut goblins = Vec::new();
    for x in 1..=3 {
        goblins.push(
            handle
                .spawn_token(token_spec("Goblin", Faction::Enemy, x + 4, 6))
                .await
                .unwrap(),
        );
    }

    handle
        .start_combat(vec![
            InitiativeSeed::Token {
                id: hero,
                score: 18,
            },
            InitiativeSeed::Group {
                archetype: Archetype::Goblin,
                score: 12,
            },
        ])
        .await
        .unwrap();

    let state = handle.query_session().await.unwrap();
    let group = state.turn.order.iter().find(|e| e.is_group()).unwrap();
    assert_eq!(group.display_name, "Goblin (x3)");

    // One down: the entry stays, with an updated live count.
    handle.apply_damage(goblins[0], 99).await.unwrap();
    let state = handle.query_session().await.unwrap();
    let group = state.turn.order.iter().find(|e| e.is_group()).unwrap();
    assert_eq!(group.display_name, "Goblin (x2)");

    // All down: the entry is pruned on the cleanup pass.
    handle.apply_damage(goblins[1], 99).await.unwrap();
    handle.apply_damage(goblins[2], 99).await.unwrap();
    let state = handle.query_session().await.unwrap();
    assert!(state.turn.order.iter().all(|e| !e.is_group()));
    assert!(state.turn.current_entry().is_some());

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn reorder_replaces_the_order_wholesale() {
    let runtime = test_runtime(5);
    let handle = runtime.handle();

    let a = handle
        .spawn_token(token_spec("Sigrid", Faction::Player, 1, 1))
        .await
        .unwrap();
    let b = handle
        .spawn_token(token_spec("Wren", Faction::Player, 2, 2))
        .await
        .unwrap();
    handle
        .start_combat(vec![
            InitiativeSeed::Token { id: a, score: 15 },
            InitiativeSeed::Token { id: b, score: 20 },
        ])
        .await
        .unwrap();

    let state = handle.query_session().await.unwrap();
    let ids: Vec<EntryId> = state.turn.order.iter().map(|e| e.id).collect();
    let reversed: Vec<EntryId> = ids.iter().rev().copied().collect();

    // Not a permutation: rejected, order unchanged.
    let err = handle.reorder_initiative(vec![ids[0]]).await.unwrap_err();
    assert!(matches!(err, RuntimeError::Turn(TurnError::OrderMismatch)));

    handle.reorder_initiative(reversed.clone()).await.unwrap();
    let state = handle.query_session().await.unwrap();
    let now: Vec<EntryId> = state.turn.order.iter().map(|e| e.id).collect();
    assert_eq!(now, reversed);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn illegal_moves_are_rejected_and_leave_state_unchanged() {
    let runtime = test_runtime(6);
    let handle = runtime.handle();

    let hero = handle
        .spawn_token(token_spec("Sigrid", Faction::Player, 2, 2))
        .await
        .unwrap();
    let other = handle
        .spawn_token(token_spec("Wren", Faction::Player, 5, 2))
        .await
        .unwrap();

    // Occupied square.
    let err = handle
        .request_move(hero, encounter_core::Position::new(5, 2))
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::Move(_)));

    // Beyond the speed budget (30ft = 6 squares).
    let err = handle
        .request_move(hero, encounter_core::Position::new(12, 2))
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::Move(_)));

    let state = handle.query_session().await.unwrap();
    assert_eq!(
        state.token(hero).unwrap().position,
        encounter_core::Position::new(2, 2)
    );
    assert_eq!(
        state.token(other).unwrap().position,
        encounter_core::Position::new(5, 2)
    );

    runtime.shutdown().await.unwrap();
}
