mod common;

use std::time::Duration;

use common::{test_runtime, token_spec, wait_for};
use encounter_core::{Archetype, Faction, InitiativeSeed, Position};
use runtime::{Runtime, RuntimeConfig, RuntimeError};

/// Start combat with one enemy group acting first, returning the group
/// entry id.
async fn start_enemy_first(
    handle: &runtime::SessionHandle,
    archetype: Archetype,
    player: encounter_core::TokenId,
) -> encounter_core::EntryId {
    handle
        .start_combat(vec![
            InitiativeSeed::Group {
                archetype,
                score: 20,
            },
            InitiativeSeed::Token {
                id: player,
                score: 10,
            },
        ])
        .await
        .unwrap();

    let state = handle.query_session().await.unwrap();
    state.turn.current.expect("combat should be active")
}

#[tokio::test]
async fn direct_mover_spends_its_full_budget_along_one_axis() {
    let runtime = test_runtime(10);
    let handle = runtime.handle();

    let goblin = handle
        .spawn_token(token_spec("Goblin", Faction::Enemy, 0, 0))
        .await
        .unwrap();
    let hero = handle
        .spawn_token(token_spec("Sigrid", Faction::Player, 10, 0))
        .await
        .unwrap();

    let entry = start_enemy_first(&handle, Archetype::Goblin, hero).await;
    handle.run_enemy_turn(entry).await.unwrap();

    // Speed 30 is 6 squares: the goblin lands at (6, 0), 20ft short.
    let state = wait_for(&handle, |s| {
        s.token(goblin).map(|t| t.position) == Some(Position::new(6, 0))
    })
    .await;
    assert_eq!(state.token(goblin).unwrap().position, Position::new(6, 0));

    // The preview timer has zero delay, so the turn hands over to the
    // player entry.
    let state = wait_for(&handle, |s| s.turn.current != Some(entry)).await;
    assert!(state.turn.active);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn adjacent_melee_attacker_queues_a_pending_action() {
    let runtime = test_runtime(11);
    let handle = runtime.handle();

    let goblin = handle
        .spawn_token(token_spec("Goblin", Faction::Enemy, 4, 4))
        .await
        .unwrap();
    let hero = handle
        .spawn_token(token_spec("Sigrid", Faction::Player, 5, 4))
        .await
        .unwrap();

    let entry = start_enemy_first(&handle, Archetype::Goblin, hero).await;
    handle.run_enemy_turn(entry).await.unwrap();

    let state = wait_for(&handle, |s| !s.pending_actions.is_empty()).await;
    let action = &state.pending_actions[0];
    assert_eq!(action.actor, goblin);
    assert_eq!(action.target, Some(hero));
    assert_eq!(action.ability_name, "Scimitar");
    assert!(action.is_enemy_action);
    assert!(!action.resolved);
    // Adjacent already; no movement happened.
    assert_eq!(state.token(goblin).unwrap().position, Position::new(4, 4));

    // External confirmation lands the damage and retires the action.
    handle.resolve_action(action.id, true, 5).await.unwrap();
    let state = handle.query_session().await.unwrap();
    assert!(state.pending_actions.is_empty());
    assert_eq!(state.token(hero).unwrap().hp.current, 5);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn cornered_skirmisher_opens_distance_instead_of_brawling() {
    let runtime = test_runtime(12);
    let handle = runtime.handle();

    let archer = handle
        .spawn_token(token_spec("Archer", Faction::Enemy, 5, 5))
        .await
        .unwrap();
    let hero = handle
        .spawn_token(token_spec("Sigrid", Faction::Player, 4, 5))
        .await
        .unwrap();

    let entry = start_enemy_first(&handle, Archetype::Archer, hero).await;
    handle.run_enemy_turn(entry).await.unwrap();

    let state = wait_for(&handle, |s| {
        s.token(archer).map(|t| t.position) != Some(Position::new(5, 5))
    })
    .await;
    let position = state.token(archer).unwrap().position;
    // Straight away from the hero along +x.
    assert!(position.x > 5);
    assert_eq!(position.y, 5);
    assert!(state.pending_actions.is_empty());

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn badly_hurt_enemies_give_ground() {
    let runtime = test_runtime(13);
    let handle = runtime.handle();

    let goblin = handle
        .spawn_token(token_spec("Goblin", Faction::Enemy, 10, 10))
        .await
        .unwrap();
    let hero = handle
        .spawn_token(token_spec("Sigrid", Faction::Player, 9, 10))
        .await
        .unwrap();

    // 1/10 hp is under the goblin retreat threshold of 0.2.
    handle.apply_damage(goblin, 9).await.unwrap();

    let entry = start_enemy_first(&handle, Archetype::Goblin, hero).await;
    handle.run_enemy_turn(entry).await.unwrap();

    let state = wait_for(&handle, |s| {
        s.token(goblin).map(|t| t.position) != Some(Position::new(10, 10))
    })
    .await;
    let position = state.token(goblin).unwrap().position;
    // No allies left to regroup with, so it flees straight away.
    assert!(position.x > 10);
    assert!(state.pending_actions.is_empty());

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn enemy_with_no_targets_holds_and_the_turn_still_advances() {
    let runtime = test_runtime(14);
    let handle = runtime.handle();

    handle
        .spawn_token(token_spec("Goblin", Faction::Enemy, 3, 3))
        .await
        .unwrap();

    handle
        .start_combat(vec![InitiativeSeed::Group {
            archetype: Archetype::Goblin,
            score: 12,
        }])
        .await
        .unwrap();

    let state = handle.query_session().await.unwrap();
    let entry = state.turn.current.unwrap();

    handle.run_enemy_turn(entry).await.unwrap();

    // A single-entry order wraps straight into round 2.
    let state = wait_for(&handle, |s| s.turn.round == 2).await;
    assert_eq!(state.turn.current, Some(entry));
    assert!(state.pending_actions.is_empty());

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn reentrant_enemy_turns_are_rejected_while_one_is_processing() {
    // A real preview delay keeps the guard window open.
    let runtime = Runtime::builder()
        .session_id("guard-test")
        .config(RuntimeConfig {
            turn_preview_delay: Duration::from_millis(250),
            ..RuntimeConfig::default()
        })
        .build()
        .unwrap();
    let handle = runtime.handle();

    let hero = handle
        .spawn_token(token_spec("Sigrid", Faction::Player, 10, 0))
        .await
        .unwrap();
    handle
        .spawn_token(token_spec("Goblin", Faction::Enemy, 0, 0))
        .await
        .unwrap();

    let entry = start_enemy_first(&handle, Archetype::Goblin, hero).await;

    handle.run_enemy_turn(entry).await.unwrap();
    let err = handle.run_enemy_turn(entry).await.unwrap_err();
    assert!(matches!(err, RuntimeError::EnemyTurnInProgress));

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn enemy_turns_for_non_current_entries_are_rejected() {
    let runtime = test_runtime(15);
    let handle = runtime.handle();

    let hero = handle
        .spawn_token(token_spec("Sigrid", Faction::Player, 10, 0))
        .await
        .unwrap();
    handle
        .spawn_token(token_spec("Goblin", Faction::Enemy, 0, 0))
        .await
        .unwrap();

    // The player entry acts first here; the goblin slot is not current.
    handle
        .start_combat(vec![
            InitiativeSeed::Group {
                archetype: Archetype::Goblin,
                score: 5,
            },
            InitiativeSeed::Token {
                id: hero,
                score: 20,
            },
        ])
        .await
        .unwrap();

    let state = handle.query_session().await.unwrap();
    let goblin_entry = state
        .turn
        .order
        .iter()
        .find(|e| e.is_group())
        .unwrap()
        .id;

    let err = handle.run_enemy_turn(goblin_entry).await.unwrap_err();
    assert!(matches!(err, RuntimeError::StaleTurn(_)));

    runtime.shutdown().await.unwrap();
}
