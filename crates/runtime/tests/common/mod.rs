//! Shared helpers for runtime integration tests.
#![allow(dead_code)]

use std::time::Duration;

use encounter_core::{Faction, MapBounds, Position, SessionState, TokenSpec};
use runtime::{Runtime, RuntimeConfig};

/// Config with a zero preview delay so enemy turns finish immediately.
pub fn instant_config() -> RuntimeConfig {
    RuntimeConfig {
        turn_preview_delay: Duration::ZERO,
        ..RuntimeConfig::default()
    }
}

/// Route worker tracing through the test harness when `RUST_LOG` asks
/// for it. Safe to call from every test; only the first init wins.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn test_runtime(seed: u64) -> Runtime {
    init_tracing();
    Runtime::builder()
        .session_id("test-table")
        .seed(seed)
        .map(MapBounds::new(26, 20))
        .config(instant_config())
        .build()
        .expect("runtime should build")
}

pub fn token_spec(name: &str, faction: Faction, x: i32, y: i32) -> TokenSpec {
    TokenSpec {
        name: name.to_string(),
        position: Position::new(x, y),
        faction,
        max_hp: 10,
        armor_class: 14,
        movement_speed: 30,
        role: None,
    }
}

/// Poll the session until `predicate` holds or the timeout elapses.
pub async fn wait_for(
    handle: &runtime::SessionHandle,
    predicate: impl Fn(&SessionState) -> bool,
) -> SessionState {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        let state = handle.query_session().await.expect("query should succeed");
        if predicate(&state) {
            return state;
        }
        if tokio::time::Instant::now() > deadline {
            panic!("session never reached the expected state");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
