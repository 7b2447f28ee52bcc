//! Async orchestration over the encounter core.
//!
//! The runtime owns the authoritative [`encounter_core::SessionState`]
//! inside a single worker task per session, accepts commands through a
//! cloneable [`SessionHandle`], publishes notifications on a topic-based
//! [`EventBus`], and persists the session document through the
//! repository traits. Enemy decisions come from the utility AI in
//! [`providers::ai`].
pub mod api;
pub mod events;
pub mod providers;
pub mod repository;
pub mod runtime;
pub mod workers;

pub use api::{IntentProvider, Result, RuntimeError, SessionHandle};
pub use events::{CombatEvent, Event, EventBus, HazardEvent, Topic, TurnEvent};
pub use providers::ai::{ActionIntent, AttackSpec, EnemyAiProvider};
pub use repository::{FileSessionRepo, InMemorySessionRepo, RepositoryError, SessionRepository};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
