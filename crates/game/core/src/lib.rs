//! Deterministic combat rules and session state shared across clients.
//!
//! `encounter-core` defines the canonical rules (grid geometry, the turn
//! cycle, hazard resolution) and the session document every other layer
//! reads. All state mutation flows through [`engine::CombatEngine`], and
//! supporting crates depend on the types re-exported here.
pub mod config;
pub mod engine;
pub mod env;
pub mod grid;
pub mod rng;
pub mod state;

pub use config::CombatConfig;
pub use engine::{
    AdvanceReport, CombatEngine, DamageReport, HazardError, MineBlast, MoveError, RosterError,
    StormStrikeReport, StormTick, TokenSpec, TurnError,
};
pub use env::{AbilityProfile, ArchetypeOracle, ArchetypeTemplate, AttackProfile, CoreEnv};
pub use grid::{FEET_PER_SQUARE, MapBounds};
pub use rng::{Dice, PcgDice, mix_seed};
pub use state::{
    AbilityState, ActionId, Archetype, Combatant, CombatRole, EntryId, EntryKind, Faction,
    InitiativeEntry, InitiativeSeed, Mine, MineId, MineSpec, PendingAction, PendingStormRoll,
    Position, ResourceMeter, RollId, SessionState, StatusEffect, StormState, TokenId,
    TurnCycleState,
};
