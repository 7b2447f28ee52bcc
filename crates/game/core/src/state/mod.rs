//! Authoritative session state representation.
//!
//! This module owns the data structures that describe the roster, the
//! initiative order, hazards, and in-flight continuations. Runtime
//! layers clone or query this state but mutate it exclusively through
//! the engine.
mod archetype;
mod combatant;
mod common;
mod hazard;
mod initiative;
mod pending;
mod turn;

pub use archetype::{Archetype, CombatRole};
pub use combatant::{AbilityState, Combatant, StatusEffect};
pub use common::{ActionId, EntryId, Faction, MineId, Position, ResourceMeter, RollId, TokenId};
pub use hazard::{Mine, MineSpec, PendingStormRoll, StormState};
pub use initiative::{EntryKind, InitiativeEntry, InitiativeSeed, insertion_index, sort_by_score};
pub use pending::PendingAction;
pub use turn::TurnCycleState;

use crate::grid::MapBounds;

/// Canonical snapshot of one combat session: the single document the
/// persistence layer reads and writes.
///
/// Everything a continuation needs after a restart (pending actions,
/// the outstanding storm roll, id counters, the RNG seed and nonce)
/// lives here.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionState {
    /// RNG seed fixed at session creation; combined with `nonce` to
    /// derive per-event dice seeds.
    pub session_seed: u64,
    /// Decision counter, bumped once per random event.
    nonce: u64,

    // Monotonic id allocators. Never reused.
    next_token_id: u32,
    next_entry_id: u32,
    next_mine_id: u32,
    next_action_id: u64,
    next_roll_id: u64,

    pub map: MapBounds,
    pub tokens: Vec<Combatant>,
    pub turn: TurnCycleState,
    pub mines: Vec<Mine>,
    pub storm: Option<StormState>,
    pub pending_storm_roll: Option<PendingStormRoll>,
    pub pending_actions: Vec<PendingAction>,
}

impl SessionState {
    /// Creates an empty session on a map of the given bounds.
    pub fn new(map: MapBounds) -> Self {
        Self::with_seed(0, map)
    }

    /// Creates an empty session with a specific RNG seed.
    pub fn with_seed(session_seed: u64, map: MapBounds) -> Self {
        Self {
            session_seed,
            nonce: 0,
            next_token_id: 1,
            next_entry_id: 1,
            next_mine_id: 1,
            next_action_id: 1,
            next_roll_id: 1,
            map,
            tokens: Vec::new(),
            turn: TurnCycleState::new(),
            mines: Vec::new(),
            storm: None,
            pending_storm_roll: None,
            pending_actions: Vec::new(),
        }
    }

    /// Bumps and returns the decision nonce for the next random event.
    pub fn next_nonce(&mut self) -> u64 {
        self.nonce += 1;
        self.nonce
    }

    /// Current decision nonce without bumping it.
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn allocate_token_id(&mut self) -> TokenId {
        let id = TokenId(self.next_token_id);
        self.next_token_id += 1;
        id
    }

    pub fn allocate_entry_id(&mut self) -> EntryId {
        let id = EntryId(self.next_entry_id);
        self.next_entry_id += 1;
        id
    }

    pub fn allocate_mine_id(&mut self) -> MineId {
        let id = MineId(self.next_mine_id);
        self.next_mine_id += 1;
        id
    }

    pub fn allocate_action_id(&mut self) -> ActionId {
        let id = ActionId(self.next_action_id);
        self.next_action_id += 1;
        id
    }

    pub fn allocate_roll_id(&mut self) -> RollId {
        let id = RollId(self.next_roll_id);
        self.next_roll_id += 1;
        id
    }

    // ===== roster queries =====

    pub fn token(&self, id: TokenId) -> Option<&Combatant> {
        self.tokens.iter().find(|token| token.id == id)
    }

    pub fn token_mut(&mut self, id: TokenId) -> Option<&mut Combatant> {
        self.tokens.iter_mut().find(|token| token.id == id)
    }

    pub fn living_tokens(&self) -> impl Iterator<Item = &Combatant> {
        self.tokens.iter().filter(|token| token.is_alive())
    }

    pub fn living_enemies(&self) -> impl Iterator<Item = &Combatant> {
        self.living_tokens()
            .filter(|token| token.faction == Faction::Enemy)
    }

    /// Living enemy tokens belonging to an archetype group.
    pub fn group_members(&self, archetype: Archetype) -> impl Iterator<Item = &Combatant> {
        self.living_enemies()
            .filter(move |token| token.archetype == Some(archetype))
    }

    pub fn mine(&self, id: MineId) -> Option<&Mine> {
        self.mines.iter().find(|mine| mine.id == id)
    }

    pub fn mine_mut(&mut self, id: MineId) -> Option<&mut Mine> {
        self.mines.iter_mut().find(|mine| mine.id == id)
    }

    pub fn pending_action(&self, id: ActionId) -> Option<&PendingAction> {
        self.pending_actions.iter().find(|action| action.id == id)
    }

    pub fn pending_action_mut(&mut self, id: ActionId) -> Option<&mut PendingAction> {
        self.pending_actions.iter_mut().find(|action| action.id == id)
    }

    /// Drops every in-flight continuation (pending actions, the
    /// outstanding storm roll, the storm itself). Called atomically
    /// with combat end and session reset so nothing fires afterwards.
    pub fn clear_continuations(&mut self) {
        self.pending_actions.clear();
        self.pending_storm_roll = None;
        self.storm = None;
    }
}
