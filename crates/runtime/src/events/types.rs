//! Typed event payloads per topic.

use serde::{Deserialize, Serialize};

use encounter_core::{
    ActionId, EntryId, InitiativeEntry, MineId, PendingAction, PendingStormRoll, Position, TokenId,
};

/// Turn cycle notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TurnEvent {
    CombatStarted {
        order: Vec<InitiativeEntry>,
        first: EntryId,
    },
    TurnAdvanced {
        current: EntryId,
        round: u32,
    },
    /// The order was manually rearranged.
    OrderChanged {
        order: Vec<InitiativeEntry>,
    },
    CombatEnded,
}

/// Roster and action notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CombatEvent {
    PositionChanged {
        token: TokenId,
        from: Position,
        to: Position,
    },
    /// An attack or ability was rolled and now awaits damage
    /// confirmation.
    PendingActionQueued {
        action: PendingAction,
    },
    ActionResolved {
        action: ActionId,
        target: Option<TokenId>,
        hit: bool,
        damage: u32,
    },
    TokenSpawned {
        token: TokenId,
        name: String,
        position: Position,
    },
    TokenDefeated {
        token: TokenId,
        /// Enemies leave the roster; players and npcs stay at zero hp.
        removed: bool,
    },
    TokenRemoved {
        token: TokenId,
    },
}

/// Hazard notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HazardEvent {
    MinePlaced {
        mine: MineId,
        position: Position,
    },
    MineRevealed {
        mine: MineId,
    },
    MineDetonated {
        mine: MineId,
        casualties: Vec<TokenId>,
        spawned: Option<TokenId>,
    },
    StormActivated {
        total_rounds: u32,
    },
    StormStruck {
        roll: PendingStormRoll,
    },
    StormEnded,
}
