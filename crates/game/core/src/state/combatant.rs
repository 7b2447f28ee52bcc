use arrayvec::ArrayVec;

use crate::config::CombatConfig;
use crate::grid::FEET_PER_SQUARE;

use super::{Archetype, CombatRole, Faction, Position, ResourceMeter, TokenId};

/// Temporary condition applied to a combatant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatusEffect {
    Poisoned,
    Stunned,
    Slowed,
    Burning,
    Blessed,
    Shielded,
}

/// Per-token readiness tracking for one special ability.
///
/// Readiness is an explicit counter: `trigger_cooldown` arms it when the
/// ability fires, [`AbilityState::tick`] counts it down once per round.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityState {
    pub name: String,
    pub turns_until_ready: u8,
}

impl AbilityState {
    pub fn ready(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            turns_until_ready: 0,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.turns_until_ready == 0
    }

    pub fn trigger_cooldown(&mut self, rounds: u8) {
        self.turns_until_ready = rounds;
    }

    /// One round elapsed.
    pub fn tick(&mut self) {
        self.turns_until_ready = self.turns_until_ready.saturating_sub(1);
    }
}

/// A combatant token on the battle map.
///
/// Invariants: hp stays within `[0, maximum]`, `position` stays within
/// map bounds (enforced by the engine's movement and spawn paths).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Combatant {
    pub id: TokenId,
    pub name: String,
    pub position: Position,
    pub faction: Faction,
    pub hp: ResourceMeter,
    pub armor_class: u32,
    /// Movement allowance per turn, in feet.
    pub movement_speed: u32,
    /// Resolved once at spawn; `None` for player characters and tokens
    /// with no recognizable archetype.
    pub archetype: Option<Archetype>,
    /// Role this character has been observed playing, if any.
    pub role: Option<CombatRole>,
    pub status_effects: ArrayVec<StatusEffect, { CombatConfig::MAX_STATUS_EFFECTS }>,
    pub abilities: ArrayVec<AbilityState, { CombatConfig::MAX_ABILITIES }>,
}

impl Combatant {
    pub fn is_alive(&self) -> bool {
        !self.hp.is_depleted()
    }

    /// Movement allowance in whole squares.
    pub fn speed_squares(&self) -> u32 {
        self.movement_speed / FEET_PER_SQUARE
    }

    /// Current hp over maximum, in `[0.0, 1.0]`.
    pub fn hp_fraction(&self) -> f32 {
        self.hp.fraction()
    }

    pub fn ability(&self, name: &str) -> Option<&AbilityState> {
        self.abilities.iter().find(|ability| ability.name == name)
    }

    pub fn ability_mut(&mut self, name: &str) -> Option<&mut AbilityState> {
        self.abilities
            .iter_mut()
            .find(|ability| ability.name == name)
    }

    /// Minimal token for tests: 10/10 hp, AC 12, speed 30.
    pub fn test_token(id: TokenId, faction: Faction, position: Position) -> Self {
        Self {
            id,
            name: format!("token {id}"),
            position,
            faction,
            hp: ResourceMeter::at_max(10),
            armor_class: 12,
            movement_speed: 30,
            archetype: None,
            role: None,
            status_effects: ArrayVec::new(),
            abilities: ArrayVec::new(),
        }
    }
}
