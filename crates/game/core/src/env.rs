//! Oracle seams filled by the content layer.
//!
//! The engine stays pure by taking its static data (archetype stat
//! templates) and its randomness through [`CoreEnv`] rather than owning
//! either. Content crates implement [`ArchetypeOracle`]; the runtime
//! wires both halves together per call.

use arrayvec::ArrayVec;

use crate::rng::Dice;
use crate::state::{AbilityState, Archetype, Combatant, Faction, Position, ResourceMeter, TokenId};

/// One weapon attack an archetype can make.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttackProfile {
    pub name: &'static str,
    pub range_ft: u32,
    pub to_hit_bonus: i32,
    /// Dice expression rolled by the external damage-confirmation step.
    pub damage_expr: &'static str,
}

/// One rechargeable special ability.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AbilityProfile {
    pub name: &'static str,
    pub range_ft: u32,
    /// Rounds of cooldown armed after the ability fires.
    pub recharge_rounds: u8,
    pub to_hit_bonus: i32,
    pub damage_expr: &'static str,
}

/// Stat template for spawning one archetype.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArchetypeTemplate {
    pub label: &'static str,
    pub max_hp: u32,
    pub armor_class: u32,
    /// Movement allowance per turn, in feet.
    pub movement_speed: u32,
    pub melee: AttackProfile,
    pub ranged: Option<AttackProfile>,
    pub abilities: &'static [AbilityProfile],
}

impl ArchetypeTemplate {
    /// Create a new enemy combatant from this template, abilities off
    /// cooldown.
    pub fn to_combatant(&self, id: TokenId, archetype: Archetype, position: Position) -> Combatant {
        let mut abilities = ArrayVec::new();
        for ability in self.abilities.iter().take(abilities.capacity()) {
            abilities.push(AbilityState::ready(ability.name));
        }

        Combatant {
            id,
            name: self.label.to_string(),
            position,
            faction: Faction::Enemy,
            hp: ResourceMeter::at_max(self.max_hp),
            armor_class: self.armor_class,
            movement_speed: self.movement_speed,
            archetype: Some(archetype),
            role: None,
            status_effects: ArrayVec::new(),
            abilities,
        }
    }
}

/// Armor estimate used when a target's true armor is unknown.
pub const DEFAULT_ARMOR_ESTIMATE: u32 = 13;

/// Oracle providing archetype stat templates.
pub trait ArchetypeOracle: Send + Sync {
    /// Returns the stat template for an archetype, if one is defined.
    fn template(&self, archetype: Archetype) -> Option<&'static ArchetypeTemplate>;

    /// Estimated armor for targeting heuristics. Falls back to
    /// [`DEFAULT_ARMOR_ESTIMATE`] when the archetype has no template.
    fn armor_estimate(&self, archetype: Archetype) -> u32 {
        self.template(archetype)
            .map(|template| template.armor_class)
            .unwrap_or(DEFAULT_ARMOR_ESTIMATE)
    }
}

/// Bundle of oracles the engine borrows for one operation.
#[derive(Clone, Copy)]
pub struct CoreEnv<'a> {
    pub archetypes: &'a dyn ArchetypeOracle,
    pub dice: &'a dyn Dice,
}

impl<'a> CoreEnv<'a> {
    pub fn new(archetypes: &'a dyn ArchetypeOracle, dice: &'a dyn Dice) -> Self {
        Self { archetypes, dice }
    }
}
