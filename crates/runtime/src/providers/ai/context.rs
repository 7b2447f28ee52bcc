//! Decision context assembled once per acting combatant.

use encounter_core::{
    ArchetypeOracle, ArchetypeTemplate, Combatant, CombatConfig, Dice, SessionState, grid,
    mix_seed,
};
use encounter_content::BehaviorProfile;

/// Everything one AI decision reads: the actor, its behavior profile,
/// a consistent session snapshot, and the dice.
///
/// The context is built against a snapshot whose decision nonce has
/// already been bumped, so every random draw inside this decision mixes
/// a fresh seed.
pub struct AiContext<'a> {
    pub actor: &'a Combatant,
    pub profile: &'static BehaviorProfile,
    pub state: &'a SessionState,
    pub config: &'a CombatConfig,
    pub dice: &'a dyn Dice,
    pub archetypes: &'a dyn ArchetypeOracle,
}

impl<'a> AiContext<'a> {
    pub fn new(
        actor: &'a Combatant,
        profile: &'static BehaviorProfile,
        state: &'a SessionState,
        config: &'a CombatConfig,
        dice: &'a dyn Dice,
        archetypes: &'a dyn ArchetypeOracle,
    ) -> Self {
        Self {
            actor,
            profile,
            state,
            config,
            dice,
            archetypes,
        }
    }

    /// Living combatants the actor may target.
    pub fn opponents(&self) -> Vec<&'a Combatant> {
        self.state
            .living_tokens()
            .filter(|token| self.actor.faction.opposes(token.faction))
            .collect()
    }

    /// Living combatants on the actor's side, excluding the actor.
    pub fn allies(&self) -> Vec<&'a Combatant> {
        self.state
            .living_tokens()
            .filter(|token| token.faction == self.actor.faction && token.id != self.actor.id)
            .collect()
    }

    /// Distance from the actor to another combatant, in feet.
    pub fn distance_to(&self, other: &Combatant) -> u32 {
        grid::distance_feet(self.actor.position, other.position)
    }

    /// Stat template for the actor's archetype, if any.
    pub fn template(&self) -> Option<&'static ArchetypeTemplate> {
        self.actor
            .archetype
            .and_then(|archetype| self.archetypes.template(archetype))
    }

    /// Seed for the `context`-th random draw of this decision.
    pub fn seed(&self, context: u32) -> u64 {
        mix_seed(
            self.state.session_seed,
            self.state.nonce(),
            self.actor.id.0,
            context,
        )
    }
}
