//! Roster mutations: spawning, damage, healing, and removal.
//!
//! Defeat semantics differ by faction: enemies reduced to zero hp are
//! removed from the roster outright, player and npc tokens are floored
//! at zero and stay on the map until an operator removes them.

use arrayvec::ArrayVec;

use crate::env::CoreEnv;
use crate::grid;
use crate::rng::mix_seed;
use crate::state::{
    Archetype, Combatant, CombatRole, Faction, Position, ResourceMeter, TokenId,
};

use super::CombatEngine;

/// Errors that can occur during roster operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RosterError {
    #[error("token {0} is not in the roster")]
    UnknownToken(TokenId),

    #[error("position {0} is outside the map")]
    OutOfBounds(Position),

    #[error("position {0} is already occupied")]
    Occupied(Position),
}

/// Parameters for spawning a token by hand.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TokenSpec {
    pub name: String,
    pub position: Position,
    pub faction: Faction,
    pub max_hp: u32,
    pub armor_class: u32,
    pub movement_speed: u32,
    pub role: Option<CombatRole>,
}

/// What one application of damage did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DamageReport {
    pub token: TokenId,
    pub dealt: u32,
    /// Hp reached zero.
    pub defeated: bool,
    /// The token was an enemy and left the roster.
    pub removed: bool,
}

impl CombatEngine<'_> {
    /// Spawn a token from an explicit spec. For enemy tokens the
    /// archetype is resolved from the name here, once; nothing later
    /// parses names again.
    pub fn spawn_token(&mut self, spec: TokenSpec) -> Result<TokenId, RosterError> {
        grid::within_bounds(spec.position, self.state.map)
            .ok_or(RosterError::OutOfBounds(spec.position))?;
        if grid::is_occupied(spec.position, &self.state.tokens, None) {
            return Err(RosterError::Occupied(spec.position));
        }

        let archetype = match spec.faction {
            Faction::Enemy => Archetype::resolve(&spec.name),
            _ => None,
        };

        let id = self.state.allocate_token_id();
        self.state.tokens.push(Combatant {
            id,
            name: spec.name,
            position: spec.position,
            faction: spec.faction,
            hp: ResourceMeter::at_max(spec.max_hp),
            armor_class: spec.armor_class,
            movement_speed: spec.movement_speed,
            archetype,
            role: spec.role,
            status_effects: ArrayVec::new(),
            abilities: ArrayVec::new(),
        });

        self.refresh_group_labels();
        Ok(id)
    }

    /// Spawn an enemy straight from its archetype template. Returns
    /// `None` when no template exists (the spawn degrades to nothing
    /// rather than failing the surrounding operation).
    pub fn spawn_from_template(
        &mut self,
        env: &CoreEnv<'_>,
        archetype: Archetype,
        position: Position,
    ) -> Option<TokenId> {
        let template = env.archetypes.template(archetype)?;
        let id = self.state.allocate_token_id();
        self.state
            .tokens
            .push(template.to_combatant(id, archetype, position));
        self.refresh_group_labels();
        Some(id)
    }

    /// Apply flat damage. Enemy tokens that reach zero hp are removed
    /// and their initiative slots cleaned up in the same pass.
    pub fn apply_damage(
        &mut self,
        id: TokenId,
        amount: u32,
    ) -> Result<DamageReport, RosterError> {
        let token = self
            .state
            .token_mut(id)
            .ok_or(RosterError::UnknownToken(id))?;

        let dealt = token.hp.damage(amount);
        let defeated = token.hp.is_depleted();
        let removed = defeated && token.faction == Faction::Enemy;

        if removed {
            self.state.tokens.retain(|token| token.id != id);
            if self.state.turn.active {
                self.cleanup_order();
            }
        }

        Ok(DamageReport {
            token: id,
            dealt,
            defeated,
            removed,
        })
    }

    /// Restore hp, capped at the maximum. Returns the amount restored.
    pub fn heal(&mut self, id: TokenId, amount: u32) -> Result<u32, RosterError> {
        let token = self
            .state
            .token_mut(id)
            .ok_or(RosterError::UnknownToken(id))?;
        Ok(token.hp.heal(amount))
    }

    /// Operator removal of any token, regardless of hp.
    pub fn remove_token(&mut self, id: TokenId) -> Result<(), RosterError> {
        if self.state.token(id).is_none() {
            return Err(RosterError::UnknownToken(id));
        }
        self.state.tokens.retain(|token| token.id != id);
        if self.state.turn.active {
            self.cleanup_order();
        }
        Ok(())
    }

    /// Arm the cooldown of an ability on a token, if both exist.
    pub fn arm_ability_cooldown(&mut self, id: TokenId, ability: &str, rounds: u8) {
        if let Some(token) = self.state.token_mut(id)
            && let Some(state) = token.ability_mut(ability)
        {
            state.trigger_cooldown(rounds);
        }
    }

    /// Roll initiative for a freshly spawned group member and merge it
    /// into the running order: joins an existing live group slot when
    /// one exists, otherwise claims a new slot at the position its roll
    /// earns.
    pub fn enlist_spawned_enemy(&mut self, env: &CoreEnv<'_>, spawned: TokenId) {
        if !self.state.turn.active {
            return;
        }
        let Some(archetype) = self.state.token(spawned).and_then(|token| token.archetype) else {
            self.refresh_group_labels();
            return;
        };

        let already_listed = self
            .state
            .turn
            .order
            .iter()
            .any(|entry| entry.archetype() == Some(archetype));
        if already_listed {
            self.refresh_group_labels();
            return;
        }

        let seed = mix_seed(
            self.state.session_seed,
            self.state.next_nonce(),
            spawned.0,
            0,
        );
        let score = env.dice.roll_d20(seed);
        let count = self.state.group_members(archetype).count();
        let entry = crate::state::InitiativeEntry {
            id: self.state.allocate_entry_id(),
            display_name: format!("{} (x{})", archetype.label(), count),
            score,
            faction: Faction::Enemy,
            has_acted: false,
            kind: crate::state::EntryKind::Group { archetype },
        };
        let index = crate::state::insertion_index(&self.state.turn.order, score);
        self.state.turn.order.insert(index, entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::MapBounds;
    use crate::state::SessionState;

    fn spec(name: &str, faction: Faction, x: i32, y: i32) -> TokenSpec {
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

    #[test]
    fn spawn_resolves_enemy_archetype_once() {
        let mut state = SessionState::new(MapBounds::new(10, 10));
        let mut engine = CombatEngine::new(&mut state);

        let goblin = engine
            .spawn_token(spec("Goblin chef", Faction::Enemy, 1, 1))
            .unwrap();
        let hero = engine
            .spawn_token(spec("Sigrid", Faction::Player, 2, 2))
            .unwrap();

        assert_eq!(
            state.token(goblin).unwrap().archetype,
            Some(Archetype::Goblin)
        );
        assert_eq!(state.token(hero).unwrap().archetype, None);
    }

    #[test]
    fn spawn_rejects_occupied_and_out_of_bounds() {
        let mut state = SessionState::new(MapBounds::new(10, 10));
        let mut engine = CombatEngine::new(&mut state);
        engine
            .spawn_token(spec("Goblin", Faction::Enemy, 1, 1))
            .unwrap();

        let mut engine = CombatEngine::new(&mut state);
        assert!(matches!(
            engine.spawn_token(spec("Goblin", Faction::Enemy, 1, 1)),
            Err(RosterError::Occupied(_))
        ));
        assert!(matches!(
            engine.spawn_token(spec("Goblin", Faction::Enemy, 11, 1)),
            Err(RosterError::OutOfBounds(_))
        ));
    }

    #[test]
    fn enemies_are_removed_at_zero_players_are_floored() {
        let mut state = SessionState::new(MapBounds::new(10, 10));
        let mut engine = CombatEngine::new(&mut state);
        let goblin = engine
            .spawn_token(spec("Goblin", Faction::Enemy, 1, 1))
            .unwrap();
        let hero = engine
            .spawn_token(spec("Sigrid", Faction::Player, 2, 2))
            .unwrap();

        let mut engine = CombatEngine::new(&mut state);
        let report = engine.apply_damage(goblin, 99).unwrap();
        assert!(report.defeated);
        assert!(report.removed);
        assert!(state.token(goblin).is_none());

        let mut engine = CombatEngine::new(&mut state);
        let report = engine.apply_damage(hero, 99).unwrap();
        assert!(report.defeated);
        assert!(!report.removed);
        assert_eq!(state.token(hero).unwrap().hp.current, 0);
    }
}
