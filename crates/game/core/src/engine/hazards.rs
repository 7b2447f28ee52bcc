//! Environment hazards: mine detonation and the storm cycle.
//!
//! Hazards inject actions into combat independent of normal turn
//! decisions. Both are resumable: a triggered mine is terminal state in
//! the session document, and a storm strike parks a pending roll that
//! the damage-confirmation step resolves whenever it arrives.

use crate::env::CoreEnv;
use crate::grid::{self, FEET_PER_SQUARE};
use crate::rng::mix_seed;
use crate::state::{
    Mine, MineId, MineSpec, PendingStormRoll, Position, RollId, StormState, TokenId,
};

use super::{CombatEngine, DamageReport};

/// Errors that can occur during hazard operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum HazardError {
    #[error("mine {0} is not on the map")]
    UnknownMine(MineId),

    #[error("position {0} is outside the map")]
    OutOfBounds(Position),

    #[error("storm roll {0} is not outstanding")]
    UnknownRoll(RollId),

    #[error("no storm is active")]
    StormInactive,

    #[error("a storm is already active")]
    StormAlreadyActive,
}

/// Everything one mine detonation did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MineBlast {
    pub mine: MineId,
    pub triggered_by: TokenId,
    /// True when the mine had already fired; nothing else in the report
    /// is populated.
    pub already_triggered: bool,
    pub casualties: Vec<DamageReport>,
    /// Token id of the enemy that crawled out of the crater.
    pub spawned: Option<TokenId>,
}

/// Outcome of one storm tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StormTick {
    /// One strike is now awaiting externally supplied damage.
    Struck(PendingStormRoll),
    /// No living enemies remained; the storm dissipated.
    Ended,
}

/// Outcome of resolving one storm strike.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StormStrikeReport {
    pub target: TokenId,
    /// `None` when the target left the roster before the damage
    /// arrived.
    pub report: Option<DamageReport>,
    pub storm_ended: bool,
}

impl CombatEngine<'_> {
    /// Arm a new mine.
    pub fn place_mine(&mut self, spec: MineSpec) -> Result<MineId, HazardError> {
        grid::within_bounds(spec.position, self.state.map)
            .ok_or(HazardError::OutOfBounds(spec.position))?;
        let id = self.state.allocate_mine_id();
        self.state.mines.push(Mine::from_spec(id, spec));
        Ok(id)
    }

    /// Mark a mine as detected so the table can render it.
    pub fn reveal_mine(&mut self, id: MineId) -> Result<(), HazardError> {
        self.state
            .mine_mut(id)
            .ok_or(HazardError::UnknownMine(id))?
            .detected = true;
        Ok(())
    }

    /// Detonate a mine.
    ///
    /// Idempotent: a mine that has already fired reports
    /// `already_triggered` and changes nothing. Otherwise every token
    /// within the blast radius takes the mine's flat damage (enemies at
    /// zero hp are removed, players and npcs are floored), one enemy of
    /// the mine's archetype spawns on the mine square, and if combat is
    /// running the spawn is merged into the initiative order.
    ///
    /// The engine never moves the triggering token; the caller owns the
    /// step-on/recoil choreography.
    pub fn trigger_mine(
        &mut self,
        env: &CoreEnv<'_>,
        id: MineId,
        triggered_by: TokenId,
    ) -> Result<MineBlast, HazardError> {
        let mine = *self.state.mine(id).ok_or(HazardError::UnknownMine(id))?;

        if mine.triggered {
            return Ok(MineBlast {
                mine: id,
                triggered_by,
                already_triggered: true,
                casualties: Vec::new(),
                spawned: None,
            });
        }

        let radius_squares = mine.aoe_radius_ft / FEET_PER_SQUARE;
        let victims: Vec<TokenId> = self
            .state
            .tokens
            .iter()
            .filter(|token| {
                grid::squares_between(token.position, mine.position) <= radius_squares
            })
            .map(|token| token.id)
            .collect();

        let mut casualties = Vec::with_capacity(victims.len());
        for victim in victims {
            if let Ok(report) = self.apply_damage(victim, mine.damage) {
                casualties.push(report);
            }
        }

        if let Some(state_mine) = self.state.mine_mut(id) {
            state_mine.triggered = true;
            state_mine.detected = true;
        }

        let spawned = self.spawn_from_template(env, mine.spawns, mine.position);
        if let Some(token) = spawned {
            self.enlist_spawned_enemy(env, token);
        }
        self.refresh_group_labels();

        Ok(MineBlast {
            mine: id,
            triggered_by,
            already_triggered: false,
            casualties,
            spawned,
        })
    }

    /// Start a storm over the encounter.
    pub fn activate_storm(&mut self, total_rounds: u32, stacks: u32) -> Result<(), HazardError> {
        if self.state.storm.is_some() {
            return Err(HazardError::StormAlreadyActive);
        }
        self.state.storm = Some(StormState::new(total_rounds, stacks));
        Ok(())
    }

    /// Advance the storm by one tick.
    ///
    /// Picks one uniformly random living enemy and parks a pending roll
    /// for it; the actual damage arrives later through
    /// [`CombatEngine::resolve_storm_attack`]. Calling again while a
    /// roll is outstanding returns that same roll. With no living
    /// enemies left the storm dissipates.
    pub fn storm_tick(&mut self, env: &CoreEnv<'_>) -> Result<StormTick, HazardError> {
        let storm = self.state.storm.ok_or(HazardError::StormInactive)?;

        if let Some(outstanding) = &self.state.pending_storm_roll {
            return Ok(StormTick::Struck(outstanding.clone()));
        }

        let targets: Vec<(TokenId, String)> = self
            .state
            .living_enemies()
            .map(|token| (token.id, token.name.clone()))
            .collect();
        if targets.is_empty() {
            self.state.storm = None;
            return Ok(StormTick::Ended);
        }

        let seed = mix_seed(
            self.state.session_seed,
            self.state.next_nonce(),
            u32::MAX,
            0,
        );
        let (target, target_name) = targets[env.dice.pick(seed, targets.len())].clone();

        let roll = PendingStormRoll {
            id: self.state.allocate_roll_id(),
            round: storm.round,
            target,
            target_name,
        };
        self.state.pending_storm_roll = Some(roll.clone());
        Ok(StormTick::Struck(roll))
    }

    /// Apply externally supplied damage for an outstanding storm roll,
    /// then advance or end the storm.
    pub fn resolve_storm_attack(
        &mut self,
        roll_id: RollId,
        damage: u32,
    ) -> Result<StormStrikeReport, HazardError> {
        let roll = self
            .state
            .pending_storm_roll
            .clone()
            .filter(|roll| roll.id == roll_id)
            .ok_or(HazardError::UnknownRoll(roll_id))?;

        // Target may have died to something else while the roll waited.
        let report = self.apply_damage(roll.target, damage).ok();

        self.state.pending_storm_roll = None;

        let mut storm_ended = false;
        if let Some(storm) = &mut self.state.storm {
            storm.remaining_rounds = storm.remaining_rounds.saturating_sub(1);
            storm.round += 1;
            if storm.remaining_rounds == 0 {
                storm_ended = true;
            }
        }
        if storm_ended {
            self.state.storm = None;
        }

        Ok(StormStrikeReport {
            target: roll.target,
            report,
            storm_ended,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::ArchetypeOracle;
    use crate::grid::MapBounds;
    use crate::rng::PcgDice;
    use crate::state::{
        Archetype, Combatant, Faction, InitiativeSeed, ResourceMeter, SessionState,
    };

    struct TestArchetypes;

    impl ArchetypeOracle for TestArchetypes {
        fn template(&self, archetype: Archetype) -> Option<&'static crate::env::ArchetypeTemplate> {
            const DEMINEUR: crate::env::ArchetypeTemplate = crate::env::ArchetypeTemplate {
                label: "Demineur",
                max_hp: 13,
                armor_class: 12,
                movement_speed: 25,
                melee: crate::env::AttackProfile {
                    name: "Pick",
                    range_ft: 5,
                    to_hit_bonus: 3,
                    damage_expr: "1d8+1",
                },
                ranged: None,
                abilities: &[],
            };
            matches!(archetype, Archetype::Demineur).then_some(&DEMINEUR)
        }
    }

    fn place(state: &mut SessionState, name: &str, faction: Faction, x: i32, y: i32) -> TokenId {
        let id = state.allocate_token_id();
        let mut token = Combatant::test_token(id, faction, Position::new(x, y));
        token.name = name.to_string();
        token.hp = ResourceMeter::at_max(10);
        if faction == Faction::Enemy {
            token.archetype = Archetype::resolve(name);
        }
        state.tokens.push(token);
        id
    }

    fn mine_spec() -> MineSpec {
        MineSpec {
            position: Position::new(5, 5),
            damage: 6,
            aoe_radius_ft: 5,
            spawns: Archetype::Demineur,
        }
    }

    #[test]
    fn blast_hits_adjacent_squares_only_and_spawns() {
        let dice = PcgDice;
        let oracle = TestArchetypes;
        let env = CoreEnv::new(&oracle, &dice);

        let mut state = SessionState::new(MapBounds::new(20, 20));
        let near = place(&mut state, "Sigrid", Faction::Player, 5, 6);
        let far = place(&mut state, "Wren", Faction::Player, 5, 7);
        let stepper = place(&mut state, "Tam", Faction::Player, 4, 5);

        let mut engine = CombatEngine::new(&mut state);
        let mine = engine.place_mine(mine_spec()).unwrap();
        let blast = engine.trigger_mine(&env, mine, stepper).unwrap();

        assert!(!blast.already_triggered);
        assert!(blast.casualties.iter().any(|c| c.token == near && c.dealt == 6));
        assert!(blast.casualties.iter().all(|c| c.token != far));

        let spawned = blast.spawned.unwrap();
        assert_eq!(state.token(spawned).unwrap().position, Position::new(5, 5));
        assert_eq!(
            state.token(spawned).unwrap().archetype,
            Some(Archetype::Demineur)
        );
        assert_eq!(state.token(near).unwrap().hp.current, 4);
        assert_eq!(state.token(far).unwrap().hp.current, 10);
        assert!(state.mine(mine).unwrap().triggered);
    }

    #[test]
    fn second_trigger_is_a_no_op() {
        let dice = PcgDice;
        let oracle = TestArchetypes;
        let env = CoreEnv::new(&oracle, &dice);

        let mut state = SessionState::new(MapBounds::new(20, 20));
        let near = place(&mut state, "Sigrid", Faction::Player, 5, 6);

        let mut engine = CombatEngine::new(&mut state);
        let mine = engine.place_mine(mine_spec()).unwrap();
        engine.trigger_mine(&env, mine, near).unwrap();

        let tokens_after_first = state.tokens.clone();
        let hp_after_first = state.token(near).unwrap().hp;

        let mut engine = CombatEngine::new(&mut state);
        let blast = engine.trigger_mine(&env, mine, near).unwrap();

        assert!(blast.already_triggered);
        assert!(blast.casualties.is_empty());
        assert!(blast.spawned.is_none());
        assert_eq!(state.tokens, tokens_after_first);
        assert_eq!(state.token(near).unwrap().hp, hp_after_first);
    }

    #[test]
    fn mid_combat_spawn_joins_the_initiative_order() {
        let dice = PcgDice;
        let oracle = TestArchetypes;
        let env = CoreEnv::new(&oracle, &dice);

        let mut state = SessionState::new(MapBounds::new(20, 20));
        let hero = place(&mut state, "Sigrid", Faction::Player, 0, 0);

        let mut engine = CombatEngine::new(&mut state);
        engine
            .start_combat(vec![InitiativeSeed::Token {
                id: hero,
                score: 15,
            }])
            .unwrap();

        let mut engine = CombatEngine::new(&mut state);
        let mine = engine.place_mine(mine_spec()).unwrap();
        engine.trigger_mine(&env, mine, hero).unwrap();

        let group = state
            .turn
            .order
            .iter()
            .find(|entry| entry.archetype() == Some(Archetype::Demineur))
            .expect("spawned archetype should hold an initiative slot");
        assert_eq!(group.display_name, "Demineur (x1)");

        // A second detonation elsewhere merges into the same slot.
        let mut engine = CombatEngine::new(&mut state);
        let second = engine
            .place_mine(MineSpec {
                position: Position::new(10, 10),
                ..mine_spec()
            })
            .unwrap();
        engine.trigger_mine(&env, second, hero).unwrap();

        let groups: Vec<_> = state
            .turn
            .order
            .iter()
            .filter(|entry| entry.archetype() == Some(Archetype::Demineur))
            .collect();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].display_name, "Demineur (x2)");
    }

    #[test]
    fn storm_ends_after_its_final_resolved_roll() {
        let dice = PcgDice;
        let oracle = TestArchetypes;
        let env = CoreEnv::new(&oracle, &dice);

        let mut state = SessionState::new(MapBounds::new(20, 20));
        place(&mut state, "Goblin", Faction::Enemy, 3, 3);

        let mut engine = CombatEngine::new(&mut state);
        engine.activate_storm(1, 2).unwrap();
        let StormTick::Struck(roll) = engine.storm_tick(&env).unwrap() else {
            panic!("expected a strike");
        };

        let outcome = engine.resolve_storm_attack(roll.id, 4).unwrap();
        assert!(outcome.storm_ended);
        assert!(state.storm.is_none());
        assert!(state.pending_storm_roll.is_none());
    }

    #[test]
    fn storm_dissipates_without_enemy_targets() {
        let dice = PcgDice;
        let oracle = TestArchetypes;
        let env = CoreEnv::new(&oracle, &dice);

        let mut state = SessionState::new(MapBounds::new(20, 20));
        place(&mut state, "Sigrid", Faction::Player, 3, 3);

        let mut engine = CombatEngine::new(&mut state);
        engine.activate_storm(3, 1).unwrap();
        assert_eq!(engine.storm_tick(&env).unwrap(), StormTick::Ended);
        assert!(state.storm.is_none());
    }
}
