//! Action arbitration: one intent per acting combatant.
//!
//! Evaluated once per turn, in strict order: retreat when hurt, lead
//! with a ready ability, then fight the way the profile prefers.
//! Degradation is always a hold, never an error; a wasted enemy turn
//! beats a stalled table.

use encounter_core::{AttackProfile, Combatant, grid};
use encounter_content::{AttackPreference, BehaviorTag, MovementPattern};

use super::context::AiContext;
use super::movement;
use super::types::{ActionIntent, AttackSpec};

/// Swing used by tokens whose archetype has no stat template.
const FALLBACK_ATTACK: AttackProfile = AttackProfile {
    name: "Strike",
    range_ft: 5,
    to_hit_bonus: 2,
    damage_expr: "1d6",
};

/// Decide what the acting combatant does this turn.
pub fn decide(ctx: &AiContext<'_>) -> ActionIntent {
    let Some(target) = super::target::select(ctx) else {
        // Nobody left to fight; hold position.
        return ActionIntent::Hold;
    };

    let budget = ctx.actor.speed_squares();

    // Hurt enough to give ground. Terminal for this turn.
    if ctx.actor.hp_fraction() < ctx.profile.retreat_threshold {
        return match movement::plan_retreat(ctx, target, budget) {
            Some(to) => ActionIntent::Move {
                from: ctx.actor.position,
                to,
            },
            None => ActionIntent::Hold,
        };
    }

    // A ready ability in range trumps weapon work.
    if ctx.profile.prefers_abilities
        && let Some((ability, recharge_rounds)) = ready_ability(ctx, target)
    {
        return ActionIntent::Ability {
            target: target.id,
            ability,
            recharge_rounds,
        };
    }

    let distance = ctx.distance_to(target);
    match ctx.profile.attack {
        AttackPreference::Melee => {
            if distance <= ctx.config.melee_range_ft {
                ActionIntent::Attack {
                    target: target.id,
                    attack: melee_spec(ctx),
                }
            } else {
                close_and_strike(ctx, target, budget)
            }
        }
        AttackPreference::Ranged => ranged_turn(ctx, target, budget, distance),
        AttackPreference::Mixed => {
            if distance <= ctx.profile.preferred_range_ft {
                ActionIntent::Attack {
                    target: target.id,
                    attack: best_spec_for(ctx, distance),
                }
            } else {
                close_and_strike(ctx, target, budget)
            }
        }
    }
}

fn ranged_turn(
    ctx: &AiContext<'_>,
    target: &Combatant,
    budget: u32,
    distance: u32,
) -> ActionIntent {
    let avoids_melee = ctx.profile.movement == MovementPattern::Kiting
        || ctx.profile.tags.contains(&BehaviorTag::Skirmisher);

    if distance > ctx.config.ranged_max_ft {
        // Too far to shoot usefully; close to the preferred band.
        let stop = ctx.profile.preferred_range_ft / encounter_core::FEET_PER_SQUARE;
        match movement::direct_toward(ctx, target.position, budget, stop) {
            Some(to) => ActionIntent::Move {
                from: ctx.actor.position,
                to,
            },
            None => ActionIntent::Hold,
        }
    } else if distance <= ctx.config.melee_range_ft && avoids_melee {
        match movement::direct_away(ctx, target.position, budget) {
            Some(to) => ActionIntent::Move {
                from: ctx.actor.position,
                to,
            },
            None => ActionIntent::Attack {
                // Cornered: shoot from where it stands.
                target: target.id,
                attack: ranged_spec(ctx),
            },
        }
    } else {
        ActionIntent::Attack {
            target: target.id,
            attack: ranged_spec(ctx),
        }
    }
}

/// Move along the profile's pattern, then queue the strike when the
/// destination is in reach of it; otherwise just move.
fn close_and_strike(ctx: &AiContext<'_>, target: &Combatant, budget: u32) -> ActionIntent {
    let attack = melee_spec(ctx);
    let from = ctx.actor.position;

    match movement::plan(ctx, ctx.profile.movement, target, budget) {
        Some(to) => {
            if grid::is_within_range(to, target.position, attack.range_ft) {
                ActionIntent::MoveThenAttack {
                    from,
                    to,
                    target: target.id,
                    attack,
                }
            } else {
                ActionIntent::Move { from, to }
            }
        }
        None => {
            if grid::is_within_range(from, target.position, attack.range_ft) {
                ActionIntent::Attack {
                    target: target.id,
                    attack,
                }
            } else {
                ActionIntent::Hold
            }
        }
    }
}

/// First ready ability from the profile's priority list that can reach
/// the target, with its recharge.
fn ready_ability(ctx: &AiContext<'_>, target: &Combatant) -> Option<(AttackSpec, u8)> {
    let template = ctx.template()?;
    for name in ctx.profile.ability_priority {
        let Some(state) = ctx.actor.ability(name) else {
            continue;
        };
        if !state.is_ready() {
            continue;
        }
        let Some(profile) = template.abilities.iter().find(|a| a.name == *name) else {
            continue;
        };
        if grid::is_within_range(ctx.actor.position, target.position, profile.range_ft) {
            return Some((AttackSpec::from_ability(profile), profile.recharge_rounds));
        }
    }
    None
}

fn melee_spec(ctx: &AiContext<'_>) -> AttackSpec {
    let profile = ctx
        .template()
        .map(|template| template.melee)
        .unwrap_or(FALLBACK_ATTACK);
    AttackSpec::from_attack(&profile)
}

fn ranged_spec(ctx: &AiContext<'_>) -> AttackSpec {
    let profile = ctx
        .template()
        .and_then(|template| template.ranged)
        .unwrap_or(FALLBACK_ATTACK);
    AttackSpec::from_attack(&profile)
}

/// For mixed fighters: melee steel up close, the ranged option past
/// melee reach when one exists.
fn best_spec_for(ctx: &AiContext<'_>, distance: u32) -> AttackSpec {
    if distance <= ctx.config.melee_range_ft {
        melee_spec(ctx)
    } else {
        ranged_spec(ctx)
    }
}
