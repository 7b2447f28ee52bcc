//! Movement planning.
//!
//! Computes one legal destination per decision, within the actor's
//! speed budget, never on an occupied square, never off the map. A plan
//! that cannot produce a legal destination returns `None` and the actor
//! stays where it is; planning never fails the turn.

use encounter_core::{Combatant, FEET_PER_SQUARE, Position, grid};
use encounter_content::MovementPattern;

use super::context::AiContext;

/// Eight compass steps, 45 degrees apart, index increasing
/// counterclockwise from east in screen coordinates.
const COMPASS: [(i32, i32); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// Flanking angles tried around the target, in priority order.
const FLANK_TURNS: [i32; 6] = [2, -2, 1, -1, 3, -3];

/// Plan a destination for the given pattern. `None` means stay put.
pub fn plan(
    ctx: &AiContext<'_>,
    pattern: MovementPattern,
    target: &Combatant,
    budget_squares: u32,
) -> Option<Position> {
    match pattern {
        MovementPattern::Direct => direct_toward(ctx, target.position, budget_squares, 1),
        MovementPattern::Flanking => flank(ctx, target, budget_squares),
        MovementPattern::Kiting => kite(ctx, target, budget_squares),
        MovementPattern::Defensive => defensive(ctx, target, budget_squares),
    }
}

/// Retreat when hp runs low: regroup with the nearest ally, or give
/// ground straight away from the threat when fighting alone.
pub fn plan_retreat(
    ctx: &AiContext<'_>,
    target: &Combatant,
    budget_squares: u32,
) -> Option<Position> {
    defensive(ctx, target, budget_squares)
}

/// Step toward `goal`, diagonal-first, stopping once within
/// `stop_squares` or when the budget runs out.
pub fn direct_toward(
    ctx: &AiContext<'_>,
    goal: Position,
    budget_squares: u32,
    stop_squares: u32,
) -> Option<Position> {
    let mut position = ctx.actor.position;
    let mut budget = budget_squares;

    while budget > 0 && grid::squares_between(position, goal) > stop_squares {
        position = Position::new(
            position.x + (goal.x - position.x).signum(),
            position.y + (goal.y - position.y).signum(),
        );
        budget -= 1;
    }

    legal_destination(ctx, position)
}

/// Step straight away from `threat` until the budget or the map edge
/// stops the line.
pub fn direct_away(
    ctx: &AiContext<'_>,
    threat: Position,
    budget_squares: u32,
) -> Option<Position> {
    let actor = ctx.actor.position;
    let step = (
        (actor.x - threat.x).signum(),
        (actor.y - threat.y).signum(),
    );
    // Overlapping the threat square gives no direction to flee in.
    if step == (0, 0) {
        return None;
    }

    let mut position = actor;
    for _ in 0..budget_squares {
        let next = Position::new(position.x + step.0, position.y + step.1);
        if !ctx.state.map.contains(next) {
            break;
        }
        position = next;
    }

    legal_destination(ctx, position)
}

/// Try the fixed flanking angles around the target and take the first
/// adjacent square reachable within budget; fall back to a direct
/// approach when the whole ring is blocked or out of reach.
fn flank(ctx: &AiContext<'_>, target: &Combatant, budget_squares: u32) -> Option<Position> {
    let approach = compass_index(
        (ctx.actor.position.x - target.position.x).signum(),
        (ctx.actor.position.y - target.position.y).signum(),
    );

    for turn in FLANK_TURNS {
        let (dx, dy) = COMPASS[(approach + turn).rem_euclid(8) as usize];
        let candidate = Position::new(target.position.x + dx, target.position.y + dy);

        if grid::squares_between(ctx.actor.position, candidate) > budget_squares {
            continue;
        }
        if let Some(destination) = legal_destination(ctx, candidate) {
            return Some(destination);
        }
    }

    direct_toward(ctx, target.position, budget_squares, 1)
}

/// Hold the profile's preferred range: back off when crowded, close in
/// when the target drifts too far, sidestep when the range is right.
fn kite(ctx: &AiContext<'_>, target: &Combatant, budget_squares: u32) -> Option<Position> {
    let preferred = ctx.profile.preferred_range_ft / FEET_PER_SQUARE;
    let slack = ctx.config.kite_slack_ft / FEET_PER_SQUARE;
    let distance = grid::squares_between(ctx.actor.position, target.position);

    if distance < preferred {
        direct_away(ctx, target.position, budget_squares)
    } else if distance > preferred + slack {
        direct_toward(ctx, target.position, budget_squares, preferred)
    } else {
        sidestep(ctx, target, budget_squares)
    }
}

/// Lateral move perpendicular to the line to the target, up to the
/// configured sidestep, direction randomized.
fn sidestep(ctx: &AiContext<'_>, target: &Combatant, budget_squares: u32) -> Option<Position> {
    let toward = (
        (target.position.x - ctx.actor.position.x).signum(),
        (target.position.y - ctx.actor.position.y).signum(),
    );
    let mut laterals = [(-toward.1, toward.0), (toward.1, -toward.0)];
    if ctx.dice.pick(ctx.seed(1), 2) == 1 {
        laterals.swap(0, 1);
    }

    let reach = ctx.config.lateral_step_squares.min(budget_squares);
    for (dx, dy) in laterals {
        for span in (1..=reach).rev() {
            let candidate = Position::new(
                ctx.actor.position.x + dx * span as i32,
                ctx.actor.position.y + dy * span as i32,
            );
            if let Some(destination) = legal_destination(ctx, candidate) {
                return Some(destination);
            }
        }
    }
    None
}

/// Close ranks with the nearest living ally, or retreat straight away
/// from the target when no ally remains.
fn defensive(ctx: &AiContext<'_>, target: &Combatant, budget_squares: u32) -> Option<Position> {
    let allies = ctx.allies();
    let nearest_ally = allies.iter().min_by_key(|ally| {
        grid::squares_between(ctx.actor.position, ally.position)
    });

    match nearest_ally {
        Some(ally) => {
            let reach = ctx.config.regroup_step_squares.min(budget_squares);
            direct_toward(ctx, ally.position, reach, 1)
        }
        None => direct_away(ctx, target.position, budget_squares),
    }
}

/// A destination is only worth returning when it moves the actor, stays
/// on the map, and lands on a free square.
fn legal_destination(ctx: &AiContext<'_>, candidate: Position) -> Option<Position> {
    if candidate == ctx.actor.position {
        return None;
    }
    grid::within_bounds(candidate, ctx.state.map)?;
    if grid::is_occupied(candidate, &ctx.state.tokens, Some(ctx.actor.id)) {
        return None;
    }
    Some(candidate)
}

fn compass_index(dx: i32, dy: i32) -> i32 {
    COMPASS
        .iter()
        .position(|&step| step == (dx, dy))
        .unwrap_or(0) as i32
}
