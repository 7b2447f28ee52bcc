//! Target selection.
//!
//! Applies exactly the profile's declared priority rule, first match
//! wins, no blending. Ties resolve to the earliest token in roster
//! order so decisions replay deterministically.

use encounter_core::{Combatant, env::DEFAULT_ARMOR_ESTIMATE, grid};
use encounter_content::TargetPriority;

use super::context::AiContext;

/// Pick the best target for the acting combatant, or `None` when no
/// living opponent exists (the caller degrades to a hold intent).
pub fn select<'a>(ctx: &AiContext<'a>) -> Option<&'a Combatant> {
    let opponents = ctx.opponents();
    if opponents.is_empty() {
        return None;
    }

    let picked = match ctx.profile.target_priority {
        TargetPriority::LowestHp => min_by_key_stable(&opponents, |token| token.hp.current),
        TargetPriority::Nearest => nearest(ctx, &opponents),
        TargetPriority::HighestThreat => highest_threat(ctx, &opponents),
        TargetPriority::WeakestArmor => {
            min_by_key_stable(&opponents, |token| estimated_armor(ctx, token))
        }
        TargetPriority::Random => {
            opponents[ctx.dice.pick(ctx.seed(0), opponents.len())]
        }
    };
    Some(picked)
}

fn nearest<'a>(ctx: &AiContext<'a>, opponents: &[&'a Combatant]) -> &'a Combatant {
    min_by_key_stable(opponents, |token| {
        grid::distance_feet(ctx.actor.position, token.position)
    })
}

/// Role-based threat: observed healers and primary damage dealers score
/// higher; nearest among the top scorers breaks ties, and with no role
/// information at all this degrades to plain nearest.
fn highest_threat<'a>(ctx: &AiContext<'a>, opponents: &[&'a Combatant]) -> &'a Combatant {
    let best = opponents
        .iter()
        .map(|token| threat_bonus(token))
        .max()
        .unwrap_or(0);
    if best == 0 {
        return nearest(ctx, opponents);
    }

    let top: Vec<&Combatant> = opponents
        .iter()
        .copied()
        .filter(|token| threat_bonus(token) == best)
        .collect();
    nearest(ctx, &top)
}

fn threat_bonus(token: &Combatant) -> u32 {
    use encounter_core::CombatRole;
    match token.role {
        Some(CombatRole::Healer) => 2,
        Some(CombatRole::PrimaryDamage) => 2,
        Some(CombatRole::Support) => 1,
        None => 0,
    }
}

/// Armor as the AI believes it to be: the archetype lookup for known
/// enemy types, a flat default for everyone else. The true armor class
/// on the token is deliberately not consulted.
fn estimated_armor(ctx: &AiContext<'_>, token: &Combatant) -> u32 {
    token
        .archetype
        .map(|archetype| ctx.archetypes.armor_estimate(archetype))
        .unwrap_or(DEFAULT_ARMOR_ESTIMATE)
}

/// `Iterator::min_by_key` keeps the *last* minimum on ties; target
/// selection wants the first, so ties stay stable under roster order.
fn min_by_key_stable<'a, K: Ord>(
    tokens: &[&'a Combatant],
    mut key: impl FnMut(&Combatant) -> K,
) -> &'a Combatant {
    let mut best = tokens[0];
    let mut best_key = key(best);
    for token in &tokens[1..] {
        let candidate = key(token);
        if candidate < best_key {
            best = *token;
            best_key = candidate;
        }
    }
    best
}
