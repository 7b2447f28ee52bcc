//! Decision output types for the enemy AI.

use encounter_core::{AbilityProfile, AttackProfile, Position, TokenId};

/// One rolled attack or ability, carried from decision to the pending
/// action it becomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackSpec {
    pub name: String,
    pub range_ft: u32,
    pub to_hit_bonus: i32,
    pub damage_expr: String,
}

impl AttackSpec {
    pub fn from_attack(profile: &AttackProfile) -> Self {
        Self {
            name: profile.name.to_string(),
            range_ft: profile.range_ft,
            to_hit_bonus: profile.to_hit_bonus,
            damage_expr: profile.damage_expr.to_string(),
        }
    }

    pub fn from_ability(profile: &AbilityProfile) -> Self {
        Self {
            name: profile.name.to_string(),
            range_ft: profile.range_ft,
            to_hit_bonus: profile.to_hit_bonus,
            damage_expr: profile.damage_expr.to_string(),
        }
    }
}

/// One decision for one acting combatant. Ephemeral: produced by the
/// arbiter, consumed by the session worker, never persisted beyond the
/// pending action it may generate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionIntent {
    /// Nothing worth doing; the turn still advances.
    Hold,
    Move {
        from: Position,
        to: Position,
    },
    Attack {
        target: TokenId,
        attack: AttackSpec,
    },
    Ability {
        target: TokenId,
        ability: AttackSpec,
        recharge_rounds: u8,
    },
    /// Movement applies immediately; the attack is queued as a pending
    /// action awaiting damage confirmation.
    MoveThenAttack {
        from: Position,
        to: Position,
        target: TokenId,
        attack: AttackSpec,
    },
}
