//! Behavior catalog: per-archetype decision profiles for the enemy AI.
//!
//! A profile answers four questions: whom to hit (target priority), how
//! to get there (movement pattern), what to swing (attack preference
//! and ability policy), and when to give ground (retreat threshold).
//! Profiles are static; the AI layer resolves one per acting archetype
//! and falls back to [`DEFAULT`] for tokens with no recognized
//! archetype.

use encounter_core::Archetype;

/// How hard the archetype presses the attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Aggression {
    Low,
    Moderate,
    High,
    /// Never retreats, never hesitates.
    Berserk,
}

/// Target picking rule. First match wins; there is no blending.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetPriority {
    /// The opponent with the least current hp.
    LowestHp,
    /// The closest opponent.
    Nearest,
    /// Opponents observed as healers or primary damage first, nearest
    /// among those; plain nearest when no role is known.
    HighestThreat,
    /// The opponent with the lowest estimated armor.
    WeakestArmor,
    /// A uniformly random opponent.
    Random,
}

/// How the archetype closes (or opens) distance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MovementPattern {
    /// Straight at the target, diagonal-first.
    Direct,
    /// Circle to a side or rear square of the target.
    Flanking,
    /// Hold preferred range, sidestepping when already there.
    Kiting,
    /// Stay near allies; retreat when alone.
    Defensive,
}

/// Which weapon class the archetype reaches for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttackPreference {
    Melee,
    Ranged,
    Mixed,
}

/// Flavor tags for special handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BehaviorTag {
    PackHunter,
    Skirmisher,
    Unshakeable,
    Detonator,
    SpellWeaver,
}

/// One archetype's complete decision profile. Immutable at runtime.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BehaviorProfile {
    pub aggression: Aggression,
    pub target_priority: TargetPriority,
    pub movement: MovementPattern,
    pub attack: AttackPreference,
    /// Distance the archetype tries to fight at, in feet.
    pub preferred_range_ft: u32,
    /// Hp fraction below which the archetype gives ground.
    pub retreat_threshold: f32,
    /// Reach for abilities before weapons when one is ready.
    pub prefers_abilities: bool,
    /// Ability names in the order the arbiter should try them.
    pub ability_priority: &'static [&'static str],
    pub tags: &'static [BehaviorTag],
    /// Reserved decision-noise scalar in `[0.0, 1.0]`; carried in the
    /// profile but not yet consulted.
    pub smartness: f32,
}

/// Fallback profile for tokens with no recognized archetype.
pub const DEFAULT: BehaviorProfile = BehaviorProfile {
    aggression: Aggression::Moderate,
    target_priority: TargetPriority::Nearest,
    movement: MovementPattern::Direct,
    attack: AttackPreference::Mixed,
    preferred_range_ft: 5,
    retreat_threshold: 0.25,
    prefers_abilities: false,
    ability_priority: &[],
    tags: &[],
    smartness: 0.5,
};

const GOBLIN: BehaviorProfile = BehaviorProfile {
    aggression: Aggression::High,
    target_priority: TargetPriority::Nearest,
    movement: MovementPattern::Direct,
    attack: AttackPreference::Melee,
    preferred_range_ft: 5,
    retreat_threshold: 0.2,
    prefers_abilities: false,
    ability_priority: &[],
    tags: &[BehaviorTag::PackHunter],
    smartness: 0.3,
};

const LANCELIER: BehaviorProfile = BehaviorProfile {
    aggression: Aggression::High,
    target_priority: TargetPriority::LowestHp,
    movement: MovementPattern::Flanking,
    attack: AttackPreference::Melee,
    preferred_range_ft: 10,
    retreat_threshold: 0.15,
    prefers_abilities: true,
    ability_priority: &["Piercing Charge"],
    tags: &[],
    smartness: 0.6,
};

const ARCHER: BehaviorProfile = BehaviorProfile {
    aggression: Aggression::Moderate,
    target_priority: TargetPriority::WeakestArmor,
    movement: MovementPattern::Kiting,
    attack: AttackPreference::Ranged,
    preferred_range_ft: 30,
    retreat_threshold: 0.3,
    prefers_abilities: false,
    ability_priority: &[],
    tags: &[BehaviorTag::Skirmisher],
    smartness: 0.7,
};

const DEMINEUR: BehaviorProfile = BehaviorProfile {
    aggression: Aggression::Moderate,
    target_priority: TargetPriority::Nearest,
    movement: MovementPattern::Defensive,
    attack: AttackPreference::Melee,
    preferred_range_ft: 5,
    retreat_threshold: 0.35,
    prefers_abilities: false,
    ability_priority: &[],
    tags: &[BehaviorTag::Detonator],
    smartness: 0.4,
};

const BRUTE: BehaviorProfile = BehaviorProfile {
    aggression: Aggression::Berserk,
    target_priority: TargetPriority::Random,
    movement: MovementPattern::Direct,
    attack: AttackPreference::Melee,
    preferred_range_ft: 5,
    retreat_threshold: 0.0,
    prefers_abilities: true,
    ability_priority: &["Smash"],
    tags: &[BehaviorTag::Unshakeable],
    smartness: 0.2,
};

const SHAMAN: BehaviorProfile = BehaviorProfile {
    aggression: Aggression::Low,
    target_priority: TargetPriority::HighestThreat,
    movement: MovementPattern::Kiting,
    attack: AttackPreference::Ranged,
    preferred_range_ft: 30,
    retreat_threshold: 0.4,
    prefers_abilities: true,
    ability_priority: &["Hex"],
    tags: &[BehaviorTag::SpellWeaver, BehaviorTag::Skirmisher],
    smartness: 0.8,
};

/// Look up the profile for an archetype; `None` gets the default.
pub fn profile(archetype: Option<Archetype>) -> &'static BehaviorProfile {
    match archetype {
        Some(Archetype::Goblin) => &GOBLIN,
        Some(Archetype::Lancelier) => &LANCELIER,
        Some(Archetype::Archer) => &ARCHER,
        Some(Archetype::Demineur) => &DEMINEUR,
        Some(Archetype::Brute) => &BRUTE,
        Some(Archetype::Shaman) => &SHAMAN,
        None => &DEFAULT,
    }
}
