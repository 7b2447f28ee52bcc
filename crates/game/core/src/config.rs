/// Combat rule constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatConfig {
    /// Distance at or under which an attack counts as melee, in feet.
    pub melee_range_ft: u32,
    /// Maximum useful range for ranged attackers, in feet. Beyond this the
    /// arbiter closes distance instead of shooting.
    pub ranged_max_ft: u32,
    /// Slack band on top of a kiter's preferred range before it closes in,
    /// in feet.
    pub kite_slack_ft: u32,
    /// Maximum sidestep while holding range, in squares.
    pub lateral_step_squares: u32,
    /// Maximum step toward an ally when regrouping defensively, in squares.
    pub regroup_step_squares: u32,
}

impl CombatConfig {
    // ===== compile-time constants used as type parameters =====
    /// Maximum ability slots tracked per combatant.
    pub const MAX_ABILITIES: usize = 4;
    /// Maximum concurrent status effects per combatant.
    pub const MAX_STATUS_EFFECTS: usize = 8;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_MELEE_RANGE_FT: u32 = 5;
    pub const DEFAULT_RANGED_MAX_FT: u32 = 30;
    pub const DEFAULT_KITE_SLACK_FT: u32 = 10;
    pub const DEFAULT_LATERAL_STEP_SQUARES: u32 = 2;
    pub const DEFAULT_REGROUP_STEP_SQUARES: u32 = 2;

    pub fn new() -> Self {
        Self {
            melee_range_ft: Self::DEFAULT_MELEE_RANGE_FT,
            ranged_max_ft: Self::DEFAULT_RANGED_MAX_FT,
            kite_slack_ft: Self::DEFAULT_KITE_SLACK_FT,
            lateral_step_squares: Self::DEFAULT_LATERAL_STEP_SQUARES,
            regroup_step_squares: Self::DEFAULT_REGROUP_STEP_SQUARES,
        }
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self::new()
    }
}
