use super::{ActionId, TokenId};

/// An attack or ability that has been rolled but awaits externally
/// supplied damage before it affects hp.
///
/// Created when the AI (or a player) commits to an attack; mutated by
/// the damage-confirmation step; kept until `damage_applied` so the
/// confirmation is resumable across restarts from the session document
/// alone.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PendingAction {
    pub id: ActionId,
    pub actor: TokenId,
    pub actor_name: String,
    pub target: Option<TokenId>,
    pub target_name: Option<String>,
    /// Attack or ability name, e.g. "Scimitar" or "Hex".
    pub ability_name: String,
    /// Dice expression the confirmation step rolls, e.g. "1d6+2".
    pub damage_expr: String,
    pub to_hit_roll: i32,
    pub hit: Option<bool>,
    pub damage: Option<u32>,
    pub resolved: bool,
    pub damage_applied: bool,
    pub is_enemy_action: bool,
}

impl PendingAction {
    pub fn is_outstanding(&self) -> bool {
        !self.resolved
    }
}
