use super::{Archetype, MineId, Position, RollId, TokenId};

/// Parameters for placing a new mine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MineSpec {
    pub position: Position,
    pub damage: u32,
    /// Blast radius in feet; every square within `radius / 5` squares
    /// (Chebyshev, inclusive) is hit.
    pub aoe_radius_ft: u32,
    /// Archetype of the enemy that crawls out of the crater.
    pub spawns: Archetype,
}

/// An armed mine on the map.
///
/// `triggered` is terminal: once set, the mine never fires again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mine {
    pub id: MineId,
    pub position: Position,
    pub detected: bool,
    pub triggered: bool,
    pub damage: u32,
    pub aoe_radius_ft: u32,
    pub spawns: Archetype,
}

impl Mine {
    pub fn from_spec(id: MineId, spec: MineSpec) -> Self {
        Self {
            id,
            position: spec.position,
            detected: false,
            triggered: false,
            damage: spec.damage,
            aoe_radius_ft: spec.aoe_radius_ft,
            spawns: spec.spawns,
        }
    }
}

/// A running storm hazard. Advances one tick per invocation and
/// self-terminates when `remaining_rounds` reaches zero or no valid
/// enemy targets remain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StormState {
    pub active: bool,
    pub round: u32,
    pub total_rounds: u32,
    pub remaining_rounds: u32,
    /// Effect stacks the storm was invoked with; scales nothing in the
    /// core, carried for the damage-confirmation step.
    pub originating_stacks: u32,
}

impl StormState {
    pub fn new(total_rounds: u32, originating_stacks: u32) -> Self {
        Self {
            active: true,
            round: 1,
            total_rounds,
            remaining_rounds: total_rounds,
            originating_stacks,
        }
    }
}

/// One storm strike awaiting externally supplied damage.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PendingStormRoll {
    pub id: RollId,
    pub round: u32,
    pub target: TokenId,
    pub target_name: String,
}
