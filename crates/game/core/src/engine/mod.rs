//! State mutation engine.
//!
//! Every mutation of a [`SessionState`] flows through [`CombatEngine`]:
//! turn cycle transitions, roster changes, validated movement, and
//! hazard resolution. The engine borrows the state for the duration of
//! one operation; callers that need all-or-nothing semantics run it
//! against a working clone and commit on success.
mod hazards;
mod movement;
mod roster;
mod turns;

pub use hazards::{HazardError, MineBlast, StormStrikeReport, StormTick};
pub use movement::MoveError;
pub use roster::{DamageReport, RosterError, TokenSpec};
pub use turns::{AdvanceReport, TurnError};

use crate::state::SessionState;

/// Mutation engine over one combat session.
pub struct CombatEngine<'a> {
    state: &'a mut SessionState,
}

impl<'a> CombatEngine<'a> {
    pub fn new(state: &'a mut SessionState) -> Self {
        Self { state }
    }

    /// Read access to the underlying session.
    pub fn state(&self) -> &SessionState {
        self.state
    }
}
