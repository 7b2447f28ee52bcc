//! Movement request validation.

use crate::grid;
use crate::state::{Position, TokenId};

use super::CombatEngine;

/// Errors that can occur validating a movement request.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("token {0} is not in the roster")]
    UnknownToken(TokenId),

    #[error("destination {0} is outside the map")]
    OutOfBounds(Position),

    #[error("destination {0} is already occupied")]
    Occupied(Position),

    #[error("destination is {needed_ft}ft away but the token moves {speed_ft}ft")]
    OutOfRange { needed_ft: u32, speed_ft: u32 },
}

impl CombatEngine<'_> {
    /// Validate and apply one movement request. On any failure the
    /// position is left untouched.
    pub fn request_move(&mut self, id: TokenId, destination: Position) -> Result<(), MoveError> {
        let token = self.state.token(id).ok_or(MoveError::UnknownToken(id))?;

        grid::within_bounds(destination, self.state.map)
            .ok_or(MoveError::OutOfBounds(destination))?;

        let needed_ft = grid::distance_feet(token.position, destination);
        if needed_ft > token.movement_speed {
            return Err(MoveError::OutOfRange {
                needed_ft,
                speed_ft: token.movement_speed,
            });
        }

        if grid::is_occupied(destination, &self.state.tokens, Some(id)) {
            return Err(MoveError::Occupied(destination));
        }

        self.state
            .token_mut(id)
            .ok_or(MoveError::UnknownToken(id))?
            .position = destination;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::MapBounds;
    use crate::state::{Combatant, Faction, SessionState};

    fn session() -> SessionState {
        let mut state = SessionState::new(MapBounds::new(12, 12));
        let id = state.allocate_token_id();
        state
            .tokens
            .push(Combatant::test_token(id, Faction::Player, Position::new(2, 2)));
        let other = state.allocate_token_id();
        state
            .tokens
            .push(Combatant::test_token(other, Faction::Enemy, Position::new(5, 2)));
        state
    }

    #[test]
    fn legal_move_is_applied() {
        let mut state = session();
        let mover = state.tokens[0].id;
        let mut engine = CombatEngine::new(&mut state);
        engine.request_move(mover, Position::new(6, 6)).unwrap();
        assert_eq!(state.tokens[0].position, Position::new(6, 6));
    }

    #[test]
    fn illegal_moves_leave_position_unchanged() {
        let mut state = session();
        let mover = state.tokens[0].id;

        // Speed 30 covers 6 squares; (9, 2) is 7 away.
        let mut engine = CombatEngine::new(&mut state);
        assert!(matches!(
            engine.request_move(mover, Position::new(9, 2)),
            Err(MoveError::OutOfRange { .. })
        ));
        let mut engine = CombatEngine::new(&mut state);
        assert!(matches!(
            engine.request_move(mover, Position::new(5, 2)),
            Err(MoveError::Occupied(_))
        ));
        let mut engine = CombatEngine::new(&mut state);
        assert!(matches!(
            engine.request_move(mover, Position::new(-1, 2)),
            Err(MoveError::OutOfBounds(_))
        ));
        assert_eq!(state.tokens[0].position, Position::new(2, 2));
    }
}
