//! Turn cycle transitions: combat start and end, turn advancement,
//! manual reordering, and the cleanup pass that prunes defeated slots.

use crate::state::{
    Archetype, EntryId, EntryKind, InitiativeEntry, InitiativeSeed, TokenId, TurnCycleState,
    sort_by_score,
};

use super::CombatEngine;

/// Errors that can occur during turn cycle operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TurnError {
    #[error("initiative order is empty")]
    EmptyOrder,

    #[error("combat is not active")]
    Inactive,

    #[error("combat is already active")]
    AlreadyActive,

    #[error("token {0} is not in the roster")]
    UnknownToken(TokenId),

    #[error("no living {0} members to seed a group slot")]
    EmptyGroup(Archetype),

    #[error("reorder must reference every existing entry exactly once")]
    OrderMismatch,
}

/// Result of one successful turn advance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdvanceReport {
    pub current: EntryId,
    pub round: u32,
    /// True when the advance crossed the end of the order and started a
    /// new round.
    pub wrapped: bool,
}

impl CombatEngine<'_> {
    /// Start combat from roster seeds. The order is sorted descending
    /// by score (stable, so tied seeds keep their given order) and the
    /// highest roll acts first.
    pub fn start_combat(&mut self, seeds: Vec<InitiativeSeed>) -> Result<(), TurnError> {
        if self.state.turn.active {
            return Err(TurnError::AlreadyActive);
        }
        if seeds.is_empty() {
            return Err(TurnError::EmptyOrder);
        }

        let mut order = Vec::with_capacity(seeds.len());
        for seed in seeds {
            order.push(self.build_entry(seed)?);
        }
        sort_by_score(&mut order);

        let first = order[0].id;
        self.state.turn = TurnCycleState {
            active: true,
            round: 1,
            current: Some(first),
            order,
        };
        Ok(())
    }

    fn build_entry(&mut self, seed: InitiativeSeed) -> Result<InitiativeEntry, TurnError> {
        match seed {
            InitiativeSeed::Token { id, score } => {
                let token = self.state.token(id).ok_or(TurnError::UnknownToken(id))?;
                let (display_name, faction) = (token.name.clone(), token.faction);
                Ok(InitiativeEntry {
                    id: self.state.allocate_entry_id(),
                    display_name,
                    score,
                    faction,
                    has_acted: false,
                    kind: EntryKind::Single { token: id },
                })
            }
            InitiativeSeed::Group { archetype, score } => {
                let count = self.state.group_members(archetype).count();
                if count == 0 {
                    return Err(TurnError::EmptyGroup(archetype));
                }
                Ok(InitiativeEntry {
                    id: self.state.allocate_entry_id(),
                    display_name: group_label(archetype, count),
                    score,
                    faction: crate::state::Faction::Enemy,
                    has_acted: false,
                    kind: EntryKind::Group { archetype },
                })
            }
        }
    }

    /// Advance to the next turn.
    ///
    /// Runs the cleanup pass first. If cleanup had to hand the current
    /// slot to its successor (the current entry was pruned), that
    /// successor *is* the next turn and no further step is taken.
    /// Otherwise the current entry is marked as having acted and the
    /// pointer moves on; crossing the end of the order increments the
    /// round, resets the acted flags, and ticks ability cooldowns.
    pub fn advance_turn(&mut self) -> Result<AdvanceReport, TurnError> {
        if !self.state.turn.active {
            return Err(TurnError::Inactive);
        }

        let (_, relocated) = self.cleanup_order();
        if self.state.turn.order.is_empty() {
            self.end_combat();
            return Err(TurnError::EmptyOrder);
        }

        if relocated {
            // Skip-removed semantics: cleanup already picked the next
            // valid slot.
            let current = self.state.turn.current.ok_or(TurnError::EmptyOrder)?;
            return Ok(AdvanceReport {
                current,
                round: self.state.turn.round,
                wrapped: false,
            });
        }

        let current = self.state.turn.current.ok_or(TurnError::EmptyOrder)?;
        let index = self
            .state
            .turn
            .position_of(current)
            .ok_or(TurnError::EmptyOrder)?;

        self.state.turn.order[index].has_acted = true;

        let next_index = index + 1;
        if next_index < self.state.turn.order.len() {
            let next = self.state.turn.order[next_index].id;
            self.state.turn.current = Some(next);
            Ok(AdvanceReport {
                current: next,
                round: self.state.turn.round,
                wrapped: false,
            })
        } else {
            self.state.turn.round += 1;
            for entry in &mut self.state.turn.order {
                entry.has_acted = false;
            }
            self.tick_ability_cooldowns();

            let first = self.state.turn.order[0].id;
            self.state.turn.current = Some(first);
            Ok(AdvanceReport {
                current: first,
                round: self.state.turn.round,
                wrapped: true,
            })
        }
    }

    /// End combat and reset to a fresh cycle. All in-flight
    /// continuations (pending actions, storm) are cleared in the same
    /// step so nothing resolves against a dead encounter.
    pub fn end_combat(&mut self) {
        self.state.turn = TurnCycleState::new();
        self.state.clear_continuations();
    }

    /// Replace the order wholesale with a manual arrangement. The new
    /// sequence must be a permutation of the existing entry ids.
    pub fn reorder(&mut self, new_order: Vec<EntryId>) -> Result<(), TurnError> {
        if new_order.len() != self.state.turn.order.len() {
            return Err(TurnError::OrderMismatch);
        }

        let mut reordered = Vec::with_capacity(new_order.len());
        for id in &new_order {
            let index = self
                .state
                .turn
                .position_of(*id)
                .ok_or(TurnError::OrderMismatch)?;
            if reordered.iter().any(|entry: &InitiativeEntry| entry.id == *id) {
                return Err(TurnError::OrderMismatch);
            }
            reordered.push(self.state.turn.order[index].clone());
        }

        self.state.turn.order = reordered;
        Ok(())
    }

    /// Cleanup pass: drop group slots with no living members and single
    /// slots whose token left the roster, then refresh group counts in
    /// display names.
    ///
    /// Returns the pruned entry ids and whether the current slot had to
    /// be handed to its successor.
    pub(crate) fn cleanup_order(&mut self) -> (Vec<EntryId>, bool) {
        let mut removed = Vec::new();
        let mut relocated = false;

        let keep: Vec<bool> = self
            .state
            .turn
            .order
            .iter()
            .map(|entry| match entry.kind {
                EntryKind::Group { archetype } => {
                    self.state.group_members(archetype).next().is_some()
                }
                EntryKind::Single { token } => self.state.token(token).is_some(),
            })
            .collect();

        let mut index = 0;
        for keep_entry in keep {
            if keep_entry {
                index += 1;
                continue;
            }
            let entry = self.state.turn.order.remove(index);
            if self.state.turn.current == Some(entry.id) {
                // Hand the slot to whoever was next; wraps to the front.
                self.state.turn.current = if self.state.turn.order.is_empty() {
                    None
                } else {
                    let successor = index % self.state.turn.order.len();
                    Some(self.state.turn.order[successor].id)
                };
                relocated = true;
            }
            removed.push(entry.id);
        }

        self.refresh_group_labels();
        (removed, relocated)
    }

    /// Rewrite group display names with their live member counts.
    pub(crate) fn refresh_group_labels(&mut self) {
        let counts: Vec<(usize, Archetype, usize)> = self
            .state
            .turn
            .order
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                entry
                    .archetype()
                    .map(|archetype| (index, archetype, self.state.group_members(archetype).count()))
            })
            .collect();

        for (index, archetype, count) in counts {
            self.state.turn.order[index].display_name = group_label(archetype, count);
        }
    }

    fn tick_ability_cooldowns(&mut self) {
        for token in &mut self.state.tokens {
            for ability in &mut token.abilities {
                ability.tick();
            }
        }
    }
}

fn group_label(archetype: Archetype, count: usize) -> String {
    format!("{} (x{})", archetype.label(), count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::MapBounds;
    use crate::state::{Combatant, Faction, Position, SessionState};

    fn session_with_tokens(count: u32) -> SessionState {
        let mut state = SessionState::new(MapBounds::new(20, 20));
        for index in 0..count {
            let id = state.allocate_token_id();
            state.tokens.push(Combatant::test_token(
                id,
                Faction::Player,
                Position::new(index as i32, 0),
            ));
        }
        state
    }

    fn seeds(state: &SessionState, scores: &[i32]) -> Vec<InitiativeSeed> {
        state
            .tokens
            .iter()
            .zip(scores)
            .map(|(token, score)| InitiativeSeed::Token {
                id: token.id,
                score: *score,
            })
            .collect()
    }

    #[test]
    fn start_rejects_empty_order() {
        let mut state = session_with_tokens(0);
        let mut engine = CombatEngine::new(&mut state);
        assert_eq!(engine.start_combat(Vec::new()), Err(TurnError::EmptyOrder));
        assert!(!state.turn.active);
    }

    #[test]
    fn start_sorts_descending_by_score() {
        let mut state = session_with_tokens(2);
        let order = seeds(&state, &[15, 20]);
        let mut engine = CombatEngine::new(&mut state);
        engine.start_combat(order).unwrap();

        // The 20 acts first despite arriving second.
        let current = state.turn.current_entry().unwrap();
        assert_eq!(current.score, 20);
        assert_eq!(state.turn.round, 1);
    }

    #[test]
    fn advancing_through_the_order_wraps_and_counts_rounds() {
        let mut state = session_with_tokens(3);
        let order = seeds(&state, &[18, 14, 10]);
        {
            let mut engine = CombatEngine::new(&mut state);
            engine.start_combat(order).unwrap();
        }

        // Advancing N times through an M-entry order yields round
        // 1 + N / M.
        for advance in 1..=7 {
            let mut engine = CombatEngine::new(&mut state);
            let report = engine.advance_turn().unwrap();
            assert_eq!(report.round, 1 + advance / 3);
        }
        assert_eq!(state.turn.round, 3);
        let current = state.turn.current_entry().unwrap();
        assert_eq!(current.score, 14);
    }

    #[test]
    fn advance_while_inactive_is_rejected() {
        let mut state = session_with_tokens(1);
        let mut engine = CombatEngine::new(&mut state);
        assert_eq!(engine.advance_turn(), Err(TurnError::Inactive));
    }

    #[test]
    fn end_combat_resets_and_clears_continuations() {
        let mut state = session_with_tokens(2);
        let order = seeds(&state, &[12, 9]);
        let mut engine = CombatEngine::new(&mut state);
        engine.start_combat(order).unwrap();
        engine.end_combat();

        assert!(!state.turn.active);
        assert_eq!(state.turn.round, 1);
        assert_eq!(state.turn.current, None);
        assert!(state.turn.order.is_empty());
        assert!(state.pending_actions.is_empty());
        assert!(state.storm.is_none());
    }

    #[test]
    fn reorder_requires_a_permutation() {
        let mut state = session_with_tokens(2);
        let order = seeds(&state, &[12, 9]);
        let mut engine = CombatEngine::new(&mut state);
        engine.start_combat(order).unwrap();

        let ids: Vec<EntryId> = state.turn.order.iter().map(|entry| entry.id).collect();
        let reversed: Vec<EntryId> = ids.iter().rev().copied().collect();

        let mut engine = CombatEngine::new(&mut state);
        assert_eq!(
            engine.reorder(vec![reversed[0]]),
            Err(TurnError::OrderMismatch)
        );
        assert_eq!(
            engine.reorder(vec![reversed[0], reversed[0]]),
            Err(TurnError::OrderMismatch)
        );
        engine.reorder(reversed.clone()).unwrap();
        let now: Vec<EntryId> = state.turn.order.iter().map(|entry| entry.id).collect();
        assert_eq!(now, reversed);
    }
}
