use super::{EntryId, InitiativeEntry};

/// Turn cycle bookkeeping: the initiative order, the current slot, and
/// the round counter.
///
/// While `active`, `current` always references an entry present in
/// `order`. Ending combat resets to a fresh state; no history is kept.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnCycleState {
    pub active: bool,
    pub round: u32,
    pub current: Option<EntryId>,
    pub order: Vec<InitiativeEntry>,
}

impl TurnCycleState {
    pub fn new() -> Self {
        Self {
            active: false,
            round: 1,
            current: None,
            order: Vec::new(),
        }
    }

    pub fn entry(&self, id: EntryId) -> Option<&InitiativeEntry> {
        self.order.iter().find(|entry| entry.id == id)
    }

    pub fn entry_mut(&mut self, id: EntryId) -> Option<&mut InitiativeEntry> {
        self.order.iter_mut().find(|entry| entry.id == id)
    }

    pub fn position_of(&self, id: EntryId) -> Option<usize> {
        self.order.iter().position(|entry| entry.id == id)
    }

    pub fn current_entry(&self) -> Option<&InitiativeEntry> {
        self.current.and_then(|id| self.entry(id))
    }
}

impl Default for TurnCycleState {
    fn default() -> Self {
        Self::new()
    }
}
