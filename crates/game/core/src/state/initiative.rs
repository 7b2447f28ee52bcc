use super::{Archetype, EntryId, Faction, TokenId};

/// What an initiative slot stands for: a single linked combatant, or a
/// whole enemy-archetype group sharing one turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntryKind {
    Single { token: TokenId },
    Group { archetype: Archetype },
}

/// One slot in the initiative order.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InitiativeEntry {
    pub id: EntryId,
    /// Group entries carry a live member count, e.g. "Goblin (x3)".
    pub display_name: String,
    pub score: i32,
    pub faction: Faction,
    pub has_acted: bool,
    pub kind: EntryKind,
}

impl InitiativeEntry {
    pub fn is_group(&self) -> bool {
        matches!(self.kind, EntryKind::Group { .. })
    }

    /// The linked combatant for single entries, `None` for groups.
    pub fn linked_token(&self) -> Option<TokenId> {
        match self.kind {
            EntryKind::Single { token } => Some(token),
            EntryKind::Group { .. } => None,
        }
    }

    pub fn archetype(&self) -> Option<Archetype> {
        match self.kind {
            EntryKind::Group { archetype } => Some(archetype),
            EntryKind::Single { .. } => None,
        }
    }
}

/// Roster reference used to build the opening initiative order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InitiativeSeed {
    /// A single combatant rolled this score.
    Token { id: TokenId, score: i32 },
    /// All living members of this archetype share one slot at this score.
    Group { archetype: Archetype, score: i32 },
}

/// Sorts entries descending by score. `sort_by` is stable, so entries
/// that tie keep their insertion order.
pub fn sort_by_score(entries: &mut [InitiativeEntry]) {
    entries.sort_by(|a, b| b.score.cmp(&a.score));
}

/// Index at which a new entry with `score` belongs in a descending
/// order: after every existing entry scoring at least as high. Used for
/// mid-combat insertions so a manually curated order is not re-sorted.
pub fn insertion_index(entries: &[InitiativeEntry], score: i32) -> usize {
    entries
        .iter()
        .position(|entry| entry.score < score)
        .unwrap_or(entries.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u32, score: i32) -> InitiativeEntry {
        InitiativeEntry {
            id: EntryId(id),
            display_name: format!("entry {id}"),
            score,
            faction: Faction::Player,
            has_acted: false,
            kind: EntryKind::Single { token: TokenId(id) },
        }
    }

    #[test]
    fn sort_is_descending_and_stable_under_ties() {
        let mut entries = vec![entry(1, 12), entry(2, 18), entry(3, 12), entry(4, 20)];
        sort_by_score(&mut entries);

        let ids: Vec<u32> = entries.iter().map(|e| e.id.0).collect();
        assert_eq!(ids, vec![4, 2, 1, 3]);
    }

    #[test]
    fn insertion_index_preserves_descending_order() {
        let entries = vec![entry(1, 20), entry(2, 15), entry(3, 10)];
        assert_eq!(insertion_index(&entries, 25), 0);
        assert_eq!(insertion_index(&entries, 15), 2);
        assert_eq!(insertion_index(&entries, 3), 3);
    }
}
