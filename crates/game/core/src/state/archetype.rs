//! Enemy archetypes and observed combat roles.
//!
//! An archetype is resolved once, when a token is spawned, and stored on
//! the token from then on. Nothing downstream ever parses display names
//! again: behavior and stat lookups are exhaustive matches on this enum.

/// Enemy type driving the behavior profile and stat template that apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Archetype {
    Goblin,
    Lancelier,
    Archer,
    Demineur,
    Brute,
    Shaman,
}

impl Archetype {
    /// Returns all archetype variants.
    pub const fn all() -> [Archetype; 6] {
        [
            Archetype::Goblin,
            Archetype::Lancelier,
            Archetype::Archer,
            Archetype::Demineur,
            Archetype::Brute,
            Archetype::Shaman,
        ]
    }

    /// Human-readable label used for token and group display names.
    pub const fn label(self) -> &'static str {
        match self {
            Archetype::Goblin => "Goblin",
            Archetype::Lancelier => "Lancelier",
            Archetype::Archer => "Archer",
            Archetype::Demineur => "Demineur",
            Archetype::Brute => "Brute",
            Archetype::Shaman => "Shaman",
        }
    }

    /// Resolve a free-form token name ("Goblin (x3)", "gobelin chef")
    /// to an archetype. Case-insensitive substring match, applied once
    /// at spawn time; unknown names get no archetype and fall back to
    /// the default behavior profile.
    pub fn resolve(name: &str) -> Option<Archetype> {
        let lowered = name.to_lowercase();
        let matches_any =
            |needles: &[&str]| needles.iter().any(|needle| lowered.contains(needle));

        if matches_any(&["goblin", "gobelin"]) {
            Some(Archetype::Goblin)
        } else if matches_any(&["lancelier", "lancer"]) {
            Some(Archetype::Lancelier)
        } else if matches_any(&["archer", "crossbow", "arbalet"]) {
            Some(Archetype::Archer)
        } else if matches_any(&["demineur", "sapper"]) {
            Some(Archetype::Demineur)
        } else if matches_any(&["brute", "ogre"]) {
            Some(Archetype::Brute)
        } else if matches_any(&["shaman", "chaman"]) {
            Some(Archetype::Shaman)
        } else {
            None
        }
    }
}

/// Role a character has been observed playing, used by the
/// highest-threat targeting rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatRole {
    Healer,
    PrimaryDamage,
    Support,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_matches_substrings_case_insensitively() {
        assert_eq!(Archetype::resolve("Goblin (x3)"), Some(Archetype::Goblin));
        assert_eq!(Archetype::resolve("GOBELIN CHEF"), Some(Archetype::Goblin));
        assert_eq!(
            Archetype::resolve("lancelier royal"),
            Some(Archetype::Lancelier)
        );
        assert_eq!(Archetype::resolve("Chaman des mers"), Some(Archetype::Shaman));
        assert_eq!(Archetype::resolve("Sir Reginald"), None);
    }

    #[test]
    fn every_archetype_has_a_label() {
        for archetype in Archetype::all() {
            assert!(!archetype.label().is_empty());
        }
    }
}
