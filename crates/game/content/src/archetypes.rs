//! Archetype stat templates.
//!
//! One template per archetype: hit points, armor, speed, weapon attacks,
//! and rechargeable abilities. Spawning paths in the engine pull these
//! through the [`ArchetypeOracle`] seam.

use encounter_core::{
    AbilityProfile, Archetype, ArchetypeOracle, ArchetypeTemplate, AttackProfile,
};

const GOBLIN: ArchetypeTemplate = ArchetypeTemplate {
    label: "Goblin",
    max_hp: 7,
    armor_class: 13,
    movement_speed: 30,
    melee: AttackProfile {
        name: "Scimitar",
        range_ft: 5,
        to_hit_bonus: 4,
        damage_expr: "1d6+2",
    },
    ranged: Some(AttackProfile {
        name: "Shortbow",
        range_ft: 60,
        to_hit_bonus: 4,
        damage_expr: "1d6+2",
    }),
    abilities: &[],
};

const LANCELIER: ArchetypeTemplate = ArchetypeTemplate {
    label: "Lancelier",
    max_hp: 22,
    armor_class: 15,
    movement_speed: 25,
    melee: AttackProfile {
        name: "Lance",
        range_ft: 10,
        to_hit_bonus: 5,
        damage_expr: "1d10+3",
    },
    ranged: None,
    abilities: &[AbilityProfile {
        name: "Piercing Charge",
        range_ft: 10,
        recharge_rounds: 3,
        to_hit_bonus: 5,
        damage_expr: "2d10+3",
    }],
};

const ARCHER: ArchetypeTemplate = ArchetypeTemplate {
    label: "Archer",
    max_hp: 16,
    armor_class: 14,
    movement_speed: 30,
    melee: AttackProfile {
        name: "Dagger",
        range_ft: 5,
        to_hit_bonus: 3,
        damage_expr: "1d4+1",
    },
    ranged: Some(AttackProfile {
        name: "Longbow",
        range_ft: 60,
        to_hit_bonus: 5,
        damage_expr: "1d8+3",
    }),
    abilities: &[],
};

const DEMINEUR: ArchetypeTemplate = ArchetypeTemplate {
    label: "Demineur",
    max_hp: 13,
    armor_class: 12,
    movement_speed: 25,
    melee: AttackProfile {
        name: "Pick",
        range_ft: 5,
        to_hit_bonus: 3,
        damage_expr: "1d8+1",
    },
    ranged: None,
    abilities: &[],
};

const BRUTE: ArchetypeTemplate = ArchetypeTemplate {
    label: "Brute",
    max_hp: 45,
    armor_class: 14,
    movement_speed: 25,
    melee: AttackProfile {
        name: "Greatclub",
        range_ft: 5,
        to_hit_bonus: 6,
        damage_expr: "2d8+4",
    },
    ranged: None,
    abilities: &[AbilityProfile {
        name: "Smash",
        range_ft: 5,
        recharge_rounds: 2,
        to_hit_bonus: 6,
        damage_expr: "3d8+4",
    }],
};

const SHAMAN: ArchetypeTemplate = ArchetypeTemplate {
    label: "Shaman",
    max_hp: 27,
    armor_class: 12,
    movement_speed: 25,
    melee: AttackProfile {
        name: "Staff",
        range_ft: 5,
        to_hit_bonus: 2,
        damage_expr: "1d6",
    },
    ranged: Some(AttackProfile {
        name: "Firebolt",
        range_ft: 60,
        to_hit_bonus: 5,
        damage_expr: "1d10",
    }),
    abilities: &[AbilityProfile {
        name: "Hex",
        range_ft: 60,
        recharge_rounds: 3,
        to_hit_bonus: 5,
        damage_expr: "2d8",
    }],
};

/// Compiled-in archetype data.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentArchetypes;

impl ArchetypeOracle for ContentArchetypes {
    fn template(&self, archetype: Archetype) -> Option<&'static ArchetypeTemplate> {
        Some(match archetype {
            Archetype::Goblin => &GOBLIN,
            Archetype::Lancelier => &LANCELIER,
            Archetype::Archer => &ARCHER,
            Archetype::Demineur => &DEMINEUR,
            Archetype::Brute => &BRUTE,
            Archetype::Shaman => &SHAMAN,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_archetype_has_a_template() {
        let oracle = ContentArchetypes;
        for archetype in Archetype::all() {
            let template = oracle.template(archetype).expect("template missing");
            assert!(template.max_hp > 0);
            assert!(template.movement_speed >= 25);
            assert_eq!(template.label, archetype.label());
        }
    }

    #[test]
    fn ranged_profiles_outrange_melee() {
        let oracle = ContentArchetypes;
        for archetype in Archetype::all() {
            let template = oracle.template(archetype).unwrap();
            if let Some(ranged) = template.ranged {
                assert!(ranged.range_ft > template.melee.range_ft);
            }
        }
    }
}
