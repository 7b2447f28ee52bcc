//! Static content: archetype stat templates and behavior profiles.
//!
//! `encounter-content` is the data half of the rules: it implements the
//! oracle seams `encounter-core` declares and owns the per-archetype
//! behavior catalog the AI reads. Everything here is compiled in and
//! immutable at runtime.
pub mod archetypes;
pub mod behavior;

pub use archetypes::ContentArchetypes;
pub use behavior::{
    Aggression, AttackPreference, BehaviorProfile, BehaviorTag, MovementPattern, TargetPriority,
    profile,
};
