//! Utility enemy AI: behavior-profile-driven decisions.
//!
//! One decision per enemy turn, in three steps mirroring the profile
//! fields: pick a target ([`target`]), arbitrate an intent
//! ([`arbiter`]), and plan any movement the intent needs
//! ([`movement`]). All randomness draws through the deterministic dice
//! oracle, keyed off the session document's seed and nonce.
pub mod arbiter;
pub mod context;
pub mod movement;
pub mod target;
mod types;

pub use context::AiContext;
pub use types::{ActionIntent, AttackSpec};

use async_trait::async_trait;

use encounter_core::{CombatConfig, PcgDice, SessionState, TokenId};
use encounter_content::ContentArchetypes;

use crate::api::{IntentProvider, Result, RuntimeError};

/// Behavior-profile AI provider.
///
/// Resolves the actor's archetype to its profile (default fallback for
/// unrecognized tokens) and runs the target/arbiter/movement pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnemyAiProvider {
    dice: PcgDice,
    archetypes: ContentArchetypes,
}

impl EnemyAiProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IntentProvider for EnemyAiProvider {
    async fn provide_intent(
        &self,
        actor: TokenId,
        state: &SessionState,
        config: &CombatConfig,
    ) -> Result<ActionIntent> {
        let token = state
            .token(actor)
            .ok_or(RuntimeError::TokenNotFound(actor))?;
        let profile = encounter_content::profile(token.archetype);

        let ctx = AiContext::new(token, profile, state, config, &self.dice, &self.archetypes);
        let intent = arbiter::decide(&ctx);

        tracing::debug!(
            actor = %actor,
            archetype = ?token.archetype,
            intent = ?intent,
            "enemy intent decided"
        );
        Ok(intent)
    }
}
