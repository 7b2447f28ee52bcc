//! Provider seam for turn decisions.

use async_trait::async_trait;

use encounter_core::{CombatConfig, SessionState, TokenId};

use super::Result;
use crate::providers::ai::ActionIntent;

/// Source of one action intent per acting combatant.
///
/// The built-in implementation is [`crate::EnemyAiProvider`]; tests and
/// tools can substitute scripted providers.
#[async_trait]
pub trait IntentProvider: Send + Sync {
    /// Decide what `actor` does this turn, given a consistent snapshot.
    ///
    /// Must not fail for "no good option": that is
    /// [`ActionIntent::Hold`], never an error.
    async fn provide_intent(
        &self,
        actor: TokenId,
        state: &SessionState,
        config: &CombatConfig,
    ) -> Result<ActionIntent>;
}
