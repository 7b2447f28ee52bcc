//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from the core engine, worker coordination, and
//! repositories so clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use encounter_core::{
    ActionId, EntryId, HazardError, MoveError, RosterError, TokenId, TurnError,
};

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Turn(#[from] TurnError),

    #[error(transparent)]
    Move(#[from] MoveError),

    #[error(transparent)]
    Roster(#[from] RosterError),

    #[error(transparent)]
    Hazard(#[from] HazardError),

    #[error("pending action {0} is not outstanding")]
    ActionNotFound(ActionId),

    #[error("token {0} is not in the roster")]
    TokenNotFound(TokenId),

    #[error("initiative entry {0} is not in the order")]
    EntryNotFound(EntryId),

    #[error("entry {0} does not hold the current turn")]
    StaleTurn(EntryId),

    #[error("entry {0} is not an enemy slot")]
    NotEnemySlot(EntryId),

    #[error("an enemy turn is already being processed")]
    EnemyTurnInProgress,

    #[error("session worker command channel closed")]
    CommandChannelClosed,

    #[error("session worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("session worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
