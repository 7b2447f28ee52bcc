use thiserror::Error;

pub type Result<T> = std::result::Result<T, RepositoryError>;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("repository lock poisoned")]
    LockPoisoned,

    #[error("i/o failure")]
    Io(#[from] std::io::Error),

    #[error("session document serialization failed")]
    Serialization(#[from] serde_json::Error),
}
