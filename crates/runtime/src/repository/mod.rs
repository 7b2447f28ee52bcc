//! Session document persistence.
//!
//! The session is one document with last-write-wins semantics; nothing
//! here assumes multi-document atomicity. The in-memory store backs
//! tests and local play, the file store gives local runs durability
//! across restarts.
mod error;
mod file;
mod memory;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::FileSessionRepo;
pub use memory::InMemorySessionRepo;
pub use traits::SessionRepository;
