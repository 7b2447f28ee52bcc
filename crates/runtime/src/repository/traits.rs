//! Repository contract for saving and loading session documents.

use encounter_core::SessionState;

use super::Result;

/// Persistence for the session document.
///
/// One document per session id, last write wins. Everything a resumable
/// continuation needs (pending action ids, the outstanding storm roll)
/// is inside the document, so `load` after a restart is enough to pick
/// up where the table left off.
pub trait SessionRepository: Send + Sync {
    /// Save the session document, replacing any previous version.
    fn save(&self, session_id: &str, state: &SessionState) -> Result<()>;

    /// Load a session document by id.
    fn load(&self, session_id: &str) -> Result<Option<SessionState>>;

    /// Check whether a session document exists.
    fn exists(&self, session_id: &str) -> bool;

    /// Delete a session document.
    fn delete(&self, session_id: &str) -> Result<()>;

    /// List all stored session ids.
    fn list_sessions(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}
