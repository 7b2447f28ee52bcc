//! In-memory SessionRepository implementation for tests and local runs.

use std::collections::HashMap;
use std::sync::RwLock;

use encounter_core::SessionState;

use super::{RepositoryError, Result, SessionRepository};

/// In-memory implementation of [`SessionRepository`].
pub struct InMemorySessionRepo {
    sessions: RwLock<HashMap<String, SessionState>>,
}

impl InMemorySessionRepo {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Create with an existing session document.
    pub fn with_session(session_id: impl Into<String>, state: SessionState) -> Self {
        let repo = Self::new();
        repo.sessions
            .write()
            .expect("fresh lock cannot be poisoned")
            .insert(session_id.into(), state);
        repo
    }
}

impl Default for InMemorySessionRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRepository for InMemorySessionRepo {
    fn save(&self, session_id: &str, state: &SessionState) -> Result<()> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        sessions.insert(session_id.to_string(), state.clone());
        Ok(())
    }

    fn load(&self, session_id: &str) -> Result<Option<SessionState>> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(sessions.get(session_id).cloned())
    }

    fn exists(&self, session_id: &str) -> bool {
        self.sessions
            .read()
            .map(|sessions| sessions.contains_key(session_id))
            .unwrap_or(false)
    }

    fn delete(&self, session_id: &str) -> Result<()> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        sessions.remove(session_id);
        Ok(())
    }

    fn list_sessions(&self) -> Result<Vec<String>> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let mut ids: Vec<String> = sessions.keys().cloned().collect();
        ids.sort_unstable();
        Ok(ids)
    }
}
