//! JSON-file SessionRepository for durable local runs.

use std::fs;
use std::path::{Path, PathBuf};

use encounter_core::SessionState;

use super::{Result, SessionRepository};

/// File-backed implementation of [`SessionRepository`].
///
/// One pretty-printed JSON document per session under the base
/// directory. Writes go through a sibling temp file and rename so a
/// crash mid-save never leaves a torn document.
pub struct FileSessionRepo {
    base_dir: PathBuf,
}

impl FileSessionRepo {
    /// Create a repository rooted at `base_dir`, creating it if needed.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn document_path(&self, session_id: &str) -> PathBuf {
        self.base_dir.join(format!("{session_id}.json"))
    }
}

impl SessionRepository for FileSessionRepo {
    fn save(&self, session_id: &str, state: &SessionState) -> Result<()> {
        let path = self.document_path(session_id);
        let staging = path.with_extension("json.tmp");

        let document = serde_json::to_string_pretty(state)?;
        fs::write(&staging, document)?;
        fs::rename(&staging, &path)?;
        Ok(())
    }

    fn load(&self, session_id: &str) -> Result<Option<SessionState>> {
        let path = self.document_path(session_id);
        if !path.exists() {
            return Ok(None);
        }
        let document = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&document)?))
    }

    fn exists(&self, session_id: &str) -> bool {
        self.document_path(session_id).exists()
    }

    fn delete(&self, session_id: &str) -> Result<()> {
        let path = self.document_path(session_id);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn list_sessions(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json")
                && let Some(stem) = path.file_stem().and_then(|stem| stem.to_str())
            {
                ids.push(stem.to_string());
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }
}

impl std::fmt::Debug for FileSessionRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSessionRepo")
            .field("base_dir", &self.base_dir.display())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encounter_core::{MapBounds, SessionState};

    #[test]
    fn save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileSessionRepo::new(dir.path()).unwrap();

        let state = SessionState::with_seed(99, MapBounds::new(20, 20));
        repo.save("table-1", &state).unwrap();

        assert!(repo.exists("table-1"));
        let loaded = repo.load("table-1").unwrap().unwrap();
        assert_eq!(loaded, state);
        assert_eq!(repo.list_sessions().unwrap(), vec!["table-1".to_string()]);
    }

    #[test]
    fn delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileSessionRepo::new(dir.path()).unwrap();

        let state = SessionState::new(MapBounds::new(10, 10));
        repo.save("table-1", &state).unwrap();
        repo.delete("table-1").unwrap();
        repo.delete("table-1").unwrap();
        assert!(!repo.exists("table-1"));
        assert!(repo.load("table-1").unwrap().is_none());
    }
}
