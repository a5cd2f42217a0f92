//! File-based SessionRepository implementation.

use std::fs;
use std::path::{Path, PathBuf};

use combat_core::SessionId;

use crate::repository::{RepositoryError, Result, SessionRecord, SessionRepository};

/// File-based implementation of SessionRepository.
///
/// One pretty-printed JSON file per session, `session_{id}.json`. Writes go
/// to a temp file first and are renamed into place, so a crash mid-write
/// leaves the previous record intact.
pub struct FileSessionRepository {
    base_dir: PathBuf,
}

impl FileSessionRepository {
    const PREFIX: &'static str = "session_";
    const SUFFIX: &'static str = ".json";

    /// Create a new file-based session repository.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).map_err(RepositoryError::Io)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Get the path to a session file.
    fn record_path(&self, key: SessionId) -> PathBuf {
        self.base_dir
            .join(format!("{}{}{}", Self::PREFIX, key, Self::SUFFIX))
    }

    fn parse_key(filename: &str) -> Option<SessionId> {
        let hex = filename
            .strip_prefix(Self::PREFIX)?
            .strip_suffix(Self::SUFFIX)?;
        u64::from_str_radix(hex, 16).ok().map(SessionId)
    }
}

impl SessionRepository for FileSessionRepository {
    fn save(&self, key: SessionId, record: &SessionRecord) -> Result<()> {
        let path = self.record_path(key);
        let temp_path = path.with_extension("json.tmp");

        // Write to temp file
        let json = serde_json::to_string_pretty(record)
            .map_err(|e| RepositoryError::Json(e.to_string()))?;
        fs::write(&temp_path, json).map_err(RepositoryError::Io)?;

        // Atomic rename
        fs::rename(&temp_path, &path).map_err(RepositoryError::Io)?;

        tracing::debug!(target: "runtime::repository", path = %path.display(), "saved session");

        Ok(())
    }

    fn load(&self, key: SessionId) -> Result<Option<SessionRecord>> {
        let path = self.record_path(key);

        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path).map_err(RepositoryError::Io)?;
        let record: SessionRecord =
            serde_json::from_str(&json).map_err(|e| RepositoryError::CorruptedData {
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        if record.key() != key {
            return Err(RepositoryError::CorruptedData {
                key: key.to_string(),
                reason: format!("file holds session {}", record.key()),
            });
        }

        Ok(Some(record))
    }

    fn delete(&self, key: SessionId) -> Result<()> {
        let path = self.record_path(key);

        if path.exists() {
            fs::remove_file(&path).map_err(RepositoryError::Io)?;
            tracing::info!(target: "runtime::repository", path = %path.display(), "deleted session");
        }

        Ok(())
    }

    fn list_keys(&self) -> Result<Vec<SessionId>> {
        let mut keys = Vec::new();

        let entries = fs::read_dir(&self.base_dir).map_err(RepositoryError::Io)?;

        for entry in entries {
            let entry = entry.map_err(RepositoryError::Io)?;
            let path = entry.path();

            if let Some(key) = path
                .file_name()
                .and_then(|s| s.to_str())
                .and_then(Self::parse_key)
            {
                keys.push(key);
            }
        }

        keys.sort();
        Ok(keys)
    }
}
