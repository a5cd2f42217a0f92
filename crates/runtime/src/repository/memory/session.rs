//! In-memory session repository implementation.

use std::collections::HashMap;
use std::sync::RwLock;

use combat_core::SessionId;

use crate::repository::{RepositoryError, Result, SessionRecord, SessionRepository};

/// In-memory session repository for testing and development.
///
/// Thread-safe but not persistent across process restarts.
pub struct InMemorySessionRepository {
    records: RwLock<HashMap<SessionId, SessionRecord>>,
}

impl InMemorySessionRepository {
    /// Create a new empty in-memory session repository.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemorySessionRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRepository for InMemorySessionRepository {
    fn save(&self, key: SessionId, record: &SessionRecord) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        records.insert(key, record.clone());
        Ok(())
    }

    fn load(&self, key: SessionId) -> Result<Option<SessionRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        Ok(records.get(&key).cloned())
    }

    fn delete(&self, key: SessionId) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        records.remove(&key);
        Ok(())
    }

    fn list_keys(&self) -> Result<Vec<SessionId>> {
        let records = self
            .records
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        let mut keys: Vec<SessionId> = records.keys().copied().collect();
        keys.sort();
        Ok(keys)
    }
}
