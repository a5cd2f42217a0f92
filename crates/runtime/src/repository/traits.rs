//! Repository contract for saving and loading in-progress sessions.

use combat_core::SessionId;

use super::Result;
use super::types::SessionRecord;

/// Durable keyed storage for session records.
///
/// Implementations are synchronous and called from the owning session
/// worker after every mutation. Callers log failures and carry on; the next
/// save retries with fresher state.
pub trait SessionRepository: Send + Sync {
    /// Save (replace) the record stored under `key`
    fn save(&self, key: SessionId, record: &SessionRecord) -> Result<()>;

    /// Load a record by key
    fn load(&self, key: SessionId) -> Result<Option<SessionRecord>>;

    /// Delete a record; deleting a missing key is not an error
    fn delete(&self, key: SessionId) -> Result<()>;

    /// List all stored keys, for restart recovery
    fn list_keys(&self) -> Result<Vec<SessionId>>;

    /// Check if a record exists
    fn exists(&self, key: SessionId) -> bool {
        matches!(self.load(key), Ok(Some(_)))
    }
}
