//! Persisted session record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use combat_core::{CombatSession, PcgDice, SessionId};

/// Everything needed to resume a session after a restart.
///
/// The dice cursor is stored next to the session so a resumed worker keeps
/// rolling the same sequence it would have rolled without the restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Record format version
    pub version: u32,
    pub session: CombatSession,
    pub dice: PcgDice,
    /// When this record was written
    pub saved_at: DateTime<Utc>,
}

impl SessionRecord {
    pub const VERSION: u32 = 1;

    pub fn new(session: CombatSession, dice: PcgDice) -> Self {
        Self {
            version: Self::VERSION,
            session,
            dice,
            saved_at: Utc::now(),
        }
    }

    pub fn key(&self) -> SessionId {
        self.session.id()
    }

    /// Only active sessions are respawned on restart.
    pub fn is_resumable(&self) -> bool {
        self.session.is_active()
    }
}
