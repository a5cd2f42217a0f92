//! Event types for different topics.

use serde::{Deserialize, Serialize};

use combat_core::{CombatEvent, FighterId, LocationId, SessionId};

/// A line of text addressed to one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEvent {
    pub recipient: FighterId,
    pub text: String,
}

/// Typed session event, tagged with where it happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEvent {
    pub session: SessionId,
    pub location: LocationId,
    pub event: CombatEvent,
}
