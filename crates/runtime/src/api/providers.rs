//! Collaborator contracts injected into the session runtime.
//!
//! Runtime users plug in implementations so sessions can run against a real
//! text-generation backend, offline stubs, or test fixtures. The async
//! services are awaited on the owning session worker under a bounded timeout;
//! any error there degrades to a fallback and never blocks combat.
use async_trait::async_trait;

use combat_core::{
    ActorProfile, Fighter, FighterId, LocationId, SessionId, TurnSummary, Validation,
    VictorySummary,
};

use super::errors::{DeliveryError, ServiceError};

/// Classifies and sentiment-scores free-text actions.
#[async_trait]
pub trait ActionValidator: Send + Sync {
    /// Judge `text` submitted by `actor`.
    ///
    /// # Arguments
    /// * `actor` - Public attributes of the acting fighter
    /// * `text` - Raw action text, trimmed
    /// * `context` - Short combat situation summary
    ///
    /// Return [`ServiceError::InvalidResponse`] when the backend answered with
    /// something unusable.
    async fn validate(
        &self,
        actor: &ActorProfile,
        text: &str,
        context: &str,
    ) -> Result<Validation, ServiceError>;
}

/// Produces flavor text for resolved turns and finished encounters.
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn narrate_turn(&self, summary: &TurnSummary) -> Result<String, ServiceError>;

    async fn narrate_victory(&self, summary: &VictorySummary) -> Result<String, ServiceError>;
}

/// Source of the fighters present at a location.
#[async_trait]
pub trait WorldProvider: Send + Sync {
    /// Everyone at `location` who could take part in a fight.
    async fn locate_eligible_participants(
        &self,
        location: LocationId,
    ) -> Result<Vec<Fighter>, ServiceError>;
}

/// Message delivery to individual participants.
pub trait Broadcaster: Send + Sync {
    fn send_to(&self, recipient: FighterId, text: &str) -> Result<(), DeliveryError>;

    /// Fire-and-forget delivery to every recipient.
    ///
    /// A failed recipient is logged and skipped; the others still receive
    /// the message.
    fn send_to_participants(&self, session: SessionId, recipients: &[FighterId], text: &str) {
        for &recipient in recipients {
            if let Err(error) = self.send_to(recipient, text) {
                tracing::warn!(
                    target: "runtime::broadcast",
                    %session,
                    %recipient,
                    %error,
                    "message delivery failed"
                );
            }
        }
    }
}
