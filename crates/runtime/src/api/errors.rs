//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, repositories and collaborator
//! services so callers can bubble them up with consistent context. Variants
//! that describe a refused request carry participant-facing `Display` text.
use thiserror::Error;
use tokio::sync::oneshot;

use combat_core::{FighterId, LocationId, Rejection, SessionError};

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("You are already in a fight!")]
    AlreadyInCombat(FighterId),

    #[error("A fight is already in progress here!")]
    FightInProgress(LocationId),

    #[error("There's no one else here to fight.")]
    NoOneToFight(LocationId),

    /// A submission was refused; the session is unchanged.
    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("world provider failed")]
    World(#[source] ServiceError),

    #[error("session worker command channel closed")]
    CommandChannelClosed,

    #[error("session worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("session worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl RuntimeError {
    /// Reason code for refusals a participant should see, `None` for faults.
    pub fn rejection_reason(&self) -> Option<&'static str> {
        match self {
            Self::AlreadyInCombat(_) => Some("already_in_combat"),
            Self::FightInProgress(_) => Some("fight_in_progress"),
            Self::NoOneToFight(_) => Some("no_one_to_fight"),
            Self::Rejected(rejection) => Some(rejection.reason()),
            _ => None,
        }
    }
}

/// Failure of an external text service (validator, narrator, world).
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("service unavailable")]
    Unavailable,
}

/// Failure to deliver a message to one recipient.
#[derive(Debug, Clone, Error)]
pub enum DeliveryError {
    #[error("no listener for fighter {0}")]
    NoListener(FighterId),

    #[error("delivery to fighter {recipient} failed: {reason}")]
    Failed { recipient: FighterId, reason: String },
}
