//! Error types raised by the combat rules.
//!
//! Two families exist:
//! - [`SessionError`]: lifecycle misuse by the embedding code (joining after
//!   the start, starting twice). These indicate a caller bug.
//! - [`Rejection`]: a participant's submission was refused. The `Display`
//!   text is shown to the participant verbatim and the session is unchanged.
use thiserror::Error;

use crate::action::Classification;
use crate::ids::{FighterId, SessionId};
use crate::session::SessionStatus;

/// Lifecycle errors for [`crate::CombatSession`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("session {session} is {status}; fighters can only join while it is forming")]
    NotForming {
        session: SessionId,
        status: SessionStatus,
    },

    #[error("fighter {0} already joined this session")]
    DuplicateFighter(FighterId),

    #[error("session {session} needs at least {required} fighters, found {found}")]
    NotEnoughFighters {
        session: SessionId,
        required: usize,
        found: usize,
    },
}

/// Reasons a submitted action is refused.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rejection {
    #[error("You can only do that in combat.")]
    NotInCombat,

    #[error("It's not your turn yet.")]
    NotYourTurn,

    #[error("You have already decided on your action for this turn.")]
    AlreadyActed,

    #[error("What do you want to do?")]
    EmptyAction,

    /// The action validator judged the text unusable; carries its feedback.
    #[error("{feedback}")]
    Refused {
        classification: Classification,
        feedback: String,
    },
}

impl Rejection {
    /// Stable machine-readable reason code.
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::NotInCombat => "not_in_combat",
            Self::NotYourTurn => "not_your_turn",
            Self::AlreadyActed => "already_acted",
            Self::EmptyAction => "empty_action",
            Self::Refused { .. } => "refused",
        }
    }
}
