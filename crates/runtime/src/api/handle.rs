//! Cloneable façade for issuing commands to one session worker.
//!
//! [`SessionHandle`] hides channel plumbing and offers async helpers for
//! starting the encounter, submitting actions, ticking the turn timer or
//! streaming events from specific topics.
use tokio::sync::{broadcast, mpsc, oneshot};

use combat_core::{Action, CombatSession, FighterId, LocationId, SessionId, SessionStatus};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::workers::Command;

/// Accepted submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submission {
    pub session: SessionId,
    /// The action as recorded and resolved.
    pub action: Action,
    /// Session status after the turn (and any automatic turns) resolved.
    pub status: SessionStatus,
}

/// Client-facing handle to one running session.
#[derive(Clone)]
pub struct SessionHandle {
    session: SessionId,
    location: LocationId,
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("session", &self.session)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl SessionHandle {
    pub(crate) fn new(
        session: SessionId,
        location: LocationId,
        command_tx: mpsc::Sender<Command>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            session,
            location,
            command_tx,
            event_bus,
        }
    }

    pub fn id(&self) -> SessionId {
        self.session
    }

    pub fn location(&self) -> LocationId {
        self.location
    }

    /// True once the worker has stopped (combat ended or shutdown).
    pub fn is_closed(&self) -> bool {
        self.command_tx.is_closed()
    }

    /// Roll initiative and open round 1.
    pub async fn start(&self) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Start { reply: reply_tx }).await?;
        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    /// Submit free-text action for `actor`.
    ///
    /// Refusals come back as [`RuntimeError::Rejected`] with the reason.
    pub async fn submit_action(&self, actor: FighterId, text: impl Into<String>) -> Result<Submission> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Submit {
            actor,
            text: text.into(),
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    /// Advance the turn timer by one tick and wait until it was applied.
    pub async fn tick(&self) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Tick { reply: reply_tx }).await?;
        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Query the current session state (read-only snapshot).
    pub async fn query_session(&self) -> Result<CombatSession> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Query { reply: reply_tx }).await?;
        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Ask the worker to stop after the command in flight.
    pub async fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown).await
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Message` - Per-recipient text lines
    /// - `Topic::Combat` - Typed session events
    ///
    /// The bus is shared by every session; filter on the session id.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }
}
