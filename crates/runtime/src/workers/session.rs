//! Session worker that owns the authoritative [`CombatSession`].
//!
//! Receives commands from [`crate::SessionHandle`] and from its own turn
//! timer, applies them to the session, delivers the resulting announcements
//! and publishes typed events to the EventBus. Commands and ticks share one
//! `select!` loop, so they can never interleave inside a turn.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use combat_core::{
    Action, Announcement, Audience, CombatEvent, CombatSession, FighterId, PcgDice, Validation,
};

use crate::api::{
    ActionValidator, Broadcaster, NarrativeGenerator, Result, ServiceError, Submission,
};
use crate::events::{Event, EventBus, SessionEvent};
use crate::repository::{SessionRecord, SessionRepository};
use crate::runtime::RuntimeConfig;

/// Commands that can be sent to a session worker
pub enum Command {
    /// Roll initiative and open the first round.
    Start { reply: oneshot::Sender<Result<()>> },
    /// Submit a participant's free-text action.
    Submit {
        actor: FighterId,
        text: String,
        reply: oneshot::Sender<Result<Submission>>,
    },
    /// Apply one scheduler tick (used when the internal timer is disabled).
    Tick { reply: oneshot::Sender<()> },
    /// Query the current session (read-only).
    Query { reply: oneshot::Sender<CombatSession> },
    /// Stop the worker without ending the session.
    Shutdown,
}

/// Collaborators shared by every session worker.
#[derive(Clone)]
pub struct SessionServices {
    pub validator: Arc<dyn ActionValidator>,
    pub narrator: Arc<dyn NarrativeGenerator>,
    pub broadcaster: Arc<dyn Broadcaster>,
    pub repository: Arc<dyn SessionRepository>,
}

/// Background task that drives one combat session.
pub struct SessionWorker {
    session: CombatSession,
    dice: PcgDice,
    command_rx: mpsc::Receiver<Command>,
    services: SessionServices,
    event_bus: EventBus,
    tick_interval: Option<Duration>,
    service_timeout: Duration,
}

impl SessionWorker {
    pub fn new(
        session: CombatSession,
        dice: PcgDice,
        command_rx: mpsc::Receiver<Command>,
        services: SessionServices,
        event_bus: EventBus,
        config: &RuntimeConfig,
    ) -> Self {
        debug!(
            target: "runtime::worker",
            session = %session.id(),
            status = %session.status(),
            fighters = session.fighters().len(),
            "session worker initialized"
        );

        Self {
            session,
            dice,
            command_rx,
            services,
            event_bus,
            tick_interval: config.tick_interval,
            service_timeout: config.service_timeout,
        }
    }

    /// Main worker loop.
    ///
    /// Exits when the session ends, on [`Command::Shutdown`], or when every
    /// handle has been dropped.
    pub async fn run(mut self) {
        let mut ticker = self.tick_interval.map(|period| {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(Command::Shutdown) | None => break,
                    Some(cmd) => self.handle_command(cmd).await,
                },
                _ = next_tick(&mut ticker) => self.handle_tick().await,
            }

            if self.session.is_ended() {
                break;
            }
        }

        info!(
            target: "runtime::worker",
            session = %self.session.id(),
            status = %self.session.status(),
            "session worker stopped"
        );
    }

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Start { reply } => {
                let result = self.handle_start().await;
                if reply.send(result).is_err() {
                    debug!(target: "runtime::worker", "Start reply channel closed (caller dropped)");
                }
            }
            Command::Submit { actor, text, reply } => {
                let result = self.handle_submit(actor, &text).await;
                if reply.send(result).is_err() {
                    debug!(target: "runtime::worker", "Submit reply channel closed (caller dropped)");
                }
            }
            Command::Tick { reply } => {
                self.handle_tick().await;
                if reply.send(()).is_err() {
                    debug!(target: "runtime::worker", "Tick reply channel closed (caller dropped)");
                }
            }
            Command::Query { reply } => {
                if reply.send(self.session.clone()).is_err() {
                    debug!(target: "runtime::worker", "Query reply channel closed (caller dropped)");
                }
            }
            Command::Shutdown => {}
        }
    }

    async fn handle_start(&mut self) -> Result<()> {
        let events = self.session.start(&mut self.dice)?;
        self.persist();
        self.dispatch(events).await;
        Ok(())
    }

    async fn handle_submit(&mut self, actor: FighterId, text: &str) -> Result<Submission> {
        self.session.check_submission(actor, text)?;

        let validation = if self.session.needs_validation(text) {
            self.validate(actor, text.trim()).await
        } else {
            Validation::fallback()
        };

        let fallback = Action::submitted(
            actor,
            text.trim(),
            self.session.parse_intent(actor, text),
            validation.clone(),
        );
        let events = self
            .session
            .submit_action(actor, text, validation, &mut self.dice)?;

        let action = events
            .iter()
            .find_map(|event| match event {
                CombatEvent::TurnResolved(report) if report.actor == actor => {
                    Some(report.action.clone())
                }
                _ => None,
            })
            .unwrap_or(fallback);

        self.persist();
        self.dispatch(events).await;

        Ok(Submission {
            session: self.session.id(),
            action,
            status: self.session.status(),
        })
    }

    async fn handle_tick(&mut self) {
        let timer_before = self.session.turn_timer();
        let events = self.session.tick(&mut self.dice);
        if events.is_empty() && self.session.turn_timer() == timer_before {
            return;
        }
        self.persist();
        self.dispatch(events).await;
    }

    /// Ask the validator, degrading to the safe default on any failure.
    async fn validate(&self, actor: FighterId, text: &str) -> Validation {
        let Some(profile) = self.session.actor_profile(actor) else {
            return Validation::fallback();
        };
        let context = self.session.combat_context(actor);
        let call = self.services.validator.validate(&profile, text, &context);

        match self.bounded(call).await {
            Ok(validation) => validation,
            Err(error) => {
                warn!(
                    target: "runtime::worker",
                    session = %self.session.id(),
                    %actor,
                    %error,
                    "validator unavailable, using fallback verdict"
                );
                Validation::fallback()
            }
        }
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = std::result::Result<T, ServiceError>>,
    ) -> std::result::Result<T, ServiceError> {
        tokio::time::timeout(self.service_timeout, call)
            .await
            .map_err(|_| ServiceError::Timeout(self.service_timeout))?
    }

    /// Deliver announcements and narration for each event, in order.
    async fn dispatch(&self, events: Vec<CombatEvent>) {
        for event in events {
            for announcement in self.session.announce(&event) {
                self.deliver(&announcement);
            }

            match &event {
                CombatEvent::TurnResolved(report) => {
                    let summary = self.session.turn_summary(report);
                    let text = match self.bounded(self.services.narrator.narrate_turn(&summary)).await {
                        Ok(text) if !text.trim().is_empty() => text,
                        Ok(_) => summary.fallback_narrative(),
                        Err(error) => {
                            warn!(target: "runtime::worker", %error, "turn narration failed");
                            summary.fallback_narrative()
                        }
                    };
                    self.deliver_to_all(&text);
                }
                CombatEvent::CombatEnded { .. } => {
                    if let Some(summary) = self.session.victory_summary() {
                        let text =
                            match self.bounded(self.services.narrator.narrate_victory(&summary)).await {
                                Ok(text) if !text.trim().is_empty() => text,
                                Ok(_) => summary.fallback_narrative(),
                                Err(error) => {
                                    warn!(target: "runtime::worker", %error, "victory narration failed");
                                    summary.fallback_narrative()
                                }
                            };
                        self.deliver_to_all(&text);
                    }
                }
                _ => {}
            }

            self.event_bus.publish(Event::Combat(SessionEvent {
                session: self.session.id(),
                location: self.session.location(),
                event,
            }));
        }
    }

    fn deliver(&self, announcement: &Announcement) {
        match announcement.audience {
            Audience::Participants => self.deliver_to_all(&announcement.text),
            Audience::Fighter(recipient) => {
                if let Err(error) = self.services.broadcaster.send_to(recipient, &announcement.text) {
                    warn!(
                        target: "runtime::broadcast",
                        session = %self.session.id(),
                        %recipient,
                        %error,
                        "message delivery failed"
                    );
                }
            }
        }
    }

    fn deliver_to_all(&self, text: &str) {
        self.services.broadcaster.send_to_participants(
            self.session.id(),
            &self.session.player_ids(),
            text,
        );
    }

    /// Save the session; failures are logged and retried on the next save.
    ///
    /// Runs right after each mutation, before any narration is awaited.
    fn persist(&self) {
        let record = SessionRecord::new(self.session.clone(), self.dice);
        if let Err(error) = self.services.repository.save(self.session.id(), &record) {
            warn!(
                target: "runtime::repository",
                session = %self.session.id(),
                %error,
                "failed to persist session"
            );
        }
    }
}

/// Waits for the next scheduler tick, or forever when ticking is external.
async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
