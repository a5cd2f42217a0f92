//! High-level session orchestrator.
//!
//! The [`SessionManager`] owns the collaborators, spawns one worker per
//! encounter and indexes running sessions by location and fighter. It exposes
//! a builder-based API so clients inject their own validator, narrator, world
//! and stores.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

use combat_core::{
    CombatConfig, CombatSession, FighterId, LocationId, PcgDice, Rejection, SessionId,
};

use crate::api::{
    ActionValidator, Broadcaster, NarrativeGenerator, Result, RuntimeError, ServiceError,
    SessionHandle, Submission, WorldProvider,
};
use crate::events::EventBus;
use crate::providers::{ScriptedWorld, StubNarrator, StubValidator};
use crate::repository::{InMemorySessionRepository, SessionRecord, SessionRepository};
use crate::workers::{SessionServices, SessionWorker};

/// Runtime configuration shared across the manager and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub combat: CombatConfig,
    /// Wall-clock period of the turn timer; `None` leaves ticking to the
    /// caller ([`SessionManager::tick_all`]).
    pub tick_interval: Option<Duration>,
    pub command_buffer_size: usize,
    pub event_buffer_size: usize,
    /// Upper bound for validator, narrator and world calls.
    pub service_timeout: Duration,
    /// Directory for the file session store, when one is used.
    pub save_data_dir: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            combat: CombatConfig::default(),
            tick_interval: Some(Duration::from_secs(u64::from(
                CombatConfig::DEFAULT_TICK_AMOUNT,
            ))),
            command_buffer_size: 32,
            event_buffer_size: 256,
            service_timeout: Duration::from_secs(10),
            save_data_dir: None,
        }
    }
}

impl RuntimeConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `COMBAT_TURN_TIMEOUT` - Seconds a player has to act (default: 60)
    /// - `COMBAT_WARNING_THRESHOLD` - Seconds left when the warning fires (default: 15)
    /// - `COMBAT_TICK_SECS` - Scheduler period and tick amount; `0` disables the internal timer (default: 5)
    /// - `COMBAT_SERVICE_TIMEOUT_SECS` - Validator/narrator bound (default: 10)
    /// - `COMBAT_SAVE_DIR` - Directory for session files (default: none)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(timeout) = read_env::<u32>("COMBAT_TURN_TIMEOUT") {
            config.combat = config.combat.with_turn_timeout(timeout.max(1));
        }

        if let Some(threshold) = read_env::<u32>("COMBAT_WARNING_THRESHOLD") {
            config.combat = config.combat.with_warning_threshold(threshold);
        }

        if let Some(secs) = read_env::<u32>("COMBAT_TICK_SECS") {
            if secs == 0 {
                config.tick_interval = None;
            } else {
                config.combat = config.combat.with_tick_amount(secs);
                config.tick_interval = Some(Duration::from_secs(u64::from(secs)));
            }
        }

        if let Some(secs) = read_env::<u64>("COMBAT_SERVICE_TIMEOUT_SECS") {
            config.service_timeout = Duration::from_secs(secs.max(1));
        }

        config.save_data_dir = env::var("COMBAT_SAVE_DIR").ok().map(PathBuf::from);

        config
    }

    /// Platform data directory used when `COMBAT_SAVE_DIR` is unset.
    pub fn default_save_dir() -> PathBuf {
        directories::ProjectDirs::from("", "", "combat-arena")
            .map(|dirs| dirs.data_dir().join("sessions"))
            .unwrap_or_else(|| PathBuf::from("./save_data/sessions"))
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

/// Running session known to the manager.
struct ManagedSession {
    handle: SessionHandle,
    location: LocationId,
    fighters: Vec<FighterId>,
    worker: JoinHandle<()>,
}

/// Owns every running session and routes requests to them.
///
/// Design: each session worker owns its state; the manager only keeps
/// handles, pruning those whose worker has stopped.
pub struct SessionManager {
    config: RuntimeConfig,
    services: SessionServices,
    world: Arc<dyn WorldProvider>,
    event_bus: EventBus,
    sessions: Mutex<HashMap<SessionId, ManagedSession>>,
}

impl SessionManager {
    /// Create a new manager builder
    pub fn builder() -> SessionManagerBuilder {
        SessionManagerBuilder::new()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Start a fight at `location` on behalf of `initiator`.
    ///
    /// Everyone the world reports at the location, and not already fighting
    /// elsewhere, joins the new session.
    ///
    /// The session table is not locked while the world provider is
    /// queried; availability is checked again before the session is added.
    pub async fn initiate(&self, initiator: FighterId, location: LocationId) -> Result<SessionHandle> {
        {
            let mut sessions = self.sessions.lock().await;
            prune(&mut sessions);
            check_available(&sessions, initiator, location)?;
        }

        let located = tokio::time::timeout(
            self.config.service_timeout,
            self.world.locate_eligible_participants(location),
        )
        .await
        .map_err(|_| RuntimeError::World(ServiceError::Timeout(self.config.service_timeout)))?
        .map_err(RuntimeError::World)?;

        let mut sessions = self.sessions.lock().await;
        prune(&mut sessions);
        check_available(&sessions, initiator, location)?;

        let participants: Vec<_> = located
            .into_iter()
            .filter(|f| !f.is_defeated())
            .filter(|f| !sessions.values().any(|s| s.fighters.contains(&f.id)))
            .collect();

        let Some((initiator_name, side)) = participants
            .iter()
            .find(|f| f.id == initiator)
            .map(|f| (f.name.clone(), f.control))
        else {
            return Err(RuntimeError::NoOneToFight(location));
        };
        if participants.len() < CombatConfig::MIN_FIGHTERS
            || participants.iter().all(|f| f.control == side)
        {
            return Err(RuntimeError::NoOneToFight(location));
        }

        let session_id = SessionId(rand::random());
        let mut session = CombatSession::new(session_id, location, self.config.combat.clone());
        for fighter in participants {
            session.add_fighter(fighter)?;
        }

        self.services.broadcaster.send_to_participants(
            session_id,
            &[initiator],
            "You roar and start a fight!",
        );
        let others: Vec<FighterId> = session
            .player_ids()
            .into_iter()
            .filter(|id| *id != initiator)
            .collect();
        self.services.broadcaster.send_to_participants(
            session_id,
            &others,
            &format!("{initiator_name} starts a fight!"),
        );

        tracing::info!(
            target: "runtime::manager",
            session = %session_id,
            %location,
            %initiator,
            fighters = session.fighters().len(),
            "initiating combat"
        );

        let managed = self.spawn(session, PcgDice::new(rand::random()));
        let handle = managed.handle.clone();
        sessions.insert(session_id, managed);
        drop(sessions);

        handle.start().await?;
        Ok(handle)
    }

    /// Route a participant's action to their session.
    pub async fn submit_action(&self, actor: FighterId, text: &str) -> Result<Submission> {
        let handle = self
            .session_for(actor)
            .await
            .ok_or(RuntimeError::Rejected(Rejection::NotInCombat))?;

        match handle.submit_action(actor, text).await {
            Err(RuntimeError::CommandChannelClosed | RuntimeError::ReplyChannelClosed(_)) => {
                Err(RuntimeError::Rejected(Rejection::NotInCombat))
            }
            other => other,
        }
    }

    /// Apply one tick to every running session.
    pub async fn tick_all(&self) {
        for handle in self.handles().await {
            if let Err(error) = handle.tick().await {
                tracing::debug!(
                    target: "runtime::manager",
                    session = %handle.id(),
                    %error,
                    "tick skipped"
                );
            }
        }
    }

    pub async fn handle(&self, session: SessionId) -> Option<SessionHandle> {
        let mut sessions = self.sessions.lock().await;
        prune(&mut sessions);
        sessions.get(&session).map(|s| s.handle.clone())
    }

    /// Session the fighter is currently fighting in.
    pub async fn session_for(&self, fighter: FighterId) -> Option<SessionHandle> {
        let mut sessions = self.sessions.lock().await;
        prune(&mut sessions);
        sessions
            .values()
            .find(|s| s.fighters.contains(&fighter))
            .map(|s| s.handle.clone())
    }

    pub async fn session_at(&self, location: LocationId) -> Option<SessionHandle> {
        let mut sessions = self.sessions.lock().await;
        prune(&mut sessions);
        sessions
            .values()
            .find(|s| s.location == location)
            .map(|s| s.handle.clone())
    }

    /// Handles to every running session.
    pub async fn handles(&self) -> Vec<SessionHandle> {
        let mut sessions = self.sessions.lock().await;
        prune(&mut sessions);
        sessions.values().map(|s| s.handle.clone()).collect()
    }

    /// Respawn workers for every active session found in the repository.
    ///
    /// Returns how many sessions were resumed. Unreadable records are
    /// logged and skipped.
    pub async fn resume(&self) -> Result<usize> {
        let keys = self.services.repository.list_keys()?;
        let mut sessions = self.sessions.lock().await;
        prune(&mut sessions);

        let mut resumed = 0;
        for key in keys {
            if sessions.contains_key(&key) {
                continue;
            }
            let record = match self.services.repository.load(key) {
                Ok(Some(record)) => record,
                Ok(None) => continue,
                Err(error) => {
                    tracing::warn!(
                        target: "runtime::manager",
                        session = %key,
                        %error,
                        "skipping unreadable session record"
                    );
                    continue;
                }
            };
            if !record.is_resumable() {
                continue;
            }

            tracing::info!(
                target: "runtime::manager",
                session = %key,
                round = record.session.round_number(),
                "resuming session"
            );
            let SessionRecord { session, dice, .. } = record;
            sessions.insert(key, self.spawn(session, dice));
            resumed += 1;
        }
        Ok(resumed)
    }

    /// Stop every worker and wait for them to finish.
    ///
    /// Sessions are not ended; their last saved state can be resumed.
    pub async fn shutdown(&self) -> Result<()> {
        let drained: Vec<ManagedSession> = {
            let mut sessions = self.sessions.lock().await;
            sessions.drain().map(|(_, s)| s).collect()
        };

        for managed in drained {
            // A closed channel means the worker already stopped.
            managed.handle.shutdown().await.ok();
            managed.worker.await.map_err(RuntimeError::WorkerJoin)?;
        }
        Ok(())
    }

    fn spawn(&self, session: CombatSession, dice: PcgDice) -> ManagedSession {
        let (command_tx, command_rx) = mpsc::channel(self.config.command_buffer_size.max(1));
        let id = session.id();
        let location = session.location();
        let fighters = session.fighters().iter().map(|f| f.id).collect();

        let worker = SessionWorker::new(
            session,
            dice,
            command_rx,
            self.services.clone(),
            self.event_bus.clone(),
            &self.config,
        );
        let worker = tokio::spawn(worker.run());

        ManagedSession {
            handle: SessionHandle::new(id, location, command_tx, self.event_bus.clone()),
            location,
            fighters,
            worker,
        }
    }
}

/// Refuses a fighter who is already fighting or a location that is busy.
fn check_available(
    sessions: &HashMap<SessionId, ManagedSession>,
    initiator: FighterId,
    location: LocationId,
) -> Result<()> {
    if sessions.values().any(|s| s.fighters.contains(&initiator)) {
        return Err(RuntimeError::AlreadyInCombat(initiator));
    }
    if sessions.values().any(|s| s.location == location) {
        return Err(RuntimeError::FightInProgress(location));
    }
    Ok(())
}

/// Drop sessions whose worker has stopped.
fn prune(sessions: &mut HashMap<SessionId, ManagedSession>) {
    sessions.retain(|_, s| !s.handle.is_closed() && !s.worker.is_finished());
}

/// Builder for [`SessionManager`] with flexible configuration.
///
/// Every collaborator has an offline default: stub validator and narrator,
/// an empty scripted world, an in-memory store and the manager's own event
/// bus as broadcaster.
pub struct SessionManagerBuilder {
    config: RuntimeConfig,
    validator: Option<Arc<dyn ActionValidator>>,
    narrator: Option<Arc<dyn NarrativeGenerator>>,
    world: Option<Arc<dyn WorldProvider>>,
    broadcaster: Option<Arc<dyn Broadcaster>>,
    repository: Option<Arc<dyn SessionRepository>>,
    event_bus: Option<EventBus>,
}

impl SessionManagerBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            validator: None,
            narrator: None,
            world: None,
            broadcaster: None,
            repository: None,
            event_bus: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn validator(mut self, validator: impl ActionValidator + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn narrator(mut self, narrator: impl NarrativeGenerator + 'static) -> Self {
        self.narrator = Some(Arc::new(narrator));
        self
    }

    pub fn world(mut self, world: impl WorldProvider + 'static) -> Self {
        self.world = Some(Arc::new(world));
        self
    }

    pub fn broadcaster(mut self, broadcaster: impl Broadcaster + 'static) -> Self {
        self.broadcaster = Some(Arc::new(broadcaster));
        self
    }

    /// Set the session store (shared so tests can inspect it)
    pub fn repository(mut self, repository: Arc<dyn SessionRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Share an existing event bus instead of creating one
    pub fn event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn build(self) -> SessionManager {
        let event_bus = self
            .event_bus
            .unwrap_or_else(|| EventBus::with_capacity(self.config.event_buffer_size));
        let broadcaster = self
            .broadcaster
            .unwrap_or_else(|| Arc::new(event_bus.clone()));

        let services = SessionServices {
            validator: self.validator.unwrap_or_else(|| Arc::new(StubValidator)),
            narrator: self.narrator.unwrap_or_else(|| Arc::new(StubNarrator)),
            broadcaster,
            repository: self
                .repository
                .unwrap_or_else(|| Arc::new(InMemorySessionRepository::new())),
        };

        SessionManager {
            config: self.config,
            services,
            world: self
                .world
                .unwrap_or_else(|| Arc::new(ScriptedWorld::new())),
            event_bus,
            sessions: Mutex::new(HashMap::new()),
        }
    }
}
