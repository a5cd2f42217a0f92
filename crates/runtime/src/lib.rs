//! Runtime orchestration for turn-based combat sessions.
//!
//! This crate wires the deterministic rules in `combat-core` to the outside
//! world: collaborator traits for validation, narration, world lookup and
//! message delivery, one worker task per encounter, and session stores.
//! Consumers embed [`SessionManager`] to start fights and route actions, and
//! subscribe to the [`EventBus`] for messages and typed events.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the manager, its builder and configuration
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - [`providers`] ships offline collaborator implementations
//! - [`repository`] persists sessions for resume after restart
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod events;
pub mod providers;
pub mod repository;
pub mod runtime;

mod workers;

pub use api::{
    ActionValidator, Broadcaster, DeliveryError, NarrativeGenerator, Result, RuntimeError,
    ServiceError, SessionHandle, Submission, WorldProvider,
};
pub use events::{Event, EventBus, MessageEvent, SessionEvent, Topic};
pub use providers::{ScriptedWorld, StubNarrator, StubValidator};
pub use repository::{
    FileSessionRepository, InMemorySessionRepository, RepositoryError, SessionRecord,
    SessionRepository,
};
pub use runtime::{RuntimeConfig, SessionManager, SessionManagerBuilder};
