//! Public runtime API surface.
//!
//! This module gathers the types exposed to consumers of the runtime crate so
//! other layers can stay focused on orchestration, workers, or persistence.

pub mod errors;
pub mod handle;
pub mod providers;

pub use errors::{DeliveryError, Result, RuntimeError, ServiceError};
pub use handle::{SessionHandle, Submission};
pub use providers::{ActionValidator, Broadcaster, NarrativeGenerator, WorldProvider};
