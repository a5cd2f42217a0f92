//! Repository layer for in-progress sessions
//!
//! Repositories persist data that CHANGES during combat: each session record
//! is rewritten after every command that mutates it so a restarted process
//! can resume where it stopped.
//!
//! Participants themselves come from the world provider, not from here.

mod error;
mod file;
mod memory;
mod traits;
mod types;

pub use error::{RepositoryError, Result};
pub use file::FileSessionRepository;
pub use memory::InMemorySessionRepository;
pub use traits::SessionRepository;
pub use types::SessionRecord;
