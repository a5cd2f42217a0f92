//! Worker tasks that back the runtime orchestration.
//!
//! Each running encounter is owned by exactly one session worker; the
//! manager only holds handles to them.

mod session;

pub use session::{Command, SessionServices, SessionWorker};
