//! File-based repository implementations.

mod session;

pub use session::FileSessionRepository;
