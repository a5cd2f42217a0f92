//! Topic-based event bus for runtime events.
//!
//! Sessions publish to specific topics, and consumers subscribe only to the
//! topics they need. The bus doubles as the default [`crate::Broadcaster`].

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{MessageEvent, SessionEvent};
