//! Topic-based event bus implementation.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use combat_core::FighterId;

use super::types::{MessageEvent, SessionEvent};
use crate::api::{Broadcaster, DeliveryError};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Text lines addressed to participants
    Message,
    /// Typed session lifecycle and turn events
    Combat,
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    Message(MessageEvent),
    Combat(SessionEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Message(_) => Topic::Message,
            Event::Combat(_) => Topic::Combat,
        }
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Clones share the same channels.
#[derive(Clone)]
pub struct EventBus {
    message_tx: broadcast::Sender<Event>,
    combat_tx: broadcast::Sender<Event>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            message_tx: broadcast::channel(capacity).0,
            combat_tx: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Message => &self.message_tx,
            Topic::Combat => &self.combat_tx,
        }
    }

    /// Publish an event to its corresponding topic
    ///
    /// Returns `false` when nobody is subscribed to that topic.
    pub fn publish(&self, event: Event) -> bool {
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!(target: "runtime::events", ?topic, "no subscribers");
            return false;
        }
        true
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Broadcaster for EventBus {
    fn send_to(&self, recipient: FighterId, text: &str) -> Result<(), DeliveryError> {
        let delivered = self.publish(Event::Message(MessageEvent {
            recipient,
            text: text.to_string(),
        }));
        if delivered {
            Ok(())
        } else {
            Err(DeliveryError::NoListener(recipient))
        }
    }
}
