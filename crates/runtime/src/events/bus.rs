//! Topic-based event bus implementation.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

use tactics_core::WorldEvent;

use super::types::{MovementEvent, TurnEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Phase transitions and per-actor turn decisions
    Turn,
    /// Obstacle and occupancy changes committed to the world
    World,
    /// Controlled-actor walk lifecycle
    Movement,
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Turn(TurnEvent),
    World(WorldEvent),
    Movement(MovementEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Turn(_) => Topic::Turn,
            Event::World(_) => Topic::World,
            Event::Movement(_) => Topic::Movement,
        }
    }
}

impl From<TurnEvent> for Event {
    fn from(event: TurnEvent) -> Self {
        Event::Turn(event)
    }
}

impl From<WorldEvent> for Event {
    fn from(event: WorldEvent) -> Self {
        Event::World(event)
    }
}

impl From<MovementEvent> for Event {
    fn from(event: MovementEvent) -> Self {
        Event::Movement(event)
    }
}

struct Channels {
    turn: broadcast::Sender<Event>,
    world: broadcast::Sender<Event>,
    movement: broadcast::Sender<Event>,
}

/// Topic-based event bus
///
/// One broadcast channel per topic, created up front. Publishing never blocks;
/// subscribers that fall behind observe `Lagged` on their receiver.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<Channels>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            channels: Arc::new(Channels {
                turn: broadcast::channel(capacity).0,
                world: broadcast::channel(capacity).0,
                movement: broadcast::channel(capacity).0,
            }),
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: impl Into<Event>) {
        let event = event.into();
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!(target: "tactics::events", ?topic, "no subscribers");
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Turn => &self.channels.turn,
            Topic::World => &self.channels.world,
            Topic::Movement => &self.channels.movement,
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
