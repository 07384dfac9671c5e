//! Topic-based event bus for runtime events.
//!
//! Events are published to a topic, and consumers subscribe only to the topics
//! they need. The scheduler listens on [`Topic::Movement`] for the controlled
//! actor's completion signal and publishes on [`Topic::Turn`].

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{MovementEvent, SkipReason, TurnEvent};
