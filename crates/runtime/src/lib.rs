//! Turn-based runtime for the grid tactics simulation.
//!
//! This crate wires the deterministic world from `tactics-core` into an async
//! runtime: a single scheduler task alternates the player phase with AI passes,
//! actors move through a shared [`WorldHandle`], and every transition is
//! published on a topic-based [`EventBus`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the handle and error types downstream clients use
//! - [`actors`] defines the controlled actor, pursuers and the actor traits
//! - [`scheduler`] holds the phase model and the actor registry
//! - [`events`] provides the topic-based event bus
//! - [`workers`] keeps the scheduler task internal to the crate
pub mod actors;
pub mod api;
pub mod config;
pub mod events;
pub mod runtime;
pub mod scheduler;
pub mod world;

mod workers;

pub use actors::{AutonomousActor, ControlledActor, Mobile, PursuitActor, TurnTicket};
pub use api::{
    ActorError, MoveRequestError, Result, RuntimeError, SchedulerError, SchedulerHandle,
};
pub use config::SchedulerConfig;
pub use events::{Event, EventBus, MovementEvent, SkipReason, Topic, TurnEvent};
pub use runtime::{Runtime, RuntimeBuilder};
pub use scheduler::{ActorRecord, ActorRegistry, TurnPhase, TurnScheduler};
pub use world::WorldHandle;
