//! High-level runtime orchestrator.
//!
//! The builder is the startup sequencer: it creates the event bus and world
//! handle, starts the scheduler (which subscribes to movement signals before any
//! actor exists), places the controlled actor, then initializes and registers
//! each autonomous actor. No component polls another for readiness.

use std::sync::Arc;

use tokio::task::JoinHandle;

use tactics_core::{ActorId, Coordinate, World};

use crate::actors::{AutonomousActor, ControlledActor, Mobile, PursuitActor};
use crate::api::{Result, RuntimeError, SchedulerHandle};
use crate::config::SchedulerConfig;
use crate::events::EventBus;
use crate::scheduler::TurnScheduler;
use crate::world::WorldHandle;

/// Main runtime that owns the scheduler worker and the actors it drives.
///
/// [`SchedulerHandle`] and [`WorldHandle`] are cloneable façades for clients.
pub struct Runtime {
    scheduler: SchedulerHandle,
    world: WorldHandle,
    controlled: Arc<ControlledActor>,
    actors: Vec<Arc<dyn AutonomousActor>>,
    worker: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    pub fn scheduler(&self) -> SchedulerHandle {
        self.scheduler.clone()
    }

    pub fn world(&self) -> WorldHandle {
        self.world.clone()
    }

    pub fn controlled(&self) -> Arc<ControlledActor> {
        Arc::clone(&self.controlled)
    }

    /// Autonomous actors created at build time, in the order they were added.
    pub fn actors(&self) -> &[Arc<dyn AutonomousActor>] {
        &self.actors
    }

    /// Shutdown the runtime gracefully
    pub async fn shutdown(self) -> Result<()> {
        // A worker that already stopped has dropped its receiver.
        if let Err(error) = self.scheduler.shutdown().await {
            tracing::debug!(target: "tactics::runtime", %error, "scheduler already stopped");
        }
        self.worker.await.map_err(RuntimeError::WorkerJoin)
    }
}

enum ActorSpec {
    Pursuer { id: ActorId, priority: i32, start: Coordinate },
    Custom { actor: Arc<dyn AutonomousActor>, start: Coordinate },
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: SchedulerConfig,
    world: Option<World>,
    controlled_start: Coordinate,
    actors: Vec<ActorSpec>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: SchedulerConfig::default(),
            world: None,
            controlled_start: Coordinate::ORIGIN,
            actors: Vec::new(),
        }
    }

    /// Override scheduler configuration
    pub fn config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the required world (grid, obstacles, pathfinder)
    pub fn world(mut self, world: World) -> Self {
        self.world = Some(world);
        self
    }

    /// Preferred spawn cell of the controlled actor
    pub fn controlled_start(mut self, start: Coordinate) -> Self {
        self.controlled_start = start;
        self
    }

    /// Adds a pursuer that chases the controlled actor.
    pub fn pursuer(mut self, id: ActorId, priority: i32, start: Coordinate) -> Self {
        self.actors.push(ActorSpec::Pursuer { id, priority, start });
        self
    }

    /// Adds any autonomous actor; it is initialized at `start` and registered.
    pub fn actor(mut self, actor: Arc<dyn AutonomousActor>, start: Coordinate) -> Self {
        self.actors.push(ActorSpec::Custom { actor, start });
        self
    }

    /// Build the runtime
    ///
    /// A failed spawn leaves that actor uninitialized. It is still registered and
    /// is skipped by every AI pass.
    pub async fn build(self) -> Result<Runtime> {
        let world = self.world.ok_or(RuntimeError::MissingWorld)?;

        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);
        let world = WorldHandle::new(world, event_bus.clone());
        let (scheduler, worker) = TurnScheduler::spawn(self.config.clone(), event_bus);

        let controlled = Arc::new(ControlledActor::new(
            ActorId::PLAYER,
            world.clone(),
            scheduler.input(),
            self.config.step_delay,
        ));
        // Failure is logged by `place`; the actor stays uninitialized.
        let _ = controlled.place(self.controlled_start).await;

        let mut actors = Vec::with_capacity(self.actors.len());
        for spec in self.actors {
            let (actor, start): (Arc<dyn AutonomousActor>, _) = match spec {
                ActorSpec::Pursuer { id, priority, start } => {
                    let target: Arc<dyn Mobile> = controlled.clone();
                    let pursuer = PursuitActor::new(
                        id,
                        priority,
                        world.clone(),
                        target,
                        self.config.think_delay,
                    );
                    (Arc::new(pursuer), start)
                }
                ActorSpec::Custom { actor, start } => (actor, start),
            };

            if let Err(error) = actor.initialize(start).await {
                tracing::error!(target: "tactics::runtime", actor = %actor.id(), %start, %error, "actor initialization failed");
            }
            scheduler.register(Arc::clone(&actor)).await?;
            actors.push(actor);
        }

        tracing::info!(
            target: "tactics::runtime",
            actors = actors.len(),
            auto_start = self.config.auto_start,
            "runtime built"
        );

        Ok(Runtime {
            scheduler,
            world,
            controlled,
            actors,
            worker,
        })
    }
}
