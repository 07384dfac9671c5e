//! Cloneable façade for issuing commands to the scheduler.
//!
//! [`SchedulerHandle`] hides channel plumbing and offers async helpers for
//! driving phases, managing registration and streaming events.
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot, watch};

use tactics_core::ActorId;

use super::errors::{Result, RuntimeError};
use crate::actors::AutonomousActor;
use crate::events::{Event, EventBus, Topic};
use crate::scheduler::TurnPhase;
use crate::workers::Command;

/// Client-facing handle to the turn scheduler
#[derive(Clone)]
pub struct SchedulerHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
    input: watch::Receiver<bool>,
}

impl SchedulerHandle {
    pub(crate) fn new(
        command_tx: mpsc::Sender<Command>,
        event_bus: EventBus,
        input: watch::Receiver<bool>,
    ) -> Self {
        Self {
            command_tx,
            event_bus,
            input,
        }
    }

    /// Enters the active player phase. Safe to call at any time; during an AI
    /// pass it cancels the pass first.
    pub async fn start_player_phase(&self) -> Result<()> {
        self.send(Command::StartPlayerPhase).await
    }

    /// Ends the active player phase and starts an AI pass. No-op otherwise.
    pub async fn end_player_phase(&self) -> Result<()> {
        self.send(Command::EndPlayerPhase).await
    }

    /// Ends the player phase, or cancels the running AI pass.
    pub async fn force_end_current_turn(&self) -> Result<()> {
        self.send(Command::ForceEndCurrentTurn).await
    }

    /// Returns `false` if an actor with the same id is already registered.
    pub async fn register(&self, actor: Arc<dyn AutonomousActor>) -> Result<bool> {
        self.request(|reply| Command::Register { actor, reply }).await
    }

    /// Returns `false` if the actor was not registered.
    pub async fn unregister(&self, actor: ActorId) -> Result<bool> {
        self.request(|reply| Command::Unregister { actor, reply }).await
    }

    pub async fn phase(&self) -> Result<TurnPhase> {
        self.request(|reply| Command::Phase { reply }).await
    }

    /// Registered actors in pass order, with their priorities.
    pub async fn registered(&self) -> Result<Vec<(ActorId, i32)>> {
        self.request(|reply| Command::Registered { reply }).await
    }

    /// Asks the worker to stop after the current step.
    pub async fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown).await
    }

    /// Whether the controlled actor currently accepts input.
    pub fn input(&self) -> watch::Receiver<bool> {
        self.input.clone()
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Turn` - Phase transitions and per-actor outcomes
    /// - `Topic::World` - Obstacle and occupancy changes
    /// - `Topic::Movement` - Controlled-actor walks
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(command(reply_tx)).await?;
        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }
}
