//! The single input-driven actor.
//!
//! A move request is validated, pathed and walked one committed step at a time.
//! When the walk ends the actor publishes [`MovementEvent::MovementCompleted`],
//! which the scheduler turns into the end of the player phase.
//!
//! One walk is allowed per player phase. Any change on the input channel after
//! a walk has started ends the phase it belonged to, so the walk halts before
//! its next step.
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, watch};

use tactics_core::{ActorBody, ActorId, Coordinate, CoreError};

use super::{BusyGuard, Mobile};
use crate::api::MoveRequestError;
use crate::events::MovementEvent;
use crate::world::WorldHandle;

pub struct ControlledActor {
    id: ActorId,
    body: Mutex<ActorBody>,
    world: WorldHandle,
    input: watch::Receiver<bool>,
    gate: Mutex<PhaseGate>,
    step_delay: Duration,
    walking: AtomicBool,
}

/// Tracks whether the current player phase has already been used for a walk.
struct PhaseGate {
    input: watch::Receiver<bool>,
    spent: bool,
}

impl PhaseGate {
    fn new(input: &watch::Receiver<bool>) -> Self {
        let mut input = input.clone();
        input.borrow_and_update();
        Self { input, spent: false }
    }

    /// Refuses a walk when input is off or this phase already had one.
    fn check(&mut self) -> Result<(), MoveRequestError> {
        if self.input.has_changed().unwrap_or(false) {
            self.spent = false;
        }
        if !*self.input.borrow_and_update() {
            return Err(MoveRequestError::InputDisabled);
        }
        if self.spent {
            return Err(MoveRequestError::TurnSpent);
        }
        Ok(())
    }

    fn spend(&mut self) {
        self.spent = true;
    }
}

impl ControlledActor {
    pub fn new(
        id: ActorId,
        world: WorldHandle,
        input: watch::Receiver<bool>,
        step_delay: Duration,
    ) -> Self {
        Self {
            id,
            body: Mutex::new(ActorBody::new(id)),
            world,
            gate: Mutex::new(PhaseGate::new(&input)),
            input,
            step_delay,
            walking: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn accepts_input(&self) -> bool {
        *self.input.borrow()
    }

    /// Walks to `target`, committing one step at a time. Returns the walked path.
    ///
    /// Rejections leave the world untouched and publish nothing.
    pub async fn request_move(&self, target: Coordinate) -> Result<Vec<Coordinate>, MoveRequestError> {
        let result = self.walk(target).await;
        if let Err(error) = &result {
            tracing::warn!(
                target: "tactics::actor",
                actor = %self.id,
                %target,
                code = error.error_code(),
                %error,
                "move request rejected"
            );
        }
        result
    }

    async fn walk(&self, target: Coordinate) -> Result<Vec<Coordinate>, MoveRequestError> {
        if !self.accepts_input() {
            return Err(MoveRequestError::InputDisabled);
        }
        let _walking = BusyGuard::acquire(&self.walking).ok_or(MoveRequestError::AlreadyMoving)?;
        let mut gate = self.gate.lock().await;
        gate.check()?;

        let from = self
            .current_position()
            .await
            .ok_or(MoveRequestError::NotInitialized(self.id))?;
        if from == target {
            return Err(MoveRequestError::AlreadyThere(from));
        }

        let path = {
            let world = self.world.read().await;
            world.try_find_path(from, target)
        }
        .map_err(|source| MoveRequestError::NoPath {
            from,
            to: target,
            source,
        })?;

        // Sees every input change since the gate was checked.
        let phase = gate.input.clone();
        gate.spend();
        drop(gate);

        self.world.event_bus().publish(MovementEvent::MoveStarted {
            actor: self.id,
            target,
            steps: path.len(),
        });
        tracing::info!(target: "tactics::actor", actor = %self.id, %from, %target, steps = path.len(), "walk started");

        let mut at = from;
        for (index, &step) in path.iter().enumerate() {
            if index > 0 && !self.step_delay.is_zero() {
                tokio::time::sleep(self.step_delay).await;
            }
            if phase.has_changed().unwrap_or(true) {
                tracing::info!(target: "tactics::actor", actor = %self.id, %at, "input revoked, walk halted");
                self.world
                    .event_bus()
                    .publish(MovementEvent::MovementCompleted { actor: self.id, at });
                return Err(MoveRequestError::InputRevoked { at });
            }
            if let Err(source) = self.commit_step(step).await {
                // The phase still has to end, so report where the walk stopped.
                self.world
                    .event_bus()
                    .publish(MovementEvent::MovementCompleted { actor: self.id, at });
                return Err(MoveRequestError::Interrupted { at, source });
            }
            at = step;
        }

        self.world
            .event_bus()
            .publish(MovementEvent::MovementCompleted { actor: self.id, at });
        tracing::info!(target: "tactics::actor", actor = %self.id, %at, "walk completed");
        Ok(path)
    }
}

#[async_trait]
impl Mobile for ControlledActor {
    fn body(&self) -> &Mutex<ActorBody> {
        &self.body
    }

    fn world(&self) -> &WorldHandle {
        &self.world
    }
}
