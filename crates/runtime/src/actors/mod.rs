//! Actor capabilities driven by the scheduler.
//!
//! - [`AutonomousActor`] is what the scheduler calls during an AI pass.
//! - [`Mobile`] is the movement/occupancy pattern shared by the controlled actor
//!   and the pursuers, so the commit logic lives in one place.
//! - [`TurnTicket`] is the turn-complete signal. It is consumed on use, so an
//!   actor can report completion at most once per turn.
mod controlled;
mod pursuit;

pub use controlled::ControlledActor;
pub use pursuit::PursuitActor;

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, oneshot};

use tactics_core::{ActorBody, ActorId, Coordinate, MoveError, SpawnError};

use crate::api::ActorError;
use crate::world::WorldHandle;

/// Capability set the scheduler needs from an autonomous actor.
#[async_trait]
pub trait AutonomousActor: Send + Sync {
    fn id(&self) -> ActorId;

    /// Lower acts earlier within an AI pass.
    fn priority(&self) -> i32;

    async fn position(&self) -> Option<Coordinate>;

    fn is_busy(&self) -> bool;

    /// `Ok(false)` while uninitialized or busy. An error is treated as "not this pass".
    fn can_take_turn(&self) -> Result<bool, ActorError>;

    /// Places the actor on the nearest free cell to `start`.
    async fn initialize(&self, start: Coordinate) -> Result<Coordinate, ActorError>;

    /// Acts once and completes `ticket`. The ticket may be handed to a
    /// background task and completed later; the scheduler waits for it.
    async fn take_turn(&self, ticket: TurnTicket) -> Result<(), ActorError>;

    /// Called after a timed-out or cancelled turn so no state is left mid-turn.
    fn abort_turn(&self) {}
}

/// One-shot completion signal for a single turn.
#[derive(Debug)]
pub struct TurnTicket {
    actor: ActorId,
    done: oneshot::Sender<()>,
}

impl TurnTicket {
    pub(crate) fn new(actor: ActorId) -> (Self, oneshot::Receiver<()>) {
        let (done, rx) = oneshot::channel();
        (Self { actor, done }, rx)
    }

    pub fn actor(&self) -> ActorId {
        self.actor
    }

    /// Reports turn completion. A scheduler that has stopped waiting is ignored.
    pub fn complete(self) {
        if self.done.send(()).is_err() {
            tracing::debug!(target: "tactics::actor", actor = %self.actor, "turn completed after scheduler moved on");
        }
    }
}

/// Shared movement and occupancy pattern.
#[async_trait]
pub trait Mobile: Send + Sync {
    fn body(&self) -> &Mutex<ActorBody>;

    fn world(&self) -> &WorldHandle;

    async fn current_position(&self) -> Option<Coordinate> {
        self.body().lock().await.coordinate()
    }

    /// Commits one step: vacate the origin, occupy the destination.
    async fn commit_step(&self, to: Coordinate) -> Result<(), MoveError> {
        let mut body = self.body().lock().await;
        self.world().commit_move(&mut body, to).await
    }

    async fn place(&self, preferred: Coordinate) -> Result<Coordinate, SpawnError> {
        let mut body = self.body().lock().await;
        let result = self.world().place_actor(&mut body, preferred).await;
        match &result {
            Ok(at) => {
                tracing::info!(target: "tactics::actor", actor = %body.id(), %at, "actor placed");
            }
            Err(error) => {
                tracing::error!(
                    target: "tactics::actor",
                    actor = %body.id(),
                    %preferred,
                    %error,
                    "actor left uninitialized"
                );
            }
        }
        result
    }

    /// Takes the actor off the grid.
    async fn remove(&self) -> Option<Coordinate> {
        let mut body = self.body().lock().await;
        self.world().vacate(&mut body).await
    }
}

/// Sets a busy flag for the lifetime of the guard.
pub(crate) struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
