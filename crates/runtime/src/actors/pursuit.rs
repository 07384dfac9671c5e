//! Autonomous actor that closes in on a target actor one step per turn.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use tactics_core::{ActorBody, ActorId, Coordinate, Decision, PursuitPolicy};

use super::{AutonomousActor, BusyGuard, Mobile, TurnTicket};
use crate::api::ActorError;
use crate::world::WorldHandle;

pub struct PursuitActor {
    id: ActorId,
    priority: i32,
    body: Mutex<ActorBody>,
    world: WorldHandle,
    target: Arc<dyn Mobile>,
    policy: PursuitPolicy,
    think_delay: Duration,
    busy: AtomicBool,
    initialized: AtomicBool,
}

impl PursuitActor {
    pub fn new(
        id: ActorId,
        priority: i32,
        world: WorldHandle,
        target: Arc<dyn Mobile>,
        think_delay: Duration,
    ) -> Self {
        Self {
            id,
            priority,
            body: Mutex::new(ActorBody::new(id)),
            world,
            target,
            policy: PursuitPolicy::new(),
            think_delay,
            busy: AtomicBool::new(false),
            initialized: AtomicBool::new(false),
        }
    }

    /// Decides and commits at most one step. Returns the decision taken.
    async fn act(&self) -> Result<Decision, ActorError> {
        let target = self
            .target
            .current_position()
            .await
            .ok_or(ActorError::NoTarget(self.id))?;
        let current = self
            .current_position()
            .await
            .ok_or(ActorError::NotInitialized(self.id))?;

        let decision = {
            let world = self.world.read().await;
            self.policy.decide(&world, current, target)
        };

        match decision {
            Decision::Stay(reason) => {
                tracing::debug!(target: "tactics::actor", actor = %self.id, %current, ?reason, "staying");
            }
            Decision::Step { to, source } => {
                self.commit_step(to).await?;
                tracing::debug!(target: "tactics::actor", actor = %self.id, from = %current, %to, ?source, "stepped");
            }
        }
        Ok(decision)
    }
}

#[async_trait]
impl Mobile for PursuitActor {
    fn body(&self) -> &Mutex<ActorBody> {
        &self.body
    }

    fn world(&self) -> &WorldHandle {
        &self.world
    }
}

#[async_trait]
impl AutonomousActor for PursuitActor {
    fn id(&self) -> ActorId {
        self.id
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    async fn position(&self) -> Option<Coordinate> {
        self.current_position().await
    }

    fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn can_take_turn(&self) -> Result<bool, ActorError> {
        Ok(self.initialized.load(Ordering::Acquire) && !self.is_busy())
    }

    async fn initialize(&self, start: Coordinate) -> Result<Coordinate, ActorError> {
        let at = self.place(start).await?;
        self.initialized.store(true, Ordering::Release);
        Ok(at)
    }

    async fn take_turn(&self, ticket: TurnTicket) -> Result<(), ActorError> {
        let _busy = BusyGuard::acquire(&self.busy).ok_or(ActorError::Busy(self.id))?;

        if !self.think_delay.is_zero() {
            tokio::time::sleep(self.think_delay).await;
        }
        self.act().await?;

        ticket.complete();
        Ok(())
    }

    fn abort_turn(&self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::ControlledActor;
    use crate::events::EventBus;
    use tactics_core::{GameConfig, GridConfig, PathfinderConfig, World};
    use tokio::sync::watch;

    struct Fixture {
        world: WorldHandle,
        target: Arc<ControlledActor>,
    }

    async fn fixture(target_at: Option<Coordinate>) -> Fixture {
        let config = GameConfig::new(GridConfig::new(8, 8), PathfinderConfig::orthogonal());
        let world = WorldHandle::new(World::new(&config).unwrap(), EventBus::new());
        let (_input_tx, input_rx) = watch::channel(false);
        let target = Arc::new(ControlledActor::new(
            ActorId::PLAYER,
            world.clone(),
            input_rx,
            Duration::ZERO,
        ));
        if let Some(at) = target_at {
            target.place(at).await.unwrap();
        }
        Fixture { world, target }
    }

    impl Fixture {
        fn pursuer(&self, id: u32) -> PursuitActor {
            PursuitActor::new(ActorId(id), 1, self.world.clone(), self.target.clone(), Duration::ZERO)
        }
    }

    async fn take_turn(actor: &PursuitActor) -> Result<(), ActorError> {
        let (ticket, done) = TurnTicket::new(actor.id());
        actor.take_turn(ticket).await?;
        done.await.map_err(|_| ActorError::TicketDropped(actor.id()))
    }

    #[tokio::test]
    async fn uninitialized_pursuer_cannot_take_turn() {
        let f = fixture(Some(Coordinate::ORIGIN)).await;
        let pursuer = f.pursuer(1);
        assert_eq!(pursuer.can_take_turn(), Ok(false));
        assert_eq!(pursuer.position().await, None);
    }

    #[tokio::test]
    async fn each_turn_moves_one_step_closer_until_adjacent() {
        let f = fixture(Some(Coordinate::ORIGIN)).await;
        let pursuer = f.pursuer(1);
        pursuer.initialize(Coordinate::new(5, 0)).await.unwrap();
        assert_eq!(pursuer.can_take_turn(), Ok(true));

        for expected in [4, 3, 2, 1] {
            take_turn(&pursuer).await.unwrap();
            assert_eq!(pursuer.position().await, Some(Coordinate::new(expected, 0)));
        }
        take_turn(&pursuer).await.unwrap();
        assert_eq!(pursuer.position().await, Some(Coordinate::new(1, 0)));
        assert!(!pursuer.is_busy());
    }

    #[tokio::test]
    async fn occupancy_follows_committed_steps() {
        let f = fixture(Some(Coordinate::ORIGIN)).await;
        let pursuer = f.pursuer(1);
        pursuer.initialize(Coordinate::new(0, 4)).await.unwrap();
        take_turn(&pursuer).await.unwrap();

        let world = f.world.read().await;
        assert!(!world.grid().is_occupied(Coordinate::new(0, 4)));
        assert!(world.grid().is_occupied(Coordinate::new(0, 3)));
        assert!(world.grid().is_occupied(Coordinate::ORIGIN));
    }

    #[tokio::test]
    async fn unplaced_target_fails_the_turn_and_clears_busy() {
        let f = fixture(None).await;
        let pursuer = f.pursuer(2);
        pursuer.initialize(Coordinate::new(3, 3)).await.unwrap();
        assert_eq!(take_turn(&pursuer).await, Err(ActorError::NoTarget(ActorId(2))));
        assert!(!pursuer.is_busy());
    }

    #[tokio::test]
    async fn spawn_falls_back_to_nearest_free_cell() {
        let f = fixture(Some(Coordinate::new(2, 2))).await;
        let pursuer = f.pursuer(1);
        let at = pursuer.initialize(Coordinate::new(2, 2)).await.unwrap();
        assert_ne!(at, Coordinate::new(2, 2));
        assert_eq!(at.manhattan(Coordinate::new(2, 2)), 1);
    }
}
