//! Shared, event-publishing access to the [`World`].
//!
//! Every mutation goes through [`WorldHandle::update`], which drains the
//! world's queued notifications and publishes them on [`Topic::World`] before
//! releasing the lock.
//!
//! [`Topic::World`]: crate::events::Topic::World
use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard};

use tactics_core::{
    ActorBody, Coordinate, MoveError, ObstacleError, ObstacleHandle, SpawnError, World,
};

use crate::events::EventBus;

#[derive(Clone)]
pub struct WorldHandle {
    world: Arc<RwLock<World>>,
    event_bus: EventBus,
}

impl WorldHandle {
    pub fn new(world: World, event_bus: EventBus) -> Self {
        Self {
            world: Arc::new(RwLock::new(world)),
            event_bus,
        }
    }

    /// Read access for queries. Hold it only for the duration of one decision.
    pub async fn read(&self) -> RwLockReadGuard<'_, World> {
        self.world.read().await
    }

    /// Runs `f` with write access, then publishes whatever it queued.
    pub async fn update<R>(&self, f: impl FnOnce(&mut World) -> R) -> R {
        let mut world = self.world.write().await;
        let result = f(&mut world);
        for event in world.drain_events() {
            self.event_bus.publish(event);
        }
        result
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub async fn spawn_obstacle(&self, coordinate: Coordinate) -> Result<ObstacleHandle, ObstacleError> {
        self.update(|world| world.spawn_obstacle(coordinate)).await
    }

    pub async fn remove_obstacle(&self, coordinate: Coordinate) -> Option<ObstacleHandle> {
        self.update(|world| world.remove_obstacle(coordinate)).await
    }

    pub async fn clear_all_obstacles(&self) -> usize {
        self.update(World::clear_all_obstacles).await
    }

    pub async fn obstacle_at(&self, coordinate: Coordinate) -> bool {
        self.read().await.obstacle_at(coordinate)
    }

    pub async fn find_path(&self, start: Coordinate, target: Coordinate) -> Vec<Coordinate> {
        self.read().await.find_path(start, target)
    }

    pub async fn place_actor(
        &self,
        body: &mut ActorBody,
        preferred: Coordinate,
    ) -> Result<Coordinate, SpawnError> {
        self.update(|world| world.place_actor(body, preferred)).await
    }

    pub async fn commit_move(&self, body: &mut ActorBody, to: Coordinate) -> Result<(), MoveError> {
        self.update(|world| world.commit_move(body, to)).await
    }

    pub async fn vacate(&self, body: &mut ActorBody) -> Option<Coordinate> {
        self.update(|world| world.vacate(body)).await
    }
}
