//! The single owner of grid, obstacle overlay and pathfinder.
//!
//! [`World`] keeps the obstacle/cell invariant by routing every obstacle change
//! through [`ObstacleLayer`] against its own grid, and keeps actor occupancy in
//! step with [`ActorBody`] positions. Notifications are queued as
//! [`WorldEvent`]s and drained by whoever publishes them.
use std::collections::{HashSet, VecDeque};

use crate::config::GameConfig;
use crate::error::CoreError;
use crate::grid::{Grid, GridDimensions, GridError};
use crate::movement::{ActorBody, MoveError, SpawnError};
use crate::obstacles::{ObstacleError, ObstacleHandle, ObstacleLayer};
use crate::pathfinding::{PathError, Pathfinder, WalkabilityView};
use crate::state::{ActorId, Coordinate};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WorldEvent {
    ObstacleAdded {
        coordinate: Coordinate,
        handle: ObstacleHandle,
    },
    ObstacleRemoved {
        coordinate: Coordinate,
        handle: ObstacleHandle,
    },
    ObstaclesCleared {
        count: usize,
    },
    ActorPlaced {
        actor: ActorId,
        at: Coordinate,
    },
    ActorMoved {
        actor: ActorId,
        from: Coordinate,
        to: Coordinate,
    },
    ActorRemoved {
        actor: ActorId,
        from: Coordinate,
    },
}

#[derive(Clone, Debug)]
pub struct World {
    grid: Grid,
    obstacles: ObstacleLayer,
    pathfinder: Pathfinder,
    pending: Vec<WorldEvent>,
}

impl World {
    pub fn new(config: &GameConfig) -> Result<Self, GridError> {
        Ok(Self {
            grid: Grid::new(&config.grid)?,
            obstacles: ObstacleLayer::new(),
            pathfinder: Pathfinder::new(config.pathfinding),
            pending: Vec::new(),
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Direct grid access for static terrain setup. Obstacles and actors must go
    /// through the dedicated methods so the overlay stays consistent.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn obstacles(&self) -> &ObstacleLayer {
        &self.obstacles
    }

    pub fn pathfinder(&self) -> &Pathfinder {
        &self.pathfinder
    }

    pub fn dimensions(&self) -> GridDimensions {
        self.grid.dimensions()
    }

    // ===== obstacle surface =====

    /// Places an obstacle. Duplicates and out-of-bounds requests are logged and
    /// returned as errors without touching the grid.
    pub fn spawn_obstacle(&mut self, coordinate: Coordinate) -> Result<ObstacleHandle, ObstacleError> {
        match self.obstacles.add(&mut self.grid, coordinate) {
            Ok(handle) => {
                tracing::debug!(target: "tactics::obstacles", %coordinate, ?handle, "obstacle added");
                self.pending.push(WorldEvent::ObstacleAdded { coordinate, handle });
                Ok(handle)
            }
            Err(error) => {
                tracing::warn!(
                    target: "tactics::obstacles",
                    code = error.error_code(),
                    %error,
                    "obstacle not added"
                );
                Err(error)
            }
        }
    }

    pub fn remove_obstacle(&mut self, coordinate: Coordinate) -> Option<ObstacleHandle> {
        let handle = self.obstacles.remove(&mut self.grid, coordinate)?;
        tracing::debug!(target: "tactics::obstacles", %coordinate, ?handle, "obstacle removed");
        self.pending.push(WorldEvent::ObstacleRemoved { coordinate, handle });
        Some(handle)
    }

    /// Removes every obstacle and returns how many there were.
    pub fn clear_all_obstacles(&mut self) -> usize {
        let removed = self.obstacles.clear(&mut self.grid);
        for &(coordinate, handle) in &removed {
            self.pending.push(WorldEvent::ObstacleRemoved { coordinate, handle });
        }
        self.pending.push(WorldEvent::ObstaclesCleared {
            count: removed.len(),
        });
        tracing::debug!(target: "tactics::obstacles", count = removed.len(), "obstacles cleared");
        removed.len()
    }

    pub fn obstacle_at(&self, coordinate: Coordinate) -> bool {
        self.obstacles.contains(coordinate)
    }

    // ===== pathfinding =====

    pub fn find_path(&self, start: Coordinate, target: Coordinate) -> Vec<Coordinate> {
        self.pathfinder.find_path(start, target, &self.grid)
    }

    pub fn try_find_path(
        &self,
        start: Coordinate,
        target: Coordinate,
    ) -> Result<Vec<Coordinate>, PathError> {
        self.pathfinder.try_find_path(start, target, &self.grid)
    }

    // ===== actors =====

    /// Closest free cell to `near` by breadth-first distance, `near` included.
    pub fn nearest_free_cell(&self, near: Coordinate) -> Option<Coordinate> {
        if !self.grid.is_valid(near) {
            return None;
        }

        let mut visited = HashSet::from([near]);
        let mut queue = VecDeque::from([near]);
        while let Some(current) = queue.pop_front() {
            if self.grid.is_free(current) {
                return Some(current);
            }
            for neighbor in self.grid.neighbors(current, false) {
                if visited.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }
        None
    }

    /// Puts an unplaced actor on the nearest free cell to `preferred`.
    pub fn place_actor(
        &mut self,
        body: &mut ActorBody,
        preferred: Coordinate,
    ) -> Result<Coordinate, SpawnError> {
        if body.is_placed() {
            return Err(SpawnError::AlreadyPlaced(body.id()));
        }
        if !self.grid.is_valid(preferred) {
            return Err(SpawnError::OutOfBounds(preferred));
        }
        let at = self
            .nearest_free_cell(preferred)
            .ok_or(SpawnError::NoFreeCell { near: preferred })?;

        self.grid
            .set_occupied(at, true)
            .map_err(|_| SpawnError::OutOfBounds(at))?;
        body.set_coordinate(Some(at));
        self.pending.push(WorldEvent::ActorPlaced { actor: body.id(), at });
        Ok(at)
    }

    /// Moves a placed actor one step. Validation happens before any flag
    /// changes, so a rejected move leaves the grid as it was.
    pub fn commit_move(&mut self, body: &mut ActorBody, to: Coordinate) -> Result<(), MoveError> {
        let actor = body.id();
        let from = body.coordinate().ok_or(MoveError::NotPlaced(actor))?;

        if from == to {
            return Ok(());
        }
        if !self.pathfinder.is_adjacent_step(from, to) {
            return Err(MoveError::NotAdjacent { from, to });
        }
        let destination = self
            .grid
            .cell_at(to)
            .ok_or(MoveError::OutOfBounds { destination: to })?;
        if !destination.is_walkable() {
            return Err(MoveError::Blocked { destination: to });
        }
        if destination.is_occupied() {
            return Err(MoveError::Occupied { destination: to });
        }
        if !self.corner_is_clear(from, to) {
            return Err(MoveError::CornerCut { from, to });
        }
        if !self.grid.is_occupied(from) {
            return Err(MoveError::OccupancyDesync {
                actor,
                position: from,
            });
        }

        self.grid
            .set_occupied(from, false)
            .and_then(|()| self.grid.set_occupied(to, true))
            .map_err(|_| MoveError::OutOfBounds { destination: to })?;
        body.set_coordinate(Some(to));

        tracing::trace!(target: "tactics::movement", %actor, %from, %to, "move committed");
        self.pending.push(WorldEvent::ActorMoved { actor, from, to });
        Ok(())
    }

    /// Both orthogonal neighbours a diagonal step squeezes past must be free.
    /// Straight steps always pass.
    pub fn corner_is_clear(&self, from: Coordinate, to: Coordinate) -> bool {
        let (dx, dy) = (to.x - from.x, to.y - from.y);
        dx == 0
            || dy == 0
            || (self.grid.is_free(from.offset(dx, 0)) && self.grid.is_free(from.offset(0, dy)))
    }

    /// Takes an actor off the grid, freeing its cell.
    pub fn vacate(&mut self, body: &mut ActorBody) -> Option<Coordinate> {
        let from = body.coordinate()?;
        if let Err(error) = self.grid.set_occupied(from, false) {
            tracing::error!(target: "tactics::movement", %error, "actor was outside the grid");
        }
        body.set_coordinate(None);
        self.pending.push(WorldEvent::ActorRemoved {
            actor: body.id(),
            from,
        });
        Some(from)
    }

    /// Hands over queued notifications, oldest first.
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.pending)
    }
}

impl WalkabilityView for World {
    fn dimensions(&self) -> GridDimensions {
        self.grid.dimensions()
    }

    fn is_passable(&self, coordinate: Coordinate) -> bool {
        self.grid.is_free(coordinate)
    }
}
