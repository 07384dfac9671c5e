//! A* search over the grid graph.
//!
//! Every call captures passability fresh from the supplied view, so results are
//! never computed against a stale picture of a mutating world. Search state
//! lives on the stack of a single call and is dropped when it returns.
//!
//! Movement modes:
//! - orthogonal: four neighbors, straight cost per step, Manhattan heuristic
//! - diagonal: eight neighbors, diagonal cost for corner steps, octile heuristic;
//!   a diagonal step is refused when either flanking orthogonal cell is blocked
mod heuristic;
mod open_set;
mod walkability;

pub use heuristic::Heuristic;
pub use walkability::WalkabilityView;

use crate::config::PathfinderConfig;
use crate::error::{CoreError, ErrorSeverity};
use crate::state::{Coordinate, Direction};

use open_set::OpenSet;
use walkability::WalkabilitySnapshot;

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathError {
    #[error("start {0} is out of bounds")]
    StartOutOfBounds(Coordinate),

    #[error("target {0} is out of bounds")]
    TargetOutOfBounds(Coordinate),

    #[error("target {0} is not walkable")]
    TargetBlocked(Coordinate),

    #[error("no walkable route from {start} to {target}")]
    Unreachable { start: Coordinate, target: Coordinate },
}

impl CoreError for PathError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            PathError::StartOutOfBounds(_) | PathError::TargetOutOfBounds(_) => {
                ErrorSeverity::Validation
            }
            PathError::TargetBlocked(_) | PathError::Unreachable { .. } => {
                ErrorSeverity::Recoverable
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            PathError::StartOutOfBounds(_) => "PATH_START_OUT_OF_BOUNDS",
            PathError::TargetOutOfBounds(_) => "PATH_TARGET_OUT_OF_BOUNDS",
            PathError::TargetBlocked(_) => "PATH_TARGET_BLOCKED",
            PathError::Unreachable { .. } => "PATH_UNREACHABLE",
        }
    }
}

/// Per-search bookkeeping for one cell.
#[derive(Clone, Copy, Debug)]
struct SearchNode {
    g: f32,
    h: f32,
    parent: Option<usize>,
    closed: bool,
}

impl SearchNode {
    const UNVISITED: Self = Self {
        g: f32::INFINITY,
        h: 0.0,
        parent: None,
        closed: false,
    };
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pathfinder {
    config: PathfinderConfig,
    heuristic: Heuristic,
}

impl Pathfinder {
    pub fn new(config: PathfinderConfig) -> Self {
        Self {
            config,
            heuristic: Heuristic::for_config(&config),
        }
    }

    pub fn config(&self) -> &PathfinderConfig {
        &self.config
    }

    pub fn allows_diagonal(&self) -> bool {
        self.config.allow_diagonal
    }

    /// Route from `start` to `target`, excluding `start` and ending at `target`.
    ///
    /// Returns an empty path when the endpoints coincide, either endpoint is out
    /// of bounds, the target is blocked, or no route exists. Failures are logged
    /// here; use [`Pathfinder::try_find_path`] to inspect the reason.
    pub fn find_path<V>(&self, start: Coordinate, target: Coordinate, view: &V) -> Vec<Coordinate>
    where
        V: WalkabilityView + ?Sized,
    {
        match self.try_find_path(start, target, view) {
            Ok(path) => path,
            Err(error @ PathError::Unreachable { .. }) => {
                tracing::warn!(
                    target: "tactics::pathfinding",
                    code = error.error_code(),
                    %start,
                    %target,
                    "no path found"
                );
                Vec::new()
            }
            Err(error) => {
                tracing::debug!(
                    target: "tactics::pathfinding",
                    code = error.error_code(),
                    %error,
                    "path request rejected"
                );
                Vec::new()
            }
        }
    }

    /// Like [`Pathfinder::find_path`] but reports why no path was produced.
    ///
    /// `start == target` is not an error and yields `Ok` with an empty path.
    pub fn try_find_path<V>(
        &self,
        start: Coordinate,
        target: Coordinate,
        view: &V,
    ) -> Result<Vec<Coordinate>, PathError>
    where
        V: WalkabilityView + ?Sized,
    {
        let mut snapshot = WalkabilitySnapshot::capture(view);
        let dimensions = snapshot.dimensions();

        if !dimensions.contains(start) {
            return Err(PathError::StartOutOfBounds(start));
        }
        if !dimensions.contains(target) {
            return Err(PathError::TargetOutOfBounds(target));
        }
        if start == target {
            return Ok(Vec::new());
        }
        if !snapshot.is_passable(target) {
            return Err(PathError::TargetBlocked(target));
        }
        snapshot.release(start);

        self.search(&snapshot, start, target)
    }

    fn search(
        &self,
        snapshot: &WalkabilitySnapshot,
        start: Coordinate,
        target: Coordinate,
    ) -> Result<Vec<Coordinate>, PathError> {
        let dimensions = snapshot.dimensions();
        let (Some(start_index), Some(target_index)) =
            (dimensions.index_of(start), dimensions.index_of(target))
        else {
            return Err(PathError::Unreachable { start, target });
        };

        let mut nodes = vec![SearchNode::UNVISITED; dimensions.area()];
        let mut open = OpenSet::with_capacity(dimensions.area().min(1024));

        let start_h = self.heuristic.estimate(start, target);
        nodes[start_index] = SearchNode {
            g: 0.0,
            h: start_h,
            parent: None,
            closed: false,
        };
        open.push(start_index, 0.0, start_h);

        let mut expanded = 0usize;
        while let Some(entry) = open.pop() {
            let current_index = entry.index;
            if nodes[current_index].closed || entry.g > nodes[current_index].g {
                continue;
            }
            nodes[current_index].closed = true;
            expanded += 1;

            if current_index == target_index {
                tracing::trace!(
                    target: "tactics::pathfinding",
                    %start,
                    %target,
                    expanded,
                    cost = nodes[target_index].g,
                    "path found"
                );
                return Ok(Self::reconstruct(&nodes, dimensions, target_index));
            }

            let current = dimensions.coordinate_of(current_index);
            let current_g = nodes[current_index].g;

            for &direction in Direction::for_mode(self.config.allow_diagonal) {
                let neighbor = current.step(direction);
                let Some(neighbor_index) = dimensions.index_of(neighbor) else {
                    continue;
                };
                if nodes[neighbor_index].closed || !snapshot.is_passable(neighbor) {
                    continue;
                }
                if direction.is_diagonal() && !Self::corner_is_clear(snapshot, current, direction)
                {
                    continue;
                }

                let tentative = current_g + self.step_cost(direction);
                let node = &mut nodes[neighbor_index];
                if tentative < node.g {
                    if node.g.is_infinite() {
                        node.h = self.heuristic.estimate(neighbor, target);
                    }
                    node.g = tentative;
                    node.parent = Some(current_index);
                    open.push(neighbor_index, tentative, node.h);
                }
            }
        }

        Err(PathError::Unreachable { start, target })
    }

    fn reconstruct(
        nodes: &[SearchNode],
        dimensions: crate::grid::GridDimensions,
        target_index: usize,
    ) -> Vec<Coordinate> {
        let mut path = Vec::new();
        let mut cursor = target_index;
        // The start node is the only one without a parent and is left out.
        while let Some(parent) = nodes[cursor].parent {
            path.push(dimensions.coordinate_of(cursor));
            cursor = parent;
        }
        path.reverse();
        path
    }

    fn corner_is_clear(
        snapshot: &WalkabilitySnapshot,
        from: Coordinate,
        direction: Direction,
    ) -> bool {
        let (dx, dy) = direction.delta();
        snapshot.is_passable(from.offset(dx, 0)) && snapshot.is_passable(from.offset(0, dy))
    }

    fn step_cost(&self, direction: Direction) -> f32 {
        if direction.is_diagonal() {
            self.config.diagonal_cost
        } else {
            self.config.straight_cost
        }
    }

    /// True when `to` is one legal step from `from` in the active movement mode.
    pub fn is_adjacent_step(&self, from: Coordinate, to: Coordinate) -> bool {
        let dx = from.x.abs_diff(to.x);
        let dy = from.y.abs_diff(to.y);
        match (dx, dy) {
            (1, 0) | (0, 1) => true,
            (1, 1) => self.config.allow_diagonal,
            _ => false,
        }
    }

    /// Total cost of walking `path` from `start`, or `None` if some step is not a
    /// legal single move.
    pub fn path_cost(&self, start: Coordinate, path: &[Coordinate]) -> Option<f32> {
        let mut cost = 0.0;
        let mut previous = start;
        for &step in path {
            if !self.is_adjacent_step(previous, step) {
                return None;
            }
            cost += if previous.x != step.x && previous.y != step.y {
                self.config.diagonal_cost
            } else {
                self.config.straight_cost
            };
            previous = step;
        }
        Some(cost)
    }
}

impl Default for Pathfinder {
    fn default() -> Self {
        Self::new(PathfinderConfig::default())
    }
}
