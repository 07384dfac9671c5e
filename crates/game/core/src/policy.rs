//! Adjacency-seeking pursuit.
//!
//! Each turn an autonomous actor picks one destination:
//! 1. already orthogonally adjacent to the target: stay;
//! 2. otherwise aim for the free orthogonal neighbor of the target closest to
//!    the actor (first in neighbor order on ties) and take the first path step;
//! 3. with no aim cell or no path, try a greedy step toward the target;
//! 4. otherwise stay.
//!
//! The policy only decides. Committing the move is the caller's job.
use crate::state::Coordinate;
use crate::world::World;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StayReason {
    AlreadyAdjacent,
    NoRoute,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepSource {
    Path,
    Greedy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Stay(StayReason),
    Step { to: Coordinate, source: StepSource },
}

impl Decision {
    /// The single destination for this turn.
    pub fn destination(&self, current: Coordinate) -> Coordinate {
        match *self {
            Decision::Stay(_) => current,
            Decision::Step { to, .. } => to,
        }
    }

    pub fn is_step(&self) -> bool {
        matches!(self, Decision::Step { .. })
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PursuitPolicy;

impl PursuitPolicy {
    pub fn new() -> Self {
        Self
    }

    pub fn decide(&self, world: &World, current: Coordinate, target: Coordinate) -> Decision {
        if current.is_orthogonally_adjacent(target) {
            return Decision::Stay(StayReason::AlreadyAdjacent);
        }

        if let Some(aim) = self.approach_cell(world, current, target) {
            // Recomputed every turn; the world may have changed since the last one.
            if let Some(&first) = world.find_path(current, aim).first() {
                return Decision::Step {
                    to: first,
                    source: StepSource::Path,
                };
            }
        }

        match self.greedy_step(world, current, target) {
            Some(to) => Decision::Step {
                to,
                source: StepSource::Greedy,
            },
            None => Decision::Stay(StayReason::NoRoute),
        }
    }

    /// Free orthogonal neighbor of `target` nearest to `current`.
    pub fn approach_cell(
        &self,
        world: &World,
        current: Coordinate,
        target: Coordinate,
    ) -> Option<Coordinate> {
        let grid = world.grid();
        let mut best: Option<(Coordinate, f32)> = None;
        for candidate in grid.neighbors(target, false) {
            if !grid.is_free(candidate) {
                continue;
            }
            let distance = candidate.euclidean(current);
            if best.is_none_or(|(_, best_distance)| distance < best_distance) {
                best = Some((candidate, distance));
            }
        }
        best.map(|(cell, _)| cell)
    }

    /// One step that reduces the per-axis distance to `target`.
    ///
    /// With diagonal movement the clamped delta is tried as is, provided it
    /// does not cut a blocked corner. In orthogonal mode a diagonal delta is
    /// split into its two axes, larger gap first.
    pub fn greedy_step(
        &self,
        world: &World,
        current: Coordinate,
        target: Coordinate,
    ) -> Option<Coordinate> {
        let dx = (target.x - current.x).signum();
        let dy = (target.y - current.y).signum();
        if dx == 0 && dy == 0 {
            return None;
        }

        let grid = world.grid();
        let candidates = if dx != 0 && dy != 0 && !world.pathfinder().allows_diagonal() {
            let horizontal = current.offset(dx, 0);
            let vertical = current.offset(0, dy);
            if target.x.abs_diff(current.x) >= target.y.abs_diff(current.y) {
                [Some(horizontal), Some(vertical)]
            } else {
                [Some(vertical), Some(horizontal)]
            }
        } else {
            [Some(current.offset(dx, dy)), None]
        };

        candidates
            .into_iter()
            .flatten()
            .find(|&cell| grid.is_free(cell) && world.corner_is_clear(current, cell))
    }
}
