//! Runtime-mutable obstacle overlay.
//!
//! A coordinate present in the layer always has its cell marked unwalkable and
//! occupied. The layer only touches the dynamic walkable flag, never terrain, so
//! removing an obstacle placed over a wall leaves the wall in place.
use std::collections::BTreeMap;

use crate::error::{CoreError, ErrorSeverity};
use crate::grid::{Grid, GridError};
use crate::state::Coordinate;

/// Opaque handle identifying one placed obstacle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObstacleHandle(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ObstacleError {
    #[error("obstacle already present at {coordinate} (handle {existing:?})")]
    AlreadyPresent {
        coordinate: Coordinate,
        existing: ObstacleHandle,
    },

    #[error("obstacle coordinate {0} is out of bounds")]
    OutOfBounds(Coordinate),

    #[error("cell {0} is held by an actor")]
    CellOccupied(Coordinate),
}

impl CoreError for ObstacleError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            ObstacleError::AlreadyPresent { .. } => "OBSTACLE_DUPLICATE",
            ObstacleError::OutOfBounds(_) => "OBSTACLE_OUT_OF_BOUNDS",
            ObstacleError::CellOccupied(_) => "OBSTACLE_CELL_OCCUPIED",
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ObstacleLayer {
    entries: BTreeMap<Coordinate, ObstacleHandle>,
    next_handle: u32,
}

impl ObstacleLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places an obstacle and marks its cell unwalkable and occupied.
    ///
    /// A cell already held by an actor is refused, since removing the obstacle
    /// later would clear that actor's occupancy.
    pub fn add(
        &mut self,
        grid: &mut Grid,
        coordinate: Coordinate,
    ) -> Result<ObstacleHandle, ObstacleError> {
        if let Some(&existing) = self.entries.get(&coordinate) {
            return Err(ObstacleError::AlreadyPresent {
                coordinate,
                existing,
            });
        }

        if !grid.is_valid(coordinate) {
            return Err(ObstacleError::OutOfBounds(coordinate));
        }
        if grid.is_occupied(coordinate) {
            return Err(ObstacleError::CellOccupied(coordinate));
        }

        Self::mark(grid, coordinate, true).map_err(|_| ObstacleError::OutOfBounds(coordinate))?;

        let handle = ObstacleHandle(self.next_handle);
        self.next_handle += 1;
        self.entries.insert(coordinate, handle);
        Ok(handle)
    }

    /// Removes the obstacle at `coordinate`, restoring the cell. No-op when absent.
    pub fn remove(&mut self, grid: &mut Grid, coordinate: Coordinate) -> Option<ObstacleHandle> {
        let handle = self.entries.remove(&coordinate)?;
        if let Err(error) = Self::mark(grid, coordinate, false) {
            // Entries are bounds-checked on insert, so this means the grid was swapped.
            tracing::error!(target: "tactics::obstacles", %error, "obstacle outside grid on remove");
        }
        Some(handle)
    }

    /// Removes every obstacle, returning what was removed in coordinate order.
    pub fn clear(&mut self, grid: &mut Grid) -> Vec<(Coordinate, ObstacleHandle)> {
        let removed: Vec<_> = std::mem::take(&mut self.entries).into_iter().collect();
        for &(coordinate, _) in &removed {
            if let Err(error) = Self::mark(grid, coordinate, false) {
                tracing::error!(target: "tactics::obstacles", %error, "obstacle outside grid on clear");
            }
        }
        removed
    }

    pub fn contains(&self, coordinate: Coordinate) -> bool {
        self.entries.contains_key(&coordinate)
    }

    pub fn handle_at(&self, coordinate: Coordinate) -> Option<ObstacleHandle> {
        self.entries.get(&coordinate).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Coordinate, ObstacleHandle)> + '_ {
        self.entries.iter().map(|(&c, &h)| (c, h))
    }

    fn mark(grid: &mut Grid, coordinate: Coordinate, blocked: bool) -> Result<(), GridError> {
        grid.set_walkable(coordinate, !blocked)?;
        grid.set_occupied(coordinate, blocked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfig;
    use crate::grid::TerrainKind;

    fn setup() -> (Grid, ObstacleLayer) {
        let grid = Grid::new(&GridConfig::new(6, 6)).expect("valid grid");
        (grid, ObstacleLayer::new())
    }

    #[test]
    fn add_blocks_and_occupies_cell() {
        let (mut grid, mut layer) = setup();
        let c = Coordinate::new(2, 3);
        let handle = layer.add(&mut grid, c).expect("first add succeeds");
        assert_eq!(handle, ObstacleHandle(0));
        assert!(layer.contains(c));
        let cell = grid.cell_at(c).unwrap();
        assert!(!cell.is_walkable());
        assert!(cell.is_occupied());
    }

    #[test]
    fn duplicate_add_is_rejected_without_change() {
        let (mut grid, mut layer) = setup();
        let c = Coordinate::new(1, 1);
        let first = layer.add(&mut grid, c).unwrap();
        let err = layer.add(&mut grid, c).unwrap_err();
        assert_eq!(
            err,
            ObstacleError::AlreadyPresent {
                coordinate: c,
                existing: first
            }
        );
        assert_eq!(layer.len(), 1);
    }

    #[test]
    fn out_of_bounds_add_is_rejected() {
        let (mut grid, mut layer) = setup();
        let c = Coordinate::new(6, 0);
        assert_eq!(layer.add(&mut grid, c), Err(ObstacleError::OutOfBounds(c)));
        assert!(layer.is_empty());
    }

    #[test]
    fn occupied_cell_is_refused_and_left_held() {
        let (mut grid, mut layer) = setup();
        let c = Coordinate::new(1, 0);
        grid.set_occupied(c, true).unwrap();
        assert_eq!(layer.add(&mut grid, c), Err(ObstacleError::CellOccupied(c)));
        assert!(layer.is_empty());
        assert!(layer.remove(&mut grid, c).is_none());
        assert!(grid.is_occupied(c));
        assert!(grid.is_walkable(c));
    }

    #[test]
    fn remove_restores_cell_and_ignores_absent() {
        let (mut grid, mut layer) = setup();
        let c = Coordinate::new(4, 4);
        layer.add(&mut grid, c).unwrap();
        assert!(layer.remove(&mut grid, c).is_some());
        assert!(grid.is_free(c));
        assert!(layer.remove(&mut grid, c).is_none());
    }

    #[test]
    fn remove_keeps_terrain_unwalkable() {
        let (mut grid, mut layer) = setup();
        let c = Coordinate::new(0, 5);
        grid.set_terrain(c, TerrainKind::Wall).unwrap();
        layer.add(&mut grid, c).unwrap();
        layer.remove(&mut grid, c);
        assert!(!grid.is_walkable(c));
        assert!(!grid.is_occupied(c));
    }

    #[test]
    fn clear_restores_every_cell() {
        let (mut grid, mut layer) = setup();
        let coords = [Coordinate::new(0, 0), Coordinate::new(3, 2), Coordinate::new(5, 5)];
        for c in coords {
            layer.add(&mut grid, c).unwrap();
        }
        let removed = layer.clear(&mut grid);
        assert_eq!(removed.len(), 3);
        assert!(layer.is_empty());
        assert!(coords.iter().all(|&c| grid.is_free(c)));
    }

    #[test]
    fn handles_are_never_reused() {
        let (mut grid, mut layer) = setup();
        let c = Coordinate::new(2, 2);
        let first = layer.add(&mut grid, c).unwrap();
        layer.remove(&mut grid, c);
        let second = layer.add(&mut grid, c).unwrap();
        assert_ne!(first, second);
    }
}
