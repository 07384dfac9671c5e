//! Fixed-size cell matrix with coordinate mapping and neighbor enumeration.
//!
//! The grid is created once from [`GridConfig`] and never changes shape. Cell
//! flags change only through [`Grid::set_walkable`], [`Grid::set_occupied`] and
//! [`Grid::set_terrain`].
mod cell;

pub use cell::{Cell, TerrainKind};

use arrayvec::ArrayVec;

use crate::config::GridConfig;
use crate::error::{CoreError, ErrorSeverity};
use crate::state::{Coordinate, Direction, WorldPoint};

/// Up to eight neighbors, in canonical order.
pub type Neighbors = ArrayVec<Coordinate, 8>;

#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GridError {
    #[error("grid dimensions {width}x{height} must both be non-zero")]
    EmptyDimensions { width: u32, height: u32 },

    #[error("cell size {0} must be positive and finite")]
    InvalidCellSize(f32),

    #[error("coordinate {0} is out of bounds")]
    OutOfBounds(Coordinate),
}

impl CoreError for GridError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            GridError::EmptyDimensions { .. } | GridError::InvalidCellSize(_) => {
                ErrorSeverity::Fatal
            }
            GridError::OutOfBounds(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            GridError::EmptyDimensions { .. } => "GRID_EMPTY_DIMENSIONS",
            GridError::InvalidCellSize(_) => "GRID_INVALID_CELL_SIZE",
            GridError::OutOfBounds(_) => "GRID_OUT_OF_BOUNDS",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridDimensions {
    pub width: u32,
    pub height: u32,
}

impl GridDimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, coordinate: Coordinate) -> bool {
        coordinate.x >= 0
            && coordinate.y >= 0
            && (coordinate.x as u32) < self.width
            && (coordinate.y as u32) < self.height
    }

    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Row-major index of an in-bounds coordinate.
    pub fn index_of(&self, coordinate: Coordinate) -> Option<usize> {
        self.contains(coordinate)
            .then(|| coordinate.y as usize * self.width as usize + coordinate.x as usize)
    }

    pub fn coordinate_of(&self, index: usize) -> Coordinate {
        let width = self.width as usize;
        Coordinate::new((index % width) as i32, (index / width) as i32)
    }
}

#[derive(Clone, Debug)]
pub struct Grid {
    dimensions: GridDimensions,
    cell_size: f32,
    origin: WorldPoint,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(config: &GridConfig) -> Result<Self, GridError> {
        if config.width == 0 || config.height == 0 {
            return Err(GridError::EmptyDimensions {
                width: config.width,
                height: config.height,
            });
        }
        if !(config.cell_size.is_finite() && config.cell_size > 0.0) {
            return Err(GridError::InvalidCellSize(config.cell_size));
        }

        let dimensions = GridDimensions::new(config.width, config.height);
        let cells = (0..dimensions.area())
            .map(|index| Cell::new(dimensions.coordinate_of(index)))
            .collect();

        tracing::debug!(
            target: "tactics::grid",
            width = config.width,
            height = config.height,
            "grid created"
        );

        Ok(Self {
            dimensions,
            cell_size: config.cell_size,
            origin: config.origin,
            cells,
        })
    }

    pub fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }

    pub fn width(&self) -> u32 {
        self.dimensions.width
    }

    pub fn height(&self) -> u32 {
        self.dimensions.height
    }

    pub fn is_valid(&self, coordinate: Coordinate) -> bool {
        self.dimensions.contains(coordinate)
    }

    /// Returns `None` for out-of-bounds coordinates.
    pub fn cell_at(&self, coordinate: Coordinate) -> Option<&Cell> {
        self.dimensions
            .index_of(coordinate)
            .map(|index| &self.cells[index])
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn is_walkable(&self, coordinate: Coordinate) -> bool {
        self.cell_at(coordinate).is_some_and(Cell::is_walkable)
    }

    pub fn is_occupied(&self, coordinate: Coordinate) -> bool {
        self.cell_at(coordinate).is_some_and(Cell::is_occupied)
    }

    pub fn is_free(&self, coordinate: Coordinate) -> bool {
        self.cell_at(coordinate).is_some_and(Cell::is_free)
    }

    /// World-space centre of a cell.
    pub fn coordinate_to_position(&self, coordinate: Coordinate) -> WorldPoint {
        WorldPoint::new(
            self.origin.x + coordinate.x as f32 * self.cell_size,
            self.origin.y + coordinate.y as f32 * self.cell_size,
        )
    }

    /// Inverse of [`Grid::coordinate_to_position`], rounding to the nearest cell.
    ///
    /// The result may be out of bounds; check with [`Grid::is_valid`].
    pub fn position_to_coordinate(&self, position: WorldPoint) -> Coordinate {
        Coordinate::new(
            ((position.x - self.origin.x) / self.cell_size).round() as i32,
            ((position.y - self.origin.y) / self.cell_size).round() as i32,
        )
    }

    /// In-bounds neighbors in the order up, right, down, left, then the diagonals
    /// up-right, down-right, down-left, up-left.
    pub fn neighbors(&self, coordinate: Coordinate, include_diagonal: bool) -> Neighbors {
        Direction::for_mode(include_diagonal)
            .iter()
            .map(|&direction| coordinate.step(direction))
            .filter(|&neighbor| self.is_valid(neighbor))
            .collect()
    }

    pub fn set_walkable(&mut self, coordinate: Coordinate, walkable: bool) -> Result<(), GridError> {
        self.cell_mut(coordinate)?.set_walkable(walkable);
        Ok(())
    }

    pub fn set_occupied(&mut self, coordinate: Coordinate, occupied: bool) -> Result<(), GridError> {
        self.cell_mut(coordinate)?.set_occupied(occupied);
        Ok(())
    }

    pub fn set_terrain(
        &mut self,
        coordinate: Coordinate,
        terrain: TerrainKind,
    ) -> Result<(), GridError> {
        self.cell_mut(coordinate)?.set_terrain(terrain);
        Ok(())
    }

    fn cell_mut(&mut self, coordinate: Coordinate) -> Result<&mut Cell, GridError> {
        let index = self
            .dimensions
            .index_of(coordinate)
            .ok_or(GridError::OutOfBounds(coordinate))?;
        Ok(&mut self.cells[index])
    }
}
