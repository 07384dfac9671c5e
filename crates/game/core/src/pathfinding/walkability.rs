use crate::grid::{Grid, GridDimensions};
use crate::state::Coordinate;

/// Read access to whatever decides if a search may step onto a cell.
pub trait WalkabilityView {
    fn dimensions(&self) -> GridDimensions;

    /// Walkable and not occupied.
    fn is_passable(&self, coordinate: Coordinate) -> bool;
}

impl WalkabilityView for Grid {
    fn dimensions(&self) -> GridDimensions {
        Grid::dimensions(self)
    }

    fn is_passable(&self, coordinate: Coordinate) -> bool {
        self.is_free(coordinate)
    }
}

/// Passability captured from a view at the start of a single search.
#[derive(Clone, Debug)]
pub(crate) struct WalkabilitySnapshot {
    dimensions: GridDimensions,
    passable: Vec<bool>,
}

impl WalkabilitySnapshot {
    pub fn capture<V>(view: &V) -> Self
    where
        V: WalkabilityView + ?Sized,
    {
        let dimensions = view.dimensions();
        let passable = (0..dimensions.area())
            .map(|index| view.is_passable(dimensions.coordinate_of(index)))
            .collect();
        Self {
            dimensions,
            passable,
        }
    }

    pub fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }

    pub fn is_passable(&self, coordinate: Coordinate) -> bool {
        self.dimensions
            .index_of(coordinate)
            .is_some_and(|index| self.passable[index])
    }

    /// The searching actor stands on its start cell, so it is never a barrier.
    pub fn release(&mut self, coordinate: Coordinate) {
        if let Some(index) = self.dimensions.index_of(coordinate) {
            self.passable[index] = true;
        }
    }
}
