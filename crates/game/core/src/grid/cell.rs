use crate::state::Coordinate;

/// Canonical terrain classes for static cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TerrainKind {
    #[default]
    Floor,
    Wall,
    Void,
    Water,
}

impl TerrainKind {
    pub fn is_passable(self) -> bool {
        matches!(self, TerrainKind::Floor)
    }
}

/// One grid cell: static terrain plus the two dynamic flags.
///
/// Flags are only mutated through [`super::Grid`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    coordinate: Coordinate,
    terrain: TerrainKind,
    walkable: bool,
    occupied: bool,
}

impl Cell {
    pub(crate) fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            terrain: TerrainKind::Floor,
            walkable: true,
            occupied: false,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    pub fn terrain(&self) -> TerrainKind {
        self.terrain
    }

    /// Static terrain and the dynamic walkable flag must both allow entry.
    pub fn is_walkable(&self) -> bool {
        self.terrain.is_passable() && self.walkable
    }

    pub fn is_occupied(&self) -> bool {
        self.occupied
    }

    /// Walkable and not held by anything.
    pub fn is_free(&self) -> bool {
        self.is_walkable() && !self.occupied
    }

    pub(crate) fn set_terrain(&mut self, terrain: TerrainKind) {
        self.terrain = terrain;
    }

    pub(crate) fn set_walkable(&mut self, walkable: bool) {
        self.walkable = walkable;
    }

    pub(crate) fn set_occupied(&mut self, occupied: bool) {
        self.occupied = occupied;
    }
}
