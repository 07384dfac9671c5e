use crate::state::WorldPoint;

/// Core configuration: grid shape and pathfinding cost model.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    pub grid: GridConfig,
    pub pathfinding: PathfinderConfig,
}

impl GameConfig {
    pub fn new(grid: GridConfig, pathfinding: PathfinderConfig) -> Self {
        Self { grid, pathfinding }
    }
}

/// Grid dimensions and the grid-to-world mapping used by the view.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GridConfig {
    pub width: u32,
    pub height: u32,
    /// World units per cell edge.
    pub cell_size: f32,
    /// World-space point of cell (0, 0).
    pub origin: WorldPoint,
}

impl GridConfig {
    pub const DEFAULT_WIDTH: u32 = 10;
    pub const DEFAULT_HEIGHT: u32 = 10;
    pub const DEFAULT_CELL_SIZE: f32 = 1.0;

    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
            cell_size: Self::DEFAULT_CELL_SIZE,
            origin: WorldPoint::default(),
        }
    }
}

/// A* movement mode and step costs.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PathfinderConfig {
    pub allow_diagonal: bool,
    pub straight_cost: f32,
    pub diagonal_cost: f32,
}

impl PathfinderConfig {
    pub const DEFAULT_STRAIGHT_COST: f32 = 1.0;
    pub const DEFAULT_DIAGONAL_COST: f32 = std::f32::consts::SQRT_2;

    pub fn orthogonal() -> Self {
        Self::default()
    }

    pub fn diagonal() -> Self {
        Self {
            allow_diagonal: true,
            ..Self::default()
        }
    }
}

impl Default for PathfinderConfig {
    fn default() -> Self {
        Self {
            allow_diagonal: false,
            straight_cost: Self::DEFAULT_STRAIGHT_COST,
            diagonal_cost: Self::DEFAULT_DIAGONAL_COST,
        }
    }
}
