//! Grid layout data: dimensions, static terrain and initial obstacles.

use tactics_core::{Coordinate, GameConfig, GridConfig, GridError, TerrainKind, World};

/// A non-floor terrain entry. Cells not listed are [`TerrainKind::Floor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TerrainPatch {
    pub x: i32,
    pub y: i32,
    pub terrain: TerrainKind,
}

impl TerrainPatch {
    pub fn new(x: i32, y: i32, terrain: TerrainKind) -> Self {
        Self { x, y, terrain }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.x, self.y)
    }
}

/// Startup layout for one grid.
///
/// ```ron
/// (
///     dimensions: (10, 10),
///     terrain: [(x: 0, y: 9, terrain: Wall)],
///     obstacles: [(5, 0), (5, 1), (5, 2)],
/// )
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Layout {
    pub dimensions: (u32, u32),
    #[cfg_attr(feature = "serde", serde(default))]
    pub terrain: Vec<TerrainPatch>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub obstacles: Vec<(i32, i32)>,
}

impl Layout {
    /// An empty floor of the given size.
    pub fn open(width: u32, height: u32) -> Self {
        Self {
            dimensions: (width, height),
            terrain: Vec::new(),
            obstacles: Vec::new(),
        }
    }

    pub fn with_obstacles(mut self, obstacles: impl IntoIterator<Item = (i32, i32)>) -> Self {
        self.obstacles.extend(obstacles);
        self
    }

    pub fn with_terrain(mut self, patches: impl IntoIterator<Item = TerrainPatch>) -> Self {
        self.terrain.extend(patches);
        self
    }

    /// `base` with its width and height replaced by this layout's.
    pub fn grid_config(&self, base: &GridConfig) -> GridConfig {
        GridConfig {
            width: self.dimensions.0,
            height: self.dimensions.1,
            ..base.clone()
        }
    }

    /// Builds a world sized by this layout, paints terrain and spawns obstacles.
    ///
    /// Out-of-bounds terrain entries and rejected obstacles are logged and
    /// skipped. Only an unusable grid shape is an error.
    pub fn build_world(&self, config: &GameConfig) -> Result<World, GridError> {
        let config = GameConfig::new(self.grid_config(&config.grid), config.pathfinding);
        let mut world = World::new(&config)?;
        self.apply(&mut world);
        Ok(world)
    }

    /// Paints terrain and spawns obstacles into an existing world.
    ///
    /// Returns the number of obstacles that were actually added.
    pub fn apply(&self, world: &mut World) -> usize {
        for patch in &self.terrain {
            if let Err(error) = world.grid_mut().set_terrain(patch.coordinate(), patch.terrain) {
                tracing::warn!(target: "tactics::content", %error, "terrain entry skipped");
            }
        }

        let added = self
            .obstacles
            .iter()
            .filter(|&&(x, y)| world.spawn_obstacle(Coordinate::new(x, y)).is_ok())
            .count();

        tracing::info!(
            target: "tactics::content",
            width = self.dimensions.0,
            height = self.dimensions.1,
            terrain = self.terrain.len(),
            obstacles = added,
            "layout applied"
        );
        added
    }

    /// Captures a world's dimensions, non-floor terrain and current obstacles.
    pub fn from_world(world: &World) -> Self {
        let dimensions = world.dimensions();
        let terrain = world
            .grid()
            .cells()
            .filter(|cell| cell.terrain() != TerrainKind::Floor)
            .map(|cell| {
                let c = cell.coordinate();
                TerrainPatch::new(c.x, c.y, cell.terrain())
            })
            .collect();
        let obstacles = world.obstacles().iter().map(|(c, _)| (c.x, c.y)).collect();

        Self {
            dimensions: (dimensions.width, dimensions.height),
            terrain,
            obstacles,
        }
    }
}
