//! Deterministic grid model, pathfinding and pursuit rules for the tactics core.
//!
//! `tactics-core` is synchronous and free of I/O. It owns the cell matrix, the
//! obstacle overlay, the A* pathfinder and the pursuit decision rule. Turn
//! sequencing and actor lifecycles live in the runtime crate, which drives
//! everything here through [`World`].
pub mod config;
pub mod error;
pub mod grid;
pub mod movement;
pub mod obstacles;
pub mod pathfinding;
pub mod policy;
pub mod state;
pub mod world;

pub use config::{GameConfig, GridConfig, PathfinderConfig};
pub use error::{CoreError, ErrorSeverity};
pub use grid::{Cell, Grid, GridDimensions, GridError, Neighbors, TerrainKind};
pub use movement::{ActorBody, MoveError, SpawnError};
pub use obstacles::{ObstacleError, ObstacleHandle, ObstacleLayer};
pub use pathfinding::{Heuristic, PathError, Pathfinder, WalkabilityView};
pub use policy::{Decision, PursuitPolicy, StayReason, StepSource};
pub use state::{ActorId, Coordinate, Direction, WorldPoint};
pub use world::{World, WorldEvent};
