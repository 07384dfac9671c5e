//! Plain value types shared by every component of the core.
mod common;

pub use common::{ActorId, Coordinate, Direction, WorldPoint};
