//! Static layout source for the tactics core.
//!
//! This crate supplies what the core consumes once at startup:
//! - Grid layouts: dimensions, static terrain and the initial obstacle list
//! - Core configuration (grid shape and pathfinding cost model)
//!
//! Layouts are plain data. [`Layout::build_world`] turns one into a
//! [`tactics_core::World`]; [`Layout::from_world`] captures a running world back
//! into the same shape for export.

pub mod layout;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use layout::{Layout, TerrainPatch};

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, LayoutLoader};
