//! Content loaders for reading layout and configuration files.
//!
//! Layouts are RON, core configuration is TOML. Both go through serde using
//! the core types directly.

pub mod config;
pub mod factory;
pub mod layout;

pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use layout::LayoutLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
