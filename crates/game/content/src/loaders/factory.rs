//! Content factory for loading everything from one data directory.

use std::path::{Path, PathBuf};

use tactics_core::{GameConfig, World};

use crate::layout::Layout;
use crate::loaders::{ConfigLoader, LayoutLoader, LoadResult};

/// Loads startup content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml        (optional)
/// └── layouts/
///     ├── arena.ron
///     └── corridor.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Load core configuration from `config.toml`, or defaults if it is absent.
    pub fn load_config(&self) -> LoadResult<GameConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            tracing::debug!(target: "tactics::content", path = %path.display(), "no config file, using defaults");
            return Ok(GameConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load `layouts/<name>.ron`.
    pub fn load_layout(&self, name: &str) -> LoadResult<Layout> {
        LayoutLoader::load(&self.layout_path(name))
    }

    pub fn save_layout(&self, name: &str, layout: &Layout) -> LoadResult<()> {
        LayoutLoader::save(layout, &self.layout_path(name))
    }

    /// Config plus named layout, assembled into a ready world.
    pub fn build_world(&self, layout: &str) -> LoadResult<World> {
        let config = self.load_config()?;
        let layout = self.load_layout(layout)?;
        layout
            .build_world(&config)
            .map_err(|e| anyhow::anyhow!("Layout has an unusable grid shape: {}", e))
    }

    fn layout_path(&self, name: &str) -> PathBuf {
        self.data_dir.join("layouts").join(format!("{name}.ron"))
    }
}
