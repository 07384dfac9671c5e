//! Core configuration loader.

use std::path::Path;

use tactics_core::GameConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for [`GameConfig`] from TOML files.
///
/// Missing tables and keys fall back to their defaults:
///
/// ```toml
/// [grid]
/// width = 12
/// height = 8
///
/// [pathfinding]
/// allow_diagonal = true
/// ```
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load(path: &Path) -> LoadResult<GameConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<GameConfig> {
        let config: GameConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;
        validate(&config)?;
        Ok(config)
    }
}

fn validate(config: &GameConfig) -> LoadResult<()> {
    let costs = &config.pathfinding;
    if !(costs.straight_cost.is_finite() && costs.straight_cost > 0.0) {
        anyhow::bail!("straight_cost must be positive, got {}", costs.straight_cost);
    }
    if costs.allow_diagonal && !(costs.diagonal_cost.is_finite() && costs.diagonal_cost > 0.0) {
        anyhow::bail!("diagonal_cost must be positive, got {}", costs.diagonal_cost);
    }
    Ok(())
}
