//! Layout loader and writer.

use std::path::Path;

use anyhow::Context;

use crate::layout::Layout;
use crate::loaders::{LoadResult, read_file};

/// Reads and writes [`Layout`] RON files.
pub struct LayoutLoader;

impl LayoutLoader {
    pub fn load(path: &Path) -> LoadResult<Layout> {
        let content = read_file(path)?;
        let layout: Layout = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse layout RON: {}", e))?;
        Ok(layout)
    }

    /// Writes `layout` as pretty RON, creating parent directories.
    pub fn save(layout: &Layout, path: &Path) -> LoadResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = ron::ser::to_string_pretty(layout, ron::ser::PrettyConfig::default())
            .context("Failed to serialize layout")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write layout {}", path.display()))?;
        tracing::debug!(target: "tactics::content", path = %path.display(), "layout saved");
        Ok(())
    }
}
