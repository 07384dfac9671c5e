//! Session configuration read from the environment.
use std::env;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use tactics_runtime::SchedulerConfig;

use crate::dirs;

/// Everything the headless session needs besides the world itself.
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub session_id: String,
    pub data_dir: PathBuf,
    /// Layout name under `data_dir/layouts`; an open grid is used when absent.
    pub layout: Option<String>,
    pub pursuers: usize,
    pub rounds: usize,
    pub scheduler: SchedulerConfig,
}

impl SimConfig {
    pub const DEFAULT_PURSUERS: usize = 3;
    pub const DEFAULT_ROUNDS: usize = 12;

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `TACTICS_SESSION_ID` - Log subdirectory name (default: `session_<unix secs>`)
    /// - `TACTICS_DATA_DIR` - Content directory (default: platform data dir)
    /// - `TACTICS_LAYOUT` - Layout to load from `layouts/<name>.ron`
    /// - `TACTICS_PURSUERS` - Number of pursuers (default: 3)
    /// - `TACTICS_ROUNDS` - Player rounds to simulate (default: 12)
    ///
    /// Scheduler timing comes from [`SchedulerConfig::from_env`].
    pub fn from_env() -> Self {
        let session_id = env::var("TACTICS_SESSION_ID")
            .ok()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(default_session_id);

        Self {
            session_id,
            data_dir: env::var_os("TACTICS_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(dirs::data_dir),
            layout: env::var("TACTICS_LAYOUT")
                .ok()
                .filter(|name| !name.trim().is_empty()),
            pursuers: read_env("TACTICS_PURSUERS").unwrap_or(Self::DEFAULT_PURSUERS),
            rounds: read_env("TACTICS_ROUNDS").unwrap_or(Self::DEFAULT_ROUNDS),
            scheduler: SchedulerConfig::from_env(),
        }
    }
}

fn default_session_id() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default();
    format!("session_{secs}")
}

fn read_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok()?.trim().parse().ok()
}
