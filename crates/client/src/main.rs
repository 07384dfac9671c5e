//! Headless tactics session.
//!
//! Composition root: reads `.env` and `TACTICS_*` variables, installs logging,
//! builds the world and the runtime, then plays a scripted session in which the
//! controlled actor tours the grid while pursuers chase it.
//!
//! ```bash
//! TACTICS_PURSUERS=4 TACTICS_ROUNDS=20 RUST_LOG=tactics=debug cargo run -p tactics-sim
//! ```
mod config;
mod dirs;
mod logging;
mod session;

use anyhow::Result;

use config::SimConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = SimConfig::from_env();
    let _guard = logging::setup_logging(&dirs::log_dir(), &config.session_id)?;

    tracing::info!(
        pursuers = config.pursuers,
        rounds = config.rounds,
        layout = ?config.layout,
        "starting session"
    );

    let world = session::load_world(&config)?;
    let runtime = session::build_runtime(&config, world).await?;
    let report = session::run(&runtime, &config).await;
    runtime.shutdown().await?;

    report?.log();
    Ok(())
}
