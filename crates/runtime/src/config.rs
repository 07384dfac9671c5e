//! Scheduler and actor timing configuration.
use std::env;
use std::time::Duration;

/// Runtime timing and channel sizing shared by the scheduler and the actors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Start in the active player phase instead of idle.
    pub auto_start: bool,
    /// Pause between the controlled actor finishing its walk and the player phase ending.
    pub end_turn_delay: Duration,
    /// Pause inserted between two autonomous actors in one AI pass.
    pub actor_delay: Duration,
    /// Ceiling on one autonomous actor's turn.
    pub turn_timeout: Duration,
    /// Pause an autonomous actor takes before deciding.
    pub think_delay: Duration,
    /// Pause between committed steps of a controlled walk.
    pub step_delay: Duration,
    pub command_buffer_size: usize,
    pub event_buffer_size: usize,
}

impl SchedulerConfig {
    pub const DEFAULT_TURN_TIMEOUT: Duration = Duration::from_secs(10);

    /// Zero delays, default timeout. Useful for tests and headless runs.
    pub fn immediate() -> Self {
        Self {
            end_turn_delay: Duration::ZERO,
            actor_delay: Duration::ZERO,
            think_delay: Duration::ZERO,
            step_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables (durations in milliseconds):
    /// - `TACTICS_AUTO_START` - Begin in the active player phase (default: true)
    /// - `TACTICS_END_TURN_DELAY_MS` - Walk-complete to phase-end delay (default: 500)
    /// - `TACTICS_ACTOR_DELAY_MS` - Delay between AI actors (default: 200)
    /// - `TACTICS_TURN_TIMEOUT_MS` - Per-actor turn ceiling (default: 10000)
    /// - `TACTICS_THINK_DELAY_MS` - AI thinking pause (default: 300)
    /// - `TACTICS_STEP_DELAY_MS` - Pause between walk steps (default: 150)
    /// - `TACTICS_COMMAND_BUFFER` - Scheduler command queue size (default: 32)
    /// - `TACTICS_EVENT_BUFFER` - Per-topic event capacity (default: 100)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(enable) = read_env::<bool>("TACTICS_AUTO_START") {
            config.auto_start = enable;
        }
        if let Some(delay) = read_millis("TACTICS_END_TURN_DELAY_MS") {
            config.end_turn_delay = delay;
        }
        if let Some(delay) = read_millis("TACTICS_ACTOR_DELAY_MS") {
            config.actor_delay = delay;
        }
        if let Some(timeout) = read_millis("TACTICS_TURN_TIMEOUT_MS") {
            config.turn_timeout = timeout.max(Duration::from_millis(1));
        }
        if let Some(delay) = read_millis("TACTICS_THINK_DELAY_MS") {
            config.think_delay = delay;
        }
        if let Some(delay) = read_millis("TACTICS_STEP_DELAY_MS") {
            config.step_delay = delay;
        }
        if let Some(capacity) = read_env::<usize>("TACTICS_COMMAND_BUFFER") {
            config.command_buffer_size = capacity.max(1);
        }
        if let Some(capacity) = read_env::<usize>("TACTICS_EVENT_BUFFER") {
            config.event_buffer_size = capacity.max(1);
        }

        config
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            auto_start: true,
            end_turn_delay: Duration::from_millis(500),
            actor_delay: Duration::from_millis(200),
            turn_timeout: Self::DEFAULT_TURN_TIMEOUT,
            think_delay: Duration::from_millis(300),
            step_delay: Duration::from_millis(150),
            command_buffer_size: 32,
            event_buffer_size: 100,
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

fn read_millis(key: &str) -> Option<Duration> {
    read_env::<u64>(key).map(Duration::from_millis)
}
