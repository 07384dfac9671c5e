//! Turn scheduling: phase state machine, registry and the task that runs them.
//!
//! Phase transitions:
//! - `PlayerIdle`/`PlayerActive` --start--> `PlayerActive` (input enabled)
//! - `PlayerActive` --end / force end / movement completed + delay--> AI pass
//! - AI pass: `AiProcessing { index }` per actor, `AiIdle` between actors
//! - end of pass (finished or cancelled) --> `PlayerActive`
//!
//! The pass always ends in the player phase, including with zero actors.
mod phase;
mod registry;

pub use phase::TurnPhase;
pub use registry::{ActorRecord, ActorRegistry};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::api::SchedulerHandle;
use crate::config::SchedulerConfig;
use crate::events::EventBus;
use crate::workers::SchedulerWorker;

pub struct TurnScheduler;

impl TurnScheduler {
    /// Spawns the scheduler worker on the current tokio runtime.
    ///
    /// The worker subscribes to movement events before this returns, so no
    /// completion signal published afterwards is missed.
    pub fn spawn(config: SchedulerConfig, event_bus: EventBus) -> (SchedulerHandle, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::channel(config.command_buffer_size.max(1));
        let (input_tx, input_rx) = watch::channel(config.auto_start);

        let worker = SchedulerWorker::new(config, command_rx, input_tx, event_bus.clone());
        let join = tokio::spawn(worker.run());

        (SchedulerHandle::new(command_tx, event_bus, input_rx), join)
    }
}
