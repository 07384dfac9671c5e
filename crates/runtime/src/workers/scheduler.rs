//! Scheduler worker that owns the phase state machine and the actor registry.
//!
//! Receives commands from [`SchedulerHandle`], listens for the controlled
//! actor's movement-completed signal, runs AI passes and publishes
//! [`TurnEvent`]s. Everything happens on this one task, so exactly one phase is
//! active and at most one actor's turn is outstanding at any instant.
//!
//! [`SchedulerHandle`]: crate::api::SchedulerHandle

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::time::{Instant, sleep, sleep_until, timeout};
use tracing::{debug, info, warn};

use tactics_core::{ActorId, CoreError};

use crate::actors::{AutonomousActor, TurnTicket};
use crate::api::{ActorError, SchedulerError};
use crate::config::SchedulerConfig;
use crate::events::{Event, EventBus, MovementEvent, SkipReason, Topic, TurnEvent};
use crate::scheduler::{ActorRecord, ActorRegistry, TurnPhase};

/// Commands that can be sent to the scheduler worker
pub enum Command {
    StartPlayerPhase,
    EndPlayerPhase,
    ForceEndCurrentTurn,
    Register {
        actor: Arc<dyn AutonomousActor>,
        reply: oneshot::Sender<bool>,
    },
    Unregister {
        actor: ActorId,
        reply: oneshot::Sender<bool>,
    },
    Phase {
        reply: oneshot::Sender<TurnPhase>,
    },
    Registered {
        reply: oneshot::Sender<Vec<(ActorId, i32)>>,
    },
    Shutdown,
}

/// What a command received mid-pass asks the pass to do.
enum PassControl {
    Continue,
    SkipCurrent,
    Cancel,
}

/// Result of waiting on something while still serving commands.
enum Interruptible<T> {
    Done(T),
    SkipCurrent,
    Cancelled,
}

pub struct SchedulerWorker {
    config: SchedulerConfig,
    phase: TurnPhase,
    registry: ActorRegistry,
    command_rx: mpsc::Receiver<Command>,
    movement_rx: broadcast::Receiver<Event>,
    movement_open: bool,
    input_tx: watch::Sender<bool>,
    event_bus: EventBus,
    /// Deadline for the delayed end of the current player phase.
    pending_end: Option<Instant>,
    shutting_down: bool,
}

impl SchedulerWorker {
    pub fn new(
        config: SchedulerConfig,
        command_rx: mpsc::Receiver<Command>,
        input_tx: watch::Sender<bool>,
        event_bus: EventBus,
    ) -> Self {
        let movement_rx = event_bus.subscribe(Topic::Movement);
        Self {
            config,
            phase: TurnPhase::PlayerIdle,
            registry: ActorRegistry::new(),
            command_rx,
            movement_rx,
            movement_open: true,
            input_tx,
            event_bus,
            pending_end: None,
            shutting_down: false,
        }
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        if self.config.auto_start {
            self.start_player_phase();
        } else {
            self.input_tx.send_replace(false);
            info!(target: "tactics::scheduler", "scheduler idle until the player phase is started");
        }

        while !self.shutting_down {
            let deadline = self.pending_end;
            tokio::select! {
                command = self.command_rx.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command).await,
                },
                event = self.movement_rx.recv(), if self.movement_open => {
                    self.on_movement_event(event);
                }
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.pending_end = None;
                    self.end_player_phase().await;
                }
            }
        }

        self.input_tx.send_replace(false);
        info!(target: "tactics::scheduler", "scheduler stopped");
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::StartPlayerPhase => self.start_player_phase(),
            Command::EndPlayerPhase | Command::ForceEndCurrentTurn => self.end_player_phase().await,
            Command::Shutdown => self.shutting_down = true,
            other => {
                // Remaining commands behave the same inside and outside a pass.
                let _ = self.handle_pass_command(other, None);
            }
        }
    }

    fn on_movement_event(&mut self, event: Result<Event, broadcast::error::RecvError>) {
        match event {
            Ok(Event::Movement(MovementEvent::MovementCompleted { actor, at })) => {
                if self.phase.accepts_input() {
                    debug!(target: "tactics::scheduler", %actor, %at, "movement completed, ending player phase after delay");
                    // No further walks while the end of the phase is pending.
                    self.input_tx.send_replace(false);
                    self.pending_end = Some(Instant::now() + self.config.end_turn_delay);
                } else {
                    debug!(target: "tactics::scheduler", %actor, phase = %self.phase, "stale movement signal ignored");
                }
            }
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(target: "tactics::scheduler", skipped, "movement subscriber lagged");
            }
            Err(broadcast::error::RecvError::Closed) => {
                self.movement_open = false;
            }
        }
    }

    // ===== phase transitions =====

    fn start_player_phase(&mut self) {
        self.pending_end = None;
        self.discard_stale_movement();
        self.phase = TurnPhase::PlayerActive;
        self.input_tx.send_replace(true);
        self.event_bus.publish(TurnEvent::PlayerPhaseStarted);
        info!(target: "tactics::scheduler", "player phase started");
    }

    /// No-op unless the player phase is active. Otherwise runs a full AI pass
    /// and re-enters the player phase.
    async fn end_player_phase(&mut self) {
        if !self.phase.accepts_input() {
            debug!(target: "tactics::scheduler", phase = %self.phase, "end of player phase ignored");
            return;
        }

        self.pending_end = None;
        self.input_tx.send_replace(false);
        self.event_bus.publish(TurnEvent::PlayerPhaseEnded);
        info!(target: "tactics::scheduler", "player phase ended");

        self.phase = TurnPhase::AiProcessing { index: 0 };
        let cancelled = self.run_ai_pass().await;

        self.phase = TurnPhase::AiIdle;
        self.event_bus.publish(TurnEvent::AiPhaseEnded { cancelled });
        info!(target: "tactics::scheduler", cancelled, "AI phase ended");

        if !self.shutting_down {
            self.start_player_phase();
        }
    }

    /// Walks a snapshot of the registry in priority order. Returns `true` if the
    /// pass was cancelled.
    async fn run_ai_pass(&mut self) -> bool {
        let order = self.registry.snapshot();
        self.event_bus.publish(TurnEvent::AiPhaseStarted {
            actors: order.len(),
        });
        info!(target: "tactics::scheduler", actors = order.len(), "AI phase started");

        for (index, record) in order.iter().enumerate() {
            if index > 0 && !self.config.actor_delay.is_zero() {
                self.phase = TurnPhase::AiIdle;
                if let Interruptible::Cancelled =
                    self.interruptible(sleep(self.config.actor_delay), None).await
                {
                    return true;
                }
            }

            if !self.registry.contains(record.id) {
                self.skip(record.id, SkipReason::Unregistered);
                continue;
            }

            self.phase = TurnPhase::AiProcessing { index };
            if self.attempt_turn(record).await {
                return true;
            }
        }
        false
    }

    /// One actor's slot in the pass. Returns `true` if the pass was cancelled.
    async fn attempt_turn(&mut self, record: &ActorRecord) -> bool {
        let id = record.id;
        match record.actor.can_take_turn() {
            Ok(true) => {}
            Ok(false) => {
                self.skip(id, SkipReason::NotReady);
                return false;
            }
            Err(error) => {
                warn!(target: "tactics::scheduler", actor = %id, code = error.error_code(), %error, "readiness query failed");
                self.skip(id, SkipReason::Failed { error: error.to_string() });
                return false;
            }
        }

        self.event_bus.publish(TurnEvent::ActorTurnStarted {
            actor: id,
            priority: record.priority,
        });
        debug!(target: "tactics::scheduler", actor = %id, priority = record.priority, "actor turn started");

        let actor = Arc::clone(&record.actor);
        let (ticket, completion) = TurnTicket::new(id);
        // Runs on its own task so a panicking actor fails its turn, not the worker.
        let mut turn = tokio::spawn(async move {
            actor.take_turn(ticket).await?;
            completion.await.map_err(|_| ActorError::TicketDropped(id))
        });

        let outcome = self
            .interruptible(timeout(self.config.turn_timeout, &mut turn), Some(id))
            .await;
        if !matches!(outcome, Interruptible::Done(Ok(_))) {
            turn.abort();
        }

        match outcome {
            Interruptible::Done(Ok(Ok(Ok(())))) => {
                self.event_bus.publish(TurnEvent::ActorTurnCompleted { actor: id });
                false
            }
            Interruptible::Done(Ok(Ok(Err(error)))) => {
                warn!(target: "tactics::scheduler", actor = %id, code = error.error_code(), %error, "actor turn failed");
                self.skip(id, SkipReason::Failed { error: error.to_string() });
                false
            }
            Interruptible::Done(Ok(Err(join_error))) => {
                let error = SchedulerError::TurnPanicked(id);
                warn!(target: "tactics::scheduler", actor = %id, code = error.error_code(), %join_error, "actor turn failed");
                record.actor.abort_turn();
                self.skip(id, SkipReason::Failed { error: error.to_string() });
                false
            }
            Interruptible::Done(Err(_elapsed)) => {
                let error = SchedulerError::TurnTimeout {
                    actor: id,
                    timeout: self.config.turn_timeout,
                };
                warn!(target: "tactics::scheduler", actor = %id, code = error.error_code(), %error, "actor skipped");
                record.actor.abort_turn();
                self.event_bus.publish(TurnEvent::ActorTurnTimedOut { actor: id });
                false
            }
            Interruptible::SkipCurrent => {
                // Removed mid-turn: no further calls on the handle.
                self.skip(id, SkipReason::Unregistered);
                false
            }
            Interruptible::Cancelled => {
                record.actor.abort_turn();
                self.event_bus.publish(TurnEvent::ActorTurnCancelled { actor: id });
                info!(target: "tactics::scheduler", actor = %id, "AI pass cancelled");
                true
            }
        }
    }

    fn skip(&self, actor: ActorId, reason: SkipReason) {
        debug!(target: "tactics::scheduler", %actor, ?reason, "actor skipped");
        self.event_bus.publish(TurnEvent::ActorSkipped { actor, reason });
    }

    /// Awaits `future` while continuing to serve commands.
    async fn interruptible<F: Future>(
        &mut self,
        future: F,
        current: Option<ActorId>,
    ) -> Interruptible<F::Output> {
        tokio::pin!(future);
        loop {
            tokio::select! {
                biased;
                Some(command) = self.command_rx.recv() => {
                    match self.handle_pass_command(command, current) {
                        PassControl::Continue => {}
                        PassControl::SkipCurrent => return Interruptible::SkipCurrent,
                        PassControl::Cancel => return Interruptible::Cancelled,
                    }
                }
                output = &mut future => return Interruptible::Done(output),
            }
        }
    }

    /// Serves a command while an AI pass is in progress.
    fn handle_pass_command(&mut self, command: Command, current: Option<ActorId>) -> PassControl {
        match command {
            Command::StartPlayerPhase | Command::ForceEndCurrentTurn => PassControl::Cancel,
            Command::EndPlayerPhase => {
                debug!(target: "tactics::scheduler", phase = %self.phase, "end of player phase ignored");
                PassControl::Continue
            }
            Command::Shutdown => {
                self.shutting_down = true;
                PassControl::Cancel
            }
            Command::Register { actor, reply } => {
                let _ = reply.send(self.register(actor));
                PassControl::Continue
            }
            Command::Unregister { actor, reply } => {
                let removed = self.unregister(actor);
                let _ = reply.send(removed);
                if removed && current == Some(actor) {
                    PassControl::SkipCurrent
                } else {
                    PassControl::Continue
                }
            }
            Command::Phase { reply } => {
                let _ = reply.send(self.phase);
                PassControl::Continue
            }
            Command::Registered { reply } => {
                let _ = reply.send(self.registry.order());
                PassControl::Continue
            }
        }
    }

    // ===== registration =====

    fn register(&mut self, actor: Arc<dyn AutonomousActor>) -> bool {
        let id = actor.id();
        if self.registry.register(actor) {
            info!(target: "tactics::scheduler", actor = %id, registered = self.registry.len(), "actor registered");
            true
        } else {
            let error = SchedulerError::DuplicateRegistration(id);
            warn!(target: "tactics::scheduler", code = error.error_code(), %error, "registration ignored");
            false
        }
    }

    fn unregister(&mut self, id: ActorId) -> bool {
        if self.registry.unregister(id).is_some() {
            info!(target: "tactics::scheduler", actor = %id, registered = self.registry.len(), "actor unregistered");
            true
        } else {
            let error = SchedulerError::NotRegistered(id);
            debug!(target: "tactics::scheduler", code = error.error_code(), %error, "unregistration ignored");
            false
        }
    }

    /// Drops movement signals that arrived outside the player phase.
    fn discard_stale_movement(&mut self) {
        loop {
            match self.movement_rx.try_recv() {
                Ok(_) | Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(broadcast::error::TryRecvError::Empty) => break,
                Err(broadcast::error::TryRecvError::Closed) => {
                    self.movement_open = false;
                    break;
                }
            }
        }
    }
}
