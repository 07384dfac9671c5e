//! AI pass ordering, timeouts, cancellation and registration under a paused clock.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tactics_core::{ActorId, Coordinate};
use tactics_runtime::{
    ActorError, AutonomousActor, Event, EventBus, MovementEvent, SchedulerConfig,
    SchedulerHandle, SkipReason, Topic, TurnEvent, TurnPhase, TurnScheduler, TurnTicket,
};
use tokio::sync::broadcast;
use tokio::time::Instant;

#[derive(Clone, Copy)]
enum Behavior {
    Complete,
    Hang,
    DropTicket,
    NotReady,
    QueryFails,
    Panic,
}

#[derive(Clone, Default)]
struct TurnLog(Arc<Mutex<Vec<ActorId>>>);

impl TurnLog {
    fn push(&self, actor: ActorId) {
        self.0.lock().unwrap().push(actor);
    }

    fn order(&self) -> Vec<ActorId> {
        self.0.lock().unwrap().clone()
    }
}

struct Scripted {
    id: ActorId,
    priority: i32,
    behavior: Behavior,
    log: TurnLog,
    busy: AtomicBool,
    aborts: AtomicUsize,
}

impl Scripted {
    fn new(id: u32, priority: i32, behavior: Behavior, log: &TurnLog) -> Arc<Self> {
        Arc::new(Self {
            id: ActorId(id),
            priority,
            behavior,
            log: log.clone(),
            busy: AtomicBool::new(false),
            aborts: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl AutonomousActor for Scripted {
    fn id(&self) -> ActorId {
        self.id
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    async fn position(&self) -> Option<Coordinate> {
        None
    }

    fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn can_take_turn(&self) -> Result<bool, ActorError> {
        match self.behavior {
            Behavior::NotReady => Ok(false),
            Behavior::QueryFails => Err(ActorError::NotInitialized(self.id)),
            _ => Ok(!self.is_busy()),
        }
    }

    async fn initialize(&self, start: Coordinate) -> Result<Coordinate, ActorError> {
        Ok(start)
    }

    async fn take_turn(&self, ticket: TurnTicket) -> Result<(), ActorError> {
        self.log.push(self.id);
        self.busy.store(true, Ordering::Release);
        match self.behavior {
            Behavior::Hang => std::future::pending::<()>().await,
            Behavior::DropTicket => drop(ticket),
            Behavior::Panic => panic!("scripted actor {} panicked", self.id),
            _ => ticket.complete(),
        }
        self.busy.store(false, Ordering::Release);
        Ok(())
    }

    fn abort_turn(&self) {
        self.aborts.fetch_add(1, Ordering::SeqCst);
        self.busy.store(false, Ordering::Release);
    }
}

fn spawn(config: SchedulerConfig) -> SchedulerHandle {
    let (handle, _worker) = TurnScheduler::spawn(config, EventBus::new());
    handle
}

async fn next_turn_event(rx: &mut broadcast::Receiver<Event>) -> TurnEvent {
    match rx.recv().await.unwrap() {
        Event::Turn(event) => event,
        other => panic!("unexpected event on turn topic: {other:?}"),
    }
}

/// Collects turn events up to and including the `PlayerPhaseStarted` that
/// follows the end of an AI pass.
async fn collect_pass(rx: &mut broadcast::Receiver<Event>) -> Vec<TurnEvent> {
    let mut events = Vec::new();
    let mut pass_ended = false;
    loop {
        let event = next_turn_event(rx).await;
        pass_ended |= matches!(event, TurnEvent::AiPhaseEnded { .. });
        let done = pass_ended && event == TurnEvent::PlayerPhaseStarted;
        events.push(event);
        if done {
            return events;
        }
    }
}

async fn wait_for(rx: &mut broadcast::Receiver<Event>, wanted: TurnEvent) {
    while next_turn_event(rx).await != wanted {}
}

fn outcomes(events: &[TurnEvent]) -> Vec<TurnEvent> {
    events.iter().filter(|e| e.is_turn_outcome()).cloned().collect()
}

#[tokio::test(start_paused = true)]
async fn pass_runs_actors_in_priority_order() {
    let handle = spawn(SchedulerConfig::immediate());
    let log = TurnLog::default();
    for (id, priority) in [(1, 2), (2, 1), (3, 3)] {
        assert!(handle.register(Scripted::new(id, priority, Behavior::Complete, &log)).await.unwrap());
    }
    assert_eq!(
        handle.registered().await.unwrap(),
        vec![(ActorId(2), 1), (ActorId(1), 2), (ActorId(3), 3)]
    );

    let mut turns = handle.subscribe(Topic::Turn);
    handle.end_player_phase().await.unwrap();
    let events = collect_pass(&mut turns).await;

    assert_eq!(log.order(), vec![ActorId(2), ActorId(1), ActorId(3)]);
    assert_eq!(events[0], TurnEvent::PlayerPhaseEnded);
    assert_eq!(events[1], TurnEvent::AiPhaseStarted { actors: 3 });
    assert_eq!(
        outcomes(&events),
        vec![
            TurnEvent::ActorTurnCompleted { actor: ActorId(2) },
            TurnEvent::ActorTurnCompleted { actor: ActorId(1) },
            TurnEvent::ActorTurnCompleted { actor: ActorId(3) },
        ]
    );
    assert!(events.contains(&TurnEvent::AiPhaseEnded { cancelled: false }));
    assert_eq!(handle.phase().await.unwrap(), TurnPhase::PlayerActive);
    assert!(*handle.input().borrow());
}

#[tokio::test(start_paused = true)]
async fn equal_priorities_keep_registration_order() {
    let handle = spawn(SchedulerConfig::immediate());
    let log = TurnLog::default();
    for id in [7, 4, 9] {
        handle.register(Scripted::new(id, 0, Behavior::Complete, &log)).await.unwrap();
    }

    let mut turns = handle.subscribe(Topic::Turn);
    handle.end_player_phase().await.unwrap();
    collect_pass(&mut turns).await;

    assert_eq!(log.order(), vec![ActorId(7), ActorId(4), ActorId(9)]);
}

#[tokio::test(start_paused = true)]
async fn stuck_actor_times_out_and_pass_continues() {
    let handle = spawn(SchedulerConfig::immediate());
    let log = TurnLog::default();
    let stuck = Scripted::new(1, 1, Behavior::Hang, &log);
    handle.register(stuck.clone()).await.unwrap();
    handle.register(Scripted::new(2, 2, Behavior::Complete, &log)).await.unwrap();

    let mut turns = handle.subscribe(Topic::Turn);
    let started = Instant::now();
    handle.end_player_phase().await.unwrap();
    let events = collect_pass(&mut turns).await;

    assert!(started.elapsed() >= SchedulerConfig::DEFAULT_TURN_TIMEOUT);
    assert_eq!(
        outcomes(&events),
        vec![
            TurnEvent::ActorTurnTimedOut { actor: ActorId(1) },
            TurnEvent::ActorTurnCompleted { actor: ActorId(2) },
        ]
    );
    assert_eq!(stuck.aborts.load(Ordering::SeqCst), 1);
    assert!(!stuck.is_busy());
    assert_eq!(handle.phase().await.unwrap(), TurnPhase::PlayerActive);
}

#[tokio::test(start_paused = true)]
async fn force_end_cancels_a_stuck_turn() {
    let handle = spawn(SchedulerConfig::immediate());
    let log = TurnLog::default();
    let stuck = Scripted::new(1, 1, Behavior::Hang, &log);
    handle.register(stuck.clone()).await.unwrap();
    handle.register(Scripted::new(2, 2, Behavior::Complete, &log)).await.unwrap();

    let mut turns = handle.subscribe(Topic::Turn);
    let started = Instant::now();
    handle.end_player_phase().await.unwrap();
    wait_for(
        &mut turns,
        TurnEvent::ActorTurnStarted {
            actor: ActorId(1),
            priority: 1,
        },
    )
    .await;
    handle.force_end_current_turn().await.unwrap();
    let events = collect_pass(&mut turns).await;

    assert!(started.elapsed() < SchedulerConfig::DEFAULT_TURN_TIMEOUT);
    assert_eq!(
        events,
        vec![
            TurnEvent::ActorTurnCancelled { actor: ActorId(1) },
            TurnEvent::AiPhaseEnded { cancelled: true },
            TurnEvent::PlayerPhaseStarted,
        ]
    );
    assert_eq!(log.order(), vec![ActorId(1)]);
    assert!(!stuck.is_busy());
    assert_eq!(handle.phase().await.unwrap(), TurnPhase::PlayerActive);
}

#[tokio::test(start_paused = true)]
async fn start_player_phase_during_pass_cancels_it() {
    let handle = spawn(SchedulerConfig::immediate());
    let log = TurnLog::default();
    handle.register(Scripted::new(1, 1, Behavior::Hang, &log)).await.unwrap();

    let mut turns = handle.subscribe(Topic::Turn);
    handle.end_player_phase().await.unwrap();
    wait_for(
        &mut turns,
        TurnEvent::ActorTurnStarted {
            actor: ActorId(1),
            priority: 1,
        },
    )
    .await;
    handle.start_player_phase().await.unwrap();
    let events = collect_pass(&mut turns).await;

    assert!(events.contains(&TurnEvent::AiPhaseEnded { cancelled: true }));
    assert_eq!(handle.phase().await.unwrap(), TurnPhase::PlayerActive);
}

#[tokio::test(start_paused = true)]
async fn unregistering_during_a_pass_skips_current_and_later_actors() {
    let handle = spawn(SchedulerConfig::immediate());
    let log = TurnLog::default();
    handle.register(Scripted::new(1, 1, Behavior::Hang, &log)).await.unwrap();
    handle.register(Scripted::new(2, 2, Behavior::Complete, &log)).await.unwrap();
    handle.register(Scripted::new(3, 3, Behavior::Complete, &log)).await.unwrap();

    let mut turns = handle.subscribe(Topic::Turn);
    let started = Instant::now();
    handle.end_player_phase().await.unwrap();
    wait_for(
        &mut turns,
        TurnEvent::ActorTurnStarted {
            actor: ActorId(1),
            priority: 1,
        },
    )
    .await;
    assert!(handle.unregister(ActorId(3)).await.unwrap());
    assert!(handle.unregister(ActorId(1)).await.unwrap());
    let events = collect_pass(&mut turns).await;

    assert!(started.elapsed() < SchedulerConfig::DEFAULT_TURN_TIMEOUT);
    assert_eq!(
        outcomes(&events),
        vec![
            TurnEvent::ActorSkipped {
                actor: ActorId(1),
                reason: SkipReason::Unregistered,
            },
            TurnEvent::ActorTurnCompleted { actor: ActorId(2) },
            TurnEvent::ActorSkipped {
                actor: ActorId(3),
                reason: SkipReason::Unregistered,
            },
        ]
    );
    assert!(events.contains(&TurnEvent::AiPhaseEnded { cancelled: false }));
    assert_eq!(log.order(), vec![ActorId(1), ActorId(2)]);
    assert_eq!(handle.registered().await.unwrap(), vec![(ActorId(2), 2)]);
}

#[tokio::test(start_paused = true)]
async fn duplicate_and_unknown_registrations_are_rejected() {
    let handle = spawn(SchedulerConfig::immediate());
    let log = TurnLog::default();

    assert!(handle.register(Scripted::new(5, 1, Behavior::Complete, &log)).await.unwrap());
    assert!(!handle.register(Scripted::new(5, 9, Behavior::Complete, &log)).await.unwrap());
    assert_eq!(handle.registered().await.unwrap(), vec![(ActorId(5), 1)]);

    assert!(!handle.unregister(ActorId(6)).await.unwrap());
    assert!(handle.unregister(ActorId(5)).await.unwrap());
    assert!(handle.registered().await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn empty_pass_returns_to_the_player() {
    let handle = spawn(SchedulerConfig::immediate());
    // Let the initial player phase start before listening.
    assert_eq!(handle.phase().await.unwrap(), TurnPhase::PlayerActive);
    let mut turns = handle.subscribe(Topic::Turn);

    handle.end_player_phase().await.unwrap();
    let events = collect_pass(&mut turns).await;

    assert_eq!(
        events,
        vec![
            TurnEvent::PlayerPhaseEnded,
            TurnEvent::AiPhaseStarted { actors: 0 },
            TurnEvent::AiPhaseEnded { cancelled: false },
            TurnEvent::PlayerPhaseStarted,
        ]
    );
    assert_eq!(handle.phase().await.unwrap(), TurnPhase::PlayerActive);
}

#[tokio::test(start_paused = true)]
async fn unready_and_failing_actors_are_skipped() {
    let handle = spawn(SchedulerConfig::immediate());
    let log = TurnLog::default();
    handle.register(Scripted::new(1, 1, Behavior::NotReady, &log)).await.unwrap();
    handle.register(Scripted::new(2, 2, Behavior::QueryFails, &log)).await.unwrap();
    handle.register(Scripted::new(3, 3, Behavior::DropTicket, &log)).await.unwrap();
    handle.register(Scripted::new(4, 4, Behavior::Complete, &log)).await.unwrap();

    let mut turns = handle.subscribe(Topic::Turn);
    handle.end_player_phase().await.unwrap();
    let events = collect_pass(&mut turns).await;

    let outcomes = outcomes(&events);
    assert_eq!(
        outcomes[0],
        TurnEvent::ActorSkipped {
            actor: ActorId(1),
            reason: SkipReason::NotReady,
        }
    );
    assert!(matches!(
        &outcomes[1],
        TurnEvent::ActorSkipped { actor: ActorId(2), reason: SkipReason::Failed { .. } }
    ));
    assert!(matches!(
        &outcomes[2],
        TurnEvent::ActorSkipped { actor: ActorId(3), reason: SkipReason::Failed { .. } }
    ));
    assert_eq!(outcomes[3], TurnEvent::ActorTurnCompleted { actor: ActorId(4) });
    assert_eq!(log.order(), vec![ActorId(3), ActorId(4)]);
}

#[tokio::test(start_paused = true)]
async fn panicking_actor_is_skipped_and_the_worker_survives() {
    let handle = spawn(SchedulerConfig::immediate());
    let log = TurnLog::default();
    let faulty = Scripted::new(1, 1, Behavior::Panic, &log);
    handle.register(faulty.clone()).await.unwrap();
    handle.register(Scripted::new(2, 2, Behavior::Complete, &log)).await.unwrap();

    let mut turns = handle.subscribe(Topic::Turn);
    handle.end_player_phase().await.unwrap();
    let events = collect_pass(&mut turns).await;

    let outcomes = outcomes(&events);
    assert!(matches!(
        &outcomes[0],
        TurnEvent::ActorSkipped { actor: ActorId(1), reason: SkipReason::Failed { .. } }
    ));
    assert_eq!(outcomes[1], TurnEvent::ActorTurnCompleted { actor: ActorId(2) });
    assert_eq!(faulty.aborts.load(Ordering::SeqCst), 1);
    assert!(!faulty.is_busy());

    // Still serving commands and running passes.
    assert_eq!(handle.phase().await.unwrap(), TurnPhase::PlayerActive);
    handle.end_player_phase().await.unwrap();
    let events = collect_pass(&mut turns).await;
    assert_eq!(crate::outcomes(&events).len(), 2);
    assert_eq!(log.order(), vec![ActorId(1), ActorId(2), ActorId(1), ActorId(2)]);
}

#[tokio::test(start_paused = true)]
async fn end_of_player_phase_outside_player_phase_is_ignored() {
    let handle = spawn(SchedulerConfig {
        auto_start: false,
        ..SchedulerConfig::immediate()
    });
    let mut turns = handle.subscribe(Topic::Turn);

    assert_eq!(handle.phase().await.unwrap(), TurnPhase::PlayerIdle);
    assert!(!*handle.input().borrow());
    handle.end_player_phase().await.unwrap();
    handle.force_end_current_turn().await.unwrap();
    assert_eq!(handle.phase().await.unwrap(), TurnPhase::PlayerIdle);
    assert!(turns.try_recv().is_err());

    handle.start_player_phase().await.unwrap();
    assert_eq!(next_turn_event(&mut turns).await, TurnEvent::PlayerPhaseStarted);
    assert!(*handle.input().borrow());
}

#[tokio::test(start_paused = true)]
async fn movement_completion_ends_the_active_phase_after_the_delay() {
    let end_turn_delay = Duration::from_millis(500);
    let handle = spawn(SchedulerConfig {
        auto_start: false,
        end_turn_delay,
        ..SchedulerConfig::immediate()
    });
    let mut turns = handle.subscribe(Topic::Turn);
    let completed = MovementEvent::MovementCompleted {
        actor: ActorId::PLAYER,
        at: Coordinate::new(1, 1),
    };

    // Arrives while idle: dropped, never ends a later phase.
    handle.event_bus().publish(completed.clone());
    handle.start_player_phase().await.unwrap();
    assert_eq!(next_turn_event(&mut turns).await, TurnEvent::PlayerPhaseStarted);
    tokio::time::sleep(end_turn_delay * 4).await;
    assert_eq!(handle.phase().await.unwrap(), TurnPhase::PlayerActive);
    assert!(turns.try_recv().is_err());

    let published = Instant::now();
    handle.event_bus().publish(completed);
    tokio::time::sleep(end_turn_delay / 2).await;
    assert_eq!(handle.phase().await.unwrap(), TurnPhase::PlayerActive);
    assert!(!*handle.input().borrow(), "input stays off while the end is pending");
    assert_eq!(next_turn_event(&mut turns).await, TurnEvent::PlayerPhaseEnded);
    assert!(published.elapsed() >= end_turn_delay);
    collect_pass(&mut turns).await;
    assert_eq!(handle.phase().await.unwrap(), TurnPhase::PlayerActive);
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_the_worker_and_disables_input() {
    let (handle, worker) = TurnScheduler::spawn(SchedulerConfig::immediate(), EventBus::new());
    assert!(*handle.input().borrow());

    handle.shutdown().await.unwrap();
    worker.await.unwrap();

    assert!(!*handle.input().borrow());
    assert!(handle.phase().await.is_err());
}
