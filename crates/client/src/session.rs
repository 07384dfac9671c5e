//! Scripted headless session: the controlled actor tours a fixed route while
//! pursuers chase it, one AI pass per player round.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use tokio::sync::broadcast;

use tactics_content::Layout;
use tactics_core::{ActorId, Coordinate, GameConfig, GridDimensions, World};
use tactics_runtime::{
    AutonomousActor, Event, Mobile, MoveRequestError, Runtime, SchedulerConfig, Topic, TurnEvent,
};

use crate::config::SimConfig;

/// Loads the configured layout, or an open grid sized by the core config.
pub fn load_world(config: &SimConfig) -> Result<World> {
    #[cfg(feature = "loaders")]
    {
        let factory = tactics_content::ContentFactory::new(&config.data_dir);
        if let Some(layout) = &config.layout {
            tracing::info!(layout = %layout, data_dir = %factory.data_dir().display(), "loading layout");
            return factory.build_world(layout);
        }
        open_world(&factory.load_config()?)
    }

    #[cfg(not(feature = "loaders"))]
    {
        if config.layout.is_some() {
            tracing::warn!("layout loading requires the `loaders` feature, using an open grid");
        }
        open_world(&GameConfig::default())
    }
}

fn open_world(config: &GameConfig) -> Result<World> {
    Layout::open(config.grid.width, config.grid.height)
        .build_world(config)
        .context("invalid grid configuration")
}

/// Pursuer spawn cells: far corners first, then edge midpoints.
pub fn pursuer_spawns(dims: GridDimensions, count: usize) -> Vec<Coordinate> {
    let (w, h) = (dims.width as i32 - 1, dims.height as i32 - 1);
    let candidates = [
        Coordinate::new(w, h),
        Coordinate::new(w, 0),
        Coordinate::new(0, h),
        Coordinate::new(w / 2, h),
        Coordinate::new(w, h / 2),
        Coordinate::new(w / 2, 0),
        Coordinate::new(0, h / 2),
    ];
    candidates.iter().copied().cycle().take(count).collect()
}

/// Waypoints one cell in from each corner, visited in order.
pub fn patrol_route(dims: GridDimensions) -> Vec<Coordinate> {
    let (w, h) = (dims.width as i32, dims.height as i32);
    let (lo_x, hi_x) = (1.min(w - 1), (w - 2).max(0));
    let (lo_y, hi_y) = (1.min(h - 1), (h - 2).max(0));
    vec![
        Coordinate::new(hi_x, lo_y),
        Coordinate::new(hi_x, hi_y),
        Coordinate::new(lo_x, hi_y),
        Coordinate::new(lo_x, lo_y),
    ]
}

pub async fn build_runtime(config: &SimConfig, world: World) -> Result<Runtime> {
    let spawns = pursuer_spawns(world.dimensions(), config.pursuers);
    let mut builder = Runtime::builder()
        .config(config.scheduler.clone())
        .world(world)
        .controlled_start(Coordinate::ORIGIN);
    for (index, start) in spawns.into_iter().enumerate() {
        let id = ActorId(index as u32 + 1);
        builder = builder.pursuer(id, index as i32, start);
    }
    Ok(builder.build().await?)
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub rounds: usize,
    pub walks: usize,
    pub rejected_moves: usize,
    pub timed_out_turns: usize,
    pub final_position: Option<Coordinate>,
    /// Pursuers orthogonally adjacent to the controlled actor at the end.
    pub adjacent_pursuers: usize,
}

impl SessionReport {
    pub fn log(&self) {
        tracing::info!(
            rounds = self.rounds,
            walks = self.walks,
            rejected = self.rejected_moves,
            timeouts = self.timed_out_turns,
            adjacent = self.adjacent_pursuers,
            final_position = ?self.final_position,
            "session finished"
        );
    }
}

/// Upper bound on one AI pass, including the end-of-turn delay.
fn pass_budget(scheduler: &SchedulerConfig, actors: usize) -> Duration {
    let per_actor = scheduler.turn_timeout + scheduler.actor_delay;
    scheduler.end_turn_delay + per_actor * (actors as u32 + 1)
}

pub async fn run(runtime: &Runtime, config: &SimConfig) -> Result<SessionReport> {
    let scheduler = runtime.scheduler();
    let controlled = runtime.controlled();
    let route = {
        let world = runtime.world();
        let world = world.read().await;
        patrol_route(world.dimensions())
    };
    let budget = pass_budget(&config.scheduler, runtime.actors().len());
    let mut input = scheduler.input();
    let mut report = SessionReport::default();

    if !*input.borrow() {
        scheduler.start_player_phase().await?;
    }

    for round in 0..config.rounds {
        input
            .wait_for(|enabled| *enabled)
            .await
            .context("scheduler stopped before the player phase")?;

        let mut turns = scheduler.subscribe(Topic::Turn);
        let waypoint = route[round % route.len()];
        match controlled.request_move(waypoint).await {
            Ok(path) => {
                report.walks += 1;
                tracing::info!(round, %waypoint, steps = path.len(), "walk finished");
            }
            // The completion signal was still sent, so the pass starts by itself.
            Err(MoveRequestError::Interrupted { at, .. } | MoveRequestError::InputRevoked { at }) => {
                report.rejected_moves += 1;
                tracing::info!(round, %at, "walk interrupted");
            }
            Err(_) => {
                report.rejected_moves += 1;
                scheduler.end_player_phase().await?;
            }
        }

        let events = tokio::time::timeout(budget, finish_pass(&mut turns))
            .await
            .with_context(|| format!("AI pass of round {round} did not finish"))??;
        report.timed_out_turns += events
            .iter()
            .filter(|event| matches!(event, TurnEvent::ActorTurnTimedOut { .. }))
            .count();
        report.rounds += 1;
    }

    report.final_position = controlled.current_position().await;
    if let Some(player) = report.final_position {
        for actor in runtime.actors() {
            let at = actor.position().await;
            if at.is_some_and(|at| at.manhattan(player) == 1) {
                report.adjacent_pursuers += 1;
            }
        }
    }
    Ok(report)
}

async fn finish_pass(turns: &mut broadcast::Receiver<Event>) -> Result<Vec<TurnEvent>> {
    let mut events = Vec::new();
    loop {
        match turns.recv().await {
            Ok(Event::Turn(event)) => {
                let done = matches!(event, TurnEvent::AiPhaseEnded { .. });
                events.push(event);
                if done {
                    return Ok(events);
                }
            }
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "turn subscriber lagged");
            }
            Err(broadcast::error::RecvError::Closed) => bail!("event bus closed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tactics_core::{GridConfig, PathfinderConfig};

    #[test]
    fn spawns_cycle_through_far_cells() {
        let dims = GridDimensions { width: 10, height: 8 };
        let spawns = pursuer_spawns(dims, 9);
        assert_eq!(spawns.len(), 9);
        assert_eq!(spawns[0], Coordinate::new(9, 7));
        assert_eq!(spawns[1], Coordinate::new(9, 0));
        assert_eq!(spawns[7], spawns[0]);
    }

    #[test]
    fn route_stays_inside_tiny_grids() {
        let route = patrol_route(GridDimensions { width: 1, height: 1 });
        assert!(route.iter().all(|c| *c == Coordinate::ORIGIN));
    }

    #[tokio::test(start_paused = true)]
    async fn scripted_session_ends_with_pursuers_nearby() {
        let game = GameConfig::new(GridConfig::new(8, 8), PathfinderConfig::orthogonal());
        let world = Layout::open(8, 8).build_world(&game).unwrap();
        let config = SimConfig {
            session_id: "test".into(),
            data_dir: "unused".into(),
            layout: None,
            pursuers: 2,
            rounds: 8,
            scheduler: SchedulerConfig::default(),
        };

        let runtime = build_runtime(&config, world).await.unwrap();
        let report = run(&runtime, &config).await.unwrap();
        runtime.shutdown().await.unwrap();

        assert_eq!(report.rounds, 8);
        assert_eq!(report.walks + report.rejected_moves, 8);
        assert_eq!(report.timed_out_turns, 0);
        assert!(report.final_position.is_some());
    }
}
