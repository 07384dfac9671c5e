use std::collections::BinaryHeap;
use std::cmp::Reverse;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tactics_core::{
    Coordinate, GameConfig, GridConfig, PathError, PathfinderConfig, WalkabilityView, World,
};

fn world(width: u32, height: u32, pathfinding: PathfinderConfig) -> World {
    World::new(&GameConfig::new(GridConfig::new(width, height), pathfinding)).expect("valid world")
}

/// Exhaustive uniform-cost search, used as the reference for optimal cost.
fn reference_cost(world: &World, start: Coordinate, target: Coordinate) -> Option<f32> {
    let config = *world.pathfinder().config();
    let dims = world.dimensions();
    let scale = 1_000_000.0;
    let mut best = vec![u64::MAX; dims.area()];
    let mut heap = BinaryHeap::new();
    let start_index = dims.index_of(start)?;
    best[start_index] = 0;
    heap.push(Reverse((0u64, start_index)));

    while let Some(Reverse((cost, index))) = heap.pop() {
        if cost > best[index] {
            continue;
        }
        let here = dims.coordinate_of(index);
        if here == target {
            return Some(cost as f32 / scale);
        }
        for (dx, dy) in [
            (0, 1), (1, 0), (0, -1), (-1, 0),
            (1, 1), (1, -1), (-1, -1), (-1, 1),
        ] {
            let diagonal = dx != 0 && dy != 0;
            if diagonal && !config.allow_diagonal {
                continue;
            }
            let next = here.offset(dx, dy);
            let Some(next_index) = dims.index_of(next) else { continue };
            if !world.is_passable(next) {
                continue;
            }
            if diagonal
                && !(world.is_passable(here.offset(dx, 0)) && world.is_passable(here.offset(0, dy)))
            {
                continue;
            }
            let step = if diagonal { config.diagonal_cost } else { config.straight_cost };
            let next_cost = cost + (step * scale) as u64;
            if next_cost < best[next_index] {
                best[next_index] = next_cost;
                heap.push(Reverse((next_cost, next_index)));
            }
        }
    }
    None
}

fn assert_well_formed(world: &World, start: Coordinate, target: Coordinate, path: &[Coordinate]) {
    assert_eq!(path.last(), Some(&target));
    assert_ne!(path.first(), Some(&start));
    assert!(world.pathfinder().path_cost(start, path).is_some(), "steps must be adjacent");
    assert!(path.iter().all(|&c| world.is_passable(c)));
}

#[test]
fn open_grid_orthogonal_path_is_manhattan_optimal() {
    let world = world(10, 10, PathfinderConfig::orthogonal());
    let start = Coordinate::new(0, 0);
    let target = Coordinate::new(9, 9);
    let path = world.find_path(start, target);
    assert_eq!(path.len(), 18);
    assert_well_formed(&world, start, target, &path);
}

#[test]
fn wall_with_single_gap_routes_through_gap() {
    let mut world = world(10, 10, PathfinderConfig::orthogonal());
    for y in 0..=8 {
        world.spawn_obstacle(Coordinate::new(5, y)).unwrap();
    }
    let start = Coordinate::new(0, 0);
    let target = Coordinate::new(9, 9);
    let path = world.find_path(start, target);
    assert!(path.contains(&Coordinate::new(5, 9)));
    assert_well_formed(&world, start, target, &path);
    assert_eq!(path.len(), 18);
}

#[test]
fn obstacle_on_target_yields_empty_path() {
    let mut world = world(10, 10, PathfinderConfig::orthogonal());
    let target = Coordinate::new(9, 9);
    world.spawn_obstacle(target).unwrap();
    assert!(world.find_path(Coordinate::ORIGIN, target).is_empty());
    assert_eq!(
        world.try_find_path(Coordinate::ORIGIN, target),
        Err(PathError::TargetBlocked(target))
    );
}

#[test]
fn removing_gap_blocker_reopens_route() {
    let mut world = world(10, 10, PathfinderConfig::orthogonal());
    for y in 0..=9 {
        world.spawn_obstacle(Coordinate::new(5, y)).unwrap();
    }
    let start = Coordinate::ORIGIN;
    let target = Coordinate::new(9, 0);
    assert!(world.find_path(start, target).is_empty());

    world.remove_obstacle(Coordinate::new(5, 4));
    let path = world.find_path(start, target);
    assert!(path.contains(&Coordinate::new(5, 4)));

    world.clear_all_obstacles();
    assert_eq!(world.find_path(start, target).len(), 9);
}

#[test]
fn diagonal_paths_never_cut_blocked_corners() {
    let mut world = world(6, 6, PathfinderConfig::diagonal());
    // Checkerboard-ish blockers around the diagonal.
    for c in [(1, 0), (0, 1), (2, 3), (3, 2), (4, 5)] {
        world.spawn_obstacle(Coordinate::new(c.0, c.1)).unwrap();
    }
    let start = Coordinate::new(0, 0);
    let target = Coordinate::new(5, 5);
    let path = world.find_path(start, target);
    // (0,0) is pinched by (1,0) and (0,1) so nothing leaves it.
    assert!(path.is_empty());

    world.remove_obstacle(Coordinate::new(0, 1));
    let path = world.find_path(start, target);
    assert_well_formed(&world, start, target, &path);
    let mut previous = start;
    for &step in &path {
        let dx = step.x - previous.x;
        let dy = step.y - previous.y;
        if dx != 0 && dy != 0 {
            assert!(world.is_passable(previous.offset(dx, 0)));
            assert!(world.is_passable(previous.offset(0, dy)));
        }
        previous = step;
    }
}

#[test]
fn random_fields_match_reference_cost() {
    let mut rng = StdRng::seed_from_u64(0x5EED);
    for mode in [PathfinderConfig::orthogonal(), PathfinderConfig::diagonal()] {
        for _ in 0..40 {
            let mut world = world(12, 9, mode);
            for _ in 0..30 {
                let c = Coordinate::new(rng.gen_range(0..12), rng.gen_range(0..9));
                let _ = world.spawn_obstacle(c);
            }
            let start = Coordinate::new(rng.gen_range(0..12), rng.gen_range(0..9));
            let target = Coordinate::new(rng.gen_range(0..12), rng.gen_range(0..9));
            if world.obstacle_at(start) || start == target {
                continue;
            }

            let path = world.find_path(start, target);
            let reference = if world.obstacle_at(target) {
                None
            } else {
                reference_cost(&world, start, target)
            };

            match reference {
                None => assert!(path.is_empty(), "{start} -> {target} should be unreachable"),
                Some(expected) => {
                    assert_well_formed(&world, start, target, &path);
                    let cost = world.pathfinder().path_cost(start, &path).unwrap();
                    assert!(
                        (cost - expected).abs() < 1e-3,
                        "{start} -> {target}: got {cost}, optimal {expected}"
                    );
                }
            }
        }
    }
}

#[test]
fn cheap_diagonals_zig_zag_along_a_corridor() {
    let config = PathfinderConfig {
        allow_diagonal: true,
        straight_cost: 1.0,
        diagonal_cost: 0.5,
    };
    let world = world(9, 3, config);
    let start = Coordinate::new(0, 1);
    let target = Coordinate::new(8, 1);
    let path = world.find_path(start, target);
    assert_well_formed(&world, start, target, &path);

    let cost = world.pathfinder().path_cost(start, &path).unwrap();
    let optimal = reference_cost(&world, start, target).unwrap();
    assert!((optimal - 4.0).abs() < 1e-3);
    assert!((cost - optimal).abs() < 1e-3, "got {cost}, optimal {optimal}");
}

#[test]
fn random_fields_with_unusual_costs_stay_optimal() {
    let mut rng = StdRng::seed_from_u64(0xC057);
    for (straight_cost, diagonal_cost) in [(1.0, 0.5), (2.0, 0.3), (1.0, 3.5)] {
        let config = PathfinderConfig { allow_diagonal: true, straight_cost, diagonal_cost };
        for _ in 0..30 {
            let mut world = world(10, 8, config);
            for _ in 0..20 {
                let c = Coordinate::new(rng.gen_range(0..10), rng.gen_range(0..8));
                let _ = world.spawn_obstacle(c);
            }
            let start = Coordinate::new(rng.gen_range(0..10), rng.gen_range(0..8));
            let target = Coordinate::new(rng.gen_range(0..10), rng.gen_range(0..8));
            if world.obstacle_at(start) || world.obstacle_at(target) || start == target {
                continue;
            }
            let path = world.find_path(start, target);
            match reference_cost(&world, start, target) {
                None => assert!(path.is_empty(), "{start} -> {target} should be unreachable"),
                Some(expected) => {
                    let cost = world.pathfinder().path_cost(start, &path).unwrap();
                    assert!(
                        (cost - expected).abs() < 1e-3,
                        "{start} -> {target} at {straight_cost}/{diagonal_cost}: got {cost}, optimal {expected}"
                    );
                }
            }
        }
    }
}

#[test]
fn out_of_bounds_requests_are_empty() {
    let world = world(4, 4, PathfinderConfig::orthogonal());
    assert!(world.find_path(Coordinate::new(-1, 0), Coordinate::new(2, 2)).is_empty());
    assert!(world.find_path(Coordinate::new(0, 0), Coordinate::new(4, 2)).is_empty());
    assert!(world.find_path(Coordinate::new(2, 2), Coordinate::new(2, 2)).is_empty());
}
