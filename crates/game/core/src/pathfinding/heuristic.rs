use crate::config::PathfinderConfig;
use crate::state::Coordinate;

/// Distance estimate matched to the active movement mode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Heuristic {
    /// Orthogonal movement only.
    Manhattan { straight: f32 },
    /// Eight-way movement with diagonal steps.
    Octile { straight: f32, diagonal: f32 },
}

impl Heuristic {
    pub fn for_config(config: &PathfinderConfig) -> Self {
        if config.allow_diagonal {
            // Two straight steps can stand in for a diagonal and two zig-zag
            // diagonals for two straight steps, so neither rate may exceed what
            // its substitute costs or the estimate overshoots.
            Heuristic::Octile {
                straight: config.straight_cost.min(config.diagonal_cost),
                diagonal: config.diagonal_cost.min(2.0 * config.straight_cost),
            }
        } else {
            Heuristic::Manhattan {
                straight: config.straight_cost,
            }
        }
    }

    pub fn estimate(&self, from: Coordinate, to: Coordinate) -> f32 {
        let dx = from.x.abs_diff(to.x) as f32;
        let dy = from.y.abs_diff(to.y) as f32;
        match *self {
            Heuristic::Manhattan { straight } => (dx + dy) * straight,
            Heuristic::Octile { straight, diagonal } => {
                let (low, high) = if dx < dy { (dx, dy) } else { (dy, dx) };
                low * diagonal + (high - low) * straight
            }
        }
    }
}
