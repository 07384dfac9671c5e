use serde::{Deserialize, Serialize};

/// Scheduler phase. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnPhase {
    PlayerIdle,
    PlayerActive,
    AiIdle,
    /// Running the actor at this index of the pass order.
    AiProcessing { index: usize },
}

impl TurnPhase {
    pub fn is_player(&self) -> bool {
        matches!(self, TurnPhase::PlayerIdle | TurnPhase::PlayerActive)
    }

    pub fn is_ai(&self) -> bool {
        !self.is_player()
    }

    /// True only while the controlled actor may act.
    pub fn accepts_input(&self) -> bool {
        matches!(self, TurnPhase::PlayerActive)
    }
}

impl std::fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnPhase::PlayerIdle => f.write_str("player/idle"),
            TurnPhase::PlayerActive => f.write_str("player/active"),
            TurnPhase::AiIdle => f.write_str("ai/idle"),
            TurnPhase::AiProcessing { index } => write!(f, "ai/processing[{index}]"),
        }
    }
}
