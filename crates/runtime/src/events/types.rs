//! Event types for different topics.

use serde::{Deserialize, Serialize};
use tactics_core::{ActorId, Coordinate};

/// Why an actor made no turn attempt during an AI pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// `can_take_turn` answered no (uninitialized or busy).
    NotReady,
    /// Removed from the registry before or during its turn.
    Unregistered,
    /// The actor errored while being queried or while acting.
    Failed { error: String },
}

/// Events related to turn management
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnEvent {
    PlayerPhaseStarted,
    PlayerPhaseEnded,
    AiPhaseStarted { actors: usize },
    AiPhaseEnded { cancelled: bool },

    ActorTurnStarted { actor: ActorId, priority: i32 },
    ActorTurnCompleted { actor: ActorId },
    ActorTurnTimedOut { actor: ActorId },
    ActorTurnCancelled { actor: ActorId },
    ActorSkipped { actor: ActorId, reason: SkipReason },
}

impl TurnEvent {
    /// The actor a per-actor event is about.
    pub fn actor(&self) -> Option<ActorId> {
        match self {
            TurnEvent::ActorTurnStarted { actor, .. }
            | TurnEvent::ActorTurnCompleted { actor }
            | TurnEvent::ActorTurnTimedOut { actor }
            | TurnEvent::ActorTurnCancelled { actor }
            | TurnEvent::ActorSkipped { actor, .. } => Some(*actor),
            _ => None,
        }
    }

    /// True for the events that close one actor's slot in the pass.
    pub fn is_turn_outcome(&self) -> bool {
        matches!(
            self,
            TurnEvent::ActorTurnCompleted { .. }
                | TurnEvent::ActorTurnTimedOut { .. }
                | TurnEvent::ActorTurnCancelled { .. }
                | TurnEvent::ActorSkipped { .. }
        )
    }
}

/// Controlled-actor walk lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementEvent {
    /// A move request was accepted and the walk is starting.
    MoveStarted {
        actor: ActorId,
        target: Coordinate,
        steps: usize,
    },
    /// The last step of a requested walk has been committed.
    MovementCompleted { actor: ActorId, at: Coordinate },
}
