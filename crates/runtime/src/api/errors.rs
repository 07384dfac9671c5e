//! Unified error types surfaced by the runtime API.
//!
//! Channel and worker failures surface as [`RuntimeError`]. Scheduler, actor and
//! move-request failures have their own enums so callers can tell a rejected
//! request from a broken runtime.
use std::time::Duration;

use tactics_core::{ActorId, Coordinate, CoreError, ErrorSeverity, MoveError, PathError, SpawnError};
use thiserror::Error;
use tokio::sync::oneshot;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("scheduler command channel closed")]
    CommandChannelClosed,

    #[error("scheduler reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("scheduler worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("runtime requires a world to be configured before building")]
    MissingWorld,
}

/// Conditions the scheduler recovers from and reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("actor {0} is already registered")]
    DuplicateRegistration(ActorId),

    #[error("actor {0} is not registered")]
    NotRegistered(ActorId),

    #[error("actor {actor} did not finish its turn within {timeout:?}")]
    TurnTimeout { actor: ActorId, timeout: Duration },

    #[error("actor {0} panicked during its turn")]
    TurnPanicked(ActorId),
}

impl CoreError for SchedulerError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            SchedulerError::DuplicateRegistration(_) | SchedulerError::NotRegistered(_) => {
                ErrorSeverity::Validation
            }
            SchedulerError::TurnTimeout { .. } => ErrorSeverity::Recoverable,
            SchedulerError::TurnPanicked(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            SchedulerError::DuplicateRegistration(_) => "SCHEDULER_DUPLICATE_REGISTRATION",
            SchedulerError::NotRegistered(_) => "SCHEDULER_NOT_REGISTERED",
            SchedulerError::TurnTimeout { .. } => "SCHEDULER_TURN_TIMEOUT",
            SchedulerError::TurnPanicked(_) => "SCHEDULER_TURN_PANICKED",
        }
    }
}

/// Failures raised by an autonomous actor while being asked about or taking a turn.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ActorError {
    #[error("actor {0} has not been initialized")]
    NotInitialized(ActorId),

    #[error("actor {0} is already taking a turn")]
    Busy(ActorId),

    #[error("actor {0} has no target to pursue")]
    NoTarget(ActorId),

    #[error("actor {0} dropped its turn ticket without completing it")]
    TicketDropped(ActorId),

    #[error(transparent)]
    Move(#[from] MoveError),

    #[error(transparent)]
    Spawn(#[from] SpawnError),
}

impl CoreError for ActorError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            ActorError::NotInitialized(_) | ActorError::Busy(_) | ActorError::NoTarget(_) => {
                ErrorSeverity::Validation
            }
            ActorError::TicketDropped(_) => ErrorSeverity::Internal,
            ActorError::Move(e) => e.severity(),
            ActorError::Spawn(e) => e.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ActorError::NotInitialized(_) => "ACTOR_NOT_INITIALIZED",
            ActorError::Busy(_) => "ACTOR_BUSY",
            ActorError::NoTarget(_) => "ACTOR_NO_TARGET",
            ActorError::TicketDropped(_) => "ACTOR_TICKET_DROPPED",
            ActorError::Move(e) => e.error_code(),
            ActorError::Spawn(e) => e.error_code(),
        }
    }
}

/// Why a controlled-actor move request was refused or cut short.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum MoveRequestError {
    #[error("input is disabled outside the active player phase")]
    InputDisabled,

    #[error("actor {0} has not been placed yet")]
    NotInitialized(ActorId),

    #[error("a move is already in progress")]
    AlreadyMoving,

    #[error("this player phase already had its walk")]
    TurnSpent,

    #[error("actor is already at {0}")]
    AlreadyThere(Coordinate),

    #[error("no path from {from} to {to}")]
    NoPath {
        from: Coordinate,
        to: Coordinate,
        #[source]
        source: PathError,
    },

    #[error("player phase ended mid-walk, halted at {at}")]
    InputRevoked { at: Coordinate },

    #[error("walk interrupted at {at}")]
    Interrupted {
        at: Coordinate,
        #[source]
        source: MoveError,
    },
}

impl CoreError for MoveRequestError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            MoveRequestError::InputDisabled
            | MoveRequestError::NotInitialized(_)
            | MoveRequestError::AlreadyMoving
            | MoveRequestError::TurnSpent
            | MoveRequestError::AlreadyThere(_) => ErrorSeverity::Validation,
            MoveRequestError::NoPath { .. } | MoveRequestError::InputRevoked { .. } => {
                ErrorSeverity::Recoverable
            }
            MoveRequestError::Interrupted { .. } => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            MoveRequestError::InputDisabled => "MOVE_REQUEST_INPUT_DISABLED",
            MoveRequestError::NotInitialized(_) => "MOVE_REQUEST_NOT_INITIALIZED",
            MoveRequestError::AlreadyMoving => "MOVE_REQUEST_ALREADY_MOVING",
            MoveRequestError::TurnSpent => "MOVE_REQUEST_TURN_SPENT",
            MoveRequestError::AlreadyThere(_) => "MOVE_REQUEST_ALREADY_THERE",
            MoveRequestError::NoPath { .. } => "MOVE_REQUEST_NO_PATH",
            MoveRequestError::InputRevoked { .. } => "MOVE_REQUEST_INPUT_REVOKED",
            MoveRequestError::Interrupted { .. } => "MOVE_REQUEST_INTERRUPTED",
        }
    }
}
