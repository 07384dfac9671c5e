//! Actor placement and single-step movement commits.
//!
//! Occupancy is updated at commit time: the origin cell is cleared, then the
//! destination cell is marked. Decisions that are never committed leave the grid
//! untouched.
use crate::error::{CoreError, ErrorSeverity};
use crate::state::{ActorId, Coordinate};

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MoveError {
    #[error("actor {0} has not been placed on the grid")]
    NotPlaced(ActorId),

    #[error("destination {destination} is out of bounds")]
    OutOfBounds { destination: Coordinate },

    #[error("destination {destination} is not walkable")]
    Blocked { destination: Coordinate },

    #[error("destination {destination} is occupied")]
    Occupied { destination: Coordinate },

    #[error("{to} is not a single step from {from}")]
    NotAdjacent { from: Coordinate, to: Coordinate },

    #[error("diagonal step from {from} to {to} cuts a blocked corner")]
    CornerCut { from: Coordinate, to: Coordinate },

    #[error("occupancy desync for actor {actor} at {position}")]
    OccupancyDesync { actor: ActorId, position: Coordinate },
}

impl CoreError for MoveError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            MoveError::Blocked { .. }
            | MoveError::Occupied { .. }
            | MoveError::CornerCut { .. } => ErrorSeverity::Recoverable,
            MoveError::NotPlaced(_)
            | MoveError::OutOfBounds { .. }
            | MoveError::NotAdjacent { .. } => ErrorSeverity::Validation,
            MoveError::OccupancyDesync { .. } => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            MoveError::NotPlaced(_) => "MOVE_NOT_PLACED",
            MoveError::OutOfBounds { .. } => "MOVE_OUT_OF_BOUNDS",
            MoveError::Blocked { .. } => "MOVE_BLOCKED",
            MoveError::Occupied { .. } => "MOVE_OCCUPIED",
            MoveError::NotAdjacent { .. } => "MOVE_NOT_ADJACENT",
            MoveError::CornerCut { .. } => "MOVE_CORNER_CUT",
            MoveError::OccupancyDesync { .. } => "MOVE_OCCUPANCY_DESYNC",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpawnError {
    #[error("actor {0} is already placed")]
    AlreadyPlaced(ActorId),

    #[error("spawn point {0} is out of bounds")]
    OutOfBounds(Coordinate),

    #[error("no free cell reachable from {near}")]
    NoFreeCell { near: Coordinate },
}

impl CoreError for SpawnError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            SpawnError::AlreadyPlaced(_) => ErrorSeverity::Validation,
            SpawnError::OutOfBounds(_) | SpawnError::NoFreeCell { .. } => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            SpawnError::AlreadyPlaced(_) => "SPAWN_ALREADY_PLACED",
            SpawnError::OutOfBounds(_) => "SPAWN_OUT_OF_BOUNDS",
            SpawnError::NoFreeCell { .. } => "SPAWN_NO_FREE_CELL",
        }
    }
}

/// Model-side presence of an actor: who it is and which cell it holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActorBody {
    id: ActorId,
    coordinate: Option<Coordinate>,
}

impl ActorBody {
    pub fn new(id: ActorId) -> Self {
        Self {
            id,
            coordinate: None,
        }
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    /// `None` until the actor has been placed.
    pub fn coordinate(&self) -> Option<Coordinate> {
        self.coordinate
    }

    pub fn is_placed(&self) -> bool {
        self.coordinate.is_some()
    }

    pub(crate) fn set_coordinate(&mut self, coordinate: Option<Coordinate>) {
        self.coordinate = coordinate;
    }
}
