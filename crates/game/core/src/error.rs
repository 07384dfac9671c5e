//! Common error infrastructure for tactics-core.
//!
//! Component errors (`GridError`, `ObstacleError`, `PathError`, `MoveError`,
//! `SpawnError`) live next to the component that raises them. This module holds
//! the pieces they share: a severity classification and the [`CoreError`] trait.
//!
//! None of these errors is allowed to halt the turn loop. Callers recover at the
//! boundary of the component that detected the problem and log according to
//! [`ErrorSeverity`].

/// Severity level of an error, used for logging and recovery decisions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// The same request may succeed later once the world changes.
    ///
    /// Examples: no path between valid endpoints, destination occupied.
    Recoverable,

    /// Invalid input that will never succeed without changes.
    ///
    /// Examples: out-of-bounds coordinate, duplicate obstacle.
    Validation,

    /// Model inconsistency. Indicates a bug.
    ///
    /// Examples: occupancy flag out of sync with an actor's position.
    Internal,

    /// A required collaborator is missing; the affected actor stays uninitialized.
    ///
    /// Examples: no free spawn cell.
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all tactics-core errors.
pub trait CoreError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Static identifier for the error variant, used in structured log fields.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
