//! Error type shared by the battle core and the async services around it.

use alloc::string::String;

use crate::core::battle::Awaiting;

/// Kind of record a lookup failed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Battle,
    Ship,
    Squadron,
}

impl core::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RecordKind::Battle => write!(f, "battle"),
            RecordKind::Ship => write!(f, "ship"),
            RecordKind::Squadron => write!(f, "squadron"),
        }
    }
}

/// Errors returned by battle operations. Every rejected operation leaves the
/// stored records untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BattleError {
    /// Ship type is not in the catalogue.
    UnknownShipType(String),
    /// Referenced record does not exist.
    NotFound { kind: RecordKind, id: String },
    /// Operation is not allowed in the battle's current phase.
    WrongPhase { expected: Awaiting, actual: Awaiting },
    /// Turn request does not match the stored turn counter.
    StaleTurn { expected: u32, actual: u32 },
    /// Ship carries a battle id but has no position.
    MissingLocation(String),
    /// Order sequence rejected for the ship's current state.
    InvalidOrder(String),
    /// Ship lifecycle change not allowed from its current state.
    InvalidTransition(String),
    /// Requested position is not on water.
    OnLand,
    /// Squadron is not enrolled in the battle.
    NotEnrolled(String),
    /// Squadron has no side in the battle yet.
    SideUnassigned(String),
}

impl BattleError {
    pub fn not_found(kind: RecordKind, id: &str) -> Self {
        BattleError::NotFound {
            kind,
            id: id.into(),
        }
    }
}

impl core::fmt::Display for BattleError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BattleError::UnknownShipType(name) => write!(f, "Unknown ship type '{}'", name),
            BattleError::NotFound { kind, id } => write!(f, "No {} with id '{}'", kind, id),
            BattleError::WrongPhase { expected, actual } => write!(
                f,
                "Battle is awaiting {}, operation needs {}",
                actual, expected
            ),
            BattleError::StaleTurn { expected, actual } => write!(
                f,
                "Turn {} requested but battle is at turn {}",
                expected, actual
            ),
            BattleError::MissingLocation(id) => {
                write!(f, "Ship '{}' is in a battle but has no location", id)
            }
            BattleError::InvalidOrder(msg) => write!(f, "Invalid order: {}", msg),
            BattleError::InvalidTransition(msg) => write!(f, "Invalid state change: {}", msg),
            BattleError::OnLand => write!(f, "Position is on land"),
            BattleError::NotEnrolled(id) => {
                write!(f, "Squadron '{}' is not enrolled in the battle", id)
            }
            BattleError::SideUnassigned(id) => {
                write!(f, "Squadron '{}' has not been assigned a side", id)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BattleError {}
