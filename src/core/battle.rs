//! Battle and squadron records.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::core::geo::{GeoCalculator, LatLng};
use crate::core::readiness::ReadinessReport;
use crate::core::wind::Wind;

/// Lifecycle phase of a battle, in the order a battle moves through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "lowercase"))]
pub enum Awaiting {
    #[default]
    Players,
    Squadrons,
    Deployment,
    Orders,
    Complete,
}

impl Awaiting {
    pub fn as_str(self) -> &'static str {
        match self {
            Awaiting::Players => "players",
            Awaiting::Squadrons => "squadrons",
            Awaiting::Deployment => "deployment",
            Awaiting::Orders => "orders",
            Awaiting::Complete => "complete",
        }
    }
}

impl fmt::Display for Awaiting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(into = "u8", try_from = "u8"))]
pub enum Side {
    One,
    Two,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::One, Side::Two];
}

impl From<Side> for u8 {
    fn from(side: Side) -> u8 {
        match side {
            Side::One => 1,
            Side::Two => 2,
        }
    }
}

impl TryFrom<u8> for Side {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Side::One),
            2 => Ok(Side::Two),
            other => Err(alloc::format!("side must be 1 or 2, got {}", other)),
        }
    }
}

/// Who gives a squadron its orders. Stored as the player id, or `"AI"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(into = "String", from = "String"))]
pub enum Controller {
    Human(String),
    Ai,
}

pub const AI_CONTROLLER: &str = "AI";

impl Controller {
    pub fn is_ai(&self) -> bool {
        matches!(self, Controller::Ai)
    }
}

impl From<Controller> for String {
    fn from(c: Controller) -> String {
        match c {
            Controller::Human(id) => id,
            Controller::Ai => AI_CONTROLLER.into(),
        }
    }
}

impl From<String> for Controller {
    fn from(s: String) -> Controller {
        if s == AI_CONTROLLER {
            Controller::Ai
        } else {
            Controller::Human(s)
        }
    }
}

/// A squadron's entry in a battle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleSquadron {
    #[cfg_attr(feature = "std", serde(default, skip_serializing_if = "Option::is_none"))]
    pub side: Option<Side>,
    pub city: String,
    #[cfg_attr(feature = "std", serde(default, skip_serializing_if = "Option::is_none"))]
    pub player: Option<Controller>,
}

/// A named group of ships under one owner. Reused across battles.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "camelCase"))]
pub struct Squadron {
    #[cfg_attr(feature = "std", serde(skip))]
    pub id: String,
    pub owner: Controller,
    pub city: String,
    pub title: String,
    #[cfg_attr(feature = "std", serde(default))]
    pub ships: Vec<String>,
    #[cfg_attr(feature = "std", serde(default, skip_serializing_if = "Option::is_none"))]
    pub battle_id: Option<String>,
}

/// One line of a battle's event log.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct LogEntry {
    pub ship: String,
    pub turn: u32,
    pub event: String,
    #[cfg_attr(feature = "std", serde(default))]
    pub note: String,
}

impl LogEntry {
    pub fn new(ship: &str, turn: u32, event: impl Into<String>) -> Self {
        Self {
            ship: ship.into(),
            turn,
            event: event.into(),
            note: String::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Battle {
    #[cfg_attr(feature = "std", serde(skip))]
    pub id: String,
    /// Century BC the battle is set in; limits the ship types on offer.
    pub era: u32,
    pub site: LatLng,
    pub turn: u32,
    pub wind: Wind,
    pub awaiting: Awaiting,
    #[cfg_attr(feature = "std", serde(default))]
    pub squadrons: BTreeMap<String, BattleSquadron>,
    #[cfg_attr(feature = "std", serde(default))]
    pub log: BTreeMap<String, LogEntry>,
    #[cfg_attr(feature = "std", serde(default, skip_serializing_if = "Option::is_none"))]
    pub review: Option<ReadinessReport>,
}

impl Battle {
    pub fn new(id: &str, era: u32, site: LatLng, wind: Wind) -> Self {
        Self {
            id: id.into(),
            era,
            site,
            turn: 0,
            wind,
            awaiting: Awaiting::Players,
            squadrons: BTreeMap::new(),
            log: BTreeMap::new(),
            review: None,
        }
    }

    /// Geodesic helper calibrated for the battle site.
    pub fn calculator(&self) -> GeoCalculator {
        GeoCalculator::new(self.site.lat)
    }

    pub fn side_of(&self, squadron_id: &str) -> Option<Side> {
        self.squadrons.get(squadron_id).and_then(|s| s.side)
    }

    /// Squadron ids enrolled on `side`.
    pub fn squadrons_on(&self, side: Side) -> impl Iterator<Item = &str> {
        self.squadrons
            .iter()
            .filter(move |(_, s)| s.side == Some(side))
            .map(|(id, _)| id.as_str())
    }

    /// Log entries in the order they were written.
    pub fn log_entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.log.values()
    }
}
