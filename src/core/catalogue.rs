//! Ship-type catalogue: fixed per-type attributes, looked up and never
//! recomputed during play.

use alloc::string::ToString;
use alloc::vec::Vec;

use crate::core::common::BattleError;
use crate::core::config::{FULL_SPEED_TURNS, SHIP_TYPES};
use crate::core::ship::{Bank, Crew, Health, Pace, Rigging, SailRig};

/// Rowing speeds in game units (one unit is roughly two knots).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedTable {
    pub slow: u32,
    pub cruise: u32,
    pub full: u32,
}

/// Sub-phases that must pass after a heading change, by speed band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnDelays {
    pub slow: u32,
    pub cruise: u32,
    pub full: u32,
}

/// Sailing speeds for one wind tier, by point of sail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SailTable {
    pub beating: u32,
    pub reaching: u32,
    pub running: u32,
}

impl SailTable {
    fn at(&self, point: PointOfSail) -> u32 {
        match point {
            PointOfSail::InIrons => 0,
            PointOfSail::Beating => self.beating,
            PointOfSail::Reaching => self.reaching,
            PointOfSail::Running => self.running,
        }
    }
}

/// Deck complement carried on top of the rowers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Complement {
    pub sailors: u32,
    pub archers: u32,
    pub marines: u32,
}

/// Wind tier used to pick a sail table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WindTier {
    None,
    Light,
    Moderate,
}

impl WindTier {
    /// No sailing in calm or light air, nor in a strong breeze.
    pub fn from_strength(strength: u8) -> Self {
        match strength {
            2 | 3 => WindTier::Light,
            4 | 5 => WindTier::Moderate,
            _ => WindTier::None,
        }
    }

    fn reefed(self) -> Self {
        match self {
            WindTier::Moderate => WindTier::Light,
            _ => WindTier::None,
        }
    }
}

/// Angle of the ship's heading relative to where the wind blows from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointOfSail {
    /// Heading straight into the wind.
    InIrons,
    /// One compass point off the wind.
    Beating,
    /// Wind on the beam.
    Reaching,
    /// Wind on the quarter or dead astern.
    Running,
}

impl PointOfSail {
    /// `heading` in degrees, `wind_direction` as a compass point 0..7.
    pub fn from_heading(heading: u16, wind_direction: u8) -> Self {
        let ship_point = ((heading as u32 + 22) / 45) % 8;
        let diff = (ship_point + 8 - (wind_direction as u32 % 8)) % 8;
        match diff.min(8 - diff) {
            0 => PointOfSail::InIrons,
            1 => PointOfSail::Beating,
            2 => PointOfSail::Reaching,
            _ => PointOfSail::Running,
        }
    }
}

/// One row of the catalogue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShipTypeDef {
    name: &'static str,
    pub decks: u32,
    /// Length in game units of roughly fifty feet.
    pub length: f64,
    pub beam: f64,
    pub hull: u32,
    /// Oar banks per side, one bank being about twenty oars.
    pub oars: u32,
    pub crew: Complement,
    pub speed: SpeedTable,
    pub crippled: SpeedTable,
    pub turn_delay: TurnDelays,
    pub light_sail: SailTable,
    pub moderate_sail: SailTable,
    /// Century BC from which the type was in common use.
    pub era: u32,
}

impl ShipTypeDef {
    /// Define a type from its headline numbers; slow speed is always one unit
    /// and the crippled table is the normal one halved, rounding up.
    #[allow(clippy::too_many_arguments)]
    pub const fn define(
        name: &'static str,
        decks: u32,
        length: f64,
        beam: f64,
        hull: u32,
        oars: u32,
        crew: Complement,
        cruise: u32,
        full: u32,
        turn_cruise: u32,
        turn_full: u32,
        era: u32,
        light_sail: SailTable,
        moderate_sail: SailTable,
    ) -> Self {
        let turn_slow = if turn_cruise < 1 { turn_cruise } else { 1 };
        Self {
            name,
            decks,
            length,
            beam,
            hull,
            oars,
            crew,
            speed: SpeedTable {
                slow: 1,
                cruise,
                full,
            },
            crippled: SpeedTable {
                slow: 1,
                cruise: (cruise + 1) / 2,
                full: (full + 1) / 2,
            },
            turn_delay: TurnDelays {
                slow: turn_slow,
                cruise: turn_cruise,
                full: turn_full,
            },
            light_sail,
            moderate_sail,
            era,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Signed rowing speed for `pace`; astern uses the slow speed.
    pub fn rowing_speed(&self, pace: Pace, crippled: bool) -> i32 {
        let table = if crippled { &self.crippled } else { &self.speed };
        match pace {
            Pace::Back => -(table.slow as i32),
            Pace::Stop => 0,
            Pace::Slow => table.slow as i32,
            Pace::Cruise => table.cruise as i32,
            Pace::Full => table.full as i32,
        }
    }

    /// Turn delay picked by the current speed value, as the rules table does:
    /// above one unit is cruising, above two is full.
    pub fn turn_delay_at(&self, speed: i32) -> u32 {
        if speed > 2 {
            self.turn_delay.full
        } else if speed > 1 {
            self.turn_delay.cruise
        } else {
            self.turn_delay.slow
        }
    }

    /// Sailing speed for the given wind strength, rig and point of sail.
    pub fn sailing_speed(&self, wind_strength: u8, rig: SailRig, point: PointOfSail) -> u32 {
        let mut tier = WindTier::from_strength(wind_strength);
        if rig == SailRig::Reefed {
            tier = tier.reefed();
        }
        match tier {
            WindTier::None => 0,
            WindTier::Light => self.light_sail.at(point),
            WindTier::Moderate => self.moderate_sail.at(point),
        }
    }

    /// Health record of a freshly built ship of this type.
    pub fn initial_health(&self) -> Health {
        Health {
            port: Bank {
                oars: self.oars,
                rudder: true,
            },
            starboard: Bank {
                oars: self.oars,
                rudder: true,
            },
            hull: self.hull,
            holes: 0,
            crew: Crew {
                captain: 1,
                steersman: 1,
                sailors: self.crew.sailors,
                archers: self.crew.archers,
                marines: self.crew.marines,
            },
            full_speeds: FULL_SPEED_TURNS,
            rigging: Rigging {
                mast: true,
                sail: true,
            },
            sunk: false,
        }
    }
}

/// Immutable set of ship types, built once and shared.
#[derive(Debug, Clone)]
pub struct Catalogue {
    types: Vec<ShipTypeDef>,
}

impl Catalogue {
    /// The standard five types from pentaconter to quinquereme.
    pub fn standard() -> Self {
        Self::with_types(SHIP_TYPES.to_vec())
    }

    pub fn with_types(types: Vec<ShipTypeDef>) -> Self {
        Self { types }
    }

    pub fn get(&self, name: &str) -> Option<&ShipTypeDef> {
        self.types.iter().find(|t| t.name() == name)
    }

    /// Like [`Catalogue::get`] but reports an unknown type as an error.
    pub fn require(&self, name: &str) -> Result<&ShipTypeDef, BattleError> {
        self.get(name)
            .ok_or_else(|| BattleError::UnknownShipType(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ShipTypeDef> {
        self.types.iter()
    }

    /// Types in common use by the given era (centuries BC count down).
    pub fn available_in(&self, era: u32) -> impl Iterator<Item = &ShipTypeDef> {
        self.types.iter().filter(move |t| t.era >= era)
    }

    /// Distinct eras, oldest first.
    pub fn eras(&self) -> Vec<u32> {
        let mut eras: Vec<u32> = self.types.iter().map(|t| t.era).collect();
        eras.sort_unstable_by(|a, b| b.cmp(a));
        eras.dedup();
        eras
    }
}

impl Default for Catalogue {
    fn default() -> Self {
        Self::standard()
    }
}
