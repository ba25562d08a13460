//! Per-ship records: lifecycle state, health, propulsion and orders.

use alloc::string::String;
use core::fmt;

use crate::core::catalogue::ShipTypeDef;
use crate::core::common::BattleError;
use crate::core::config::SUB_PHASES;
use crate::core::geo::LatLng;

/// Lifecycle state of a ship. `Sunk` and `Retired` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "lowercase"))]
pub enum ShipState {
    #[default]
    New,
    Ready,
    Crippled,
    Beached,
    Sunk,
    Retired,
}

impl ShipState {
    /// Whether a ship in this state can take part in a battle.
    pub fn is_eligible(self) -> bool {
        !matches!(self, ShipState::Beached | ShipState::Sunk | ShipState::Retired)
    }
}

impl fmt::Display for ShipState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ShipState::New => "new",
            ShipState::Ready => "ready",
            ShipState::Crippled => "crippled",
            ShipState::Beached => "beached",
            ShipState::Sunk => "sunk",
            ShipState::Retired => "retired",
        };
        f.write_str(s)
    }
}

/// One side of the ship: oar banks still manned and the steering oar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Bank {
    pub oars: u32,
    pub rudder: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Crew {
    pub captain: u32,
    pub steersman: u32,
    pub sailors: u32,
    pub archers: u32,
    pub marines: u32,
}

impl Crew {
    pub fn total(&self) -> u32 {
        self.captain + self.steersman + self.sailors + self.archers + self.marines
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Rigging {
    pub mast: bool,
    pub sail: bool,
}

/// Mutable condition of a ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "camelCase"))]
pub struct Health {
    pub port: Bank,
    pub starboard: Bank,
    pub hull: u32,
    pub holes: u32,
    pub crew: Crew,
    /// Turns of full-speed rowing left before the rowers are spent.
    pub full_speeds: u32,
    pub rigging: Rigging,
    pub sunk: bool,
}

impl Health {
    pub fn can_steer(&self) -> bool {
        (self.port.oars > 0 && self.starboard.oars > 0) || self.port.rudder || self.starboard.rudder
    }

    /// Crew and oar banks still aboard.
    pub fn survivors(&self) -> u32 {
        self.crew.total() + self.port.oars + self.starboard.oars
    }
}

/// Rowing pace, stored as -1 (backing water) to 3 (full).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(into = "i8", try_from = "i8"))]
pub enum Pace {
    Back,
    #[default]
    Stop,
    Slow,
    Cruise,
    Full,
}

impl Pace {
    pub fn faster(self) -> Self {
        match self {
            Pace::Back => Pace::Stop,
            Pace::Stop => Pace::Slow,
            Pace::Slow => Pace::Cruise,
            Pace::Cruise | Pace::Full => Pace::Full,
        }
    }

    pub fn slower(self) -> Self {
        match self {
            Pace::Back | Pace::Stop => Pace::Back,
            Pace::Slow => Pace::Stop,
            Pace::Cruise => Pace::Slow,
            Pace::Full => Pace::Cruise,
        }
    }
}

impl From<Pace> for i8 {
    fn from(pace: Pace) -> i8 {
        match pace {
            Pace::Back => -1,
            Pace::Stop => 0,
            Pace::Slow => 1,
            Pace::Cruise => 2,
            Pace::Full => 3,
        }
    }
}

impl TryFrom<i8> for Pace {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Pace::Back),
            0 => Ok(Pace::Stop),
            1 => Ok(Pace::Slow),
            2 => Ok(Pace::Cruise),
            3 => Ok(Pace::Full),
            other => Err(alloc::format!("pace {} out of range -1..=3", other)),
        }
    }
}

/// How much canvas is set while sailing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "lowercase"))]
pub enum SailRig {
    Reefed,
    #[default]
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(tag = "mode", rename_all = "lowercase"))]
pub enum Propulsion {
    Rowing { pace: Pace },
    Sailing { rig: SailRig },
}

impl Default for Propulsion {
    fn default() -> Self {
        Propulsion::Rowing { pace: Pace::Stop }
    }
}

/// Order for one movement sub-phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Order {
    #[default]
    #[cfg_attr(feature = "std", serde(rename = ""))]
    Wait,
    #[cfg_attr(feature = "std", serde(rename = "+"))]
    Faster,
    #[cfg_attr(feature = "std", serde(rename = "-"))]
    Slower,
    #[cfg_attr(feature = "std", serde(rename = "P"))]
    Port,
    #[cfg_attr(feature = "std", serde(rename = "S"))]
    Starboard,
    /// Move an oar bank across to an empty side.
    #[cfg_attr(feature = "std", serde(rename = "T"))]
    Transfer,
    #[cfg_attr(feature = "std", serde(rename = "R"))]
    RaiseSail,
    #[cfg_attr(feature = "std", serde(rename = "L"))]
    LowerSail,
    /// Survivors of a sunk ship swim along the heading.
    #[cfg_attr(feature = "std", serde(rename = "W"))]
    Swim,
}

impl Order {
    pub fn is_steering(self) -> bool {
        matches!(self, Order::Port | Order::Starboard)
    }
}

pub type Orders = [Order; SUB_PHASES];

/// A warship. Persists across battles; `battle_id` is set only while deployed.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "camelCase"))]
pub struct Ship {
    #[cfg_attr(feature = "std", serde(skip))]
    pub id: String,
    pub name: String,
    #[cfg_attr(feature = "std", serde(rename = "type"))]
    pub ship_type: String,
    pub city: String,
    #[cfg_attr(feature = "std", serde(default, skip_serializing_if = "Option::is_none"))]
    pub squadron: Option<String>,
    pub state: ShipState,
    pub health: Health,
    #[cfg_attr(feature = "std", serde(default))]
    pub propulsion: Propulsion,
    #[cfg_attr(feature = "std", serde(default))]
    pub heading: u16,
    #[cfg_attr(feature = "std", serde(default, skip_serializing_if = "Option::is_none"))]
    pub location: Option<LatLng>,
    #[cfg_attr(feature = "std", serde(default, skip_serializing_if = "Option::is_none"))]
    pub orders: Option<Orders>,
    #[cfg_attr(feature = "std", serde(default))]
    pub delay_countdown: i32,
    #[cfg_attr(feature = "std", serde(default))]
    pub flagship: bool,
    #[cfg_attr(feature = "std", serde(default, skip_serializing_if = "Option::is_none"))]
    pub battle_id: Option<String>,
}

impl Ship {
    /// A new, unassigned ship of the given type at full strength.
    pub fn build(id: &str, name: &str, def: &ShipTypeDef, city: &str) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ship_type: def.name().into(),
            city: city.into(),
            squadron: None,
            state: ShipState::New,
            health: def.initial_health(),
            propulsion: Propulsion::default(),
            heading: 0,
            location: None,
            orders: None,
            delay_countdown: 0,
            flagship: false,
            battle_id: None,
        }
    }

    pub fn is_eligible(&self) -> bool {
        self.state.is_eligible()
    }

    pub fn is_crippled(&self) -> bool {
        self.state == ShipState::Crippled
    }

    pub fn in_battle(&self, battle_id: &str) -> bool {
        self.battle_id.as_deref() == Some(battle_id)
    }

    /// Check an order sequence against the ship's condition. Sunk ships only
    /// take survivor actions; afloat ships cannot swim.
    pub fn validate_orders(&self, orders: &Orders) -> Result<(), BattleError> {
        for order in orders {
            let ok = if self.health.sunk {
                matches!(order, Order::Wait | Order::Swim)
            } else {
                *order != Order::Swim
            };
            if !ok {
                return Err(BattleError::InvalidOrder(alloc::format!(
                    "{:?} not allowed for {} ship '{}'",
                    order,
                    self.state,
                    self.id
                )));
            }
        }
        Ok(())
    }
}

/// Heading after one 45 degree steering step. Moving astern the helm is
/// reversed.
pub fn calc_heading(heading: u16, order: Order, astern: bool) -> u16 {
    let step: i32 = match order {
        Order::Port => -45,
        Order::Starboard => 45,
        _ => return heading,
    };
    let step = if astern { -step } else { step };
    (heading as i32 + step).rem_euclid(360) as u16
}
