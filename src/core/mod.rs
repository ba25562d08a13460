//! Battle rules engine (no_std compatible)
//!
//! Pure logic over plain records: the ship catalogue, wind, readiness review,
//! turn resolution and deployment geometry. Needs only `alloc`, `libm` and
//! `rand`; storage and scheduling live in the std-only modules of the crate.

pub mod battle;
pub mod catalogue;
pub mod combat;
pub mod common;
pub mod config;
pub mod deploy;
pub mod geo;
pub mod readiness;
pub mod ship;
pub mod turn;
pub mod wind;

pub use battle::{Awaiting, Battle, BattleSquadron, Controller, LogEntry, Side, Squadron};
pub use catalogue::{Catalogue, PointOfSail, ShipTypeDef, WindTier};
pub use combat::{CombatContext, CombatResolver, NoCombat};
pub use common::{BattleError, RecordKind};
pub use config::*;
pub use deploy::Formation;
pub use geo::{GeoCalculator, LatLng};
pub use readiness::{evaluate, is_decided, ReadinessReport};
pub use ship::{
    calc_heading, Bank, Crew, Health, Order, Orders, Pace, Propulsion, Rigging, SailRig, Ship,
    ShipState,
};
pub use turn::{Breadcrumb, TurnOutcome, TurnResolver, TurnSnapshot};
pub use wind::{Forecast, WeatherEffect, Wind, WindShift};
