//! Commonly used types and utilities for ease of import.

pub use crate::core::{
    Awaiting, Battle, BattleError, Catalogue, Controller, LatLng, Order, Orders, Pace, Rules,
    Ship, ShipState, Side, Squadron, TurnResolver, TurnSnapshot, Wind,
};

#[cfg(feature = "std")]
pub use crate::{
    BattleStateMachine, DeploymentPlanner, DocumentStore, Fleet, LandSeaOracle, MemoryStore,
    TurnEngine,
};
