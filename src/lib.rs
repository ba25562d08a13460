#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod core;
#[cfg(feature = "std")]
pub mod engine;
#[cfg(feature = "std")]
pub mod fleet;
#[cfg(feature = "std")]
pub mod lifecycle;
#[cfg(feature = "std")]
mod logging;
#[cfg(feature = "std")]
pub mod oracle;
#[cfg(feature = "std")]
pub mod planner;
pub mod prelude;
#[cfg(feature = "std")]
pub mod sim;
#[cfg(feature = "std")]
pub mod store;

pub use crate::core::*;
#[cfg(feature = "std")]
pub use engine::{TurnEngine, TurnReport};
#[cfg(feature = "std")]
pub use fleet::Fleet;
#[cfg(feature = "std")]
pub use lifecycle::BattleStateMachine;
#[cfg(feature = "std")]
pub use logging::{init_logging, init_logging_at};
#[cfg(feature = "std")]
pub use oracle::{ElevationOracle, ElevationSource, GridKey, LandSeaOracle, OpenSea};
#[cfg(feature = "std")]
pub use planner::{DeploymentPlanner, DeploymentReport};
#[cfg(feature = "std")]
pub use store::{Batch, ChildEvent, DocumentStore, Guard, MemoryStore, Mutation};
