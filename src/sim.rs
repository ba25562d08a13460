#![cfg(feature = "std")]
//! Scripted AI-versus-AI battle on an in-memory store, from squadron
//! building through deployment and a number of turns.

use std::sync::Arc;

use anyhow::anyhow;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::core::{
    Awaiting, Battle, Catalogue, Controller, LatLng, Order, Orders, Rules, Side, CITIES,
    SUB_PHASES,
};
use crate::engine::TurnEngine;
use crate::fleet::Fleet;
use crate::lifecycle::BattleStateMachine;
use crate::oracle::OpenSea;
use crate::planner::DeploymentPlanner;
use crate::store::records;
use crate::store::{DocumentStore, MemoryStore};

/// Off Salamis.
pub const DEFAULT_SITE: LatLng = LatLng::new(37.95, 23.57);

#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    pub seed: u64,
    pub turns: u32,
    pub ship_type: String,
    pub ships: usize,
    pub site: LatLng,
    pub era: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            turns: 10,
            ship_type: "Trireme".into(),
            ships: 3,
            site: DEFAULT_SITE,
            era: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SideSummary {
    pub side: u8,
    pub city: String,
    pub deployed: usize,
    pub afloat: usize,
    pub sunk: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SimSummary {
    pub battle: String,
    pub turn: u32,
    pub awaiting: Awaiting,
    pub wind: String,
    pub sides: Vec<SideSummary>,
    pub winner: Option<u8>,
    pub log_entries: usize,
}

pub struct Simulation {
    pub store: Arc<MemoryStore>,
    pub battle_id: String,
    pub summary: SimSummary,
}

const SIDES: [(Side, &str); 2] = [(Side::One, CITIES[0]), (Side::Two, CITIES[7])];

pub async fn run(config: &SimConfig) -> anyhow::Result<Simulation> {
    let mut rng = SmallRng::seed_from_u64(config.seed);
    let store = Arc::new(MemoryStore::new());
    let shared: Arc<dyn DocumentStore> = store.clone();
    let catalogue = Arc::new(Catalogue::standard());
    let rules = Rules::default();

    let fleet = Fleet::new(shared.clone(), catalogue.clone());
    let machine = BattleStateMachine::new(shared.clone());
    let planner = DeploymentPlanner::new(shared.clone(), Arc::new(OpenSea), rules);
    let engine = TurnEngine::new(shared.clone(), catalogue, rules);

    let battle_id = machine.create_battle(config.era, config.site, &mut rng).await?;
    for (side, city) in SIDES {
        let squadron = fleet
            .create_squadron(Controller::Ai, city, &format!("{} squadron", city))
            .await?;
        for n in 0..config.ships {
            let ship = fleet.build_ship(&config.ship_type, city, &mut rng).await?;
            fleet.join_squadron(&ship, &squadron).await?;
            if n == 0 {
                fleet.set_flagship(&squadron, &ship).await?;
            }
        }
        machine.enroll_squadron(&battle_id, &squadron).await?;
        machine.assign_side(&battle_id, &squadron, side).await?;
    }

    machine.review_readiness(&battle_id).await?;
    let deployment = planner.deploy(&battle_id).await?;
    if !deployment.failed.is_empty() {
        log::warn!("{} ships could not be deployed", deployment.failed.len());
    }
    let report = machine.review_readiness(&battle_id).await?;
    if report.phase() != Awaiting::Orders {
        return Err(anyhow!("battle {} not ready for orders: {:?}", battle_id, report));
    }

    for turn in 0..config.turns {
        let battle: Battle = records::load(&*shared, &battle_id).await?;
        if battle.awaiting != Awaiting::Orders {
            break;
        }
        for ship in records::ships_in_battle(&*shared, &battle_id).await? {
            if !ship.health.sunk {
                fleet.submit_orders(&ship.id, scripted_orders(turn, &mut rng)).await?;
            }
        }
        engine.advance_turn(&battle_id, turn, &mut rng).await?;
    }

    let summary = summarize(&*shared, &battle_id).await?;
    Ok(Simulation {
        store,
        battle_id,
        summary,
    })
}

/// Get under way on the first turn, then steer now and then.
fn scripted_orders<R: Rng + ?Sized>(turn: u32, rng: &mut R) -> Orders {
    let mut orders = [Order::Wait; SUB_PHASES];
    if turn == 0 {
        orders[0] = Order::Faster;
        orders[1] = Order::Faster;
    } else if rng.random_bool(0.3) {
        let slot = rng.random_range(0..SUB_PHASES);
        orders[slot] = if rng.random_bool(0.5) {
            Order::Port
        } else {
            Order::Starboard
        };
    }
    orders
}

async fn summarize(store: &dyn DocumentStore, battle_id: &str) -> anyhow::Result<SimSummary> {
    let battle: Battle = records::load(store, battle_id).await?;
    let squadrons = records::squadrons_in_battle(store, &battle).await?;
    let ships = records::ships_of(store, &squadrons).await?;

    let mut sides = Vec::new();
    for (side, city) in SIDES {
        let on_side: Vec<_> = ships
            .iter()
            .filter(|s| s.squadron.as_deref().and_then(|sq| battle.side_of(sq)) == Some(side))
            .collect();
        sides.push(SideSummary {
            side: side.into(),
            city: city.into(),
            deployed: on_side.iter().filter(|s| s.in_battle(battle_id)).count(),
            afloat: on_side.iter().filter(|s| s.is_eligible() && !s.health.sunk).count(),
            sunk: on_side.iter().filter(|s| s.health.sunk).count(),
        });
    }
    let winner = if battle.awaiting == Awaiting::Complete {
        sides.iter().find(|s| s.afloat > 0).map(|s| s.side)
    } else {
        None
    };
    Ok(SimSummary {
        battle: battle_id.to_string(),
        turn: battle.turn,
        awaiting: battle.awaiting,
        wind: battle.wind.describe(),
        sides,
        winner,
        log_entries: battle.log.len(),
    })
}
