#![allow(dead_code)]

use std::sync::Arc;

use gnw::store::{DocumentStore, MemoryStore};
use gnw::{
    Awaiting, BattleStateMachine, Catalogue, Controller, DeploymentPlanner, Fleet, LatLng, OpenSea,
    Rules, Side,
};
use rand::{rngs::SmallRng, SeedableRng};
use serde_json::json;

pub const SITE: LatLng = LatLng::new(37.95, 23.57);

/// Two AI squadrons, Athens on side one and Sparta on side two, with a
/// fixed north wind.
pub struct World {
    pub store: Arc<MemoryStore>,
    pub fleet: Fleet,
    pub machine: BattleStateMachine,
    pub battle: String,
    pub squadrons: [String; 2],
    pub ships: [Vec<String>; 2],
}

impl World {
    pub fn shared(&self) -> Arc<dyn DocumentStore> {
        self.store.clone()
    }

    pub fn planner(&self, oracle: Arc<dyn gnw::LandSeaOracle>) -> DeploymentPlanner {
        DeploymentPlanner::new(self.shared(), oracle, Rules::default())
    }
}

/// Squadrons raised and enrolled, battle not yet reviewed.
pub async fn enrolled(per_side: usize) -> World {
    let store = Arc::new(MemoryStore::new());
    let shared: Arc<dyn DocumentStore> = store.clone();
    let fleet = Fleet::new(shared.clone(), Arc::new(Catalogue::standard()));
    let machine = BattleStateMachine::new(shared.clone());
    let mut rng = SmallRng::seed_from_u64(11);

    let battle = machine.create_battle(500, SITE, &mut rng).await.unwrap();
    store
        .set(
            &format!("battles/{}/wind", battle),
            json!({"strength": 2, "direction": 0, "forecast": "steady"}),
        )
        .await
        .unwrap();

    let mut squadrons = Vec::new();
    let mut ships = Vec::new();
    for (side, city) in [(Side::One, "Athens"), (Side::Two, "Sparta")] {
        let squadron = fleet
            .create_squadron(Controller::Ai, city, &format!("{} squadron", city))
            .await
            .unwrap();
        let mut ids = Vec::new();
        for n in 0..per_side {
            let id = fleet.build_named("Trireme", city, &format!("{} {}", city, n)).await.unwrap();
            fleet.join_squadron(&id, &squadron).await.unwrap();
            if n == 0 {
                fleet.set_flagship(&squadron, &id).await.unwrap();
            }
            ids.push(id);
        }
        machine.enroll_squadron(&battle, &squadron).await.unwrap();
        machine.assign_side(&battle, &squadron, side).await.unwrap();
        squadrons.push(squadron);
        ships.push(ids);
    }

    let [sq1, sq2]: [String; 2] = squadrons.try_into().unwrap();
    let [s1, s2]: [Vec<String>; 2] = ships.try_into().unwrap();
    World {
        store,
        fleet,
        machine,
        battle,
        squadrons: [sq1, sq2],
        ships: [s1, s2],
    }
}

/// Reviewed into deployment.
pub async fn awaiting_deployment(per_side: usize) -> World {
    let world = enrolled(per_side).await;
    let report = world.machine.review_readiness(&world.battle).await.unwrap();
    assert_eq!(report.phase(), Awaiting::Deployment);
    world
}

/// Deployed on open sea and reviewed into the orders phase.
pub async fn awaiting_orders(per_side: usize) -> World {
    let world = awaiting_deployment(per_side).await;
    let report = world.planner(Arc::new(OpenSea)).deploy(&world.battle).await.unwrap();
    assert!(report.failed.is_empty());
    let review = world.machine.review_readiness(&world.battle).await.unwrap();
    assert_eq!(review.phase(), Awaiting::Orders);
    world
}
