#![cfg(feature = "std")]
//! Automated deployment of AI squadrons.

use std::collections::HashMap;
use std::sync::Arc;

use crate::core::{
    Awaiting, Battle, BattleError, Formation, GeoCalculator, LatLng, Rules, Ship, Side,
};
use crate::oracle::LandSeaOracle;
use crate::store::records::{self, encode, Record};
use crate::store::{Batch, DocumentStore};

/// Ships placed and ships left undeployed by one planner run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeploymentReport {
    pub placed: Vec<String>,
    pub failed: Vec<String>,
}

pub struct DeploymentPlanner {
    store: Arc<dyn DocumentStore>,
    oracle: Arc<dyn LandSeaOracle>,
    rules: Rules,
}

impl DeploymentPlanner {
    pub fn new(store: Arc<dyn DocumentStore>, oracle: Arc<dyn LandSeaOracle>, rules: Rules) -> Self {
        Self {
            store,
            oracle,
            rules,
        }
    }

    /// Place every undeployed eligible ship of the battle's AI squadrons.
    /// Each side forms a line abreast upwind of the site, facing downwind.
    /// A ship with no water position within the attempt cap is left
    /// undeployed; that is reported, not an error.
    pub async fn deploy(&self, battle_id: &str) -> anyhow::Result<DeploymentReport> {
        let battle: Battle = records::load(&*self.store, battle_id).await?;
        if battle.awaiting != Awaiting::Deployment {
            return Err(BattleError::WrongPhase {
                expected: Awaiting::Deployment,
                actual: battle.awaiting,
            }
            .into());
        }
        let calc = battle.calculator();
        let formation = Formation::for_wind(battle.wind.direction);

        let squadrons = records::squadrons_in_battle(&*self.store, &battle).await?;
        let ships = records::ships_of(&*self.store, &squadrons).await?;

        let mut occupied: HashMap<Side, Vec<LatLng>> = HashMap::new();
        for ship in ships.iter().filter(|s| s.in_battle(battle_id)) {
            let side = ship.squadron.as_deref().and_then(|sq| battle.side_of(sq));
            if let (Some(side), Some(location)) = (side, ship.location) {
                occupied.entry(side).or_default().push(location);
            }
        }

        let mut report = DeploymentReport::default();
        for squadron in &squadrons {
            let Some(entry) = battle.squadrons.get(&squadron.id) else {
                continue;
            };
            if !entry.player.as_ref().is_some_and(|p| p.is_ai()) {
                continue;
            }
            let Some(side) = entry.side else {
                log::warn!("AI squadron {} has no side, not deploying", squadron.id);
                continue;
            };
            let pending = ships.iter().filter(|s| {
                s.squadron.as_deref() == Some(squadron.id.as_str())
                    && s.is_eligible()
                    && !s.in_battle(battle_id)
            });
            for ship in pending {
                let placed = occupied.entry(side).or_default();
                let preferred = formation
                    .next_position(&calc, placed, &self.rules)
                    .unwrap_or_else(|| formation.first_position(&calc, battle.site, &self.rules));
                match self.find_water(&calc, &formation, preferred).await {
                    Some(location) => {
                        self.place(battle_id, ship, location, formation.heading).await?;
                        placed.push(location);
                        report.placed.push(ship.id.clone());
                        log::info!(
                            "AI placed ship {} for side {} at {:.5},{:.5} heading {}",
                            ship.id,
                            u8::from(side),
                            location.lat,
                            location.lng,
                            formation.heading
                        );
                    }
                    None => {
                        log::warn!(
                            "no water for ship {} after {} attempts, left undeployed",
                            ship.id,
                            self.rules.max_placement_attempts
                        );
                        report.failed.push(ship.id.clone());
                    }
                }
            }
        }
        Ok(report)
    }

    /// First candidate the oracle calls water. An oracle failure counts as
    /// land for that candidate.
    async fn find_water(
        &self,
        calc: &GeoCalculator,
        formation: &Formation,
        preferred: LatLng,
    ) -> Option<LatLng> {
        for candidate in formation.candidates(calc, preferred, &self.rules) {
            match self.oracle.is_water(candidate).await {
                Ok(true) => return Some(candidate),
                Ok(false) => {}
                Err(e) => log::warn!("land check failed at {:?}: {}", candidate, e),
            }
        }
        None
    }

    async fn place(&self, battle_id: &str, ship: &Ship, location: LatLng, heading: u16) -> anyhow::Result<()> {
        let batch = Batch::new()
            .guard_eq(Battle::field_of(battle_id, "awaiting"), Awaiting::Deployment.as_str())
            .guard_exists(Ship::path_of(&ship.id))
            .set(Ship::field_of(&ship.id, "location"), encode(&location)?)
            .set(Ship::field_of(&ship.id, "heading"), heading)
            .set(Ship::field_of(&ship.id, "battleId"), battle_id);
        if self.store.commit(batch).await? {
            return Ok(());
        }
        match records::find::<Battle>(&*self.store, battle_id).await? {
            Some(current) => Err(BattleError::WrongPhase {
                expected: Awaiting::Deployment,
                actual: current.awaiting,
            }
            .into()),
            None => Err(BattleError::not_found(Battle::KIND, battle_id).into()),
        }
    }
}
