#![cfg(feature = "std")]
//! Battle setup and the readiness state machine.

use std::sync::Arc;

use rand::Rng;
use serde_json::Value;

use crate::core::{
    evaluate, Awaiting, Battle, BattleError, BattleSquadron, Controller, LatLng, ReadinessReport,
    Ship, Side, Squadron, Wind,
};
use crate::oracle::LandSeaOracle;
use crate::store::records::{self, encode, Record, CRUMBS};
use crate::store::{join, Batch, DocumentStore};

pub struct BattleStateMachine {
    store: Arc<dyn DocumentStore>,
}

impl BattleStateMachine {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// New battle at `site`, waiting for players, with random weather.
    pub async fn create_battle<R: Rng + Send + ?Sized>(
        &self,
        era: u32,
        site: LatLng,
        rng: &mut R,
    ) -> anyhow::Result<String> {
        let wind = Wind::random(rng);
        let mut battle = Battle::new("", era, site, wind);
        let id = records::insert(&*self.store, &mut battle).await?;
        log::info!("battle {} created, {}", id, wind.describe());
        Ok(id)
    }

    /// Add a squadron to a battle still in setup. AI squadrons come with
    /// their player already set.
    pub async fn enroll_squadron(&self, battle_id: &str, squadron_id: &str) -> anyhow::Result<()> {
        let battle = self.load_in_setup(battle_id).await?;
        let squadron: Squadron = records::load(&*self.store, squadron_id).await?;
        if let Some(other) = squadron.battle_id.as_deref() {
            if other != battle_id {
                return Err(BattleError::InvalidTransition(format!(
                    "squadron {} is already enrolled in battle {}",
                    squadron_id, other
                ))
                .into());
            }
        }
        let entry = BattleSquadron {
            side: None,
            city: squadron.city.clone(),
            player: squadron.owner.is_ai().then_some(Controller::Ai),
        };
        let batch = Batch::new()
            .guard_eq(Battle::field_of(battle_id, "awaiting"), battle.awaiting.as_str())
            .set(
                Battle::field_of(battle_id, &join("squadrons", squadron_id)),
                encode(&entry)?,
            )
            .set(Squadron::field_of(squadron_id, "battleId"), battle_id);
        self.commit_in_phase(batch, battle_id, battle.awaiting).await?;
        log::info!("squadron {} enrolled in battle {}", squadron_id, battle_id);
        Ok(())
    }

    pub async fn withdraw_squadron(&self, battle_id: &str, squadron_id: &str) -> anyhow::Result<()> {
        let battle = self.load_in_setup(battle_id).await?;
        if !battle.squadrons.contains_key(squadron_id) {
            return Err(BattleError::NotEnrolled(squadron_id.into()).into());
        }
        let batch = Batch::new()
            .guard_eq(Battle::field_of(battle_id, "awaiting"), battle.awaiting.as_str())
            .remove(Battle::field_of(battle_id, &join("squadrons", squadron_id)))
            .remove(Squadron::field_of(squadron_id, "battleId"));
        self.commit_in_phase(batch, battle_id, battle.awaiting).await
    }

    pub async fn assign_side(&self, battle_id: &str, squadron_id: &str, side: Side) -> anyhow::Result<()> {
        self.set_entry_field(battle_id, squadron_id, "side", encode(&side)?)
            .await
    }

    pub async fn assign_player(
        &self,
        battle_id: &str,
        squadron_id: &str,
        player: Controller,
    ) -> anyhow::Result<()> {
        self.set_entry_field(battle_id, squadron_id, "player", encode(&player)?)
            .await
    }

    async fn set_entry_field(
        &self,
        battle_id: &str,
        squadron_id: &str,
        field: &str,
        value: Value,
    ) -> anyhow::Result<()> {
        let battle = self.load_in_setup(battle_id).await?;
        if !battle.squadrons.contains_key(squadron_id) {
            return Err(BattleError::NotEnrolled(squadron_id.into()).into());
        }
        let entry = join(&join("squadrons", squadron_id), field);
        let batch = Batch::new()
            .guard_eq(Battle::field_of(battle_id, "awaiting"), battle.awaiting.as_str())
            .guard_exists(Battle::field_of(battle_id, &join("squadrons", squadron_id)))
            .set(Battle::field_of(battle_id, &entry), value);
        self.commit_in_phase(batch, battle_id, battle.awaiting).await
    }

    /// Re-evaluate setup and advance `awaiting` as far as the checks allow.
    /// The phase never moves backwards; the report is stored either way.
    pub async fn review_readiness(&self, battle_id: &str) -> anyhow::Result<ReadinessReport> {
        let battle: Battle = records::load(&*self.store, battle_id).await?;
        let squadrons = records::squadrons_in_battle(&*self.store, &battle).await?;
        let ships = records::ships_of(&*self.store, &squadrons).await?;
        let report = evaluate(&battle, &squadrons, &ships);
        let next = report.next_phase(battle.awaiting);

        let awaiting_path = Battle::field_of(battle_id, "awaiting");
        let batch = Batch::new()
            .guard_eq(awaiting_path.clone(), battle.awaiting.as_str())
            .set(awaiting_path, next.as_str())
            .set(Battle::field_of(battle_id, "review"), encode(&report)?);
        self.commit_in_phase(batch, battle_id, battle.awaiting).await?;
        if next != battle.awaiting {
            log::info!("battle {} now awaiting {}", battle_id, next);
        }
        Ok(report)
    }

    /// Tear a battle down before play starts: every squadron and ship is
    /// released for reuse and the battle record is deleted.
    pub async fn cancel_battle(&self, battle_id: &str) -> anyhow::Result<()> {
        let battle: Battle = records::load(&*self.store, battle_id).await?;
        if battle.awaiting >= Awaiting::Orders {
            return Err(BattleError::WrongPhase {
                expected: Awaiting::Deployment,
                actual: battle.awaiting,
            }
            .into());
        }
        let squadrons = records::squadrons_in_battle(&*self.store, &battle).await?;
        let mut ships = records::ships_of(&*self.store, &squadrons).await?;
        for ship in records::ships_in_battle(&*self.store, battle_id).await? {
            if !ships.iter().any(|s| s.id == ship.id) {
                ships.push(ship);
            }
        }

        let mut batch = Batch::new().guard_eq(
            Battle::field_of(battle_id, "awaiting"),
            battle.awaiting.as_str(),
        );
        for squadron in &squadrons {
            batch.push_remove(Squadron::field_of(&squadron.id, "battleId"));
        }
        for ship in ships.iter().filter(|s| s.in_battle(battle_id)) {
            for field in ["battleId", "location", "orders", "delayCountdown"] {
                batch.push_remove(Ship::field_of(&ship.id, field));
            }
        }
        batch.push_remove(join(CRUMBS, battle_id));
        batch.push_remove(Battle::path_of(battle_id));
        self.commit_in_phase(batch, battle_id, battle.awaiting).await?;
        log::info!("battle {} cancelled, {} squadrons released", battle_id, squadrons.len());
        Ok(())
    }

    /// Place a human-controlled ship during deployment.
    pub async fn place_ship(
        &self,
        battle_id: &str,
        ship_id: &str,
        location: LatLng,
        heading: u16,
        oracle: &dyn LandSeaOracle,
    ) -> anyhow::Result<()> {
        let battle: Battle = records::load(&*self.store, battle_id).await?;
        if battle.awaiting != Awaiting::Deployment {
            return Err(BattleError::WrongPhase {
                expected: Awaiting::Deployment,
                actual: battle.awaiting,
            }
            .into());
        }
        let ship: Ship = records::load(&*self.store, ship_id).await?;
        let squadron_id = ship
            .squadron
            .clone()
            .ok_or_else(|| BattleError::NotEnrolled(ship_id.into()))?;
        match battle.squadrons.get(&squadron_id) {
            None => return Err(BattleError::NotEnrolled(squadron_id).into()),
            Some(entry) if entry.side.is_none() => {
                return Err(BattleError::SideUnassigned(squadron_id).into())
            }
            Some(_) => {}
        }
        if !ship.is_eligible() {
            return Err(BattleError::InvalidTransition(format!(
                "{} ship {} cannot be deployed",
                ship.state, ship_id
            ))
            .into());
        }
        if !oracle.is_water(location).await? {
            return Err(BattleError::OnLand.into());
        }
        let batch = Batch::new()
            .guard_eq(Battle::field_of(battle_id, "awaiting"), Awaiting::Deployment.as_str())
            .set(Ship::field_of(ship_id, "location"), encode(&location)?)
            .set(Ship::field_of(ship_id, "heading"), heading % 360)
            .set(Ship::field_of(ship_id, "battleId"), battle_id);
        self.commit_in_phase(batch, battle_id, Awaiting::Deployment).await?;
        log::info!("ship {} placed for battle {}", ship_id, battle_id);
        Ok(())
    }

    async fn load_in_setup(&self, battle_id: &str) -> anyhow::Result<Battle> {
        let battle: Battle = records::load(&*self.store, battle_id).await?;
        if battle.awaiting >= Awaiting::Deployment {
            return Err(BattleError::WrongPhase {
                expected: Awaiting::Squadrons,
                actual: battle.awaiting,
            }
            .into());
        }
        Ok(battle)
    }

    /// Commit a batch guarded on the battle phase, reporting why it was
    /// refused if the guard failed.
    async fn commit_in_phase(&self, batch: Batch, battle_id: &str, expected: Awaiting) -> anyhow::Result<()> {
        if self.store.commit(batch).await? {
            return Ok(());
        }
        let current: Battle = records::load(&*self.store, battle_id).await?;
        Err(BattleError::WrongPhase {
            expected,
            actual: current.awaiting,
        }
        .into())
    }
}
