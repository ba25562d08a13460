#![cfg(feature = "std")]
//! Squadron and ship management outside of turn resolution.

use std::sync::Arc;

use rand::Rng;
use serde_json::Value;

use crate::core::{
    Awaiting, Battle, BattleError, Catalogue, Controller, Orders, Ship, ShipState, Squadron,
    SHIP_NAMES,
};
use crate::store::records::{self, encode, Record};
use crate::store::{Batch, DocumentStore};

pub struct Fleet {
    store: Arc<dyn DocumentStore>,
    catalogue: Arc<Catalogue>,
}

impl Fleet {
    pub fn new(store: Arc<dyn DocumentStore>, catalogue: Arc<Catalogue>) -> Self {
        Self { store, catalogue }
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    pub async fn create_squadron(
        &self,
        owner: Controller,
        city: &str,
        title: &str,
    ) -> anyhow::Result<String> {
        let mut squadron = Squadron {
            id: String::new(),
            owner,
            city: city.into(),
            title: title.into(),
            ships: Vec::new(),
            battle_id: None,
        };
        let id = records::insert(&*self.store, &mut squadron).await?;
        log::info!("squadron {} '{}' raised for {}", id, title, city);
        Ok(id)
    }

    /// Build a ship with a name drawn from the historical list.
    pub async fn build_ship<R: Rng + Send + ?Sized>(
        &self,
        ship_type: &str,
        city: &str,
        rng: &mut R,
    ) -> anyhow::Result<String> {
        let name = SHIP_NAMES[rng.random_range(0..SHIP_NAMES.len())];
        self.build_named(ship_type, city, name).await
    }

    pub async fn build_named(&self, ship_type: &str, city: &str, name: &str) -> anyhow::Result<String> {
        let def = self.catalogue.require(ship_type)?;
        let mut ship = Ship::build("", name, def, city);
        let id = records::insert(&*self.store, &mut ship).await?;
        log::debug!("built {} {} '{}' for {}", ship_type, id, name, city);
        Ok(id)
    }

    /// Write one field of a ship record, e.g. `health/hull`.
    pub async fn adjust_attribute(&self, ship_id: &str, path: &str, value: Value) -> anyhow::Result<()> {
        let batch = Batch::new()
            .guard_exists(Ship::path_of(ship_id))
            .set(Ship::field_of(ship_id, path), value);
        if !self.store.commit(batch).await? {
            return Err(BattleError::not_found(Ship::KIND, ship_id).into());
        }
        Ok(())
    }

    /// Make `ship_id` the only flagship of its squadron.
    pub async fn set_flagship(&self, squadron_id: &str, ship_id: &str) -> anyhow::Result<()> {
        let squadron: Squadron = records::load(&*self.store, squadron_id).await?;
        if !squadron.ships.iter().any(|s| s == ship_id) {
            return Err(BattleError::InvalidTransition(format!(
                "ship {} is not in squadron {}",
                ship_id, squadron_id
            ))
            .into());
        }
        let ship: Ship = records::load(&*self.store, ship_id).await?;
        if !ship.is_eligible() {
            return Err(BattleError::InvalidTransition(format!(
                "{} ship {} cannot be flagship",
                ship.state, ship_id
            ))
            .into());
        }
        let mut batch = Batch::new().guard_eq(
            Squadron::field_of(squadron_id, "ships"),
            encode(&squadron.ships)?,
        );
        for id in &squadron.ships {
            batch.push_set(Ship::field_of(id, "flagship"), id == ship_id);
        }
        self.commit_or_conflict(batch, squadron_id).await?;
        log::info!("ship {} is flagship of squadron {}", ship_id, squadron_id);
        Ok(())
    }

    /// Move a ship into a squadron, taking it out of any previous one. A new
    /// ship becomes ready on joining.
    pub async fn join_squadron(&self, ship_id: &str, squadron_id: &str) -> anyhow::Result<()> {
        let ship: Ship = records::load(&*self.store, ship_id).await?;
        if ship.squadron.as_deref() == Some(squadron_id) {
            return Ok(());
        }
        if ship.battle_id.is_some() {
            return Err(BattleError::InvalidTransition(format!(
                "ship {} is deployed in a battle",
                ship_id
            ))
            .into());
        }
        let squadron: Squadron = records::load(&*self.store, squadron_id).await?;
        let mut batch = Batch::new();
        if let Some(old) = ship.squadron.as_deref() {
            batch = self.detach(batch, ship_id, old).await?;
        } else {
            batch = batch.guard_absent(Ship::field_of(ship_id, "squadron"));
        }
        let mut ships = squadron.ships.clone();
        ships.push(ship_id.to_string());
        batch = batch
            .guard_eq(Squadron::field_of(squadron_id, "ships"), encode(&squadron.ships)?)
            .set(Squadron::field_of(squadron_id, "ships"), encode(&ships)?)
            .set(Ship::field_of(ship_id, "squadron"), squadron_id)
            .set(Ship::field_of(ship_id, "flagship"), false);
        if ship.state == ShipState::New {
            batch.push_set(Ship::field_of(ship_id, "state"), encode(&ShipState::Ready)?);
        }
        self.commit_or_conflict(batch, squadron_id).await
    }

    pub async fn leave_squadron(&self, ship_id: &str) -> anyhow::Result<()> {
        let ship: Ship = records::load(&*self.store, ship_id).await?;
        let Some(squadron_id) = ship.squadron.as_deref() else {
            return Ok(());
        };
        if ship.battle_id.is_some() {
            return Err(BattleError::InvalidTransition(format!(
                "ship {} is deployed in a battle",
                ship_id
            ))
            .into());
        }
        let batch = self.detach(Batch::new(), ship_id, squadron_id).await?;
        self.commit_or_conflict(batch, squadron_id).await
    }

    async fn detach(&self, batch: Batch, ship_id: &str, squadron_id: &str) -> anyhow::Result<Batch> {
        let squadron: Squadron = records::load(&*self.store, squadron_id).await?;
        let ships: Vec<&String> = squadron.ships.iter().filter(|s| *s != ship_id).collect();
        Ok(batch
            .guard_eq(Ship::field_of(ship_id, "squadron"), squadron_id)
            .guard_eq(Squadron::field_of(squadron_id, "ships"), encode(&squadron.ships)?)
            .set(Squadron::field_of(squadron_id, "ships"), encode(&ships)?)
            .remove(Ship::field_of(ship_id, "squadron"))
            .remove(Ship::field_of(ship_id, "flagship")))
    }

    /// Crippled ships only.
    pub async fn repair(&self, ship_id: &str) -> anyhow::Result<()> {
        self.transition(ship_id, ShipState::Ready, |s| s == ShipState::Crippled)
            .await
    }

    pub async fn retire(&self, ship_id: &str) -> anyhow::Result<()> {
        self.transition(ship_id, ShipState::Retired, |s| {
            !matches!(s, ShipState::Sunk | ShipState::Retired)
        })
        .await
    }

    async fn transition(
        &self,
        ship_id: &str,
        to: ShipState,
        allowed: impl Fn(ShipState) -> bool + Send,
    ) -> anyhow::Result<()> {
        let ship: Ship = records::load(&*self.store, ship_id).await?;
        if !allowed(ship.state) {
            return Err(BattleError::InvalidTransition(format!(
                "ship {} cannot go from {} to {}",
                ship_id, ship.state, to
            ))
            .into());
        }
        let state_path = Ship::field_of(ship_id, "state");
        let batch = Batch::new()
            .guard_eq(state_path.clone(), encode(&ship.state)?)
            .set(state_path, encode(&to)?);
        self.commit_or_conflict(batch, ship_id).await?;
        log::info!("ship {} is now {}", ship_id, to);
        Ok(())
    }

    /// Only a new ship outside any squadron can be scrapped.
    pub async fn delete_ship(&self, ship_id: &str) -> anyhow::Result<()> {
        let ship: Ship = records::load(&*self.store, ship_id).await?;
        if ship.state != ShipState::New || ship.squadron.is_some() {
            return Err(BattleError::InvalidTransition(format!(
                "ship {} is {} and cannot be deleted",
                ship_id, ship.state
            ))
            .into());
        }
        let batch = Batch::new()
            .guard_eq(Ship::field_of(ship_id, "state"), encode(&ShipState::New)?)
            .guard_absent(Ship::field_of(ship_id, "squadron"))
            .remove(Ship::path_of(ship_id));
        self.commit_or_conflict(batch, ship_id).await
    }

    /// Record a ship's orders for the battle's current turn.
    pub async fn submit_orders(&self, ship_id: &str, orders: Orders) -> anyhow::Result<()> {
        let ship: Ship = records::load(&*self.store, ship_id).await?;
        let battle_id = ship
            .battle_id
            .clone()
            .ok_or_else(|| BattleError::InvalidOrder(format!("ship {} is not in a battle", ship_id)))?;
        let battle: Battle = records::load(&*self.store, &battle_id).await?;
        if battle.awaiting != Awaiting::Orders {
            return Err(BattleError::WrongPhase {
                expected: Awaiting::Orders,
                actual: battle.awaiting,
            }
            .into());
        }
        ship.validate_orders(&orders)?;
        let batch = Batch::new()
            .guard_eq(Battle::field_of(&battle_id, "awaiting"), Awaiting::Orders.as_str())
            .guard_eq(Battle::field_of(&battle_id, "turn"), battle.turn)
            .guard_eq(Ship::field_of(ship_id, "battleId"), battle_id.as_str())
            .set(Ship::field_of(ship_id, "orders"), encode(&orders)?);
        if !self.store.commit(batch).await? {
            let current: Battle = records::load(&*self.store, &battle_id).await?;
            if current.awaiting != Awaiting::Orders {
                return Err(BattleError::WrongPhase {
                    expected: Awaiting::Orders,
                    actual: current.awaiting,
                }
                .into());
            }
            return Err(BattleError::StaleTurn {
                expected: battle.turn,
                actual: current.turn,
            }
            .into());
        }
        log::debug!("orders for ship {} on turn {}", ship_id, battle.turn);
        Ok(())
    }

    async fn commit_or_conflict(&self, batch: Batch, id: &str) -> anyhow::Result<()> {
        if self.store.commit(batch).await? {
            Ok(())
        } else {
            Err(anyhow::anyhow!("concurrent change to {}, nothing written", id))
        }
    }
}
