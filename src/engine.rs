#![cfg(feature = "std")]
//! Turn processing against the document store.
//!
//! One logical writer per battle: requests for the same battle are
//! serialized locally, and the commit is guarded on the stored turn and phase
//! so a second process replaying the same turn changes nothing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use rand::Rng;
use serde_json::{Map, Value};

use crate::core::{
    is_decided, Awaiting, Battle, BattleError, Catalogue, CombatResolver, NoCombat, Rules, Ship,
    TurnOutcome, TurnResolver, TurnSnapshot, Wind, WindShift,
};
use crate::store::records::{self, encode, Record, CRUMBS};
use crate::store::{join, Batch, DocumentStore};

/// What a committed turn did.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnReport {
    pub battle_id: String,
    /// Turn number after the advance.
    pub turn: u32,
    pub wind: Wind,
    pub wind_shift: Option<WindShift>,
    /// Ships that changed position.
    pub moved: Vec<String>,
    pub sunk: Vec<String>,
    pub log_entries: usize,
    pub awaiting: Awaiting,
}

pub struct TurnEngine<C: CombatResolver = NoCombat> {
    store: Arc<dyn DocumentStore>,
    catalogue: Arc<Catalogue>,
    rules: Rules,
    combat: C,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl TurnEngine<NoCombat> {
    pub fn new(store: Arc<dyn DocumentStore>, catalogue: Arc<Catalogue>, rules: Rules) -> Self {
        Self::with_combat(store, catalogue, rules, NoCombat)
    }
}

impl<C: CombatResolver + Send + Sync> TurnEngine<C> {
    pub fn with_combat(
        store: Arc<dyn DocumentStore>,
        catalogue: Arc<Catalogue>,
        rules: Rules,
        combat: C,
    ) -> Self {
        Self {
            store,
            catalogue,
            rules,
            combat,
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn battle_lock(&self, battle_id: &str) -> anyhow::Result<Arc<tokio::sync::Mutex<()>>> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| anyhow!("turn lock table poisoned"))?;
        Ok(locks
            .entry(battle_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone())
    }

    /// Drop the battle's lock once no other request holds or awaits it.
    fn release_lock(&self, battle_id: &str, lock: Arc<tokio::sync::Mutex<()>>) {
        let Ok(mut locks) = self.locks.lock() else {
            return;
        };
        // one reference in the table, one here
        if Arc::strong_count(&lock) == 2 {
            locks.remove(battle_id);
        }
    }

    /// Battles with a turn request in progress.
    pub fn active_battles(&self) -> usize {
        self.locks.lock().map(|locks| locks.len()).unwrap_or(0)
    }

    /// Advance `battle_id` from `expected_turn` to the next turn. Rejected
    /// with no effect unless the battle is awaiting orders at exactly that
    /// turn.
    pub async fn advance_turn<R: Rng + Send>(
        &self,
        battle_id: &str,
        expected_turn: u32,
        rng: &mut R,
    ) -> anyhow::Result<TurnReport> {
        let lock = self.battle_lock(battle_id)?;
        let result = {
            let _guard = lock.lock().await;
            self.advance_locked(battle_id, expected_turn, rng).await
        };
        self.release_lock(battle_id, lock);
        result
    }

    async fn advance_locked<R: Rng + Send>(
        &self,
        battle_id: &str,
        expected_turn: u32,
        rng: &mut R,
    ) -> anyhow::Result<TurnReport> {
        let battle: Battle = records::load(&*self.store, battle_id).await?;
        check_turn(&battle, expected_turn)?;

        let ships = records::ships_in_battle(&*self.store, battle_id).await?;
        let snapshot = TurnSnapshot {
            battle_id: battle_id.to_string(),
            turn: battle.turn,
            wind: battle.wind,
            site: battle.site,
            ships,
        };
        log::debug!(
            "battle {} turn {}: resolving {} ships",
            battle_id,
            battle.turn,
            snapshot.ships.len()
        );

        let resolver = TurnResolver::with_combat(&self.catalogue, &self.rules, &self.combat);
        let outcome = resolver.resolve(&snapshot, rng)?;

        let decided = is_decided(&battle, &outcome.ships);
        let awaiting = if decided {
            Awaiting::Complete
        } else {
            Awaiting::Orders
        };
        let batch = self.turn_batch(&battle, &snapshot, &outcome, awaiting)?;
        if !self.store.commit(batch).await? {
            return Err(self.rejection(battle_id, expected_turn).await);
        }

        let moved = moved_ships(&snapshot.ships, &outcome.ships);
        log::info!(
            "battle {} turn {} -> {}: {} moved, {} sunk, wind {}",
            battle_id,
            snapshot.turn,
            outcome.turn,
            moved.len(),
            outcome.sunk.len(),
            outcome.wind.describe()
        );
        if decided {
            log::info!("battle {} complete", battle_id);
        }
        Ok(TurnReport {
            battle_id: battle_id.to_string(),
            turn: outcome.turn,
            wind: outcome.wind,
            wind_shift: outcome.wind_shift,
            moved,
            sunk: outcome.sunk,
            log_entries: outcome.log.len(),
            awaiting,
        })
    }

    /// All writes for one turn, guarded on the turn counter and phase.
    fn turn_batch(
        &self,
        battle: &Battle,
        snapshot: &TurnSnapshot,
        outcome: &TurnOutcome,
        awaiting: Awaiting,
    ) -> anyhow::Result<Batch> {
        let id = battle.id.as_str();
        let mut batch = Batch::new()
            .guard_eq(Battle::field_of(id, "turn"), snapshot.turn)
            .guard_eq(Battle::field_of(id, "awaiting"), Awaiting::Orders.as_str());

        let mut fields = Map::new();
        fields.insert("turn".into(), Value::from(outcome.turn));
        fields.insert("wind".into(), encode(&outcome.wind)?);
        fields.insert("awaiting".into(), Value::from(awaiting.as_str()));
        for entry in &outcome.log {
            fields.insert(join("log", &self.store.new_key()), encode(entry)?);
        }
        batch = batch.update(Battle::path_of(id), fields);

        for ship in &outcome.ships {
            batch = batch
                .guard_eq(Ship::field_of(&ship.id, "battleId"), id)
                .update(Ship::path_of(&ship.id), ship_fields(ship)?);
        }
        for (ship_id, crumb) in &outcome.crumbs {
            let path = join(&join(CRUMBS, id), &join(ship_id, &self.store.new_key()));
            batch.push_set(path, encode(crumb)?);
        }
        Ok(batch)
    }

    async fn rejection(&self, battle_id: &str, expected_turn: u32) -> anyhow::Error {
        match records::load::<Battle>(&*self.store, battle_id).await {
            Ok(battle) => match check_turn(&battle, expected_turn) {
                Err(e) => e.into(),
                Ok(()) => anyhow!("battle {} changed during turn {}", battle_id, expected_turn),
            },
            Err(e) => e,
        }
    }
}

fn check_turn(battle: &Battle, expected_turn: u32) -> Result<(), BattleError> {
    if battle.awaiting != Awaiting::Orders {
        return Err(BattleError::WrongPhase {
            expected: Awaiting::Orders,
            actual: battle.awaiting,
        });
    }
    if battle.turn != expected_turn {
        return Err(BattleError::StaleTurn {
            expected: expected_turn,
            actual: battle.turn,
        });
    }
    Ok(())
}

/// Per-field merge of a ship's turn result. Orders are cleared.
fn ship_fields(ship: &Ship) -> anyhow::Result<Map<String, Value>> {
    let mut fields = Map::new();
    fields.insert("state".into(), encode(&ship.state)?);
    fields.insert("health".into(), encode(&ship.health)?);
    fields.insert("propulsion".into(), encode(&ship.propulsion)?);
    fields.insert("heading".into(), Value::from(ship.heading));
    fields.insert("location".into(), encode(&ship.location)?);
    fields.insert("delayCountdown".into(), Value::from(ship.delay_countdown));
    fields.insert("orders".into(), Value::Null);
    Ok(fields)
}

fn moved_ships(before: &[Ship], after: &[Ship]) -> Vec<String> {
    after
        .iter()
        .filter(|ship| {
            before
                .iter()
                .find(|b| b.id == ship.id)
                .is_some_and(|b| b.location != ship.location)
        })
        .map(|ship| ship.id.clone())
        .collect()
}
