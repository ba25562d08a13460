//! Typed access to the battle collections in a [`DocumentStore`].

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::core::{Battle, BattleError, RecordKind, Ship, Squadron};
use crate::store::{join, DocumentStore};

pub const BATTLES: &str = "battles";
pub const SHIPS: &str = "ships";
pub const SQUADRONS: &str = "squadrons";
pub const CRUMBS: &str = "crumbs";
pub const LOCATIONS: &str = "locations";

/// A record stored under its own key in a top-level collection. The key is
/// not part of the stored value.
pub trait Record: Serialize + DeserializeOwned + Send {
    const COLLECTION: &'static str;
    const KIND: RecordKind;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: &str);

    fn path_of(id: &str) -> String {
        join(Self::COLLECTION, id)
    }

    fn field_of(id: &str, field: &str) -> String {
        join(&Self::path_of(id), field)
    }
}

impl Record for Battle {
    const COLLECTION: &'static str = BATTLES;
    const KIND: RecordKind = RecordKind::Battle;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: &str) {
        self.id = id.into();
    }
}

impl Record for Ship {
    const COLLECTION: &'static str = SHIPS;
    const KIND: RecordKind = RecordKind::Ship;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: &str) {
        self.id = id.into();
    }
}

impl Record for Squadron {
    const COLLECTION: &'static str = SQUADRONS;
    const KIND: RecordKind = RecordKind::Squadron;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: &str) {
        self.id = id.into();
    }
}

fn decode<T: Record>(id: &str, value: Value) -> anyhow::Result<T> {
    let mut record: T = serde_json::from_value(value)
        .map_err(|e| anyhow::anyhow!("malformed {} '{}': {}", T::KIND, id, e))?;
    record.set_id(id);
    Ok(record)
}

pub fn encode<T: Serialize>(record: &T) -> anyhow::Result<Value> {
    Ok(serde_json::to_value(record)?)
}

pub async fn find<T: Record>(store: &dyn DocumentStore, id: &str) -> anyhow::Result<Option<T>> {
    match store.get(&T::path_of(id)).await? {
        Some(value) => Ok(Some(decode(id, value)?)),
        None => Ok(None),
    }
}

/// Load a record, failing with [`BattleError::NotFound`] if it is missing.
pub async fn load<T: Record>(store: &dyn DocumentStore, id: &str) -> anyhow::Result<T> {
    find(store, id)
        .await?
        .ok_or_else(|| BattleError::not_found(T::KIND, id).into())
}

/// Store a new record under a fresh key and give it that id.
pub async fn insert<T: Record>(store: &dyn DocumentStore, record: &mut T) -> anyhow::Result<String> {
    let key = store.new_key();
    store.set(&T::path_of(&key), encode(record)?).await?;
    record.set_id(&key);
    Ok(key)
}

/// Records whose `field` equals `value`.
pub async fn query<T: Record>(
    store: &dyn DocumentStore,
    field: &str,
    value: &Value,
) -> anyhow::Result<Vec<T>> {
    store
        .query(T::COLLECTION, field, value)
        .await?
        .into_iter()
        .map(|(id, v)| decode(&id, v))
        .collect()
}

pub async fn ships_in_battle(store: &dyn DocumentStore, battle_id: &str) -> anyhow::Result<Vec<Ship>> {
    query(store, "battleId", &Value::from(battle_id)).await
}

/// Enrolled squadron records, in key order.
pub async fn squadrons_in_battle(
    store: &dyn DocumentStore,
    battle: &Battle,
) -> anyhow::Result<Vec<Squadron>> {
    let mut squadrons = Vec::with_capacity(battle.squadrons.len());
    for id in battle.squadrons.keys() {
        squadrons.push(load(store, id).await?);
    }
    Ok(squadrons)
}

/// Every ship listed by the given squadrons. Listed ids with no record are
/// skipped.
pub async fn ships_of(store: &dyn DocumentStore, squadrons: &[Squadron]) -> anyhow::Result<Vec<Ship>> {
    let mut ships = Vec::new();
    for squadron in squadrons {
        for id in &squadron.ships {
            match find::<Ship>(store, id).await? {
                Some(ship) => ships.push(ship),
                None => log::warn!("squadron {} lists missing ship {}", squadron.id, id),
            }
        }
    }
    Ok(ships)
}
