#![cfg(feature = "std")]
//! Land/sea checks for ship placement.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use serde_json::Value;

use crate::core::{LatLng, Rules};
use crate::store::records::LOCATIONS;
use crate::store::DocumentStore;

#[async_trait::async_trait]
pub trait LandSeaOracle: Send + Sync {
    async fn is_water(&self, point: LatLng) -> anyhow::Result<bool>;
}

/// Terrain height lookup, in metres, for points the cache has not seen.
#[async_trait::async_trait]
pub trait ElevationSource: Send + Sync {
    async fn elevation(&self, point: LatLng) -> anyhow::Result<f64>;
}

/// Grid cell a point falls in: coordinates truncated at a fixed precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridKey {
    pub lat: i64,
    pub lng: i64,
}

impl GridKey {
    pub fn of(point: LatLng, precision: f64) -> Self {
        Self {
            lat: (point.lat * precision).trunc() as i64,
            lng: (point.lng * precision).trunc() as i64,
        }
    }

    pub fn store_path(&self) -> String {
        format!("{}/{}/{}/elev", LOCATIONS, self.lat, self.lng)
    }
}

/// Oracle over an elevation source. Answers are memoized per grid cell and
/// elevations are written to the store so other processes reuse them.
pub struct ElevationOracle {
    source: Arc<dyn ElevationSource>,
    store: Arc<dyn DocumentStore>,
    rules: Rules,
    memo: Mutex<HashMap<GridKey, bool>>,
}

impl ElevationOracle {
    pub fn new(source: Arc<dyn ElevationSource>, store: Arc<dyn DocumentStore>, rules: Rules) -> Self {
        Self {
            source,
            store,
            rules,
            memo: Mutex::new(HashMap::new()),
        }
    }

    fn remembered(&self, key: GridKey) -> anyhow::Result<Option<bool>> {
        let memo = self.memo.lock().map_err(|_| anyhow!("oracle memo lock poisoned"))?;
        Ok(memo.get(&key).copied())
    }

    fn remember(&self, key: GridKey, water: bool) -> anyhow::Result<()> {
        let mut memo = self.memo.lock().map_err(|_| anyhow!("oracle memo lock poisoned"))?;
        memo.insert(key, water);
        Ok(())
    }
}

#[async_trait::async_trait]
impl LandSeaOracle for ElevationOracle {
    async fn is_water(&self, point: LatLng) -> anyhow::Result<bool> {
        let key = GridKey::of(point, self.rules.grid_precision);
        if let Some(water) = self.remembered(key)? {
            return Ok(water);
        }
        let path = key.store_path();
        let elevation = match self.store.get(&path).await?.as_ref().and_then(Value::as_f64) {
            Some(cached) => cached,
            None => {
                let fetched = self.source.elevation(point).await?;
                self.store.set(&path, Value::from(fetched)).await?;
                log::debug!("elevation {:.1} m cached at {:?}", fetched, key);
                fetched
            }
        };
        let water = elevation <= self.rules.ground_elevation;
        self.remember(key, water)?;
        Ok(water)
    }
}

/// Everywhere is water.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenSea;

#[async_trait::async_trait]
impl LandSeaOracle for OpenSea {
    async fn is_water(&self, _point: LatLng) -> anyhow::Result<bool> {
        Ok(true)
    }
}
