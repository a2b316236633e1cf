use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::{collections::HashSet, io, sync::Arc};
use thiserror::Error;
use tracing::{debug, warn};

mod storage;
pub use storage::*;

use crate::{feed::RawDeparture, feed::distinct_ids, settings::UserPreferences, stops::StopGroup};

pub const STOPS_KEY: &str = "stops";
pub const DEPARTURES_KEY: &str = "departures";
pub const SETTINGS_KEY: &str = "settings";

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A blob stamped with the moment it was written.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Cached<T> {
    pub saved_at: DateTime<Utc>,
    pub data: T,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct DepartureSnapshot {
    pub stop_ids: Vec<String>,
    pub minutes_after: u32,
    pub departures: Vec<RawDeparture>,
}

/// Last known good data, kept for when the network is gone.
#[derive(Clone)]
pub struct OfflineStore {
    storage: Arc<dyn Storage>,
}

impl OfflineStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    pub fn save_departures(
        &self,
        stop_ids: &[String],
        minutes_after: u32,
        departures: &[RawDeparture],
    ) -> Result<(), Error> {
        let snapshot = DepartureSnapshot {
            stop_ids: distinct_ids(stop_ids),
            minutes_after,
            departures: departures.to_vec(),
        };
        self.save(DEPARTURES_KEY, &snapshot)
    }

    pub fn load_departures(&self) -> Option<Cached<DepartureSnapshot>> {
        self.load(DEPARTURES_KEY)
    }

    pub fn save_preferences(&self, preferences: &UserPreferences) -> Result<(), Error> {
        self.save(SETTINGS_KEY, preferences)
    }

    pub fn load_preferences(&self) -> Option<Cached<UserPreferences>> {
        self.load(SETTINGS_KEY)
    }

    pub fn clear_preferences(&self) -> Result<(), Error> {
        Ok(self.storage.remove(SETTINGS_KEY)?)
    }

    pub fn save_stop_index(&self, groups: &[StopGroup]) -> Result<(), Error> {
        self.save(STOPS_KEY, &groups)
    }

    pub fn load_stop_index(&self) -> Option<Cached<Vec<StopGroup>>> {
        self.load(STOPS_KEY)
    }

    fn save<T: Serialize>(&self, key: &str, data: &T) -> Result<(), Error> {
        let blob = Cached {
            saved_at: Utc::now(),
            data,
        };
        let bytes = serde_json::to_vec(&blob)?;
        self.storage.write(key, &bytes)?;
        debug!("Saved {key} ({} bytes)", bytes.len());
        Ok(())
    }

    /// Absent and unreadable blobs both come back as `None`.
    fn load<T: DeserializeOwned>(&self, key: &str) -> Option<Cached<T>> {
        let bytes = match self.storage.read(key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(err) => {
                warn!("Failed to read cached {key}: {err}");
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(blob) => Some(blob),
            Err(err) => {
                warn!("Ignoring corrupt cached {key}: {err}");
                None
            }
        }
    }
}

/// Cached departures may stand in for a request only when they cover every
/// requested stop. Ids compare ignoring case.
pub fn is_compatible(cached: &[String], requested: &[String]) -> bool {
    let cached: HashSet<String> = cached
        .iter()
        .filter(|id| !id.trim().is_empty())
        .map(|id| id.trim().to_lowercase())
        .collect();
    let requested: HashSet<String> = requested
        .iter()
        .filter(|id| !id.trim().is_empty())
        .map(|id| id.trim().to_lowercase())
        .collect();
    if cached.is_empty() || requested.is_empty() {
        return false;
    }
    cached.is_superset(&requested)
}
