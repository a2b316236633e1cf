use chrono::{DateTime, TimeDelta, Utc};
use futures_util::{
    FutureExt,
    future::{BoxFuture, Shared},
};
use std::{
    sync::{Arc, Mutex, PoisonError, RwLock},
    time::Instant,
};
use thiserror::Error;
use tracing::{debug, error, info, warn};

mod group;
pub use group::*;

use crate::{
    cache::OfflineStore,
    config::Config,
    gtfs::{self, Gtfs},
    http::{self, Request, Transport},
    shared,
};

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Gtfs(#[from] gtfs::Error),
    #[error(transparent)]
    Transport(#[from] http::Error),
    #[error("Stop dataset download returned {status}")]
    Download { status: u16 },
    #[error("Stop dataset contains no boardable stops")]
    Empty,
    #[error("Stop index load was interrupted: {0}")]
    Interrupted(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOrigin {
    Live,
    Cache,
}

#[derive(Clone)]
struct Loaded {
    groups: Arc<[StopGroup]>,
    origin: IndexOrigin,
    /// When the data was produced, for cache hydrated indexes the snapshot time.
    loaded_at: DateTime<Utc>,
    /// Last successful load or failed reload, drives staleness.
    checked_at: DateTime<Utc>,
}

type LoadFuture = Shared<BoxFuture<'static, Result<(), Arc<Error>>>>;

struct Inner {
    transport: Arc<dyn Transport>,
    store: OfflineStore,
    gtfs_url: String,
    refresh_after: TimeDelta,
    cache_max_age: TimeDelta,
    loaded: RwLock<Option<Loaded>>,
    in_flight: Mutex<Option<LoadFuture>>,
}

/// Searchable directory of stop groups built from the bulk GTFS feed.
/// Cheap to clone, clones share the same index.
#[derive(Clone)]
pub struct StopIndex {
    inner: Arc<Inner>,
}

impl StopIndex {
    pub fn new(transport: Arc<dyn Transport>, store: OfflineStore, config: &Config) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                store,
                gtfs_url: config.gtfs_url.clone(),
                refresh_after: config.stop_index_refresh,
                cache_max_age: config.stop_cache_max_age,
                loaded: RwLock::new(None),
                in_flight: Mutex::new(None),
            }),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.current().is_some()
    }

    pub fn origin(&self) -> Option<IndexOrigin> {
        self.current().map(|loaded| loaded.origin)
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.current().map(|loaded| loaded.loaded_at)
    }

    pub fn len(&self) -> usize {
        self.current().map(|loaded| loaded.groups.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Loads now, or joins the load already running.
    pub async fn load(&self) -> Result<(), Arc<Error>> {
        self.start_load().await
    }

    /// Waits for a first index. A cached snapshot is served at once, and a
    /// stale index is served as is while a background reload replaces it.
    pub async fn ensure_loaded(&self) -> Result<(), Arc<Error>> {
        match self.current() {
            Some(loaded) => {
                if Utc::now() - loaded.checked_at > self.inner.refresh_after {
                    debug!("Stop index is stale, reloading in background");
                    self.reload_in_background();
                }
                Ok(())
            }
            None => match self.hydrate() {
                Some(true) => Ok(()),
                Some(false) => {
                    debug!("Cached stop index is stale, reloading in background");
                    self.reload_in_background();
                    Ok(())
                }
                None => self.start_load().await,
            },
        }
    }

    /// Accent and case insensitive search on names, plain substring on ids.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<StopGroup>, Arc<Error>> {
        self.ensure_loaded().await?;
        let Some(loaded) = self.current() else {
            return Ok(Vec::new());
        };
        Ok(shared::search(query, &loaded.groups)
            .into_iter()
            .take(limit)
            .cloned()
            .collect())
    }

    /// The group owning `stop_id`, if any.
    pub async fn find(&self, stop_id: &str) -> Result<Option<StopGroup>, Arc<Error>> {
        self.ensure_loaded().await?;
        Ok(self.current().and_then(|loaded| {
            loaded
                .groups
                .iter()
                .find(|group| group.contains_id(stop_id.trim()))
                .cloned()
        }))
    }

    fn current(&self) -> Option<Loaded> {
        self.inner
            .loaded
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn install(&self, groups: Vec<StopGroup>, loaded_at: DateTime<Utc>, origin: IndexOrigin) {
        let loaded = Loaded {
            groups: groups.into(),
            origin,
            loaded_at,
            checked_at: loaded_at,
        };
        *self
            .inner
            .loaded
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(loaded);
    }

    fn mark_checked(&self) {
        if let Some(loaded) = self
            .inner
            .loaded
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .as_mut()
        {
            loaded.checked_at = Utc::now();
        }
    }

    /// The load runs on its own task, callers that give up waiting do not cancel it.
    fn start_load(&self) -> LoadFuture {
        let mut slot = self
            .inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(load) = slot.as_ref()
            && load.peek().is_none()
        {
            return load.clone();
        }

        let this = self.clone();
        let handle = tokio::spawn(async move { this.run_load().await });
        let load = async move {
            match handle.await {
                Ok(result) => result.map_err(Arc::new),
                Err(err) => Err(Arc::new(Error::Interrupted(err.to_string()))),
            }
        }
        .boxed()
        .shared();
        *slot = Some(load.clone());
        load
    }

    fn reload_in_background(&self) {
        let load = self.start_load();
        tokio::spawn(async move {
            let _ = load.await;
        });
    }

    /// Installs the cached snapshot. Returns whether it was fresh, or `None`
    /// when there was nothing usable.
    fn hydrate(&self) -> Option<bool> {
        let cached = self.inner.store.load_stop_index()?;
        if cached.data.is_empty() {
            return None;
        }
        let fresh = Utc::now() - cached.saved_at <= self.inner.cache_max_age;
        info!(
            "Restored {} stop groups from cache saved at {}",
            cached.data.len(),
            cached.saved_at
        );
        self.install(cached.data, cached.saved_at, IndexOrigin::Cache);
        Some(fresh)
    }

    async fn run_load(&self) -> Result<(), Error> {
        if self.current().is_none() && self.hydrate() == Some(true) {
            return Ok(());
        }

        match self.fetch_live().await {
            Ok(groups) => {
                if let Err(err) = self.inner.store.save_stop_index(&groups) {
                    warn!("Failed to cache stop index: {err}");
                }
                info!("Loaded {} stop groups", groups.len());
                self.install(groups, Utc::now(), IndexOrigin::Live);
                Ok(())
            }
            Err(err) => match self.origin() {
                Some(origin) => {
                    warn!("Stop index reload failed, keeping {origin:?} index: {err}");
                    self.mark_checked();
                    Ok(())
                }
                None => {
                    error!("Stop index load failed: {err}");
                    Err(err)
                }
            },
        }
    }

    async fn fetch_live(&self) -> Result<Vec<StopGroup>, Error> {
        debug!("Downloading stop dataset from {}", self.inner.gtfs_url);
        let now = Instant::now();
        let response = self
            .inner
            .transport
            .get(Request::get(&self.inner.gtfs_url))
            .await?;
        if !response.is_success() {
            return Err(Error::Download {
                status: response.status,
            });
        }
        debug!("Downloading stop dataset took {:?}", now.elapsed());

        let now = Instant::now();
        let groups = tokio::task::spawn_blocking(move || build_groups(response.body))
            .await
            .map_err(|err| Error::Interrupted(err.to_string()))??;
        debug!("Building stop groups took {:?}", now.elapsed());
        if groups.is_empty() {
            return Err(Error::Empty);
        }
        Ok(groups)
    }
}

/// Parses a GTFS archive into stop groups.
/// Depending on the size of the archive this can be a long blocking function.
pub fn build_groups(archive: Vec<u8>) -> Result<Vec<StopGroup>, gtfs::Error> {
    groups_from(&Gtfs::new(gtfs::Config::default()).from_bytes(archive))
}

/// Stop groups of any GTFS source, e.g. an archive on disk opened with `Gtfs::from_zip`.
pub fn groups_from(gtfs: &Gtfs) -> Result<Vec<StopGroup>, gtfs::Error> {
    let mut builder = StopGroupBuilder::new();
    gtfs.stream_stops(|(_, stop)| builder.push(stop))?;
    debug!("Skipped {} station rows", builder.stations_skipped());
    Ok(builder.build())
}
