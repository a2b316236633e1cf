use chrono::Local;
use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

mod gate;
mod notify;
mod scheduler;
mod search;
mod state;

pub use gate::*;
pub use notify::*;
pub use scheduler::*;
pub use search::*;
pub use state::*;

use crate::{
    alerts::{AlertEvaluator, AlertThresholds},
    cache::{self, FileStorage, OfflineStore},
    config::Config,
    feed::{TransitFeedClient, VehicleInfos},
    http::{self, ReqwestTransport, Transport},
    stops::{self, StopGroup, StopIndex},
};

const UPDATES_CAPACITY: usize = 64;

struct Inner {
    feed: TransitFeedClient,
    stops: StopIndex,
    store: OfflineStore,
    notifier: Arc<dyn Notifier>,
    search: StopSearch,
    departure_limit: u32,
    state: Mutex<BoardState>,
    alerts: Mutex<AlertEvaluator>,
    gate: RefreshGate,
    updates: broadcast::Sender<Changes>,
}

/// A live departure board for the selected stops.
/// Cheap to clone, clones drive the same board.
#[derive(Clone)]
pub struct Board {
    inner: Arc<Inner>,
}

impl Board {
    pub fn new(
        feed: TransitFeedClient,
        stops: StopIndex,
        store: OfflineStore,
        notifier: Arc<dyn Notifier>,
        config: &Config,
    ) -> Self {
        let (updates, _) = broadcast::channel(UPDATES_CAPACITY);
        let search = StopSearch::new(stops.clone(), config.search_limit, config.min_query_len);
        let state = BoardState {
            api_key: config.api_key.clone(),
            ..Default::default()
        };
        Self {
            inner: Arc::new(Inner {
                feed,
                stops,
                store,
                notifier,
                search,
                departure_limit: config.departure_limit,
                state: Mutex::new(state),
                alerts: Mutex::new(AlertEvaluator::new()),
                gate: RefreshGate::new(),
                updates,
            }),
        }
    }

    /// Wires a board to the network, the per-user cache directory and the
    /// log notifier.
    pub fn from_config(config: &Config) -> Result<Self, http::Error> {
        let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(config.request_timeout)?);
        let storage = match &config.cache_dir {
            Some(dir) => FileStorage::new(dir),
            None => FileStorage::in_user_data_dir(),
        };
        let store = OfflineStore::new(Arc::new(storage));
        let feed = TransitFeedClient::new(transport.clone(), config);
        let stops = StopIndex::new(transport, store.clone(), config);
        Ok(Self::new(feed, stops, store, Arc::new(LogNotifier), config))
    }

    pub fn stops(&self) -> &StopIndex {
        &self.inner.stops
    }

    pub fn snapshot(&self) -> BoardState {
        self.state().clone()
    }

    /// Receives the changes of every applied update.
    pub fn subscribe(&self) -> broadcast::Receiver<Changes> {
        self.inner.updates.subscribe()
    }

    pub fn refresh_interval(&self) -> Duration {
        scheduler::interval(self.state().preferences.refresh_seconds)
    }

    pub fn is_refreshing(&self) -> bool {
        self.inner.gate.is_running()
    }

    /// Loads the stored preferences, if any, and refreshes with them.
    pub async fn restore_preferences(&self) -> Changes {
        match self.inner.store.load_preferences() {
            Some(cached) => {
                info!(
                    "Restoring preferences saved at {}",
                    cached.saved_at.to_rfc3339()
                );
                self.dispatch(Action::Restore(cached.data)).await
            }
            None => Changes::default(),
        }
    }

    /// Applies `action`. Stored preferences are updated and a refresh is run
    /// when the update asks for it.
    pub async fn dispatch(&self, action: Action) -> Changes {
        let changes = self.apply(action);
        if changes.refresh {
            self.refresh().await;
        }
        changes
    }

    /// Resolves a stop id through the index and adds its group.
    pub async fn add_stop(&self, stop_id: &str) -> Result<Option<StopGroup>, Arc<stops::Error>> {
        let Some(group) = self.inner.stops.find(stop_id).await? else {
            return Ok(None);
        };
        self.dispatch(Action::AddStop(group.clone())).await;
        Ok(Some(group))
    }

    pub async fn search(&self, query: &str) -> SearchOutcome {
        self.inner.search.search(query).await
    }

    /// Runs a refresh cycle, or queues one follow-up when a cycle is running.
    /// Returns once the board holds the result of the cycles it ran.
    pub async fn refresh(&self) {
        if !self.inner.gate.try_begin() {
            debug!("Refresh already running, queued a follow-up");
            return;
        }
        let board = self.clone();
        let cycles = tokio::spawn(async move {
            loop {
                board.run_cycle().await;
                if !board.inner.gate.finish() {
                    break;
                }
                debug!("Running queued refresh");
            }
        });
        if let Err(err) = cycles.await {
            error!("Refresh cycle failed: {err}");
            self.inner.gate.reset();
        }
    }

    async fn run_cycle(&self) {
        let (stop_ids, minutes_after, api_key) = {
            let state = self.state();
            (
                state.stop_ids(),
                state.preferences.minutes_after,
                state.api_key.clone(),
            )
        };
        if stop_ids.is_empty() {
            self.apply(Action::NoStops);
            return;
        }

        self.apply(Action::Loading);
        let now = Instant::now();
        let result = self
            .inner
            .feed
            .departures(
                &stop_ids,
                api_key.as_deref(),
                minutes_after,
                self.inner.departure_limit,
            )
            .await;

        match result {
            Ok(departures) => {
                debug!("Loading departures took {:?}", now.elapsed());
                if let Err(err) = self
                    .inner
                    .store
                    .save_departures(&stop_ids, minutes_after, &departures)
                {
                    warn!("Failed to cache departures: {err}");
                }

                let trip_ids: Vec<String> = departures
                    .iter()
                    .filter_map(|departure| departure.trip_id())
                    .map(str::to_string)
                    .collect();
                let vehicles = match self
                    .inner
                    .feed
                    .vehicle_info(&trip_ids, api_key.as_deref())
                    .await
                {
                    Ok(vehicles) => vehicles,
                    Err(err) => {
                        warn!("Vehicle info unavailable: {err}");
                        VehicleInfos::new()
                    }
                };

                self.apply(Action::Projected {
                    departures,
                    vehicles,
                    now: Local::now(),
                    source: Source::Live,
                });
            }
            Err(err) => {
                warn!("Failed to load departures: {err}");
                match self.inner.store.load_departures() {
                    Some(cached) if cache::is_compatible(&cached.data.stop_ids, &stop_ids) => {
                        info!(
                            "Serving {} cached departures from {}",
                            cached.data.departures.len(),
                            cached.saved_at.to_rfc3339()
                        );
                        self.apply(Action::Projected {
                            departures: cached.data.departures,
                            vehicles: VehicleInfos::new(),
                            now: Local::now(),
                            source: Source::Cache {
                                saved_at: cached.saved_at,
                                minutes_after: cached.data.minutes_after,
                            },
                        });
                    }
                    _ => {
                        self.apply(Action::Failed(err.to_string()));
                        return;
                    }
                }
            }
        }

        self.check_alerts();
    }

    /// Fires alerts for the rows on the board. Disabled alerts forget
    /// everything fired so far.
    fn check_alerts(&self) {
        let (rows, settings) = {
            let state = self.state();
            (state.rows.clone(), state.preferences.alerts)
        };
        let mut alerts = self.inner.alerts.lock().unwrap_or_else(PoisonError::into_inner);
        if !settings.enabled {
            alerts.clear();
            return;
        }
        let events = alerts.evaluate(&rows, AlertThresholds::from(settings), &Local::now());
        drop(alerts);

        for event in events.iter() {
            if let Err(err) = self.inner.notifier.notify(event) {
                warn!("{err}");
            }
        }
    }

    /// Runs the reducer and the side effects it asks for, except refreshing.
    fn apply(&self, action: Action) -> Changes {
        let (changes, preferences) = {
            let mut state = self.state();
            let changes = state.update(action);
            (changes, state.preferences.clone())
        };

        match changes.persist {
            Persist::Nothing => {}
            Persist::Save => {
                if let Err(err) = self.inner.store.save_preferences(&preferences) {
                    warn!("Failed to save preferences: {err}");
                }
            }
            Persist::Clear => {
                if let Err(err) = self.inner.store.clear_preferences() {
                    warn!("Failed to clear preferences: {err}");
                }
            }
        }
        if changes.contains(Field::Alerts) && !preferences.alerts.enabled {
            self.inner
                .alerts
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clear();
        }
        if !changes.is_empty() {
            let _ = self.inner.updates.send(changes.clone());
        }
        changes
    }

    fn state(&self) -> MutexGuard<'_, BoardState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
