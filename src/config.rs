use chrono::TimeDelta;
use std::{env, path::PathBuf, time::Duration};

pub const API_KEY_ENV: &str = "GOLEMIO_API_KEY";
pub const CACHE_DIR_ENV: &str = "PERRON_CACHE_DIR";
pub const PORT_ENV: &str = "PERRON_PORT";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    /// Tried in order, see `TransitFeedClient::departures`.
    pub departure_paths: Vec<String>,
    pub vehicle_positions_path: String,
    pub preferred_timezone: String,
    pub api_key: Option<String>,
    pub departure_limit: u32,
    pub vehicle_limit: u32,
    pub request_timeout: Duration,
    pub gtfs_url: String,
    pub stop_index_refresh: TimeDelta,
    pub stop_cache_max_age: TimeDelta,
    pub search_limit: usize,
    pub min_query_len: usize,
    pub cache_dir: Option<PathBuf>,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.golemio.cz".into(),
            departure_paths: vec![
                "/v2/pid/departureboards".into(),
                "/v2/departureboards".into(),
            ],
            vehicle_positions_path: "/v2/vehiclepositions".into(),
            preferred_timezone: "Europe/Prague".into(),
            api_key: None,
            departure_limit: 60,
            vehicle_limit: 10_000,
            request_timeout: Duration::from_secs(30),
            gtfs_url: "https://data.pid.cz/PID_GTFS.zip".into(),
            stop_index_refresh: TimeDelta::hours(12),
            stop_cache_max_age: TimeDelta::days(7),
            search_limit: 25,
            min_query_len: 2,
            cache_dir: None,
            port: 3000,
        }
    }
}

impl Config {
    /// Defaults overridden by `GOLEMIO_API_KEY`, `PERRON_CACHE_DIR` and `PERRON_PORT`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(key) = env::var(API_KEY_ENV)
            && !key.trim().is_empty()
        {
            config.api_key = Some(key.trim().to_string());
        }
        if let Ok(dir) = env::var(CACHE_DIR_ENV)
            && !dir.trim().is_empty()
        {
            config.cache_dir = Some(PathBuf::from(dir));
        }
        if let Some(port) = env::var(PORT_ENV).ok().and_then(|port| port.parse().ok()) {
            config.port = port;
        }
        config
    }
}
