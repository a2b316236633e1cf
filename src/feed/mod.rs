use reqwest::Url;
use std::{collections::HashSet, sync::Arc};
use thiserror::Error;
use tracing::{debug, warn};

pub mod models;
mod vehicles;
pub use models::*;
pub use vehicles::*;

use crate::{
    config::Config,
    http::{self, Request, Response, Transport},
};

const ACCESS_TOKEN_HEADER: &str = "X-Access-Token";

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error("Upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Transport(#[from] http::Error),
}

impl Error {
    fn upstream(response: Response) -> Self {
        Self::Upstream {
            status: response.status,
            body: response.text(),
        }
    }
}

/// How a deployment expects the stop ids in the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdEncoding {
    /// `ids[]=A&ids[]=B`
    Bracketed,
    /// `ids=A&ids=B`
    Plain,
}

impl IdEncoding {
    pub const ORDER: [IdEncoding; 2] = [IdEncoding::Bracketed, IdEncoding::Plain];

    fn key(&self) -> &'static str {
        match self {
            IdEncoding::Bracketed => "ids[]",
            IdEncoding::Plain => "ids",
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum VehicleQuery {
    Full,
    Reduced,
}

/// Client for the departure board and vehicle position endpoints.
#[derive(Clone)]
pub struct TransitFeedClient {
    transport: Arc<dyn Transport>,
    base_url: String,
    departure_paths: Vec<String>,
    vehicle_positions_path: String,
    preferred_timezone: String,
    vehicle_limit: u32,
    api_key: Option<String>,
}

impl TransitFeedClient {
    pub fn new(transport: Arc<dyn Transport>, config: &Config) -> Self {
        Self {
            transport,
            base_url: config.api_base_url.clone(),
            departure_paths: config.departure_paths.clone(),
            vehicle_positions_path: config.vehicle_positions_path.clone(),
            preferred_timezone: config.preferred_timezone.clone(),
            vehicle_limit: config.vehicle_limit,
            api_key: config.api_key.clone(),
        }
    }

    /// Fetches departures for all given stops in one logical request.
    /// Endpoint paths and id encodings are tried in order, a 404 moves on to
    /// the next candidate and anything else ends the attempt.
    pub async fn departures(
        &self,
        stop_ids: &[String],
        api_key: Option<&str>,
        minutes_after: u32,
        limit: u32,
    ) -> Result<Vec<RawDeparture>, Error> {
        let stop_ids = distinct_ids(stop_ids);
        if stop_ids.is_empty() {
            return Err(Error::Validation("select at least one stop".into()));
        }
        let token = self.token(api_key)?;

        let mut last_not_found: Option<Response> = None;
        for path in self.departure_paths.iter() {
            for encoding in IdEncoding::ORDER {
                let mut url = self.url(path)?;
                {
                    let mut query = url.query_pairs_mut();
                    for id in stop_ids.iter() {
                        query.append_pair(encoding.key(), id);
                    }
                    query
                        .append_pair("minutesAfter", &minutes_after.to_string())
                        .append_pair("limit", &limit.to_string())
                        .append_pair("preferredTimezone", &self.preferred_timezone);
                }

                let response = self.transport.get(authorized(url, &token)).await?;
                if response.is_success() {
                    let board: DepartureBoardResponse = serde_json::from_slice(&response.body)?;
                    let departures: Vec<RawDeparture> = board.into();
                    debug!(
                        "Fetched {} departures from {path} using {}",
                        departures.len(),
                        encoding.key()
                    );
                    return Ok(departures);
                }
                if response.is_not_found() {
                    debug!("{path} with {} not found, trying next", encoding.key());
                    last_not_found = Some(response);
                    continue;
                }
                return Err(Error::upstream(response));
            }
        }

        match last_not_found {
            Some(response) => Err(Error::upstream(response)),
            None => Err(Error::Configuration(
                "no departure endpoint configured".into(),
            )),
        }
    }

    /// Best effort vehicle metadata for the given trips.
    /// Retries once with a smaller query when the deployment rejects the full one.
    pub async fn vehicle_info(
        &self,
        trip_ids: &[String],
        api_key: Option<&str>,
    ) -> Result<VehicleInfos, Error> {
        let trip_ids = distinct_ids(trip_ids);
        if trip_ids.is_empty() {
            return Ok(VehicleInfos::new());
        }
        let token = self.token(api_key)?;

        let request = authorized(self.vehicle_url(VehicleQuery::Full)?, &token);
        let mut response = self.transport.get(request).await?;
        if matches!(response.status, 400 | 422) {
            warn!(
                "Vehicle positions rejected full query ({}), retrying reduced",
                response.status
            );
            let request = authorized(self.vehicle_url(VehicleQuery::Reduced)?, &token);
            response = self.transport.get(request).await?;
        }
        if !response.is_success() {
            return Err(Error::upstream(response));
        }

        let positions: VehiclePositionsResponse = serde_json::from_slice(&response.body)?;
        let infos = VehicleInfos::from_response(positions, &trip_ids);
        debug!("Resolved {} of {} trips to vehicles", infos.len(), trip_ids.len());
        Ok(infos)
    }

    fn token(&self, api_key: Option<&str>) -> Result<String, Error> {
        api_key
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .or(self
                .api_key
                .as_deref()
                .map(str::trim)
                .filter(|key| !key.is_empty()))
            .map(str::to_string)
            .ok_or(Error::Configuration(
                "missing API key, set GOLEMIO_API_KEY or enter one".into(),
            ))
    }

    fn url(&self, path: &str) -> Result<Url, Error> {
        let raw = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        Url::parse(&raw).map_err(|err| Error::Configuration(format!("invalid url {raw}: {err}")))
    }

    fn vehicle_url(&self, shape: VehicleQuery) -> Result<Url, Error> {
        let mut url = self.url(&self.vehicle_positions_path)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("limit", &self.vehicle_limit.to_string());
            if let VehicleQuery::Full = shape {
                query
                    .append_pair("includeNotTracking", "true")
                    .append_pair("includePositions", "false")
                    .append_pair("preferredTimezone", &self.preferred_timezone);
            }
        }
        Ok(url)
    }
}

fn authorized(url: Url, token: &str) -> Request {
    Request::get(url.as_str())
        .header(ACCESS_TOKEN_HEADER, token)
        .header("Accept", "application/json")
}

/// Trimmed, non-blank ids deduplicated ignoring case, first spelling kept.
pub fn distinct_ids(ids: &[String]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    ids.iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .filter(|id| seen.insert(id.to_lowercase()))
        .map(str::to_string)
        .collect()
}
