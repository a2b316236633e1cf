use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Accessibility codes arrive as GTFS numbers (`1` = accessible) from some
/// deployments and as booleans from others.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(untagged)]
pub enum AccessCode {
    Flag(bool),
    Code(i64),
}

impl AccessCode {
    pub fn is_accessible(&self) -> bool {
        matches!(self, AccessCode::Flag(true) | AccessCode::Code(1))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RawDeparture {
    pub route: Option<RouteInfo>,
    pub trip: Option<TripInfo>,
    pub stop: Option<StopInfo>,
    pub departure_timestamp: Option<DepartureTimestamp>,
    pub delay: Option<DelayInfo>,
    pub wheelchair_accessible: Option<AccessCode>,
    pub vehicle: Option<VehicleFlags>,
}

impl RawDeparture {
    pub fn route_type(&self) -> Option<i32> {
        self.route.as_ref()?.route_type
    }

    pub fn short_name(&self) -> Option<&str> {
        self.route.as_ref()?.short_name.as_deref()
    }

    pub fn trip_id(&self) -> Option<&str> {
        self.trip.as_ref()?.id.as_deref()
    }

    pub fn headsign(&self) -> Option<&str> {
        self.trip.as_ref()?.headsign.as_deref()
    }

    pub fn platform_code(&self) -> Option<&str> {
        self.stop.as_ref()?.platform_code.as_deref()
    }

    pub fn effective(&self) -> Option<DateTime<FixedOffset>> {
        self.departure_timestamp.as_ref()?.effective()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RouteInfo {
    pub short_name: Option<String>,
    #[serde(rename = "type")]
    pub route_type: Option<i32>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct TripInfo {
    pub id: Option<String>,
    pub headsign: Option<String>,
    pub wheelchair_accessible: Option<AccessCode>,
    pub is_wheelchair_accessible: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct StopInfo {
    pub id: Option<String>,
    pub name: Option<String>,
    pub platform_code: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct DepartureTimestamp {
    pub scheduled: Option<DateTime<FixedOffset>>,
    pub predicted: Option<DateTime<FixedOffset>>,
    pub actual: Option<DateTime<FixedOffset>>,
}

impl DepartureTimestamp {
    /// Predicted, else actual, else scheduled.
    pub fn effective(&self) -> Option<DateTime<FixedOffset>> {
        self.predicted.or(self.actual).or(self.scheduled)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct DelayInfo {
    pub total: Option<i64>,
    pub arrival: Option<i64>,
    pub departure: Option<i64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct VehicleFlags {
    pub wheelchair_accessible: Option<bool>,
    pub low_floor: Option<bool>,
}

/// Departure boards come either wrapped in an object or as a bare list.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub(crate) enum DepartureBoardResponse {
    Board {
        #[serde(default)]
        departures: Vec<RawDeparture>,
    },
    List(Vec<RawDeparture>),
}

impl From<DepartureBoardResponse> for Vec<RawDeparture> {
    fn from(value: DepartureBoardResponse) -> Self {
        match value {
            DepartureBoardResponse::Board { departures } => departures,
            DepartureBoardResponse::List(departures) => departures,
        }
    }
}

#[derive(Deserialize, Debug, Default)]
pub(crate) struct VehiclePositionsResponse {
    #[serde(default)]
    pub features: Vec<VehiclePositionFeature>,
}

#[derive(Deserialize, Debug, Default)]
pub(crate) struct VehiclePositionFeature {
    pub properties: Option<VehiclePositionProperties>,
}

#[derive(Deserialize, Debug, Default)]
pub(crate) struct VehiclePositionProperties {
    pub trip: Option<VehicleTrip>,
}

#[derive(Deserialize, Debug, Default)]
pub(crate) struct VehicleTrip {
    pub gtfs: Option<VehicleTripGtfs>,
    pub vehicle_type: Option<VehicleType>,
    pub vehicle_descriptor: Option<VehicleDescriptor>,
    pub wheelchair_accessible: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
pub(crate) struct VehicleTripGtfs {
    pub trip_id: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub(crate) struct VehicleDescriptor {
    pub model: Option<String>,
    pub manufacturer: Option<String>,
    pub label: Option<String>,
    pub description_cs: Option<String>,
    pub description_en: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub(crate) struct VehicleType {
    pub description_cs: Option<String>,
    pub description_en: Option<String>,
}
