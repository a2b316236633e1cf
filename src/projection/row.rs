use chrono::{DateTime, FixedOffset, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{
    feed::{RawDeparture, VehicleInfos},
    projection::TransportMode,
    shared::{self, text::eq_ignore_case},
    stops::StopGroup,
};

pub const PLACEHOLDER: &str = "-";
pub const ACCESSIBLE_GLYPH: &str = "♿";
pub const ON_TIME_LABEL: &str = "on time";

const DEPARTED_AFTER_SECONDS: f64 = -30.0;
const ON_TIME_MINUTES: f64 = 0.5;

/// How far away a departure is, bucketed for display.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    /// Left more than 30 seconds ago.
    Departed,
    /// Less than a minute away, or just leaving.
    Imminent,
    Minutes(i64),
}

impl Countdown {
    pub fn new(minutes_away: f64) -> Self {
        if minutes_away * 60.0 < DEPARTED_AFTER_SECONDS {
            Countdown::Departed
        } else if minutes_away < 1.0 {
            Countdown::Imminent
        } else {
            Countdown::Minutes(minutes_away.round() as i64)
        }
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Countdown::Departed => write!(f, "departed"),
            Countdown::Imminent => write!(f, "<1 min"),
            Countdown::Minutes(minutes) => write!(f, "{minutes} min"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DelayCategory {
    #[default]
    None,
    Minor,
    Major,
}

impl DelayCategory {
    /// Early departures and unknown delays are `None`.
    pub fn new(minutes: Option<f64>) -> Self {
        match minutes {
            Some(minutes) if minutes >= 5.0 => DelayCategory::Major,
            Some(minutes) if minutes >= 1.0 => DelayCategory::Minor,
            _ => DelayCategory::None,
        }
    }
}

/// Signed delay in fractional minutes, known only when both the predicted
/// and the scheduled timestamps are.
pub fn delay_minutes(departure: &RawDeparture) -> Option<f64> {
    let timestamp = departure.departure_timestamp.as_ref()?;
    let predicted = timestamp.predicted?;
    let scheduled = timestamp.scheduled?;
    Some(shared::minutes_between(&scheduled, &predicted))
}

pub fn delay_label(minutes: Option<f64>) -> String {
    match minutes {
        None => PLACEHOLDER.to_string(),
        Some(minutes) if minutes.abs() < ON_TIME_MINUTES => ON_TIME_LABEL.to_string(),
        Some(minutes) => {
            let sign = if minutes >= 0.0 { '+' } else { '-' };
            format!("{sign}{} min", minutes.abs().round())
        }
    }
}

pub fn is_on_time(minutes: Option<f64>) -> bool {
    minutes.is_some_and(|minutes| minutes.abs() < ON_TIME_MINUTES)
}

/// Step-free access, first known source wins: the live vehicle flag, then the
/// trip flag, then any of the static codes and vehicle flags.
pub fn is_accessible(departure: &RawDeparture, vehicles: &VehicleInfos) -> bool {
    if let Some(accessible) = departure
        .trip_id()
        .and_then(|trip_id| vehicles.get(trip_id))
        .and_then(|info| info.wheelchair_accessible)
    {
        return accessible;
    }

    let trip = departure.trip.as_ref();
    if let Some(accessible) = trip.and_then(|trip| trip.is_wheelchair_accessible) {
        return accessible;
    }

    let vehicle = departure.vehicle.as_ref();
    trip.and_then(|trip| trip.wheelchair_accessible)
        .is_some_and(|code| code.is_accessible())
        || departure
            .wheelchair_accessible
            .is_some_and(|code| code.is_accessible())
        || vehicle.and_then(|vehicle| vehicle.wheelchair_accessible) == Some(true)
        || vehicle.and_then(|vehicle| vehicle.low_floor) == Some(true)
}

/// The live vehicle name when one is known, else the mode name, glyph first.
pub fn vehicle_label(departure: &RawDeparture, vehicles: &VehicleInfos) -> String {
    let mode = TransportMode::from(departure.route_type());
    let name = departure
        .trip_id()
        .filter(|trip_id| !trip_id.trim().is_empty())
        .and_then(|trip_id| vehicles.get(trip_id))
        .and_then(|info| info.display_name.as_deref())
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(mode.name());
    mode.label(name)
}

/// API stop name, else the selected group owning the stop id, else the id.
pub fn stop_name(departure: &RawDeparture, selected: &[StopGroup]) -> String {
    let Some(stop) = departure.stop.as_ref() else {
        return String::new();
    };
    if let Some(name) = stop.name.as_deref().filter(|name| !name.trim().is_empty()) {
        return name.to_string();
    }
    let Some(stop_id) = stop.id.as_deref().filter(|id| !id.trim().is_empty()) else {
        return String::new();
    };
    selected
        .iter()
        .find(|group| group.stop_ids.iter().any(|id| eq_ignore_case(id, stop_id)))
        .map(|group| group.name.clone())
        .unwrap_or_else(|| stop_id.to_string())
}

/// One departure, resolved for display.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DisplayRow {
    pub line: String,
    pub destination: String,
    pub stop_name: String,
    pub platform: String,
    pub departure_time: String,
    pub countdown: Countdown,
    pub delay: String,
    pub delay_minutes: Option<f64>,
    pub delay_category: DelayCategory,
    pub accessibility: String,
    pub vehicle: String,
    pub mode: TransportMode,
    pub when: DateTime<FixedOffset>,
}

impl DisplayRow {
    /// Resolves `departure` against `now`. Departures without any timestamp
    /// have no row.
    pub fn new<Tz: TimeZone>(
        departure: &RawDeparture,
        vehicles: &VehicleInfos,
        selected: &[StopGroup],
        now: &DateTime<Tz>,
    ) -> Option<Self> {
        let when = departure.effective()?;
        let delay_minutes = delay_minutes(departure);

        Some(Self {
            line: non_blank(departure.short_name()),
            destination: non_blank(departure.headsign()),
            stop_name: stop_name(departure, selected),
            platform: non_blank(departure.platform_code()),
            departure_time: shared::clock(&when),
            countdown: Countdown::new(shared::minutes_between(now, &when)),
            delay: delay_label(delay_minutes),
            delay_minutes,
            delay_category: DelayCategory::new(delay_minutes),
            accessibility: match is_accessible(departure, vehicles) {
                true => ACCESSIBLE_GLYPH.to_string(),
                false => String::new(),
            },
            vehicle: vehicle_label(departure, vehicles),
            mode: TransportMode::from(departure.route_type()),
            when,
        })
    }

    /// Minutes left until departure as of `now`, negative once it has left.
    pub fn minutes_until<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> f64 {
        shared::minutes_between(now, &self.when)
    }
}

fn non_blank(value: Option<&str>) -> String {
    match value {
        Some(value) if !value.trim().is_empty() => value.to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{AccessCode, DepartureTimestamp, TripInfo, VehicleFlags, VehicleInfo};

    fn at(value: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(value).unwrap()
    }

    fn timed(scheduled: &str, predicted: Option<&str>) -> RawDeparture {
        RawDeparture {
            departure_timestamp: Some(DepartureTimestamp {
                scheduled: Some(at(scheduled)),
                predicted: predicted.map(at),
                actual: None,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn countdown_buckets() {
        assert_eq!(Countdown::new(-0.6), Countdown::Departed);
        assert_eq!(Countdown::new(-0.5), Countdown::Imminent);
        assert_eq!(Countdown::new(0.9), Countdown::Imminent);
        assert_eq!(Countdown::new(1.4), Countdown::Minutes(1));
        assert_eq!(Countdown::new(2.5), Countdown::Minutes(3));
        assert_eq!(Countdown::Minutes(7).to_string(), "7 min");
        assert_eq!(Countdown::Imminent.to_string(), "<1 min");
    }

    #[test]
    fn five_minute_delay_is_major() {
        let departure = timed("2025-03-01T10:00:00+01:00", Some("2025-03-01T10:05:00+01:00"));
        let minutes = delay_minutes(&departure);
        assert_eq!(delay_label(minutes), "+5 min");
        assert_eq!(DelayCategory::new(minutes), DelayCategory::Major);
        assert_eq!(DelayCategory::new(Some(4.9)), DelayCategory::Minor);
        assert_eq!(DelayCategory::new(Some(0.9)), DelayCategory::None);
    }

    #[test]
    fn ten_seconds_is_on_time() {
        let departure = timed("2025-03-01T10:00:00+01:00", Some("2025-03-01T10:00:10+01:00"));
        let minutes = delay_minutes(&departure);
        assert_eq!(delay_label(minutes), ON_TIME_LABEL);
        assert_eq!(DelayCategory::new(minutes), DelayCategory::None);
        assert!(is_on_time(minutes));
    }

    #[test]
    fn early_departure_has_minus_sign() {
        let departure = timed("2025-03-01T10:00:00+01:00", Some("2025-03-01T09:58:30+01:00"));
        let minutes = delay_minutes(&departure);
        assert_eq!(delay_label(minutes), "-2 min");
        assert_eq!(DelayCategory::new(minutes), DelayCategory::None);
    }

    #[test]
    fn unknown_delay_uses_placeholder() {
        let departure = timed("2025-03-01T10:00:00+01:00", None);
        assert_eq!(delay_minutes(&departure), None);
        assert_eq!(delay_label(None), PLACEHOLDER);
        assert!(!is_on_time(None));
    }

    #[test]
    fn vehicle_flag_overrides_trip_flag() {
        let departure = RawDeparture {
            trip: Some(TripInfo {
                id: Some("T1".into()),
                is_wheelchair_accessible: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        };
        let mut vehicles = VehicleInfos::new();
        assert!(is_accessible(&departure, &vehicles));
        vehicles.insert(
            "t1",
            VehicleInfo {
                display_name: None,
                wheelchair_accessible: Some(false),
            },
        );
        assert!(!is_accessible(&departure, &vehicles));
    }

    #[test]
    fn trip_flag_overrides_codes() {
        let departure = RawDeparture {
            trip: Some(TripInfo {
                is_wheelchair_accessible: Some(false),
                wheelchair_accessible: Some(AccessCode::Code(1)),
                ..Default::default()
            }),
            vehicle: Some(VehicleFlags {
                wheelchair_accessible: None,
                low_floor: Some(true),
            }),
            ..Default::default()
        };
        assert!(!is_accessible(&departure, &VehicleInfos::new()));
    }

    #[test]
    fn any_static_source_marks_accessible() {
        let low_floor = RawDeparture {
            vehicle: Some(VehicleFlags {
                wheelchair_accessible: None,
                low_floor: Some(true),
            }),
            ..Default::default()
        };
        let departure_code = RawDeparture {
            wheelchair_accessible: Some(AccessCode::Code(1)),
            ..Default::default()
        };
        let code_two = RawDeparture {
            wheelchair_accessible: Some(AccessCode::Code(2)),
            ..Default::default()
        };
        let vehicles = VehicleInfos::new();
        assert!(is_accessible(&low_floor, &vehicles));
        assert!(is_accessible(&departure_code, &vehicles));
        assert!(!is_accessible(&code_two, &vehicles));
        assert!(!is_accessible(&RawDeparture::default(), &vehicles));
    }

    #[test]
    fn row_without_timestamp_is_dropped() {
        let now = at("2025-03-01T10:00:00+01:00");
        assert!(DisplayRow::new(&RawDeparture::default(), &VehicleInfos::new(), &[], &now).is_none());
    }

    #[test]
    fn missing_fields_degrade_to_placeholders() {
        let now = at("2025-03-01T10:00:00+01:00");
        let departure = timed("2025-03-01T10:04:00+01:00", None);
        let row = DisplayRow::new(&departure, &VehicleInfos::new(), &[], &now).unwrap();
        assert_eq!(row.line, PLACEHOLDER);
        assert_eq!(row.destination, PLACEHOLDER);
        assert_eq!(row.platform, PLACEHOLDER);
        assert_eq!(row.stop_name, "");
        assert_eq!(row.accessibility, "");
        assert_eq!(row.vehicle, "");
        assert_eq!(row.departure_time, "10:04");
        assert_eq!(row.countdown, Countdown::Minutes(4));
        assert_eq!(row.delay_category, DelayCategory::None);
    }
}
