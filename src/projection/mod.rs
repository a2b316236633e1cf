use chrono::{DateTime, TimeZone};

use crate::{
    feed::{RawDeparture, VehicleInfos},
    settings::{AccessibilityFilter, ModeVisibility},
    stops::StopGroup,
};

mod filters;
mod mode;
mod row;

pub use filters::*;
pub use mode::*;
pub use row::*;

/// Everything the projection reads besides the departures themselves.
#[derive(Debug, Clone, Copy)]
pub struct ProjectionConfig<'a> {
    pub modes: ModeVisibility,
    pub accessibility: AccessibilityFilter,
    pub on_time_only: bool,
    /// Platform options from the previous cycle, for their selection.
    pub platforms: &'a FilterSet,
    /// Line options from the previous cycle, for their selection.
    pub lines: &'a FilterSet,
    /// Selected stops, used to name departures the feed left unnamed.
    pub stops: &'a [StopGroup],
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    pub rows: Vec<DisplayRow>,
    pub platforms: FilterSet,
    pub lines: FilterSet,
}

/// Turns one fetch into display rows sorted by departure time.
/// Filter options are rebuilt from the whole fetch first and the rows are then
/// filtered against the rebuilt options.
pub fn project<Tz: TimeZone>(
    departures: &[RawDeparture],
    vehicles: &VehicleInfos,
    now: &DateTime<Tz>,
    config: &ProjectionConfig,
) -> Projection {
    let platforms = config.platforms.rebuild(platform_names(departures));
    let lines = config.lines.rebuild(line_names(departures));

    let mut rows: Vec<DisplayRow> = departures
        .iter()
        .filter(|departure| config.modes.allows(TransportMode::from(departure.route_type())))
        .filter(|departure| platform_allowed(departure, &platforms))
        .filter(|departure| line_allowed(departure, &lines))
        .filter(|departure| !config.on_time_only || is_on_time(delay_minutes(departure)))
        .filter(|departure| config.accessibility.allows(is_accessible(departure, vehicles)))
        .filter_map(|departure| DisplayRow::new(departure, vehicles, config.stops, now))
        .collect();
    rows.sort_by_key(|row| row.when);

    Projection {
        rows,
        platforms,
        lines,
    }
}

/// Distinct platform codes of urban departures, sorted.
pub fn platform_names(departures: &[RawDeparture]) -> Vec<&str> {
    let mut names = distinct(
        departures
            .iter()
            .filter(|departure| TransportMode::from(departure.route_type()).is_urban())
            .filter_map(|departure| departure.platform_code()),
    );
    names.sort_unstable();
    names
}

/// Distinct line names, sorted ignoring case.
pub fn line_names(departures: &[RawDeparture]) -> Vec<&str> {
    let mut names = distinct(departures.iter().filter_map(|departure| departure.short_name()));
    names.sort_by_cached_key(|name| name.to_lowercase());
    names
}

/// Trains and unplatformed departures are never filtered by platform.
pub fn platform_allowed(departure: &RawDeparture, platforms: &FilterSet) -> bool {
    if !TransportMode::from(departure.route_type()).is_urban() || !platforms.is_populated() {
        return true;
    }
    match departure.platform_code() {
        Some(platform) if !platform.trim().is_empty() => platforms.is_selected(platform),
        _ => true,
    }
}

pub fn line_allowed(departure: &RawDeparture, lines: &FilterSet) -> bool {
    if !lines.is_populated() {
        return true;
    }
    match departure.short_name() {
        Some(line) if !line.trim().is_empty() => lines.is_selected(line),
        _ => true,
    }
}
