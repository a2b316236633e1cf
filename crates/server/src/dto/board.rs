use perron::{
    board::{BoardState, Changes, Field},
    projection::{DelayCategory, DisplayRow, FilterOption},
    settings::{AccessibilityFilter, ModeVisibility},
};
use serde::Serialize;

use crate::dto::StopDto;

#[derive(Debug, Clone, Serialize)]
pub struct RowDto {
    pub line: String,
    pub destination: String,
    pub stop: String,
    pub platform: String,
    pub time: String,
    pub countdown: String,
    pub delay: String,
    pub delay_category: DelayCategory,
    pub accessibility: String,
    pub vehicle: String,
    pub when: String,
}

impl From<&DisplayRow> for RowDto {
    fn from(row: &DisplayRow) -> Self {
        Self {
            line: row.line.clone(),
            destination: row.destination.clone(),
            stop: row.stop_name.clone(),
            platform: row.platform.clone(),
            time: row.departure_time.clone(),
            countdown: row.countdown.to_string(),
            delay: row.delay.clone(),
            delay_category: row.delay_category,
            accessibility: row.accessibility.clone(),
            vehicle: row.vehicle.clone(),
            when: row.when.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BoardDto {
    pub status: String,
    pub loading: bool,
    pub offline: bool,
    pub stops: Vec<StopDto>,
    pub departures: Vec<RowDto>,
}

impl From<&BoardState> for BoardDto {
    fn from(state: &BoardState) -> Self {
        Self {
            status: state.status.clone(),
            loading: state.is_loading,
            offline: state.is_offline,
            stops: state
                .preferences
                .selected_stops
                .iter()
                .map(StopDto::from)
                .collect(),
            departures: state.rows.iter().map(RowDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FiltersDto {
    pub platforms: Vec<FilterOption>,
    pub lines: Vec<FilterOption>,
    pub modes: ModeVisibility,
    pub accessibility: AccessibilityFilter,
    pub on_time_only: bool,
}

impl From<&BoardState> for FiltersDto {
    fn from(state: &BoardState) -> Self {
        Self {
            platforms: state.platforms.options().to_vec(),
            lines: state.lines.options().to_vec(),
            modes: state.preferences.modes,
            accessibility: state.preferences.accessibility,
            on_time_only: state.preferences.on_time_only,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangesDto {
    pub changed: Vec<Field>,
    pub refreshed: bool,
}

impl From<&Changes> for ChangesDto {
    fn from(changes: &Changes) -> Self {
        Self {
            changed: changes.fields.clone(),
            refreshed: changes.refresh,
        }
    }
}
