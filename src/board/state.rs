use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use crate::{
    feed::{RawDeparture, VehicleInfos},
    projection::{self, DisplayRow, FilterSet, ProjectionConfig, TransportMode},
    settings::{AccessibilityFilter, MIN_REFRESH_SECONDS, UserPreferences},
    shared::{self, text::eq_ignore_case},
    stops::StopGroup,
};

pub const SELECT_STOP: &str = "Select a stop.";
pub const SAVING_DISABLED: &str = "Saving is disabled, turn on remember settings.";
pub const PRESET_NAME_MISSING: &str = "Enter a preset name.";

/// A piece of board state a view can re-render on its own.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Rows,
    Status,
    Loading,
    Platforms,
    Lines,
    Stops,
    Modes,
    Accessibility,
    OnTimeOnly,
    Alerts,
    MinutesAfter,
    RefreshSeconds,
    ApiKey,
    RememberSettings,
    Presets,
}

/// What should happen to the persisted preferences after an update.
#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Persist {
    #[default]
    Nothing,
    Save,
    Clear,
}

/// Result of one update: the fields that changed, whether the departures
/// need to be fetched again and what to do with the stored preferences.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Changes {
    pub fields: Vec<Field>,
    pub refresh: bool,
    pub persist: Persist,
}

impl Changes {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && !self.refresh && self.persist == Persist::Nothing
    }

    pub fn contains(&self, field: Field) -> bool {
        self.fields.contains(&field)
    }

    fn touch(&mut self, field: Field) {
        if !self.fields.contains(&field) {
            self.fields.push(field);
        }
    }
}

/// Where the projected departures came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Live,
    Cache {
        saved_at: DateTime<Utc>,
        minutes_after: u32,
    },
}

#[derive(Debug, Clone)]
pub enum Action {
    SetModeVisible(TransportMode, bool),
    SetAccessibility(AccessibilityFilter),
    SetOnTimeOnly(bool),
    SelectPlatform { name: String, selected: bool },
    SelectLine { name: String, selected: bool },
    SetAlertsEnabled(bool),
    SetAlertMinutes(u32),
    SetAlertDelay(u32),
    SetMinutesAfter(u32),
    SetRefreshSeconds(u32),
    SetApiKey(Option<String>),
    SetRememberSettings(bool),
    AddStop(StopGroup),
    RemoveStop(String),
    SavePreset(String),
    ApplyPreset(String),
    DeletePreset(String),
    /// Preferences read back from the store on start.
    Restore(UserPreferences),
    Loading,
    NoStops,
    Projected {
        departures: Vec<RawDeparture>,
        vehicles: VehicleInfos,
        now: DateTime<Local>,
        source: Source,
    },
    Failed(String),
}

/// Everything a departure board shows, plus the preferences behind it.
#[derive(Serialize, Debug, Clone, Default)]
pub struct BoardState {
    pub preferences: UserPreferences,
    #[serde(skip)]
    pub api_key: Option<String>,
    pub rows: Vec<DisplayRow>,
    pub platforms: FilterSet,
    pub lines: FilterSet,
    pub status: String,
    pub is_loading: bool,
    pub is_offline: bool,
}

impl BoardState {
    pub fn new(preferences: UserPreferences) -> Self {
        Self {
            preferences,
            ..Default::default()
        }
    }

    /// Every stop id of every selected group, in selection order.
    pub fn stop_ids(&self) -> Vec<String> {
        self.preferences
            .selected_stops
            .iter()
            .flat_map(|group| group.stop_ids.iter().cloned())
            .collect()
    }

    pub fn has_stop(&self, primary_id: &str) -> bool {
        self.preferences
            .selected_stops
            .iter()
            .any(|group| eq_ignore_case(group.primary_id(), primary_id.trim()))
    }

    pub fn update(&mut self, action: Action) -> Changes {
        let mut changes = Changes::default();
        match action {
            Action::SetModeVisible(mode, visible) => {
                if self.preferences.modes.set(mode, visible) {
                    self.preference_changed(&mut changes, Field::Modes, true);
                }
            }
            Action::SetAccessibility(filter) => {
                if self.preferences.accessibility != filter {
                    self.preferences.accessibility = filter;
                    self.preference_changed(&mut changes, Field::Accessibility, true);
                }
            }
            Action::SetOnTimeOnly(on_time_only) => {
                if self.preferences.on_time_only != on_time_only {
                    self.preferences.on_time_only = on_time_only;
                    self.preference_changed(&mut changes, Field::OnTimeOnly, true);
                }
            }
            Action::SelectPlatform { name, selected } => {
                if self.platforms.set_selected(&name, selected) {
                    changes.touch(Field::Platforms);
                    changes.refresh = true;
                }
            }
            Action::SelectLine { name, selected } => {
                if self.lines.set_selected(&name, selected) {
                    changes.touch(Field::Lines);
                    changes.refresh = true;
                }
            }
            Action::SetAlertsEnabled(enabled) => {
                if self.preferences.alerts.enabled != enabled {
                    self.preferences.alerts.enabled = enabled;
                    self.preference_changed(&mut changes, Field::Alerts, false);
                }
            }
            Action::SetAlertMinutes(minutes) => {
                if self.preferences.alerts.minutes_threshold != minutes {
                    self.preferences.alerts.minutes_threshold = minutes;
                    self.preference_changed(&mut changes, Field::Alerts, false);
                }
            }
            Action::SetAlertDelay(minutes) => {
                if self.preferences.alerts.delay_threshold != minutes {
                    self.preferences.alerts.delay_threshold = minutes;
                    self.preference_changed(&mut changes, Field::Alerts, false);
                }
            }
            Action::SetMinutesAfter(minutes) => {
                let minutes = minutes.max(1);
                if self.preferences.minutes_after != minutes {
                    self.preferences.minutes_after = minutes;
                    self.preference_changed(&mut changes, Field::MinutesAfter, true);
                }
            }
            Action::SetRefreshSeconds(seconds) => {
                let seconds = seconds.max(MIN_REFRESH_SECONDS);
                if self.preferences.refresh_seconds != seconds {
                    self.preferences.refresh_seconds = seconds;
                    self.preference_changed(&mut changes, Field::RefreshSeconds, false);
                }
            }
            Action::SetApiKey(key) => {
                let key = key
                    .map(|key| key.trim().to_string())
                    .filter(|key| !key.is_empty());
                if self.api_key != key {
                    self.api_key = key;
                    changes.touch(Field::ApiKey);
                    changes.refresh = true;
                }
            }
            Action::SetRememberSettings(remember) => {
                if self.preferences.remember_settings != remember {
                    self.preferences.remember_settings = remember;
                    changes.touch(Field::RememberSettings);
                    if remember {
                        changes.persist = Persist::Save;
                    } else {
                        self.preferences.presets.clear();
                        changes.touch(Field::Presets);
                        changes.persist = Persist::Clear;
                    }
                }
            }
            Action::AddStop(group) => {
                if !self.has_stop(group.primary_id()) {
                    self.preferences.selected_stops.push(group);
                    self.preference_changed(&mut changes, Field::Stops, true);
                }
            }
            Action::RemoveStop(primary_id) => {
                let before = self.preferences.selected_stops.len();
                self.preferences
                    .selected_stops
                    .retain(|group| !eq_ignore_case(group.primary_id(), primary_id.trim()));
                if before != self.preferences.selected_stops.len() {
                    self.preference_changed(&mut changes, Field::Stops, true);
                }
            }
            Action::SavePreset(name) => {
                let name = name.trim();
                if !self.preferences.remember_settings {
                    self.set_status(&mut changes, SAVING_DISABLED.to_string());
                } else if name.is_empty() {
                    self.set_status(&mut changes, PRESET_NAME_MISSING.to_string());
                } else {
                    self.preferences.save_preset(name);
                    self.set_status(&mut changes, format!("Preset \"{name}\" saved."));
                    self.preference_changed(&mut changes, Field::Presets, false);
                }
            }
            Action::ApplyPreset(name) => {
                if self.preferences.apply_preset(&name) {
                    for field in [
                        Field::Stops,
                        Field::MinutesAfter,
                        Field::RefreshSeconds,
                        Field::Modes,
                        Field::Accessibility,
                        Field::OnTimeOnly,
                        Field::Alerts,
                    ] {
                        changes.touch(field);
                    }
                    self.set_status(&mut changes, format!("Preset \"{}\" applied.", name.trim()));
                    self.preference_changed(&mut changes, Field::Stops, true);
                }
            }
            Action::DeletePreset(name) => {
                if self.preferences.delete_preset(&name) {
                    self.set_status(&mut changes, format!("Preset \"{}\" removed.", name.trim()));
                    self.preference_changed(&mut changes, Field::Presets, false);
                }
            }
            Action::Restore(preferences) => {
                self.preferences = preferences.sanitized();
                for field in [
                    Field::RememberSettings,
                    Field::Stops,
                    Field::MinutesAfter,
                    Field::RefreshSeconds,
                    Field::Modes,
                    Field::Accessibility,
                    Field::OnTimeOnly,
                    Field::Alerts,
                    Field::Presets,
                ] {
                    changes.touch(field);
                }
                changes.refresh = true;
            }
            Action::Loading => {
                if !self.is_loading {
                    self.is_loading = true;
                    changes.touch(Field::Loading);
                }
            }
            Action::NoStops => {
                self.finish_loading(&mut changes);
                self.rows.clear();
                self.platforms.clear();
                self.lines.clear();
                self.is_offline = false;
                for field in [Field::Rows, Field::Platforms, Field::Lines] {
                    changes.touch(field);
                }
                self.set_status(&mut changes, SELECT_STOP.to_string());
            }
            Action::Projected {
                departures,
                vehicles,
                now,
                source,
            } => {
                self.finish_loading(&mut changes);
                let config = ProjectionConfig {
                    modes: self.preferences.modes,
                    accessibility: self.preferences.accessibility,
                    on_time_only: self.preferences.on_time_only,
                    platforms: &self.platforms,
                    lines: &self.lines,
                    stops: &self.preferences.selected_stops,
                };
                let projection = projection::project(&departures, &vehicles, &now, &config);
                self.rows = projection.rows;
                self.platforms = projection.platforms;
                self.lines = projection.lines;
                for field in [Field::Rows, Field::Platforms, Field::Lines] {
                    changes.touch(field);
                }

                let status = match source {
                    Source::Live => {
                        self.is_offline = false;
                        format!(
                            "Last update {}, {} departures.",
                            shared::clock_with_seconds(&now),
                            self.rows.len()
                        )
                    }
                    Source::Cache {
                        saved_at,
                        minutes_after,
                    } => {
                        self.is_offline = true;
                        format!(
                            "Offline mode: showing cache from {} (departures {}, window {} min).",
                            shared::clock(&saved_at.with_timezone(&Local)),
                            self.rows.len(),
                            minutes_after
                        )
                    }
                };
                self.set_status(&mut changes, status);
            }
            Action::Failed(reason) => {
                self.finish_loading(&mut changes);
                self.rows.clear();
                self.is_offline = false;
                changes.touch(Field::Rows);
                self.set_status(&mut changes, format!("Failed to load departures: {reason}"));
            }
        }
        changes
    }

    fn preference_changed(&self, changes: &mut Changes, field: Field, refresh: bool) {
        changes.touch(field);
        changes.refresh |= refresh;
        if self.preferences.remember_settings {
            changes.persist = Persist::Save;
        }
    }

    fn set_status(&mut self, changes: &mut Changes, status: String) {
        if self.status != status {
            self.status = status;
            changes.touch(Field::Status);
        }
    }

    fn finish_loading(&mut self, changes: &mut Changes) {
        if self.is_loading {
            self.is_loading = false;
            changes.touch(Field::Loading);
        }
    }
}
