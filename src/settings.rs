use serde::{Deserialize, Serialize};

use crate::{projection::TransportMode, shared::text::eq_ignore_case, stops::StopGroup};

pub const DEFAULT_MINUTES_AFTER: u32 = 20;
pub const DEFAULT_REFRESH_SECONDS: u32 = 5;
pub const MIN_REFRESH_SECONDS: u32 = 5;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AccessibilityFilter {
    #[default]
    All,
    AccessibleOnly,
    HighFloorOnly,
}

impl AccessibilityFilter {
    pub fn allows(&self, accessible: bool) -> bool {
        match self {
            AccessibilityFilter::All => true,
            AccessibilityFilter::AccessibleOnly => accessible,
            AccessibilityFilter::HighFloorOnly => !accessible,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct ModeVisibility {
    pub tram: bool,
    pub metro: bool,
    pub train: bool,
    pub bus: bool,
    pub trolleybus: bool,
}

impl Default for ModeVisibility {
    fn default() -> Self {
        Self {
            tram: true,
            metro: true,
            train: true,
            bus: true,
            trolleybus: true,
        }
    }
}

impl ModeVisibility {
    /// Unknown modes are always shown.
    pub fn allows(&self, mode: TransportMode) -> bool {
        match mode {
            TransportMode::Tram => self.tram,
            TransportMode::Metro => self.metro,
            TransportMode::Rail => self.train,
            TransportMode::Bus => self.bus,
            TransportMode::Trolleybus => self.trolleybus,
            TransportMode::Unknown => true,
        }
    }

    /// Returns whether the toggle changed. Unknown has no toggle.
    pub fn set(&mut self, mode: TransportMode, visible: bool) -> bool {
        let slot = match mode {
            TransportMode::Tram => &mut self.tram,
            TransportMode::Metro => &mut self.metro,
            TransportMode::Rail => &mut self.train,
            TransportMode::Bus => &mut self.bus,
            TransportMode::Trolleybus => &mut self.trolleybus,
            TransportMode::Unknown => return false,
        };
        let changed = *slot != visible;
        *slot = visible;
        changed
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct AlertSettings {
    pub enabled: bool,
    pub minutes_threshold: u32,
    pub delay_threshold: u32,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            minutes_threshold: 3,
            delay_threshold: 5,
        }
    }
}

/// A named stop selection bundled with the whole filter and alert setup.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Preset {
    pub name: String,
    pub stops: Vec<StopGroup>,
    pub minutes_after: u32,
    pub refresh_seconds: u32,
    pub modes: ModeVisibility,
    pub accessibility: AccessibilityFilter,
    pub on_time_only: bool,
    pub alerts: AlertSettings,
}

impl Default for Preset {
    fn default() -> Self {
        Self {
            name: String::new(),
            stops: Vec::new(),
            minutes_after: DEFAULT_MINUTES_AFTER,
            refresh_seconds: DEFAULT_REFRESH_SECONDS,
            modes: Default::default(),
            accessibility: Default::default(),
            on_time_only: false,
            alerts: Default::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct UserPreferences {
    pub remember_settings: bool,
    pub selected_stops: Vec<StopGroup>,
    pub minutes_after: u32,
    pub refresh_seconds: u32,
    pub modes: ModeVisibility,
    pub accessibility: AccessibilityFilter,
    pub on_time_only: bool,
    pub alerts: AlertSettings,
    pub presets: Vec<Preset>,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            remember_settings: true,
            selected_stops: Vec::new(),
            minutes_after: DEFAULT_MINUTES_AFTER,
            refresh_seconds: DEFAULT_REFRESH_SECONDS,
            modes: Default::default(),
            accessibility: Default::default(),
            on_time_only: false,
            alerts: Default::default(),
            presets: Vec::new(),
        }
    }
}

impl UserPreferences {
    /// Repairs values a hand edited or older settings file may carry.
    pub fn sanitized(mut self) -> Self {
        if self.minutes_after == 0 {
            self.minutes_after = DEFAULT_MINUTES_AFTER;
        }
        self.refresh_seconds = self.refresh_seconds.max(MIN_REFRESH_SECONDS);
        self
    }

    pub fn preset(&self, name: &str) -> Option<&Preset> {
        self.presets
            .iter()
            .find(|preset| eq_ignore_case(&preset.name, name.trim()))
    }

    /// Captures the current setup under `name`, replacing a preset of the same name.
    pub fn save_preset(&mut self, name: &str) {
        let name = name.trim().to_string();
        let preset = Preset {
            name: name.clone(),
            stops: self.selected_stops.clone(),
            minutes_after: self.minutes_after,
            refresh_seconds: self.refresh_seconds,
            modes: self.modes,
            accessibility: self.accessibility,
            on_time_only: self.on_time_only,
            alerts: self.alerts,
        };
        match self
            .presets
            .iter_mut()
            .find(|existing| eq_ignore_case(&existing.name, &name))
        {
            Some(existing) => *existing = preset,
            None => self.presets.push(preset),
        }
    }

    /// Returns false when no preset has that name.
    pub fn apply_preset(&mut self, name: &str) -> bool {
        let Some(preset) = self.preset(name).cloned() else {
            return false;
        };
        self.selected_stops = preset.stops;
        self.minutes_after = preset.minutes_after.max(1);
        self.refresh_seconds = preset.refresh_seconds.max(MIN_REFRESH_SECONDS);
        self.modes = preset.modes;
        self.accessibility = preset.accessibility;
        self.on_time_only = preset.on_time_only;
        self.alerts = preset.alerts;
        true
    }

    pub fn delete_preset(&mut self, name: &str) -> bool {
        let before = self.presets.len();
        self.presets
            .retain(|preset| !eq_ignore_case(&preset.name, name.trim()));
        before != self.presets.len()
    }
}
