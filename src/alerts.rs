use chrono::{DateTime, TimeZone};
use serde::Serialize;
use std::{collections::HashSet, fmt};

use crate::{projection::DisplayRow, settings::AlertSettings};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertThresholds {
    /// Fire when a departure leaves within this many minutes.
    pub minutes: f64,
    /// Fire when a departure runs at least this many minutes late.
    pub delay: f64,
}

impl From<AlertSettings> for AlertThresholds {
    fn from(value: AlertSettings) -> Self {
        Self {
            minutes: f64::from(value.minutes_threshold),
            delay: f64::from(value.delay_threshold),
        }
    }
}

/// Identity of one physical departure: `line|destination|platform|time`,
/// compared ignoring case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlertKey(String);

impl AlertKey {
    pub fn new(row: &DisplayRow) -> Self {
        Self(
            format!(
                "{}|{}|{}|{}",
                row.line, row.destination, row.platform, row.departure_time
            )
            .to_lowercase(),
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AlertKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AlertReason {
    Soon,
    Delayed,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct AlertEvent {
    pub reason: AlertReason,
    pub line: String,
    pub destination: String,
    pub platform: String,
    pub departure_time: String,
    pub minutes_until: f64,
    pub delay_minutes: Option<f64>,
}

impl AlertEvent {
    pub fn title(&self) -> String {
        format!("Line {} to {}", self.line, self.destination)
    }

    pub fn message(&self) -> String {
        match (self.reason, self.delay_minutes) {
            (AlertReason::Delayed, Some(delay)) => format!(
                "Departs {} from platform {}, running {} min late.",
                self.departure_time,
                self.platform,
                delay.round()
            ),
            _ => format!(
                "Departs {} from platform {} in {} min.",
                self.departure_time,
                self.platform,
                self.minutes_until.max(0.0).round()
            ),
        }
    }
}

/// Edge triggered alerts: each departure fires at most once while it stays
/// on the board.
#[derive(Debug, Default)]
pub struct AlertEvaluator {
    fired: HashSet<AlertKey>,
}

impl AlertEvaluator {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn evaluate<Tz: TimeZone>(
        &mut self,
        rows: &[DisplayRow],
        thresholds: AlertThresholds,
        now: &DateTime<Tz>,
    ) -> Vec<AlertEvent> {
        let mut current = HashSet::with_capacity(rows.len());
        let mut events = Vec::new();

        for row in rows {
            let key = AlertKey::new(row);
            current.insert(key.clone());

            let minutes_until = row.minutes_until(now);
            let soon = (0.0..=thresholds.minutes).contains(&minutes_until);
            let delayed = row
                .delay_minutes
                .is_some_and(|delay| delay >= thresholds.delay);
            if !(soon || delayed) || self.fired.contains(&key) {
                continue;
            }

            events.push(AlertEvent {
                reason: if soon {
                    AlertReason::Soon
                } else {
                    AlertReason::Delayed
                },
                line: row.line.clone(),
                destination: row.destination.clone(),
                platform: row.platform.clone(),
                departure_time: row.departure_time.clone(),
                minutes_until,
                delay_minutes: row.delay_minutes,
            });
            self.fired.insert(key);
        }

        self.fired.retain(|key| current.contains(key));
        events
    }

    /// Forgets every fired departure.
    pub fn clear(&mut self) {
        self.fired.clear();
    }

    pub fn fired(&self) -> usize {
        self.fired.len()
    }
}
