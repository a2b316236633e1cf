use chrono::{DateTime, FixedOffset, TimeDelta};
use perron::{
    alerts::{AlertEvaluator, AlertKey, AlertReason, AlertThresholds},
    projection::{Countdown, DelayCategory, DisplayRow, TransportMode},
};

const THRESHOLDS: AlertThresholds = AlertThresholds {
    minutes: 3.0,
    delay: 5.0,
};

fn now() -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339("2025-03-01T10:00:00+01:00").unwrap()
}

fn row(line: &str, minutes_away: i64, delay_minutes: Option<f64>) -> DisplayRow {
    let when = now() + TimeDelta::minutes(minutes_away);
    DisplayRow {
        line: line.into(),
        destination: "Depo Hostivař".into(),
        stop_name: "Muzeum".into(),
        platform: "A".into(),
        departure_time: when.format("%H:%M").to_string(),
        countdown: Countdown::new(minutes_away as f64),
        delay: String::new(),
        delay_minutes,
        delay_category: DelayCategory::new(delay_minutes),
        accessibility: String::new(),
        vehicle: String::new(),
        mode: TransportMode::Tram,
        when,
    }
}

#[test]
fn departing_soon_fires_once() {
    let mut evaluator = AlertEvaluator::new();
    let rows = vec![row("22", 2, None)];

    let events = evaluator.evaluate(&rows, THRESHOLDS, &now());
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].reason, AlertReason::Soon);
    assert_eq!(events[0].line, "22");

    assert!(evaluator.evaluate(&rows, THRESHOLDS, &now()).is_empty());
}

#[test]
fn reappearing_departure_fires_again() {
    let mut evaluator = AlertEvaluator::new();
    let rows = vec![row("22", 2, None)];

    assert_eq!(evaluator.evaluate(&rows, THRESHOLDS, &now()).len(), 1);
    assert!(evaluator.evaluate(&[], THRESHOLDS, &now()).is_empty());
    assert_eq!(evaluator.fired(), 0);
    assert_eq!(evaluator.evaluate(&rows, THRESHOLDS, &now()).len(), 1);
}

#[test]
fn threshold_is_inclusive() {
    let mut evaluator = AlertEvaluator::new();
    let rows = vec![row("22", 3, None), row("9", 4, None), row("17", 0, None)];
    let events = evaluator.evaluate(&rows, THRESHOLDS, &now());
    let lines: Vec<&str> = events.iter().map(|event| event.line.as_str()).collect();
    assert_eq!(lines, vec!["22", "17"]);
}

#[test]
fn departed_rows_are_not_soon() {
    let mut evaluator = AlertEvaluator::new();
    assert!(evaluator.evaluate(&[row("22", -1, None)], THRESHOLDS, &now()).is_empty());
}

#[test]
fn delay_fires_regardless_of_distance() {
    let mut evaluator = AlertEvaluator::new();
    let rows = vec![row("22", 15, Some(6.0)), row("9", 15, Some(4.0))];
    let events = evaluator.evaluate(&rows, THRESHOLDS, &now());
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].reason, AlertReason::Delayed);
    assert_eq!(events[0].delay_minutes, Some(6.0));
    assert!(events[0].message().contains("6 min late"));
}

#[test]
fn clear_allows_refiring() {
    let mut evaluator = AlertEvaluator::new();
    let rows = vec![row("22", 1, None)];
    evaluator.evaluate(&rows, THRESHOLDS, &now());
    evaluator.clear();
    assert_eq!(evaluator.fired(), 0);
    assert_eq!(evaluator.evaluate(&rows, THRESHOLDS, &now()).len(), 1);
}

#[test]
fn keys_ignore_case() {
    let upper = row("X", 2, None);
    let mut lower = upper.clone();
    lower.line = "x".into();
    lower.destination = lower.destination.to_uppercase();
    assert_eq!(AlertKey::new(&upper), AlertKey::new(&lower));

    let mut evaluator = AlertEvaluator::new();
    assert_eq!(evaluator.evaluate(&[upper], THRESHOLDS, &now()).len(), 1);
    assert!(evaluator.evaluate(&[lower], THRESHOLDS, &now()).is_empty());
}

#[test]
fn key_has_four_parts() {
    let key = AlertKey::new(&row("22", 2, None));
    assert_eq!(key.as_str(), "22|depo hostivař|a|10:02");
}
