use chrono::{DateTime, TimeZone};

const MILLIS_PER_MINUTE: f64 = 60_000.0;

/// `HH:MM` in the timestamp's own offset.
pub fn clock<Tz>(when: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    when.format("%H:%M").to_string()
}

/// `HH:MM:SS` in the timestamp's own offset.
pub fn clock_with_seconds<Tz>(when: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    when.format("%H:%M:%S").to_string()
}

/// Fractional minutes from `from` to `to`, negative when `to` is earlier.
pub fn minutes_between<A, B>(from: &DateTime<A>, to: &DateTime<B>) -> f64
where
    A: TimeZone,
    B: TimeZone,
{
    let delta = to.clone().signed_duration_since(from);
    delta.num_milliseconds() as f64 / MILLIS_PER_MINUTE
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn parse(value: &str) -> DateTime<chrono::FixedOffset> {
        DateTime::parse_from_rfc3339(value).unwrap()
    }

    #[test]
    fn clock_uses_own_offset() {
        let when = parse("2025-03-01T10:05:59+01:00");
        assert_eq!(clock(&when), "10:05");
        assert_eq!(clock_with_seconds(&when), "10:05:59");
    }

    #[test]
    fn minutes_between_forward() {
        let from = parse("2025-03-01T10:00:00+01:00");
        let to = parse("2025-03-01T10:05:30+01:00");
        assert_eq!(minutes_between(&from, &to), 5.5);
    }

    #[test]
    fn minutes_between_across_offsets() {
        let from = parse("2025-03-01T09:00:00Z");
        let to = parse("2025-03-01T10:00:00+01:00");
        assert_eq!(minutes_between(&from, &to), 0.0);
    }

    #[test]
    fn minutes_between_backward() {
        let from = parse("2025-03-01T10:01:00+01:00");
        let to = parse("2025-03-01T10:00:00+01:00");
        assert_eq!(minutes_between(&from, &to), -1.0);
    }
}
