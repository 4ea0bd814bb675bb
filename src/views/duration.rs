use chrono::{DateTime, Utc};

/// Formats the wall-clock span between two timestamps, e.g. `"1h 30min"`.
///
/// Whole hours are floored and only the remainder is rounded to the nearest
/// minute, so 59m40s reads `"60min"`. The hour part is left out when it is
/// zero and a negative span counts as zero.
pub fn format_duration(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    format_millis((end - start).num_milliseconds())
}

/// Same format for a number of seconds (used for focused time).
pub fn format_seconds(seconds: i64) -> String {
    format_millis(seconds.saturating_mul(1000))
}

fn format_millis(millis: i64) -> String {
    let millis = millis.max(0);
    let hours = millis / 3_600_000;
    let minutes = (millis % 3_600_000 + 30_000) / 60_000;
    if hours == 0 {
        format!("{}min", minutes)
    } else {
        format!("{}h {}min", hours, minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap()
    }

    #[test]
    fn zero_length_is_zero_minutes() {
        assert_eq!(format_duration(t(), t()), "0min");
    }

    #[test]
    fn ninety_minutes() {
        assert_eq!(format_duration(t(), t() + Duration::seconds(5400)), "1h 30min");
    }

    #[test]
    fn rounds_to_nearest_minute() {
        assert_eq!(format_duration(t(), t() + Duration::seconds(89)), "1min");
        assert_eq!(format_duration(t(), t() + Duration::seconds(90)), "2min");
        assert_eq!(format_duration(t(), t() + Duration::seconds(29)), "0min");
    }

    #[test]
    fn remainder_rounds_up_to_sixty_minutes() {
        assert_eq!(format_duration(t(), t() + Duration::seconds(3599)), "60min");
        assert_eq!(format_duration(t(), t() + Duration::seconds(7170)), "1h 60min");
        assert_eq!(format_seconds(3599), "60min");
    }

    #[test]
    fn negative_span_is_zero() {
        assert_eq!(format_duration(t(), t() - Duration::minutes(5)), "0min");
    }

    #[test]
    fn formats_seconds() {
        assert_eq!(format_seconds(5400), "1h 30min");
        assert_eq!(format_seconds(0), "0min");
    }
}
