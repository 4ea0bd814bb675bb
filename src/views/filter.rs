use std::{fmt, str::FromStr};

use chrono::{Days, FixedOffset, NaiveDate};

use crate::{models::session::Session, views::activity::day_bucket};

/// Which days the session table shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayFilter {
    Today,
    Yesterday,
    #[default]
    All,
}

impl FromStr for DayFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "today" => Ok(DayFilter::Today),
            "yesterday" => Ok(DayFilter::Yesterday),
            "all" => Ok(DayFilter::All),
            other => Err(format!(
                "unknown filter '{}' (expected today, yesterday or all)",
                other
            )),
        }
    }
}

impl fmt::Display for DayFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DayFilter::Today => "today",
            DayFilter::Yesterday => "yesterday",
            DayFilter::All => "all",
        })
    }
}

/// Keeps the sessions whose start falls on the selected day, as seen from
/// `offset`. `DayFilter::All` returns the input unchanged.
pub fn filter_by_day(
    sessions: &[Session],
    mode: DayFilter,
    today: NaiveDate,
    offset: &FixedOffset,
) -> Vec<Session> {
    let day = match mode {
        DayFilter::All => return sessions.to_vec(),
        DayFilter::Today => today,
        DayFilter::Yesterday => match today.checked_sub_days(Days::new(1)) {
            Some(day) => day,
            None => return Vec::new(),
        },
    };

    sessions
        .iter()
        .filter(|s| day_bucket(s.start, offset) == day)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn session(id: i64, start: DateTime<Utc>) -> Session {
        Session {
            id,
            start,
            end: None,
            focused: None,
            tag: "Work".into(),
            description: format!("block {}", id),
        }
    }

    fn sessions() -> Vec<Session> {
        vec![
            session(4, Utc.with_ymd_and_hms(2024, 6, 3, 23, 30, 0).unwrap()),
            session(3, Utc.with_ymd_and_hms(2024, 6, 3, 8, 0, 0).unwrap()),
            session(2, Utc.with_ymd_and_hms(2024, 6, 2, 12, 0, 0).unwrap()),
            session(1, Utc.with_ymd_and_hms(2024, 5, 30, 12, 0, 0).unwrap()),
        ]
    }

    fn ids(sessions: &[Session]) -> Vec<i64> {
        sessions.iter().map(|s| s.id).collect()
    }

    #[test]
    fn all_is_identity() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        assert_eq!(filter_by_day(&sessions(), DayFilter::All, today, &utc), sessions());
    }

    #[test]
    fn today_and_yesterday_in_utc() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        assert_eq!(ids(&filter_by_day(&sessions(), DayFilter::Today, today, &utc)), vec![4, 3]);
        assert_eq!(ids(&filter_by_day(&sessions(), DayFilter::Yesterday, today, &utc)), vec![2]);
    }

    #[test]
    fn offset_moves_late_sessions_to_the_next_day() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 6, 4).unwrap();
        // 23:30 UTC on the 3rd is 01:30 on the 4th at UTC+2
        assert_eq!(ids(&filter_by_day(&sessions(), DayFilter::Today, today, &plus_two)), vec![4]);
        assert_eq!(ids(&filter_by_day(&sessions(), DayFilter::Yesterday, today, &plus_two)), vec![3]);
    }

    #[test]
    fn parses_filter_names() {
        assert_eq!("Today".parse::<DayFilter>(), Ok(DayFilter::Today));
        assert_eq!("yesterday".parse::<DayFilter>(), Ok(DayFilter::Yesterday));
        assert_eq!("all".parse::<DayFilter>(), Ok(DayFilter::All));
        assert!("week".parse::<DayFilter>().is_err());
    }
}
