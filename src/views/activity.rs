use std::{collections::BTreeMap, fmt::Write};

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};

use crate::{models::session::Session, views::duration::format_seconds};

/// Highest shading level of the heatmap.
pub const MAX_INTENSITY: u8 = 4;

const SHADES: [char; 5] = ['·', '░', '▒', '▓', '█'];
const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Calendar date of `ts` in the given fixed offset.
pub fn day_bucket(ts: DateTime<Utc>, offset: &FixedOffset) -> NaiveDate {
    ts.with_timezone(offset).date_naive()
}

/// Heatmap level for a number of sessions on one day, `0..=MAX_INTENSITY`.
pub fn intensity_level(count: usize) -> u8 {
    count.min(MAX_INTENSITY as usize) as u8
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayActivity {
    pub count: usize,
    pub focused_seconds: i64,
    pub level: u8,
}

/// Sessions grouped per calendar day.
#[derive(Debug, Clone, Default)]
pub struct ActivityCalendar {
    days: BTreeMap<NaiveDate, DayActivity>,
}

impl ActivityCalendar {
    pub fn from_sessions(sessions: &[Session], offset: &FixedOffset) -> Self {
        let mut days: BTreeMap<NaiveDate, DayActivity> = BTreeMap::new();
        for session in sessions {
            let day = days.entry(day_bucket(session.start, offset)).or_default();
            day.count += 1;
            day.focused_seconds += session.focused.unwrap_or(0);
        }
        for day in days.values_mut() {
            day.level = intensity_level(day.count);
        }
        Self { days }
    }

    /// Activity on `day`; empty days read as zero.
    pub fn get(&self, day: NaiveDate) -> DayActivity {
        self.days.get(&day).copied().unwrap_or_default()
    }

    pub fn days(&self) -> impl Iterator<Item = (&NaiveDate, &DayActivity)> {
        self.days.iter()
    }

    /// One line per day from `from` to `to`, inclusive.
    pub fn render(&self, from: NaiveDate, to: NaiveDate) -> String {
        let mut out = String::new();
        for day in from.iter_days().take_while(|d| *d <= to) {
            let activity = self.get(day);
            let shade = SHADES[activity.level as usize];
            let _ = writeln!(
                out,
                "{} {} {} {:>2}  {}",
                day,
                WEEKDAYS[day.weekday().num_days_from_monday() as usize],
                std::iter::repeat_n(shade, 4).collect::<String>(),
                activity.count,
                format_seconds(activity.focused_seconds),
            );
        }
        out
    }
}

/// Wall-clock hours of completed sessions per weekday, Monday first.
pub fn weekly_hours(sessions: &[Session], offset: &FixedOffset) -> [f64; 7] {
    let mut hours = [0.0; 7];
    for session in sessions {
        let Some(seconds) = session.wall_clock_seconds() else {
            continue;
        };
        let weekday = session.start.with_timezone(offset).weekday();
        hours[weekday.num_days_from_monday() as usize] += seconds as f64 / 3600.0;
    }
    hours
}

pub fn render_weekly(hours: &[f64; 7]) -> String {
    let mut out = String::new();
    for (name, value) in WEEKDAYS.iter().zip(hours) {
        let _ = writeln!(out, "{} {:>5.1}h", name, value);
    }
    out
}
