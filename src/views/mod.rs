pub mod activity;
pub mod duration;
pub mod filter;
pub mod table;

use chrono::{FixedOffset, Local, NaiveDate, Utc};

/// The machine's current UTC offset.
pub fn local_offset() -> FixedOffset {
    *Local::now().offset()
}

/// Today's date as seen from `offset`.
pub fn today(offset: &FixedOffset) -> NaiveDate {
    activity::day_bucket(Utc::now(), offset)
}
