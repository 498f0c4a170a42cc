use crate::errors::{JournalError, JournalResult};
use chrono::{Datelike, Duration, Local, NaiveDate};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_date(value: &str) -> JournalResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| JournalError::InvalidDate(format!("expected YYYY-MM-DD, got {value:?}")))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Today according to the local wall clock, not UTC. Day boundaries follow the
/// device timezone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn today_string() -> String {
    format_date(today())
}

/// 1-based ordinal day within the date's own year, independent of any journey
/// start date.
pub fn day_of_year_index(date: NaiveDate) -> u32 {
    date.ordinal()
}

pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date + Duration::days(days)
}

pub fn is_future(date: NaiveDate) -> bool {
    date > today()
}

pub fn is_today(date: NaiveDate) -> bool {
    date == today()
}

pub fn iso_week(date: NaiveDate) -> u32 {
    date.iso_week().week()
}

pub fn format_time_remaining(ms: i64) -> String {
    if ms <= 0 {
        return "Locked".to_string();
    }
    let hours = ms / (1000 * 60 * 60);
    let minutes = (ms % (1000 * 60 * 60)) / (1000 * 60);
    if hours > 0 {
        format!("{hours}h {minutes}m remaining")
    } else {
        format!("{minutes}m remaining")
    }
}
