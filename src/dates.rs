//! Calendar-day helpers. Entries carry their day as a `yyyy-MM-dd` string.

use chrono::{Datelike, Local, NaiveDate};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn parse_entry_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

pub fn format_entry_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Short heading for a day: `Today 4.16` or `Thu 4.10`.
///
/// Strings that are not valid dates are returned unchanged.
pub fn format_date_label(value: &str, today: NaiveDate) -> String {
    match parse_entry_date(value) {
        Some(date) if date == today => format!("Today {}.{}", date.month(), date.day()),
        Some(date) => format!("{} {}.{}", date.format("%a"), date.month(), date.day()),
        None => value.to_string(),
    }
}
