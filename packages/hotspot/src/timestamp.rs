//! Combined date/time parsing.
//!
//! The accident table stores the date (`01/11/2016`) and the clock time
//! (`17:42`) in separate columns. They are joined as
//! `"{date} {time}:00"` and parsed into a single [`NaiveDateTime`].

use chrono::NaiveDateTime;

use crate::HotspotError;

/// Accepted layouts for the combined string. Dates are day-first, as
/// published; ISO dates are accepted as well.
const FORMATS: &[&str] = &["%d/%m/%Y %H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Joins the date and time columns into one timestamp string.
#[must_use]
pub fn combine(date: &str, time: &str) -> String {
    format!("{date} {time}:00")
}

/// Parses the date and time columns of one accident.
///
/// # Errors
///
/// Returns [`HotspotError::Timestamp`] if the combined string matches none
/// of the accepted layouts.
pub fn parse_timestamp(date: &str, time: &str) -> Result<NaiveDateTime, HotspotError> {
    let combined = combine(date.trim(), time.trim());

    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&combined, fmt).ok())
        .ok_or(HotspotError::Timestamp { value: combined })
}
