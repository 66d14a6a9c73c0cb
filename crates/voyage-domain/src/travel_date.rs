//! Travel date helpers
//!
//! Dates travel through the dialogue as `dd.mm.yyyy` strings and are turned
//! into calendar dates only when a route is resolved.

use chrono::NaiveDate;
use std::fmt;

/// Format used for dates held in [`crate::TravelEntities`]
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// Format expected by the route search endpoint
pub const API_DATE_FORMAT: &str = "%Y-%m-%d";

/// Earliest accepted year
pub const MIN_YEAR: i32 = 2000;

/// Latest accepted year
pub const MAX_YEAR: i32 = 2100;

/// A stored date string that is not a real calendar date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateNormalizationError {
    /// The offending input
    pub input: String,
}

impl fmt::Display for DateNormalizationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot interpret '{}' as a dd.mm.yyyy date", self.input)
    }
}

impl std::error::Error for DateNormalizationError {}

/// Render day, month and year as `dd.mm.yyyy`
///
/// Two-digit years are expanded with a `20` prefix. Returns `None` when the
/// day is outside 1..=31, the month outside 1..=12 or the year outside
/// 2000..=2100. Month lengths are not checked here; that happens in
/// [`parse_travel_date`].
///
/// # Examples
///
/// ```
/// use voyage_domain::travel_date::format_parts;
///
/// assert_eq!(format_parts(1, 5, 25), Some("01.05.2025".to_string()));
/// assert_eq!(format_parts(32, 13, 2025), None);
/// ```
pub fn format_parts(day: u32, month: u32, year: i32) -> Option<String> {
    let year = if (0..100).contains(&year) { 2000 + year } else { year };
    if !(1..=31).contains(&day) || !(1..=12).contains(&month) {
        return None;
    }
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return None;
    }
    Some(format!("{:02}.{:02}.{}", day, month, year))
}

/// Render a calendar date as `dd.mm.yyyy`
pub fn format_travel_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a stored `dd.mm.yyyy` date into a calendar date
pub fn parse_travel_date(input: &str) -> Result<NaiveDate, DateNormalizationError> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).map_err(|_| DateNormalizationError {
        input: input.to_string(),
    })
}

/// Render a calendar date the way the route search endpoint expects it
pub fn api_date(date: NaiveDate) -> String {
    date.format(API_DATE_FORMAT).to_string()
}
