use chrono::{Datelike, NaiveDate};
use thiserror::Error;

/// Month display names, indexed by `Datelike::month0` (January = 0).
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Weekday display names, indexed by `Datelike::num_days_from_monday`
/// (Monday = 0).
pub const WEEKDAY_NAMES: [&str; 7] = [
    "MONDAY",
    "TUESDAY",
    "WEDNESDAY",
    "THURSDAY",
    "FRIDAY",
    "SATURDAY",
    "SUNDAY",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported date format `{0}`, the only supported format is \"MLA\"")]
pub struct UnsupportedFormat(pub String);

/// Formats a date for display.
///
/// The only supported format is `"MLA"`, which renders as
/// `"{day} {Month}, {year}"` (for example `"5 March, 2024"`).
/// Anything else is a hard error: a silently substituted format would
/// put wrong dates into the final document.
pub fn format_date(date: NaiveDate, format: &str) -> Result<String, UnsupportedFormat> {
    match format {
        "MLA" => Ok(format!(
            "{} {}, {}",
            date.day(),
            MONTH_NAMES[date.month0() as usize],
            date.year()
        )),
        other => Err(UnsupportedFormat(other.to_string())),
    }
}

#[must_use]
pub fn week_day_name(date: NaiveDate) -> &'static str {
    WEEKDAY_NAMES[date.weekday().num_days_from_monday() as usize]
}
