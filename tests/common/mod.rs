use chrono::NaiveDate;

use tcup::config::ConfigDefaults;

/// Defaults with a real name and email, so headers can be written
/// without per-call overrides.
#[must_use]
pub fn make_defaults() -> ConfigDefaults {
    ConfigDefaults {
        default_name: "Ada Lovelace".to_string(),
        default_email: "ada@example.com".to_string(),
        ..ConfigDefaults::default()
    }
}

#[must_use]
#[allow(dead_code)]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}
