use core::fmt;

use chrono::{Duration, Local, NaiveDate};
use log::debug;
use thiserror::Error;

use crate::config::{Config, UNSET_EMAIL};
use crate::time::{format_date, week_day_name, UnsupportedFormat};

/// Separator between the task list and the hours line of an entry.
const TASK_SEPARATOR: &str = "-------------------------------------------------------------------";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DocumentError {
    #[error(transparent)]
    Format(#[from] UnsupportedFormat),
    #[error("the config requires an email, but neither an override nor a default is set")]
    MissingEmail,
    #[error("the config requires time ranges for each entry, but none were given")]
    MissingTimeRanges,
    #[error("task {index} is empty")]
    InvalidTask { index: usize },
}

/// A total amount of worked hours, either a number or free text
/// (e.g. `"2.5 (approx.)"`). Whole numbers render without a fractional
/// part, so `2.0` becomes `"2"`.
#[derive(Debug, Clone, PartialEq)]
pub enum Hours {
    Count(f64),
    Text(String),
}

impl fmt::Display for Hours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(count) if count.fract() == 0.0 => write!(f, "{}", *count as i64),
            Self::Count(count) => write!(f, "{}", count),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<f64> for Hours {
    fn from(count: f64) -> Self {
        Self::Count(count)
    }
}

impl From<u32> for Hours {
    fn from(count: u32) -> Self {
        Self::Count(count.into())
    }
}

impl From<&str> for Hours {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Hours {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// A worked time span within a day, rendered as `"{start} - {end}"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRange {
    start: String,
    end: String,
}

impl TimeRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}

impl<S: Into<String>, E: Into<String>> From<(S, E)> for TimeRange {
    fn from((start, end): (S, E)) -> Self {
        Self::new(start, end)
    }
}

/// A document has exactly one header and it is written first.
/// `Written` is terminal: asking for a header again is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderState {
    Missing,
    Written,
}

/// Accumulates the timesheet text: one header, then any number of
/// dated entries. The caller hands the finished [`text`] to whatever
/// writes the file, the document itself never touches the filesystem.
///
/// [`text`]: TimesheetDocument::text
#[derive(Debug, Clone)]
pub struct TimesheetDocument<'a> {
    config: &'a Config,
    state: HeaderState,
    buffer: String,
    reference_date: Option<NaiveDate>,
}

impl<'a> TimesheetDocument<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            state: HeaderState::Missing,
            buffer: String::new(),
            reference_date: None,
        }
    }

    /// Like [`Self::new`], but with a fixed "today" instead of the
    /// system clock. Used by tests and reproducible runs.
    pub fn with_reference_date(config: &'a Config, reference_date: NaiveDate) -> Self {
        Self {
            reference_date: Some(reference_date),
            ..Self::new(config)
        }
    }

    /// The accumulated document text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// A timesheet is active once its header has been written.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == HeaderState::Written
    }

    fn today(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| Local::now().date_naive())
    }

    /// The date an entry appended right now would carry. Computed at
    /// call time, so a document kept open across midnight dates each
    /// entry correctly.
    fn entry_date(&self) -> NaiveDate {
        if self.config.entry_on_current_day {
            self.today()
        } else {
            self.today() - Duration::days(1)
        }
    }

    /// Writes the header unless one exists already, in which case this
    /// does nothing and succeeds. Entries call this defensively, so
    /// idempotence is part of the contract.
    ///
    /// `user` and `email` override `default_name` and `default_email`
    /// from the config. When the config asks for an email but neither
    /// an override nor a real default is available, this fails with
    /// [`DocumentError::MissingEmail`].
    pub fn ensure_header(
        &mut self,
        user: Option<&str>,
        email: Option<&str>,
        start_date: NaiveDate,
    ) -> Result<(), DocumentError> {
        if self.state == HeaderState::Written {
            return Ok(());
        }

        let name = user.unwrap_or(&self.config.default_name);

        let email = if self.config.include_email {
            match email {
                Some(email) => Some(email),
                None if self.config.default_email != UNSET_EMAIL => {
                    Some(self.config.default_email.as_str())
                }
                None => return Err(DocumentError::MissingEmail),
            }
        } else {
            None
        };

        let date = format_date(start_date, &self.config.date_format)?;

        let mut header = format!("Timesheet for {}", name);
        if let Some(email) = email {
            header.push_str(&format!(" ({})", email));
        }
        header.push_str(&format!(" starting on {}\n\n", date));

        debug!("writing timesheet header for `{}`", name);
        self.buffer.push_str(&header);
        self.state = HeaderState::Written;

        Ok(())
    }

    /// Appends one dated entry: a date line, the tasks in order, a
    /// separator and the hours line. The entry is rendered completely
    /// before anything is committed, so a failed append leaves the
    /// document untouched (apart from a header it may have had to
    /// write first).
    pub fn append_entry(
        &mut self,
        tasks: &[impl AsRef<str>],
        hours: impl Into<Hours>,
        time_ranges: &[TimeRange],
    ) -> Result<(), DocumentError> {
        let date = self.entry_date();

        // a header always precedes the first entry
        self.ensure_header(None, None, date)?;

        let mut entry = format_date(date, &self.config.date_format)?;
        if self.config.include_day_name {
            entry.push_str(&format!(" ({}):", week_day_name(date)));
        }
        entry.push('\n');

        for (index, task) in tasks.iter().enumerate() {
            let task = task.as_ref();
            if task.is_empty() {
                return Err(DocumentError::InvalidTask { index });
            }
            entry.push_str(task);
            entry.push('\n');
        }

        entry.push_str(TASK_SEPARATOR);
        entry.push('\n');

        entry.push_str(&format!("{} hours", hours.into()));

        if self.config.include_entry_hours {
            if time_ranges.is_empty() {
                return Err(DocumentError::MissingTimeRanges);
            }

            entry.push('(');
            for (index, range) in time_ranges.iter().enumerate() {
                if index > 0 {
                    entry.push_str(", ");
                }
                entry.push_str(&range.to_string());
            }
            entry.push(')');
        }

        entry.push_str("\n\n");

        debug!("appending entry with {} task(s)", tasks.len());
        self.buffer.push_str(&entry);

        Ok(())
    }
}
