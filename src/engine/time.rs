use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::ShopHours;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Opening time used when a shop's `open` value cannot be parsed (09:00)
pub const DEFAULT_OPEN_MINUTES: u32 = 9 * 60;

/// Closing time used when a shop's `close` value cannot be parsed (18:00)
pub const DEFAULT_CLOSE_MINUTES: u32 = 18 * 60;

/// Sentinel close value meaning "until midnight"
pub const END_OF_DAY: &str = "24:00";

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Days per calendar grid row; column 0 is Sunday
pub const DAYS_PER_WEEK: u32 = 7;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed {kind}: {value:?}")]
pub struct FormatError {
    pub kind: &'static str,
    pub value: String,
}

impl FormatError {
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// Parse a 24-hour `H:mm` / `HH:mm` clock string into minutes since midnight.
///
/// Hours run 0..=23. `24:00` is not a clock time; see [`close_offset_minutes`].
pub fn parse_clock(value: &str) -> Result<u32, FormatError> {
    let malformed = || FormatError::new("clock time", value);

    let (hours, minutes) = value.trim().split_once(':').ok_or_else(malformed)?;

    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !digits(hours) || hours.len() > 2 || !digits(minutes) || minutes.len() != 2 {
        return Err(malformed());
    }

    let hours: u32 = hours.parse().map_err(|_| malformed())?;
    let minutes: u32 = minutes.parse().map_err(|_| malformed())?;

    if hours > 23 || minutes > 59 {
        return Err(malformed());
    }

    Ok(hours * 60 + minutes)
}

/// Format minutes since midnight as `HH:mm`
pub fn format_clock_24h(minutes: u32) -> String {
    let hours = (minutes / 60).min(23);
    format!("{:02}:{:02}", hours, minutes % 60)
}

/// Format minutes since midnight as `h:mm AM/PM`.
///
/// Total: the hour is clamped into 0..=23 before formatting.
pub fn format_clock_12h(minutes: u32) -> String {
    let hours = (minutes / 60).min(23);
    let period = if hours >= 12 { "PM" } else { "AM" };
    let display_hours = match hours {
        0 => 12,
        h if h > 12 => h - 12,
        h => h,
    };
    format!("{}:{:02} {}", display_hours, minutes % 60, period)
}

/// Resolve a shop's closing value to minutes since midnight.
///
/// `24:00` means end of day. A close at or before `open` collapses the
/// window to zero length instead of failing.
pub fn close_offset_minutes(open: u32, close: &str) -> Result<u32, FormatError> {
    let close = if close.trim() == END_OF_DAY {
        MINUTES_PER_DAY
    } else {
        parse_clock(close)?
    };

    Ok(close.max(open))
}

/// Half-open `[open, close)` range of minutes a shop takes bookings in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpeningWindow {
    pub open: u32,
    pub close: u32,
}

impl OpeningWindow {
    /// Build the window from stored hours, falling back to 09:00/18:00 for
    /// any value that does not parse.
    pub fn from_hours(hours: &ShopHours) -> Self {
        let open = parse_clock(&hours.open).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Unparsable opening time, falling back to 09:00");
            DEFAULT_OPEN_MINUTES
        });

        let close = close_offset_minutes(open, &hours.close).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Unparsable closing time, falling back to 18:00");
            DEFAULT_CLOSE_MINUTES.max(open)
        });

        Self { open, close }
    }

    pub fn is_empty(&self) -> bool {
        self.close <= self.open
    }

    pub fn len_minutes(&self) -> u32 {
        self.close.saturating_sub(self.open)
    }
}

/// Parse a strict `YYYY-MM-DD` date
pub fn parse_date(value: &str) -> Result<NaiveDate, FormatError> {
    let value = value.trim();
    if value.len() != 10 {
        return Err(FormatError::new("date", value));
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| FormatError::new("date", value))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Column of `date` in a Sunday-first week grid
pub fn weekday_column(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_sunday()
}

/// A calendar month, serialized as `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    first: NaiveDate,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, FormatError> {
        if !(1..=9998).contains(&year) {
            return Err(FormatError::new("month", format!("{year}-{month:02}")));
        }
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first| Self { first })
            .ok_or_else(|| FormatError::new("month", format!("{year}-{month:02}")))
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn days_in_month(&self) -> u32 {
        self.first
            .checked_add_months(Months::new(1))
            .map(|next| next.signed_duration_since(self.first).num_days() as u32)
            .unwrap_or(31)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }

    /// Sunday on or before the first of the month; cell 0 of the grid
    pub fn grid_start(&self) -> NaiveDate {
        self.first - Days::new(u64::from(weekday_column(self.first)))
    }

    /// Date shown in grid cell `index`
    pub fn cell_date(&self, index: usize) -> NaiveDate {
        self.grid_start() + Days::new(index as u64)
    }

    /// Grid cell showing `date`, if it falls inside the 42-cell grid
    pub fn cell_index(&self, date: NaiveDate) -> Option<usize> {
        let offset = date.signed_duration_since(self.grid_start()).num_days();
        (0..42).contains(&offset).then_some(offset as usize)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for YearMonth {
    type Err = FormatError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let malformed = || FormatError::new("month", value);
        let (year, month) = value.trim().split_once('-').ok_or_else(malformed)?;
        if year.len() != 4 || month.is_empty() || month.len() > 2 {
            return Err(malformed());
        }
        let year: i32 = year.parse().map_err(|_| malformed())?;
        let month: u32 = month.parse().map_err(|_| malformed())?;
        Self::new(year, month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
