//! Calendar parsing helpers: ISO dates and `YYYY-MM` month filters.

use std::fmt;

use chrono::{Datelike, NaiveDate};

use super::metrics::MetricsError;

const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse an ISO `YYYY-MM-DD` calendar date.
///
/// # Examples
/// ```
/// use habit_tracker::domain::parse_date;
///
/// let date = parse_date("2024-01-15").unwrap();
/// assert_eq!(date.to_string(), "2024-01-15");
/// assert!(parse_date("15/01/2024").is_err());
/// ```
pub fn parse_date(raw: &str) -> Result<NaiveDate, MetricsError> {
    let trimmed = raw.trim();
    // chrono accepts unpadded fields; the wire format is strictly padded.
    if trimmed.len() != 10 {
        return Err(MetricsError::invalid_date(raw));
    }
    NaiveDate::parse_from_str(trimmed, ISO_DATE_FORMAT).map_err(|_| MetricsError::invalid_date(raw))
}

/// Half-open calendar month `[first_day, next_month_start)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthFilter {
    first_day: NaiveDate,
    next_month_start: NaiveDate,
}

impl MonthFilter {
    /// Build a filter for `year`/`month` (1-based).
    pub fn new(year: i32, month: u32) -> Result<Self, MetricsError> {
        let invalid = || MetricsError::invalid_month(format!("{year:04}-{month:02}"));
        if !(1..=12).contains(&month) {
            return Err(invalid());
        }
        let first_day = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let (next_year, next_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };
        let next_month_start =
            NaiveDate::from_ymd_opt(next_year, next_month, 1).ok_or_else(invalid)?;
        Ok(Self {
            first_day,
            next_month_start,
        })
    }

    /// Parse `YYYY-MM`.
    ///
    /// # Examples
    /// ```
    /// use habit_tracker::domain::MonthFilter;
    ///
    /// let march = MonthFilter::parse("2024-03").unwrap();
    /// assert_eq!(march.first_day().to_string(), "2024-03-01");
    /// assert!(MonthFilter::parse("2024-13").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, MetricsError> {
        let invalid = || MetricsError::invalid_month(raw);
        let (year, month) = raw.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }

    /// Month containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        let first_day = date.with_day(1).unwrap_or(date);
        let next_month_start = first_day
            .checked_add_months(chrono::Months::new(1))
            .unwrap_or(NaiveDate::MAX);
        Self {
            first_day,
            next_month_start,
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    /// First day of the following month (exclusive bound).
    pub fn next_month_start(&self) -> NaiveDate {
        self.next_month_start
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first_day <= date && date < self.next_month_start
    }
}

impl fmt::Display for MonthFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first_day.format("%Y-%m"))
    }
}
