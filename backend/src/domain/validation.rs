//! Field predicates shared by every inbound adapter.
//!
//! Each predicate checks one field and yields a [`FieldViolation`] naming it.
//! Composite validators run predicates in declaration order and stop at the
//! first violation, so callers always see a single offending field.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::json;

use super::{
    DEFAULT_HABIT_COLOR, DEFAULT_TARGET_DAYS, Error, HABIT_NAME_MAX, MonthFilter, NewHabit, UserId,
    parse_date,
};

/// Machine-readable reason attached to a [`FieldViolation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationCode {
    MissingField,
    Empty,
    TooLong,
    NotPositive,
    OutOfRange,
    InvalidColor,
    InvalidDate,
    InvalidMonth,
    InvalidId,
    InvalidType,
}

impl ViolationCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::Empty => "empty",
            Self::TooLong => "too_long",
            Self::NotPositive => "not_positive",
            Self::OutOfRange => "out_of_range",
            Self::InvalidColor => "invalid_color",
            Self::InvalidDate => "invalid_date",
            Self::InvalidMonth => "invalid_month",
            Self::InvalidId => "invalid_id",
            Self::InvalidType => "invalid_type",
        }
    }
}

/// The first field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct FieldViolation {
    field: &'static str,
    code: ViolationCode,
    message: String,
    value: Option<String>,
}

impl FieldViolation {
    pub fn new(field: &'static str, code: ViolationCode, message: impl Into<String>) -> Self {
        Self {
            field,
            code,
            message: message.into(),
            value: None,
        }
    }

    /// Echo the rejected input back to the caller.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn code(&self) -> ViolationCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<FieldViolation> for Error {
    fn from(violation: FieldViolation) -> Self {
        let details = match &violation.value {
            Some(value) => json!({
                "field": violation.field,
                "code": violation.code.as_str(),
                "value": value,
            }),
            None => json!({
                "field": violation.field,
                "code": violation.code.as_str(),
            }),
        };
        Error::invalid_request(violation.message)
            .with_field(violation.field)
            .with_details(details)
    }
}

/// Unwrap a required value.
pub fn require<T>(value: Option<T>, field: &'static str) -> Result<T, FieldViolation> {
    value.ok_or_else(|| {
        FieldViolation::new(
            field,
            ViolationCode::MissingField,
            format!("missing required field: {field}"),
        )
    })
}

/// Trim `value` and require it to be non-empty and at most `max` characters.
pub fn non_empty(value: &str, field: &'static str, max: usize) -> Result<String, FieldViolation> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FieldViolation::new(
            field,
            ViolationCode::Empty,
            format!("{field} must not be empty"),
        ));
    }
    if trimmed.chars().count() > max {
        return Err(FieldViolation::new(
            field,
            ViolationCode::TooLong,
            format!("{field} must be at most {max} characters"),
        ));
    }
    Ok(trimmed.to_owned())
}

/// Require a strictly positive integer that fits an `i32`.
pub fn positive_int(value: i64, field: &'static str) -> Result<i32, FieldViolation> {
    if value <= 0 {
        return Err(FieldViolation::new(
            field,
            ViolationCode::NotPositive,
            format!("{field} must be a positive integer"),
        )
        .with_value(value.to_string()));
    }
    i32::try_from(value).map_err(|_| {
        FieldViolation::new(
            field,
            ViolationCode::OutOfRange,
            format!("{field} must be at most {}", i32::MAX),
        )
        .with_value(value.to_string())
    })
}

static HEX_COLOR_RE: OnceLock<Regex> = OnceLock::new();

fn hex_color_regex() -> &'static Regex {
    HEX_COLOR_RE.get_or_init(|| {
        Regex::new("^#([0-9A-Fa-f]{3}|[0-9A-Fa-f]{6})$")
            .unwrap_or_else(|error| panic!("hex colour regex failed to compile: {error}"))
    })
}

/// Require a `#RGB` or `#RRGGBB` colour.
pub fn hex_color(value: &str, field: &'static str) -> Result<String, FieldViolation> {
    let trimmed = value.trim();
    if hex_color_regex().is_match(trimmed) {
        Ok(trimmed.to_owned())
    } else {
        Err(FieldViolation::new(
            field,
            ViolationCode::InvalidColor,
            format!("{field} must be a hex colour such as #4F46E5"),
        )
        .with_value(value))
    }
}

/// Require an ISO `YYYY-MM-DD` date.
pub fn iso_date(value: &str, field: &'static str) -> Result<NaiveDate, FieldViolation> {
    parse_date(value).map_err(|_| {
        FieldViolation::new(
            field,
            ViolationCode::InvalidDate,
            format!("{field} must be a date formatted YYYY-MM-DD"),
        )
        .with_value(value)
    })
}

/// Require a `YYYY-MM` month.
pub fn year_month(value: &str, field: &'static str) -> Result<MonthFilter, FieldViolation> {
    MonthFilter::parse(value).map_err(|_| {
        FieldViolation::new(
            field,
            ViolationCode::InvalidMonth,
            format!("{field} must be a month formatted YYYY-MM"),
        )
        .with_value(value)
    })
}

/// Unvalidated habit fields as received from a client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HabitDraft {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub target_days: Option<i64>,
}

/// Validate a draft for `user_id`, applying colour and target defaults.
///
/// Fields are checked in the order name, color, targetDays. A blank
/// description is stored as absent.
///
/// # Examples
/// ```
/// use habit_tracker::domain::{validation::{new_habit, HabitDraft}, UserId};
///
/// let draft = HabitDraft { name: Some(" Read ".into()), ..HabitDraft::default() };
/// let habit = new_habit(UserId::new("u1").unwrap(), draft).unwrap();
/// assert_eq!(habit.name, "Read");
/// assert_eq!(habit.target_days, 30);
/// ```
pub fn new_habit(user_id: UserId, draft: HabitDraft) -> Result<NewHabit, FieldViolation> {
    let name = non_empty(&require(draft.name, "name")?, "name", HABIT_NAME_MAX)?;
    let color = match draft.color {
        Some(raw) => hex_color(&raw, "color")?,
        None => DEFAULT_HABIT_COLOR.to_owned(),
    };
    let target_days = match draft.target_days {
        Some(raw) => positive_int(raw, "targetDays")?,
        None => DEFAULT_TARGET_DAYS,
    };
    let description = draft
        .description
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty());

    Ok(NewHabit {
        user_id,
        name,
        description,
        color,
        target_days,
    })
}
