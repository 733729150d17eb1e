//! Request parsing helpers shared by the HTTP handlers.
//!
//! Wire names are camelCase, so field names passed to the domain predicates
//! use the JSON spelling (`targetDays`), not the Rust one.

use chrono::NaiveDate;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::domain::validation::{FieldViolation, ViolationCode, iso_date, require, year_month};
use crate::domain::{Error, HabitId, MonthFilter};

/// Newtype for wire field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) const fn as_str(self) -> &'static str {
        self.0
    }
}

pub(crate) const ID: FieldName = FieldName::new("id");
pub(crate) const NAME: FieldName = FieldName::new("name");
pub(crate) const DESCRIPTION: FieldName = FieldName::new("description");
pub(crate) const COLOR: FieldName = FieldName::new("color");
pub(crate) const TARGET_DAYS: FieldName = FieldName::new("targetDays");
pub(crate) const DATE: FieldName = FieldName::new("date");
pub(crate) const COMPLETED: FieldName = FieldName::new("completed");
pub(crate) const NOTES: FieldName = FieldName::new("notes");
pub(crate) const MONTH: FieldName = FieldName::new("month");
pub(crate) const TODAY: FieldName = FieldName::new("today");

/// Path ids are positive; anything else cannot name a habit.
pub(crate) fn parse_habit_id(raw: i64) -> Result<HabitId, Error> {
    i32::try_from(raw)
        .ok()
        .filter(|id| *id > 0)
        .map(HabitId::new)
        .ok_or_else(|| {
            FieldViolation::new(
                ID.as_str(),
                ViolationCode::InvalidId,
                "id must be a positive integer",
            )
            .with_value(raw.to_string())
            .into()
        })
}

/// A JSON object body, decoded one member at a time so a mistyped member is
/// reported by name.
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct JsonObject(Map<String, Value>);

impl JsonObject {
    /// Remove and decode `field`. Absent and `null` members are `None`.
    pub(crate) fn take<T: DeserializeOwned>(&mut self, field: FieldName) -> Result<Option<T>, Error> {
        match self.0.remove(field.as_str()) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value).map(Some).map_err(|err| {
                FieldViolation::new(
                    field.as_str(),
                    ViolationCode::InvalidType,
                    format!("{} has the wrong type: {err}", field.as_str()),
                )
                .into()
            }),
        }
    }
}

pub(crate) fn parse_required_date(value: Option<String>, field: FieldName) -> Result<NaiveDate, Error> {
    let raw = require(value, field.as_str())?;
    Ok(iso_date(&raw, field.as_str())?)
}

pub(crate) fn parse_optional_date(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<NaiveDate>, Error> {
    value
        .map(|raw| iso_date(&raw, field.as_str()).map_err(Error::from))
        .transpose()
}

pub(crate) fn parse_optional_month(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<MonthFilter>, Error> {
    value
        .map(|raw| year_month(&raw, field.as_str()).map_err(Error::from))
        .transpose()
}
