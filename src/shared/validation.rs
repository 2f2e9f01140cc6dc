use std::borrow::Cow;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

use crate::core::error::{AppError, Result};
use crate::shared::constants::REPORT_SLOT_MINUTES;
use crate::shared::timezone::{local_midnight, local_to_utc, CompanyTz};

lazy_static! {
    /// Calendar day: `2019-01-31`
    static ref DATE_REGEX: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();

    /// Wall-clock time without offset: `2019-01-31 10:00`, `2019-01-31T10:00:00`, optional fraction
    static ref LOCAL_DATETIME_REGEX: Regex =
        Regex::new(r"^\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}(:\d{2}(\.\d+)?)?$").unwrap();
}

/// A caller-supplied date bound, before it is placed in a timezone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateInput {
    /// Whole local day
    Date(NaiveDate),
    /// Wall-clock time in the company timezone
    Local(NaiveDateTime),
    /// Instant with an explicit offset
    Absolute(DateTime<Utc>),
}

impl DateInput {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();

        if DATE_REGEX.is_match(raw) {
            return NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(DateInput::Date);
        }

        if LOCAL_DATETIME_REGEX.is_match(raw) {
            let normalized = raw.replacen(' ', "T", 1);
            return ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(&normalized, fmt).ok())
                .map(DateInput::Local);
        }

        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| DateInput::Absolute(dt.with_timezone(&Utc)))
    }

    /// Inclusive lower bound of a window
    pub fn start_bound(&self, tz: CompanyTz) -> DateTime<Utc> {
        match *self {
            DateInput::Date(date) => local_midnight(tz, date),
            DateInput::Local(local) => local_to_utc(tz, local),
            DateInput::Absolute(at) => at,
        }
    }

    /// Exclusive upper bound of a window; a bare date covers the whole day
    pub fn end_bound(&self, tz: CompanyTz) -> DateTime<Utc> {
        match *self {
            DateInput::Date(date) => local_midnight(tz, date + Duration::days(1)),
            DateInput::Local(local) => local_to_utc(tz, local),
            DateInput::Absolute(at) => at,
        }
    }

    /// Calendar day named by the input, ignoring any time part
    pub fn date(&self) -> NaiveDate {
        match *self {
            DateInput::Date(date) => date,
            DateInput::Local(local) => local.date(),
            DateInput::Absolute(at) => at.date_naive(),
        }
    }
}

/// Half-open UTC window `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtcWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl UtcWindow {
    /// Resolve local `start_at` / `end_at` strings in `tz`.
    ///
    /// Both strings are expected to have passed [`validate_date_input`].
    /// Report time is stored per slot, so both bounds must resolve to a slot
    /// boundary in UTC; whole days always do.
    pub fn resolve(start_at: &str, end_at: &str, tz: CompanyTz) -> Result<Self> {
        let start = DateInput::parse(start_at)
            .ok_or_else(|| AppError::field("start_at", invalid_date_message("start_at")))?
            .start_bound(tz);
        let end = DateInput::parse(end_at)
            .ok_or_else(|| AppError::field("end_at", invalid_date_message("end_at")))?
            .end_bound(tz);

        for (field, bound) in [("start_at", start), ("end_at", end)] {
            if !on_slot_boundary(bound) {
                return Err(AppError::field(
                    field,
                    format!(
                        "The {} must be on a {} minute boundary.",
                        field.replace('_', " "),
                        REPORT_SLOT_MINUTES
                    ),
                ));
            }
        }

        if end < start {
            return Err(AppError::field(
                "end_at",
                "The end at must be a date after or equal to start at.",
            ));
        }

        Ok(Self { start, end })
    }

    /// The UTC calendar day containing `date`
    pub fn utc_day(date: NaiveDate) -> Self {
        let start = date.and_time(chrono::NaiveTime::MIN).and_utc();
        Self {
            start,
            end: start + Duration::days(1),
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at < self.end
    }
}

fn on_slot_boundary(at: DateTime<Utc>) -> bool {
    at.timestamp().rem_euclid(REPORT_SLOT_MINUTES * 60) == 0 && at.timestamp_subsec_nanos() == 0
}

fn invalid_date_message(field: &str) -> String {
    format!("The {} is not a valid date.", field.replace('_', " "))
}

/// `#[validate(custom)]` hook for date strings
pub fn validate_date_input(value: &str) -> std::result::Result<(), ValidationError> {
    if DateInput::parse(value).is_some() {
        Ok(())
    } else {
        Err(ValidationError::new("date").with_message(Cow::Borrowed("The value is not a valid date.")))
    }
}

/// `#[validate(custom)]` hook for id lists
pub fn validate_ids(ids: &[i64]) -> std::result::Result<(), ValidationError> {
    if ids.iter().all(|id| *id > 0) {
        Ok(())
    } else {
        Err(ValidationError::new("ids")
            .with_message(Cow::Borrowed("Every id must be a positive integer.")))
    }
}
