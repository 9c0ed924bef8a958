//! # Date-Range Resolver
//!
//! Turns optional day/week/month/year selectors into a half-open
//! `[start, end)` interval on the "issued" timestamp.
//!
//! ## Resolution Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  month  year  day  week      Result                                     │
//! │  ─────  ────  ───  ────      ──────────────────────────────────────     │
//! │   -      -     *    *        no interval (all records)                  │
//! │   ✓      -     *    *        InvalidQuery                               │
//! │   -      ✓     *    *        InvalidQuery                               │
//! │   ✓      ✓     ✓    *        [day, day + 1)                             │
//! │   ✓      ✓     -    ✓        [(w-1)*7 + 1, w*7 + 1)   w in 1..=4        │
//! │   ✓      ✓     -    -        [1st of month, 1st of next month)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Weeks are fixed 7-day blocks starting on the 1st, 8th, 15th and 22nd.
//! Days 29-31 are not covered by any week. Every boundary is midnight UTC.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

use super::schema::SearchQuery;

/// Query parameter names read by [`DateRangeQuery::from_search`].
pub const DAY_PARAM: &str = "date";
pub const DAY_PARAM_ALIAS: &str = "day";
pub const WEEK_PARAM: &str = "week";
pub const MONTH_PARAM: &str = "month";
pub const YEAR_PARAM: &str = "year";

// =============================================================================
// Date Interval
// =============================================================================

/// Half-open timestamp interval, `start <= t < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DateInterval {
    #[ts(as = "String")]
    pub start: DateTime<Utc>,
    #[ts(as = "String")]
    pub end: DateTime<Utc>,
}

impl DateInterval {
    /// Returns `None` unless `start < end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        (start < end).then_some(DateInterval { start, end })
    }
}

// =============================================================================
// Date Range Query
// =============================================================================

/// Optional calendar selectors for a report.
///
/// Values are kept as raw integers so out-of-range input reaches the
/// resolver and is rejected with a message instead of failing to parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DateRangeQuery {
    #[ts(type = "number | null")]
    pub day: Option<i64>,
    #[ts(type = "number | null")]
    pub week: Option<i64>,
    #[ts(type = "number | null")]
    pub month: Option<i64>,
    #[ts(type = "number | null")]
    pub year: Option<i64>,
}

impl DateRangeQuery {
    /// Reads the selectors from request parameters.
    ///
    /// `date` takes precedence over its alias `day`. Empty values count as
    /// absent; anything else must be a whole number.
    pub fn from_search(query: &SearchQuery) -> CoreResult<Self> {
        let day = match whole_number(query, DAY_PARAM)? {
            Some(day) => Some(day),
            None => whole_number(query, DAY_PARAM_ALIAS)?,
        };

        Ok(DateRangeQuery {
            day,
            week: whole_number(query, WEEK_PARAM)?,
            month: whole_number(query, MONTH_PARAM)?,
            year: whole_number(query, YEAR_PARAM)?,
        })
    }

    /// Computes the interval, or `None` when neither month nor year is given.
    ///
    /// ```rust
    /// use garage_core::query::DateRangeQuery;
    ///
    /// let march = DateRangeQuery { month: Some(3), year: Some(2024), ..Default::default() };
    /// let interval = march.resolve().unwrap().unwrap();
    /// assert_eq!(interval.end.to_rfc3339(), "2024-04-01T00:00:00+00:00");
    ///
    /// assert!(DateRangeQuery::default().resolve().unwrap().is_none());
    /// ```
    pub fn resolve(&self) -> CoreResult<Option<DateInterval>> {
        let (month, year) = match (self.month, self.year) {
            (None, None) => return Ok(None),
            (Some(month), Some(year)) => (month, year),
            _ => {
                return Err(CoreError::invalid_query(
                    "month and year are both required for date or week filtering",
                ))
            }
        };

        let first = first_of_month(year, month)?;

        let (start, end) = if let Some(day) = self.day {
            let start = day
                .checked_sub(1)
                .and_then(|offset| offset_days(first, offset))
                .filter(|d| d.month() == first.month() && d.year() == first.year())
                .ok_or_else(|| CoreError::invalid_query("invalid date for the given month"))?;
            let end = start
                .checked_add_days(Days::new(1))
                .ok_or_else(|| CoreError::invalid_query("invalid date for the given month"))?;
            (start, end)
        } else if let Some(week) = self.week {
            if !(1..=4).contains(&week) {
                return Err(CoreError::invalid_query("week must be between 1 and 4"));
            }
            let start = offset_days(first, (week - 1) * 7)
                .filter(|d| d.month() == first.month())
                .ok_or_else(|| CoreError::invalid_query("invalid week for the given month"))?;
            let end = offset_days(first, week * 7)
                .ok_or_else(|| CoreError::invalid_query("invalid week for the given month"))?;
            (start, end)
        } else {
            let end = first
                .checked_add_months(Months::new(1))
                .ok_or_else(|| CoreError::invalid_query("year is out of range"))?;
            (first, end)
        };

        Ok(DateInterval::new(midnight(start), midnight(end)))
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn whole_number(query: &SearchQuery, param: &str) -> CoreResult<Option<i64>> {
    match query.param(param).map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse::<i64>()
            .map(Some)
            .map_err(|_| CoreError::invalid_query(format!("{param} must be a whole number"))),
    }
}

fn first_of_month(year: i64, month: i64) -> CoreResult<NaiveDate> {
    if !(1..=12).contains(&month) {
        return Err(CoreError::invalid_query("month must be between 1 and 12"));
    }
    let year = i32::try_from(year).map_err(|_| CoreError::invalid_query("year is out of range"))?;
    // month is 1..=12 here
    NaiveDate::from_ymd_opt(year, month as u32, 1)
        .ok_or_else(|| CoreError::invalid_query("year is out of range"))
}

/// `date + days`, or `None` on overflow or a negative offset.
fn offset_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    let days = u64::try_from(days).ok()?;
    date.checked_add_days(Days::new(days))
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

// =============================================================================
// Unit Tests
// =============================================================================
