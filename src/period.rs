//! Calendar-period resolution.
//!
//! Parses period identifiers like `2023`, `2023-05`, `2023-Q1`, `2023-W22`,
//! `YTD`, and `MTD` into inclusive date ranges. Pure and deterministic:
//! "today" is an explicit argument so the relative forms are testable.

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use tracing::debug;

use crate::errors::{AnalyticsError, AnalyticsResult};
use crate::models::PeriodRange;

/// Resolves a period identifier into an inclusive `[start, end]` range.
///
/// Unrecognized identifiers fail with a validation error.
pub fn resolve(period_id: &str, today: NaiveDate) -> AnalyticsResult<PeriodRange> {
    let range = if let Some((year, quarter)) = split_tagged(period_id, "-Q") {
        resolve_quarter(year, quarter)?
    } else if let Some((year, week)) = split_tagged(period_id, "-W") {
        resolve_week(year, week)?
    } else if period_id.len() == 7 && period_id.as_bytes()[4] == b'-' {
        resolve_month(period_id)?
    } else if period_id.len() == 4 {
        resolve_year(period_id)?
    } else if period_id == "YTD" {
        PeriodRange::new(ymd(today.year(), 1, 1)?, today)?
    } else if period_id == "MTD" {
        PeriodRange::new(ymd(today.year(), today.month(), 1)?, today)?
    } else {
        return Err(invalid(period_id));
    };

    debug!(period_id, start = %range.start, end = %range.end, "resolved period");
    Ok(range)
}

fn invalid(period_id: &str) -> AnalyticsError {
    AnalyticsError::validation(format!("Invalid period identifier: {period_id}"))
}

/// Splits `2023-Q1`-style identifiers into the year and the number after
/// the tag. Returns `None` when the tag is absent.
fn split_tagged(period_id: &str, tag: &str) -> Option<(i32, u32)> {
    let (year, rest) = period_id.split_once(tag)?;
    let year = year.parse().ok()?;
    let number = rest.parse().ok()?;
    Some((year, number))
}

fn ymd(year: i32, month: u32, day: u32) -> AnalyticsResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        AnalyticsError::validation(format!("Invalid calendar date: {year}-{month:02}-{day:02}"))
    })
}

fn resolve_year(period_id: &str) -> AnalyticsResult<PeriodRange> {
    let year: i32 = period_id.parse().map_err(|_| invalid(period_id))?;
    PeriodRange::new(ymd(year, 1, 1)?, ymd(year, 12, 31)?)
}

fn resolve_month(period_id: &str) -> AnalyticsResult<PeriodRange> {
    let (year, month) = period_id.split_once('-').ok_or_else(|| invalid(period_id))?;
    let year: i32 = year.parse().map_err(|_| invalid(period_id))?;
    let month: u32 = month.parse().map_err(|_| invalid(period_id))?;
    let start = ymd(year, month, 1)?;
    let end = start + Months::new(1) - Days::new(1);
    PeriodRange::new(start, end)
}

fn resolve_quarter(year: i32, quarter: u32) -> AnalyticsResult<PeriodRange> {
    if !(1..=4).contains(&quarter) {
        return Err(AnalyticsError::validation(format!(
            "Invalid quarter: {quarter}. Valid values are 1 through 4"
        )));
    }
    let start = ymd(year, (quarter - 1) * 3 + 1, 1)?;
    let end = start + Months::new(3) - Days::new(1);
    PeriodRange::new(start, end)
}

/// Week numbering anchored at the week containing January 1st, with weeks
/// starting on Monday. When January 1st falls after Monday the first week
/// starts in the previous calendar year.
fn resolve_week(year: i32, week: u32) -> AnalyticsResult<PeriodRange> {
    if !(1..=53).contains(&week) {
        return Err(AnalyticsError::validation(format!(
            "Invalid week number: {week}. Valid values are 1 through 53"
        )));
    }
    let jan1 = ymd(year, 1, 1)?;
    let mut offset = Weekday::Mon.num_days_from_sunday() as i64
        - jan1.weekday().num_days_from_sunday() as i64;
    if offset > 0 {
        offset -= 7;
    }
    let first_week = jan1 + chrono::Duration::days(offset);
    let start = first_week + chrono::Duration::days((week as i64 - 1) * 7);
    let end = start + chrono::Duration::days(6);
    PeriodRange::new(start, end)
}
