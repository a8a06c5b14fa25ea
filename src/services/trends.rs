//! Trend analysis: a metric's recent time series plus an optional
//! comparison series from an earlier window.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{info, instrument};

use crate::catalog::MetricCatalog;
use crate::errors::{AnalyticsError, AnalyticsResult};
use crate::models::{PeriodRange, TrendPoint};
use crate::repositories::MetricSource;

/// Granularity of a trend window.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TimeFrame {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl TimeFrame {
    pub fn parse(s: &str) -> AnalyticsResult<Self> {
        Self::from_str(s).map_err(|_| {
            AnalyticsError::validation(format!(
                "Invalid time frame: {s}. Valid values are: day, week, month, quarter, year"
            ))
        })
    }

    /// Number of points a trend at this granularity carries.
    pub fn point_count(&self) -> u32 {
        match self {
            TimeFrame::Day => 30,
            TimeFrame::Week => 12,
            TimeFrame::Month => 12,
            TimeFrame::Quarter => 8,
            TimeFrame::Year => 5,
        }
    }

    /// Fixed day length used for previous-period comparisons. A calendar
    /// approximation kept on purpose; months are 30 days, years 365.
    pub fn period_length_days(&self) -> u64 {
        match self {
            TimeFrame::Day => 1,
            TimeFrame::Week => 7,
            TimeFrame::Month => 30,
            TimeFrame::Quarter => 90,
            TimeFrame::Year => 365,
        }
    }

    /// Window of `point_count` buckets ending at `today`.
    fn window(&self, today: NaiveDate) -> PeriodRange {
        let n = self.point_count();
        let start = match self {
            TimeFrame::Day => today - Days::new(u64::from(n) - 1),
            TimeFrame::Week => today - Days::new(u64::from(n - 1) * 7),
            TimeFrame::Month => first_of_month(today - Months::new(n - 1)),
            TimeFrame::Quarter => first_of_quarter(today - Months::new((n - 1) * 3)),
            TimeFrame::Year => {
                first_of_year(today - Months::new((n - 1) * 12))
            }
        };
        PeriodRange { start, end: today }
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn first_of_quarter(date: NaiveDate) -> NaiveDate {
    let quarter_start_month = ((date.month() - 1) / 3) * 3 + 1;
    date.with_month(quarter_start_month)
        .and_then(|d| d.with_day(1))
        .unwrap_or(date)
}

fn first_of_year(date: NaiveDate) -> NaiveDate {
    date.with_month(1).and_then(|d| d.with_day(1)).unwrap_or(date)
}

/// Reference window for a comparison series.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum CompareWith {
    PreviousYear,
    PreviousPeriod,
}

impl CompareWith {
    pub fn parse(s: &str) -> AnalyticsResult<Self> {
        Self::from_str(s).map_err(|_| {
            AnalyticsError::validation(format!(
                "Invalid comparison: {s}. Valid values are: previous-year, previous-period"
            ))
        })
    }

    /// Shifts a window back to its comparison counterpart.
    fn shift(&self, range: PeriodRange, time_frame: TimeFrame) -> PeriodRange {
        match self {
            CompareWith::PreviousYear => PeriodRange {
                start: range.start - Months::new(12),
                end: range.end - Months::new(12),
            },
            CompareWith::PreviousPeriod => {
                let days = Days::new(time_frame.period_length_days());
                PeriodRange {
                    start: range.start - days,
                    end: range.end - days,
                }
            }
        }
    }
}

/// A metric's time series with an optional comparison series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendResult {
    pub metric_id: String,
    pub metric_name: String,
    pub time_frame: TimeFrame,
    pub points: Vec<TrendPoint>,
    pub comparison_points: Option<Vec<TrendPoint>>,
}

/// Produces trend series from the injected metric source.
pub struct TrendEngine {
    source: Arc<dyn MetricSource>,
    catalog: Arc<MetricCatalog>,
}

impl TrendEngine {
    pub fn new(source: Arc<dyn MetricSource>, catalog: Arc<MetricCatalog>) -> Self {
        Self { source, catalog }
    }

    /// Time series for a metric over the fixed window ending at `today`,
    /// with an optional comparison series from the shifted window.
    #[instrument(skip(self))]
    pub async fn trend(
        &self,
        metric_id: &str,
        time_frame: &str,
        compare_with: Option<&str>,
        today: NaiveDate,
    ) -> AnalyticsResult<TrendResult> {
        let time_frame = TimeFrame::parse(time_frame)?;
        let compare_with = compare_with.map(CompareWith::parse).transpose()?;

        let window = time_frame.window(today);
        let points = self.source.series(metric_id, time_frame, window).await?;
        if points.is_empty() {
            return Err(AnalyticsError::not_found(format!(
                "No data found for metric {metric_id}"
            )));
        }

        let comparison_points = match compare_with {
            Some(compare) => {
                let shifted = compare.shift(window, time_frame);
                let series = self.source.series(metric_id, time_frame, shifted).await?;
                (!series.is_empty()).then_some(series)
            }
            None => None,
        };

        info!(
            metric_id,
            %time_frame,
            points = points.len(),
            has_comparison = comparison_points.is_some(),
            "trend analysis complete"
        );

        Ok(TrendResult {
            metric_id: metric_id.to_string(),
            metric_name: self.catalog.display_name(metric_id),
            time_frame,
            points,
            comparison_points,
        })
    }
}
