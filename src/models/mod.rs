//! Domain types shared across the analytics core.
//!
//! Request/response shapes that belong to a single service live next to
//! that service; everything here is referenced from more than one place.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::errors::{AnalyticsError, AnalyticsResult};

/// Grouping of metrics by dealership department.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MetricGroup {
    Sales,
    Service,
    Inventory,
    Financial,
}

impl MetricGroup {
    pub const ALL: [MetricGroup; 4] = [
        MetricGroup::Sales,
        MetricGroup::Service,
        MetricGroup::Inventory,
        MetricGroup::Financial,
    ];
}

/// A static, read-only metric definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metric {
    pub id: String,
    pub display_name: String,
    pub group: MetricGroup,
    pub unit: String,
}

/// One `(date, value)` sample in a metric's time series.
///
/// Series are ordered ascending by date and immutable once produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// A projected future point with uncertainty bounds.
///
/// Invariant: `lower_bound <= value <= upper_bound` and `value >= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub value: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

/// Direction classification for period-over-period change.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Flat,
}

impl TrendDirection {
    /// Classification used everywhere a change percentage is reported:
    /// more than one percent either way counts as movement.
    pub fn from_change_percent(change_percent: f64) -> Self {
        if change_percent > 1.0 {
            TrendDirection::Up
        } else if change_percent < -1.0 {
            TrendDirection::Down
        } else {
            TrendDirection::Flat
        }
    }
}

/// A named scalar metric with current/previous value and trend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiResult {
    pub kpi_id: String,
    pub name: String,
    pub value: f64,
    pub previous_value: f64,
    pub change_percent: f64,
    pub trend: TrendDirection,
    pub unit: String,
    pub department: MetricGroup,
}

/// Insight categories served by the insight provider registry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InsightCategory {
    Sales,
    Service,
    Inventory,
    Customer,
}

impl InsightCategory {
    pub const ALL: [InsightCategory; 4] = [
        InsightCategory::Sales,
        InsightCategory::Service,
        InsightCategory::Inventory,
        InsightCategory::Customer,
    ];
}

/// A labeled data point backing an insight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightDataPoint {
    pub label: String,
    pub value: f64,
}

/// An automatically discovered, ranked observation about the business.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: InsightCategory,
    /// Relative importance in `[0, 1]`; ranking sorts on this.
    pub significance: f64,
    pub data_points: Vec<InsightDataPoint>,
    pub recommended_action: String,
    pub discovered_at: DateTime<Utc>,
}

/// An inclusive calendar date range resolved from a period identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PeriodRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> AnalyticsResult<Self> {
        if start > end {
            return Err(AnalyticsError::Internal(format!(
                "period range start {start} after end {end}"
            )));
        }
        Ok(Self { start, end })
    }
}

/// Lifecycle states of one report run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
pub enum ExecutionStatus {
    Queued,
    Running,
    Success,
    Failed,
    Canceled,
}

impl ExecutionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failed | Self::Canceled)
    }
}

/// One report run, created on trigger and mutated only by the execution
/// engine. Terminal states are immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportExecution {
    pub execution_id: Uuid,
    pub report_id: Uuid,
    pub status: ExecutionStatus,
    pub parameters: serde_json::Value,
    pub results: Option<serde_json::Value>,
    pub error: Option<String>,
    pub triggered_by: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Output formats supported by the export collaborator.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ExportFormat {
    Pdf,
    Excel,
    Csv,
    Json,
}

/// A stored report definition. Persistence is a collaborator concern; the
/// core only checks existence and carries identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportDefinition {
    pub report_id: Uuid,
    pub name: String,
    pub owner: String,
    pub created_at: DateTime<Utc>,
}

/// A cron-driven report schedule. Run-date bookkeeping is owned by the
/// schedule orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledReport {
    pub schedule_id: Uuid,
    pub report_id: Uuid,
    pub cron_expression: String,
    pub format: ExportFormat,
    pub recipients: Vec<String>,
    pub parameters: serde_json::Value,
    pub last_run: Option<DateTime<Utc>>,
    pub next_run: Option<DateTime<Utc>>,
}

/// Data-mart lifecycle states, owned exclusively by the refresh
/// orchestrator.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
pub enum DataMartStatus {
    Active,
    Building,
    Failed,
}

/// A precomputed, periodically refreshed aggregate dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataMartDefinition {
    pub mart_id: Uuid,
    pub name: String,
    pub description: String,
    pub status: DataMartStatus,
    pub refresh_schedule: String,
    pub last_refresh: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn trend_direction_boundaries() {
        assert_eq!(TrendDirection::from_change_percent(1.0), TrendDirection::Flat);
        assert_eq!(TrendDirection::from_change_percent(1.0001), TrendDirection::Up);
        assert_eq!(TrendDirection::from_change_percent(-1.0), TrendDirection::Flat);
        assert_eq!(
            TrendDirection::from_change_percent(-1.0001),
            TrendDirection::Down
        );
        assert_eq!(TrendDirection::from_change_percent(0.0), TrendDirection::Flat);
    }

    #[test]
    fn execution_status_terminality() {
        assert!(!ExecutionStatus::Queued.is_terminal());
        assert!(!ExecutionStatus::Running.is_terminal());
        assert!(ExecutionStatus::Success.is_terminal());
        assert!(ExecutionStatus::Failed.is_terminal());
        assert!(ExecutionStatus::Canceled.is_terminal());
    }

    #[test]
    fn metric_group_round_trips_through_strings() {
        for group in MetricGroup::ALL {
            let parsed = MetricGroup::from_str(&group.to_string()).unwrap();
            assert_eq!(parsed, group);
        }
        assert!(MetricGroup::from_str("marketing").is_err());
    }

    #[test]
    fn period_range_rejects_inverted_bounds() {
        let start = NaiveDate::from_ymd_opt(2023, 5, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2023, 4, 1).unwrap();
        assert!(PeriodRange::new(start, end).is_err());
        assert!(PeriodRange::new(end, start).is_ok());
    }
}
