//! Collaborator interfaces consumed by the analytics core.
//!
//! Persistence, data-mart querying, export rendering, and the external
//! prediction model are all out of core scope; the core talks to them
//! through these traits and is injected with `Arc<dyn ...>` handles.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::watch;
use uuid::Uuid;

use crate::errors::AnalyticsResult;
use crate::models::{
    DataMartDefinition, DataMartStatus, ExecutionStatus, ForecastPoint, PeriodRange,
    ReportDefinition, ReportExecution, ScheduledReport, TrendPoint,
};
use crate::services::forecasting::Granularity;
use crate::services::recommendations::{CustomerChurnPrediction, InventoryRecommendation};
use crate::services::trends::TimeFrame;

/// Ordered time-series and scalar-aggregate source for metric data.
#[async_trait]
pub trait MetricSource: Send + Sync {
    /// Series for a metric over an inclusive range at the given
    /// granularity, ascending by date. May be empty.
    async fn series(
        &self,
        metric_id: &str,
        time_frame: TimeFrame,
        range: PeriodRange,
    ) -> AnalyticsResult<Vec<TrendPoint>>;

    /// Full history of a metric at the given granularity, ascending by
    /// date, optionally restricted by a source-defined filter expression.
    async fn history(
        &self,
        metric_name: &str,
        granularity: Granularity,
        filter: Option<&str>,
    ) -> AnalyticsResult<Vec<TrendPoint>>;

    /// Scalar aggregate of a metric over an inclusive range.
    async fn aggregate(&self, metric_id: &str, range: PeriodRange) -> AnalyticsResult<f64>;
}

/// Tabular result of an ad-hoc data-mart query.
#[derive(Debug, Clone)]
pub struct MartQueryResult {
    pub rows: Vec<Value>,
    pub total_count: u64,
}

/// Data-mart persistence and querying.
#[async_trait]
pub trait DataMartRepository: Send + Sync {
    async fn all_marts(&self) -> AnalyticsResult<Vec<DataMartDefinition>>;

    /// Marts whose refresh schedule makes them due at `now`. "Due"
    /// semantics are owned by the repository.
    async fn marts_due_for_refresh(
        &self,
        now: DateTime<Utc>,
    ) -> AnalyticsResult<Vec<DataMartDefinition>>;

    /// Atomically update a mart's status, stamping `last_refresh` only
    /// when one is supplied.
    async fn update_status(
        &self,
        mart_id: Uuid,
        status: DataMartStatus,
        last_refresh: Option<DateTime<Utc>>,
    ) -> AnalyticsResult<()>;

    /// Execute a validated ad-hoc query against a named mart.
    async fn execute_ad_hoc_query(
        &self,
        mart_name: &str,
        dimensions: &[String],
        measures: &[String],
        filter: Option<&str>,
        sort_by: Option<&str>,
        limit: Option<u64>,
    ) -> AnalyticsResult<MartQueryResult>;

    /// Current inventory stocking recommendations from the analytics mart.
    async fn inventory_recommendations(&self) -> AnalyticsResult<Vec<InventoryRecommendation>>;

    /// Customer churn predictions at or above a risk score.
    async fn churn_predictions(
        &self,
        min_risk_score: f64,
    ) -> AnalyticsResult<Vec<CustomerChurnPrediction>>;
}

/// Report definitions and execution history.
#[async_trait]
pub trait ReportRepository: Send + Sync {
    async fn report(&self, report_id: Uuid) -> AnalyticsResult<Option<ReportDefinition>>;

    /// Record or update one execution's history row. Called on every
    /// lifecycle transition.
    async fn record_execution(&self, execution: &ReportExecution) -> AnalyticsResult<()>;
}

/// Report schedules and their run-date bookkeeping.
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    /// Schedules with `next_run <= now`.
    async fn schedules_due(&self, now: DateTime<Utc>) -> AnalyticsResult<Vec<ScheduledReport>>;

    async fn update_run_dates(
        &self,
        schedule_id: Uuid,
        last_run: DateTime<Utc>,
        next_run: DateTime<Utc>,
    ) -> AnalyticsResult<()>;
}

/// Performs the actual work of one report run.
///
/// Implementations must observe the cancel signal and return promptly once
/// it flips; the engine additionally races the runner against the signal so
/// an execution always reaches a terminal state.
#[async_trait]
pub trait ReportRunner: Send + Sync {
    async fn run(
        &self,
        report: &ReportDefinition,
        parameters: &Value,
        cancel: watch::Receiver<bool>,
    ) -> AnalyticsResult<Value>;
}

/// Renders and delivers report output. Rendering itself is out of scope;
/// the core only hands over identity, format, and recipients.
#[async_trait]
pub trait ReportExporter: Send + Sync {
    /// Export one execution's results; returns an artifact reference.
    async fn export(
        &self,
        execution_id: Uuid,
        format: crate::models::ExportFormat,
    ) -> AnalyticsResult<String>;

    /// Export on behalf of a schedule, using its format and recipients.
    async fn export_scheduled(
        &self,
        execution_id: Uuid,
        schedule: &ScheduledReport,
    ) -> AnalyticsResult<String>;
}

/// Optional external forecasting process (e.g. a model server). Any
/// failure here falls back to the local linear-trend algorithm.
#[async_trait]
pub trait ForecastModel: Send + Sync {
    async fn forecast(
        &self,
        metric_name: &str,
        periods: u32,
        granularity: Granularity,
    ) -> AnalyticsResult<Vec<ForecastPoint>>;
}

/// Runs the extract/transform/load procedure that rebuilds one mart.
#[async_trait]
pub trait MartRefresher: Send + Sync {
    async fn refresh(&self, mart: &DataMartDefinition) -> AnalyticsResult<()>;
}

/// Tracks execution state on behalf of orchestrators. Implemented by the
/// in-process execution engine; mocked in orchestrator tests.
#[async_trait]
pub trait ReportExecutor: Send + Sync {
    /// Create a queued execution and return its id immediately.
    async fn execute(
        &self,
        report_id: Uuid,
        parameters: Value,
        triggered_by: &str,
    ) -> AnalyticsResult<Uuid>;

    async fn status(&self, execution_id: Uuid) -> AnalyticsResult<ExecutionStatus>;

    /// Results of a successful execution.
    async fn results(&self, execution_id: Uuid) -> AnalyticsResult<Value>;

    /// Request cooperative cancellation. Returns `false` when the
    /// execution is already terminal.
    async fn cancel(&self, execution_id: Uuid) -> AnalyticsResult<bool>;
}
