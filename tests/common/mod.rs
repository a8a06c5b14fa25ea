//! In-memory fakes shared by the orchestrator tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use reporting_analytics::errors::{AnalyticsError, AnalyticsResult};
use reporting_analytics::models::{
    DataMartDefinition, DataMartStatus, ExecutionStatus, ExportFormat, ScheduledReport,
};
use reporting_analytics::repositories::{
    DataMartRepository, MartQueryResult, MartRefresher, ReportExecutor, ReportExporter,
    ScheduleRepository,
};
use reporting_analytics::services::recommendations::{
    CustomerChurnPrediction, InventoryRecommendation,
};

pub fn schedule(report_id: Uuid, cron: &str) -> ScheduledReport {
    ScheduledReport {
        schedule_id: Uuid::new_v4(),
        report_id,
        cron_expression: cron.to_string(),
        format: ExportFormat::Pdf,
        recipients: vec!["gm@dealer.example".to_string()],
        parameters: json!({"period": "MTD"}),
        last_run: None,
        next_run: None,
    }
}

pub fn mart(name: &str) -> DataMartDefinition {
    DataMartDefinition {
        mart_id: Uuid::new_v4(),
        name: name.to_string(),
        description: format!("{name} mart"),
        status: DataMartStatus::Active,
        refresh_schedule: "0 0 3 * * *".to_string(),
        last_refresh: None,
    }
}

/// Schedule store that serves a fixed due list and records run-date
/// updates.
pub struct InMemorySchedules {
    due: Vec<ScheduledReport>,
    pub updates: Mutex<Vec<(Uuid, DateTime<Utc>, DateTime<Utc>)>>,
}

impl InMemorySchedules {
    pub fn new(due: Vec<ScheduledReport>) -> Self {
        Self {
            due,
            updates: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ScheduleRepository for InMemorySchedules {
    async fn schedules_due(&self, _now: DateTime<Utc>) -> AnalyticsResult<Vec<ScheduledReport>> {
        Ok(self.due.clone())
    }

    async fn update_run_dates(
        &self,
        schedule_id: Uuid,
        last_run: DateTime<Utc>,
        next_run: DateTime<Utc>,
    ) -> AnalyticsResult<()> {
        self.updates
            .lock()
            .unwrap()
            .push((schedule_id, last_run, next_run));
        Ok(())
    }
}

/// Per-report outcome a `ScriptedExecutor` plays back.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeeds,
    Fails,
    /// Stays Running until canceled.
    NeverFinishes,
    /// `execute` itself errors.
    RejectsExecution,
}

/// Executor mock that maps report ids to scripted outcomes and counts
/// cancellations.
pub struct ScriptedExecutor {
    outcomes: HashMap<Uuid, Outcome>,
    executions: Mutex<HashMap<Uuid, Outcome>>,
    canceled: Mutex<Vec<Uuid>>,
    pub cancel_count: AtomicUsize,
}

impl ScriptedExecutor {
    pub fn new(outcomes: impl IntoIterator<Item = (Uuid, Outcome)>) -> Self {
        Self {
            outcomes: outcomes.into_iter().collect(),
            executions: Mutex::new(HashMap::new()),
            canceled: Mutex::new(Vec::new()),
            cancel_count: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ReportExecutor for ScriptedExecutor {
    async fn execute(
        &self,
        report_id: Uuid,
        _parameters: Value,
        _triggered_by: &str,
    ) -> AnalyticsResult<Uuid> {
        let outcome = *self
            .outcomes
            .get(&report_id)
            .unwrap_or(&Outcome::Succeeds);
        if outcome == Outcome::RejectsExecution {
            return Err(AnalyticsError::not_found(format!(
                "Report {report_id} not found"
            )));
        }
        let execution_id = Uuid::new_v4();
        self.executions
            .lock()
            .unwrap()
            .insert(execution_id, outcome);
        Ok(execution_id)
    }

    async fn status(&self, execution_id: Uuid) -> AnalyticsResult<ExecutionStatus> {
        if self.canceled.lock().unwrap().contains(&execution_id) {
            return Ok(ExecutionStatus::Canceled);
        }
        match self.executions.lock().unwrap().get(&execution_id) {
            Some(Outcome::Succeeds) => Ok(ExecutionStatus::Success),
            Some(Outcome::Fails) => Ok(ExecutionStatus::Failed),
            Some(Outcome::NeverFinishes) => Ok(ExecutionStatus::Running),
            _ => Err(AnalyticsError::ExecutionNotFound(execution_id)),
        }
    }

    async fn results(&self, _execution_id: Uuid) -> AnalyticsResult<Value> {
        Ok(json!({"rows": []}))
    }

    async fn cancel(&self, execution_id: Uuid) -> AnalyticsResult<bool> {
        self.cancel_count.fetch_add(1, Ordering::SeqCst);
        self.canceled.lock().unwrap().push(execution_id);
        Ok(true)
    }
}

/// Exporter that records scheduled exports instead of rendering anything.
#[derive(Default)]
pub struct RecordingExporter {
    pub scheduled: Mutex<Vec<(Uuid, Uuid, ExportFormat, Vec<String>)>>,
    pub fail: bool,
}

impl RecordingExporter {
    pub fn failing() -> Self {
        Self {
            scheduled: Mutex::new(Vec::new()),
            fail: true,
        }
    }
}

#[async_trait]
impl ReportExporter for RecordingExporter {
    async fn export(
        &self,
        execution_id: Uuid,
        format: ExportFormat,
    ) -> AnalyticsResult<String> {
        Ok(format!("exports/{execution_id}.{format}"))
    }

    async fn export_scheduled(
        &self,
        execution_id: Uuid,
        schedule: &ScheduledReport,
    ) -> AnalyticsResult<String> {
        if self.fail {
            return Err(AnalyticsError::external("smtp relay unreachable"));
        }
        self.scheduled.lock().unwrap().push((
            execution_id,
            schedule.schedule_id,
            schedule.format,
            schedule.recipients.clone(),
        ));
        Ok(format!("exports/{execution_id}.{}", schedule.format))
    }
}

/// Mart store serving a fixed due list and recording status updates.
pub struct InMemoryMarts {
    due: Vec<DataMartDefinition>,
    pub status_updates: Mutex<Vec<(Uuid, DataMartStatus, Option<DateTime<Utc>>)>>,
}

impl InMemoryMarts {
    pub fn new(due: Vec<DataMartDefinition>) -> Self {
        Self {
            due,
            status_updates: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl DataMartRepository for InMemoryMarts {
    async fn all_marts(&self) -> AnalyticsResult<Vec<DataMartDefinition>> {
        Ok(self.due.clone())
    }

    async fn marts_due_for_refresh(
        &self,
        _now: DateTime<Utc>,
    ) -> AnalyticsResult<Vec<DataMartDefinition>> {
        Ok(self.due.clone())
    }

    async fn update_status(
        &self,
        mart_id: Uuid,
        status: DataMartStatus,
        last_refresh: Option<DateTime<Utc>>,
    ) -> AnalyticsResult<()> {
        self.status_updates
            .lock()
            .unwrap()
            .push((mart_id, status, last_refresh));
        Ok(())
    }

    async fn execute_ad_hoc_query(
        &self,
        _mart_name: &str,
        _dimensions: &[String],
        _measures: &[String],
        _filter: Option<&str>,
        _sort_by: Option<&str>,
        _limit: Option<u64>,
    ) -> AnalyticsResult<MartQueryResult> {
        Ok(MartQueryResult {
            rows: Vec::new(),
            total_count: 0,
        })
    }

    async fn inventory_recommendations(&self) -> AnalyticsResult<Vec<InventoryRecommendation>> {
        Ok(Vec::new())
    }

    async fn churn_predictions(
        &self,
        _min_risk_score: f64,
    ) -> AnalyticsResult<Vec<CustomerChurnPrediction>> {
        Ok(Vec::new())
    }
}

/// Refresher that fails for the named marts and records every attempt.
pub struct ScriptedRefresher {
    failing: Vec<String>,
    pub attempted: Mutex<Vec<String>>,
}

impl ScriptedRefresher {
    pub fn new(failing: &[&str]) -> Self {
        Self {
            failing: failing.iter().map(|s| s.to_string()).collect(),
            attempted: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl MartRefresher for ScriptedRefresher {
    async fn refresh(&self, mart: &DataMartDefinition) -> AnalyticsResult<()> {
        self.attempted.lock().unwrap().push(mart.name.clone());
        if self.failing.contains(&mart.name) {
            return Err(AnalyticsError::external(format!(
                "etl procedure failed for {}",
                mart.name
            )));
        }
        Ok(())
    }
}
