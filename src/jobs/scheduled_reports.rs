//! Cron-driven scheduled report runs.
//!
//! Each tick loads the due schedules, runs them sequentially, waits for
//! completion with a bounded poll, exports successful runs, and pushes
//! every schedule's run dates forward. One schedule's failure never stops
//! the rest of the tick.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use cron::Schedule;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

use crate::config::SchedulerConfig;
use crate::errors::AnalyticsResult;
use crate::models::{ExecutionStatus, ScheduledReport};
use crate::repositories::{ReportExecutor, ReportExporter, ScheduleRepository};

/// Orchestrates due report schedules.
pub struct ScheduleOrchestrator {
    schedules: Arc<dyn ScheduleRepository>,
    executor: Arc<dyn ReportExecutor>,
    exporter: Arc<dyn ReportExporter>,
    poll_interval: Duration,
    wait_cap: Duration,
    tick_period: Duration,
}

impl ScheduleOrchestrator {
    pub fn new(
        schedules: Arc<dyn ScheduleRepository>,
        executor: Arc<dyn ReportExecutor>,
        exporter: Arc<dyn ReportExporter>,
        config: &SchedulerConfig,
    ) -> Self {
        Self {
            schedules,
            executor,
            exporter,
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            wait_cap: Duration::from_secs(config.execution_timeout_secs),
            tick_period: Duration::from_secs(config.schedule_tick_secs),
        }
    }

    /// Starts the recurring job. The returned handle aborts it.
    pub fn start(self: Arc<Self>) -> JoinHandle<()> {
        let period = self.tick_period;
        super::spawn_periodic("scheduled-reports", period, move || {
            let orchestrator = self.clone();
            async move {
                orchestrator.run_due(Utc::now()).await;
            }
        })
    }

    /// One tick: process every schedule due at `now`.
    #[instrument(skip(self))]
    pub async fn run_due(&self, now: DateTime<Utc>) {
        let due = match self.schedules.schedules_due(now).await {
            Ok(due) => due,
            Err(err) => {
                error!(error = %err, "failed to load due schedules");
                return;
            }
        };
        if due.is_empty() {
            return;
        }
        info!(count = due.len(), "processing due report schedules");

        for schedule in due {
            if let Err(err) = self.process_schedule(&schedule).await {
                error!(
                    schedule_id = %schedule.schedule_id,
                    report_id = %schedule.report_id,
                    error = %err,
                    "scheduled report failed"
                );
            }
            self.reschedule(&schedule, now).await;
        }
    }

    async fn process_schedule(&self, schedule: &ScheduledReport) -> AnalyticsResult<()> {
        info!(
            schedule_id = %schedule.schedule_id,
            report_id = %schedule.report_id,
            "executing scheduled report"
        );
        let execution_id = self
            .executor
            .execute(schedule.report_id, schedule.parameters.clone(), "scheduler")
            .await?;

        let status = self.wait_for_completion(execution_id).await?;
        match status {
            ExecutionStatus::Success => {
                let artifact = self
                    .exporter
                    .export_scheduled(execution_id, schedule)
                    .await?;
                info!(
                    schedule_id = %schedule.schedule_id,
                    artifact,
                    "scheduled report exported"
                );
            }
            other => {
                warn!(
                    schedule_id = %schedule.schedule_id,
                    status = %other,
                    "scheduled report did not succeed, skipping export"
                );
            }
        }
        Ok(())
    }

    /// Polls until the execution is terminal or the cap elapses. On
    /// timeout, issues exactly one cancellation and reports Canceled.
    async fn wait_for_completion(
        &self,
        execution_id: uuid::Uuid,
    ) -> AnalyticsResult<ExecutionStatus> {
        let deadline = tokio::time::Instant::now() + self.wait_cap;
        loop {
            let status = self.executor.status(execution_id).await?;
            if status.is_terminal() {
                return Ok(status);
            }
            if tokio::time::Instant::now() >= deadline {
                warn!(%execution_id, "execution timed out, canceling");
                self.executor.cancel(execution_id).await?;
                return Ok(ExecutionStatus::Canceled);
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Recomputes the next run from the cron expression and persists the
    /// bookkeeping. An invalid expression falls back to tomorrow; that
    /// keeps the schedule alive but is logged loudly for operators.
    async fn reschedule(&self, schedule: &ScheduledReport, now: DateTime<Utc>) {
        let next_run = next_run_after(&schedule.cron_expression, now).unwrap_or_else(|| {
            warn!(
                schedule_id = %schedule.schedule_id,
                cron = %schedule.cron_expression,
                "invalid cron expression, defaulting next run to tomorrow"
            );
            now + chrono::Duration::days(1)
        });

        if let Err(err) = self
            .schedules
            .update_run_dates(schedule.schedule_id, now, next_run)
            .await
        {
            error!(
                schedule_id = %schedule.schedule_id,
                error = %err,
                "failed to persist schedule run dates"
            );
        }
    }
}

/// Next fire time of a cron expression strictly after `now`, or `None`
/// when the expression does not parse or has no future occurrence.
pub fn next_run_after(expression: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let schedule = Schedule::from_str(expression).ok()?;
    schedule.after(&now).next()
}
