//! Report execution lifecycle.
//!
//! One run moves Queued -> Running -> {Success, Failed, Canceled}. The
//! engine owns every mutation; terminal states are immutable. The actual
//! report work is delegated to the injected runner under a cancellation
//! signal, and the engine races the runner against that signal so a run
//! always reaches a terminal state even if the runner ignores it.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::errors::{AnalyticsError, AnalyticsResult};
use crate::models::{ExecutionStatus, ExportFormat, ReportDefinition, ReportExecution};
use crate::repositories::{
    ReportExecutor, ReportExporter, ReportRepository, ReportRunner,
};

struct ExecutionSlot {
    execution: ReportExecution,
    cancel: watch::Sender<bool>,
}

/// In-process execution engine backing the report lifecycle.
#[derive(Clone)]
pub struct ReportExecutionEngine {
    reports: Arc<dyn ReportRepository>,
    runner: Arc<dyn ReportRunner>,
    exporter: Arc<dyn ReportExporter>,
    executions: Arc<DashMap<Uuid, ExecutionSlot>>,
}

impl ReportExecutionEngine {
    pub fn new(
        reports: Arc<dyn ReportRepository>,
        runner: Arc<dyn ReportRunner>,
        exporter: Arc<dyn ReportExporter>,
    ) -> Self {
        Self {
            reports,
            runner,
            exporter,
            executions: Arc::new(DashMap::new()),
        }
    }

    /// Current snapshot of one execution.
    pub fn execution(&self, execution_id: Uuid) -> AnalyticsResult<ReportExecution> {
        self.executions
            .get(&execution_id)
            .map(|slot| slot.execution.clone())
            .ok_or(AnalyticsError::ExecutionNotFound(execution_id))
    }

    /// Export a finished execution's output through the export
    /// collaborator.
    #[instrument(skip(self))]
    pub async fn export(
        &self,
        execution_id: Uuid,
        format: ExportFormat,
    ) -> AnalyticsResult<String> {
        // Existence check before handing off.
        self.execution(execution_id)?;
        self.exporter.export(execution_id, format).await.map_err(|err| {
            error!(%execution_id, %format, error = %err, "export failed");
            err
        })
    }

    /// Applies a transition unless the execution already reached a
    /// terminal state. Returns the updated snapshot when applied.
    fn transition(
        &self,
        execution_id: Uuid,
        apply: impl FnOnce(&mut ReportExecution),
    ) -> Option<ReportExecution> {
        let mut slot = self.executions.get_mut(&execution_id)?;
        if slot.execution.status.is_terminal() {
            return None;
        }
        apply(&mut slot.execution);
        if slot.execution.status.is_terminal() {
            slot.execution.completed_at = Some(Utc::now());
        }
        Some(slot.execution.clone())
    }

    /// Best-effort history write; a history failure never fails the run.
    async fn record(&self, execution: &ReportExecution) {
        if let Err(err) = self.reports.record_execution(execution).await {
            warn!(
                execution_id = %execution.execution_id,
                error = %err,
                "failed to record execution history"
            );
        }
    }

    async fn run_to_completion(
        &self,
        execution_id: Uuid,
        report: ReportDefinition,
        parameters: Value,
        mut cancel_rx: watch::Receiver<bool>,
    ) {
        if let Some(snapshot) = self.transition(execution_id, |e| {
            e.status = ExecutionStatus::Running;
        }) {
            self.record(&snapshot).await;
        } else {
            // Canceled before the work started.
            return;
        }

        let outcome = tokio::select! {
            result = self.runner.run(&report, &parameters, cancel_rx.clone()) => Some(result),
            _ = cancel_rx.changed() => None,
        };

        let snapshot = match outcome {
            Some(Ok(results)) => self.transition(execution_id, |e| {
                e.status = ExecutionStatus::Success;
                e.results = Some(results);
            }),
            Some(Err(err)) => {
                error!(%execution_id, error = %err, "report run failed");
                self.transition(execution_id, |e| {
                    e.status = ExecutionStatus::Failed;
                    e.error = Some(err.to_string());
                })
            }
            // The cancel signal won the race; cancel() already moved the
            // execution to Canceled.
            None => None,
        };

        if let Some(snapshot) = snapshot {
            info!(%execution_id, status = %snapshot.status, "execution finished");
            self.record(&snapshot).await;
        }
    }
}

#[async_trait]
impl ReportExecutor for ReportExecutionEngine {
    #[instrument(skip(self, parameters))]
    async fn execute(
        &self,
        report_id: Uuid,
        parameters: Value,
        triggered_by: &str,
    ) -> AnalyticsResult<Uuid> {
        let report = self
            .reports
            .report(report_id)
            .await?
            .ok_or_else(|| {
                AnalyticsError::not_found(format!("Report with ID {report_id} not found"))
            })?;

        let execution_id = Uuid::new_v4();
        let execution = ReportExecution {
            execution_id,
            report_id,
            status: ExecutionStatus::Queued,
            parameters: parameters.clone(),
            results: None,
            error: None,
            triggered_by: triggered_by.to_string(),
            started_at: Utc::now(),
            completed_at: None,
        };
        let (cancel_tx, cancel_rx) = watch::channel(false);
        self.executions.insert(
            execution_id,
            ExecutionSlot {
                execution: execution.clone(),
                cancel: cancel_tx,
            },
        );
        self.record(&execution).await;
        info!(%execution_id, %report_id, "execution queued");

        let engine = self.clone();
        tokio::spawn(async move {
            engine
                .run_to_completion(execution_id, report, parameters, cancel_rx)
                .await;
        });

        Ok(execution_id)
    }

    async fn status(&self, execution_id: Uuid) -> AnalyticsResult<ExecutionStatus> {
        Ok(self.execution(execution_id)?.status)
    }

    async fn results(&self, execution_id: Uuid) -> AnalyticsResult<Value> {
        let execution = self.execution(execution_id)?;
        match execution.status {
            ExecutionStatus::Success => execution.results.ok_or_else(|| {
                AnalyticsError::Internal(format!(
                    "execution {execution_id} succeeded without results"
                ))
            }),
            other => Err(AnalyticsError::InvalidOperation(format!(
                "Results for execution {execution_id} are not available in status {other}"
            ))),
        }
    }

    #[instrument(skip(self))]
    async fn cancel(&self, execution_id: Uuid) -> AnalyticsResult<bool> {
        let snapshot = self.transition(execution_id, |e| {
            e.status = ExecutionStatus::Canceled;
        });
        let Some(snapshot) = snapshot else {
            // Unknown id is an error; a terminal execution just reports
            // that cancellation had no effect.
            self.execution(execution_id)?;
            return Ok(false);
        };

        if let Some(slot) = self.executions.get(&execution_id) {
            // Ignore send errors: the worker may already be gone.
            slot.cancel.send(true).ok();
        }
        warn!(%execution_id, "execution canceled");
        self.record(&snapshot).await;
        Ok(true)
    }
}
