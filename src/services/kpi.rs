//! KPI retrieval and period-over-period comparison.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::catalog::MetricCatalog;
use crate::errors::{AnalyticsError, AnalyticsResult};
use crate::models::{KpiResult, MetricGroup, TrendDirection};
use crate::period;
use crate::repositories::MetricSource;

/// Serves the current KPI set for one department. One provider per
/// department hangs off the registry; new departments register a provider
/// instead of growing a dispatch chain.
#[async_trait]
pub trait KpiProvider: Send + Sync {
    async fn department_kpis(&self) -> AnalyticsResult<Vec<KpiResult>>;
}

/// Period-over-period comparison of one metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricComparison {
    pub metric_id: String,
    pub metric_name: String,
    pub current_value: f64,
    pub previous_value: f64,
    pub change_percent: f64,
    pub trend: TrendDirection,
}

/// Comparison of a whole metric group across two periods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub metric_group: String,
    pub current_period: String,
    pub previous_period: String,
    pub metrics: Vec<MetricComparison>,
}

/// Computes KPI sets and period comparisons.
pub struct KpiComparator {
    source: Arc<dyn MetricSource>,
    catalog: Arc<MetricCatalog>,
    providers: Vec<(MetricGroup, Arc<dyn KpiProvider>)>,
}

impl KpiComparator {
    pub fn new(source: Arc<dyn MetricSource>, catalog: Arc<MetricCatalog>) -> Self {
        Self {
            source,
            catalog,
            providers: Vec::new(),
        }
    }

    /// Registers a department's KPI provider. Registration order is
    /// preserved when `all` concatenates departments.
    pub fn register_provider(
        mut self,
        department: MetricGroup,
        provider: Arc<dyn KpiProvider>,
    ) -> Self {
        self.providers.push((department, provider));
        self
    }

    /// KPIs for one department, or for every registered department when
    /// `department` is `all`.
    #[instrument(skip(self))]
    pub async fn kpis(&self, department: &str) -> AnalyticsResult<Vec<KpiResult>> {
        let selected: Vec<&Arc<dyn KpiProvider>> = if department == "all" {
            self.providers.iter().map(|(_, p)| p).collect()
        } else {
            let department = MetricGroup::from_str(department).map_err(|_| {
                AnalyticsError::validation(format!(
                    "Unknown department: {department}. Valid values are: all, sales, service, inventory, financial"
                ))
            })?;
            self.providers
                .iter()
                .filter(|(dept, _)| *dept == department)
                .map(|(_, p)| p)
                .collect()
        };

        let mut kpis = Vec::new();
        for provider in selected {
            kpis.extend(provider.department_kpis().await?);
        }
        info!(department, count = kpis.len(), "collected KPIs");
        Ok(kpis)
    }

    /// Compares every metric of a group between two period identifiers.
    #[instrument(skip(self))]
    pub async fn compare_periods(
        &self,
        metric_group: &str,
        current_period: &str,
        previous_period: &str,
        today: NaiveDate,
    ) -> AnalyticsResult<ComparisonResult> {
        if metric_group.is_empty() {
            return Err(AnalyticsError::validation("Metric group is required"));
        }
        if current_period.is_empty() || previous_period.is_empty() {
            return Err(AnalyticsError::validation(
                "Both current and previous period identifiers are required",
            ));
        }

        let current_range = period::resolve(current_period, today)?;
        let previous_range = period::resolve(previous_period, today)?;

        let metric_ids = self.catalog.group_metrics(metric_group)?;
        if metric_ids.is_empty() {
            return Err(AnalyticsError::validation(format!(
                "No metrics found for group {metric_group}"
            )));
        }

        let mut metrics = Vec::with_capacity(metric_ids.len());
        for metric_id in metric_ids {
            let current = self.source.aggregate(metric_id, current_range).await?;
            let previous = self.source.aggregate(metric_id, previous_range).await?;
            metrics.push(compare(metric_id, &self.catalog, current, previous));
        }

        Ok(ComparisonResult {
            metric_group: metric_group.to_string(),
            current_period: current_period.to_string(),
            previous_period: previous_period.to_string(),
            metrics,
        })
    }
}

/// Change percentage guards against a zero previous value so the result is
/// never NaN or infinite.
fn compare(
    metric_id: &str,
    catalog: &MetricCatalog,
    current: f64,
    previous: f64,
) -> MetricComparison {
    let change_percent = if previous == 0.0 {
        0.0
    } else {
        (current - previous) / previous * 100.0
    };
    MetricComparison {
        metric_id: metric_id.to_string(),
        metric_name: catalog.display_name(metric_id),
        current_value: current,
        previous_value: previous,
        change_percent,
        trend: TrendDirection::from_change_percent(change_percent),
    }
}
