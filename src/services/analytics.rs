//! Analytics facade.
//!
//! One entry point over the individual engines so the controller layer
//! holds a single handle. The engines themselves take an explicit `today`
//! so their behavior stays deterministic under test; the facade is where
//! the wall clock comes in.

use std::sync::Arc;

use chrono::Utc;

use crate::errors::AnalyticsResult;
use crate::models::{Insight, KpiResult};
use crate::services::adhoc::{AdHocQueryExecutor, AdHocQueryRequest, AdHocQueryResult};
use crate::services::forecasting::{ForecastEngine, ForecastRequest, ForecastResult};
use crate::services::insights::InsightRanker;
use crate::services::kpi::{ComparisonResult, KpiComparator};
use crate::services::recommendations::{
    CustomerChurnPrediction, InventoryRecommendation, RecommendationService,
};
use crate::services::trends::{TrendEngine, TrendResult};

pub struct AnalyticsService {
    kpis: Arc<KpiComparator>,
    trends: Arc<TrendEngine>,
    forecasts: Arc<ForecastEngine>,
    queries: Arc<AdHocQueryExecutor>,
    insights: Arc<InsightRanker>,
    recommendations: Arc<RecommendationService>,
}

impl AnalyticsService {
    pub fn new(
        kpis: Arc<KpiComparator>,
        trends: Arc<TrendEngine>,
        forecasts: Arc<ForecastEngine>,
        queries: Arc<AdHocQueryExecutor>,
        insights: Arc<InsightRanker>,
        recommendations: Arc<RecommendationService>,
    ) -> Self {
        Self {
            kpis,
            trends,
            forecasts,
            queries,
            insights,
            recommendations,
        }
    }

    /// Current KPIs for a department, or for all departments.
    pub async fn dashboard_kpis(&self, department: &str) -> AnalyticsResult<Vec<KpiResult>> {
        self.kpis.kpis(department).await
    }

    /// Recent time series for a metric, optionally with a comparison
    /// series from an earlier window.
    pub async fn trend_analysis(
        &self,
        metric_id: &str,
        time_frame: &str,
        compare_with: Option<&str>,
    ) -> AnalyticsResult<TrendResult> {
        self.trends
            .trend(metric_id, time_frame, compare_with, Utc::now().date_naive())
            .await
    }

    pub async fn generate_forecast(
        &self,
        request: &ForecastRequest,
    ) -> AnalyticsResult<ForecastResult> {
        self.forecasts.forecast(request).await
    }

    /// Compares every metric of a group between two period identifiers
    /// such as `2023-05` or `YTD`.
    pub async fn period_comparison(
        &self,
        metric_group: &str,
        current_period: &str,
        previous_period: &str,
    ) -> AnalyticsResult<ComparisonResult> {
        self.kpis
            .compare_periods(
                metric_group,
                current_period,
                previous_period,
                Utc::now().date_naive(),
            )
            .await
    }

    pub async fn execute_ad_hoc_query(
        &self,
        request: &AdHocQueryRequest,
    ) -> AnalyticsResult<AdHocQueryResult> {
        self.queries.execute(request).await
    }

    /// Most significant insights for an area, best first.
    pub async fn automated_insights(
        &self,
        area: &str,
        max_results: usize,
    ) -> AnalyticsResult<Vec<Insight>> {
        self.insights.insights(area, max_results).await
    }

    pub async fn inventory_recommendations(
        &self,
    ) -> AnalyticsResult<Vec<InventoryRecommendation>> {
        self.recommendations.inventory_recommendations().await
    }

    pub async fn churn_predictions(
        &self,
        min_risk_score: f64,
    ) -> AnalyticsResult<Vec<CustomerChurnPrediction>> {
        self.recommendations.churn_predictions(min_risk_score).await
    }
}
