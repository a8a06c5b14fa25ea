//! Inventory stocking recommendations and customer churn predictions.
//!
//! Both read precomputed model output from the analytics mart. When the
//! mart is unreachable they degrade to an injected sample provider instead
//! of failing; availability wins over correctness here. The sample
//! provider is a swappable trait kept out of the production computation
//! path.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::errors::AnalyticsResult;
use crate::repositories::DataMartRepository;

/// Stocking advice for one vehicle line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryRecommendation {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub current_stock: i32,
    pub recommended_stock: i32,
    pub stock_delta: i32,
    pub action: StockAction,
    pub sales_velocity: f64,
    pub days_supply: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockAction {
    Increase,
    Decrease,
    Maintain,
}

/// One customer's churn risk with contributing factors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerChurnPrediction {
    pub customer_id: String,
    pub customer_name: String,
    pub churn_risk_score: f64,
    pub risk_category: String,
    pub lifetime_value: f64,
    pub days_since_last_purchase: i64,
    pub churn_factors: Vec<String>,
    pub recommended_actions: Vec<String>,
}

/// Degraded-mode data served when the mart is unreachable.
#[async_trait]
pub trait FallbackSampleProvider: Send + Sync {
    async fn inventory_recommendations(&self) -> Vec<InventoryRecommendation>;
    async fn churn_predictions(&self, min_risk_score: f64) -> Vec<CustomerChurnPrediction>;
}

pub struct RecommendationService {
    marts: Arc<dyn DataMartRepository>,
    fallback: Arc<dyn FallbackSampleProvider>,
}

impl RecommendationService {
    pub fn new(
        marts: Arc<dyn DataMartRepository>,
        fallback: Arc<dyn FallbackSampleProvider>,
    ) -> Self {
        Self { marts, fallback }
    }

    #[instrument(skip(self))]
    pub async fn inventory_recommendations(
        &self,
    ) -> AnalyticsResult<Vec<InventoryRecommendation>> {
        match self.marts.inventory_recommendations().await {
            Ok(recommendations) => Ok(recommendations),
            Err(err) => {
                warn!(error = %err, "inventory recommendation query failed, serving sample data");
                Ok(self.fallback.inventory_recommendations().await)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn churn_predictions(
        &self,
        min_risk_score: f64,
    ) -> AnalyticsResult<Vec<CustomerChurnPrediction>> {
        match self.marts.churn_predictions(min_risk_score).await {
            Ok(predictions) => Ok(predictions),
            Err(err) => {
                warn!(error = %err, "churn prediction query failed, serving sample data");
                Ok(self.fallback.churn_predictions(min_risk_score).await)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    use crate::errors::AnalyticsError;
    use crate::models::{DataMartDefinition, DataMartStatus};
    use crate::repositories::MartQueryResult;
    use crate::sample::StaticSampleProvider;

    struct OfflineMarts;

    #[async_trait]
    impl DataMartRepository for OfflineMarts {
        async fn all_marts(&self) -> AnalyticsResult<Vec<DataMartDefinition>> {
            Err(AnalyticsError::external("mart offline"))
        }

        async fn marts_due_for_refresh(
            &self,
            _now: DateTime<Utc>,
        ) -> AnalyticsResult<Vec<DataMartDefinition>> {
            Err(AnalyticsError::external("mart offline"))
        }

        async fn update_status(
            &self,
            _mart_id: Uuid,
            _status: DataMartStatus,
            _last_refresh: Option<DateTime<Utc>>,
        ) -> AnalyticsResult<()> {
            Err(AnalyticsError::external("mart offline"))
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
            Err(AnalyticsError::external("mart offline"))
        }

        async fn inventory_recommendations(
            &self,
        ) -> AnalyticsResult<Vec<InventoryRecommendation>> {
            Err(AnalyticsError::external("mart offline"))
        }

        async fn churn_predictions(
            &self,
            _min_risk_score: f64,
        ) -> AnalyticsResult<Vec<CustomerChurnPrediction>> {
            Err(AnalyticsError::external("mart offline"))
        }
    }

    #[tokio::test]
    async fn mart_failure_degrades_to_sample_recommendations() {
        let service =
            RecommendationService::new(Arc::new(OfflineMarts), Arc::new(StaticSampleProvider));
        let recs = service.inventory_recommendations().await.unwrap();
        assert!(!recs.is_empty());
        for rec in &recs {
            assert_eq!(rec.stock_delta, rec.recommended_stock - rec.current_stock);
        }
    }

    #[tokio::test]
    async fn sample_churn_predictions_respect_the_risk_floor() {
        let service =
            RecommendationService::new(Arc::new(OfflineMarts), Arc::new(StaticSampleProvider));
        let predictions = service.churn_predictions(0.8).await.unwrap();
        assert!(predictions.iter().all(|p| p.churn_risk_score >= 0.8));
    }
}
