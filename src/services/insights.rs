//! Automated insight collection and ranking.
//!
//! Category providers hang off a registry so new categories are additive.
//! Merged insights are stable-sorted descending by significance, which
//! makes the tie-break explicit: equal significance keeps discovery order
//! (provider registration order, then each provider's own order).

use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

use crate::errors::{AnalyticsError, AnalyticsResult};
use crate::models::{Insight, InsightCategory};

/// Produces the current insights for one category.
#[async_trait]
pub trait InsightProvider: Send + Sync {
    async fn insights(&self, max_results: usize) -> AnalyticsResult<Vec<Insight>>;
}

/// Ranks insights across the registered category providers.
pub struct InsightRanker {
    providers: Vec<(InsightCategory, Arc<dyn InsightProvider>)>,
}

impl InsightRanker {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    pub fn register_provider(
        mut self,
        category: InsightCategory,
        provider: Arc<dyn InsightProvider>,
    ) -> Self {
        self.providers.push((category, provider));
        self
    }

    /// Insights for one area, or every registered area for `all`, merged
    /// and truncated to `max_results` globally (not per category).
    #[instrument(skip(self))]
    pub async fn insights(&self, area: &str, max_results: usize) -> AnalyticsResult<Vec<Insight>> {
        let selected: Vec<&Arc<dyn InsightProvider>> = if area == "all" {
            self.providers.iter().map(|(_, p)| p).collect()
        } else {
            let category = InsightCategory::from_str(area).map_err(|_| {
                AnalyticsError::validation(format!(
                    "Unknown insight area: {area}. Valid values are: all, sales, service, inventory, customer"
                ))
            })?;
            self.providers
                .iter()
                .filter(|(cat, _)| *cat == category)
                .map(|(_, p)| p)
                .collect()
        };

        let mut merged = Vec::new();
        for provider in selected {
            merged.extend(provider.insights(max_results).await?);
        }

        // Stable sort: ties keep discovery order.
        merged.sort_by(|a, b| {
            b.significance
                .partial_cmp(&a.significance)
                .unwrap_or(Ordering::Equal)
        });
        merged.truncate(max_results);

        info!(area, count = merged.len(), "ranked insights");
        Ok(merged)
    }
}

impl Default for InsightRanker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Utc;
    use uuid::Uuid;

    struct StaticInsights(Vec<Insight>);

    #[async_trait]
    impl InsightProvider for StaticInsights {
        async fn insights(&self, _max_results: usize) -> AnalyticsResult<Vec<Insight>> {
            Ok(self.0.clone())
        }
    }

    fn insight(title: &str, category: InsightCategory, significance: f64) -> Insight {
        Insight {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: String::new(),
            category,
            significance,
            data_points: Vec::new(),
            recommended_action: String::new(),
            discovered_at: Utc::now(),
        }
    }

    fn ranker() -> InsightRanker {
        InsightRanker::new()
            .register_provider(
                InsightCategory::Sales,
                Arc::new(StaticInsights(vec![
                    insight("suv sales up", InsightCategory::Sales, 0.85),
                    insight("weekend conversion down", InsightCategory::Sales, 0.75),
                ])),
            )
            .register_provider(
                InsightCategory::Service,
                Arc::new(StaticInsights(vec![insight(
                    "brake margin up",
                    InsightCategory::Service,
                    0.85,
                )])),
            )
            .register_provider(
                InsightCategory::Customer,
                Arc::new(StaticInsights(vec![insight(
                    "service loyalty converts",
                    InsightCategory::Customer,
                    0.9,
                )])),
            )
    }

    #[tokio::test]
    async fn all_areas_sorted_non_increasing_and_truncated() {
        let top = ranker().insights("all", 3).await.unwrap();
        assert_eq!(top.len(), 3);
        for pair in top.windows(2) {
            assert!(pair[0].significance >= pair[1].significance);
        }
        assert_eq!(top[0].title, "service loyalty converts");
    }

    #[tokio::test]
    async fn ties_keep_discovery_order() {
        let top = ranker().insights("all", 4).await.unwrap();
        // sales and service both sit at 0.85; sales registered first.
        assert_eq!(top[1].title, "suv sales up");
        assert_eq!(top[2].title, "brake margin up");
    }

    #[tokio::test]
    async fn truncation_is_global_not_per_category() {
        let top = ranker().insights("all", 1).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].category, InsightCategory::Customer);
    }

    #[tokio::test]
    async fn single_area_only_invokes_that_category() {
        let sales = ranker().insights("sales", 10).await.unwrap();
        assert_eq!(sales.len(), 2);
        assert!(sales.iter().all(|i| i.category == InsightCategory::Sales));
    }

    #[tokio::test]
    async fn unknown_area_is_rejected() {
        assert_matches!(
            ranker().insights("logistics", 5).await,
            Err(AnalyticsError::Validation(_))
        );
    }

    #[tokio::test]
    async fn output_never_exceeds_max_results() {
        for max in [0, 1, 2, 3, 10] {
            let result = ranker().insights("all", max).await.unwrap();
            assert!(result.len() <= max);
        }
    }
}
