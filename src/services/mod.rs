pub mod adhoc;
pub mod analytics;
pub mod forecasting;
pub mod insights;
pub mod kpi;
pub mod recommendations;
pub mod trends;

pub use adhoc::{AdHocQueryExecutor, AdHocQueryRequest, AdHocQueryResult};
pub use analytics::AnalyticsService;
pub use forecasting::{ForecastEngine, ForecastRequest, ForecastResult, Granularity};
pub use insights::{InsightProvider, InsightRanker};
pub use kpi::{ComparisonResult, KpiComparator, KpiProvider, MetricComparison};
pub use recommendations::{
    CustomerChurnPrediction, FallbackSampleProvider, InventoryRecommendation,
    RecommendationService, StockAction,
};
pub use trends::{CompareWith, TimeFrame, TrendEngine, TrendResult};
