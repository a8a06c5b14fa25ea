//! Built-in degraded-mode sample data.
//!
//! Served only when the analytics mart is unreachable; production
//! computation paths never touch this module. The data is fixed rather
//! than pseudo-randomly generated so degraded output is reproducible.

use async_trait::async_trait;

use crate::services::recommendations::{
    CustomerChurnPrediction, FallbackSampleProvider, InventoryRecommendation, StockAction,
};

/// The sample provider wired in by default.
pub struct StaticSampleProvider;

#[async_trait]
impl FallbackSampleProvider for StaticSampleProvider {
    async fn inventory_recommendations(&self) -> Vec<InventoryRecommendation> {
        vec![
            InventoryRecommendation {
                make: "Toyota".to_string(),
                model: "RAV4".to_string(),
                year: 2023,
                current_stock: 12,
                recommended_stock: 18,
                stock_delta: 6,
                action: StockAction::Increase,
                sales_velocity: 0.9,
                days_supply: 13,
            },
            InventoryRecommendation {
                make: "Honda".to_string(),
                model: "Civic".to_string(),
                year: 2023,
                current_stock: 15,
                recommended_stock: 10,
                stock_delta: -5,
                action: StockAction::Decrease,
                sales_velocity: 0.5,
                days_supply: 30,
            },
            InventoryRecommendation {
                make: "Ford".to_string(),
                model: "F-150".to_string(),
                year: 2024,
                current_stock: 8,
                recommended_stock: 8,
                stock_delta: 0,
                action: StockAction::Maintain,
                sales_velocity: 0.7,
                days_supply: 11,
            },
        ]
    }

    async fn churn_predictions(&self, min_risk_score: f64) -> Vec<CustomerChurnPrediction> {
        let samples = vec![
            CustomerChurnPrediction {
                customer_id: "C1001".to_string(),
                customer_name: "John Smith".to_string(),
                churn_risk_score: 0.87,
                risk_category: "High".to_string(),
                lifetime_value: 45_000.0,
                days_since_last_purchase: 180,
                churn_factors: vec![
                    "Limited service visits".to_string(),
                    "No response to promotions".to_string(),
                    "New vehicle purchase due".to_string(),
                ],
                recommended_actions: vec![
                    "Personal call from manager".to_string(),
                    "Special trade-in offer".to_string(),
                    "Service discount".to_string(),
                ],
            },
            CustomerChurnPrediction {
                customer_id: "C1254".to_string(),
                customer_name: "Jane Doe".to_string(),
                churn_risk_score: 0.72,
                risk_category: "High".to_string(),
                lifetime_value: 32_000.0,
                days_since_last_purchase: 145,
                churn_factors: vec![
                    "Bad service experience".to_string(),
                    "Multiple vehicle issues".to_string(),
                    "Long service wait times".to_string(),
                ],
                recommended_actions: vec![
                    "Service recovery plan".to_string(),
                    "Complimentary service".to_string(),
                    "Express service option".to_string(),
                ],
            },
            CustomerChurnPrediction {
                customer_id: "C2087".to_string(),
                customer_name: "Maria Garcia".to_string(),
                churn_risk_score: 0.55,
                risk_category: "Medium".to_string(),
                lifetime_value: 28_500.0,
                days_since_last_purchase: 95,
                churn_factors: vec!["Declining service frequency".to_string()],
                recommended_actions: vec!["Maintenance reminder campaign".to_string()],
            },
        ];

        samples
            .into_iter()
            .filter(|p| p.churn_risk_score >= min_risk_score)
            .collect()
    }
}
