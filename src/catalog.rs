//! Static metric catalog.
//!
//! An explicit, injected read-only lookup structure rather than literals
//! embedded in the engines, so tests can swap in their own catalog.

use std::collections::HashMap;
use std::str::FromStr;

use crate::errors::{AnalyticsError, AnalyticsResult};
use crate::models::{Metric, MetricGroup};

/// Read-only metric-id to display-name / group mappings.
#[derive(Debug, Clone)]
pub struct MetricCatalog {
    metrics: Vec<Metric>,
    by_id: HashMap<String, usize>,
    by_group: HashMap<MetricGroup, Vec<String>>,
}

impl MetricCatalog {
    pub fn new(metrics: Vec<Metric>) -> Self {
        let mut by_id = HashMap::new();
        let mut by_group: HashMap<MetricGroup, Vec<String>> = HashMap::new();
        for (idx, metric) in metrics.iter().enumerate() {
            by_id.insert(metric.id.clone(), idx);
            by_group.entry(metric.group).or_default().push(metric.id.clone());
        }
        Self {
            metrics,
            by_id,
            by_group,
        }
    }

    pub fn metric(&self, metric_id: &str) -> Option<&Metric> {
        self.by_id.get(metric_id).map(|&idx| &self.metrics[idx])
    }

    /// Display name for a metric id, falling back to the id itself for
    /// metrics the catalog does not know.
    pub fn display_name(&self, metric_id: &str) -> String {
        self.metric(metric_id)
            .map(|m| m.display_name.clone())
            .unwrap_or_else(|| metric_id.to_string())
    }

    /// Unit for a metric id; unknown metrics report a dimensionless count.
    pub fn unit(&self, metric_id: &str) -> String {
        self.metric(metric_id)
            .map(|m| m.unit.clone())
            .unwrap_or_else(|| "count".to_string())
    }

    /// Metric ids belonging to a named group.
    pub fn group_metrics(&self, group: &str) -> AnalyticsResult<&[String]> {
        let group = MetricGroup::from_str(group).map_err(|_| {
            AnalyticsError::validation(format!(
                "Unknown metric group: {group}. Valid groups are: sales, service, inventory, financial"
            ))
        })?;
        Ok(self
            .by_group
            .get(&group)
            .map(Vec::as_slice)
            .unwrap_or_default())
    }
}

impl Default for MetricCatalog {
    /// The dealership metric tables the suite ships with.
    fn default() -> Self {
        fn m(id: &str, name: &str, group: MetricGroup, unit: &str) -> Metric {
            Metric {
                id: id.to_string(),
                display_name: name.to_string(),
                group,
                unit: unit.to_string(),
            }
        }

        use MetricGroup::*;
        Self::new(vec![
            m("sales_total_mtd", "Total Sales Month-to-Date", Sales, "currency"),
            m("sales_units_mtd", "Units Sold Month-to-Date", Sales, "count"),
            m("sales_avg_profit", "Average Profit per Vehicle", Sales, "currency"),
            m("sales_closing_ratio", "Lead Closing Ratio", Sales, "percent"),
            m("service_revenue_mtd", "Service Revenue MTD", Service, "currency"),
            m("service_ro_count", "Service RO Count", Service, "count"),
            m("service_efficiency", "Technician Efficiency", Service, "percent"),
            m("service_csi", "Service CSI", Service, "percent"),
            m("inventory_total_value", "Total Inventory Value", Inventory, "currency"),
            m("inventory_days_supply", "Days Supply", Inventory, "days"),
            m("inventory_turn_rate", "Inventory Turn Rate", Inventory, "ratio"),
            m("inventory_aging_over_60", "Units Aging Over 60 Days", Inventory, "count"),
            m("financial_gross_profit", "Gross Profit MTD", Financial, "currency"),
            m("financial_expenses", "Operating Expenses MTD", Financial, "currency"),
            m("financial_net_profit", "Net Profit MTD", Financial, "currency"),
            m("financial_roi", "Return on Investment", Financial, "percent"),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn display_name_falls_back_to_the_id() {
        let catalog = MetricCatalog::default();
        assert_eq!(
            catalog.display_name("sales_total_mtd"),
            "Total Sales Month-to-Date"
        );
        assert_eq!(catalog.display_name("custom_metric_42"), "custom_metric_42");
    }

    #[test]
    fn each_group_has_its_metrics() {
        let catalog = MetricCatalog::default();
        for group in MetricGroup::ALL {
            let ids = catalog.group_metrics(&group.to_string()).unwrap();
            assert!(!ids.is_empty());
            for id in ids {
                assert_eq!(catalog.metric(id).unwrap().group, group);
            }
        }
    }

    #[test]
    fn unknown_group_lists_valid_groups() {
        let catalog = MetricCatalog::default();
        let err = catalog.group_metrics("marketing").unwrap_err();
        assert_matches!(&err, AnalyticsError::Validation(msg) => {
            assert!(msg.contains("sales, service, inventory, financial"));
        });
    }
}
