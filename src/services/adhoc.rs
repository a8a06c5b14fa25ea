//! Ad-hoc query execution against named data marts.
//!
//! The executor validates the request shape before the repository is
//! touched and assembles the output column list; query building and
//! execution belong to the data-mart collaborator. Collaborator failures
//! are logged and propagated, never masked.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, instrument};

use crate::errors::{AnalyticsError, AnalyticsResult};
use crate::repositories::DataMartRepository;

/// One tabular query over a data mart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdHocQueryRequest {
    pub data_mart_name: String,
    pub dimensions: Vec<String>,
    pub measures: Vec<String>,
    pub filter: Option<String>,
    pub sort_by: Option<String>,
    pub limit: Option<u64>,
}

/// Materialized rows with the column list in request order: dimensions
/// first, then measures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdHocQueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Value>,
    pub total_count: u64,
}

pub struct AdHocQueryExecutor {
    marts: Arc<dyn DataMartRepository>,
}

impl AdHocQueryExecutor {
    pub fn new(marts: Arc<dyn DataMartRepository>) -> Self {
        Self { marts }
    }

    #[instrument(skip(self, request), fields(mart = %request.data_mart_name))]
    pub async fn execute(&self, request: &AdHocQueryRequest) -> AnalyticsResult<AdHocQueryResult> {
        if request.data_mart_name.is_empty() {
            return Err(AnalyticsError::validation("Data mart name is required"));
        }
        if request.dimensions.is_empty() {
            return Err(AnalyticsError::validation(
                "At least one dimension must be specified",
            ));
        }
        if request.measures.is_empty() {
            return Err(AnalyticsError::validation(
                "At least one measure must be specified",
            ));
        }

        let query_result = self
            .marts
            .execute_ad_hoc_query(
                &request.data_mart_name,
                &request.dimensions,
                &request.measures,
                request.filter.as_deref(),
                request.sort_by.as_deref(),
                request.limit,
            )
            .await
            .map_err(|err| {
                error!(mart = %request.data_mart_name, error = %err, "ad hoc query failed");
                err
            })?;

        let mut columns =
            Vec::with_capacity(request.dimensions.len() + request.measures.len());
        columns.extend(request.dimensions.iter().cloned());
        columns.extend(request.measures.iter().cloned());

        info!(
            mart = %request.data_mart_name,
            rows = query_result.rows.len(),
            total = query_result.total_count,
            "ad hoc query complete"
        );

        Ok(AdHocQueryResult {
            columns,
            rows: query_result.rows,
            total_count: query_result.total_count,
        })
    }
}
