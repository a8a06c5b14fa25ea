//! Forecast generation.
//!
//! Extrapolates a metric's history with a linear trend plus bounded noise
//! and widening uncertainty bounds. An optional external predictor is
//! attempted first; any failure of it falls back to the local algorithm so
//! a forecast request never fails because the model server is down.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{Days, Months, NaiveDate};
use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{info, instrument, warn};

use crate::config::ForecastConfig;
use crate::errors::{AnalyticsError, AnalyticsResult};
use crate::models::{ForecastPoint, TrendPoint};
use crate::repositories::{ForecastModel, MetricSource};

const MAX_PERIODS: u32 = 365;

/// Time step of a forecast horizon.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Week,
    Month,
}

impl Granularity {
    pub fn parse(s: &str) -> AnalyticsResult<Self> {
        Self::from_str(s).map_err(|_| {
            AnalyticsError::validation(format!(
                "Invalid time granularity: {s}. Valid values are: day, week, month"
            ))
        })
    }

    fn advance(&self, date: NaiveDate, steps: u32) -> NaiveDate {
        match self {
            Granularity::Day => date + Days::new(u64::from(steps)),
            Granularity::Week => date + Days::new(u64::from(steps) * 7),
            Granularity::Month => date + Months::new(steps),
        }
    }
}

/// A forecast request as the controller layer hands it over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub metric_name: String,
    pub granularity: String,
    pub periods: u32,
    pub filter: Option<String>,
}

/// A generated forecast with one scalar confidence level for the whole
/// horizon (a documented simplification; bounds are per point, confidence
/// is not).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResult {
    pub metric_name: String,
    pub points: Vec<ForecastPoint>,
    pub confidence_level: f64,
}

/// Generates forecasts from historical series.
pub struct ForecastEngine {
    source: Arc<dyn MetricSource>,
    predictor: Option<Arc<dyn ForecastModel>>,
    config: ForecastConfig,
}

impl ForecastEngine {
    pub fn new(
        source: Arc<dyn MetricSource>,
        predictor: Option<Arc<dyn ForecastModel>>,
        config: ForecastConfig,
    ) -> Self {
        Self {
            source,
            predictor,
            config,
        }
    }

    #[instrument(skip(self, request), fields(metric = %request.metric_name))]
    pub async fn forecast(&self, request: &ForecastRequest) -> AnalyticsResult<ForecastResult> {
        if request.metric_name.is_empty() {
            return Err(AnalyticsError::validation("Metric name is required"));
        }
        let granularity = Granularity::parse(&request.granularity)?;
        if request.periods == 0 || request.periods > MAX_PERIODS {
            return Err(AnalyticsError::validation(format!(
                "Invalid number of periods: {}. Must be between 1 and {MAX_PERIODS}",
                request.periods
            )));
        }

        let history = self
            .source
            .history(&request.metric_name, granularity, request.filter.as_deref())
            .await?;
        if history.len() < 2 {
            return Err(AnalyticsError::validation(format!(
                "Not enough historical data for metric {}: need at least 2 points, got {}",
                request.metric_name,
                history.len()
            )));
        }

        let points = match self.external_forecast(request, granularity).await {
            Some(points) => points,
            None => self.linear_trend(&history, granularity, request.periods),
        };

        info!(
            metric = %request.metric_name,
            periods = request.periods,
            "forecast generated"
        );

        Ok(ForecastResult {
            metric_name: request.metric_name.clone(),
            points,
            confidence_level: self.config.confidence_level,
        })
    }

    /// Attempts the external predictor. Returns `None` when no predictor
    /// is configured or when it fails, which sends the request down the
    /// local path instead of surfacing the failure.
    async fn external_forecast(
        &self,
        request: &ForecastRequest,
        granularity: Granularity,
    ) -> Option<Vec<ForecastPoint>> {
        let predictor = self.predictor.as_ref()?;
        match predictor
            .forecast(&request.metric_name, request.periods, granularity)
            .await
        {
            Ok(points) if !points.is_empty() => Some(points),
            Ok(_) => {
                warn!(
                    metric = %request.metric_name,
                    "external predictor returned no points, using local algorithm"
                );
                None
            }
            Err(err) => {
                warn!(
                    metric = %request.metric_name,
                    error = %err,
                    "external predictor failed, using local algorithm"
                );
                None
            }
        }
    }

    /// Linear trend with bounded noise: slope is the mean first difference
    /// of the history, values are clamped at zero, and uncertainty grows
    /// with the horizon (monotone, never shrinking).
    fn linear_trend(
        &self,
        history: &[TrendPoint],
        granularity: Granularity,
        periods: u32,
    ) -> Vec<ForecastPoint> {
        let slope = history
            .windows(2)
            .map(|pair| pair[1].value - pair[0].value)
            .sum::<f64>()
            / (history.len() - 1) as f64;

        let last = history[history.len() - 1];
        let mut rng = rand::thread_rng();
        let mut points = Vec::with_capacity(periods as usize);
        let mut uncertainty = 0.0_f64;

        for i in 1..=periods {
            let noise = if self.config.noise_amplitude == 0.0 {
                0.0
            } else {
                (rng.gen::<f64>() - 0.5) * self.config.noise_amplitude * last.value
            };
            let value = (last.value + slope * f64::from(i) + noise).max(0.0);
            uncertainty =
                uncertainty.max(self.config.uncertainty_rate * value * f64::from(i));
            points.push(ForecastPoint {
                date: granularity.advance(last.date, i),
                value,
                lower_bound: value - uncertainty,
                upper_bound: value + uncertainty,
            });
        }
        points
    }
}
