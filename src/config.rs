use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Default values for configuration
const DEFAULT_SCHEDULE_TICK_SECS: u64 = 300; // report schedules checked every 5 minutes
const DEFAULT_MART_TICK_SECS: u64 = 3_600; // mart refresh due-check every hour
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
const DEFAULT_EXECUTION_TIMEOUT_SECS: u64 = 300;
const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.9;
const DEFAULT_NOISE_AMPLITUDE: f64 = 0.1;
const DEFAULT_UNCERTAINTY_RATE: f64 = 0.05;
const CONFIG_DIR: &str = "config";

/// Forecast tuning knobs.
#[derive(Clone, Debug, Deserialize)]
pub struct ForecastConfig {
    /// Scalar confidence level attached to every forecast result.
    #[serde(default = "default_confidence_level")]
    pub confidence_level: f64,

    /// Amplitude of the bounded noise term relative to the last observed
    /// value. Zero disables noise and makes forecasts deterministic.
    #[serde(default = "default_noise_amplitude")]
    pub noise_amplitude: f64,

    /// Per-horizon-step uncertainty rate relative to the forecast value.
    #[serde(default = "default_uncertainty_rate")]
    pub uncertainty_rate: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            noise_amplitude: DEFAULT_NOISE_AMPLITUDE,
            uncertainty_rate: DEFAULT_UNCERTAINTY_RATE,
        }
    }
}

/// Timing for the two periodic orchestrators.
#[derive(Clone, Debug, Deserialize)]
pub struct SchedulerConfig {
    /// Interval between schedule-orchestrator ticks, in seconds.
    #[serde(default = "default_schedule_tick_secs")]
    pub schedule_tick_secs: u64,

    /// Interval between data-mart refresh ticks, in seconds.
    #[serde(default = "default_mart_tick_secs")]
    pub mart_tick_secs: u64,

    /// How often a waiting tick polls execution status, in seconds.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Cap on waiting for one execution before it is canceled, in seconds.
    #[serde(default = "default_execution_timeout_secs")]
    pub execution_timeout_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            schedule_tick_secs: DEFAULT_SCHEDULE_TICK_SECS,
            mart_tick_secs: DEFAULT_MART_TICK_SECS,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            execution_timeout_secs: DEFAULT_EXECUTION_TIMEOUT_SECS,
        }
    }
}

/// Top-level configuration for the analytics core.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default)]
    pub forecast: ForecastConfig,

    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

fn default_confidence_level() -> f64 {
    DEFAULT_CONFIDENCE_LEVEL
}
fn default_noise_amplitude() -> f64 {
    DEFAULT_NOISE_AMPLITUDE
}
fn default_uncertainty_rate() -> f64 {
    DEFAULT_UNCERTAINTY_RATE
}
fn default_schedule_tick_secs() -> u64 {
    DEFAULT_SCHEDULE_TICK_SECS
}
fn default_mart_tick_secs() -> u64 {
    DEFAULT_MART_TICK_SECS
}
fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}
fn default_execution_timeout_secs() -> u64 {
    DEFAULT_EXECUTION_TIMEOUT_SECS
}

/// Loads configuration from layered sources:
/// 1. Built-in defaults
/// 2. Optional `config/default.toml`
/// 3. Environment variables (`ANALYTICS__*`, `__` as separator)
pub fn load_config() -> Result<AnalyticsConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name(&format!("{CONFIG_DIR}/default")).required(false))
        .add_source(Environment::with_prefix("ANALYTICS").separator("__"));

    builder.build()?.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_timings() {
        let cfg = AnalyticsConfig::default();
        assert_eq!(cfg.scheduler.poll_interval_secs, 5);
        assert_eq!(cfg.scheduler.execution_timeout_secs, 300);
        assert!((cfg.forecast.confidence_level - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_sources_deserialize_to_defaults() {
        let cfg: AnalyticsConfig = Config::builder()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(cfg.scheduler.schedule_tick_secs, 300);
        assert!((cfg.forecast.noise_amplitude - 0.1).abs() < f64::EPSILON);
    }
}
