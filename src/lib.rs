//! Reporting Analytics Library
//!
//! This crate provides the computation and scheduling core for the
//! dealer reporting suite: KPI comparison, trend and forecast engines,
//! ad hoc data-mart queries, automated insights, report execution with
//! cancellation, and the recurring schedule and mart-refresh jobs.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod catalog;
pub mod config;
pub mod errors;
pub mod execution;
pub mod jobs;
pub mod logging;
pub mod models;
pub mod period;
pub mod repositories;
pub mod sample;
pub mod services;

pub use catalog::MetricCatalog;
pub use config::{load_config, AnalyticsConfig, ForecastConfig, SchedulerConfig};
pub use errors::{AnalyticsError, AnalyticsResult};
pub use execution::ReportExecutionEngine;
pub use jobs::datamart_refresh::DataMartRefreshOrchestrator;
pub use jobs::scheduled_reports::ScheduleOrchestrator;
pub use services::analytics::AnalyticsService;
