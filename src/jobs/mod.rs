//! Periodic orchestration jobs.
//!
//! Each job runs on its own interval loop inside one spawned task, so a
//! job's ticks can never overlap themselves. Failures of individual due
//! items are isolated: logged, marked where applicable, and the tick
//! moves on.

pub mod datamart_refresh;
pub mod scheduled_reports;

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

/// Drives `tick` on a fixed interval within a single task. Delayed ticks
/// are not bunched up; the loop simply resumes its cadence.
pub(crate) fn spawn_periodic<F, Fut>(name: &'static str, period: Duration, tick: F) -> JoinHandle<()>
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send,
{
    tokio::spawn(async move {
        let mut timer = interval(period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(job = name, period_secs = period.as_secs(), "periodic job started");
        loop {
            timer.tick().await;
            tick().await;
        }
    })
}
