use tracing_subscriber::{fmt, EnvFilter};

/// Initializes the global tracing subscriber.
///
/// Honors `RUST_LOG`, defaulting to `info` for this crate. Safe to call
/// once at process startup; embedding applications that install their own
/// subscriber should skip it.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,reporting_analytics=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .ok();
}
