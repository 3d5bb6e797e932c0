//! Tracing/logging initialisation for hosts that have no subscriber of
//! their own.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Log line format emitted by [`init_tracing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable single-line output.
    #[default]
    Text,
    /// Structured JSON lines, for log shippers.
    Json,
}

/// Initialise the global tracing subscriber.
///
/// `default_filter` is the filter used when `RUST_LOG` is not set,
/// e.g. `"grantflow_core=info"`. Call at most once per process; hosts
/// that already install a subscriber should skip this entirely.
pub fn init_tracing(default_filter: &str, format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
    );
    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}
