use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

use crate::config::LoggingConfig;
use crate::error::{RateLimitError, Result};

/// Build the env filter: `RUST_LOG` wins when set, otherwise the configured levels apply.
pub fn build_env_filter(logging: &LoggingConfig, otel_log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{},opentelemetry={otel_log_level}", logging.level))
    })
}

/// Install the global tracing subscriber.
pub fn init_tracing(logging: &LoggingConfig, otel_log_level: &str) -> Result<()> {
    let env_filter = build_env_filter(logging, otel_log_level);
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(logging.show_target);

    let subscriber = Registry::default().with(env_filter).with(fmt_layer);

    tracing::subscriber::set_global_default(subscriber).map_err(|e| {
        RateLimitError::Config(format!("Failed to set global tracing subscriber: {e}"))
    })?;

    Ok(())
}
