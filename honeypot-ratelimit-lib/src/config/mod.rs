mod loader;
mod rate_limit;
mod root;
mod telemetry;

pub use loader::{load_from_path, validate_config};
pub use rate_limit::{DimensionLimits, RateLimitConfig};
pub use root::Config;
pub use telemetry::{LoggingConfig, TelemetryConfig};
