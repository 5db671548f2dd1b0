use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::error::{RateLimitError, Result};
use crate::security::rate_limit::DimensionKind;

pub fn load_from_path<P: AsRef<Path>>(p: P) -> Result<Config> {
    let txt = fs::read_to_string(p)
        .map_err(|e| RateLimitError::Config(format!("Failed to read config file: {e}")))?;
    let cfg: Config = toml::from_str(&txt)
        .map_err(|e| RateLimitError::Config(format!("Failed to parse config: {e}")))?;

    validate_config(&cfg)?;

    Ok(cfg)
}

/// Check everything that would otherwise only fail once the limiter is built.
pub fn validate_config(cfg: &Config) -> Result<()> {
    let (identity, content) = cfg.rate_limit.dimensions();
    identity.slot_count(DimensionKind::Identity)?;
    content.slot_count(DimensionKind::Content)?;

    if cfg.telemetry.metrics_port == Some(0) {
        return Err(RateLimitError::Config("telemetry.metrics_port must be > 0".to_string()));
    }

    if cfg.logging.level.trim().is_empty() {
        return Err(RateLimitError::Config("logging.level cannot be empty".to_string()));
    }

    Ok(())
}
