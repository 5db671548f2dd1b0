use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while configuring or running the rate limiter
///
/// Admission denials are not errors: they are reported through
/// [`RateLimitResult`](crate::security::rate_limit::RateLimitResult).
#[derive(Error, Debug)]
pub enum RateLimitError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(
        "Invalid {dimension} window: {window:?} must be a positive multiple of the {slot:?} slot"
    )]
    InvalidWindow { dimension: &'static str, window: Duration, slot: Duration },

    #[error("Identity slot ({identity:?}) and content slot ({content:?}) must match")]
    SlotMismatch { identity: Duration, content: Duration },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Metrics error: {0}")]
    Metrics(String),
}

pub type Result<T> = std::result::Result<T, RateLimitError>;
