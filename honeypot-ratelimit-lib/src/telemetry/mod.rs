pub mod health;
pub mod metrics;
pub mod metrics_handler;
pub mod server;
pub mod tracing;

pub use health::{health_check_response, live_check_response, ready_check_response};
pub use metrics::{build_meter_provider, init_metrics, rate_limiter_metrics};
pub use metrics_handler::handle_metrics;
pub use server::{serve_observability, start_observability_server};
pub use self::tracing::init_tracing;
