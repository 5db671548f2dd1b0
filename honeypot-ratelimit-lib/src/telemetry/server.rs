use http::StatusCode;
use hyper::body::Incoming;
use hyper::{Request, Response};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use prometheus::Registry;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};

use super::health::{
    health_check_response, live_check_response, ready_check_response, text_response, RespBody,
};
use super::metrics_handler::handle_metrics;
use crate::error::Result;

/// Start the observability server on `0.0.0.0:port`
///
/// Serves:
/// - `/metrics` - Prometheus metrics
/// - `/health` - Health check endpoint
/// - `/ready` - Readiness check endpoint (tick driver running)
/// - `/live` - Liveness check endpoint
pub async fn start_observability_server(
    port: u16,
    registry: Registry,
    ticking: Arc<AtomicBool>,
    shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    serve_observability(listener, registry, ticking, shutdown).await
}

/// Serve observability endpoints on an already bound listener until `shutdown` flips.
pub async fn serve_observability(
    listener: TcpListener,
    registry: Registry,
    ticking: Arc<AtomicBool>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let registry = Arc::new(registry);
    let addr = listener.local_addr()?;

    info!(?addr, "Observability server started (metrics + health checks)");

    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    info!("Observability server: shutdown requested");
                    break;
                }
            }
            result = listener.accept() => {
                let (stream, peer) = match result {
                    Ok((stream, peer)) => (stream, peer),
                    Err(e) => {
                        warn!(error = %e, "Observability server: accept error");
                        continue;
                    }
                };

                let registry = registry.clone();
                let ticking = ticking.clone();
                tokio::spawn(async move {
                    let svc = hyper::service::service_fn(move |req: Request<Incoming>| {
                        let response = route(req.uri().path(), &registry, &ticking);
                        async move { Ok::<_, hyper::Error>(response) }
                    });

                    let builder = ConnBuilder::new(TokioExecutor::new());
                    if let Err(e) = builder.serve_connection(TokioIo::new(stream), svc).await {
                        warn!(?peer, error = %e, "Observability server: serve_connection error");
                    }
                });
            }
        }
    }

    info!("Observability server stopped");
    Ok(())
}

fn route(path: &str, registry: &Registry, ticking: &AtomicBool) -> Response<RespBody> {
    let result = match path {
        "/health" => health_check_response(),
        "/ready" => ready_check_response(ticking.load(Ordering::Relaxed)),
        "/live" => live_check_response(),
        "/metrics" => handle_metrics(registry),
        _ => return text_response(StatusCode::NOT_FOUND, "Not Found"),
    };

    result.unwrap_or_else(|e| {
        warn!(error = %e, path, "Observability server: failed to build response");
        text_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
    })
}
