use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::limiter::RateLimiter;

/// Something aged forward by a periodic tick.
pub trait Advance: Send + Sync + 'static {
    fn advance(&self);
}

impl Advance for RateLimiter {
    fn advance(&self) {
        self.advance_time();
    }
}

/// Background task calling [`Advance::advance`] once per period.
///
/// The first tick fires one full period after start. Ticks missed because the runtime was
/// busy are delivered back to back so aging keeps pace with wall-clock time.
///
/// Uses the tokio clock, so tests can pause and advance time instead of sleeping. Dropping
/// the driver without calling [`TickDriver::stop`] also ends the task, at its next wakeup.
pub struct TickDriver {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
    running: Arc<AtomicBool>,
}

impl TickDriver {
    /// Spawn the tick task on the current tokio runtime.
    pub fn start<A: Advance + ?Sized>(target: Arc<A>, period: Duration) -> Self {
        let period = if period.is_zero() {
            warn!("Tick period of zero requested, using 1ms");
            Duration::from_millis(1)
        } else {
            period
        };

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let running = Arc::new(AtomicBool::new(true));
        let running_task = Arc::clone(&running);

        let handle = tokio::spawn(async move {
            let start = Instant::now().checked_add(period).unwrap_or_else(Instant::now);
            let mut interval = tokio::time::interval_at(start, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Burst);

            info!(?period, "Rate limit tick driver started");
            loop {
                tokio::select! {
                    _ = interval.tick() => target.advance(),
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            running_task.store(false, Ordering::Relaxed);
            info!("Rate limit tick driver stopped");
        });

        Self { shutdown_tx, handle, running }
    }

    /// Whether the tick task is still looping.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Shared liveness flag, cleared when the task exits.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Signal the task to stop and wait for it to exit.
    pub async fn stop(self) {
        if self.shutdown_tx.send(true).is_err() {
            debug!("Tick driver already stopped");
        }
        if let Err(e) = self.handle.await {
            warn!(error = %e, "Tick driver task failed");
        }
    }
}
