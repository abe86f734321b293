//! Background task that periodically removes expired links.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::application::services::LinkService;

/// Runs [`LinkService::cleanup_expired`] every `every` until `shutdown` flips
/// to `true` or its sender is dropped.
///
/// The first sweep happens one full interval after start. A failed sweep is
/// logged and retried on the next tick.
pub async fn run_expiry_sweeper(
    service: Arc<LinkService>,
    every: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + every, every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(interval_secs = every.as_secs(), "Expiry sweeper started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = service.cleanup_expired().await {
                    tracing::warn!(error = %e, "Expiry sweep failed");
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    tracing::info!("Expiry sweeper stopped");
}
