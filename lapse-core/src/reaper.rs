//! Background task that reclaims expired entries no caller has read.

use std::sync::Weak;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use crate::store::Shared;

/// Spawns the reaper for one store.
///
/// The task only holds a weak reference to the store state, so it ends when
/// the store is closed or when the last store handle is dropped.
pub(crate) fn spawn<V>(
    runtime: &Handle,
    shared: Weak<Shared<V>>,
    interval: Duration,
    shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<()>
where
    V: Send + Sync + 'static,
{
    runtime.spawn(run(shared, interval, shutdown_rx))
}

async fn run<V>(shared: Weak<Shared<V>>, interval: Duration, mut shutdown_rx: watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the first sweep waits a full interval.
    ticker.tick().await;

    debug!(?interval, "reaper started");

    loop {
        tokio::select! {
            biased;

            changed = shutdown_rx.changed() => {
                // An error means the sender is gone along with the store.
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {
                let Some(state) = shared.upgrade() else {
                    break;
                };
                let removed = state.purge_expired_at(Instant::now());
                if removed > 0 {
                    debug!(removed, "reaper swept expired entries");
                }
            }
        }
    }

    debug!("reaper stopped");
}
