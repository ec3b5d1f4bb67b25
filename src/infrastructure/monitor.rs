//! Group Monitor
//!
//! Per-group periodic task with deterministic start/stop semantics. Each
//! replication group owns one monitor; monitors for different groups are
//! fully independent.

use parking_lot::Mutex;
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Handle to a running group monitor.
///
/// `stop` is idempotent and guarantees that no further tick fires after it
/// returns: the stop signal is checked before every tick, and an in-flight
/// tick is awaited before the task finishes.
pub struct MonitorHandle {
    group_id: String,
    stop_tx: watch::Sender<bool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl MonitorHandle {
    /// The group this monitor belongs to.
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// Whether the monitor task has not been stopped yet.
    pub fn is_running(&self) -> bool {
        self.handle.lock().is_some()
    }

    /// Stop the monitor and wait for its task to finish.
    pub async fn stop(&self) {
        let _ = self.stop_tx.send(true);
        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
            tracing::debug!("monitor for group {} stopped", self.group_id);
        }
    }
}

/// Spawn a periodic monitor running `tick` every `tick_interval`.
///
/// The first tick fires immediately. Ticks never overlap; a tick that runs
/// long delays the next one instead of stacking.
pub fn spawn_monitor<F, Fut>(group_id: String, tick_interval: Duration, tick: F) -> MonitorHandle
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send,
{
    let (stop_tx, mut stop_rx) = watch::channel(false);
    let gid = group_id.clone();

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                // The stop branch wins when both are ready, so a stop that
                // lands between ticks is observed before the next tick.
                biased;
                changed = stop_rx.changed() => {
                    if changed.is_err() || *stop_rx.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    tick().await;
                }
            }
        }

        tracing::debug!("monitor loop for group {} exited", gid);
    });

    MonitorHandle {
        group_id,
        stop_tx,
        handle: Mutex::new(Some(handle)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_first_tick_fires_immediately() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();

        let monitor = spawn_monitor("g1".to_string(), Duration::from_secs(60), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        monitor.stop().await;
    }

    #[tokio::test]
    async fn test_ticks_repeat() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();

        let monitor = spawn_monitor("g1".to_string(), Duration::from_millis(20), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(count.load(Ordering::SeqCst) >= 3);

        monitor.stop().await;
    }

    #[tokio::test]
    async fn test_no_tick_after_stop_returns() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();

        let monitor = spawn_monitor("g1".to_string(), Duration::from_millis(10), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_millis(35)).await;
        monitor.stop().await;

        let after_stop = count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(count.load(Ordering::SeqCst), after_stop);
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let monitor = spawn_monitor("g1".to_string(), Duration::from_millis(10), || async {});

        monitor.stop().await;
        assert!(!monitor.is_running());

        // Second stop is a no-op
        monitor.stop().await;
        assert!(!monitor.is_running());
    }

    #[tokio::test]
    async fn test_is_running_before_stop() {
        let monitor = spawn_monitor("g1".to_string(), Duration::from_millis(10), || async {});
        assert!(monitor.is_running());
        assert_eq!(monitor.group_id(), "g1");
        monitor.stop().await;
    }
}
