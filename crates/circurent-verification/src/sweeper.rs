//! Periodic expiry sweep with an explicit lifecycle.
//!
//! The sweep exists purely to reclaim memory from abandoned codes; every
//! verification path re-checks expiry itself. Owning the task handle (rather
//! than spawning an interval on module load) lets servers and tests start
//! and stop the sweep deterministically.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;

use crate::CodeStore;

/// Recommended sweep interval: every 5 minutes.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Handle to the background expiry sweep task.
///
/// Dropping the sweeper stops the task.
pub struct Sweeper {
    handle: Option<JoinHandle<()>>,
}

impl Sweeper {
    /// Spawn the sweep task on the current tokio runtime.
    pub fn start(store: Arc<dyn CodeStore>, every: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // The immediate first tick would sweep an empty store.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = store.purge_expired(Utc::now()).await;
                if removed > 0 {
                    tracing::debug!(removed, "swept expired verification codes");
                }
            }
        });
        Self {
            handle: Some(handle),
        }
    }

    /// Stop the sweep task. Idempotent.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.stop();
    }
}
