use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

/// The session's elapsed-time counter, owned for exactly as long as a
/// consultation is running. The ticking task is tied to this value: every
/// way out of the active session — explicit stop, finalize, navigation,
/// or simply dropping the controller — aborts it, so no tick outlives the
/// session that started it.
pub struct SessionTimer {
    elapsed: Arc<AtomicU64>,
    handle: JoinHandle<()>,
}

impl SessionTimer {
    /// Spawns the 1-second tick task. Must be called on a tokio runtime.
    pub fn start() -> Self {
        let elapsed = Arc::new(AtomicU64::new(0));
        let counter = elapsed.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            // The first tick of a tokio interval completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                counter.fetch_add(1, Ordering::Relaxed);
            }
        });
        debug!("session timer started");
        Self { elapsed, handle }
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed.load(Ordering::Relaxed)
    }

    /// Stops the tick task and yields the final reading.
    pub fn stop(self) -> u64 {
        let final_elapsed = self.elapsed_secs();
        debug!("session timer stopped at {}s", final_elapsed);
        final_elapsed
        // Drop aborts the task.
    }
}

impl Drop for SessionTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Renders elapsed seconds the way the session header shows them:
/// `mm:ss`, growing an hour prefix once a session passes the hour mark.
pub fn format_elapsed(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}
