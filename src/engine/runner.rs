//! Wall-clock tick scheduling.
//!
//! The simulator itself is driven by explicit `advance_tick` calls; this
//! runner is the one place that turns real time into those calls. It wakes
//! on a fixed cadence and advances the shared store, so tests never need
//! real timers and the engine stays deterministic.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::Utc;

use crate::store::StateStore;

/// Background thread driving store ticks at a fixed interval.
///
/// Stopping is idempotent and takes effect before the next scheduled tick;
/// a tick in flight always completes (ticks are treated as instantaneous,
/// no mid-tick cancellation exists). The runner is also stopped on drop.
pub struct TickRunner {
    stop_tx: mpsc::Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl TickRunner {
    /// Spawn the tick thread against a shared store.
    pub fn spawn(store: Arc<Mutex<StateStore>>, interval: Duration) -> Self {
        let (stop_tx, stop_rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            log::info!("Tick runner started with interval {:?}", interval);
            loop {
                // The stop channel doubles as the tick clock
                match stop_rx.recv_timeout(interval) {
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    Err(RecvTimeoutError::Timeout) => {
                        let now = Utc::now().timestamp_millis();
                        let mut store = match store.lock() {
                            Ok(guard) => guard,
                            Err(poisoned) => poisoned.into_inner(),
                        };
                        if store.advance_tick(now) {
                            log::debug!("Processed tick at {}", now);
                        }
                    }
                }
            }
            log::info!("Tick runner stopped");
        });

        Self {
            stop_tx,
            handle: Some(handle),
        }
    }

    /// Stop the runner and wait for the thread to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let _ = self.stop_tx.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for TickRunner {
    fn drop(&mut self) {
        self.shutdown();
    }
}
