//! The event forwarder: drives an engine session and renders its events.
//!
//! [`Monitor::start_monitoring`] blocks the caller for the length of the
//! session. The engine delivers events from its own thread; they cross into
//! the polling loop over an mpsc channel, so the caller's sink only ever
//! runs on the caller's thread and event ordering is the channel's send
//! order.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::engine::MonitoringEngine;
use crate::request::MonitoringRequest;

/// One heartbeat per this many elapsed poll ticks.
const HEARTBEAT_TICKS: u32 = 5;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("timeout must be at least one second")]
    InvalidTimeout,
}

/// Session parameters for the polling loop.
///
/// `poll_interval` is one second in production; tests shorten it so a full
/// session runs in milliseconds. Elapsed time is counted in ticks, so the
/// heartbeat and timeout arithmetic is identical at any interval.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Upper bound on the session, in poll ticks. Must be at least 1.
    pub timeout_secs: u32,
    /// How long each poll tick lasts.
    pub poll_interval: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            timeout_secs: 30,
            poll_interval: Duration::from_secs(1),
        }
    }
}

/// Forwards engine events to a caller-supplied sink as formatted lines.
#[derive(Debug)]
pub struct Monitor<E> {
    engine: E,
    config: MonitorConfig,
}

impl<E: MonitoringEngine> Monitor<E> {
    pub fn new(engine: E) -> Self {
        Self::with_config(engine, MonitorConfig::default())
    }

    pub fn with_config(engine: E, config: MonitorConfig) -> Self {
        Self { engine, config }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Run one monitoring session.
    ///
    /// Registers the event callback, starts the engine with `request` and
    /// `verify`, then polls liveness once per tick until the engine reports
    /// inactive or the timeout elapses. Every event is rendered through
    /// `sink`, as are the 5-tick heartbeats and the terminal
    /// `Stopped monitoring.` line. A heartbeat landing exactly on the
    /// timeout tick is still emitted.
    pub fn start_monitoring(
        &mut self,
        request: &MonitoringRequest,
        verify: bool,
        mut sink: impl FnMut(&str),
    ) -> Result<(), Error> {
        if self.config.timeout_secs == 0 {
            return Err(Error::InvalidTimeout);
        }

        // Register before starting so no early event is missed.
        let (tx, rx) = mpsc::channel();
        self.engine.register_callback(tx);
        self.engine.start_monitoring(request.as_bytes(), verify);
        debug!(
            timeout_secs = self.config.timeout_secs,
            verify, "monitoring started"
        );

        let mut elapsed = 0u32;
        while self.engine.is_active() && elapsed < self.config.timeout_secs {
            // Drain events for the length of one tick.
            let deadline = Instant::now() + self.config.poll_interval;
            loop {
                let remaining = match deadline.checked_duration_since(Instant::now()) {
                    Some(remaining) if !remaining.is_zero() => remaining,
                    _ => break,
                };
                match rx.recv_timeout(remaining) {
                    Ok(event) => sink(&event.to_string()),
                    Err(RecvTimeoutError::Timeout) => break,
                    Err(RecvTimeoutError::Disconnected) => {
                        // No sender left; idle out the rest of the tick.
                        thread::sleep(remaining);
                        break;
                    }
                }
            }
            elapsed += 1;
            if elapsed % HEARTBEAT_TICKS == 0 {
                sink(&format!("[INFO] Monitoring... ({elapsed}s)"));
            }
        }

        self.engine.stop_monitoring();
        // Events received during the session but not yet drained still get
        // rendered before the terminal line.
        while let Ok(event) = rx.try_recv() {
            sink(&event.to_string());
        }
        debug!(elapsed, "monitoring stopped");
        sink("Stopped monitoring.");
        Ok(())
    }
}
