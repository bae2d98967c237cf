//! A scripted in-process engine for tests and the `--simulate` demo path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::events::{DeviceEvent, EngineTimestamp};

use super::MonitoringEngine;

#[derive(Debug, Clone)]
struct ScriptedEvent {
    delay: Duration,
    code: i32,
    message: Option<String>,
}

/// Payload and flag the engine was last started with, kept for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartRecord {
    pub payload: Vec<u8>,
    pub verify: bool,
}

/// Engine stand-in that replays a configured script.
///
/// Events are emitted from a spawned thread, like the real engine's
/// callback, so the channel hand-off between threads is exercised for real.
/// The engine stays active until [`stop_monitoring`] is called or the
/// configured deactivation delay elapses.
///
/// [`stop_monitoring`]: MonitoringEngine::stop_monitoring
#[derive(Debug, Default)]
pub struct SimulatedEngine {
    script: Vec<ScriptedEvent>,
    deactivate_after: Option<Duration>,
    active: Arc<AtomicBool>,
    events: Option<Sender<DeviceEvent>>,
    last_start: Arc<Mutex<Option<StartRecord>>>,
}

impl SimulatedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule an event `delay` after monitoring starts.
    pub fn emit_after(mut self, delay: Duration, code: i32, message: Option<&str>) -> Self {
        self.script.push(ScriptedEvent {
            delay,
            code,
            message: message.map(str::to_string),
        });
        self
    }

    /// Report inactive once `delay` has elapsed after monitoring starts.
    pub fn deactivate_after(mut self, delay: Duration) -> Self {
        self.deactivate_after = Some(delay);
        self
    }

    /// The payload and verify flag of the most recent start, if any.
    pub fn last_start(&self) -> Option<StartRecord> {
        self.last_start.lock().ok().and_then(|record| record.clone())
    }
}

impl MonitoringEngine for SimulatedEngine {
    fn register_callback(&mut self, events: Sender<DeviceEvent>) {
        self.events = Some(events);
    }

    fn start_monitoring(&mut self, payload: &[u8], verify: bool) {
        debug!(events = self.script.len(), "starting simulated monitoring");
        if let Ok(mut record) = self.last_start.lock() {
            *record = Some(StartRecord {
                payload: payload.to_vec(),
                verify,
            });
        }
        self.active.store(true, Ordering::SeqCst);

        if let Some(delay) = self.deactivate_after {
            let active = Arc::clone(&self.active);
            thread::spawn(move || {
                thread::sleep(delay);
                active.store(false, Ordering::SeqCst);
            });
        }

        if let Some(events) = self.events.clone() {
            let mut script = self.script.clone();
            script.sort_by_key(|event| event.delay);
            thread::spawn(move || {
                let mut elapsed = Duration::ZERO;
                for (index, event) in script.into_iter().enumerate() {
                    if event.delay > elapsed {
                        thread::sleep(event.delay - elapsed);
                        elapsed = event.delay;
                    }
                    // Send failures just mean the session is already over.
                    let _ = events.send(DeviceEvent::received(
                        event.code,
                        EngineTimestamp(index),
                        event.message,
                    ));
                }
            });
        }
    }

    fn stop_monitoring(&mut self) {
        debug!("stopping simulated monitoring");
        self.active.store(false, Ordering::SeqCst);
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}
