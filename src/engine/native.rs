//! FFI bindings to the vendor's `usb_new` monitoring library.

use std::ffi::{c_char, c_void, CStr};
use std::sync::mpsc::Sender;
use std::sync::Mutex;

use tracing::debug;

use crate::events::{DeviceEvent, EngineTimestamp};

use super::MonitoringEngine;

type RawEventCallback = extern "C" fn(i32, *const c_void, *const c_char);

#[link(name = "usb_new")]
extern "C" {
    fn register_event_callback(callback: RawEventCallback);
    fn start_usb_monitoring(data: *const u8, len: usize, verify: bool);
    fn stop_usb_monitoring();
    fn is_monitoring_active() -> bool;
}

/// The library exposes a single process-wide callback slot, so the sender it
/// forwards to has to live in a static. [`NativeEngine`] owns the slot in
/// lifecycle terms: it is filled on registration and cleared when the engine
/// value drops, so a sender never leaks into the next session.
static EVENT_SENDER: Mutex<Option<Sender<DeviceEvent>>> = Mutex::new(None);

extern "C" fn forward_event(code: i32, timestamp: *const c_void, message: *const c_char) {
    // Runs on whatever thread the engine chooses. Copy everything out of
    // engine-owned memory before the callback returns.
    let message = if message.is_null() {
        None
    } else {
        Some(
            unsafe { CStr::from_ptr(message) }
                .to_string_lossy()
                .into_owned(),
        )
    };
    let event = DeviceEvent::received(code, EngineTimestamp(timestamp as usize), message);
    if let Ok(sender) = EVENT_SENDER.lock() {
        if let Some(sender) = sender.as_ref() {
            // The receiver may already be gone if the session timed out.
            let _ = sender.send(event);
        }
    }
}

/// Engine implementation backed by the `usb_new` native library.
#[derive(Debug, Default)]
pub struct NativeEngine {
    _private: (),
}

impl NativeEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MonitoringEngine for NativeEngine {
    fn register_callback(&mut self, events: Sender<DeviceEvent>) {
        debug!("registering event callback with the native engine");
        if let Ok(mut sender) = EVENT_SENDER.lock() {
            *sender = Some(events);
        }
        unsafe { register_event_callback(forward_event) }
    }

    fn start_monitoring(&mut self, payload: &[u8], verify: bool) {
        debug!(
            payload_len = payload.len(),
            verify, "starting native monitoring"
        );
        unsafe { start_usb_monitoring(payload.as_ptr(), payload.len(), verify) }
    }

    fn stop_monitoring(&mut self) {
        debug!("stopping native monitoring");
        unsafe { stop_usb_monitoring() }
    }

    fn is_active(&self) -> bool {
        unsafe { is_monitoring_active() }
    }
}

impl Drop for NativeEngine {
    fn drop(&mut self) {
        if let Ok(mut sender) = EVENT_SENDER.lock() {
            *sender = None;
        }
    }
}
