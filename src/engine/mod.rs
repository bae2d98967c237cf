//! The boundary to the external monitoring engine.
//!
//! The engine is an uninspectable collaborator: it enumerates devices,
//! drives the BLE session and (optionally) verifies the credential data it
//! receives. The shell only ever talks to it through the four calls modelled
//! by [`MonitoringEngine`]. The FFI-backed implementation lives in
//! [`native`] behind the `native` feature; [`simulated`] provides a scripted
//! stand-in.

#[cfg(feature = "native")]
pub mod native;
pub mod simulated;

use std::sync::mpsc::Sender;

use crate::events::DeviceEvent;

/// Contract of the external monitoring engine.
///
/// The engine delivers events from a thread of its own choosing, so
/// implementations hand each event to the supplied channel sender rather
/// than invoking any consumer directly. The registration is single-slot:
/// registering again replaces the previous sender.
pub trait MonitoringEngine {
    /// Install the event sender. Must be called before
    /// [`start_monitoring`](MonitoringEngine::start_monitoring) so no early
    /// event is missed.
    fn register_callback(&mut self, events: Sender<DeviceEvent>);

    /// Begin monitoring asynchronously with the given request payload.
    /// `verify` controls whether the engine performs its internal
    /// verification step on received credential data.
    fn start_monitoring(&mut self, payload: &[u8], verify: bool);

    /// Idempotent stop request.
    fn stop_monitoring(&mut self);

    /// Liveness poll.
    fn is_active(&self) -> bool;
}
