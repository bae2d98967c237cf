//! Thin forwarding shell around the vendor's native mDL monitoring engine.
//!
//! The engine owns all of the hard parts: USB transport handling, BLE GATT
//! negotiation, session key derivation and ISO/IEC 18013-5 credential
//! verification. This crate registers a callback with it, starts a timed
//! polling loop and turns the events it reports into human-readable log
//! lines.
//!
//! The entry point is [`monitor::Monitor`], which drives any
//! [`engine::MonitoringEngine`]. The FFI-backed engine is behind the
//! `native` feature; [`engine::simulated::SimulatedEngine`] stands in for it
//! in tests and in the `--simulate` demo path.

pub mod engine;
pub mod events;
pub mod helpers;
pub mod monitor;
pub mod request;
