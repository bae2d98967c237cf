//! Event records reported by the monitoring engine.

use std::fmt;

use time::format_description::FormatItem;
use time::macros::format_description;
use time::OffsetDateTime;

/// Wall-clock format used for the receipt timestamp in display lines.
const TIME_FORMAT: &[FormatItem<'static>] =
    format_description!("[hour]:[minute]:[second].[subsecond digits:3]");

/// Substituted when the engine passes a null message pointer.
const NO_MESSAGE: &str = "Unknown";

/// The event codes the engine reports, with their display names.
///
/// The table is part of the engine's contract and must not be reordered.
/// Codes outside 1..=11 render as `UNKNOWN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::FromRepr, strum_macros::IntoStaticStr)]
#[repr(i32)]
pub enum EventKind {
    #[strum(serialize = "DEVICE CONNECTED")]
    DeviceConnected = 1,
    #[strum(serialize = "DEVICE DISCONNECTED")]
    DeviceDisconnected = 2,
    #[strum(serialize = "QRCODE SCANNED")]
    QrCodeScanned = 3,
    #[strum(serialize = "DEVICE HKDF KEY")]
    DeviceHkdfKey = 4,
    #[strum(serialize = "BLE CONNECTED")]
    BleConnected = 5,
    #[strum(serialize = "BLE DISCONNECTED")]
    BleDisconnected = 6,
    #[strum(serialize = "BLE SENDING")]
    BleSending = 7,
    #[strum(serialize = "BLE RECEIVING")]
    BleReceiving = 8,
    #[strum(serialize = "DATA RECEIVED")]
    DataReceived = 9,
    #[strum(serialize = "VERIFYING DATA")]
    VerifyingData = 10,
    #[strum(serialize = "ERROR")]
    Error = 11,
}

impl EventKind {
    /// Display name for a raw event code, falling back to `UNKNOWN`.
    pub fn name(code: i32) -> &'static str {
        match EventKind::from_repr(code) {
            Some(kind) => kind.into(),
            None => "UNKNOWN",
        }
    }
}

/// Opaque timestamp handle supplied by the engine alongside each event.
///
/// Its format is engine-defined and undocumented; the shell carries it but
/// displays the wall-clock receipt time instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineTimestamp(pub usize);

impl EngineTimestamp {
    pub fn as_raw(&self) -> usize {
        self.0
    }
}

/// A single event as delivered by the engine callback.
///
/// Transient: constructed at receipt, rendered once through the sink and
/// discarded. `Display` produces the line format the demo prints:
/// `[HH:MM:SS.mmm] EVENT NAME: message`.
#[derive(Debug, Clone)]
pub struct DeviceEvent {
    pub code: i32,
    pub timestamp: EngineTimestamp,
    pub message: Option<String>,
    pub received_at: OffsetDateTime,
}

impl DeviceEvent {
    /// Build an event stamped with the current wall-clock time.
    ///
    /// Falls back to UTC when the local offset cannot be determined, which
    /// is the common case on secondary threads.
    pub fn received(code: i32, timestamp: EngineTimestamp, message: Option<String>) -> Self {
        let received_at =
            OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        Self {
            code,
            timestamp,
            message,
            received_at,
        }
    }

    pub fn kind(&self) -> Option<EventKind> {
        EventKind::from_repr(self.code)
    }
}

impl fmt::Display for DeviceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let time = self
            .received_at
            .format(TIME_FORMAT)
            .map_err(|_| fmt::Error)?;
        write!(
            f,
            "[{}] {}: {}",
            time,
            EventKind::name(self.code),
            self.message.as_deref().unwrap_or(NO_MESSAGE)
        )
    }
}

#[cfg(test)]
mod test {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn event_names_match_engine_table() {
        let expected = [
            (1, "DEVICE CONNECTED"),
            (2, "DEVICE DISCONNECTED"),
            (3, "QRCODE SCANNED"),
            (4, "DEVICE HKDF KEY"),
            (5, "BLE CONNECTED"),
            (6, "BLE DISCONNECTED"),
            (7, "BLE SENDING"),
            (8, "BLE RECEIVING"),
            (9, "DATA RECEIVED"),
            (10, "VERIFYING DATA"),
            (11, "ERROR"),
        ];
        for (code, name) in expected {
            assert_eq!(EventKind::name(code), name);
        }
    }

    #[test]
    fn unrecognized_codes_are_unknown() {
        for code in [0, 12, -1, i32::MAX] {
            assert_eq!(EventKind::name(code), "UNKNOWN");
            assert!(EventKind::from_repr(code).is_none());
        }
    }

    #[test]
    fn kind_resolves_known_codes_only() {
        let event = DeviceEvent::received(9, EngineTimestamp(7), None);
        assert_eq!(event.kind(), Some(EventKind::DataReceived));
        assert_eq!(event.timestamp.as_raw(), 7);

        let unknown = DeviceEvent::received(42, EngineTimestamp(0), None);
        assert_eq!(unknown.kind(), None);
    }

    #[test]
    fn display_line_uses_receipt_time() {
        let event = DeviceEvent {
            code: 5,
            timestamp: EngineTimestamp(0),
            message: Some("peripheral connected".to_string()),
            received_at: datetime!(2024-03-01 13:05:09.123 UTC),
        };
        assert_eq!(
            event.to_string(),
            "[13:05:09.123] BLE CONNECTED: peripheral connected"
        );
    }

    #[test]
    fn null_message_renders_as_unknown() {
        let event = DeviceEvent {
            code: 1,
            timestamp: EngineTimestamp(42),
            message: None,
            received_at: datetime!(2024-03-01 08:00:00.000 UTC),
        };
        assert_eq!(event.to_string(), "[08:00:00.000] DEVICE CONNECTED: Unknown");
    }

    #[test]
    fn unknown_code_with_message_still_formats() {
        let event = DeviceEvent {
            code: 99,
            timestamp: EngineTimestamp(0),
            message: Some("???".to_string()),
            received_at: datetime!(2024-03-01 23:59:59.999 UTC),
        };
        assert_eq!(event.to_string(), "[23:59:59.999] UNKNOWN: ???");
    }
}
