//! The scan event entity.

use crate::protocol::HostToPageMsg;

/// A single decode result produced by the hardware scanner.
///
/// The payload is owned by the bridge only for the duration of relay and is
/// handed to the hosted page by value.  There is no identity beyond the
/// string's content and no persistence; ordering across events follows the
/// order the hardware produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEvent {
    /// The decoded barcode/QR payload text, unmodified.
    pub code: String,
}

impl ScanEvent {
    /// Creates a scan event from a decoded payload.
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

impl From<ScanEvent> for HostToPageMsg {
    /// Renders the event as the `scan` message delivered to page listeners.
    fn from(event: ScanEvent) -> Self {
        HostToPageMsg::Scan { code: event.code }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_event_converts_to_scan_message_with_same_payload() {
        // Arrange
        let event = ScanEvent::new("4006381333931");

        // Act
        let msg: HostToPageMsg = event.into();

        // Assert: the payload must reach the page unmodified
        assert_eq!(
            msg,
            HostToPageMsg::Scan {
                code: "4006381333931".to_string()
            }
        );
    }
}
