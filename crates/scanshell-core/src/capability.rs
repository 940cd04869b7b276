//! Device-capability identifiers for hosted-page permission requests.
//!
//! Hosted page script requests access to device resources (camera,
//! microphone, ...) by naming them with identifier strings.  The shell's
//! permission mediator inspects those strings and answers with a grant or a
//! denial.  This module owns the mapping between the wire identifiers and a
//! typed [`Capability`] enum so the mediation policy never string-compares.
//!
//! Identifiers are camelCase to match the rest of the hosted-page JSON
//! protocol.  An identifier that maps to no known capability is simply
//! unrecognised; the mediator denies unrecognised identifiers, so
//! `from_resource_id` returning `None` is not an error.

use serde::{Deserialize, Serialize};

/// A device capability the hosted page can request access to.
///
/// The set mirrors the capability resources a browser-style permission
/// prompt can carry.  Only [`Capability::VideoCapture`] is ever granted by
/// the shell's mediation policy; the others exist so requests naming them
/// can be recognised and explicitly denied rather than falling into the
/// unknown-identifier bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    /// Camera / video capture (`getUserMedia({video: true})` on the page side).
    VideoCapture,
    /// Microphone / audio capture.
    AudioCapture,
    /// Protected media identifier (DRM).
    ProtectedMediaId,
    /// MIDI system-exclusive message access.
    MidiSysex,
}

impl Capability {
    /// Returns the wire identifier string for this capability.
    pub fn resource_id(self) -> &'static str {
        match self {
            Capability::VideoCapture => "videoCapture",
            Capability::AudioCapture => "audioCapture",
            Capability::ProtectedMediaId => "protectedMediaId",
            Capability::MidiSysex => "midiSysex",
        }
    }

    /// Parses a wire identifier string into a capability.
    ///
    /// Returns `None` for identifiers this shell does not recognise.
    pub fn from_resource_id(id: &str) -> Option<Self> {
        match id {
            "videoCapture" => Some(Capability::VideoCapture),
            "audioCapture" => Some(Capability::AudioCapture),
            "protectedMediaId" => Some(Capability::ProtectedMediaId),
            "midiSysex" => Some(Capability::MidiSysex),
            _ => None,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
