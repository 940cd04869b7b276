//! JSON message types for the hosted-page channel.
//!
//! The hosted page is web content; it speaks text/JSON naturally.  Every
//! message is a JSON object with a `"type"` field identifying the variant,
//! with all other fields flattened into the same object:
//!
//! ```json
//! {"type":"scan","code":"4006381333931"}
//! {"type":"stop"}
//! ```
//!
//! Serde's `#[serde(tag = "type")]` attribute handles the discriminant
//! automatically.
//!
//! # Why separate page→host and host→page message types?
//!
//! The two directions carry different information: the page *sends* commands
//! and capability requests, the host *sends* events and decisions.  Using two
//! distinct enums makes it a compile-time error to accidentally emit a
//! page-only message toward the page, and vice versa.

use serde::{Deserialize, Serialize};

// ── Page → Host messages ──────────────────────────────────────────────────────

/// All messages the hosted page can send to the native shell.
///
/// # Serde representation
///
/// ```json
/// {"type":"stop"}
/// {"type":"permissionRequest","resources":["videoCapture","audioCapture"]}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PageToHostMsg {
    /// Ask the bridge to disarm the scanner hardware.
    ///
    /// Always acknowledged with [`HostToPageMsg::StopAck`], whether or not a
    /// scanner connection currently exists.  There is no error result.
    Stop,

    /// Page script requests access to one or more device capabilities.
    ///
    /// `resources` names the requested capabilities by identifier string
    /// (see `scanshell_core::capability`).  The shell answers with either
    /// [`HostToPageMsg::PermissionGranted`] naming exactly the allowed
    /// subset, or [`HostToPageMsg::PermissionDenied`].
    PermissionRequest {
        /// Requested capability identifiers, e.g. `["videoCapture"]`.
        resources: Vec<String>,
    },
}

// ── Host → Page messages ──────────────────────────────────────────────────────

/// All messages the native shell pushes to the hosted page.
///
/// # Serde representation
///
/// ```json
/// {"type":"scan","code":"4006381333931"}
/// {"type":"stopAck"}
/// {"type":"permissionGranted","resources":["videoCapture"]}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostToPageMsg {
    /// A decode result relayed from the hardware scanner.
    ///
    /// Delivered to every connected page listener, in the order the hardware
    /// produced the results.
    Scan {
        /// The decoded payload text, unmodified.
        code: String,
    },

    /// Acknowledgement of a [`PageToHostMsg::Stop`] command.
    ///
    /// Sent unconditionally; `stop` has no failure mode from the page's
    /// point of view.
    StopAck,

    /// Grant of exactly the allowed capability subset.
    PermissionGranted {
        /// The granted capability identifiers.  Never more than the page
        /// asked for, and in practice only ever `["videoCapture"]`.
        resources: Vec<String>,
    },

    /// Outright denial of a capability request.
    PermissionDenied,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
