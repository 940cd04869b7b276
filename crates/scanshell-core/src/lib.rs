//! scanshell-core library crate.
//!
//! Shared, pure types for the ScanShell host: the JSON protocol spoken with
//! the hosted page, the device-capability identifiers used in permission
//! mediation, and the scan event entity produced by the hardware bridge.
//!
//! # Layer rules
//!
//! Nothing in this crate performs I/O, spawns tasks, or depends on an async
//! runtime.  The host crate (`scanshell-host`) layers its application and
//! infrastructure code on top of these types; keeping them here means the
//! protocol can be unit tested without a WebSocket server or a scanner
//! device anywhere in sight.

/// Device-capability identifiers and their resource-ID string mapping.
pub mod capability;

/// The scan event entity.
pub mod event;

/// JSON message types for the hosted-page channel.
pub mod protocol;

pub use capability::Capability;
pub use event::ScanEvent;
pub use protocol::{HostToPageMsg, PageToHostMsg};
