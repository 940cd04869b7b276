//! Hosted-page protocol layer.
//!
//! The hosted page and the native shell exchange JSON messages over a
//! WebSocket channel.  The message vocabulary is deliberately tiny: the page
//! sends commands (`stop`) and capability requests, the host pushes scan
//! events, acknowledgements, and mediation decisions.

pub mod messages;

pub use messages::{HostToPageMsg, PageToHostMsg};
