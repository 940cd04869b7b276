//! Application layer for scanshell-host.
//!
//! Use cases in this layer orchestrate the domain types and the
//! infrastructure trait seams to fulfil the shell's two jobs:
//!
//! - **`shell`**  – The one-time startup routine: camera permission,
//!   surface settings, the capability-request mediator, and the
//!   debug-build-only remote inspection toggle.
//!
//! - **`bridge`** – The scanner bridge: owns the connection to the device
//!   service, relays decode results to the hosted page, and services the
//!   `stop` command and host teardown.
//!
//! Nothing here opens sockets or reads files; concrete drivers live in the
//! infrastructure layer and are injected through traits.

pub mod bridge;
pub mod shell;

pub use bridge::ScannerBridge;
pub use shell::{configure_shell, PermissionDecision, PermissionMediator, CAMERA_REQUEST_CODE};
