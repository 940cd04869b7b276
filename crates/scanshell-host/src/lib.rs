//! scanshell-host library crate.
//!
//! This crate is the native shell of a web-hosted barcode-scanning
//! application.  It prepares the web-rendering surface at startup, mediates
//! device-capability requests from hosted page script, and bridges an
//! out-of-process hardware scanner service to the page as a stream of
//! `scan` events.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! Hosted page (JSON over WebSocket)
//!         ↕
//! [scanshell-host]
//!   ├── domain/           Pure types: HostConfig, SurfaceSettings
//!   ├── application/      Shell configurator + scanner bridge lifecycle
//!   └── infrastructure/
//!         ├── page_server/  WebSocket accept loop (tokio-tungstenite)
//!         ├── scanner/      Device-service seam, TCP driver, test mock
//!         └── web_surface/  Rendering-surface and permission-host seams
//!         ↕
//! Scanner device service (out-of-process hardware)
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O and no async.
//! - `application` depends on `domain`, `scanshell-core`, and the trait
//!   seams declared by `infrastructure`, never on a concrete driver.
//! - `infrastructure` depends on all other layers plus `tokio` and
//!   `tungstenite`.

/// Domain layer: configuration types (no I/O beyond settings-file helpers).
pub mod domain;

/// Application layer: shell configuration and the scanner bridge.
pub mod application;

/// Infrastructure layer: page server, scanner drivers, surface seams.
pub mod infrastructure;
