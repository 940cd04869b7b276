//! Infrastructure layer for scanshell-host.
//!
//! Everything that touches the outside world lives here:
//!
//! - `page_server`  – WebSocket accept loop and per-session tasks for the
//!   hosted-page channel.
//! - `scanner`      – The device-service seam, the TCP driver for
//!   network-attached scanner services, and the test mock.
//! - `storage`      – TOML persistence for the web-surface settings file.
//! - `web_surface`  – Rendering-surface and permission-host seams with the
//!   headless implementations the standalone binary uses.
//!
//! Protocol types belong to `scanshell-core`; lifecycle and policy logic
//! belongs to the application layer.

pub mod page_server;
pub mod scanner;
pub mod storage;
pub mod web_surface;

pub use page_server::run_server;
