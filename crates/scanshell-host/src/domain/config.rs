//! Host configuration types.
//!
//! [`HostConfig`] is the single source of truth for all runtime settings.
//! It can be constructed from CLI arguments (preferred for production) or
//! from sensible defaults (useful for local development and tests).
//!
//! [`SurfaceSettings`] is the tuning block applied to the web-rendering
//! surface at startup.  It is a serde struct with per-field defaults so a
//! partially written settings file, or no file at all, still yields a
//! fully populated configuration.

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

/// All runtime configuration for the scanner shell.
///
/// Build this struct once at startup (via CLI args or defaults) and then
/// wrap it in an `Arc` so it can be shared cheaply across session tasks.
///
/// # Example
///
/// ```rust
/// use scanshell_host::domain::HostConfig;
///
/// // Defaults are suitable for local development:
/// let cfg = HostConfig::default();
/// assert_eq!(cfg.page_bind_addr.port(), 8765);
/// ```
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// The address and port the hosted-page WebSocket server binds to.
    ///
    /// `0.0.0.0` accepts connections from any interface.  Set to
    /// `127.0.0.1` when the hosted page always runs on the same machine.
    pub page_bind_addr: SocketAddr,

    /// The TCP address of the scanner device service.
    ///
    /// The shell binds to this service once at load time; there is no
    /// automatic retry of a failed bind.
    pub scanner_addr: SocketAddr,

    /// Tuning applied to the web-rendering surface at startup.
    pub surface: SurfaceSettings,
}

impl Default for HostConfig {
    /// Returns a `HostConfig` suitable for local development without any
    /// external configuration.
    ///
    /// | Field          | Default           |
    /// |----------------|-------------------|
    /// | page_bind_addr | `0.0.0.0:8765`    |
    /// | scanner_addr   | `127.0.0.1:9101`  |
    /// | surface        | all access on     |
    fn default() -> Self {
        Self {
            // The `.parse().unwrap()` calls here are safe because these are
            // compile-time-known valid socket address strings.
            page_bind_addr: "0.0.0.0:8765".parse().unwrap(),
            scanner_addr: "127.0.0.1:9101".parse().unwrap(),
            surface: SurfaceSettings::default(),
        }
    }
}

// ── Web-surface settings ──────────────────────────────────────────────────────

/// Settings applied to the embedded web-rendering surface.
///
/// The hosted page is a local bundle that needs unrestricted local resource
/// access and immediate media autoplay for its scanning viewfinder, so every
/// toggle defaults to the permissive value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceSettings {
    /// Enable script execution in the hosted page.
    #[serde(default = "default_true")]
    pub javascript_enabled: bool,

    /// Enable local (DOM) storage for the hosted page.
    #[serde(default = "default_true")]
    pub dom_storage_enabled: bool,

    /// Require a prior user gesture before media may autoplay.
    ///
    /// Off by default: the viewfinder video element must start the moment
    /// the page loads.
    #[serde(default)]
    pub media_autoplay_requires_gesture: bool,

    /// Allow the page to load `file:` URL resources.
    #[serde(default = "default_true")]
    pub allow_file_access: bool,

    /// Allow the page to load content-URL resources.
    #[serde(default = "default_true")]
    pub allow_content_access: bool,

    /// Compatibility mode permitting mixed secure/insecure sub-resource
    /// loading.
    #[serde(default = "default_true")]
    pub allow_mixed_content: bool,
}

fn default_true() -> bool {
    true
}

impl Default for SurfaceSettings {
    fn default() -> Self {
        Self {
            javascript_enabled: true,
            dom_storage_enabled: true,
            media_autoplay_requires_gesture: false,
            allow_file_access: true,
            allow_content_access: true,
            allow_mixed_content: true,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
