//! Web-rendering surface and permission-host seams.
//!
//! The shell runs inside whatever embeds it; the embedder supplies the
//! actual rendering surface (a WebView, a system browser shell) and the
//! platform permission prompt.  These traits are the boundary the startup
//! routine configures through.
//!
//! [`HeadlessSurface`] and [`HeadlessPermissionHost`] back the standalone
//! binary, where no rendering surface exists: settings are recorded and
//! logged, and the camera permission is considered granted.  The same types
//! double as observable fakes in unit tests.

use std::sync::Mutex;

use tracing::info;

use crate::domain::SurfaceSettings;

/// The embedded web-rendering surface the shell configures at startup.
pub trait WebSurface: Send {
    /// Applies the settings block.  Pure assignment; no failure mode.
    fn apply_settings(&mut self, settings: &SurfaceSettings);

    /// Toggles remote inspection of the surface.
    fn set_remote_debugging(&mut self, enabled: bool);
}

/// The platform's runtime permission prompt.
pub trait PermissionHost: Send {
    /// Whether the camera permission is currently granted.
    fn camera_granted(&self) -> bool;

    /// Issues the asynchronous runtime permission prompt.
    ///
    /// The outcome propagates through the platform's own result callback;
    /// the shell does not observe it.
    fn request_camera(&self, request_code: u16);
}

// ── Headless implementations ──────────────────────────────────────────────────

/// Surface implementation for hosts without an embedded rendering surface.
///
/// Records what was applied so startup behaviour stays observable, both in
/// logs and in tests.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    applied: Option<SurfaceSettings>,
    remote_debugging: bool,
}

impl HeadlessSurface {
    /// Creates a fresh, unconfigured surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// The settings block applied by the startup routine, if any.
    pub fn applied(&self) -> Option<&SurfaceSettings> {
        self.applied.as_ref()
    }

    /// Whether remote inspection was enabled.
    pub fn remote_debugging_enabled(&self) -> bool {
        self.remote_debugging
    }
}

impl WebSurface for HeadlessSurface {
    fn apply_settings(&mut self, settings: &SurfaceSettings) {
        info!(
            "surface settings applied: js={} storage={} autoplay_gesture={} file={} content={} mixed={}",
            settings.javascript_enabled,
            settings.dom_storage_enabled,
            settings.media_autoplay_requires_gesture,
            settings.allow_file_access,
            settings.allow_content_access,
            settings.allow_mixed_content,
        );
        self.applied = Some(settings.clone());
    }

    fn set_remote_debugging(&mut self, enabled: bool) {
        info!("remote surface debugging: {enabled}");
        self.remote_debugging = enabled;
    }
}

/// Permission host for headless operation.
///
/// Construct with the grant state to simulate; issued request codes are
/// recorded for inspection.
#[derive(Debug)]
pub struct HeadlessPermissionHost {
    granted: bool,
    requests: Mutex<Vec<u16>>,
}

impl HeadlessPermissionHost {
    /// Creates a permission host whose camera grant state is `granted`.
    pub fn new(granted: bool) -> Self {
        Self {
            granted,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// The request codes issued so far, in order.
    pub fn requested_codes(&self) -> Vec<u16> {
        self.requests.lock().expect("lock poisoned").clone()
    }
}

impl PermissionHost for HeadlessPermissionHost {
    fn camera_granted(&self) -> bool {
        self.granted
    }

    fn request_camera(&self, request_code: u16) {
        info!("camera permission requested (code {request_code})");
        self.requests.lock().expect("lock poisoned").push(request_code);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_surface_records_applied_settings() {
        let mut surface = HeadlessSurface::new();
        assert!(surface.applied().is_none());

        let settings = SurfaceSettings::default();
        surface.apply_settings(&settings);

        assert_eq!(surface.applied(), Some(&settings));
    }

    #[test]
    fn test_headless_surface_debugging_starts_off() {
        let surface = HeadlessSurface::new();
        assert!(!surface.remote_debugging_enabled());
    }

    #[test]
    fn test_headless_permission_host_records_request_codes() {
        let host = HeadlessPermissionHost::new(false);
        assert!(!host.camera_granted());

        host.request_camera(1001);
        host.request_camera(1001);

        assert_eq!(host.requested_codes(), vec![1001, 1001]);
    }
}
