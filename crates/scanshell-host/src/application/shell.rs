//! Shell configuration: the one-time application-start routine.
//!
//! Four operations run once, in order, before any page content:
//!
//! 1. Request runtime camera permission if it is not already granted.
//! 2. Apply the [`SurfaceSettings`] to the web-rendering surface.
//! 3. Install the capability-request mediator that answers permission
//!    prompts from hosted page script.
//! 4. Enable remote debugging of the surface, but only in debuggable
//!    builds.
//!
//! # Permission mediation policy
//!
//! The mediator grants exactly `{videoCapture}` when (and only when) the
//! request names video capture, and denies everything else outright.  Audio
//! capture, geolocation, and any unrecognised resource are never silently
//! granted, even when bundled into the same request as video capture.
//!
//! Decisions are pure; the page-session task that owns the hosted-page
//! channel invokes [`PermissionMediator::decide`] and replies on that same
//! task, which is the single execution context that boundary requires.

use tracing::{debug, info};

use scanshell_core::capability::Capability;

use crate::domain::SurfaceSettings;
use crate::infrastructure::web_surface::{PermissionHost, WebSurface};

/// Request code attached to the runtime camera permission prompt.
///
/// The value is only echoed back by the platform's result callback; the
/// shell does not branch on the outcome.
pub const CAMERA_REQUEST_CODE: u16 = 1001;

// ── Mediation policy ──────────────────────────────────────────────────────────

/// Outcome of mediating a capability request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionDecision {
    /// Grant exactly this subset of the requested capabilities.
    Grant(Vec<Capability>),
    /// Deny the request outright.
    Deny,
}

/// The capability-request mediator installed by [`configure_shell`].
///
/// Constructed once at startup and shared (it is stateless) with every
/// page-session task.
#[derive(Debug, Default, Clone, Copy)]
pub struct PermissionMediator;

impl PermissionMediator {
    /// Creates the mediator.
    pub fn new() -> Self {
        Self
    }

    /// Decides a capability request naming `resources` by identifier string.
    ///
    /// Grants `[Capability::VideoCapture]`, and nothing else, iff any
    /// identifier in the request maps to video capture.  Every other
    /// request, including ones naming only unrecognised identifiers, is
    /// denied outright.
    pub fn decide(&self, resources: &[String]) -> PermissionDecision {
        let wants_video = resources
            .iter()
            .any(|id| Capability::from_resource_id(id) == Some(Capability::VideoCapture));

        if wants_video {
            debug!("granting video capture (requested: {resources:?})");
            PermissionDecision::Grant(vec![Capability::VideoCapture])
        } else {
            debug!("denying capability request: {resources:?}");
            PermissionDecision::Deny
        }
    }
}

// ── Startup routine ───────────────────────────────────────────────────────────

/// Runs the one-time shell configuration and returns the installed mediator.
///
/// `debuggable` gates the remote-inspection toggle; callers pass
/// `cfg!(debug_assertions)` so a release build can never enable it.
///
/// Permission denial is not handled here: the platform propagates the
/// result on its own, and the hosted page must cope with absent camera
/// access.
pub fn configure_shell(
    surface: &mut dyn WebSurface,
    permissions: &dyn PermissionHost,
    settings: &SurfaceSettings,
    debuggable: bool,
) -> PermissionMediator {
    // 1) Runtime camera permission.
    if !permissions.camera_granted() {
        info!("camera permission not granted; requesting");
        permissions.request_camera(CAMERA_REQUEST_CODE);
    }

    // 2) Surface tuning.  Pure settings assignment, no failure mode.
    surface.apply_settings(settings);

    // 3) Capability-request mediator for hosted-page script.
    let mediator = PermissionMediator::new();

    // 4) Remote inspection, debuggable builds only.
    if debuggable {
        info!("debuggable build; enabling remote surface debugging");
        surface.set_remote_debugging(true);
    }

    mediator
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::web_surface::{HeadlessPermissionHost, HeadlessSurface};

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    // ── Mediation policy ──────────────────────────────────────────────────────

    #[test]
    fn test_video_and_audio_request_grants_exactly_video() {
        // Arrange
        let mediator = PermissionMediator::new();

        // Act
        let decision = mediator.decide(&ids(&["videoCapture", "audioCapture"]));

        // Assert: the grant must contain video capture and nothing else
        assert_eq!(
            decision,
            PermissionDecision::Grant(vec![Capability::VideoCapture])
        );
    }

    #[test]
    fn test_audio_only_request_is_denied_outright() {
        let mediator = PermissionMediator::new();
        let decision = mediator.decide(&ids(&["audioCapture"]));
        assert_eq!(decision, PermissionDecision::Deny);
    }

    #[test]
    fn test_video_only_request_is_granted() {
        let mediator = PermissionMediator::new();
        let decision = mediator.decide(&ids(&["videoCapture"]));
        assert_eq!(
            decision,
            PermissionDecision::Grant(vec![Capability::VideoCapture])
        );
    }

    #[test]
    fn test_unrecognised_resources_are_denied() {
        let mediator = PermissionMediator::new();
        let decision = mediator.decide(&ids(&["geolocation", "clipboardRead"]));
        assert_eq!(decision, PermissionDecision::Deny);
    }

    #[test]
    fn test_empty_request_is_denied() {
        let mediator = PermissionMediator::new();
        assert_eq!(mediator.decide(&[]), PermissionDecision::Deny);
    }

    #[test]
    fn test_video_bundled_with_unknown_resources_still_grants_only_video() {
        // A request may mix recognised and unrecognised identifiers; the
        // unknown ones must never leak into the grant.
        let mediator = PermissionMediator::new();
        let decision = mediator.decide(&ids(&["midiSysex", "videoCapture", "weirdThing"]));
        assert_eq!(
            decision,
            PermissionDecision::Grant(vec![Capability::VideoCapture])
        );
    }

    // ── Startup routine ───────────────────────────────────────────────────────

    #[test]
    fn test_configure_shell_applies_surface_settings() {
        // Arrange
        let mut surface = HeadlessSurface::new();
        let permissions = HeadlessPermissionHost::new(true);
        let settings = SurfaceSettings::default();

        // Act
        configure_shell(&mut surface, &permissions, &settings, false);

        // Assert
        assert_eq!(surface.applied(), Some(&settings));
    }

    #[test]
    fn test_configure_shell_requests_camera_when_not_granted() {
        let mut surface = HeadlessSurface::new();
        let permissions = HeadlessPermissionHost::new(false);

        configure_shell(
            &mut surface,
            &permissions,
            &SurfaceSettings::default(),
            false,
        );

        // Exactly one request, carrying the fixed request code.
        assert_eq!(permissions.requested_codes(), vec![CAMERA_REQUEST_CODE]);
    }

    #[test]
    fn test_configure_shell_skips_camera_request_when_already_granted() {
        let mut surface = HeadlessSurface::new();
        let permissions = HeadlessPermissionHost::new(true);

        configure_shell(
            &mut surface,
            &permissions,
            &SurfaceSettings::default(),
            false,
        );

        assert!(permissions.requested_codes().is_empty());
    }

    #[test]
    fn test_configure_shell_enables_debugging_only_when_debuggable() {
        // Release-shaped call: debugging must stay off.
        let mut surface = HeadlessSurface::new();
        let permissions = HeadlessPermissionHost::new(true);
        configure_shell(
            &mut surface,
            &permissions,
            &SurfaceSettings::default(),
            false,
        );
        assert!(!surface.remote_debugging_enabled());

        // Debuggable-shaped call: debugging comes on.
        let mut surface = HeadlessSurface::new();
        configure_shell(
            &mut surface,
            &permissions,
            &SurfaceSettings::default(),
            true,
        );
        assert!(surface.remote_debugging_enabled());
    }
}
