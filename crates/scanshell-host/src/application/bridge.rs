//! The scanner bridge: device-service connection lifecycle and event relay.
//!
//! # Lifecycle
//!
//! ```text
//! Disconnected ──connect()──▶ Connecting ──bind + init + arm ok──▶ Ready
//!      ▲                          │                                  │
//!      │                          └──any failure (logged)────────────┤
//!      └───────────── disconnect notification / teardown ◀───────────┘
//! ```
//!
//! The bridge starts a single connection task at load time.  On success the
//! task publishes the scanner handle and then relays every decode result to
//! the hosted-page event channel; on any failure during bind/init/arm it
//! logs, leaves the handle unpublished, and ends.  Nothing in this module
//! may panic the host: the bridge degrades to a no-op instead.
//!
//! # Concurrency
//!
//! The scanner handle is the only shared mutable resource.  It is written
//! by the connection task (publish on Ready, clear on disconnect) and read
//! by `stop` and `shutdown`, which arrive on page-session tasks; an async
//! mutex around an `Option` serialises those accesses.
//!
//! Decode results travel hardware → device reader task → connection task →
//! broadcast channel → page-session writer tasks.  Every hop is an ordered
//! channel, so events reach each page listener in hardware order, and
//! emission happens on the session task that owns the page boundary rather
//! than on whatever context the hardware callback arrived on.

use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use scanshell_core::{HostToPageMsg, ScanEvent};

use crate::infrastructure::scanner::{DeviceConnection, DeviceService, Scanner, ScannerEvent};

/// Capacity of the hosted-page event channel.
///
/// Scan results are a few dozen bytes each and page sessions drain them
/// immediately; a slow session that falls further behind than this loses
/// oldest events rather than stalling the hardware relay.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Bridges the out-of-process scanner service to the hosted page.
///
/// One instance exists for the host's lifetime.  Construct it, hand it a
/// [`DeviceService`] via [`ScannerBridge::connect`], and let page sessions
/// subscribe to its event channel and issue [`ScannerBridge::stop`].
pub struct ScannerBridge {
    /// The connection handle.  `Some` exactly while the bridge is Ready.
    scanner: Arc<Mutex<Option<Arc<dyn Scanner>>>>,
    /// The connection task started by `connect`, kept for teardown.
    conn_task: std::sync::Mutex<Option<JoinHandle<()>>>,
    /// Fan-out channel toward connected page sessions.
    page_tx: broadcast::Sender<HostToPageMsg>,
}

impl ScannerBridge {
    /// Creates a bridge in the Disconnected state.
    pub fn new() -> Self {
        let (page_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            scanner: Arc::new(Mutex::new(None)),
            conn_task: std::sync::Mutex::new(None),
            page_tx,
        }
    }

    /// Registers a page listener.
    ///
    /// Each receiver observes every event emitted after the call, in
    /// emission order.
    pub fn subscribe(&self) -> broadcast::Receiver<HostToPageMsg> {
        self.page_tx.subscribe()
    }

    /// Whether a usable scanner handle currently exists.
    pub async fn is_ready(&self) -> bool {
        self.scanner.lock().await.is_some()
    }

    /// Starts the asynchronous connection to the device service.
    ///
    /// Exactly one connection may exist at a time; a second call while one
    /// is live is logged and ignored.  All failures on the connection path
    /// are swallowed, leaving the bridge Disconnected.
    pub fn connect(&self, service: Arc<dyn DeviceService>) {
        let mut conn_task = self.conn_task.lock().expect("lock poisoned");
        if conn_task.is_some() {
            warn!("scanner bridge already has a connection task; ignoring connect");
            return;
        }
        let slot = Arc::clone(&self.scanner);
        let page_tx = self.page_tx.clone();
        *conn_task = Some(tokio::spawn(run_connection(service, slot, page_tx)));
    }

    /// Services the page's `stop` command: disarm the hardware.
    ///
    /// Best-effort by contract.  With no handle this is a no-op; a failing
    /// hardware `exit` is logged and swallowed.  Either way the command
    /// counts as succeeded, and the handle is left in place (only a
    /// disconnect notification or teardown clears it).
    pub async fn stop(&self) {
        let scanner = self.scanner.lock().await.clone();
        match scanner {
            Some(s) => {
                if let Err(e) = s.exit().await {
                    warn!("scanner exit failed during stop: {e}");
                }
            }
            None => debug!("stop with no scanner connection; nothing to do"),
        }
    }

    /// Host teardown: disarm the hardware and release the service binding.
    ///
    /// Idempotent.  A failing `exit` is logged and does not prevent the
    /// binding release.
    pub async fn shutdown(&self) {
        let scanner = self.scanner.lock().await.take();
        if let Some(s) = scanner {
            if let Err(e) = s.exit().await {
                warn!("scanner exit failed during teardown: {e}");
            }
        }

        let conn_task = self.conn_task.lock().expect("lock poisoned").take();
        if let Some(handle) = conn_task {
            handle.abort();
            // Awaiting the aborted task guarantees the device connection is
            // dropped before teardown returns.
            let _ = handle.await;
            info!("scanner service binding released");
        }
    }
}

impl Default for ScannerBridge {
    fn default() -> Self {
        Self::new()
    }
}

// ── Connection task ───────────────────────────────────────────────────────────

/// Binds the device service, arms the scanner, and relays its events.
///
/// Runs until the device connection drops or the task is aborted by
/// teardown.
async fn run_connection(
    service: Arc<dyn DeviceService>,
    slot: Arc<Mutex<Option<Arc<dyn Scanner>>>>,
    page_tx: broadcast::Sender<HostToPageMsg>,
) {
    let conn = match service.bind().await {
        Ok(c) => c,
        Err(e) => {
            warn!("scanner service bind failed: {e}");
            return;
        }
    };

    let DeviceConnection {
        scanner,
        mut events,
    } = conn;

    // Arm sequence.  The handle is published only after the scanner is
    // fully armed, so commands issued earlier see no handle and no-op.
    if let Err(e) = scanner.init().await {
        warn!("scanner init failed: {e}");
        return;
    }
    if let Err(e) = scanner.start_decode().await {
        warn!("scanner arm failed: {e}");
        return;
    }

    *slot.lock().await = Some(Arc::clone(&scanner));
    info!("scanner connected and armed");

    while let Some(event) = events.recv().await {
        match event {
            ScannerEvent::Decoded { code } => {
                debug!("relaying scan result ({} bytes)", code.len());
                // `send` errs only when no page session is subscribed; that
                // is fine, there is nobody to deliver to.
                let _ = page_tx.send(ScanEvent::new(code).into());
            }
            ScannerEvent::ConnectionLost => {
                warn!("scanner service disconnected");
                *slot.lock().await = None;
                break;
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::scanner::mock::MockDeviceService;
    use std::time::Duration;

    /// Polls until the bridge's readiness matches `ready`.
    async fn wait_ready(bridge: &ScannerBridge, ready: bool) {
        for _ in 0..200 {
            if bridge.is_ready().await == ready {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("bridge never reached ready={ready}");
    }

    /// Connects a bridge to a fresh mock service and waits until it is
    /// Ready, returning a page listener registered before the connect.
    async fn ready_bridge() -> (
        ScannerBridge,
        Arc<MockDeviceService>,
        broadcast::Receiver<HostToPageMsg>,
    ) {
        let bridge = ScannerBridge::new();
        let service = Arc::new(MockDeviceService::new());
        let events = bridge.subscribe();

        bridge.connect(Arc::clone(&service) as Arc<dyn DeviceService>);
        wait_ready(&bridge, true).await;
        (bridge, service, events)
    }

    #[tokio::test]
    async fn test_connect_runs_init_then_arm() {
        let (bridge, service, _events) = ready_bridge().await;

        assert!(bridge.is_ready().await);
        assert_eq!(service.init_calls(), 1);
        assert_eq!(service.decode_calls(), 1);
        assert_eq!(service.exit_calls(), 0);
    }

    #[tokio::test]
    async fn test_each_decode_result_relays_once_in_order() {
        // Arrange
        let (_bridge, service, mut events) = ready_bridge().await;

        // Act: the hardware reports three results
        service.inject_code("r1").await;
        service.inject_code("r2").await;
        service.inject_code("r3").await;

        // Assert: exactly one scan event per result, same order, payloads
        // unmodified
        for expected in ["r1", "r2", "r3"] {
            assert_eq!(
                events.recv().await.expect("scan event"),
                HostToPageMsg::Scan {
                    code: expected.to_string()
                }
            );
        }
    }

    #[tokio::test]
    async fn test_stop_before_any_connection_is_a_successful_noop() {
        // No connect() at all: stop must return normally and touch nothing.
        let bridge = ScannerBridge::new();
        let service = MockDeviceService::new();

        bridge.stop().await;

        assert_eq!(service.exit_calls(), 0);
    }

    #[tokio::test]
    async fn test_stop_while_ready_issues_exactly_one_exit() {
        let (bridge, service, _events) = ready_bridge().await;

        bridge.stop().await;

        assert_eq!(service.exit_calls(), 1);
        // Stop does not clear the handle; only disconnect or teardown does.
        assert!(bridge.is_ready().await);
    }

    #[tokio::test]
    async fn test_stop_succeeds_even_when_exit_fails() {
        let (bridge, service, _events) = ready_bridge().await;
        service.fail_exit();

        // Must not panic or propagate the hardware failure.
        bridge.stop().await;

        assert_eq!(service.exit_calls(), 1);
    }

    #[tokio::test]
    async fn test_scan_arriving_after_stop_is_still_delivered() {
        // No ordering guarantee exists between stop and an in-flight result;
        // a result already en route is relayed normally.
        let (bridge, service, mut events) = ready_bridge().await;

        bridge.stop().await;
        service.inject_code("late").await;

        assert_eq!(
            events.recv().await.expect("scan event"),
            HostToPageMsg::Scan {
                code: "late".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_bind_failure_leaves_bridge_disconnected() {
        let bridge = ScannerBridge::new();
        let service = Arc::new(MockDeviceService::new());
        service.fail_bind();

        bridge.connect(Arc::clone(&service) as Arc<dyn DeviceService>);
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(!bridge.is_ready().await);
        assert_eq!(service.init_calls(), 0);
        // A later stop is still a successful no-op.
        bridge.stop().await;
        assert_eq!(service.exit_calls(), 0);
    }

    #[tokio::test]
    async fn test_init_failure_keeps_handle_unpublished() {
        let bridge = ScannerBridge::new();
        let service = Arc::new(MockDeviceService::new());
        service.fail_init();

        bridge.connect(Arc::clone(&service) as Arc<dyn DeviceService>);
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(!bridge.is_ready().await);
        // The arm step never ran.
        assert_eq!(service.decode_calls(), 0);
    }

    #[tokio::test]
    async fn test_teardown_issues_exit_then_releases_binding() {
        let (bridge, service, _events) = ready_bridge().await;
        // Even a failing exit must not prevent the binding release.
        service.fail_exit();

        bridge.shutdown().await;

        assert_eq!(service.exit_calls(), 1);
        assert!(service.binding_released());
        assert!(!bridge.is_ready().await);
    }

    #[tokio::test]
    async fn test_teardown_is_idempotent() {
        let (bridge, service, _events) = ready_bridge().await;

        bridge.shutdown().await;
        bridge.shutdown().await;

        // Exactly one exit and one release across both calls.
        assert_eq!(service.exit_calls(), 1);
        assert!(service.binding_released());
    }

    #[tokio::test]
    async fn test_disconnect_clears_handle_and_stop_becomes_noop() {
        // Arrange
        let (bridge, service, _events) = ready_bridge().await;

        // Act: the service process dies
        service.inject_disconnect().await;
        wait_ready(&bridge, false).await;

        // Assert
        bridge.stop().await;
        assert_eq!(
            service.exit_calls(),
            0,
            "stop after disconnect must not issue hardware calls"
        );
    }

    #[tokio::test]
    async fn test_second_connect_is_ignored() {
        let (bridge, service, _events) = ready_bridge().await;

        bridge.connect(Arc::clone(&service) as Arc<dyn DeviceService>);
        tokio::time::sleep(Duration::from_millis(50)).await;

        // The first connection is untouched and no second arm happened.
        assert_eq!(service.init_calls(), 1);
        assert_eq!(service.decode_calls(), 1);
    }
}
