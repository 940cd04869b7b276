//! Mock device service for unit testing.
//!
//! Allows tests to inject synthetic decode results and disconnects, make
//! individual hardware commands fail, and observe how many times each
//! command was issued, all without a scanner device or a network service
//! anywhere in sight.

use std::sync::{
    atomic::{AtomicBool, AtomicU32, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{DeviceConnection, DeviceService, Scanner, ScannerError, ScannerEvent};

/// Shared state between the mock service and the scanner handle it hands out.
#[derive(Default)]
struct MockState {
    init_calls: AtomicU32,
    decode_calls: AtomicU32,
    exit_calls: AtomicU32,
    fail_bind: AtomicBool,
    fail_init: AtomicBool,
    fail_exit: AtomicBool,
    events_tx: Mutex<Option<mpsc::Sender<ScannerEvent>>>,
}

/// A mock implementation of [`DeviceService`] for tests.
#[derive(Default)]
pub struct MockDeviceService {
    state: Arc<MockState>,
}

impl MockDeviceService {
    /// Creates a new mock device service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `bind` call fail.
    pub fn fail_bind(&self) {
        self.state.fail_bind.store(true, Ordering::SeqCst);
    }

    /// Makes every `init` call fail.
    pub fn fail_init(&self) {
        self.state.fail_init.store(true, Ordering::SeqCst);
    }

    /// Makes every `exit` call fail.
    pub fn fail_exit(&self) {
        self.state.fail_exit.store(true, Ordering::SeqCst);
    }

    /// Number of `init` calls issued so far.
    pub fn init_calls(&self) -> u32 {
        self.state.init_calls.load(Ordering::SeqCst)
    }

    /// Number of `start_decode` calls issued so far.
    pub fn decode_calls(&self) -> u32 {
        self.state.decode_calls.load(Ordering::SeqCst)
    }

    /// Number of `exit` calls issued so far.
    pub fn exit_calls(&self) -> u32 {
        self.state.exit_calls.load(Ordering::SeqCst)
    }

    /// Injects a synthetic decode result, as if the hardware read a code.
    ///
    /// Panics if `bind()` has not been called.
    pub async fn inject_code(&self, code: &str) {
        let tx = self
            .sender()
            .expect("MockDeviceService::inject_code called before bind()");
        tx.send(ScannerEvent::Decoded {
            code: code.to_string(),
        })
        .await
        .expect("event receiver dropped");
    }

    /// Injects a disconnect notification, as if the service process died.
    ///
    /// Panics if `bind()` has not been called.
    pub async fn inject_disconnect(&self) {
        let tx = self
            .sender()
            .expect("MockDeviceService::inject_disconnect called before bind()");
        tx.send(ScannerEvent::ConnectionLost)
            .await
            .expect("event receiver dropped");
    }

    /// Returns `true` once the consumer has dropped the event receiver,
    /// i.e. the binding produced by `bind()` has been released.
    pub fn binding_released(&self) -> bool {
        self.sender().map(|tx| tx.is_closed()).unwrap_or(false)
    }

    fn sender(&self) -> Option<mpsc::Sender<ScannerEvent>> {
        self.state.events_tx.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl DeviceService for MockDeviceService {
    async fn bind(&self) -> Result<DeviceConnection, ScannerError> {
        if self.state.fail_bind.load(Ordering::SeqCst) {
            return Err(ScannerError::BindFailed("mock bind failure".to_string()));
        }

        let (tx, rx) = mpsc::channel(32);
        *self.state.events_tx.lock().expect("lock poisoned") = Some(tx);

        Ok(DeviceConnection {
            scanner: Arc::new(MockScanner {
                state: Arc::clone(&self.state),
            }),
            events: rx,
        })
    }
}

/// The scanner handle a [`MockDeviceService`] hands out on `bind`.
struct MockScanner {
    state: Arc<MockState>,
}

#[async_trait]
impl Scanner for MockScanner {
    async fn init(&self) -> Result<(), ScannerError> {
        self.state.init_calls.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_init.load(Ordering::SeqCst) {
            return Err(ScannerError::CommandFailed("mock init failure".to_string()));
        }
        Ok(())
    }

    async fn start_decode(&self) -> Result<(), ScannerError> {
        self.state.decode_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn exit(&self) -> Result<(), ScannerError> {
        self.state.exit_calls.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_exit.load(Ordering::SeqCst) {
            return Err(ScannerError::CommandFailed("mock exit failure".to_string()));
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_bind_delivers_injected_codes_in_order() {
        // Arrange
        let service = MockDeviceService::new();
        let mut conn = service.bind().await.expect("bind");

        // Act
        service.inject_code("111").await;
        service.inject_code("222").await;

        // Assert
        assert_eq!(
            conn.events.recv().await,
            Some(ScannerEvent::Decoded {
                code: "111".to_string()
            })
        );
        assert_eq!(
            conn.events.recv().await,
            Some(ScannerEvent::Decoded {
                code: "222".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_mock_counts_hardware_commands() {
        let service = MockDeviceService::new();
        let conn = service.bind().await.expect("bind");

        conn.scanner.init().await.expect("init");
        conn.scanner.start_decode().await.expect("decode");
        conn.scanner.exit().await.expect("exit");
        conn.scanner.exit().await.expect("exit again");

        assert_eq!(service.init_calls(), 1);
        assert_eq!(service.decode_calls(), 1);
        assert_eq!(service.exit_calls(), 2);
    }

    #[tokio::test]
    async fn test_mock_fail_bind_returns_bind_failed() {
        let service = MockDeviceService::new();
        service.fail_bind();
        let result = service.bind().await;
        assert!(matches!(result, Err(ScannerError::BindFailed(_))));
    }

    #[tokio::test]
    async fn test_mock_fail_exit_still_counts_the_call() {
        let service = MockDeviceService::new();
        let conn = service.bind().await.expect("bind");
        service.fail_exit();

        let result = conn.scanner.exit().await;

        assert!(result.is_err());
        assert_eq!(service.exit_calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_binding_released_tracks_receiver_drop() {
        let service = MockDeviceService::new();
        let conn = service.bind().await.expect("bind");
        assert!(!service.binding_released());

        drop(conn);

        assert!(service.binding_released());
    }
}
