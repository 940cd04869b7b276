//! Scanner device-service infrastructure.
//!
//! The barcode scanner lives behind a vendor-provided out-of-process device
//! service.  This module declares the seam the application layer binds
//! through:
//!
//! - [`DeviceService::bind`] establishes the connection asynchronously and
//!   yields a [`DeviceConnection`].
//! - [`DeviceConnection::scanner`] is the scanner sub-interface obtained
//!   from the bound device service; it accepts the hardware commands
//!   `init`, `start_decode`, and `exit`.
//! - [`DeviceConnection::events`] is an ordered channel carrying every
//!   decode result the hardware pushes, plus the connection-lost
//!   notification when the service dies or is unbound externally.
//!
//! # Callback-delivery context
//!
//! Events arrive on whatever task the concrete driver runs its read loop
//! on, not on the task that issues commands.  Consumers must treat the two
//! as concurrent; the bridge does so by keeping its handle behind an async
//! mutex and relaying events through its own channel.
//!
//! # Testability
//!
//! The trait seam allows unit tests to inject synthetic decode results
//! without any device present; see [`mock::MockDeviceService`].

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

pub mod mock;
pub mod net;

/// A notification pushed by a bound device service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScannerEvent {
    /// The hardware decoded a barcode and produced its text payload.
    Decoded {
        /// The decoded payload, exactly as the hardware reported it.
        code: String,
    },
    /// The service connection dropped (service crashed or was unbound
    /// externally).  No further events follow.
    ConnectionLost,
}

/// Error type for device-service operations.
#[derive(Debug, thiserror::Error)]
pub enum ScannerError {
    /// The asynchronous bind to the device service failed.
    #[error("failed to bind scanner device service: {0}")]
    BindFailed(String),
    /// A hardware command (`init`, `start_decode`, `exit`) failed.
    #[error("scanner command failed: {0}")]
    CommandFailed(String),
}

/// The scanner sub-interface of a bound device service.
///
/// All three commands are only meaningful while the connection that
/// produced this interface is alive; callers are expected to treat
/// failures as non-fatal.
#[async_trait]
pub trait Scanner: Send + Sync {
    /// Initialises the scanner module.
    async fn init(&self) -> Result<(), ScannerError>;

    /// Arms the hardware for decoding.  Results arrive on the connection's
    /// event channel; the hardware re-arms itself after each result.
    async fn start_decode(&self) -> Result<(), ScannerError>;

    /// Disarms the hardware and releases the scanner module.
    async fn exit(&self) -> Result<(), ScannerError>;
}

/// A live binding to the device service.
///
/// Dropping the connection (scanner handle and event receiver together)
/// releases the binding.
pub struct DeviceConnection {
    /// The scanner sub-interface obtained from the device service.
    pub scanner: Arc<dyn Scanner>,
    /// Ordered stream of decode results and the disconnect notification.
    pub events: mpsc::Receiver<ScannerEvent>,
}

/// The out-of-process device service the shell binds to at load time.
#[async_trait]
pub trait DeviceService: Send + Sync {
    /// Establishes the service connection.
    ///
    /// # Errors
    ///
    /// Returns [`ScannerError::BindFailed`] when the service cannot be
    /// reached.  Callers treat this as non-fatal: the bridge stays
    /// disconnected and the host keeps running.
    async fn bind(&self) -> Result<DeviceConnection, ScannerError>;
}
