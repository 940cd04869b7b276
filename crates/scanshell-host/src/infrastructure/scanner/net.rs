//! TCP driver for network-attached scanner device services.
//!
//! Kiosk and POS scanner daemons commonly expose a line-oriented TCP
//! service: the client writes one command per line (`INIT`, `DECODE`,
//! `EXIT`) and the daemon pushes each decoded payload back as one line of
//! text.  This driver implements the [`DeviceService`] seam on top of that
//! convention.
//!
//! # Streaming reads
//!
//! TCP is a stream protocol: a single read may return a partial line or
//! several coalesced lines.  `BufReader::lines` buffers incoming bytes and
//! yields exactly one complete line at a time, so decode results are
//! delivered whole and in arrival order.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{DeviceConnection, DeviceService, Scanner, ScannerError, ScannerEvent};

/// Driver for a scanner device service reachable over TCP.
pub struct NetDeviceService {
    addr: SocketAddr,
}

impl NetDeviceService {
    /// Creates a driver that will bind to the service at `addr`.
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr }
    }
}

#[async_trait]
impl DeviceService for NetDeviceService {
    async fn bind(&self) -> Result<DeviceConnection, ScannerError> {
        // The TCP handshake is the bind; awaiting it yields to the runtime
        // while the connection is in progress.
        let stream = TcpStream::connect(self.addr)
            .await
            .map_err(|e| ScannerError::BindFailed(format!("{}: {e}", self.addr)))?;

        debug!("bound scanner device service at {}", self.addr);

        // Split into independent halves: the reader task owns the read half,
        // the scanner handle owns the write half.
        let (read_half, write_half) = stream.into_split();

        let (tx, rx) = mpsc::channel(64);
        // The scanner handle keeps the reader's JoinHandle so the whole
        // connection, read half included, is released when the handle drops.
        let reader = tokio::spawn(read_device_events(read_half, tx));

        Ok(DeviceConnection {
            scanner: Arc::new(NetScanner {
                write_half: Mutex::new(write_half),
                reader,
            }),
            events: rx,
        })
    }
}

// ── Device event reader ───────────────────────────────────────────────────────

/// Reads decoded payload lines from the device socket and forwards them as
/// [`ScannerEvent`]s until the socket closes or the consumer goes away.
///
/// The terminating [`ScannerEvent::ConnectionLost`] is sent on EOF and on
/// read errors alike; from the bridge's point of view both mean the service
/// connection dropped.
async fn read_device_events(read_half: OwnedReadHalf, tx: mpsc::Sender<ScannerEvent>) {
    let mut lines = BufReader::new(read_half).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                // Tolerate CRLF-terminated lines from Windows-hosted daemons.
                let code = line.trim_end_matches('\r');
                if code.is_empty() {
                    continue;
                }
                debug!("device pushed decode result ({} bytes)", code.len());
                if tx
                    .send(ScannerEvent::Decoded {
                        code: code.to_string(),
                    })
                    .await
                    .is_err()
                {
                    debug!("event receiver dropped; ending device reader");
                    return;
                }
            }
            Ok(None) => {
                debug!("device service closed the connection (EOF)");
                break;
            }
            Err(e) => {
                warn!("read from device service failed: {e}");
                break;
            }
        }
    }

    // Receiver may already be gone; that is fine, there is nobody left to tell.
    let _ = tx.send(ScannerEvent::ConnectionLost).await;
}

// ── Scanner command writer ────────────────────────────────────────────────────

/// The scanner sub-interface over the device socket's write half.
///
/// Also owns the reader task for the socket's read half.  A device daemon
/// that never closes its side would otherwise keep that task parked on
/// `next_line` forever; aborting it on drop means releasing the last
/// scanner handle releases the entire binding.
struct NetScanner {
    write_half: Mutex<OwnedWriteHalf>,
    reader: JoinHandle<()>,
}

impl Drop for NetScanner {
    fn drop(&mut self) {
        // No-op if the reader already ended on EOF or a read error.
        self.reader.abort();
    }
}

impl NetScanner {
    /// Writes one command line to the device service.
    async fn send_command(&self, command: &str) -> Result<(), ScannerError> {
        let frame = format!("{command}\n");
        let mut write = self.write_half.lock().await;
        // `write_all` ensures the whole line goes out even if the OS accepts
        // only a partial write on the first call.
        write
            .write_all(frame.as_bytes())
            .await
            .map_err(|e| ScannerError::CommandFailed(format!("{command}: {e}")))
    }
}

#[async_trait]
impl Scanner for NetScanner {
    async fn init(&self) -> Result<(), ScannerError> {
        self.send_command("INIT").await
    }

    async fn start_decode(&self) -> Result<(), ScannerError> {
        self.send_command("DECODE").await
    }

    async fn exit(&self) -> Result<(), ScannerError> {
        self.send_command("EXIT").await
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
