//! Hosted-page WebSocket server: accept loop and per-session tasks.
//!
//! Connected pages are the shell's listener registry.  Each session runs
//! two concurrent tasks:
//!
//! - **Event forwarder**: receives scan events from the bridge's broadcast
//!   channel and writes them to the page as JSON text frames.  This task is
//!   the execution context that owns emission toward the page boundary;
//!   hardware callbacks never touch the WebSocket directly.
//! - **Command loop**: reads JSON frames from the page and services them:
//!   `stop` goes to the scanner bridge and is always acknowledged, and
//!   `permissionRequest` is answered with the mediator's decision on this
//!   same task.
//!
//! The accept loop itself follows the shared-`AtomicBool` shutdown pattern:
//! it re-checks the flag every 200 ms so Ctrl+C stops the server even when
//! no page ever connects.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast::error::RecvError;
use tokio::time::timeout;
use tokio_tungstenite::{
    accept_async,
    tungstenite::{Error as WsError, Message as WsMessage},
    WebSocketStream,
};
use tracing::{debug, error, info, warn};

use scanshell_core::{HostToPageMsg, PageToHostMsg};

use crate::application::shell::{PermissionDecision, PermissionMediator};
use crate::application::ScannerBridge;
use crate::domain::HostConfig;

/// Write half of a page WebSocket, shared between the two session tasks.
type PageSink = SplitSink<WebSocketStream<TcpStream>, WsMessage>;

// ── Public API ────────────────────────────────────────────────────────────────

/// Runs the hosted-page accept loop until `running` is set to `false`.
///
/// Binds a TCP listener on `config.page_bind_addr` and hands each accepted
/// connection to a dedicated Tokio task, so one slow page never blocks
/// others.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot be bound (e.g. the port is
/// already in use).
pub async fn run_server(
    config: Arc<HostConfig>,
    bridge: Arc<ScannerBridge>,
    mediator: PermissionMediator,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.page_bind_addr)
        .await
        .with_context(|| format!("failed to bind page listener on {}", config.page_bind_addr))?;

    info!("hosted-page channel listening on {}", config.page_bind_addr);

    loop {
        if !running.load(Ordering::Relaxed) {
            info!("shutdown flag set; stopping accept loop");
            break;
        }

        // Short timeout on accept() so the loop can re-check the shutdown
        // flag even when no pages are connecting.
        let accept_result = timeout(Duration::from_millis(200), listener.accept()).await;

        match accept_result {
            Ok(Ok((stream, peer_addr))) => {
                info!("new page connection from {peer_addr}");
                let bridge = Arc::clone(&bridge);
                tokio::spawn(async move {
                    handle_page_session(stream, peer_addr, bridge, mediator).await;
                });
            }
            Ok(Err(e)) => {
                // Transient accept error; keep serving.
                error!("accept error: {e}");
            }
            Err(_) => {
                // Timeout with no new connection; loop back to the flag check.
            }
        }
    }

    Ok(())
}

// ── Per-session handler ───────────────────────────────────────────────────────

/// Entry point for each per-session task; wraps [`run_session`] and logs
/// the outcome so `?` can be used freely inside.
async fn handle_page_session(
    raw_stream: TcpStream,
    peer_addr: SocketAddr,
    bridge: Arc<ScannerBridge>,
    mediator: PermissionMediator,
) {
    match run_session(raw_stream, peer_addr, bridge, mediator).await {
        Ok(()) => info!("page session {peer_addr} closed normally"),
        Err(e) => warn!("page session {peer_addr} closed with error: {e:#}"),
    }
}

/// Runs the complete lifecycle of one page session.
///
/// # Errors
///
/// Returns an error if the WebSocket handshake fails.
async fn run_session(
    raw_stream: TcpStream,
    peer_addr: SocketAddr,
    bridge: Arc<ScannerBridge>,
    mediator: PermissionMediator,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(raw_stream)
        .await
        .with_context(|| format!("WebSocket handshake failed with {peer_addr}"))?;

    info!("page session established: {peer_addr}");

    // The write half is shared between the event forwarder and the command
    // replies, so it lives behind an async mutex.
    let (ws_tx, mut ws_rx) = ws_stream.split();
    let ws_tx = Arc::new(tokio::sync::Mutex::new(ws_tx));

    let session_id = peer_addr.to_string();

    // Registering the listener before the tasks start means no event
    // emitted after this point is missed.
    let mut events = bridge.subscribe();

    // ── Task A: bridge → page event forwarder ─────────────────────────────────
    let ws_tx_events = Arc::clone(&ws_tx);
    let session_id_events = session_id.clone();
    let forwarder_task = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(msg) => {
                    if !send_page_msg(&ws_tx_events, &msg, &session_id_events).await {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    // The session fell behind the event channel capacity.
                    warn!("session {session_id_events}: slow page listener skipped {skipped} events");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // ── Task B: page → host command loop ──────────────────────────────────────
    let ws_tx_cmd = Arc::clone(&ws_tx);
    let session_id_cmd = session_id.clone();
    let command_task = tokio::spawn(async move {
        loop {
            let ws_msg = match ws_rx.next().await {
                Some(Ok(msg)) => msg,
                Some(Err(WsError::ConnectionClosed | WsError::Protocol(_))) => {
                    debug!("session {session_id_cmd}: page WebSocket closed normally");
                    break;
                }
                Some(Err(e)) => {
                    warn!("session {session_id_cmd}: page WebSocket error: {e}");
                    break;
                }
                None => {
                    debug!("session {session_id_cmd}: page stream ended");
                    break;
                }
            };

            match ws_msg {
                WsMessage::Text(json) => {
                    let page_msg: PageToHostMsg = match serde_json::from_str(&json) {
                        Ok(m) => m,
                        Err(e) => {
                            // One bad message does not end the session; the
                            // page may retry on the next interaction.
                            warn!("session {session_id_cmd}: invalid JSON from page: {e}");
                            continue;
                        }
                    };

                    debug!(
                        "session {session_id_cmd}: page command: {}",
                        page_msg_type_name(&page_msg)
                    );

                    let reply = match page_msg {
                        PageToHostMsg::Stop => {
                            // Disarm is best-effort; the acknowledgement is
                            // unconditional.
                            bridge.stop().await;
                            HostToPageMsg::StopAck
                        }
                        PageToHostMsg::PermissionRequest { resources } => {
                            match mediator.decide(&resources) {
                                PermissionDecision::Grant(caps) => {
                                    HostToPageMsg::PermissionGranted {
                                        resources: caps
                                            .iter()
                                            .map(|c| c.resource_id().to_string())
                                            .collect(),
                                    }
                                }
                                PermissionDecision::Deny => HostToPageMsg::PermissionDenied,
                            }
                        }
                    };

                    if !send_page_msg(&ws_tx_cmd, &reply, &session_id_cmd).await {
                        break;
                    }
                }

                WsMessage::Binary(_) => {
                    // The page-facing protocol is JSON text only.
                    warn!("session {session_id_cmd}: unexpected binary WebSocket frame (ignored)");
                }

                WsMessage::Ping(data) => {
                    // tokio-tungstenite answers protocol-level pings itself.
                    debug!("session {session_id_cmd}: WebSocket ping ({} bytes)", data.len());
                }

                WsMessage::Pong(_) => {
                    debug!("session {session_id_cmd}: WebSocket pong received");
                }

                WsMessage::Close(_) => {
                    debug!("session {session_id_cmd}: WebSocket Close frame received");
                    break;
                }

                WsMessage::Frame(_) => {
                    debug!("session {session_id_cmd}: raw frame (ignored)");
                }
            }
        }
    });

    // The session ends when either task finishes: the page disconnected, or
    // the event channel was torn down with the bridge.
    tokio::select! {
        _ = forwarder_task => {
            debug!("session {session_id}: event forwarder ended");
        }
        _ = command_task => {
            debug!("session {session_id}: command loop ended");
        }
    }

    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Serializes `msg` and writes it to the shared sink as one text frame.
///
/// Returns `false` when the page is gone and the session should end.  A
/// serialization failure is logged and swallowed; it affects one message,
/// not the session.
async fn send_page_msg(
    sink: &Arc<tokio::sync::Mutex<PageSink>>,
    msg: &HostToPageMsg,
    session_id: &str,
) -> bool {
    match serde_json::to_string(msg) {
        Ok(json) => {
            let mut guard = sink.lock().await;
            if guard.send(WsMessage::Text(json)).await.is_err() {
                debug!("session {session_id}: WebSocket send failed (page disconnected)");
                false
            } else {
                true
            }
        }
        Err(e) => {
            error!("session {session_id}: JSON serialization error: {e}");
            true
        }
    }
}

/// Returns a short type-name string for a `PageToHostMsg` variant, used in
/// debug log lines.
fn page_msg_type_name(msg: &PageToHostMsg) -> &'static str {
    match msg {
        PageToHostMsg::Stop => "stop",
        PageToHostMsg::PermissionRequest { .. } => "permissionRequest",
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_msg_type_name_stop() {
        assert_eq!(page_msg_type_name(&PageToHostMsg::Stop), "stop");
    }

    #[test]
    fn test_page_msg_type_name_permission_request() {
        let msg = PageToHostMsg::PermissionRequest {
            resources: vec!["videoCapture".to_string()],
        };
        assert_eq!(page_msg_type_name(&msg), "permissionRequest");
    }
}
