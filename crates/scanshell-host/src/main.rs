//! ScanShell host entry point.
//!
//! This binary is the native shell of a web-hosted barcode-scanning
//! application.  At startup it runs the one-time shell configuration
//! (camera permission, surface settings, permission mediator, debug
//! toggle), binds the scanner device service, and then serves the
//! hosted-page WebSocket channel until Ctrl+C.
//!
//! # Usage
//!
//! ```text
//! scanshell-host [OPTIONS]
//!
//! Options:
//!   --page-port     <PORT>   Hosted-page WebSocket port [default: 8765]
//!   --page-bind     <ADDR>   Bind address for the page channel [default: 0.0.0.0]
//!   --scanner-host  <HOST>   Scanner device service host [default: 127.0.0.1]
//!   --scanner-port  <PORT>   Scanner device service port [default: 9101]
//!   --settings-file <PATH>   Web-surface settings TOML file (optional)
//! ```
//!
//! # Environment variable overrides
//!
//! CLI args take precedence when both are present.
//!
//! | Variable                   | Default     | Description                  |
//! |----------------------------|-------------|------------------------------|
//! | `SCANSHELL_PAGE_PORT`      | `8765`      | Page WebSocket port          |
//! | `SCANSHELL_PAGE_BIND`      | `0.0.0.0`   | Page bind address            |
//! | `SCANSHELL_SCANNER_HOST`   | `127.0.0.1` | Device service host          |
//! | `SCANSHELL_SCANNER_PORT`   | `9101`      | Device service port          |
//! | `SCANSHELL_SETTINGS_FILE`  | (none)      | Surface settings TOML path   |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use scanshell_host::application::{configure_shell, ScannerBridge};
use scanshell_host::domain::{HostConfig, SurfaceSettings};
use scanshell_host::infrastructure::run_server;
use scanshell_host::infrastructure::scanner::net::NetDeviceService;
use scanshell_host::infrastructure::scanner::DeviceService;
use scanshell_host::infrastructure::storage::{load_settings, save_settings};
use scanshell_host::infrastructure::web_surface::{HeadlessPermissionHost, HeadlessSurface};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// ScanShell host.
///
/// Serves a hosted scanning page over WebSocket and bridges it to an
/// out-of-process barcode scanner service.
#[derive(Debug, Parser)]
#[command(
    name = "scanshell-host",
    about = "WebView-style shell bridging a hosted page to a barcode scanner service",
    version
)]
struct Cli {
    /// TCP port for the hosted-page WebSocket channel.
    #[arg(long, default_value_t = 8765, env = "SCANSHELL_PAGE_PORT")]
    page_port: u16,

    /// IP address to bind the page channel to.
    ///
    /// Use `127.0.0.1` when the hosted page always runs on this machine.
    #[arg(long, default_value = "0.0.0.0", env = "SCANSHELL_PAGE_BIND")]
    page_bind: String,

    /// Hostname or IP address of the scanner device service.
    #[arg(long, default_value = "127.0.0.1", env = "SCANSHELL_SCANNER_HOST")]
    scanner_host: String,

    /// TCP port of the scanner device service.
    #[arg(long, default_value_t = 9101, env = "SCANSHELL_SCANNER_PORT")]
    scanner_port: u16,

    /// Path to the web-surface settings TOML file.
    ///
    /// Written with defaults on first run if absent.  Without this flag the
    /// built-in defaults apply.
    #[arg(long, env = "SCANSHELL_SETTINGS_FILE")]
    settings_file: Option<PathBuf>,
}

impl Cli {
    /// Converts the parsed CLI arguments into a [`HostConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if an address does not parse, or if the settings
    /// file exists but cannot be read or parsed.
    fn into_host_config(self) -> anyhow::Result<HostConfig> {
        let page_bind_addr: SocketAddr = format!("{}:{}", self.page_bind, self.page_port)
            .parse()
            .with_context(|| {
                format!("invalid page bind address: '{}:{}'", self.page_bind, self.page_port)
            })?;

        let scanner_addr: SocketAddr = format!("{}:{}", self.scanner_host, self.scanner_port)
            .parse()
            .with_context(|| {
                format!(
                    "invalid scanner service address: '{}:{}'",
                    self.scanner_host, self.scanner_port
                )
            })?;

        let surface = match &self.settings_file {
            Some(path) => {
                if !path.exists() {
                    info!("settings file {} absent; writing defaults", path.display());
                    save_settings(path, &SurfaceSettings::default()).with_context(|| {
                        format!("failed to write default settings to {}", path.display())
                    })?;
                }
                load_settings(path).with_context(|| {
                    format!("failed to load surface settings from {}", path.display())
                })?
            }
            None => SurfaceSettings::default(),
        };

        Ok(HostConfig {
            page_bind_addr,
            scanner_addr,
            surface,
        })
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Log level comes from RUST_LOG, falling back to `info`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.into_host_config()?;

    info!(
        "ScanShell host starting — page={}, scanner={}",
        config.page_bind_addr, config.scanner_addr
    );

    // ── One-time shell configuration ──────────────────────────────────────────
    //
    // The standalone binary has no embedded rendering surface, so the
    // headless implementations stand in; an embedder links the library and
    // passes its real WebView here instead.
    let mut surface = HeadlessSurface::new();
    let permissions = HeadlessPermissionHost::new(true);
    let mediator = configure_shell(
        &mut surface,
        &permissions,
        &config.surface,
        cfg!(debug_assertions),
    );

    // ── Scanner bridge ────────────────────────────────────────────────────────
    let bridge = Arc::new(ScannerBridge::new());
    let service: Arc<dyn DeviceService> = Arc::new(NetDeviceService::new(config.scanner_addr));
    bridge.connect(service);

    // ── Graceful shutdown flag ────────────────────────────────────────────────
    //
    // Relaxed ordering suffices: the accept loop only needs to observe the
    // store eventually.
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C — initiating graceful shutdown");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    // ── Serve the hosted page ─────────────────────────────────────────────────
    run_server(Arc::new(config), Arc::clone(&bridge), mediator, running).await?;

    // Host teardown: disarm the hardware and release the service binding.
    bridge.shutdown().await;

    info!("ScanShell host stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["scanshell-host"]);
        assert_eq!(cli.page_port, 8765);
        assert_eq!(cli.page_bind, "0.0.0.0");
        assert_eq!(cli.scanner_host, "127.0.0.1");
        assert_eq!(cli.scanner_port, 9101);
        assert!(cli.settings_file.is_none());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "scanshell-host",
            "--page-port",
            "9000",
            "--scanner-host",
            "192.168.1.50",
            "--scanner-port",
            "7777",
        ]);
        assert_eq!(cli.page_port, 9000);
        assert_eq!(cli.scanner_host, "192.168.1.50");
        assert_eq!(cli.scanner_port, 7777);
    }

    #[test]
    fn test_into_host_config_defaults() {
        let cli = Cli::parse_from(["scanshell-host"]);
        let config = cli.into_host_config().unwrap();
        assert_eq!(config.page_bind_addr.port(), 8765);
        assert_eq!(config.scanner_addr.to_string(), "127.0.0.1:9101");
        assert_eq!(config.surface, SurfaceSettings::default());
    }

    #[test]
    fn test_into_host_config_invalid_page_bind_returns_error() {
        let cli = Cli {
            page_port: 8765,
            page_bind: "not.an.ip".to_string(),
            scanner_host: "127.0.0.1".to_string(),
            scanner_port: 9101,
            settings_file: None,
        };
        assert!(cli.into_host_config().is_err());
    }

    #[test]
    fn test_into_host_config_invalid_scanner_host_returns_error() {
        let cli = Cli {
            page_port: 8765,
            page_bind: "0.0.0.0".to_string(),
            scanner_host: "not.an.ip".to_string(),
            scanner_port: 9101,
            settings_file: None,
        };
        assert!(cli.into_host_config().is_err());
    }

    #[test]
    fn test_into_host_config_writes_default_settings_file_on_first_run() {
        // Arrange: point at a settings file that does not exist yet
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("scanshell_cli_{}_{nanos}", std::process::id()));
        let path = dir.join("surface.toml");

        let cli = Cli {
            page_port: 8765,
            page_bind: "0.0.0.0".to_string(),
            scanner_host: "127.0.0.1".to_string(),
            scanner_port: 9101,
            settings_file: Some(path.clone()),
        };

        // Act
        let config = cli.into_host_config().unwrap();

        // Assert: the file now exists and the loaded settings are defaults
        assert!(path.exists());
        assert_eq!(config.surface, SurfaceSettings::default());

        std::fs::remove_dir_all(&dir).ok();
    }
}
