//! HueLink peer entry point.
//!
//! Runs the device end of the protocol: accepts pushes that change the shown
//! color and answers color requests with an authenticated report.
//!
//! # Usage
//!
//! ```text
//! hue-peer [OPTIONS]
//!
//! Options:
//!   --bind <ADDR>             IP address to listen on [default: 0.0.0.0]
//!   --port <PORT>             TCP port [default: 3384]
//!   --secret <SECRET>         Shared secret [default: SHARED_SECRET]
//!   --freshness-secs <SECS>   Replay window [default: 30]
//!   --read-timeout-ms <MS>    Per-connection read timeout [default: 3000]
//!   --initial-color <COLOR>   Color before the first push [default: #000000]
//! ```
//!
//! Every option can also be set through the `HUELINK_PEER_*` environment
//! variable of the same name.

use std::net::{IpAddr, SocketAddr};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use hue_core::{Color, SharedSecret};
use hue_peer::{PeerConfig, PeerServer};
use tracing::info;
use tracing_subscriber::EnvFilter;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// HueLink peer.
#[derive(Debug, Parser)]
#[command(
    name = "hue-peer",
    about = "Receive HueLink color pushes and answer color requests",
    version
)]
struct Cli {
    /// IP address to bind the listener to.
    #[arg(long, default_value = "0.0.0.0", env = "HUELINK_PEER_BIND")]
    bind: String,

    /// TCP port to listen on.
    #[arg(long, default_value_t = 3384, env = "HUELINK_PEER_PORT")]
    port: u16,

    /// Shared secret the client tags packets with.
    #[arg(
        long,
        default_value = "SHARED_SECRET",
        env = "HUELINK_PEER_SECRET",
        hide_env_values = true
    )]
    secret: String,

    /// Accept timestamps at most this many seconds away from the local clock.
    #[arg(long, default_value_t = 30, env = "HUELINK_PEER_FRESHNESS_SECS")]
    freshness_secs: u64,

    /// Close a connection that has not delivered a full packet in time.
    #[arg(long, default_value_t = 3000, env = "HUELINK_PEER_READ_TIMEOUT_MS")]
    read_timeout_ms: u64,

    /// Color reported until the first push arrives.
    #[arg(long, default_value = "#000000", env = "HUELINK_PEER_INITIAL_COLOR")]
    initial_color: Color,
}

impl Cli {
    /// Converts the parsed arguments into a [`PeerConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if `--bind` is not an IP address.
    fn into_peer_config(self) -> anyhow::Result<PeerConfig> {
        let ip: IpAddr = self
            .bind
            .parse()
            .with_context(|| format!("invalid bind address: '{}'", self.bind))?;

        Ok(PeerConfig {
            bind_addr: SocketAddr::new(ip, self.port),
            secret: SharedSecret::new(self.secret),
            freshness_window: Duration::from_secs(self.freshness_secs),
            read_timeout: Duration::from_millis(self.read_timeout_ms),
            initial_color: self.initial_color,
        })
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse().into_peer_config()?;
    info!(
        "HueLink peer starting on {} (freshness {:?}, showing {})",
        config.bind_addr, config.freshness_window, config.initial_color
    );

    let server = PeerServer::bind(&config)
        .await
        .context("failed to start listener")?;

    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C, shutting down");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => tracing::error!("failed to listen for Ctrl+C signal: {e}"),
        }
    });

    server.serve(running).await?;

    info!("HueLink peer stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
