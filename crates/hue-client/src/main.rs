//! HueLink client command-line entry point.
//!
//! The wrist UI drives [`hue_client::ColorExchangeClient`] directly; this
//! binary exposes the same two operations from a terminal, which is handy for
//! checking a device without the watch.
//!
//! # Usage
//!
//! ```text
//! hue-client [OPTIONS] <COMMAND>
//!
//! Commands:
//!   send <R> <G> <B>   Push a color given as normalized components (0.0..=1.0)
//!   send-hex <COLOR>   Push a color given as #RRGGBB
//!   request            Ask the device for its current color and print it
//!
//! Options:
//!   --config <PATH>    Config file [default: platform config dir]
//!   --host <HOST>      Override host of both push and pull targets
//!   --port <PORT>      Override port of both push and pull targets
//!   --secret <SECRET>  Override the shared secret of both targets
//!   --verify-responses Require authenticated color reports
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable          | Overrides  |
//! |-------------------|------------|
//! | `HUELINK_CONFIG`  | `--config` |
//! | `HUELINK_HOST`    | `--host`   |
//! | `HUELINK_PORT`    | `--port`   |
//! | `HUELINK_SECRET`  | `--secret` |

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use hue_client::infrastructure::storage::config::{
    load_config, load_config_from, AppConfig, ConfigError,
};
use hue_client::{ColorExchangeClient, PushOutcome, TcpTransport};
use hue_core::Color;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// HueLink client.
///
/// Pushes a color to a HueLink device, or asks it for the color it shows.
#[derive(Debug, Parser)]
#[command(
    name = "hue-client",
    about = "Push colors to, and fetch colors from, a HueLink device",
    version
)]
struct Cli {
    /// Path of the TOML config file.
    #[arg(long, env = "HUELINK_CONFIG")]
    config: Option<PathBuf>,

    /// Host of the device, for both push and pull.
    #[arg(long, env = "HUELINK_HOST")]
    host: Option<String>,

    /// TCP port of the device, for both push and pull.
    #[arg(long, env = "HUELINK_PORT")]
    port: Option<u16>,

    /// Shared secret, for both push and pull.
    #[arg(long, env = "HUELINK_SECRET", hide_env_values = true)]
    secret: Option<String>,

    /// Reject replies that are not authenticated color reports.
    #[arg(long)]
    verify_responses: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Push a color given as normalized components.
    Send {
        #[arg(allow_negative_numbers = true)]
        red: f32,
        #[arg(allow_negative_numbers = true)]
        green: f32,
        #[arg(allow_negative_numbers = true)]
        blue: f32,
    },
    /// Push a color given as `#RRGGBB`.
    SendHex { color: Color },
    /// Request the device's current color.
    Request,
}

impl Cli {
    /// Loads the config file and applies command-line overrides on top.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    fn resolve_config(&self) -> anyhow::Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => load_config_from(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => match load_config() {
                Ok(config) => config,
                Err(ConfigError::NoPlatformConfigDir) => {
                    warn!("no platform config directory, using defaults");
                    AppConfig::default()
                }
                Err(e) => return Err(e).context("failed to load config"),
            },
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut AppConfig) {
        for target in [&mut config.push, &mut config.pull] {
            if let Some(host) = &self.host {
                target.host = host.clone();
            }
            if let Some(port) = self.port {
                target.port = port;
            }
            if let Some(secret) = &self.secret {
                target.secret = secret.clone();
            }
        }
        if self.verify_responses {
            config.protocol.verify_responses = true;
        }
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

    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    let transport = Arc::new(TcpTransport::new(config.transport_config()));
    let client = ColorExchangeClient::new(transport, config.exchange_settings());

    match cli.command {
        Command::Send { red, green, blue } => push(&client, Color::from_unit(red, green, blue)).await,
        Command::SendHex { color } => push(&client, color).await,
        Command::Request => {
            let outcome = client.request_color().await;
            match outcome.color() {
                Some(color) => {
                    println!("{color}");
                    Ok(())
                }
                None => bail!("no color received: {outcome:?}"),
            }
        }
    }
}

async fn push(client: &ColorExchangeClient, color: Color) -> anyhow::Result<()> {
    let outcome = client
        .send_color(color)
        .await
        .context("push task did not complete")?;
    match outcome {
        PushOutcome::Sent { bytes_written } => {
            info!("sent {color} ({bytes_written} bytes)");
            Ok(())
        }
        other => bail!("push failed: {other:?}"),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
