//! TOML-based configuration for the client.
//!
//! Reads and writes `AppConfig` at the platform-appropriate path:
//! - Windows:  `%APPDATA%\HueLink\config.toml`
//! - Linux:    `$XDG_CONFIG_HOME/huelink/config.toml` (or `~/.config/huelink/`)
//! - macOS:    `~/Library/Application Support/HueLink/config.toml`
//!
//! Example file:
//!
//! ```toml
//! [push]
//! host = "192.168.0.4"
//! port = 3384
//! secret = "SHARED_SECRET"
//!
//! [pull]
//! host = "192.168.0.4"
//! port = 3384
//! secret = "SHARED_SECRET"
//!
//! [transport]
//! connect_timeout_ms = 3000
//! io_timeout_ms = 3000
//! max_response_bytes = 4096
//!
//! [protocol]
//! verify_responses = false
//! ```
//!
//! Every section and every field is optional.  A missing field takes the
//! value of its `#[serde(default = "...")]` function, and a missing file
//! yields `AppConfig::default()`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use hue_core::SharedSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::exchange_color::{ExchangeSettings, Target};
use crate::application::transport::Endpoint;
use crate::infrastructure::network::TcpTransportConfig;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level client configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AppConfig {
    /// Where colors are pushed.
    #[serde(default)]
    pub push: TargetConfig,
    /// Where colors are requested from.
    #[serde(default)]
    pub pull: TargetConfig,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub protocol: ProtocolConfig,
}

/// Host, port and shared secret of one peer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TargetConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Secret both ends key their HMAC with.
    #[serde(default = "default_secret")]
    pub secret: String,
}

/// Timeouts and limits of the TCP transport.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransportConfig {
    #[serde(default = "default_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub io_timeout_ms: u64,
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
}

/// Protocol options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ProtocolConfig {
    /// Require replies to be authenticated color reports.
    #[serde(default)]
    pub verify_responses: bool,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_host() -> String {
    "192.168.0.4".to_string()
}
fn default_port() -> u16 {
    3384
}
fn default_secret() -> String {
    "SHARED_SECRET".to_string()
}
fn default_timeout_ms() -> u64 {
    3000
}
fn default_max_response_bytes() -> usize {
    4096
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            secret: default_secret(),
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_timeout_ms(),
            io_timeout_ms: default_timeout_ms(),
            max_response_bytes: default_max_response_bytes(),
        }
    }
}

// ── Conversions ───────────────────────────────────────────────────────────────

impl TargetConfig {
    pub fn to_target(&self) -> Target {
        Target {
            endpoint: Endpoint::new(self.host.clone(), self.port),
            secret: SharedSecret::new(self.secret.clone()),
        }
    }
}

impl AppConfig {
    /// Settings for [`crate::ColorExchangeClient`].
    pub fn exchange_settings(&self) -> ExchangeSettings {
        ExchangeSettings {
            push: self.push.to_target(),
            pull: self.pull.to_target(),
            verify_responses: self.protocol.verify_responses,
        }
    }

    /// Settings for [`crate::TcpTransport`].
    pub fn transport_config(&self) -> TcpTransportConfig {
        TcpTransportConfig {
            connect_timeout: Duration::from_millis(self.transport.connect_timeout_ms),
            io_timeout: Duration::from_millis(self.transport.io_timeout_ms),
            max_response_bytes: self.transport.max_response_bytes,
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the default config file.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `AppConfig` from the default path.
///
/// # Errors
///
/// See [`load_config_from`].
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads `AppConfig` from `path`, returning `AppConfig::default()` if the file
/// does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Writes `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolves the platform config base directory including the `huelink`
/// subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("HueLink"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("huelink"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("HueLink")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
