//! TOML-based configuration for the client.
//!
//! Read from an explicit `--config` path, or otherwise from:
//! - Windows:  `%APPDATA%\TelloClient\config.toml`
//! - Linux:    `~/.config/tello-client/config.toml`
//! - macOS:    `~/Library/Application Support/TelloClient/config.toml`
//!
//! Example with every setting at its default:
//!
//! ```toml
//! [network]
//! remote_addr = "192.168.10.1:8889"
//! bind_address = "0.0.0.0"
//! local_port = 9000
//! accept_any_sender = false
//! resume_after_send_error = false
//! # max_pending = 256          # absent = unbounded
//!
//! [control]
//! tick_ms = 10
//! connect_button = "a"
//! takeoff_button = "b"
//! land_button = "x"
//!
//! [control.axes]
//! left_right = 2
//! forward_back = 3
//! up_down = 1
//! yaw = 0
//!
//! [gamepad]
//! device = "/dev/input/js0"
//!
//! [logging]
//! level = "info"
//! file = "tello.log"           # "" disables the side file
//! ```
//!
//! Every field carries a `#[serde(default = ...)]`, and every section a
//! `#[serde(default)]`, so an empty file is a valid configuration.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tello_core::{AxisMapping, Button, ButtonBindings, CommandMapper};
use thiserror::Error;

use crate::infrastructure::network::SessionOptions;

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

    /// A setting parsed but holds an unusable value.
    #[error("invalid value for {field}: {value:?} ({reason})")]
    Invalid {
        field: &'static str,
        value: String,
        reason: String,
    },
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub control: ControlConfig,
    #[serde(default)]
    pub gamepad: GamepadConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// UDP endpoint and transport behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkConfig {
    /// The drone's command endpoint.
    #[serde(default = "default_remote_addr")]
    pub remote_addr: String,
    /// Local address to bind.  `"0.0.0.0"` binds all interfaces.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Local UDP port; the drone replies to this port.
    #[serde(default = "default_local_port")]
    pub local_port: u16,
    /// Deliver datagrams from any sender, not only `remote_addr`.
    #[serde(default)]
    pub accept_any_sender: bool,
    /// Keep draining the outbound queue after a failed send.
    #[serde(default)]
    pub resume_after_send_error: bool,
    /// Outbound queue bound.  Absent means unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pending: Option<usize>,
}

/// Control loop rate and gamepad mapping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ControlConfig {
    /// Control period in milliseconds.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    #[serde(default = "default_connect_button")]
    pub connect_button: Button,
    #[serde(default = "default_takeoff_button")]
    pub takeoff_button: Button,
    #[serde(default = "default_land_button")]
    pub land_button: Button,
    /// Axis index feeding each `rc` field.
    #[serde(default)]
    pub axes: AxisMapping,
}

/// Input device selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GamepadConfig {
    /// Joystick device node (Linux).
    #[serde(default = "default_device")]
    pub device: PathBuf,
}

/// Log level and side file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// `tracing` level or filter directive.  `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Side file receiving a copy of all log output.  Empty disables it.
    #[serde(default = "default_log_file")]
    pub file: PathBuf,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_remote_addr() -> String {
    "192.168.10.1:8889".to_string()
}
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}
fn default_local_port() -> u16 {
    9000
}
fn default_tick_ms() -> u64 {
    10
}
fn default_connect_button() -> Button {
    ButtonBindings::default().connect
}
fn default_takeoff_button() -> Button {
    ButtonBindings::default().takeoff
}
fn default_land_button() -> Button {
    ButtonBindings::default().land
}
fn default_device() -> PathBuf {
    PathBuf::from("/dev/input/js0")
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_file() -> PathBuf {
    PathBuf::from("tello.log")
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            remote_addr: default_remote_addr(),
            bind_address: default_bind_address(),
            local_port: default_local_port(),
            accept_any_sender: false,
            resume_after_send_error: false,
            max_pending: None,
        }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            connect_button: default_connect_button(),
            takeoff_button: default_takeoff_button(),
            land_button: default_land_button(),
            axes: AxisMapping::default(),
        }
    }
}

impl Default for GamepadConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

// ── Derived settings ──────────────────────────────────────────────────────────

impl NetworkConfig {
    /// The drone's address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `remote_addr` is not `ip:port`.
    pub fn remote(&self) -> Result<SocketAddr, ConfigError> {
        self.remote_addr
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                field: "network.remote_addr",
                value: self.remote_addr.clone(),
                reason: e.to_string(),
            })
    }

    /// The local bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `bind_address` is not an IP.
    pub fn local(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .bind_address
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                field: "network.bind_address",
                value: self.bind_address.clone(),
                reason: e.to_string(),
            })?;
        Ok(SocketAddr::new(ip, self.local_port))
    }

    /// Transport behaviour switches.
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            max_pending: self.max_pending,
            resume_after_send_error: self.resume_after_send_error,
            accept_any_sender: self.accept_any_sender,
        }
    }
}

impl ControlConfig {
    /// The control period.
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// The configured mapping.
    pub fn mapper(&self) -> CommandMapper {
        CommandMapper::new(
            ButtonBindings {
                connect: self.connect_button,
                takeoff: self.takeoff_button,
                land: self.land_button,
            },
            self.axes,
        )
    }
}

impl LoggingConfig {
    /// The side file, or `None` if disabled.
    pub fn file(&self) -> Option<&Path> {
        if self.file.as_os_str().is_empty() {
            None
        } else {
            Some(&self.file)
        }
    }
}

impl ClientConfig {
    /// Checks values that parse but cannot be used.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.network.remote()?;
        self.network.local()?;
        if self.network.max_pending == Some(0) {
            return Err(ConfigError::Invalid {
                field: "network.max_pending",
                value: "0".to_string(),
                reason: "must be at least 1 or absent".to_string(),
            });
        }
        if self.control.tick_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "control.tick_ms",
                value: "0".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
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
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads the config from `path`, returning defaults if the file does not
/// exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<ClientConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ClientConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Loads the config from the platform directory.
///
/// # Errors
///
/// As [`load_config_from`], plus [`ConfigError::NoPlatformConfigDir`].
pub fn load_config() -> Result<ClientConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Writes `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(path: &Path, config: &ClientConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
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

/// Writes `config` to the platform directory.
///
/// # Errors
///
/// As [`save_config_to`], plus [`ConfigError::NoPlatformConfigDir`].
pub fn save_config(config: &ClientConfig) -> Result<(), ConfigError> {
    save_config_to(&config_file_path()?, config)
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("TelloClient"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("tello-client"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("TelloClient")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
