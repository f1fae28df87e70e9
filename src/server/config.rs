//! Server configuration
//!
//! Loaded from `config.toml` (optional) with `SOLO_FTP_*` environment
//! overrides on top of built-in defaults.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_CONFIG_PATH: &str = "config";
const ENV_PREFIX: &str = "SOLO_FTP";

/// Complete server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// IP address the control listener binds to. Passive listeners bind here too.
    pub bind_address: String,

    /// Port for the FTP control connection.
    pub control_port: u16,

    /// Directory served to clients; sessions cannot leave it.
    pub server_root: String,

    /// Address advertised in PASV replies. Defaults to the local address of
    /// the control connection.
    #[serde(default)]
    pub passive_address: Option<String>,

    /// Longest accepted control line, in bytes.
    pub max_command_length: usize,

    /// Read buffer for STOR uploads.
    pub buffer_size: usize,

    /// How long to wait for a data connection to be established.
    pub data_timeout_secs: u64,

    /// Maximum concurrent sessions.
    pub max_clients: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            control_port: 2121,
            server_root: "./server_root".to_string(),
            passive_address: None,
            max_command_length: 512,
            buffer_size: 8192,
            data_timeout_secs: 30,
            max_clients: 10,
        }
    }
}

impl ServerConfig {
    /// Load configuration from ./config.toml with environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from `path` (extension optional). A missing file
    /// falls back to the defaults.
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let settings = Config::builder()
            .set_default("bind_address", defaults.bind_address)?
            .set_default("control_port", i64::from(defaults.control_port))?
            .set_default("server_root", defaults.server_root)?
            .set_default("max_command_length", defaults.max_command_length as i64)?
            .set_default("buffer_size", defaults.buffer_size as i64)?
            .set_default("data_timeout_secs", defaults.data_timeout_secs as i64)?
            .set_default("max_clients", defaults.max_clients as i64)?
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.control_port == 0 {
            return Err(ConfigError::Message("Control port cannot be 0".into()));
        }

        if self.server_root.is_empty() {
            return Err(ConfigError::Message("server_root cannot be empty".into()));
        }

        if self.buffer_size == 0 {
            return Err(ConfigError::Message(
                "buffer_size must be greater than 0".into(),
            ));
        }

        if self.max_clients == 0 {
            return Err(ConfigError::Message(
                "max_clients must be greater than 0".into(),
            ));
        }

        self.bind_ip()?;
        self.passive_ip()?;

        Ok(())
    }

    /// Get bind address and control port as socket address
    pub fn control_socket(&self) -> Result<SocketAddr, ConfigError> {
        Ok(SocketAddr::new(self.bind_ip()?, self.control_port))
    }

    pub fn bind_ip(&self) -> Result<IpAddr, ConfigError> {
        self.bind_address.parse().map_err(|_| {
            ConfigError::Message(format!("Invalid bind_address '{}'", self.bind_address))
        })
    }

    /// Configured PASV address, if any.
    pub fn passive_ip(&self) -> Result<Option<Ipv4Addr>, ConfigError> {
        self.passive_address
            .as_deref()
            .map(|addr| {
                addr.parse().map_err(|_| {
                    ConfigError::Message(format!("Invalid passive_address '{}'", addr))
                })
            })
            .transpose()
    }

    /// Get data connection timeout as Duration
    pub fn data_timeout(&self) -> Duration {
        Duration::from_secs(self.data_timeout_secs)
    }

    /// Get server root as PathBuf
    pub fn server_root_path(&self) -> PathBuf {
        PathBuf::from(&self.server_root)
    }
}
