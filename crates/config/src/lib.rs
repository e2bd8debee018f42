//! Sift Configuration
//!
//! TOML-based configuration loading with sensible defaults.
//! Minimal config should just work - only specify what you need to change.
//! Command-line flags are applied on top by the binary.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use sift_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[server]\nport = 8080").unwrap();
//! assert_eq!(config.server.port, 8080);
//! ```
//!
//! # Example Full Config
//!
//! ```toml
//! [log]
//! level = "debug"
//! output = "stderr"
//!
//! [server]
//! host = "0.0.0.0"
//! port = 5055
//! exit_on_eof = true
//!
//! [channels]
//! history_capacity = 5000
//! mailbox_depth = 10
//! stdout_filter = "^ERR"
//! definitions = ["warnings:^WARN", "timeouts"]
//! ```

mod channels;
mod error;
mod logging;
mod server;
mod validation;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use channels::{ChannelDefinition, ChannelsConfig, MAX_HISTORY_CAPACITY};
pub use error::{ConfigError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel, LogOutput};
pub use server::ServerConfig;

use serde::Deserialize;

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub log: LogConfig,

    /// HTTP listener and process lifetime
    pub server: ServerConfig,

    /// Channel sizing and startup channels
    pub channels: ChannelsConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read, contains invalid TOML, or fails
    /// validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    ///
    /// Prefer using the `FromStr` trait implementation.
    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// Called automatically when parsing; call again after applying
    /// command-line overrides.
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }

    /// Listen address as `host:port`
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
