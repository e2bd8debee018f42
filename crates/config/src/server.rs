//! Server configuration
//!
//! Where the channel API listens and what happens when input ends.

use serde::Deserialize;

/// Server configuration
///
/// # Example
///
/// ```toml
/// [server]
/// host = "localhost"   # default
/// port = 5055          # default
/// exit_on_eof = false  # default
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    /// Default: "localhost"
    pub host: String,

    /// Port to listen on
    /// Default: 5055
    pub port: u16,

    /// Exit as soon as stdin reaches end-of-input
    /// Default: false (keep serving until interrupted)
    pub exit_on_eof: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5055,
            exit_on_eof: false,
        }
    }
}
