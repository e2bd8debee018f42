//! Configuration validation
//!
//! Checks value ranges that serde cannot express:
//! - History capacity is between 1 and `MAX_HISTORY_CAPACITY`
//! - Mailbox depth is at least 1
//! - Host is not empty

use crate::Config;
use crate::channels::MAX_HISTORY_CAPACITY;
use crate::error::{ConfigError, Result};

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_server(config)?;
    validate_channels(config)?;
    Ok(())
}

fn validate_server(config: &Config) -> Result<()> {
    if config.server.host.trim().is_empty() {
        return Err(ConfigError::invalid_value("server", "host", "must not be empty"));
    }
    Ok(())
}

fn validate_channels(config: &Config) -> Result<()> {
    let channels = &config.channels;

    if channels.history_capacity == 0 || channels.history_capacity > MAX_HISTORY_CAPACITY {
        return Err(ConfigError::invalid_value(
            "channels",
            "history_capacity",
            format!("must be between 1 and {}", MAX_HISTORY_CAPACITY),
        ));
    }

    if channels.mailbox_depth == 0 {
        return Err(ConfigError::invalid_value(
            "channels",
            "mailbox_depth",
            "must be at least 1",
        ));
    }

    Ok(())
}
