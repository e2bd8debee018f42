//! Tracing setup
//!
//! Diagnostics go to stderr unless configured otherwise; stdout belongs to
//! the mirrored `stdout` channel.

use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{Context, Result};
use sift_config::{LogConfig, LogFormat, LogOutput};
use tracing::warn;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Resolve log level with priority: CLI > config file > default
pub fn resolve_log_level(cli_level: Option<&str>, config: &LogConfig) -> String {
    // CLI flag takes precedence
    if let Some(level) = cli_level {
        return level.to_string();
    }

    config.level.as_str().to_string()
}

/// Initialize the tracing subscriber for logging
pub fn init_logging(level: &str, config: &LogConfig) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    let writer = match config.output {
        LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
        LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
        LogOutput::File(ref path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file '{}'", path.display()))?;
            BoxMakeWriter::new(Mutex::new(file))
        }
    };

    let layer = fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_thread_ids(false);

    match config.format {
        LogFormat::Console => tracing_subscriber::registry()
            .with(layer.with_ansi(config.output.wants_ansi()))
            .with(filter)
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(layer.json().flatten_event(true))
            .with(filter)
            .init(),
    }

    if config.output.shares_stdout() {
        warn!("logging to stdout; diagnostics will interleave with mirrored lines");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_config::LogLevel;

    #[test]
    fn test_cli_level_wins() {
        let config = LogConfig {
            level: LogLevel::Warn,
            ..LogConfig::default()
        };
        assert_eq!(resolve_log_level(Some("trace"), &config), "trace");
    }

    #[test]
    fn test_config_level_used() {
        let config = LogConfig {
            level: LogLevel::Debug,
            ..LogConfig::default()
        };
        assert_eq!(resolve_log_level(None, &config), "debug");
    }

    #[test]
    fn test_default_level() {
        assert_eq!(resolve_log_level(None, &LogConfig::default()), "info");
    }
}
