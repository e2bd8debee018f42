//! Sift - fan stdin out to filtered channels
//!
//! # Usage
//!
//! ```bash
//! # Mirror everything to stdout, browse channels on :5055
//! some-service | sift
//!
//! # Mirror only errors, plus two extra channels
//! some-service | sift '^ERR' 'warnings:^WARN' timeout
//!
//! # Exit once input ends
//! cat app.log | sift --exit-on-eof
//! ```
//!
//! By default sift keeps serving after stdin ends, so channel history stays
//! browsable until Ctrl-C. Pass `--exit-on-eof` (or set
//! `server.exit_on_eof = true`) to stop as soon as input is exhausted.

mod api_server;
mod logging;
mod serve;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use sift_config::{ChannelDefinition, Config};

/// Sift - fan stdin out to named, regex-filtered channels
#[derive(Parser, Debug)]
#[command(name = "sift")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Regex selecting lines mirrored to stdout (default: every line)
    filter: Option<String>,

    /// Extra channels as name:pattern (no ':' uses the name as the pattern)
    channels: Vec<String>,

    /// Host to bind the API to. Overrides config file.
    #[arg(long)]
    host: Option<String>,

    /// Port to bind the API to. Overrides config file.
    #[arg(short, long)]
    port: Option<u16>,

    /// Path to configuration file (error if specified but not found)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides config file.
    #[arg(short, long)]
    log_level: Option<String>,

    /// Exit when stdin ends. Without it sift serves until interrupted.
    #[arg(long)]
    exit_on_eof: bool,
}

/// Grace period for blocking tasks when the runtime stops
const RUNTIME_SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(250);

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    let log_level = logging::resolve_log_level(cli.log_level.as_deref(), &config.log);
    logging::init_logging(&log_level, &config.log)?;

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let result = runtime.block_on(serve::run(config));

    // A stdin read still parked on the blocking pool must not hold the exit
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN_TIMEOUT);

    result
}

/// Load the config file (if any) and layer command-line flags on top
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match cli.config {
        Some(ref path) => Config::from_file(path).context("failed to load configuration")?,
        None => Config::default(),
    };

    apply_overrides(&mut config, cli)?;
    config.validate().context("invalid configuration")?;

    Ok(config)
}

fn apply_overrides(config: &mut Config, cli: &Cli) -> Result<()> {
    if let Some(ref host) = cli.host {
        config.server.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if cli.exit_on_eof {
        config.server.exit_on_eof = true;
    }
    if let Some(ref filter) = cli.filter {
        config.channels.stdout_filter = filter.clone();
    }

    for raw in &cli.channels {
        let definition: ChannelDefinition = raw
            .parse()
            .with_context(|| format!("invalid channel argument '{}'", raw))?;
        config.channels.definitions.push(definition);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_positional_filter_and_channels() {
        let cli = Cli::try_parse_from(["sift", "^ERR", "warnings:^WARN", "timeout"]).unwrap();
        let mut config = Config::default();
        apply_overrides(&mut config, &cli).unwrap();

        assert_eq!(config.channels.stdout_filter, "^ERR");
        assert_eq!(
            config.channels.definitions,
            vec![
                ChannelDefinition::new("warnings", "^WARN"),
                ChannelDefinition::new("timeout", "timeout"),
            ]
        );
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "sift",
            "--host",
            "0.0.0.0",
            "-p",
            "9000",
            "--exit-on-eof",
        ])
        .unwrap();
        let mut config: Config = "[server]\nport = 7000".parse().unwrap();
        apply_overrides(&mut config, &cli).unwrap();

        assert_eq!(config.listen_address(), "0.0.0.0:9000");
        assert!(config.server.exit_on_eof);
        assert!(config.channels.stdout_filter.is_empty());
    }

    #[test]
    fn test_serves_past_eof_by_default() {
        let cli = Cli::try_parse_from(["sift"]).unwrap();
        let mut config = Config::default();
        apply_overrides(&mut config, &cli).unwrap();

        assert!(!cli.exit_on_eof);
        assert!(!config.server.exit_on_eof);

        // Config file setting survives a command line without the flag
        let mut config: Config = "[server]\nexit_on_eof = true".parse().unwrap();
        apply_overrides(&mut config, &cli).unwrap();
        assert!(config.server.exit_on_eof);
    }

    #[test]
    fn test_bad_channel_argument() {
        let cli = Cli::try_parse_from(["sift", "", ":nameless"]).unwrap();
        let mut config = Config::default();
        let err = apply_overrides(&mut config, &cli).unwrap_err();
        assert!(err.to_string().contains(":nameless"));
    }
}
