//! Serve - ingest stdin and expose channels
//!
//! Builds the registry from config, starts the API, then drives stdin
//! through the registry until end-of-input or a shutdown signal.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sift_api::AppState;
use sift_channels::{Channel, ChannelOptions, LineFilter, Registry, drive};
use sift_config::Config;
use tokio::io::BufReader;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::api_server::start_api_server;

/// How long the API server gets to finish in-flight requests
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Run sift until input ends (with `exit_on_eof`) or a signal arrives
pub async fn run(config: Config) -> Result<()> {
    let options = ChannelOptions {
        history_capacity: config.channels.history_capacity,
        mailbox_depth: config.channels.mailbox_depth,
    };

    let registry = Arc::new(build_registry(&config, options)?);
    let cancel = CancellationToken::new();

    let state = AppState::new(Arc::clone(&registry), options);
    let api_task = start_api_server(&config, state, cancel.clone())
        .await
        .context("failed to start API server")?;

    info!(
        channels = registry.len(),
        history_capacity = options.history_capacity,
        exit_on_eof = config.server.exit_on_eof,
        "sift running"
    );

    let stdin = BufReader::new(tokio::io::stdin());

    tokio::select! {
        result = drive(stdin, &registry) => {
            let stats = result.context("failed to read stdin")?;
            info!(
                lines = stats.lines,
                truncated = stats.truncated,
                sink_failures = stats.sink_failures,
                "input ended"
            );

            if !config.server.exit_on_eof {
                info!("still serving channels, interrupt to exit");
                wait_for_shutdown().await;
                info!("shutdown signal received");
            }
        }
        _ = wait_for_shutdown() => {
            info!("shutdown signal received, stopping ingestion");
        }
    }

    // Ends every live stream so open WebSockets close
    let disconnected = registry.disconnect_all();
    info!(subscribers = disconnected, "disconnected live subscribers");

    cancel.cancel();

    match tokio::time::timeout(SHUTDOWN_TIMEOUT, api_task).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(error = %e, "API server task panicked"),
        Err(_) => warn!("API server did not stop within timeout"),
    }

    Ok(())
}

/// Reserved channels plus every configured definition
fn build_registry(config: &Config, options: ChannelOptions) -> Result<Registry> {
    let stdout_sink = Box::new(io::stdout());
    let registry = Registry::bootstrap(&config.channels.stdout_filter, stdout_sink, options)
        .context("invalid stdout filter")?;

    for definition in &config.channels.definitions {
        let filter = LineFilter::parse(&definition.pattern)
            .with_context(|| format!("invalid filter for channel '{}'", definition.name))?;

        let channel = Channel::new(definition.name.clone(), filter).with_options(options);
        registry
            .add(channel)
            .with_context(|| format!("failed to add channel '{}'", definition.name))?;
    }

    Ok(registry)
}

/// Wait for SIGINT or SIGTERM
async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_config::ChannelDefinition;

    #[test]
    fn test_build_registry_with_definitions() {
        let mut config = Config::default();
        config
            .channels
            .definitions
            .push(ChannelDefinition::new("warnings", "^WARN"));

        let registry = build_registry(&config, ChannelOptions::default()).unwrap();
        let names: Vec<String> = registry.list().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["stdin", "stdout", "warnings"]);
    }

    #[test]
    fn test_build_registry_bad_stdout_filter() {
        let mut config = Config::default();
        config.channels.stdout_filter = "(".into();

        let err = build_registry(&config, ChannelOptions::default()).unwrap_err();
        assert!(err.to_string().contains("stdout filter"));
    }

    #[test]
    fn test_build_registry_bad_channel_filter() {
        let mut config = Config::default();
        config
            .channels
            .definitions
            .push(ChannelDefinition::new("broken", "[x"));

        let err = build_registry(&config, ChannelOptions::default()).unwrap_err();
        assert!(err.to_string().contains("broken"));
    }
}
