//! API server startup
//!
//! Binds the channel API and runs it in a background task until cancelled.

use anyhow::{Context, Result};
use sift_api::{AppState, build_router};
use sift_config::Config;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Bind and spawn the API server
///
/// Binding happens before returning so address errors surface at startup.
pub async fn start_api_server(
    config: &Config,
    state: AppState,
    cancel: CancellationToken,
) -> Result<JoinHandle<()>> {
    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr = config.listen_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind API server to {}", addr))?;

    info!(addr = %addr, "API server listening");

    let handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                cancel.cancelled().await;
            })
            .await
            .unwrap_or_else(|e| {
                error!(error = %e, "API server error");
            });
    });

    Ok(handle)
}
