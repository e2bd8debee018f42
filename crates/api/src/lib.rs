//! Sift API
//!
//! HTTP API for inspecting and managing sift channels.
//!
//! # Overview
//!
//! This crate exposes a [`Registry`](sift_channels::Registry) over HTTP. It is
//! built on Axum and holds no channel state of its own; every handler goes
//! straight to the registry.
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use sift_api::{build_router, AppState};
//! use sift_channels::{ChannelOptions, Registry};
//!
//! let registry = Arc::new(Registry::bootstrap("", Box::new(std::io::stdout()), options)?);
//! let app = build_router(AppState::new(registry, options));
//!
//! let listener = tokio::net::TcpListener::bind("localhost:5055").await?;
//! axum::serve(listener, app).await?;
//! ```
//!
//! # Endpoints
//!
//! ## Operations
//! - `GET /health` - Liveness and channel count
//!
//! ## Channels
//! - `GET /api/channels` - List channels in registration order
//! - `POST /api/channels` - Create a channel (backfilled from stdin history)
//! - `PATCH /api/channels/{id}` - Rename, refilter or change the replace template
//! - `DELETE /api/channels/{id}` - Remove a channel and disconnect its subscribers
//! - `GET /api/channels/{id}/history` - History as JSON records
//! - `GET /api/channels/{id}/plain` - History as a plain-text download
//! - `GET /api/channels/{id}/live` - WebSocket stream of new records
//! - `POST /api/validate-filter` - Check that a pattern compiles

pub mod error;
pub mod routes;
pub mod state;

// Re-exports
pub use error::{ApiError, Result};
pub use routes::build_router;
pub use state::{AppState, ProtectedIds};
