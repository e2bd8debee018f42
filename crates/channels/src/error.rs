//! Error types for the channels crate

use std::io;
use thiserror::Error;

/// Errors that can occur in channel operations
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Filter pattern failed to compile
    #[error("invalid filter pattern: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// No channel registered under this ID
    #[error("channel not found: {id}")]
    NotFound { id: String },

    /// Writing a content line to the channel's sink failed
    #[error("channel {channel}: failed to write: {source}")]
    SinkWrite {
        channel: String,
        #[source]
        source: io::Error,
    },
}

/// Every per-channel failure from a single broadcast
///
/// Ingestion never stops at the first failing channel; the remaining
/// channels still receive the line and all failures are reported together.
#[derive(Error, Debug)]
#[error("{} channel(s) failed to ingest line", failures.len())]
pub struct IngestError {
    pub failures: Vec<ChannelError>,
}

/// Result type for channel operations
pub type Result<T> = std::result::Result<T, ChannelError>;
