//! Registry - the ordered set of channels
//!
//! The `Registry` owns every channel in registration order (which is also
//! listing order). It is the single entry point for ingestion: each line is
//! handed to every channel in turn, and one channel's sink failure never
//! keeps the line from the remaining channels.
//!
//! Two reserved channels are created by [`Registry::bootstrap`]:
//!
//! - `stdin` - the raw, unfiltered firehose; new channels are backfilled
//!   from its history
//! - `stdout` - mirrors its accepted lines to the process's standard output
//!
//! The registry does not protect them from removal. Which IDs may be deleted
//! is a policy decision for the caller.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::channel::{Channel, ChannelInfo, ChannelOptions, Sink};
use crate::error::{ChannelError, IngestError, Result};
use crate::filter::LineFilter;

/// Reserved ID of the unfiltered input channel
pub const STDIN_ID: &str = "stdin";

/// Reserved ID of the standard output mirror channel
pub const STDOUT_ID: &str = "stdout";

/// Ordered collection of channels
#[derive(Debug, Default)]
pub struct Registry {
    channels: RwLock<Vec<Arc<Channel>>>,
}

impl Registry {
    /// Create an empty registry
    ///
    /// Without a `stdin` channel, [`add`](Self::add) has nothing to backfill
    /// from and fails. Most callers want [`bootstrap`](Self::bootstrap).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the two reserved channels
    ///
    /// An empty `stdout_filter` mirrors every line.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPattern` if `stdout_filter` does not compile.
    pub fn bootstrap(stdout_filter: &str, stdout_sink: Sink, options: ChannelOptions) -> Result<Self> {
        let stdout_filter = LineFilter::parse(stdout_filter)?;

        let stdin = Channel::new(STDIN_ID, LineFilter::none())
            .with_id(STDIN_ID)
            .with_options(options);

        let stdout = Channel::new(STDOUT_ID, stdout_filter)
            .with_id(STDOUT_ID)
            .with_options(options)
            .with_sink(STDOUT_ID, stdout_sink);

        debug!(stdout_filter = %stdout.filter(), "bootstrapped reserved channels");

        Ok(Self {
            channels: RwLock::new(vec![Arc::new(stdin), Arc::new(stdout)]),
        })
    }

    /// Deliver a line to every channel in registration order
    ///
    /// # Errors
    ///
    /// Returns every per-channel sink failure together. All channels have
    /// received the line regardless.
    pub fn ingest_all(&self, text: &str) -> std::result::Result<(), IngestError> {
        let channels = self.channels.read();

        let failures: Vec<ChannelError> = channels
            .iter()
            .filter_map(|channel| channel.ingest_text(text).err())
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(IngestError { failures })
        }
    }

    /// Find a channel by ID
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no channel has this ID.
    pub fn lookup(&self, id: &str) -> Result<Arc<Channel>> {
        self.channels
            .read()
            .iter()
            .find(|c| c.id() == id)
            .cloned()
            .ok_or_else(|| ChannelError::NotFound { id: id.to_string() })
    }

    /// Register a channel, backfilled from the `stdin` history
    ///
    /// Each retained content line from `stdin` is replayed through the new
    /// channel's own filter, keeping its original timestamp. The registry
    /// stays write-locked from snapshot to insert, so no line is missed or
    /// seen twice between backfill and live ingestion.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if there is no `stdin` channel to backfill from.
    /// Backfill sink failures are ignored; the channel is registered anyway.
    pub fn add(&self, channel: Channel) -> Result<Arc<Channel>> {
        let mut channels = self.channels.write();

        let stdin = channels
            .iter()
            .find(|c| c.id() == STDIN_ID)
            .ok_or_else(|| ChannelError::NotFound {
                id: STDIN_ID.to_string(),
            })?;

        let backlog = stdin.history();
        let mut offered = 0usize;
        for line in backlog.iter().filter(|l| !l.is_event()) {
            let _ = channel.ingest_line(line);
            offered += 1;
        }

        let channel = Arc::new(channel);
        channels.push(Arc::clone(&channel));

        info!(
            channel_id = %channel.id(),
            name = %channel.name(),
            filter = %channel.filter(),
            offered,
            "channel added"
        );

        Ok(channel)
    }

    /// Remove a channel and disconnect all its subscribers
    ///
    /// Returns the removed channel, or `None` if no channel has this ID.
    pub fn remove(&self, id: &str) -> Option<Arc<Channel>> {
        let removed = {
            let mut channels = self.channels.write();
            let pos = channels.iter().position(|c| c.id() == id)?;
            channels.remove(pos)
        };

        let closed = removed.close_subscribers();
        info!(channel_id = %id, closed, "channel removed");

        Some(removed)
    }

    /// Every channel, in registration order
    pub fn channels(&self) -> Vec<Arc<Channel>> {
        self.channels.read().clone()
    }

    /// Listing view of every channel, in registration order
    pub fn list(&self) -> Vec<ChannelInfo> {
        self.channels.read().iter().map(|c| c.info()).collect()
    }

    /// Force-disconnect the subscribers of every channel
    ///
    /// Used on shutdown so live transports end promptly.
    pub fn disconnect_all(&self) -> usize {
        self.channels
            .read()
            .iter()
            .map(|c| c.close_subscribers())
            .sum()
    }

    pub fn len(&self) -> usize {
        self.channels.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.read().is_empty()
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
