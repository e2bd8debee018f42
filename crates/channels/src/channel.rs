//! Channel - one independently filtered view over the line stream
//!
//! A `Channel` owns a history ring, a filter, an optional sink and a set of
//! live subscribers. All mutable state sits behind one lock per channel, so
//! a filter swap, a subscriber change and an append are atomic relative to
//! each other while different channels never contend.
//!
//! # Usage
//!
//! ```
//! use sift_channels::{Channel, LineFilter};
//!
//! let channel = Channel::new("errors", LineFilter::compile("^ERR").unwrap());
//! channel.ingest_text("ERR disk full").unwrap();
//! channel.ingest_text("info: ok").unwrap();
//!
//! let history = channel.history();
//! assert_eq!(history.len(), 1);
//! assert_eq!(history[0].text, "ERR disk full");
//! ```

use std::fmt;
use std::io::Write;

use parking_lot::Mutex;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, trace};

use crate::buffer::{DEFAULT_CAPACITY, HistoryRing};
use crate::error::{ChannelError, Result};
use crate::filter::LineFilter;
use crate::line::Line;
use crate::subscriber::{DEFAULT_MAILBOX_DEPTH, SubscriberSet, Subscription};

/// Write destination mirroring a channel's content lines
pub type Sink = Box<dyn Write + Send>;

/// Sizing for a channel's history and subscriber mailboxes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelOptions {
    /// Records kept in history
    pub history_capacity: usize,
    /// Per-subscriber mailbox depth
    pub mailbox_depth: usize,
}

impl Default for ChannelOptions {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_CAPACITY,
            mailbox_depth: DEFAULT_MAILBOX_DEPTH,
        }
    }
}

/// Listing view of a channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelInfo {
    pub name: String,
    pub id: String,
    /// Label of the attached sink (empty if none)
    pub sink_label: String,
    /// Canonical filter pattern (empty if none)
    pub filter: String,
    pub replace: String,
}

/// A named, filtered channel
pub struct Channel {
    /// Opaque identifier, fixed for the channel's lifetime
    id: String,
    state: Mutex<ChannelState>,
}

struct ChannelState {
    name: String,
    filter: LineFilter,
    /// Replacement template applied to accepted text
    replace: String,
    history: HistoryRing,
    sink: Option<Sink>,
    sink_label: String,
    subscribers: SubscriberSet,
    mailbox_depth: usize,
}

impl Channel {
    /// Create a channel with a random ID and default sizing
    pub fn new(name: impl Into<String>, filter: LineFilter) -> Self {
        let options = ChannelOptions::default();

        Self {
            id: generate_id(),
            state: Mutex::new(ChannelState {
                name: name.into(),
                filter,
                replace: String::new(),
                history: HistoryRing::with_capacity(options.history_capacity),
                sink: None,
                sink_label: String::new(),
                subscribers: SubscriberSet::new(),
                mailbox_depth: options.mailbox_depth,
            }),
        }
    }

    /// Use a fixed ID instead of a random one
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Resize history and mailboxes
    ///
    /// Meant for construction time; any retained history is discarded.
    pub fn with_options(mut self, options: ChannelOptions) -> Self {
        let state = self.state.get_mut();
        state.history = HistoryRing::with_capacity(options.history_capacity);
        state.mailbox_depth = options.mailbox_depth.max(1);
        self
    }

    /// Attach a sink that receives every accepted content line
    pub fn with_sink(mut self, label: impl Into<String>, sink: Sink) -> Self {
        let state = self.state.get_mut();
        state.sink = Some(sink);
        state.sink_label = label.into();
        self
    }

    /// Set the initial replacement template
    pub fn with_replace(mut self, template: impl Into<String>) -> Self {
        self.state.get_mut().replace = template.into();
        self
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> String {
        self.state.lock().name.clone()
    }

    /// Canonical pattern of the active filter
    pub fn filter(&self) -> String {
        self.state.lock().filter.as_str().to_string()
    }

    pub fn replace(&self) -> String {
        self.state.lock().replace.clone()
    }

    /// Listing view of this channel
    pub fn info(&self) -> ChannelInfo {
        let state = self.state.lock();
        ChannelInfo {
            name: state.name.clone(),
            id: self.id.clone(),
            sink_label: state.sink_label.clone(),
            filter: state.filter.as_str().to_string(),
            replace: state.replace.clone(),
        }
    }

    // ------------------------------------------------------------------------
    // Ingestion
    // ------------------------------------------------------------------------

    /// Ingest raw text
    ///
    /// Text rejected by the filter is ignored entirely. Accepted text becomes
    /// a content record stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns `SinkWrite` if the sink rejected the line. History and
    /// subscribers were still updated.
    pub fn ingest_text(&self, text: &str) -> Result<()> {
        let mut state = self.state.lock();
        if !state.filter.matches(text) {
            return Ok(());
        }

        let text = state.filter.rewrite(text, &state.replace).into_owned();
        self.append_locked(&mut state, Line::content(text))
    }

    /// Ingest an existing content record, keeping its timestamp
    ///
    /// Used to replay history into a new channel through the same filter
    /// and rewrite path as live text.
    pub fn ingest_line(&self, line: &Line) -> Result<()> {
        let mut state = self.state.lock();
        if !state.filter.matches(&line.text) {
            return Ok(());
        }

        let text = state.filter.rewrite(&line.text, &state.replace).into_owned();
        let record = Line {
            text,
            event: line.event.clone(),
            timestamp: line.timestamp,
        };
        self.append_locked(&mut state, record)
    }

    /// Append a record unconditionally (no filter check)
    pub fn append_record(&self, line: Line) -> Result<()> {
        let mut state = self.state.lock();
        self.append_locked(&mut state, line)
    }

    /// Caller holds the channel lock. A sink failure is reported only after
    /// history and subscribers have the record.
    fn append_locked(&self, state: &mut ChannelState, line: Line) -> Result<()> {
        let written = match state.sink {
            Some(ref mut sink) if !line.is_event() => {
                writeln!(sink, "{}", line.text).and_then(|()| sink.flush())
            }
            _ => Ok(()),
        };

        if !state.subscribers.is_empty() {
            let outcome = state.subscribers.broadcast(&line);
            trace!(
                channel_id = %self.id,
                sent = outcome.sent,
                dropped = outcome.dropped,
                closed = outcome.closed,
                "fanned out record"
            );
        }
        state.history.push(line);

        written.map_err(|source| ChannelError::SinkWrite {
            channel: state.name.clone(),
            source,
        })
    }

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    /// Replace the filter
    ///
    /// Compiles outside the lock. If the canonical pattern is unchanged this
    /// is a no-op; otherwise the swap is recorded as an event in history and
    /// on the live stream. Returns whether the filter changed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPattern` and leaves the channel untouched if the
    /// pattern does not compile.
    pub fn set_filter(&self, pattern: &str) -> Result<bool> {
        let filter = LineFilter::compile(pattern)?;

        let mut state = self.state.lock();
        if state.filter.same_as(&filter) {
            return Ok(false);
        }

        let event = format!(
            "changed filter: {} -> {}",
            state.filter.as_str(),
            filter.as_str()
        );
        state.filter = filter;

        info!(channel_id = %self.id, %event, "filter updated");
        self.append_locked(&mut state, Line::event(event))?;
        Ok(true)
    }

    /// Rename the channel (display only, no event)
    pub fn set_name(&self, name: impl Into<String>) {
        self.state.lock().name = name.into();
    }

    /// Replace the rewrite template, returning whether it changed
    pub fn set_replace(&self, template: impl Into<String>) -> bool {
        let template = template.into();
        let mut state = self.state.lock();
        if state.replace == template {
            return false;
        }

        debug!(channel_id = %self.id, replace = %template, "replace template updated");
        state.replace = template;
        true
    }

    // ------------------------------------------------------------------------
    // Reading
    // ------------------------------------------------------------------------

    /// History snapshot, oldest first
    pub fn history(&self) -> Vec<Line> {
        self.state.lock().history.snapshot()
    }

    /// Register a live subscriber with this channel's mailbox depth
    pub fn subscribe(&self) -> Subscription {
        let mut state = self.state.lock();
        let depth = state.mailbox_depth;
        let subscription = state.subscribers.subscribe(depth);
        debug!(channel_id = %self.id, subscriber_id = subscription.id(), "subscribed");
        subscription
    }

    /// Register a live subscriber with an explicit mailbox depth
    #[cfg(test)]
    pub(crate) fn subscribe_with_depth(&self, depth: usize) -> Subscription {
        let subscription = self.state.lock().subscribers.subscribe(depth);
        debug!(channel_id = %self.id, subscriber_id = subscription.id(), depth, "subscribed");
        subscription
    }

    /// Remove and close a subscriber's mailbox
    ///
    /// Returns false if the subscriber was already gone.
    pub fn unsubscribe(&self, subscriber_id: u64) -> bool {
        let removed = self.state.lock().subscribers.unsubscribe(subscriber_id);
        if removed {
            debug!(channel_id = %self.id, subscriber_id, "unsubscribed");
        }
        removed
    }

    /// Force-disconnect every subscriber
    pub fn close_subscribers(&self) -> usize {
        let closed = self.state.lock().subscribers.close_all();
        if closed > 0 {
            debug!(channel_id = %self.id, closed, "closed subscribers");
        }
        closed
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.lock().subscribers.len()
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Channel")
            .field("id", &self.id)
            .field("name", &state.name)
            .field("filter", &state.filter.as_str())
            .field("sink_label", &state.sink_label)
            .field("subscribers", &state.subscribers.len())
            .finish()
    }
}

/// 16 random bytes, hex encoded
fn generate_id() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    hex::encode(bytes)
}

#[cfg(test)]
#[path = "channel_test.rs"]
mod tests;
