//! Sift Channels - fan-out and live subscription core
//!
//! This crate owns everything between the raw line source and the HTTP
//! adapter. A single ingestion driver pushes each line into the [`Registry`],
//! which hands it to every [`Channel`] in registration order:
//!
//! - Each channel tests the line against its own [`LineFilter`]
//! - Accepted lines land in a bounded [`HistoryRing`] (oldest overwritten)
//! - Content lines are mirrored to the channel's sink, if it has one
//! - Every live subscriber gets a copy via a non-blocking mailbox send
//!
//! # Architecture
//!
//! ```text
//! stdin ──→ drive() ──→ Registry.ingest_all(line)
//!                           │
//!            ┌──────────────┼──────────────┐
//!            ▼              ▼              ▼
//!        Channel        Channel        Channel      (one lock each)
//!        filter?        filter?        filter?
//!            │              │              │
//!       HistoryRing    HistoryRing    HistoryRing
//!            │              │
//!          sink        Subscribers (bounded mailboxes, drop-on-full)
//!                           │
//!                           ▼
//!                    live transport tasks
//! ```
//!
//! A slow subscriber never stalls ingestion: a full mailbox is skipped in
//! O(1) and the record is dropped for that subscriber only.

pub mod buffer;
pub mod channel;
mod error;
pub mod filter;
pub mod ingest;
pub mod line;
pub mod registry;
pub mod subscriber;

pub use buffer::HistoryRing;
pub use channel::{Channel, ChannelInfo, ChannelOptions, Sink};
pub use error::{ChannelError, IngestError, Result};
pub use filter::LineFilter;
pub use ingest::{IngestStats, MAX_LINE_BYTES, drive};
pub use line::Line;
pub use registry::{Registry, STDIN_ID, STDOUT_ID};
pub use subscriber::{Delivery, Subscription};
