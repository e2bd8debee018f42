//! Line records
//!
//! A `Line` is one unit flowing through a channel. It is either ingested
//! content (`text` set) or an event marker (`event` set) describing a
//! structural change such as a filter swap. Records are cloned to every
//! consumer, so nothing downstream can observe another consumer's mutation.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A single ingested line or event marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Line {
    /// Line content (empty for pure events)
    pub text: String,
    /// Structural change description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    /// Wall clock time the record was created
    pub timestamp: DateTime<Utc>,
}

impl Line {
    /// Create a content record stamped with the current time
    pub fn content(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            event: None,
            timestamp: Utc::now(),
        }
    }

    /// Create an event marker stamped with the current time
    pub fn event(description: impl Into<String>) -> Self {
        Self {
            text: String::new(),
            event: Some(description.into()),
            timestamp: Utc::now(),
        }
    }

    /// Whether this record marks an event (sinks skip these)
    #[inline]
    pub fn is_event(&self) -> bool {
        self.event.as_deref().is_some_and(|e| !e.is_empty())
    }
}
