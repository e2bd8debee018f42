//! Application state
//!
//! Shared state for API handlers: the channel registry plus the policy for
//! which channels the API may not touch.

use std::collections::HashSet;
use std::sync::Arc;

use sift_channels::{ChannelOptions, Registry, STDIN_ID, STDOUT_ID};

// =============================================================================
// Protected IDs
// =============================================================================

/// Channels the API refuses to delete or modify
///
/// The registry itself allows removing anything; this table is where the
/// HTTP surface draws the line.
#[derive(Debug, Clone)]
pub struct ProtectedIds {
    /// IDs that cannot be deleted
    undeletable: HashSet<String>,
    /// IDs whose name, filter and template cannot be changed
    immutable: HashSet<String>,
}

impl ProtectedIds {
    /// No protection at all
    pub fn none() -> Self {
        Self {
            undeletable: HashSet::new(),
            immutable: HashSet::new(),
        }
    }

    /// Mark an ID as undeletable
    pub fn undeletable(mut self, id: impl Into<String>) -> Self {
        self.undeletable.insert(id.into());
        self
    }

    /// Mark an ID as immutable
    pub fn immutable(mut self, id: impl Into<String>) -> Self {
        self.immutable.insert(id.into());
        self
    }

    pub fn can_delete(&self, id: &str) -> bool {
        !self.undeletable.contains(id)
    }

    pub fn can_modify(&self, id: &str) -> bool {
        !self.immutable.contains(id)
    }
}

impl Default for ProtectedIds {
    /// `stdin` and `stdout` stay for the life of the process; `stdin` also
    /// keeps its accept-all filter.
    fn default() -> Self {
        Self::none()
            .undeletable(STDIN_ID)
            .undeletable(STDOUT_ID)
            .immutable(STDIN_ID)
    }
}

// =============================================================================
// AppState
// =============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Channel registry shared with the ingestion driver
    pub registry: Arc<Registry>,
    /// Delete/modify policy
    pub protected: Arc<ProtectedIds>,
    /// Sizing applied to channels created through the API
    pub options: ChannelOptions,
}

impl AppState {
    /// Create state with the default protection policy
    pub fn new(registry: Arc<Registry>, options: ChannelOptions) -> Self {
        Self {
            registry,
            protected: Arc::new(ProtectedIds::default()),
            options,
        }
    }

    /// Replace the protection policy
    pub fn with_protected(mut self, protected: ProtectedIds) -> Self {
        self.protected = Arc::new(protected);
        self
    }
}
