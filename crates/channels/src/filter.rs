//! Regex filter for channel ingestion
//!
//! `LineFilter` decides whether a line enters a channel. It keeps the
//! compiled regex together with its source pattern, which is the canonical
//! form used for display and for change detection.
//!
//! # Filter Logic
//!
//! - No regex (the `none` state) accepts every line
//! - Otherwise a line is accepted when the regex matches anywhere in it
//! - Two filters are the same when their source patterns are equal
//!
//! # Example
//!
//! ```
//! use sift_channels::LineFilter;
//!
//! let filter = LineFilter::compile("^ERR").unwrap();
//! assert!(filter.matches("ERR disk full"));
//! assert!(!filter.matches("info: ok"));
//! assert!(LineFilter::none().matches("anything"));
//! ```

use std::borrow::Cow;

use regex::Regex;

use crate::error::{ChannelError, Result};

/// Compiled line predicate
#[derive(Debug, Clone, Default)]
pub struct LineFilter {
    /// Compiled pattern (None = match all)
    regex: Option<Regex>,
}

impl LineFilter {
    /// Filter that accepts every line
    pub fn none() -> Self {
        Self::default()
    }

    /// Compile a pattern into a filter
    ///
    /// # Errors
    ///
    /// Returns `InvalidPattern` if the pattern is not a valid regex.
    pub fn compile(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|source| ChannelError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;

        Ok(Self { regex: Some(regex) })
    }

    /// Compile a user-supplied pattern, treating empty as accept-all
    ///
    /// # Errors
    ///
    /// Returns `InvalidPattern` if a non-empty pattern is not a valid regex.
    pub fn parse(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Ok(Self::none());
        }
        Self::compile(pattern)
    }

    /// Check if filter is the accept-all state
    #[inline]
    pub fn is_none(&self) -> bool {
        self.regex.is_none()
    }

    /// Check if a line passes this filter
    #[inline]
    pub fn matches(&self, text: &str) -> bool {
        match self.regex {
            None => true,
            Some(ref regex) => regex.is_match(text),
        }
    }

    /// Canonical source pattern (empty for `none`)
    pub fn as_str(&self) -> &str {
        self.regex.as_ref().map_or("", Regex::as_str)
    }

    /// Compare by canonical pattern
    pub fn same_as(&self, other: &LineFilter) -> bool {
        self.as_str() == other.as_str()
    }

    /// Rewrite every match in `text` using a replacement template
    ///
    /// Templates use `$1` / `${name}` group references. An empty template
    /// or the `none` filter leaves the text untouched.
    pub fn rewrite<'t>(&self, text: &'t str, template: &str) -> Cow<'t, str> {
        match self.regex {
            Some(ref regex) if !template.is_empty() => regex.replace_all(text, template),
            _ => Cow::Borrowed(text),
        }
    }
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;
