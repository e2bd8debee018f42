//! Channel configuration
//!
//! History and mailbox sizing shared by every channel, the filter for the
//! `stdout` mirror, and extra channels to create at startup.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ConfigError;

/// Upper bound on per-channel history
pub const MAX_HISTORY_CAPACITY: usize = 100_000;

/// Separator between channel name and pattern
const DEFINITION_DELIMITER: char = ':';

/// Channel configuration
///
/// # Example
///
/// ```toml
/// [channels]
/// history_capacity = 1000   # default
/// mailbox_depth = 10        # default
/// stdout_filter = ""        # default, mirrors everything
/// definitions = ["errors:^ERR", "timeout"]
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChannelsConfig {
    /// Records kept per channel
    /// Default: 1000
    pub history_capacity: usize,

    /// Records buffered per live subscriber before dropping
    /// Default: 10
    pub mailbox_depth: usize,

    /// Regex for lines mirrored to stdout (empty = all)
    pub stdout_filter: String,

    /// Extra channels as `name:pattern`
    pub definitions: Vec<ChannelDefinition>,
}

impl Default for ChannelsConfig {
    fn default() -> Self {
        Self {
            history_capacity: 1000,
            mailbox_depth: 10,
            stdout_filter: String::new(),
            definitions: Vec::new(),
        }
    }
}

/// A startup channel: display name plus filter pattern
///
/// Parsed from `name:pattern`. Without a `:` the whole string is both the
/// name and the pattern. Only the first `:` splits, so patterns may contain
/// colons.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct ChannelDefinition {
    pub name: String,
    pub pattern: String,
}

impl ChannelDefinition {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
        }
    }
}

impl FromStr for ChannelDefinition {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, pattern) = s.split_once(DEFINITION_DELIMITER).unwrap_or((s, s));

        if name.is_empty() {
            return Err(ConfigError::invalid_channel(s, "name is empty"));
        }

        Ok(Self::new(name, pattern))
    }
}

impl TryFrom<String> for ChannelDefinition {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for ChannelDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.name, DEFINITION_DELIMITER, self.pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ChannelsConfig::default();
        assert_eq!(config.history_capacity, 1000);
        assert_eq!(config.mailbox_depth, 10);
        assert!(config.stdout_filter.is_empty());
    }

    #[test]
    fn test_parse_name_and_pattern() {
        let def: ChannelDefinition = "errors:^ERR".parse().unwrap();
        assert_eq!(def, ChannelDefinition::new("errors", "^ERR"));
    }

    #[test]
    fn test_parse_name_only() {
        let def: ChannelDefinition = "timeout".parse().unwrap();
        assert_eq!(def, ChannelDefinition::new("timeout", "timeout"));
    }

    #[test]
    fn test_parse_pattern_with_colons() {
        let def: ChannelDefinition = "times:\\d+:\\d+".parse().unwrap();
        assert_eq!(def.name, "times");
        assert_eq!(def.pattern, "\\d+:\\d+");
    }

    #[test]
    fn test_parse_empty_pattern() {
        let def: ChannelDefinition = "all:".parse().unwrap();
        assert_eq!(def, ChannelDefinition::new("all", ""));
    }

    #[test]
    fn test_parse_empty_name() {
        let result: Result<ChannelDefinition, _> = ":^x".parse();
        assert!(matches!(result, Err(ConfigError::InvalidChannel { .. })));
    }

    #[test]
    fn test_deserialize_definitions() {
        let config: ChannelsConfig = toml::from_str(r#"definitions = ["a:1", "b"]"#).unwrap();
        assert_eq!(
            config.definitions,
            vec![ChannelDefinition::new("a", "1"), ChannelDefinition::new("b", "b")]
        );
    }

    #[test]
    fn test_deserialize_bad_definition() {
        let result: Result<ChannelsConfig, _> = toml::from_str(r#"definitions = [":x"]"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_display_round_trips() {
        let def = ChannelDefinition::new("errors", "^ERR");
        assert_eq!(def.to_string(), "errors:^ERR");
    }
}
