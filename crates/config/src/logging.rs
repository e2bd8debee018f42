//! `[log]` section
//!
//! sift shares its process stdout with the mirrored `stdout` channel, so
//! diagnostics go to stderr unless `output` names stdout or a file.

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// `EnvFilter` directive for this level
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Console,
    /// One JSON object per event, fields flattened
    Json,
}

/// Where diagnostics are written
///
/// Parsed from a single string: `"stderr"`, `"stdout"`, or anything else
/// as a file path opened for append.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(from = "String")]
pub enum LogOutput {
    #[default]
    Stderr,
    Stdout,
    File(PathBuf),
}

impl LogOutput {
    /// Log lines interleave with mirrored channel output
    pub fn shares_stdout(&self) -> bool {
        matches!(self, Self::Stdout)
    }

    /// Colour codes are only emitted to the standard streams
    pub fn wants_ansi(&self) -> bool {
        !matches!(self, Self::File(_))
    }
}

impl From<String> for LogOutput {
    fn from(value: String) -> Self {
        match value.as_str() {
            "stderr" => Self::Stderr,
            "stdout" => Self::Stdout,
            _ => Self::File(PathBuf::from(value)),
        }
    }
}

impl fmt::Display for LogOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stderr => f.write_str("stderr"),
            Self::Stdout => f.write_str("stdout"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// ```toml
/// [log]
/// level = "debug"
/// format = "json"
/// output = "/var/log/sift.log"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    pub output: LogOutput,
}
