//! Severity levels shared by the front-end logger and every handler.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Log severity, ordered from least to most severe.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum FemtoLevel {
    Trace,
    Debug,
    #[default]
    Information,
    Warning,
    Error,
}

/// Returned when a string does not name a known level.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown log level: {0:?}")]
pub struct ParseLevelError(pub String);

impl FemtoLevel {
    /// Upper-case label used by text sinks.
    pub fn as_str(self) -> &'static str {
        match self {
            FemtoLevel::Trace => "TRACE",
            FemtoLevel::Debug => "DEBUG",
            FemtoLevel::Information => "INFORMATION",
            FemtoLevel::Warning => "WARNING",
            FemtoLevel::Error => "ERROR",
        }
    }

    /// Parse `s`, falling back to `Information` and warning on bad input.
    pub fn parse_or_warn(s: &str) -> Self {
        s.parse().unwrap_or_else(|err| {
            log::warn!("{err}; defaulting to INFORMATION");
            Self::Information
        })
    }
}

impl fmt::Display for FemtoLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FemtoLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TRACE" | "VERBOSE" => Ok(Self::Trace),
            "DEBUG" => Ok(Self::Debug),
            "INFO" | "INFORMATION" => Ok(Self::Information),
            "WARN" | "WARNING" => Ok(Self::Warning),
            "ERROR" => Ok(Self::Error),
            _ => Err(ParseLevelError(s.to_owned())),
        }
    }
}

impl From<FemtoLevel> for u8 {
    fn from(level: FemtoLevel) -> Self {
        level as u8
    }
}

impl TryFrom<u8> for FemtoLevel {
    type Error = ParseLevelError;

    fn try_from(value: u8) -> Result<Self, ParseLevelError> {
        match value {
            0 => Ok(Self::Trace),
            1 => Ok(Self::Debug),
            2 => Ok(Self::Information),
            3 => Ok(Self::Warning),
            4 => Ok(Self::Error),
            other => Err(ParseLevelError(other.to_string())),
        }
    }
}

impl From<log::Level> for FemtoLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Trace => Self::Trace,
            log::Level::Debug => Self::Debug,
            log::Level::Info => Self::Information,
            log::Level::Warn => Self::Warning,
            log::Level::Error => Self::Error,
        }
    }
}

impl From<FemtoLevel> for log::Level {
    fn from(level: FemtoLevel) -> Self {
        match level {
            FemtoLevel::Trace => log::Level::Trace,
            FemtoLevel::Debug => log::Level::Debug,
            FemtoLevel::Information => log::Level::Info,
            FemtoLevel::Warning => log::Level::Warn,
            FemtoLevel::Error => log::Level::Error,
        }
    }
}
