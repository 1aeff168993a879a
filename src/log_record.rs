//! Record passed from the front-end logger to its handlers.
//!
//! A [`FemtoLogRecord`] carries the severity, the message text, the optional
//! message group and the moment the record was created. Handlers receive an
//! owned clone so they can hand it to their own worker threads.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::level::FemtoLevel;

#[derive(Clone, Debug, PartialEq)]
pub struct FemtoLogRecord {
    level: FemtoLevel,
    message: String,
    group: Option<String>,
    timestamp: DateTime<Utc>,
}

impl FemtoLogRecord {
    /// Construct a record stamped with the current time.
    pub fn new(level: FemtoLevel, message: &str) -> Self {
        Self {
            level,
            message: message.to_owned(),
            group: None,
            timestamp: Utc::now(),
        }
    }

    /// Construct a record belonging to the message group `group`.
    pub fn with_group(level: FemtoLevel, message: &str, group: Option<&str>) -> Self {
        Self {
            group: group.map(str::to_owned),
            ..Self::new(level, message)
        }
    }

    pub fn level(&self) -> FemtoLevel {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Return a copy of this record with `prefix` prepended to the message.
    pub(crate) fn prefixed(&self, prefix: &str) -> Self {
        Self {
            message: format!("{prefix}{}", self.message),
            ..self.clone()
        }
    }
}

impl fmt::Display for FemtoLogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.group {
            Some(group) => write!(f, "({group}) {} - {}", self.level, self.message),
            None => write!(f, "{} - {}", self.level, self.message),
        }
    }
}
