//! Records shipped to the cloud and their backlog line format.
//!
//! Each record serialises to a single line of JSON. `serde_json` escapes
//! control characters inside strings, so a serialised record never contains
//! a raw newline and one record always occupies exactly one backlog line.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::level::FemtoLevel;

use super::transmitter::{TransmitError, Transmitter};

/// The two record shapes, each with its own backlog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKind {
    Log,
    Event,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Event => "event",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scalar or text value attached to an event.
///
/// Serialised untagged, so `{"temperature": 21.5, "city": "Oslo"}` is the
/// wire shape. Integers are tried before floats, which keeps `3` an integer
/// and `3.0` a float across a round trip.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MeasurementValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl From<bool> for MeasurementValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for MeasurementValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for MeasurementValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for MeasurementValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for MeasurementValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<f32> for MeasurementValue {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<&str> for MeasurementValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for MeasurementValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Event measurements keyed by name. Keys are unique and iterate in order.
pub type Measurements = BTreeMap<String, MeasurementValue>;

/// A plain log entry, optionally carrying exception detail.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudLog {
    severity: FemtoLevel,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exception: Option<String>,
    timestamp: DateTime<Utc>,
}

impl CloudLog {
    /// A log entry stamped with the current UTC time.
    pub fn new(severity: FemtoLevel, message: impl Into<String>) -> Self {
        Self::with_timestamp(severity, message, None, Utc::now())
    }

    pub fn with_timestamp(
        severity: FemtoLevel,
        message: impl Into<String>,
        exception: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            severity,
            message: message.into(),
            exception,
            timestamp,
        }
    }

    /// Translate `err` into an Error-severity entry.
    ///
    /// The message is the error's display text; the exception detail is its
    /// debug representation followed by one `Caused by:` line per source.
    pub fn from_error(err: &dyn Error) -> Self {
        let mut detail = format!("{err:?}");
        let mut source = err.source();
        while let Some(cause) = source {
            detail.push_str("\nCaused by: ");
            detail.push_str(&cause.to_string());
            source = cause.source();
        }
        Self::with_timestamp(FemtoLevel::Error, err.to_string(), Some(detail), Utc::now())
    }

    pub fn severity(&self) -> FemtoLevel {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn exception(&self) -> Option<&str> {
        self.exception.as_deref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// A structured event with measurements.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudEvent {
    event_id: i32,
    description: String,
    #[serde(default)]
    measurements: Measurements,
    timestamp: DateTime<Utc>,
}

impl CloudEvent {
    /// An event stamped with the current UTC time.
    pub fn new(event_id: i32, description: impl Into<String>, measurements: Measurements) -> Self {
        Self::with_timestamp(event_id, description, measurements, Utc::now())
    }

    pub fn with_timestamp(
        event_id: i32,
        description: impl Into<String>,
        measurements: Measurements,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            event_id,
            description: description.into(),
            measurements,
            timestamp,
        }
    }

    pub fn event_id(&self) -> i32 {
        self.event_id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn measurements(&self) -> &Measurements {
        &self.measurements
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// A record the forwarder can persist, replay and transmit.
pub trait CloudRecord: Serialize + DeserializeOwned + fmt::Debug + Send + 'static {
    /// Backlog this record kind is persisted to.
    const KIND: RecordKind;

    /// Send this record through the transmitter operation for its kind.
    fn transmit(&self, transmitter: &dyn Transmitter) -> Result<(), TransmitError>;

    /// Serialise to one backlog line (no trailing newline).
    fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse one backlog line.
    fn from_line(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }
}

impl CloudRecord for CloudLog {
    const KIND: RecordKind = RecordKind::Log;

    fn transmit(&self, transmitter: &dyn Transmitter) -> Result<(), TransmitError> {
        transmitter.send_log(self)
    }
}

impl CloudRecord for CloudEvent {
    const KIND: RecordKind = RecordKind::Event;

    fn transmit(&self, transmitter: &dyn Transmitter) -> Result<(), TransmitError> {
        transmitter.send_event(self)
    }
}
