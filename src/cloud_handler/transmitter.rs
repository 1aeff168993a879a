//! Delivery of single records to the remote endpoint.

use std::sync::Arc;

use thiserror::Error;

use super::record::{CloudEvent, CloudLog};

/// Why a delivery attempt failed.
///
/// The forwarder treats every variant the same way: the attempt is
/// reported and the record is not retried.
#[derive(Debug, Error)]
pub enum TransmitError {
    /// The endpoint answered with a non-2xx status.
    #[error("endpoint returned HTTP {0}")]
    Status(u16),
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),
    /// The record could not be encoded for the wire.
    #[error("failed to encode record: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Sends records to the remote endpoint, one operation per record kind.
///
/// Implementations enforce their own timeouts; callers block until the
/// attempt completes or fails.
pub trait Transmitter: Send + Sync {
    fn send_log(&self, log: &CloudLog) -> Result<(), TransmitError>;

    fn send_event(&self, event: &CloudEvent) -> Result<(), TransmitError>;
}

impl<T: Transmitter + ?Sized> Transmitter for Arc<T> {
    fn send_log(&self, log: &CloudLog) -> Result<(), TransmitError> {
        (**self).send_log(log)
    }

    fn send_event(&self, event: &CloudEvent) -> Result<(), TransmitError> {
        (**self).send_event(event)
    }
}
