//! HTTP delivery of cloud records.
//!
//! [`HttpTransmitter`] implements
//! [`Transmitter`](crate::cloud_handler::Transmitter) by posting each
//! record's JSON form to a per-kind endpoint. A response outside 2xx, or a
//! transport failure, is reported to the forwarder, which drops the record
//! without retrying.

mod config;
mod transmitter;

#[cfg(test)]
mod tests;

pub use config::{
    AuthConfig, DEFAULT_CONNECT_TIMEOUT, DEFAULT_WRITE_TIMEOUT, HttpTransmitterConfig,
};
pub use transmitter::HttpTransmitter;
