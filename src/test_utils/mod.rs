//! Test doubles shared by unit tests and, through the `test-util` feature,
//! by the integration tests under `tests/`.

mod collecting_handler;
mod recording_transmitter;

pub use collecting_handler::CollectingHandler;
pub use recording_transmitter::{RecordingTransmitter, Transmitted};
