//! Helpers shared by the integration tests.

#![allow(dead_code)]

pub mod fixtures;
pub mod mock_collector;
pub mod shared_buffer;

pub use mock_collector::MockCollector;
pub use shared_buffer::SharedBuf;
