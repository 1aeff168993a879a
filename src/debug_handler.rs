//! Handler forwarding records to the `log` facade.
//!
//! Useful during development: whatever logger the host application installed
//! for the `log` crate receives `(group)LEVEL: message` lines under the
//! [`DEBUG_TARGET`] target.

use crate::{
    handler::{FemtoHandlerTrait, HandlerError},
    log_record::FemtoLogRecord,
};

/// Target used for every line emitted by [`FemtoDebugHandler`].
pub const DEBUG_TARGET: &str = "femtorelay::debug";

#[derive(Clone, Copy, Debug, Default)]
pub struct FemtoDebugHandler;

impl FemtoDebugHandler {
    pub fn new() -> Self {
        Self
    }

    fn render(record: &FemtoLogRecord) -> String {
        format!(
            "({}){}: {}",
            record.group().unwrap_or_default(),
            record.level(),
            record.message()
        )
    }
}

impl FemtoHandlerTrait for FemtoDebugHandler {
    fn handle(&self, record: FemtoLogRecord) -> Result<(), HandlerError> {
        let level: log::Level = record.level().into();
        log::log!(target: DEBUG_TARGET, level, "{}", Self::render(&record));
        Ok(())
    }
}
