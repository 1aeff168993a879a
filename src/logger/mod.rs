//! Front-end logger fanning each call out to every registered handler.
//!
//! [`FemtoLogger`] owns no I/O of its own. A call that passes the level
//! threshold and the configured filters is turned into a
//! [`FemtoLogRecord`] and handed to each handler in registration order.
//! Handlers that talk to slow devices (console, network, cloud) queue the
//! record for their own worker thread, so fan-out stays cheap.

mod convenience_methods;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::time::{Duration, Instant};

use log::warn;
// parking_lot avoids poisoning and matches crate-wide locking strategy
use parking_lot::RwLock;

use crate::filters::FemtoFilter;
use crate::handler::FemtoHandlerTrait;
use crate::level::FemtoLevel;
use crate::log_record::FemtoLogRecord;
use crate::rate_limited_warner::RateLimitedWarner;

/// Level applied to newly created loggers.
pub const DEFAULT_LOGGER_LEVEL: FemtoLevel = FemtoLevel::Error;

pub struct FemtoLogger {
    level: AtomicU8,
    show_elapsed: AtomicBool,
    started: Instant,
    handlers: RwLock<Vec<Arc<dyn FemtoHandlerTrait>>>,
    filters: RwLock<Vec<Arc<dyn FemtoFilter>>>,
    error_warner: RateLimitedWarner,
}

impl Default for FemtoLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl FemtoLogger {
    /// Create a logger with no handlers at [`DEFAULT_LOGGER_LEVEL`].
    pub fn new() -> Self {
        Self {
            level: AtomicU8::new(u8::from(DEFAULT_LOGGER_LEVEL)),
            show_elapsed: AtomicBool::new(false),
            started: Instant::now(),
            handlers: RwLock::new(Vec::new()),
            filters: RwLock::new(Vec::new()),
            error_warner: RateLimitedWarner::default(),
        }
    }

    /// Create a logger pre-populated with `handlers`.
    pub fn with_handlers(handlers: impl IntoIterator<Item = Arc<dyn FemtoHandlerTrait>>) -> Self {
        let logger = Self::new();
        logger.handlers.write().extend(handlers);
        logger
    }

    /// Update the logger's minimum level.
    pub fn set_level(&self, level: FemtoLevel) {
        self.level.store(u8::from(level), Ordering::Relaxed);
    }

    /// Return the logger's current minimum level.
    pub fn level(&self) -> FemtoLevel {
        // Only `set_level` writes the atomic, so the value is always valid.
        FemtoLevel::try_from(self.level.load(Ordering::Relaxed)).unwrap_or(DEFAULT_LOGGER_LEVEL)
    }

    /// Return whether a record at `level` passes the level threshold.
    pub fn is_enabled_for(&self, level: FemtoLevel) -> bool {
        u8::from(level) >= self.level.load(Ordering::Relaxed)
    }

    /// Prefix each message with the time elapsed since the logger was created.
    pub fn set_show_elapsed(&self, show: bool) {
        self.show_elapsed.store(show, Ordering::Relaxed);
    }

    /// Attach a handler to this logger.
    pub fn add_handler(&self, handler: Arc<dyn FemtoHandlerTrait>) {
        self.handlers.write().push(handler);
    }

    /// Detach a handler previously added to this logger.
    pub fn remove_handler(&self, handler: &Arc<dyn FemtoHandlerTrait>) -> bool {
        let mut handlers = self.handlers.write();
        if let Some(pos) = handlers.iter().position(|h| Arc::ptr_eq(h, handler)) {
            handlers.remove(pos);
            true
        } else {
            false
        }
    }

    /// Remove all handlers from this logger.
    pub fn clear_handlers(&self) {
        self.handlers.write().clear();
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Attach a filter to this logger.
    pub fn add_filter(&self, filter: Arc<dyn FemtoFilter>) {
        self.filters.write().push(filter);
    }

    pub fn clear_filters(&self) {
        self.filters.write().clear();
    }

    /// Log `message` at `level`, optionally tagged with a message group.
    ///
    /// Returns `true` when the record passed the level threshold and every
    /// filter and was handed to the handlers.
    pub fn log(&self, level: FemtoLevel, message: &str, group: Option<&str>) -> bool {
        if !self.is_enabled_for(level) {
            return false;
        }
        self.log_record(FemtoLogRecord::with_group(level, message, group))
    }

    /// Dispatch an already-constructed record through this logger.
    pub fn log_record(&self, record: FemtoLogRecord) -> bool {
        if !self.is_enabled_for(record.level()) || !self.passes_all_filters(&record) {
            return false;
        }
        let record = if self.show_elapsed.load(Ordering::Relaxed) {
            record.prefixed(&format!("[+{}] ", format_elapsed(self.started.elapsed())))
        } else {
            record
        };
        self.dispatch_to_handlers(record);
        true
    }

    /// Flush every attached handler, returning `true` if all succeeded.
    pub fn flush_handlers(&self) -> bool {
        self.handlers
            .read()
            .iter()
            .fold(true, |ok, handler| handler.flush() && ok)
    }

    /// Return `true` if every configured filter approves the record.
    fn passes_all_filters(&self, record: &FemtoLogRecord) -> bool {
        self.filters.read().iter().all(|f| f.should_log(record))
    }

    /// Hand `record` to every handler. A failing handler never stops
    /// delivery to the remaining ones.
    fn dispatch_to_handlers(&self, record: FemtoLogRecord) {
        let handlers = self.handlers.read().clone();
        for handler in &handlers {
            if let Err(err) = handler.handle(record.clone()) {
                self.error_warner.record_drop();
                self.error_warner.warn_if_due(|count| {
                    warn!("FemtoLogger: {count} handler errors; latest: {err}");
                });
            }
        }
    }
}

/// Render `elapsed` as `h:m:ss` with up to three trimmed fractional digits.
fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let millis = elapsed.subsec_millis();
    let base = format!("{}:{}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60);
    if millis == 0 {
        return base;
    }
    let fraction = format!("{millis:03}");
    format!("{base}.{}", fraction.trim_end_matches('0'))
}
