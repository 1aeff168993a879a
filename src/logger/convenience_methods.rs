//! Level-specific shorthands for [`FemtoLogger::log`].
//!
//! Each level gets a plain method, a conditional `*_if` variant and a
//! grouped `*_in` variant. `error_from` translates an error value into an
//! Error-level message.

use std::error::Error;

use crate::level::FemtoLevel;

use super::FemtoLogger;

macro_rules! level_methods {
    ($level:expr, $plain:ident, $cond:ident, $grouped:ident, $name:literal) => {
        #[doc = concat!("Log `message` at ", $name, " level.")]
        pub fn $plain(&self, message: &str) -> bool {
            self.log($level, message, None)
        }

        #[doc = concat!("Log `message` at ", $name, " level when `condition` holds.")]
        pub fn $cond(&self, condition: bool, message: &str) -> bool {
            condition && self.log($level, message, None)
        }

        #[doc = concat!("Log `message` at ", $name, " level under message group `group`.")]
        pub fn $grouped(&self, group: &str, message: &str) -> bool {
            self.log($level, message, Some(group))
        }
    };
}

impl FemtoLogger {
    level_methods!(FemtoLevel::Trace, trace, trace_if, trace_in, "TRACE");
    level_methods!(FemtoLevel::Debug, debug, debug_if, debug_in, "DEBUG");
    level_methods!(FemtoLevel::Information, info, info_if, info_in, "INFORMATION");
    level_methods!(FemtoLevel::Warning, warn, warn_if, warn_in, "WARNING");
    level_methods!(FemtoLevel::Error, error, error_if, error_in, "ERROR");

    /// Log `err` and its chain of sources at ERROR level.
    pub fn error_from(&self, err: &dyn Error) -> bool {
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        self.log(FemtoLevel::Error, &message, None)
    }
}
