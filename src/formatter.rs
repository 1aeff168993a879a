use crate::log_record::FemtoLogRecord;

/// Trait for formatting log records into strings.
///
/// Implementors must be thread-safe (`Send + Sync`) so formatters can be
/// shared across threads in a logging system.
pub trait FemtoFormatter: Send + Sync {
    /// Format a log record into a string representation.
    fn format(&self, record: &FemtoLogRecord) -> String;
}

/// Formats as `(group) LEVEL: message`, omitting the group when absent.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultFormatter;

impl FemtoFormatter for DefaultFormatter {
    fn format(&self, record: &FemtoLogRecord) -> String {
        match record.group() {
            Some(group) => format!("({group}) {}: {}", record.level(), record.message()),
            None => format!("{}: {}", record.level(), record.message()),
        }
    }
}

/// Console layout with independently switchable level and group prefixes.
///
/// With both prefixes disabled (the default) only the message is printed.
#[derive(Copy, Clone, Debug, Default)]
pub struct ConsoleFormatter {
    pub show_level: bool,
    pub show_group: bool,
}

impl ConsoleFormatter {
    pub fn with_level(mut self, show: bool) -> Self {
        self.show_level = show;
        self
    }

    pub fn with_group(mut self, show: bool) -> Self {
        self.show_group = show;
        self
    }
}

impl FemtoFormatter for ConsoleFormatter {
    fn format(&self, record: &FemtoLogRecord) -> String {
        let group = record.group().unwrap_or_default();
        match (self.show_group, self.show_level) {
            (true, true) => format!("({group}) {}: {}", record.level(), record.message()),
            (false, true) => format!("{}: {}", record.level(), record.message()),
            (true, false) => format!("({group}) {}", record.message()),
            (false, false) => record.message().to_owned(),
        }
    }
}
