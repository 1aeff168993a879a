//! Builder and implementation for a level-based filter.

use crate::{filters::FemtoFilter, level::FemtoLevel, log_record::FemtoLogRecord};

/// Passes records whose level is at or below `max_level`.
///
/// Loggers already enforce a minimum level, so this filter is used to cap
/// the severities a particular sink sees.
#[derive(Debug)]
pub struct LevelFilter {
    max_level: FemtoLevel,
}

impl FemtoFilter for LevelFilter {
    fn should_log(&self, record: &FemtoLogRecord) -> bool {
        record.level() <= self.max_level
    }
}

/// Builder for [`LevelFilter`].
#[derive(Clone, Debug, Default)]
pub struct LevelFilterBuilder {
    max_level: Option<FemtoLevel>,
}

impl LevelFilterBuilder {
    /// Create a new `LevelFilterBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum level allowed.
    pub fn with_max_level(mut self, level: FemtoLevel) -> Self {
        self.max_level = Some(level);
        self
    }
}

impl super::FilterBuilderTrait for LevelFilterBuilder {
    type Filter = LevelFilter;

    fn build_inner(&self) -> Result<Self::Filter, super::FilterBuildError> {
        let lvl = self.max_level.ok_or_else(|| {
            super::FilterBuildError::InvalidConfig("max_level is required".into())
        })?;
        Ok(LevelFilter { max_level: lvl })
    }
}
