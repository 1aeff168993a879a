//! Builder and implementation for a message-group filter.

use std::collections::BTreeSet;

use crate::{filters::FemtoFilter, log_record::FemtoLogRecord};

/// Passes records whose message group is in an allow-list.
#[derive(Debug)]
pub struct GroupFilter {
    groups: BTreeSet<String>,
    allow_ungrouped: bool,
}

impl FemtoFilter for GroupFilter {
    fn should_log(&self, record: &FemtoLogRecord) -> bool {
        match record.group() {
            Some(group) => self.groups.contains(group),
            None => self.allow_ungrouped,
        }
    }
}

/// Builder for [`GroupFilter`].
///
/// Ungrouped records pass by default so that enabling a filter for one
/// subsystem does not silence plain `info`/`warn` calls.
#[derive(Clone, Debug)]
pub struct GroupFilterBuilder {
    groups: BTreeSet<String>,
    allow_ungrouped: bool,
}

impl Default for GroupFilterBuilder {
    fn default() -> Self {
        Self {
            groups: BTreeSet::new(),
            allow_ungrouped: true,
        }
    }
}

impl GroupFilterBuilder {
    /// Create a new `GroupFilterBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `group` to the allow-list.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.insert(group.into());
        self
    }

    /// Control whether records without a group pass the filter.
    pub fn with_allow_ungrouped(mut self, allow: bool) -> Self {
        self.allow_ungrouped = allow;
        self
    }
}

impl super::FilterBuilderTrait for GroupFilterBuilder {
    type Filter = GroupFilter;

    fn build_inner(&self) -> Result<Self::Filter, super::FilterBuildError> {
        if self.groups.iter().any(|g| g.trim().is_empty()) {
            return Err(super::FilterBuildError::InvalidConfig(
                "group names must not be empty".into(),
            ));
        }
        Ok(GroupFilter {
            groups: self.groups.clone(),
            allow_ungrouped: self.allow_ungrouped,
        })
    }
}
