/// Age predicate: select files last modified before `now - N months`.
use crate::model::AgeSelector;
use chrono::{DateTime, Local, Months};
use std::time::SystemTime;

/// A fixed point in time; files modified strictly before it are old enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeCutoff {
    selector: AgeSelector,
    cutoff: SystemTime,
}

impl AgeCutoff {
    /// Compute the cutoff for `selector` relative to `now`.
    ///
    /// Subtraction is in calendar months; a day that does not exist in the
    /// target month clamps to that month's last day.
    pub fn new(selector: AgeSelector, now: DateTime<Local>) -> Self {
        let cutoff = now
            .checked_sub_months(Months::new(selector.months()))
            .unwrap_or(now);
        Self {
            selector,
            cutoff: SystemTime::from(cutoff),
        }
    }

    pub fn selector(&self) -> AgeSelector {
        self.selector
    }

    pub fn instant(&self) -> SystemTime {
        self.cutoff
    }

    /// Strict comparison: a file modified exactly at the cutoff is not old enough.
    pub fn matches(&self, last_modified: SystemTime) -> bool {
        last_modified < self.cutoff
    }
}
