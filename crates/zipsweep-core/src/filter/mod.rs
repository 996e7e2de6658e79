/// Filter predicates: pure functions deciding whether a file is a candidate.
///
/// The scanner builds one [`FileFilter`] per invocation so that the age
/// cutoff is computed once, at scan start, rather than drifting per file.
pub mod age;
pub mod extension;

pub use age::AgeCutoff;
pub use extension::matches_extension;

use crate::model::FilterCriteria;
use chrono::{DateTime, Local};
use std::time::SystemTime;

/// Combined extension-and-age predicate for one scan.
#[derive(Debug, Clone)]
pub struct FileFilter<'a> {
    criteria: &'a FilterCriteria,
    cutoff: AgeCutoff,
}

impl<'a> FileFilter<'a> {
    /// Build a filter whose age cutoff is relative to `now`.
    pub fn new(criteria: &'a FilterCriteria, now: DateTime<Local>) -> Self {
        Self {
            criteria,
            cutoff: AgeCutoff::new(criteria.age(), now),
        }
    }

    /// `true` when the name carries a selected extension and the file is older
    /// than the cutoff.
    pub fn matches(&self, file_name: &str, last_modified: SystemTime) -> bool {
        matches_extension(file_name, self.criteria.extensions())
            && self.cutoff.matches(last_modified)
    }

    pub fn cutoff(&self) -> &AgeCutoff {
        &self.cutoff
    }
}
