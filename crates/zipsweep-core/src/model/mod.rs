/// Data model shared by the scanner, the archive builder, and front ends.
pub mod candidate;
pub mod criteria;

pub use candidate::{total_size, FileCandidate};
pub use criteria::{AgeSelector, FilterCriteria, KNOWN_EXTENSIONS};
