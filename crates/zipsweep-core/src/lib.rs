/// zipsweep core: discovery and archiving of stale files.
///
/// This crate contains all business logic with zero UI dependencies.
/// Front ends (CLI today, anything else later) translate user input into a
/// [`model::FilterCriteria`] or an [`archive::ArchiveRequest`] and render the
/// progress messages and results that come back.
///
/// # Modules
///
/// - [`model`]: Candidate and criteria value types.
/// - [`filter`]: Pure extension and age predicates.
/// - [`scanner`]: Two-pass background scanning with progress and cancellation.
/// - [`archive`]: Zip assembly and post-archive deletion.
/// - [`config`]: The settings collaborator interface.
/// - [`error`]: Error taxonomy shared by every operation.
pub mod archive;
pub mod config;
pub mod error;
pub mod filter;
pub mod model;
pub mod scanner;

pub use error::{ArchiveError, ConfigError, ErrorCategory, ScanError, ValidationError};
