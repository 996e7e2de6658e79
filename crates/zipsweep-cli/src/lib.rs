/// zipsweep front end: command-line adapter over `zipsweep-core`.
///
/// Translates arguments and stored settings into filter criteria and archive
/// requests, drives the scan lifecycle through [`state::AppState`], and
/// renders progress and results.
pub mod app;
pub mod args;
pub mod report;
pub mod settings;
pub mod size;
pub mod state;

pub use app::{exit_code, run};
pub use args::Cli;
pub use state::{AppPhase, AppState};
