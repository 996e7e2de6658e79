/// Command-line arguments.
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use zipsweep_core::model::AgeSelector;

#[derive(Parser, Debug)]
#[command(name = "zipsweep", version, about = "Find stale files and bundle them into a zip archive")]
pub struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file holding the last-used root, extensions, and age.
    #[arg(long, global = true, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List files matching the criteria.
    Scan(ScanArgs),
    /// Scan, then archive the matching files.
    Archive(ArchiveArgs),
}

/// Criteria shared by every command. Omitted values come from the settings file.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Directory to scan.
    pub root: Option<PathBuf>,

    /// Comma-separated extensions, e.g. `log,txt,csv`.
    #[arg(short, long, value_name = "LIST")]
    pub ext: Option<String>,

    /// Minimum age: today, one-year, two-years, three-years, four-years, five-years.
    #[arg(short, long, value_name = "AGE")]
    pub age: Option<AgeSelector>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ScanArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Also write the candidate list to this CSV file.
    #[arg(long, value_name = "FILE")]
    pub csv: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ArchiveArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Archive path (`.zip` is appended if missing). Defaults to a
    /// timestamped file in the scanned root.
    #[arg(short, long, value_name = "FILE")]
    pub dest: Option<PathBuf>,

    /// Delete the originals after the archive is written.
    #[arg(long)]
    pub delete: bool,

    /// Archive only this relative path (repeatable).
    #[arg(long, value_name = "PATH")]
    pub only: Vec<String>,

    /// Leave this relative path out (repeatable).
    #[arg(long, value_name = "PATH")]
    pub exclude: Vec<String>,
}
