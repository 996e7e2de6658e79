//! Command execution: resolve criteria, drive a scan with a progress bar,
//! then list or archive the results.

use crate::args::{ArchiveArgs, Cli, Command, FilterArgs, ScanArgs};
use crate::report;
use crate::settings::{default_settings_path, JsonSettingsStore};
use crate::state::{AppPhase, AppState};
use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};
use zipsweep_core::config::ConfigStore;
use zipsweep_core::model::FilterCriteria;
use zipsweep_core::{ArchiveError, ErrorCategory, ScanError};

/// How long one progress-bar refresh waits for scanner messages.
const PUMP_INTERVAL: Duration = Duration::from_millis(100);

const SETTINGS_FILE_NAME: &str = "zipsweep-settings.json";

/// Run a parsed command line to completion.
pub fn run(cli: Cli) -> Result<()> {
    let settings_path = cli
        .settings
        .clone()
        .or_else(default_settings_path)
        .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE_NAME));
    debug!("Settings file: {}", settings_path.display());
    let mut state = AppState::new(Box::new(JsonSettingsStore::new(settings_path)));

    match cli.command {
        Command::Scan(args) => run_scan(&mut state, args),
        Command::Archive(args) => run_archive(&mut state, args),
    }
}

/// Map a failed run to a process exit code.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    let category = if let Some(err) = err.downcast_ref::<ScanError>() {
        Some(err.category())
    } else {
        err.downcast_ref::<ArchiveError>().map(ArchiveError::category)
    };
    match category {
        Some(ErrorCategory::Validation) => 2,
        Some(ErrorCategory::Cancelled) => 130,
        Some(ErrorCategory::Io) | Some(ErrorCategory::Busy) | None => 1,
    }
}

fn run_scan(state: &mut AppState, args: ScanArgs) -> Result<()> {
    let (root, criteria) = resolve(state.store(), &args.filter)?;
    scan_to_results(state, &root, criteria)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    report::write_table(&mut out, state.candidates(), |i| state.is_selected(i))?;
    out.flush()?;

    if let Some(csv_path) = args.csv {
        let file = File::create(&csv_path)
            .with_context(|| format!("cannot create {}", csv_path.display()))?;
        let scan_root = state.scan_root.clone().unwrap_or(root);
        report::write_csv(BufWriter::new(file), &scan_root, state.candidates())
            .with_context(|| format!("cannot write {}", csv_path.display()))?;
        info!("Wrote {} rows to {}", state.candidates().len(), csv_path.display());
    }
    Ok(())
}

fn run_archive(state: &mut AppState, args: ArchiveArgs) -> Result<()> {
    let (root, criteria) = resolve(state.store(), &args.filter)?;
    scan_to_results(state, &root, criteria)?;

    for unmatched in state.select_paths(&args.only, &args.exclude) {
        warn!("No candidate matches --only {unmatched}");
    }

    let result = state.archive_selection(args.dest, args.delete)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    report::write_archive_summary(&mut out, &result)?;
    if state.needs_rescan {
        writeln!(out, "Originals changed on disk; run scan again for a fresh list.")?;
    }
    out.flush()?;
    Ok(())
}

/// Root and criteria from the command line, falling back to the stored
/// values and finally the working directory.
fn resolve(store: &dyn ConfigStore, args: &FilterArgs) -> Result<(PathBuf, FilterCriteria)> {
    let stored = match store.load_criteria() {
        Ok(criteria) => criteria,
        Err(err) => {
            warn!("Could not load settings: {err}");
            FilterCriteria::default()
        }
    };

    let extensions = match &args.ext {
        Some(list) => FilterCriteria::parse_extension_list(list),
        None => stored.extensions().iter().cloned().collect(),
    };
    let age = args.age.unwrap_or(stored.age());
    let criteria = FilterCriteria::new(extensions, age);

    let root = match &args.root {
        Some(root) => root.clone(),
        None => match store.load_root_dir() {
            Ok(Some(root)) => root,
            Ok(None) => std::env::current_dir().context("cannot determine working directory")?,
            Err(err) => {
                warn!("Could not load settings: {err}");
                std::env::current_dir().context("cannot determine working directory")?
            }
        },
    };

    if criteria.extensions().is_empty() {
        warn!("No extensions selected; nothing will match");
    }
    Ok((root, criteria))
}

/// Start a scan and pump it to its terminal message.
fn scan_to_results(state: &mut AppState, root: &Path, criteria: FilterCriteria) -> Result<()> {
    state.start_scan(root, criteria)?;

    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );

    while state.is_scanning() {
        if state.pump_scan_messages(PUMP_INTERVAL) {
            bar.set_length(state.scan_total);
            bar.set_position(state.scan_examined);
            if let Some(path) = &state.scan_current_path {
                bar.set_message(path.display().to_string());
            }
        } else {
            bar.tick();
        }
    }
    bar.finish_and_clear();

    if let Some(err) = state.take_scan_failure() {
        return Err(err.into());
    }
    if state.phase != AppPhase::Results {
        bail!("scan ended without a result");
    }
    if let Some(duration) = state.scan_duration {
        info!(
            "Examined {} files in {:.2?}; {} match",
            state.scan_examined,
            duration,
            state.candidates().len()
        );
    }
    Ok(())
}
