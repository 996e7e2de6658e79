/// Application state management.
///
/// Centralises all mutable state a front end reads and writes: the scan
/// lifecycle, the candidate list and which candidates are selected, and the
/// archive step. The scan thread communicates via its channel; state updates
/// happen in `process_scan_messages()` / `pump_scan_messages()`.
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Local;
use crossbeam_channel::RecvTimeoutError;
use tracing::{info, warn};
use zipsweep_core::archive::{self, ArchiveRequest, ArchiveResult};
use zipsweep_core::config::ConfigStore;
use zipsweep_core::model::{total_size, FileCandidate, FilterCriteria};
use zipsweep_core::scanner::{ScanHandle, ScanMessage, Scanner};
use zipsweep_core::{ArchiveError, ErrorCategory, ScanError, ValidationError};

/// The current phase of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppPhase {
    /// No scan in progress and no results.
    Idle,
    /// Progress counters are live.
    Scanning,
    /// Candidates are available for selection.
    Results,
}

/// Maximum number of scan messages handled per `process_scan_messages` call.
///
/// The scanner sends one tick per file; a caller that polls between frames
/// should not stall on a large backlog.
const MAX_MESSAGES_PER_PASS: usize = 1_000;

/// Whether a newly found candidate starts out selected.
const DEFAULT_SELECTED: bool = true;

/// All application state.
pub struct AppState {
    store: Box<dyn ConfigStore>,
    scanner: Scanner,

    // ── Scan ───────────────────────────────────────────
    pub phase: AppPhase,
    scan_handle: Option<ScanHandle>,
    /// Normalised root of the current (or last) scan.
    pub scan_root: Option<PathBuf>,
    pub scan_examined: u64,
    pub scan_total: u64,
    pub scan_current_path: Option<PathBuf>,
    pub scan_duration: Option<Duration>,
    /// True if the most recent scan was cancelled.
    pub scan_was_cancelled: bool,
    /// Category and message of the most recent failure.
    pub last_error: Option<(ErrorCategory, String)>,
    scan_failure: Option<ScanError>,

    // ── Results ────────────────────────────────────────
    candidates: Vec<FileCandidate>,
    selected: Vec<bool>,
    /// Set once originals were deleted; the candidate list no longer
    /// reflects the disk and must be regenerated.
    pub needs_rescan: bool,
}

impl AppState {
    /// Create initial application state around a settings store.
    pub fn new(store: Box<dyn ConfigStore>) -> Self {
        Self {
            store,
            scanner: Scanner::new(),
            phase: AppPhase::Idle,
            scan_handle: None,
            scan_root: None,
            scan_examined: 0,
            scan_total: 0,
            scan_current_path: None,
            scan_duration: None,
            scan_was_cancelled: false,
            last_error: None,
            scan_failure: None,
            candidates: Vec::new(),
            selected: Vec::new(),
            needs_rescan: false,
        }
    }

    pub fn store(&self) -> &dyn ConfigStore {
        self.store.as_ref()
    }

    /// Start a background scan and remember the criteria for the next run.
    ///
    /// Rejected synchronously if the root is invalid or a scan is already
    /// running; a rejected scan leaves the stored settings untouched.
    pub fn start_scan(&mut self, root: &Path, criteria: FilterCriteria) -> Result<(), ScanError> {
        let handle = match self.scanner.start(root, criteria.clone()) {
            Ok(handle) => handle,
            Err(err) => {
                self.last_error = Some((err.category(), err.to_string()));
                return Err(err);
            }
        };

        if let Err(err) = self.store.store_criteria(&criteria, root) {
            warn!("Could not save settings: {err}");
        }

        // Reset scan state.
        self.phase = AppPhase::Scanning;
        self.scan_root = Some(handle.root().to_path_buf());
        self.scan_examined = 0;
        self.scan_total = 0;
        self.scan_current_path = None;
        self.scan_duration = None;
        self.scan_was_cancelled = false;
        self.last_error = None;
        self.scan_failure = None;
        self.candidates.clear();
        self.selected.clear();
        self.needs_rescan = false;
        self.scan_handle = Some(handle);
        Ok(())
    }

    /// Cancel any running scan.
    pub fn cancel_scan(&mut self) {
        if let Some(ref handle) = self.scan_handle {
            handle.cancel();
        }
    }

    /// Drain pending scan messages without blocking.
    ///
    /// Returns `true` if anything changed.
    pub fn process_scan_messages(&mut self) -> bool {
        let mut changed = false;
        for _ in 0..MAX_MESSAGES_PER_PASS {
            let msg = match &self.scan_handle {
                Some(handle) => match handle.progress_rx.try_recv() {
                    Ok(msg) => msg,
                    Err(_) => break,
                },
                None => break,
            };
            changed = true;
            if self.apply_message(msg) {
                break;
            }
        }
        changed
    }

    /// Block up to `timeout` for the next scan message, then drain the rest.
    ///
    /// Returns `true` if anything changed.
    pub fn pump_scan_messages(&mut self, timeout: Duration) -> bool {
        let first = match &self.scan_handle {
            Some(handle) => handle.progress_rx.recv_timeout(timeout),
            None => return false,
        };
        match first {
            Ok(msg) => {
                if !self.apply_message(msg) {
                    self.process_scan_messages();
                }
                true
            }
            Err(RecvTimeoutError::Timeout) => false,
            Err(RecvTimeoutError::Disconnected) => {
                warn!("Scanner channel closed without a result");
                self.scan_handle = None;
                self.phase = AppPhase::Idle;
                true
            }
        }
    }

    /// Apply one message. Returns `true` for the terminal message.
    fn apply_message(&mut self, msg: ScanMessage) -> bool {
        match msg {
            ScanMessage::Started { total } => {
                self.scan_total = total;
                false
            }
            ScanMessage::Tick(progress) => {
                self.scan_examined = progress.examined;
                self.scan_total = progress.total;
                self.scan_current_path = progress.current_path;
                false
            }
            ScanMessage::Complete {
                candidates,
                examined,
                duration,
            } => {
                self.scan_examined = examined;
                self.scan_duration = Some(duration);
                self.selected = vec![DEFAULT_SELECTED; candidates.len()];
                self.candidates = candidates;
                self.phase = AppPhase::Results;
                self.scan_handle = None;
                true
            }
            ScanMessage::Failed(err) => {
                self.last_error = Some((err.category(), err.to_string()));
                self.scan_failure = Some(err);
                self.phase = AppPhase::Idle;
                self.scan_handle = None;
                true
            }
            ScanMessage::Cancelled => {
                self.scan_was_cancelled = true;
                self.scan_failure = Some(ScanError::Cancelled);
                self.last_error = Some((ErrorCategory::Cancelled, ScanError::Cancelled.to_string()));
                self.phase = AppPhase::Idle;
                self.scan_handle = None;
                true
            }
        }
    }

    /// Whether a scan is still streaming messages.
    pub fn is_scanning(&self) -> bool {
        self.scan_handle.is_some()
    }

    /// The error that ended the last scan, if it failed or was cancelled.
    pub fn take_scan_failure(&mut self) -> Option<ScanError> {
        self.scan_failure.take()
    }

    /// Percentage for a progress display: ticks cap at 99, results are 100.
    pub fn progress_percent(&self) -> u8 {
        match self.phase {
            AppPhase::Results => 100,
            _ if self.scan_total == 0 => 0,
            _ => {
                let pct = self.scan_examined.saturating_mul(100) / self.scan_total;
                pct.min(99) as u8
            }
        }
    }

    // ── Selection ──────────────────────────────────────

    pub fn candidates(&self) -> &[FileCandidate] {
        &self.candidates
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.get(index).copied().unwrap_or(false)
    }

    /// Select or deselect every candidate.
    pub fn select_all(&mut self, selected: bool) {
        self.selected.iter_mut().for_each(|s| *s = selected);
    }

    /// Flip one candidate's selection. Out-of-range indices are ignored.
    pub fn toggle(&mut self, index: usize) {
        if let Some(s) = self.selected.get_mut(index) {
            *s = !*s;
        }
    }

    /// Narrow the selection by relative path.
    ///
    /// With a non-empty `only`, just those paths are selected; every path in
    /// `exclude` is then deselected. Relative paths use `/` separators.
    /// Returns the `only` entries that matched no candidate.
    pub fn select_paths(&mut self, only: &[String], exclude: &[String]) -> Vec<String> {
        let relative: Vec<Option<String>> = self
            .candidates
            .iter()
            .map(|c| self.relative_name(c))
            .collect();

        if !only.is_empty() {
            for (sel, rel) in self.selected.iter_mut().zip(&relative) {
                *sel = rel.as_ref().is_some_and(|r| only.contains(r));
            }
        }
        for (sel, rel) in self.selected.iter_mut().zip(&relative) {
            if rel.as_ref().is_some_and(|r| exclude.contains(r)) {
                *sel = false;
            }
        }

        only.iter()
            .filter(|wanted| !relative.iter().flatten().any(|r| r == *wanted))
            .cloned()
            .collect()
    }

    /// Entry-style relative name of `candidate` under the scan root.
    pub fn relative_name(&self, candidate: &FileCandidate) -> Option<String> {
        let root = self.scan_root.as_deref()?;
        archive::entry_name(root, candidate.path())
    }

    pub fn selected_candidates(&self) -> Vec<FileCandidate> {
        self.candidates
            .iter()
            .zip(&self.selected)
            .filter(|&(_, &sel)| sel)
            .map(|(c, _)| c.clone())
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.selected.iter().filter(|&&s| s).count()
    }

    /// Combined size of the selected candidates.
    pub fn selected_total_size(&self) -> u64 {
        total_size(
            self.candidates
                .iter()
                .zip(&self.selected)
                .filter(|&(_, &sel)| sel)
                .map(|(c, _)| c),
        )
    }

    // ── Archive ────────────────────────────────────────

    /// Archive the current selection.
    ///
    /// `destination` defaults to a timestamped file inside the scan root.
    /// After a deleting archive the results are cleared and `needs_rescan`
    /// is set.
    pub fn archive_selection(
        &mut self,
        destination: Option<PathBuf>,
        delete_after_archive: bool,
    ) -> Result<ArchiveResult, ArchiveError> {
        let root = match (&self.scan_root, self.phase) {
            (Some(root), AppPhase::Results) => root.clone(),
            _ => return Err(ValidationError::NothingSelected.into()),
        };
        let destination =
            destination.unwrap_or_else(|| archive::default_destination(&root, Local::now()));

        let request = ArchiveRequest {
            root_dir: root,
            selected: self.selected_candidates(),
            destination,
            delete_after_archive,
        };

        match archive::build(request) {
            Ok(result) => {
                info!(
                    "Archived {} files into {}",
                    result.entry_count,
                    result.destination.display()
                );
                if result.deleted > 0 {
                    self.needs_rescan = true;
                    self.candidates.clear();
                    self.selected.clear();
                    self.phase = AppPhase::Idle;
                }
                Ok(result)
            }
            Err(err) => {
                self.last_error = Some((err.category(), err.to_string()));
                // A failed delete step may already have removed some files.
                if delete_after_archive && !matches!(err, ArchiveError::Validation(_)) {
                    self.needs_rescan = true;
                }
                Err(err)
            }
        }
    }
}
