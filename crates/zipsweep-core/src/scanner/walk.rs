/// The two directory passes behind every scan, using `jwalk`'s rayon-backed
/// parallel traversal.
///
/// Pass 1 counts regular files so progress has a denominator. Pass 2 walks again,
/// evaluates the filter on every regular file, and reports one tick per file.
/// Both passes check the cancel flag at every entry and abort on the first
/// I/O error; nothing partial escapes a failed walk.
use crate::error::{ScanError, ValidationError};
use crate::filter::FileFilter;
use crate::model::{FileCandidate, FilterCriteria};
use crate::scanner::progress::{ProgressSink, ScanProgress};
use crate::scanner::root::validate_root;
use chrono::Local;
use std::fs::{self, FileType, Metadata};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Terminal value of a scan: the candidate list, or why there is none.
pub type ScanResult = Result<Vec<FileCandidate>, ScanError>;

/// What a completed walk produced.
#[derive(Debug)]
pub(crate) struct ScanSummary {
    pub candidates: Vec<FileCandidate>,
    pub examined: u64,
}

/// Scan `root` synchronously on the calling thread.
///
/// Validates the root, counts, then filters, reporting ticks to `sink`.
/// Setting `cancel` (or a sink returning `false`) ends the scan with
/// [`ScanError::Cancelled`].
pub fn scan(
    root: &Path,
    criteria: &FilterCriteria,
    sink: &mut dyn ProgressSink,
    cancel: &AtomicBool,
) -> ScanResult {
    let root = validate_root(root)?;
    run_passes(&root, criteria, sink, cancel).map(|summary| summary.candidates)
}

/// Both passes over an already-validated root.
pub(crate) fn run_passes(
    root: &Path,
    criteria: &FilterCriteria,
    sink: &mut dyn ProgressSink,
    cancel: &AtomicBool,
) -> Result<ScanSummary, ScanError> {
    let start = Instant::now();
    info!(
        "Scanning {} for [{}] older than {}",
        root.display(),
        criteria.extension_list(),
        criteria.age().label()
    );

    let total = count_regular_files(root, cancel)?;
    debug!("Counted {total} regular files in {:?}", start.elapsed());
    if total == 0 {
        return Err(ValidationError::NoFilesFound(root.to_path_buf()).into());
    }
    if !sink.started(total) {
        return Err(ScanError::Cancelled);
    }

    let filter = FileFilter::new(criteria, Local::now());
    let summary = collect_candidates(root, &filter, total, sink, cancel)?;

    info!(
        "Scan complete: {} of {} files matched in {:?}",
        summary.candidates.len(),
        summary.examined,
        start.elapsed()
    );
    Ok(summary)
}

fn walker(root: &Path) -> jwalk::WalkDir {
    jwalk::WalkDir::new(root)
        .skip_hidden(false)
        .follow_links(false)
        .parallelism(jwalk::Parallelism::RayonNewPool(num_cpus::get()))
}

/// Pass 1: number of regular files anywhere below `root`.
fn count_regular_files(root: &Path, cancel: &AtomicBool) -> Result<u64, ScanError> {
    let mut count: u64 = 0;
    for entry_result in walker(root) {
        if cancel.load(Ordering::Relaxed) {
            return Err(ScanError::Cancelled);
        }
        let entry = entry_result.map_err(walk_error)?;
        let path = entry.path();
        if path == root {
            continue;
        }
        if regular_file_metadata(&path, entry.file_type())?.is_some() {
            count += 1;
        }
    }
    Ok(count)
}

/// Pass 2: evaluate the filter on every regular file, ticking as we go.
fn collect_candidates(
    root: &Path,
    filter: &FileFilter<'_>,
    total: u64,
    sink: &mut dyn ProgressSink,
    cancel: &AtomicBool,
) -> Result<ScanSummary, ScanError> {
    let mut candidates = Vec::new();
    let mut examined: u64 = 0;

    for entry_result in walker(root) {
        if cancel.load(Ordering::Relaxed) {
            return Err(ScanError::Cancelled);
        }
        let entry = entry_result.map_err(walk_error)?;
        let path = entry.path();
        if path == root {
            continue;
        }
        let Some(meta) = regular_file_metadata(&path, entry.file_type())? else {
            continue;
        };
        let modified = meta.modified().map_err(|e| ScanError::io(&path, e))?;

        // Files created between the passes can push past the counted total.
        examined += 1;
        let tick = ScanProgress {
            examined,
            total: total.max(examined),
            current_path: Some(path.clone()),
        };

        let name = entry.file_name().to_string_lossy();
        if filter.matches(&name, modified) {
            candidates.push(FileCandidate::new(path, modified, meta.len()));
        }

        if !sink.tick(tick) {
            return Err(ScanError::Cancelled);
        }
    }

    Ok(ScanSummary {
        candidates,
        examined,
    })
}

/// Metadata for `path` if it is a regular file, following a symlink to see
/// what it points at. Directories, symlinks to directories, dangling
/// symlinks, and special files yield `None`.
fn regular_file_metadata(path: &Path, file_type: FileType) -> Result<Option<Metadata>, ScanError> {
    if file_type.is_dir() {
        return Ok(None);
    }
    if !file_type.is_file() && !file_type.is_symlink() {
        return Ok(None);
    }
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(Some(meta)),
        Ok(_) => Ok(None),
        Err(err) if file_type.is_symlink() && err.kind() == io::ErrorKind::NotFound => {
            warn!("Skipping dangling symlink {}", path.display());
            Ok(None)
        }
        Err(err) => Err(ScanError::io(path, err)),
    }
}

fn walk_error(err: jwalk::Error) -> ScanError {
    let path = err.path().map(Path::to_path_buf).unwrap_or_else(PathBuf::new);
    ScanError::io(path, io::Error::other(err.to_string()))
}
