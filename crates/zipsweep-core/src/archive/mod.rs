/// Archive builder: bundles a selection of candidates into one zip file and
/// optionally deletes the originals afterwards.
///
/// Ordering is strict: every entry is written and the archive finalised
/// before the first deletion. A failure while archiving leaves all sources
/// untouched (the destination may be left incomplete); a failure while
/// deleting stops at that file and never undoes the archive.
pub mod naming;
pub mod worker;

pub use naming::{default_archive_name, default_destination, ensure_zip_extension, entry_name};
pub use worker::{spawn_build, ArchiveHandle};

use crate::error::{ArchiveError, ValidationError};
use crate::model::FileCandidate;
use crate::scanner::normalize_root;
use chrono::{DateTime, Local};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// A user-approved selection to archive.
#[derive(Debug, Clone)]
pub struct ArchiveRequest {
    /// Root the candidates were scanned under; entry names are relative to it.
    pub root_dir: PathBuf,
    /// Files to archive, in entry order.
    pub selected: Vec<FileCandidate>,
    /// Output path. `.zip` is appended if missing.
    pub destination: PathBuf,
    /// Remove each source file once the archive is complete.
    pub delete_after_archive: bool,
}

/// Outcome of a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveResult {
    pub destination: PathBuf,
    /// Size of the finished archive on disk.
    pub total_bytes_written: u64,
    pub entry_count: usize,
    /// Uncompressed bytes read from the sources.
    pub source_bytes: u64,
    /// Number of originals removed (0 unless deletion was requested).
    pub deleted: usize,
}

/// Build the archive described by `request`, then delete sources if asked.
pub fn build(request: ArchiveRequest) -> Result<ArchiveResult, ArchiveError> {
    if request.selected.is_empty() {
        return Err(ValidationError::NothingSelected.into());
    }
    let start = Instant::now();
    let root = normalize_root(&request.root_dir)
        .map_err(|e| ArchiveError::io(&request.root_dir, e))?;
    let destination = ensure_zip_extension(request.destination);
    let destination =
        normalize_root(&destination).map_err(|e| ArchiveError::io(&destination, e))?;
    let names = naming::plan_entries(&root, &destination, &request.selected)?;

    let source_bytes = write_archive(&destination, &request.selected, &names)?;
    let total_bytes_written = fs::metadata(&destination)
        .map_err(|e| ArchiveError::io(&destination, e))?
        .len();
    info!(
        "Wrote {} ({} entries, {} -> {} bytes) in {:?}",
        destination.display(),
        names.len(),
        source_bytes,
        total_bytes_written,
        start.elapsed()
    );

    let deleted = if request.delete_after_archive {
        delete_sources(&request.selected)?
    } else {
        0
    };

    Ok(ArchiveResult {
        destination,
        total_bytes_written,
        entry_count: names.len(),
        source_bytes,
        deleted,
    })
}

/// Write every candidate as one deflated entry. Returns the bytes read.
///
/// The writer is owned by this function, so the destination handle is closed
/// on every return path.
fn write_archive(
    destination: &Path,
    selected: &[FileCandidate],
    names: &[String],
) -> Result<u64, ArchiveError> {
    let file = File::create(destination).map_err(|e| ArchiveError::io(destination, e))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let mut source_bytes: u64 = 0;

    for (candidate, name) in selected.iter().zip(names) {
        let bytes = fs::read(candidate.path()).map_err(|e| ArchiveError::io(candidate.path(), e))?;
        let len = bytes.len() as u64;

        zip.start_file(name.as_str(), entry_options(candidate, len))
            .map_err(|e| ArchiveError::from_zip(destination, e))?;
        zip.write_all(&bytes)
            .map_err(|e| ArchiveError::io(destination, e))?;

        source_bytes += len;
        debug!("Archived {name} ({len} bytes)");
    }

    let mut writer = zip
        .finish()
        .map_err(|e| ArchiveError::from_zip(destination, e))?;
    writer.flush().map_err(|e| ArchiveError::io(destination, e))?;
    Ok(source_bytes)
}

fn entry_options(candidate: &FileCandidate, len: u64) -> SimpleFileOptions {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(len >= u64::from(u32::MAX));

    let modified: DateTime<Local> = candidate.last_modified().into();
    match zip::DateTime::try_from(modified.naive_local()) {
        Ok(stamp) => options.last_modified_time(stamp),
        // Outside the DOS date range (before 1980); keep the default stamp.
        Err(_) => options,
    }
}

/// Remove sources in list order, stopping at the first failure.
fn delete_sources(selected: &[FileCandidate]) -> Result<usize, ArchiveError> {
    for (done, candidate) in selected.iter().enumerate() {
        if let Err(err) = fs::remove_file(candidate.path()) {
            info!(
                "Deletion stopped after {done} of {} files",
                selected.len()
            );
            return Err(ArchiveError::io(candidate.path(), err));
        }
        debug!("Deleted {}", candidate.path().display());
    }
    Ok(selected.len())
}
