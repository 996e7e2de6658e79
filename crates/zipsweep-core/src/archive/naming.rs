/// Archive entry names and destination paths.
use crate::error::{ArchiveError, ValidationError};
use crate::model::FileCandidate;
use crate::scanner::normalize_root;
use chrono::{DateTime, Local};
use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Zip entry name for `path` below `root`: relative, `/`-separated, no
/// leading separator. `None` when `path` is not strictly below `root`.
///
/// Both paths are expected in normalised form (see [`normalize_root`]).
pub fn entry_name(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy()),
            _ => return None,
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Entry names for every candidate, in order.
///
/// Fails without writing anything if a candidate lies outside `root`, two
/// candidates would share an entry, or a candidate is the archive itself.
/// `destination` must already be normalised.
pub(crate) fn plan_entries(
    root: &Path,
    destination: &Path,
    selected: &[FileCandidate],
) -> Result<Vec<String>, ArchiveError> {
    // An existing destination may be reached through a symlink.
    let destination_real = fs::canonicalize(destination).ok();
    let mut seen = HashSet::with_capacity(selected.len());
    let mut names = Vec::with_capacity(selected.len());
    for candidate in selected {
        let path = normalize_root(candidate.path())
            .map_err(|e| ArchiveError::io(candidate.path(), e))?;
        let is_destination = path == destination
            || destination_real
                .as_ref()
                .is_some_and(|real| fs::canonicalize(&path).ok().as_ref() == Some(real));
        if is_destination {
            let source = candidate.path().to_path_buf();
            return Err(ValidationError::DestinationIsSource(source).into());
        }
        let name = entry_name(root, &path)
            .ok_or_else(|| ValidationError::OutsideRoot(candidate.path().to_path_buf()))?;
        if !seen.insert(name.clone()) {
            return Err(ValidationError::DuplicateEntry(name).into());
        }
        names.push(name);
    }
    Ok(names)
}

/// Append `.zip` unless the destination already ends with it.
pub fn ensure_zip_extension(destination: PathBuf) -> PathBuf {
    let has_zip = destination
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
    if has_zip {
        return destination;
    }
    let mut name: OsString = destination.into_os_string();
    name.push(".zip");
    PathBuf::from(name)
}

/// Timestamped archive file name, e.g. `20240615083000.zip`.
pub fn default_archive_name(now: DateTime<Local>) -> String {
    format!("{}.zip", now.format("%Y%m%d%H%M%S"))
}

/// Default destination: a timestamped archive inside the scanned root.
pub fn default_destination(root: &Path, now: DateTime<Local>) -> PathBuf {
    root.join(default_archive_name(now))
}
