/// Scan-root validation and normalisation.
///
/// Everything here runs synchronously on the caller's thread, before any
/// background work is started.
use crate::error::{ScanError, ValidationError};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Make `raw` absolute and lexically clean: trailing separators and `.`
/// components are dropped, `..` pops the previous component.
///
/// Symlinks are not resolved, so the result is stable for paths that do not
/// exist yet (e.g. an archive destination).
pub fn normalize_root(raw: &Path) -> io::Result<PathBuf> {
    let absolute = std::path::absolute(raw)?;
    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Never pops past the volume root.
                if out.parent().is_some() {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    Ok(out)
}

/// `true` when `path` names a volume root: `/`, `C:\`, or a bare `C:`.
pub fn is_volume_root(path: &Path) -> bool {
    let mut components = path.components().peekable();
    components.peek().is_some()
        && components.all(|c| matches!(c, Component::Prefix(_) | Component::RootDir))
}

/// Validate a scan root and return its normalised form.
///
/// Checks, in order: non-empty, not a volume root, exists, is a directory,
/// is not the root of a mounted filesystem.
pub fn validate_root(raw: &Path) -> Result<PathBuf, ScanError> {
    if raw.as_os_str().to_string_lossy().trim().is_empty() {
        return Err(ValidationError::EmptyRoot.into());
    }
    if is_volume_root(raw) {
        return Err(ValidationError::RootRejected(raw.to_path_buf()).into());
    }

    let root = normalize_root(raw).map_err(|e| ScanError::io(raw, e))?;
    if is_volume_root(&root) {
        return Err(ValidationError::RootRejected(root).into());
    }

    let meta = match fs::metadata(&root) {
        Ok(meta) => meta,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(ValidationError::NotFound(root).into());
        }
        Err(err) => return Err(ScanError::io(root, err)),
    };
    if !meta.is_dir() {
        return Err(ValidationError::NotADirectory(root).into());
    }
    if is_mount_point(&root, &meta) {
        return Err(ValidationError::RootRejected(root).into());
    }

    Ok(root)
}

#[cfg(unix)]
fn is_mount_point(path: &Path, meta: &fs::Metadata) -> bool {
    use std::os::unix::fs::MetadataExt;

    path.parent()
        .and_then(|parent| fs::metadata(parent).ok())
        .is_some_and(|parent_meta| parent_meta.dev() != meta.dev())
}

#[cfg(not(unix))]
fn is_mount_point(_path: &Path, _meta: &fs::Metadata) -> bool {
    false
}
