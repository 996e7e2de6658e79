/// A regular file a scan found matching the active criteria.
///
/// Candidates are value objects: created once by the scanner, handed to the
/// caller, and never mutated. All fields are private so that the path, the
/// split directory/name view of it, and the recorded metadata cannot drift
/// apart after construction.
use compact_str::CompactString;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    path: PathBuf,
    parent_dir: PathBuf,
    file_name: CompactString,
    last_modified: SystemTime,
    size_bytes: u64,
}

impl FileCandidate {
    /// Build a candidate from an absolute file path and its metadata.
    pub fn new(path: PathBuf, last_modified: SystemTime, size_bytes: u64) -> Self {
        let parent_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let file_name = path
            .file_name()
            .map(|n| CompactString::new(n.to_string_lossy()))
            .unwrap_or_default();
        Self {
            path,
            parent_dir,
            file_name,
            last_modified,
            size_bytes,
        }
    }

    /// Absolute path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory containing the file.
    pub fn parent_dir(&self) -> &Path {
        &self.parent_dir
    }

    /// File name only, lossily converted for display.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn last_modified(&self) -> SystemTime {
        self.last_modified
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Path relative to `root`, or `None` if the file is not below it.
    pub fn relative_to(&self, root: &Path) -> Option<&Path> {
        match self.path.strip_prefix(root) {
            Ok(rel) if !rel.as_os_str().is_empty() => Some(rel),
            _ => None,
        }
    }
}

/// Sum of the sizes of `candidates`.
pub fn total_size<'a>(candidates: impl IntoIterator<Item = &'a FileCandidate>) -> u64 {
    candidates.into_iter().map(FileCandidate::size_bytes).sum()
}
