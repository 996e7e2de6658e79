/// Error taxonomy for scanning and archiving.
///
/// Validation failures are detected before any side effect happens. I/O
/// failures always abort the operation in full. Cancellation is a distinct
/// terminal outcome rather than a fault, but travels through `ScanError` so a
/// scan has a single result type.
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Coarse grouping used by front ends to pick a presentation (dialog title,
/// exit code, log level).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Io,
    Cancelled,
    Busy,
}

impl ErrorCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Validation => "validation error",
            Self::Io => "I/O error",
            Self::Cancelled => "cancelled",
            Self::Busy => "busy",
        }
    }
}

/// Input rejected before any expensive work starts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("a root directory is required")]
    EmptyRoot,

    #[error("root directory does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("root is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("refusing to scan a whole volume: {}", .0.display())]
    RootRejected(PathBuf),

    #[error("no files found under {}", .0.display())]
    NoFilesFound(PathBuf),

    #[error("no files were selected for archiving")]
    NothingSelected,

    #[error("file is not under the archive root: {}", .0.display())]
    OutsideRoot(PathBuf),

    #[error("two selected files map to the same archive entry: {0}")]
    DuplicateEntry(String),

    #[error("the archive destination is one of the selected files: {}", .0.display())]
    DestinationIsSource(PathBuf),
}

/// Terminal failure of a scan invocation.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("a scan is already running")]
    AlreadyRunning,

    #[error("scan was cancelled")]
    Cancelled,
}

impl ScanError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Io { .. } => ErrorCategory::Io,
            Self::AlreadyRunning => ErrorCategory::Busy,
            Self::Cancelled => ErrorCategory::Cancelled,
        }
    }
}

/// Failure of an archive build, including the optional delete step.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl ArchiveError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Attach `path` to a zip-layer failure, unwrapping the I/O error when the
    /// zip writer was only relaying one.
    pub(crate) fn from_zip(path: impl Into<PathBuf>, err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(source) => Self::io(path, source),
            other => Self::Zip(other),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Io { .. } | Self::Zip(_) => ErrorCategory::Io,
        }
    }
}

/// Failure reported by a [`crate::config::ConfigStore`] implementation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("settings I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("settings backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}
