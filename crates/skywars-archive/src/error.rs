//! Archive pipeline errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::pack::ArchiveReport;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("source does not exist: {0}")]
    SourceMissing(PathBuf),

    #[error("destination already exists: {0}")]
    DestinationExists(PathBuf),

    #[error("archive entry escapes the destination: {0}")]
    UnsafeEntry(String),

    #[error("worker task failed: {0}")]
    Worker(String),

    /// The destination was written and renamed into place, but removing the
    /// source afterwards failed. The destination is the complete copy.
    #[error("could not remove {path} after writing the destination: {source}")]
    SourceCleanupFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
        report: ArchiveReport,
    },
}

impl ArchiveError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }

    /// Whether the job's destination is complete despite this error.
    pub fn destination_written(&self) -> bool {
        matches!(self, Self::SourceCleanupFailed { .. })
    }
}
