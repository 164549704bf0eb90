//! Archive job descriptors and their synchronous execution.

use std::fmt;
use std::fs;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::error::ArchiveError;
use crate::pack::{pack_directory, unpack_archive, ArchiveReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Directory -> zip file.
    Pack,
    /// Zip file -> directory.
    Unpack,
}

/// One-shot pack/unpack request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveJob {
    pub direction: Direction,
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Remove `source` once the destination is fully written.
    pub delete_source_after: bool,
}

impl ArchiveJob {
    pub fn pack(source: impl Into<PathBuf>, destination: impl Into<PathBuf>, delete_source_after: bool) -> Self {
        Self {
            direction: Direction::Pack,
            source: source.into(),
            destination: destination.into(),
            delete_source_after,
        }
    }

    pub fn unpack(source: impl Into<PathBuf>, destination: impl Into<PathBuf>, delete_source_after: bool) -> Self {
        Self {
            direction: Direction::Unpack,
            source: source.into(),
            destination: destination.into(),
            delete_source_after,
        }
    }
}

/// Identity of a submitted job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job#{}", self.0)
    }
}

/// Completion message delivered back to the interactive thread.
#[derive(Debug)]
pub struct JobOutcome {
    pub id: JobId,
    pub job: ArchiveJob,
    pub result: Result<ArchiveReport, ArchiveError>,
}

/// Accepts jobs for background execution.
///
/// `submit` never blocks; the outcome is delivered later as a [`JobOutcome`]
/// carrying the returned id.
pub trait ArchiveScheduler {
    fn submit(&mut self, job: ArchiveJob) -> JobId;
}

/// Run a job to completion on the current thread.
///
/// The source is removed only after the destination has been written and
/// renamed into place. If that removal fails the job reports
/// [`ArchiveError::SourceCleanupFailed`].
pub fn run_job(job: &ArchiveJob) -> Result<ArchiveReport, ArchiveError> {
    let report = match job.direction {
        Direction::Pack => pack_directory(&job.source, &job.destination)?,
        Direction::Unpack => unpack_archive(&job.source, &job.destination)?,
    };

    let cleanup = if job.delete_source_after {
        match job.direction {
            Direction::Pack => fs::remove_dir_all(&job.source),
            Direction::Unpack => fs::remove_file(&job.source),
        }
    } else {
        Ok(())
    };
    settle(job, report, cleanup)
}

fn settle(
    job: &ArchiveJob,
    report: ArchiveReport,
    cleanup: std::io::Result<()>,
) -> Result<ArchiveReport, ArchiveError> {
    if let Err(source) = cleanup {
        warn!(
            "{:?} {} -> {} written, but the source could not be removed: {source}",
            job.direction,
            job.source.display(),
            job.destination.display()
        );
        return Err(ArchiveError::SourceCleanupFailed {
            path: job.source.clone(),
            source,
            report,
        });
    }

    info!(
        "{:?} {} -> {} done ({} files)",
        job.direction,
        job.source.display(),
        job.destination.display(),
        report.files
    );
    Ok(report)
}
