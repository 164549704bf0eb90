//! Background execution of archive jobs on tokio's blocking pool.

use std::path::PathBuf;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::ArchiveError;
use crate::job::{run_job, ArchiveJob, ArchiveScheduler, JobId, JobOutcome};
use crate::pack::ArchiveReport;

/// Run a job on the blocking pool and wait for it.
pub async fn run_blocking(job: ArchiveJob) -> Result<ArchiveReport, ArchiveError> {
    tokio::task::spawn_blocking(move || run_job(&job))
        .await
        .map_err(|e| ArchiveError::Worker(e.to_string()))?
}

/// Pack `source` into `dest`, optionally removing `source` afterwards.
pub async fn archive(
    source: impl Into<PathBuf>,
    dest: impl Into<PathBuf>,
    delete_source_after: bool,
) -> Result<ArchiveReport, ArchiveError> {
    run_blocking(ArchiveJob::pack(source, dest, delete_source_after)).await
}

/// Extract `source` into `dest`, optionally removing `source` afterwards.
/// Resolves only once every file has been written.
pub async fn extract(
    source: impl Into<PathBuf>,
    dest: impl Into<PathBuf>,
    delete_source_after: bool,
) -> Result<ArchiveReport, ArchiveError> {
    run_blocking(ArchiveJob::unpack(source, dest, delete_source_after)).await
}

/// Scheduler that runs jobs in the background and reports outcomes through
/// a completion queue drained by the interactive loop.
pub struct ArchiveWorker {
    runtime: Handle,
    completions: mpsc::UnboundedSender<JobOutcome>,
    next_id: u64,
}

impl ArchiveWorker {
    /// Create a worker bound to `runtime` and the receiving end of its queue.
    pub fn new(runtime: Handle) -> (Self, mpsc::UnboundedReceiver<JobOutcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = Self {
            runtime,
            completions: tx,
            next_id: 1,
        };
        (worker, rx)
    }
}

impl ArchiveScheduler for ArchiveWorker {
    fn submit(&mut self, job: ArchiveJob) -> JobId {
        let id = JobId(self.next_id);
        self.next_id += 1;
        debug!("Submitting {id}: {:?} {}", job.direction, job.source.display());

        let tx = self.completions.clone();
        self.runtime.spawn(async move {
            let result = run_blocking(job.clone()).await;
            if tx.send(JobOutcome { id, job, result }).is_err() {
                warn!("Completion queue closed, dropping outcome of {id}");
            }
        });
        id
    }
}
