//! World snapshot pipeline: packs world folders into zip archives and
//! restores them, off the interactive thread.

pub mod error;
pub mod job;
pub mod pack;
pub mod worker;

pub use error::ArchiveError;
pub use job::{run_job, ArchiveJob, ArchiveScheduler, Direction, JobId, JobOutcome};
pub use pack::{pack_directory, unpack_archive, ArchiveReport};
pub use worker::{archive, extract, run_blocking, ArchiveWorker};
