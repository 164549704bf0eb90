//! Setup workflow errors.

use skywars_api::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("an arena named {0} already exists")]
    NameConflict(String),

    #[error("unknown arena: {0}")]
    UnknownArena(String),

    #[error("world {0} has no free world folder")]
    MissingWorld(String),

    #[error("arena {0} is already being edited")]
    AlreadyEditing(String),

    #[error("player {0} already has a setup session in progress")]
    AlreadyActive(String),

    #[error("player {0} has no setup session")]
    NoActiveSession(String),

    #[error("an archive job for arena {0} is still running")]
    ArchiveInProgress(String),

    #[error("arena {0} is not being edited")]
    NotEditing(String),

    #[error("archiving arena {arena} failed: {reason}")]
    ArchiveFailed { arena: String, reason: String },

    #[error("extracting arena {arena} failed: {reason}")]
    ExtractFailed { arena: String, reason: String },

    #[error("arena store error: {0}")]
    Store(#[from] StoreError),
}
