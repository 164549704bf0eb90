//! Arena setup and edit workflow.
//!
//! The coordinator is the single entry point for everything that configures
//! an arena: the setup panel, capture sessions and world editing. It owns the
//! session tracker, the tool lease and the per-arena phase registry, and it
//! sequences archive jobs so an arena world directory is only ever owned by
//! one of {archive pipeline, loaded world, nothing}.
//!
//! All methods run on the interactive thread. Archive jobs run elsewhere and
//! come back through [`ArenaEditCoordinator::on_job_complete`].

mod lifecycle;
mod panel;
mod sessions;

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use skywars_api::{
    AnchorStore, Arena, ArenaHost, ArenaStore, ItemStack, PlayerKey, StatsDatabase,
};
use skywars_archive::{ArchiveJob, ArchiveScheduler, JobId};
use tracing::{debug, info, warn};

use crate::draft::PendingEdit;
use crate::error::SetupError;
use crate::lease::ToolLease;
use crate::messages::Messages;
use crate::session::{InteractionSession, InteractionStateTracker, SessionKind};

pub use panel::PanelForm;

/// World time frozen in while a world is being edited.
pub const TIME_DAY: i64 = 1000;

// ─── Types ───────────────────────────────────────────────────────────────────

/// Filesystem layout and fixed items of the workflow.
#[derive(Debug, Clone)]
pub struct SetupSettings {
    /// Directory holding live world folders.
    pub worlds_dir: PathBuf,
    /// Directory holding `<world>.zip` snapshots.
    pub archive_dir: PathBuf,
    /// The default world; never turned into an arena.
    pub lobby_world: String,
    pub capture_tool: ItemStack,
}

impl SetupSettings {
    pub fn world_dir(&self, world: &str) -> PathBuf {
        self.worlds_dir.join(world)
    }

    pub fn archive_path(&self, world: &str) -> PathBuf {
        self.archive_dir.join(format!("{world}.zip"))
    }
}

/// Where an arena is in its setup lifecycle. Arenas absent from the
/// registry are unconfigured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArenaPhase {
    /// Config written, first archive in flight.
    Draft,
    /// Freshly archived, spawn setup offer outstanding.
    Archived,
    /// Extract in flight.
    Unpacking,
    /// World directory unpacked and loaded.
    EditingLive,
    /// Archive in flight after a live phase.
    Packing,
    /// Archived and at rest.
    Ready,
}

impl ArenaPhase {
    pub fn job_in_flight(self) -> bool {
        matches!(self, ArenaPhase::Draft | ArenaPhase::Unpacking | ArenaPhase::Packing)
    }
}

/// Persistent collaborators owned by the coordinator.
pub struct Stores {
    pub arenas: Box<dyn ArenaStore>,
    pub anchors: Box<dyn AnchorStore>,
    pub stats: Box<dyn StatsDatabase>,
}

/// What happens when a job finishes.
#[derive(Debug)]
enum Continuation {
    /// First archive of a new arena; offer spawn setup to `player`.
    Created { player: PlayerKey },
    /// Extract before a live session for `player`.
    Opened {
        player: PlayerKey,
        kind: SessionKind,
        /// The player left while the job was running.
        abandoned: bool,
    },
    /// Re-pack after a live phase; tell `notify` when done.
    Closed { notify: Vec<PlayerKey> },
}

#[derive(Debug)]
struct PendingJob {
    arena: String,
    continuation: Continuation,
}

// ─── ArenaEditCoordinator ────────────────────────────────────────────────────

pub struct ArenaEditCoordinator<J> {
    settings: SetupSettings,
    messages: Messages,
    scheduler: J,
    stores: Stores,
    tracker: InteractionStateTracker,
    lease: ToolLease,
    drafts: HashMap<PlayerKey, PendingEdit>,
    phases: BTreeMap<String, ArenaPhase>,
    jobs: HashMap<JobId, PendingJob>,
    /// Players whose session starts once an extract finishes.
    waiting: HashMap<PlayerKey, JobId>,
    forms: HashMap<PlayerKey, panel::OpenForm>,
    next_form_id: u32,
}

impl<J: ArchiveScheduler> ArenaEditCoordinator<J> {
    pub fn new(settings: SetupSettings, messages: Messages, scheduler: J, stores: Stores) -> Self {
        let lease = ToolLease::new(settings.capture_tool.clone());
        Self {
            settings,
            messages,
            scheduler,
            stores,
            tracker: InteractionStateTracker::new(),
            lease,
            drafts: HashMap::new(),
            phases: BTreeMap::new(),
            jobs: HashMap::new(),
            waiting: HashMap::new(),
            forms: HashMap::new(),
            next_form_id: 1,
        }
    }

    /// Fill the registry from the arena store.
    ///
    /// An arena whose world folder exists without an archive was left
    /// unpacked by an interrupted edit; it starts live so `end_edit` can
    /// pack it again.
    pub fn load_arenas(&mut self) -> Result<usize, SetupError> {
        self.phases.clear();
        for arena in self.stores.arenas.list()? {
            let unpacked = self.settings.world_dir(&arena.world).is_dir();
            let archived = self.settings.archive_path(&arena.world).is_file();
            let phase = if unpacked && !archived {
                warn!("Arena {} was left unpacked, finish its edit to archive it", arena.name);
                ArenaPhase::EditingLive
            } else {
                if unpacked {
                    warn!("Arena {} has a leftover world folder, the archive wins", arena.name);
                }
                if !archived {
                    warn!("Arena {} has no world archive", arena.name);
                }
                ArenaPhase::Ready
            };
            self.phases.insert(arena.name, phase);
        }
        info!("Loaded {} arena(s)", self.phases.len());
        Ok(self.phases.len())
    }

    // --- Accessors ---

    pub fn settings(&self) -> &SetupSettings {
        &self.settings
    }

    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    pub fn phase(&self, arena: &str) -> Option<ArenaPhase> {
        self.phases.get(arena).copied()
    }

    pub fn arena_names(&self) -> Vec<String> {
        self.phases.keys().cloned().collect()
    }

    pub fn session(&self, player: &str) -> Option<&InteractionSession> {
        self.tracker.get(player)
    }

    pub fn is_waiting(&self, player: &str) -> bool {
        self.waiting.contains_key(&PlayerKey::new(player))
    }

    pub fn draft(&self, player: &str) -> Option<&PendingEdit> {
        self.drafts.get(&PlayerKey::new(player))
    }

    pub fn arenas(&self) -> &dyn ArenaStore {
        &*self.stores.arenas
    }

    pub fn anchors(&self) -> &dyn AnchorStore {
        &*self.stores.anchors
    }

    pub fn jobs_in_flight(&self) -> usize {
        self.jobs.len()
    }

    pub fn scheduler_mut(&mut self) -> &mut J {
        &mut self.scheduler
    }

    /// Tell a player why a request failed.
    pub fn report(&self, host: &mut dyn ArenaHost, player: &str, error: &SetupError) {
        let message = match error {
            SetupError::NameConflict(_) => self.messages.render(&self.messages.arena_exists),
            SetupError::MissingWorld(_) => self.messages.render(&self.messages.no_world),
            SetupError::ArchiveFailed { reason, .. } => self.messages.archive_failed(reason),
            SetupError::ExtractFailed { reason, .. } => self.messages.extract_failed(reason),
            other => self.messages.failure(&other.to_string()),
        };
        host.send_message(player, &message);
    }

    // --- Internals shared by the submodules ---

    fn stored(&self, name: &str) -> Result<Arena, SetupError> {
        self.stores
            .arenas
            .get(name)?
            .ok_or_else(|| SetupError::UnknownArena(name.to_string()))
    }

    /// Reject players that already have a session or a pending one.
    fn ensure_idle(&self, player: &str) -> Result<(), SetupError> {
        if self.tracker.is_active(player) || self.is_waiting(player) {
            return Err(SetupError::AlreadyActive(player.to_string()));
        }
        Ok(())
    }

    fn submit(&mut self, job: ArchiveJob, arena: &str, continuation: Continuation) -> JobId {
        let id = self.scheduler.submit(job);
        debug!("{id} scheduled for arena {arena}: {continuation:?}");
        self.jobs.insert(
            id,
            PendingJob {
                arena: arena.to_string(),
                continuation,
            },
        );
        id
    }

    /// The one teardown path for a player's session: give the slot back,
    /// drop the session and any draft.
    fn finish_session(&mut self, host: &mut dyn ArenaHost, player: &str) -> Option<InteractionSession> {
        self.lease.release(host, player);
        let session = self.tracker.end(player);
        self.drafts.remove(&PlayerKey::new(player));
        if let Some(session) = &session {
            debug!("Closed {:?} session of {player}", session.kind);
        }
        session
    }
}
