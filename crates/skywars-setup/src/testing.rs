//! In-memory collaborators for unit tests.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use skywars_api::{
    AnchorStore, Arena, ArenaHost, ArenaStore, Form, GameMode, ItemStack, NpcAnchor, PlayerKey,
    PlayerRecord, StatsDatabase, StoreError,
};
use skywars_archive::{run_job, ArchiveError, ArchiveJob, ArchiveScheduler, JobId, JobOutcome};

use crate::coordinator::{ArenaEditCoordinator, SetupSettings, Stores};
use crate::messages::Messages;

pub(crate) fn temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("skywars_setup_{}", rand::random::<u64>()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// A world folder `<root>/worlds/<name>` with a few files in it.
pub(crate) fn world_folder(root: &Path, name: &str) -> PathBuf {
    let world = root.join("worlds").join(name);
    fs::create_dir_all(world.join("db")).unwrap();
    fs::write(world.join("level.dat"), b"level").unwrap();
    fs::write(world.join("db").join("CURRENT"), b"MANIFEST-000001").unwrap();
    world
}

pub(crate) type TestCoordinator = ArenaEditCoordinator<RecordingScheduler>;

/// A coordinator over a fresh temp root, and a host with "Steve" online.
pub(crate) fn setup_coordinator() -> (PathBuf, TestCoordinator, MockHost) {
    let root = temp_dir();
    let settings = SetupSettings {
        worlds_dir: root.join("worlds"),
        archive_dir: root.join("arenas").join("worlds"),
        lobby_world: "lobby".into(),
        capture_tool: ItemStack::new("minecraft:blaze_rod", 1),
    };
    let stores = Stores {
        arenas: Box::new(MemoryStore::default()),
        anchors: Box::new(MemoryAnchors::default()),
        stats: Box::new(MemoryStats::default()),
    };
    let coord = ArenaEditCoordinator::new(
        settings,
        Messages::default(),
        RecordingScheduler::default(),
        stores,
    );
    let mut host = MockHost::new();
    host.join("Steve");
    (root, coord, host)
}

/// Run the oldest queued job and hand its outcome to the coordinator.
pub(crate) fn run_next(coord: &mut TestCoordinator, host: &mut MockHost) -> bool {
    match coord.scheduler_mut().run_next() {
        Some(outcome) => {
            coord.on_job_complete(host, outcome);
            true
        }
        None => false,
    }
}

/// Like [`run_next`], but the job's source removal fails part-way.
pub(crate) fn run_next_failing_cleanup(coord: &mut TestCoordinator, host: &mut MockHost) {
    if let Some(outcome) = coord.scheduler_mut().run_next_failing_cleanup() {
        coord.on_job_complete(host, outcome);
    }
}

/// Run jobs until none are queued, including ones scheduled by completions.
pub(crate) fn drain(coord: &mut TestCoordinator, host: &mut MockHost) {
    while run_next(coord, host) {}
}

// ─── Host ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub(crate) struct MockPlayer {
    pub held: u8,
    pub hotbar: Vec<ItemStack>,
    pub gamemode: GameMode,
    pub world: String,
}

#[derive(Debug, Default)]
pub(crate) struct MockHost {
    pub players: HashMap<PlayerKey, MockPlayer>,
    pub messages: Vec<(PlayerKey, String)>,
    pub forms: Vec<(PlayerKey, u32, Form)>,
    pub loaded: BTreeSet<String>,
    pub auto_save: HashMap<String, bool>,
    pub frozen: HashMap<String, i64>,
    /// Worlds whose load fails.
    pub broken: BTreeSet<String>,
    /// Ordered record of world operations, e.g. `"unload world_sky"`.
    pub log: Vec<String>,
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn join(&mut self, name: &str) {
        self.players.insert(
            PlayerKey::new(name),
            MockPlayer {
                held: 0,
                hotbar: vec![ItemStack::empty(); 9],
                gamemode: GameMode::Survival,
                world: "lobby".into(),
            },
        );
    }

    pub fn give(&mut self, name: &str, slot: u8, item: ItemStack) {
        self.set_hotbar_item(name, slot, item);
    }

    pub fn player(&self, name: &str) -> &MockPlayer {
        &self.players[&PlayerKey::new(name)]
    }

    pub fn messages_for(&self, name: &str) -> Vec<String> {
        let key = PlayerKey::new(name);
        self.messages
            .iter()
            .filter(|(p, _)| *p == key)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Last form shown to `name`.
    pub fn last_form(&self, name: &str) -> Option<(u32, Form)> {
        let key = PlayerKey::new(name);
        self.forms
            .iter()
            .rev()
            .find(|(p, _, _)| *p == key)
            .map(|(_, id, form)| (*id, form.clone()))
    }
}

impl ArenaHost for MockHost {
    fn send_message(&mut self, player: &str, message: &str) {
        self.messages.push((PlayerKey::new(player), message.to_string()));
    }

    fn show_form(&mut self, player: &str, form_id: u32, form: &Form) {
        self.forms.push((PlayerKey::new(player), form_id, form.clone()));
    }

    fn teleport_to_spawn(&mut self, player: &str, world: &str) {
        if let Some(p) = self.players.get_mut(&PlayerKey::new(player)) {
            p.world = world.to_string();
            self.log.push(format!("teleport {} {world}", PlayerKey::new(player)));
        }
    }

    fn teleport_to_lobby(&mut self, player: &str) {
        self.teleport_to_spawn(player, "lobby");
    }

    fn set_gamemode(&mut self, player: &str, mode: GameMode) {
        if let Some(p) = self.players.get_mut(&PlayerKey::new(player)) {
            p.gamemode = mode;
        }
    }

    fn clear_inventory(&mut self, player: &str) {
        if let Some(p) = self.players.get_mut(&PlayerKey::new(player)) {
            p.hotbar = vec![ItemStack::empty(); 9];
        }
    }

    fn held_slot(&self, player: &str) -> Option<u8> {
        self.players.get(&PlayerKey::new(player)).map(|p| p.held)
    }

    fn set_held_slot(&mut self, player: &str, slot: u8) {
        if let Some(p) = self.players.get_mut(&PlayerKey::new(player)) {
            p.held = slot;
        }
    }

    fn hotbar_item(&self, player: &str, slot: u8) -> Option<ItemStack> {
        self.players
            .get(&PlayerKey::new(player))
            .and_then(|p| p.hotbar.get(slot as usize).cloned())
    }

    fn set_hotbar_item(&mut self, player: &str, slot: u8, item: ItemStack) {
        if let Some(p) = self.players.get_mut(&PlayerKey::new(player)) {
            if let Some(s) = p.hotbar.get_mut(slot as usize) {
                *s = item;
            }
        }
    }

    fn is_world_loaded(&self, world: &str) -> bool {
        self.loaded.contains(world)
    }

    fn load_world(&mut self, world: &str) -> bool {
        if self.broken.contains(world) {
            return false;
        }
        self.log.push(format!("load {world}"));
        self.loaded.insert(world.to_string());
        true
    }

    fn unload_world(&mut self, world: &str, save: bool) {
        if self.loaded.remove(world) {
            self.log.push(format!("unload {world} save={save}"));
        }
    }

    fn save_world(&mut self, world: &str) {
        self.log.push(format!("save {world}"));
    }

    fn set_auto_save(&mut self, world: &str, enabled: bool) {
        self.auto_save.insert(world.to_string(), enabled);
    }

    fn freeze_time(&mut self, world: &str, time: i64) {
        self.frozen.insert(world.to_string(), time);
    }
}

// ─── Stores ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Clone)]
pub(crate) struct MemoryStore {
    pub arenas: BTreeMap<String, Arena>,
}

impl ArenaStore for MemoryStore {
    fn get(&self, name: &str) -> Result<Option<Arena>, StoreError> {
        Ok(self.arenas.get(name).cloned())
    }

    fn put(&mut self, arena: &Arena) -> Result<(), StoreError> {
        self.arenas.insert(arena.name.clone(), arena.clone());
        Ok(())
    }

    fn delete(&mut self, name: &str) -> Result<(), StoreError> {
        self.arenas.remove(name);
        Ok(())
    }

    fn list(&self) -> Result<Vec<Arena>, StoreError> {
        Ok(self.arenas.values().cloned().collect())
    }
}

#[derive(Debug, Default)]
pub(crate) struct MemoryAnchors {
    pub anchors: BTreeMap<u32, NpcAnchor>,
}

impl AnchorStore for MemoryAnchors {
    fn set_anchor(&mut self, index: u32, anchor: NpcAnchor) -> Result<(), StoreError> {
        self.anchors.insert(index, anchor);
        Ok(())
    }

    fn anchors(&self) -> Result<Vec<(u32, NpcAnchor)>, StoreError> {
        Ok(self.anchors.iter().map(|(i, a)| (*i, a.clone())).collect())
    }
}

#[derive(Debug, Default)]
pub(crate) struct MemoryStats {
    pub records: HashMap<PlayerKey, PlayerRecord>,
}

impl StatsDatabase for MemoryStats {
    fn player_data(&self, player: &str) -> Result<PlayerRecord, StoreError> {
        Ok(self
            .records
            .get(&PlayerKey::new(player))
            .cloned()
            .unwrap_or_else(|| PlayerRecord {
                player: player.to_string(),
                ..Default::default()
            }))
    }
}

// ─── Scheduler ───────────────────────────────────────────────────────────────

/// Collects submitted jobs; tests run them by hand with [`Self::run`].
#[derive(Debug, Default)]
pub(crate) struct RecordingScheduler {
    pub queued: Vec<(JobId, ArchiveJob)>,
    pub submitted: usize,
}

impl RecordingScheduler {
    /// Run the oldest queued job on the current thread.
    pub fn run_next(&mut self) -> Option<JobOutcome> {
        if self.queued.is_empty() {
            return None;
        }
        let (id, job) = self.queued.remove(0);
        let result = run_job(&job);
        Some(JobOutcome { id, job, result })
    }

    /// Run the oldest queued job with its destination written, then fail the
    /// source removal after it took `level.dat` out of a source folder.
    pub fn run_next_failing_cleanup(&mut self) -> Option<JobOutcome> {
        if self.queued.is_empty() {
            return None;
        }
        let (id, job) = self.queued.remove(0);
        let keep_source = ArchiveJob {
            delete_source_after: false,
            ..job.clone()
        };
        let result = run_job(&keep_source).and_then(|report| {
            if job.source.is_dir() {
                fs::remove_file(job.source.join("level.dat")).ok();
            }
            Err(ArchiveError::SourceCleanupFailed {
                path: job.source.clone(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
                report,
            })
        });
        Some(JobOutcome { id, job, result })
    }
}

impl ArchiveScheduler for RecordingScheduler {
    fn submit(&mut self, job: ArchiveJob) -> JobId {
        self.submitted += 1;
        let id = JobId(self.submitted as u64);
        self.queued.push((id, job));
        id
    }
}
