use std::fs;

use skywars_archive::{ArchiveError, Direction, JobOutcome};
use tracing::error;

use super::*;

impl<J: ArchiveScheduler> ArenaEditCoordinator<J> {
    /// Persist a new arena and archive its world folder.
    ///
    /// The arena becomes `Archived` only once the archive job succeeds; a
    /// failed archive removes the config again.
    pub fn create_arena(
        &mut self,
        host: &mut dyn ArenaHost,
        player: &str,
        draft: PendingEdit,
    ) -> Result<JobId, SetupError> {
        let name = draft.arena.clone();
        if self.phases.contains_key(&name) || self.stores.arenas.exists(&name)? {
            return Err(SetupError::NameConflict(name));
        }
        self.check_world_free(&draft.world)?;

        let arena = draft.to_arena();
        self.stores.arenas.put(&arena)?;
        self.phases.insert(name.clone(), ArenaPhase::Draft);

        if host.is_world_loaded(&arena.world) {
            host.unload_world(&arena.world, true);
        }

        let job = ArchiveJob::pack(
            self.settings.world_dir(&arena.world),
            self.settings.archive_path(&arena.world),
            true,
        );
        let key = PlayerKey::new(player);
        let id = self.submit(job, &name, Continuation::Created { player: key.clone() });
        self.drafts.insert(key, draft);
        info!("{player} created arena {name} on world {}", arena.world);
        Ok(id)
    }

    /// A world can back a new arena if its folder exists, it is not the
    /// lobby and no arena claims it yet.
    fn check_world_free(&self, world: &str) -> Result<(), SetupError> {
        let bad_name = world.is_empty()
            || world.starts_with('.')
            || world.contains(['/', '\\']);
        if bad_name
            || world == self.settings.lobby_world
            || !self.settings.world_dir(world).is_dir()
            || self.stores.arenas.owner_of_world(world)?.is_some()
        {
            return Err(SetupError::MissingWorld(world.to_string()));
        }
        Ok(())
    }

    /// Unpack an arena's world and open a world-edit session for `player`
    /// once it is live.
    pub fn begin_edit(&mut self, player: &str, name: &str) -> Result<JobId, SetupError> {
        self.open_live(player, name, SessionKind::WorldEditExit)
    }

    /// Schedule the extract that precedes a session needing the arena world.
    pub(super) fn open_live(
        &mut self,
        player: &str,
        name: &str,
        kind: SessionKind,
    ) -> Result<JobId, SetupError> {
        let phase = self
            .phase(name)
            .ok_or_else(|| SetupError::UnknownArena(name.to_string()))?;
        match phase {
            ArenaPhase::Unpacking | ArenaPhase::EditingLive => {
                return Err(SetupError::AlreadyEditing(name.to_string()))
            }
            ArenaPhase::Draft | ArenaPhase::Packing => {
                return Err(SetupError::ArchiveInProgress(name.to_string()))
            }
            ArenaPhase::Archived | ArenaPhase::Ready => {}
        }
        self.ensure_idle(player)?;

        let arena = self.stored(name)?;
        let archive = self.settings.archive_path(&arena.world);
        if !archive.is_file() {
            return Err(SetupError::MissingWorld(arena.world));
        }
        let world_dir = self.settings.world_dir(&arena.world);
        if world_dir.exists() {
            // Not live, so the archive is the arena; the folder is what a
            // failed cleanup left behind.
            warn!("Removing leftover {} before extracting {name}", world_dir.display());
            fs::remove_dir_all(&world_dir).map_err(|e| SetupError::ExtractFailed {
                arena: name.to_string(),
                reason: format!("leftover {} could not be removed: {e}", world_dir.display()),
            })?;
        }

        let job = ArchiveJob::unpack(archive, world_dir, true);
        self.phases.insert(name.to_string(), ArenaPhase::Unpacking);
        let key = PlayerKey::new(player);
        let id = self.submit(
            job,
            name,
            Continuation::Opened {
                player: key.clone(),
                kind,
                abandoned: false,
            },
        );
        self.waiting.insert(key, id);
        Ok(id)
    }

    /// Leave the live phase of an arena: end its live sessions, save and
    /// unload the world, then archive it. Also retries a failed pack.
    pub fn end_edit(&mut self, host: &mut dyn ArenaHost, name: &str) -> Result<JobId, SetupError> {
        let phase = self
            .phase(name)
            .ok_or_else(|| SetupError::UnknownArena(name.to_string()))?;
        match phase {
            ArenaPhase::EditingLive => {}
            ArenaPhase::Draft | ArenaPhase::Unpacking | ArenaPhase::Packing => {
                return Err(SetupError::ArchiveInProgress(name.to_string()))
            }
            ArenaPhase::Archived | ArenaPhase::Ready => {
                return Err(SetupError::NotEditing(name.to_string()))
            }
        }

        let world = self.stored(name)?.world;
        let loaded = host.is_world_loaded(&world);
        if loaded {
            host.save_world(&world);
        }

        let editors: Vec<PlayerKey> = self
            .tracker
            .players_for_arena(name)
            .into_iter()
            .filter(|p| {
                self.tracker
                    .get(p.as_str())
                    .is_some_and(|s| s.kind.needs_live_world())
            })
            .collect();
        for editor in &editors {
            self.finish_session(host, editor.as_str());
            host.teleport_to_lobby(editor.as_str());
        }

        if loaded {
            host.unload_world(&world, false);
        }

        let job = ArchiveJob::pack(
            self.settings.world_dir(&world),
            self.settings.archive_path(&world),
            true,
        );
        self.phases.insert(name.to_string(), ArenaPhase::Packing);
        let id = self.submit(job, name, Continuation::Closed { notify: editors });
        info!("Packing arena {name} after edit");
        Ok(id)
    }

    /// `end_edit` for internal callers, where failure is only logged.
    pub(super) fn repack(&mut self, host: &mut dyn ArenaHost, name: &str) {
        if let Err(e) = self.end_edit(host, name) {
            warn!("Could not pack arena {name}: {e}");
        }
    }

    /// Remove an arena's config. Its world archive is left alone.
    pub fn delete_arena(&mut self, name: &str) -> Result<(), SetupError> {
        let phase = self
            .phase(name)
            .ok_or_else(|| SetupError::UnknownArena(name.to_string()))?;
        if phase.job_in_flight() {
            return Err(SetupError::ArchiveInProgress(name.to_string()));
        }
        if phase == ArenaPhase::EditingLive || !self.tracker.players_for_arena(name).is_empty() {
            return Err(SetupError::AlreadyEditing(name.to_string()));
        }

        self.stores.arenas.delete(name)?;
        self.phases.remove(name);
        info!("Deleted arena {name}");
        Ok(())
    }

    /// Join a finished archive job back into the workflow.
    pub fn on_job_complete(&mut self, host: &mut dyn ArenaHost, outcome: JobOutcome) {
        let Some(PendingJob { arena, continuation }) = self.jobs.remove(&outcome.id) else {
            warn!("Ignoring completion of unknown {}", outcome.id);
            return;
        };

        // A failed source removal still means the destination is complete.
        let result = match outcome.result {
            Err(ArchiveError::SourceCleanupFailed { path, source, report }) => {
                warn!("{} for {arena} left {} behind: {source}", outcome.id, path.display());
                if outcome.job.direction == Direction::Unpack {
                    // The world folder is the live copy now; a stale archive
                    // next to it would win on the next startup.
                    if let Err(e) = fs::remove_file(&path) {
                        error!("Stale archive {} of {arena} is still there: {e}", path.display());
                    }
                }
                Ok(report)
            }
            other => other,
        };

        match (continuation, result) {
            (Continuation::Created { player }, Ok(report)) => {
                info!("Arena {arena} archived ({} files, {} bytes)", report.files, report.bytes);
                self.phases.insert(arena.clone(), ArenaPhase::Archived);
                self.offer_spawn_setup(host, player.as_str(), &arena);
            }
            (Continuation::Created { player }, Err(e)) => {
                error!("Archiving new arena {arena} failed: {e}");
                if let Err(e) = self.stores.arenas.delete(&arena) {
                    warn!("Could not remove config of {arena}: {e}");
                }
                self.phases.remove(&arena);
                self.drafts.remove(&player);
                let failure = SetupError::ArchiveFailed {
                    arena,
                    reason: e.to_string(),
                };
                self.report(host, player.as_str(), &failure);
            }
            (
                Continuation::Opened {
                    player,
                    kind,
                    abandoned,
                },
                Ok(_),
            ) => {
                if self.waiting.get(&player) == Some(&outcome.id) {
                    self.waiting.remove(&player);
                }
                self.phases.insert(arena.clone(), ArenaPhase::EditingLive);
                if abandoned {
                    info!("{player} left before {arena} was unpacked, packing it again");
                    self.repack(host, &arena);
                } else if let Err(e) = self.enter_live(host, player.as_str(), &arena, kind) {
                    warn!("Could not start {kind:?} for {player} in {arena}: {e}");
                    self.report(host, player.as_str(), &e);
                    self.repack(host, &arena);
                }
            }
            (Continuation::Opened { player, .. }, Err(e)) => {
                error!("Extracting arena {arena} failed: {e}");
                if self.waiting.get(&player) == Some(&outcome.id) {
                    self.waiting.remove(&player);
                }
                self.phases.insert(arena.clone(), ArenaPhase::Ready);
                self.drafts.remove(&player);
                let failure = SetupError::ExtractFailed {
                    arena,
                    reason: e.to_string(),
                };
                self.report(host, player.as_str(), &failure);
            }
            (Continuation::Closed { notify }, Ok(_)) => {
                info!("Arena {arena} is ready");
                for player in notify {
                    host.send_message(player.as_str(), &self.messages.arena_ready(&arena));
                }
                self.phases.insert(arena, ArenaPhase::Ready);
            }
            (Continuation::Closed { notify }, Err(e)) => {
                // Nothing was removed, so `end_edit` can be retried.
                error!("Packing arena {arena} failed: {e}");
                self.phases.insert(arena.clone(), ArenaPhase::EditingLive);
                let failure = SetupError::ArchiveFailed {
                    arena,
                    reason: e.to_string(),
                };
                for player in notify {
                    self.report(host, player.as_str(), &failure);
                }
            }
        }
    }

    /// The world is unpacked: load it and hand the player their session.
    fn enter_live(
        &mut self,
        host: &mut dyn ArenaHost,
        player: &str,
        name: &str,
        kind: SessionKind,
    ) -> Result<(), SetupError> {
        let mut arena = self.stored(name)?;
        let world = arena.world.clone();
        if !host.is_world_loaded(&world) && !host.load_world(&world) {
            return Err(SetupError::ExtractFailed {
                arena: name.to_string(),
                reason: format!("world {world} could not be loaded"),
            });
        }

        match kind {
            SessionKind::WorldEditExit => {
                host.set_auto_save(&world, false);
                host.freeze_time(&world, TIME_DAY);
            }
            SessionKind::SpawnCapture => {
                arena.clear_spawns();
                self.stores.arenas.put(&arena)?;
            }
            _ => {}
        }

        self.tracker
            .begin(player, kind, Some(name), kind.bound(arena.max_players))?;
        host.teleport_to_spawn(player, &world);

        let message = if kind == SessionKind::WorldEditExit {
            host.clear_inventory(player);
            &self.messages.edit_started
        } else {
            &self.messages.panel_spawn_wand
        };
        host.send_message(player, &self.messages.render(message));
        self.lease.acquire(host, player);
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        drain, run_next, run_next_failing_cleanup, setup_coordinator, world_folder, MockHost,
    };
    use skywars_api::Form;
    use std::fs;

    fn create_sky1(
        coord: &mut ArenaEditCoordinator<crate::testing::RecordingScheduler>,
        host: &mut MockHost,
    ) -> JobId {
        coord
            .create_arena(host, "Steve", PendingEdit::new("sky1", "world_sky").with_players(8, 2))
            .unwrap()
    }

    #[test]
    fn create_archives_world_before_marking_archived() {
        let (root, mut coord, mut host) = setup_coordinator();
        let world = world_folder(&root, "world_sky");
        host.loaded.insert("world_sky".into());

        create_sky1(&mut coord, &mut host);
        assert_eq!(coord.phase("sky1"), Some(ArenaPhase::Draft));
        assert_eq!(coord.scheduler_mut().queued.len(), 1);
        assert!(!host.is_world_loaded("world_sky"));
        let stored = coord.arenas().get("sky1").unwrap().unwrap();
        assert_eq!((stored.max_players, stored.min_players), (8, 2));

        run_next(&mut coord, &mut host);
        assert_eq!(coord.phase("sky1"), Some(ArenaPhase::Archived));
        assert!(!world.exists());
        assert!(coord.settings().archive_path("world_sky").is_file());
        assert!(matches!(host.last_form("Steve"), Some((_, Form::Modal { .. }))));

        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn create_rejects_taken_names_and_worlds() {
        let (root, mut coord, mut host) = setup_coordinator();
        world_folder(&root, "world_sky");
        world_folder(&root, "world_void");
        world_folder(&root, "lobby");
        create_sky1(&mut coord, &mut host);

        let err = coord
            .create_arena(&mut host, "Steve", PendingEdit::new("sky1", "world_void"))
            .unwrap_err();
        assert!(matches!(err, SetupError::NameConflict(_)));

        for world in ["lobby", "world_none", "world_sky", "../world_void"] {
            let err = coord
                .create_arena(&mut host, "Steve", PendingEdit::new("sky2", world))
                .unwrap_err();
            assert!(matches!(err, SetupError::MissingWorld(_)), "{world}: {err}");
        }
        assert_eq!(coord.phase("sky2"), None);
        assert!(coord.arenas().get("sky2").unwrap().is_none());

        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn failed_initial_archive_removes_config() {
        let (root, mut coord, mut host) = setup_coordinator();
        let world = world_folder(&root, "world_sky");
        create_sky1(&mut coord, &mut host);
        fs::remove_dir_all(&world).unwrap();

        run_next(&mut coord, &mut host);
        assert_eq!(coord.phase("sky1"), None);
        assert!(coord.arenas().get("sky1").unwrap().is_none());
        assert!(!coord.settings().archive_path("world_sky").exists());
        assert!(coord.draft("Steve").is_none());
        assert!(host.messages_for("Steve").iter().any(|m| m.contains("Could not archive")));

        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn edit_is_exclusive_until_packed_again() {
        let (root, mut coord, mut host) = setup_coordinator();
        host.join("Alex");
        world_folder(&root, "world_sky");
        create_sky1(&mut coord, &mut host);
        drain(&mut coord, &mut host);

        coord.begin_edit("Steve", "sky1").unwrap();
        assert_eq!(coord.phase("sky1"), Some(ArenaPhase::Unpacking));
        assert!(matches!(
            coord.begin_edit("Alex", "sky1"),
            Err(SetupError::AlreadyEditing(_))
        ));

        run_next(&mut coord, &mut host);
        assert_eq!(coord.phase("sky1"), Some(ArenaPhase::EditingLive));
        assert!(coord.settings().world_dir("world_sky").is_dir());
        let archive = coord.settings().archive_path("world_sky");
        let failures = host.messages_for("Steve");
        assert!(failures
            .iter()
            .any(|m| m.contains("Could not archive") && m.contains(&*archive.to_string_lossy())));
        assert!(!failures.iter().any(|m| m.contains("archiving arena")));
        assert!(!coord.settings().archive_path("world_sky").exists());
        assert!(host.is_world_loaded("world_sky"));
        assert_eq!(host.auto_save.get("world_sky"), Some(&false));
        assert_eq!(host.frozen.get("world_sky"), Some(&TIME_DAY));
        assert_eq!(host.player("Steve").world, "world_sky");
        assert_eq!(coord.session("steve").unwrap().kind, SessionKind::WorldEditExit);
        assert_eq!(
            host.hotbar_item("Steve", 0),
            Some(coord.settings().capture_tool.clone())
        );
        assert!(matches!(
            coord.begin_edit("Alex", "sky1"),
            Err(SetupError::AlreadyEditing(_))
        ));

        coord.end_edit(&mut host, "sky1").unwrap();
        assert_eq!(coord.phase("sky1"), Some(ArenaPhase::Packing));
        assert!(coord.session("Steve").is_none());
        assert_eq!(host.player("Steve").world, "lobby");
        assert!(!host.is_world_loaded("world_sky"));
        assert!(matches!(
            coord.begin_edit("Alex", "sky1"),
            Err(SetupError::ArchiveInProgress(_))
        ));

        run_next(&mut coord, &mut host);
        assert_eq!(coord.phase("sky1"), Some(ArenaPhase::Ready));
        assert!(!coord.settings().world_dir("world_sky").exists());
        assert!(coord.settings().archive_path("world_sky").is_file());

        coord.begin_edit("Alex", "sky1").unwrap();
        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn world_is_saved_and_unloaded_before_packing() {
        let (root, mut coord, mut host) = setup_coordinator();
        world_folder(&root, "world_sky");
        create_sky1(&mut coord, &mut host);
        drain(&mut coord, &mut host);
        coord.begin_edit("Steve", "sky1").unwrap();
        drain(&mut coord, &mut host);

        host.log.clear();
        coord.end_edit(&mut host, "sky1").unwrap();
        assert_eq!(
            host.log,
            vec![
                "save world_sky".to_string(),
                "teleport steve lobby".to_string(),
                "unload world_sky save=false".to_string(),
            ]
        );
        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn end_edit_requires_live_world() {
        let (root, mut coord, mut host) = setup_coordinator();
        world_folder(&root, "world_sky");
        assert!(matches!(
            coord.end_edit(&mut host, "sky1"),
            Err(SetupError::UnknownArena(_))
        ));
        create_sky1(&mut coord, &mut host);
        assert!(matches!(
            coord.end_edit(&mut host, "sky1"),
            Err(SetupError::ArchiveInProgress(_))
        ));
        drain(&mut coord, &mut host);
        assert!(matches!(
            coord.end_edit(&mut host, "sky1"),
            Err(SetupError::NotEditing(_))
        ));
        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn failed_extract_keeps_archive_and_arena() {
        let (root, mut coord, mut host) = setup_coordinator();
        world_folder(&root, "world_sky");
        create_sky1(&mut coord, &mut host);
        drain(&mut coord, &mut host);

        coord.begin_edit("Steve", "sky1").unwrap();
        // Something recreated the folder: the extract must refuse to overwrite it.
        world_folder(&root, "world_sky");
        run_next(&mut coord, &mut host);

        assert_eq!(coord.phase("sky1"), Some(ArenaPhase::Ready));
        assert!(coord.settings().archive_path("world_sky").is_file());
        assert!(coord.session("Steve").is_none());
        assert!(!coord.is_waiting("Steve"));
        assert!(host.messages_for("Steve").iter().any(|m| m.contains("Could not restore")));
        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn failed_load_packs_world_again() {
        let (root, mut coord, mut host) = setup_coordinator();
        world_folder(&root, "world_sky");
        create_sky1(&mut coord, &mut host);
        drain(&mut coord, &mut host);
        host.broken.insert("world_sky".into());

        coord.begin_edit("Steve", "sky1").unwrap();
        run_next(&mut coord, &mut host);
        assert!(coord.session("Steve").is_none());
        assert_eq!(coord.phase("sky1"), Some(ArenaPhase::Packing));

        run_next(&mut coord, &mut host);
        assert_eq!(coord.phase("sky1"), Some(ArenaPhase::Ready));
        assert_eq!(host.hotbar_item("Steve", 0), Some(skywars_api::ItemStack::empty()));
        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn failed_pack_can_be_retried() {
        let (root, mut coord, mut host) = setup_coordinator();
        world_folder(&root, "world_sky");
        create_sky1(&mut coord, &mut host);
        drain(&mut coord, &mut host);
        coord.begin_edit("Steve", "sky1").unwrap();
        drain(&mut coord, &mut host);

        // Block the archive destination with a directory so the rename fails.
        let archive = coord.settings().archive_path("world_sky");
        fs::create_dir_all(archive.join("occupied")).unwrap();
        coord.end_edit(&mut host, "sky1").unwrap();
        run_next(&mut coord, &mut host);
        assert_eq!(coord.phase("sky1"), Some(ArenaPhase::EditingLive));
        assert!(coord.settings().world_dir("world_sky").is_dir());
        let failures = host.messages_for("Steve");
        assert!(failures
            .iter()
            .any(|m| m.contains("Could not archive") && m.contains(&*archive.to_string_lossy())));
        assert!(!failures.iter().any(|m| m.contains("archiving arena")));

        fs::remove_dir_all(&archive).unwrap();
        coord.end_edit(&mut host, "sky1").unwrap();
        run_next(&mut coord, &mut host);
        assert_eq!(coord.phase("sky1"), Some(ArenaPhase::Ready));
        assert!(archive.is_file());
        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn half_deleted_world_after_pack_is_never_packed_again() {
        let (root, mut coord, mut host) = setup_coordinator();
        world_folder(&root, "world_sky");
        create_sky1(&mut coord, &mut host);
        drain(&mut coord, &mut host);
        coord.begin_edit("Steve", "sky1").unwrap();
        drain(&mut coord, &mut host);

        coord.end_edit(&mut host, "sky1").unwrap();
        run_next_failing_cleanup(&mut coord, &mut host);
        let archive = coord.settings().archive_path("world_sky");
        let world = coord.settings().world_dir("world_sky");
        let packed = fs::read(&archive).unwrap();
        assert!(world.is_dir());
        assert!(!world.join("level.dat").exists());

        // The archive is the arena now; the damaged folder is not editable.
        assert_eq!(coord.phase("sky1"), Some(ArenaPhase::Ready));
        assert!(host.messages_for("Steve").iter().any(|m| m.contains("saved and ready")));
        assert!(matches!(
            coord.end_edit(&mut host, "sky1"),
            Err(SetupError::NotEditing(_))
        ));
        assert!(coord.scheduler_mut().queued.is_empty());
        assert_eq!(fs::read(&archive).unwrap(), packed);

        // The next edit replaces the leftover with the archived world.
        coord.begin_edit("Steve", "sky1").unwrap();
        drain(&mut coord, &mut host);
        assert_eq!(coord.phase("sky1"), Some(ArenaPhase::EditingLive));
        assert_eq!(fs::read(world.join("level.dat")).unwrap(), b"level");
        assert!(!archive.exists());

        // And a restart with both copies present trusts the archive.
        coord.end_edit(&mut host, "sky1").unwrap();
        run_next_failing_cleanup(&mut coord, &mut host);
        coord.load_arenas().unwrap();
        assert_eq!(coord.phase("sky1"), Some(ArenaPhase::Ready));
        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn leftover_archive_after_extract_is_dropped() {
        let (root, mut coord, mut host) = setup_coordinator();
        world_folder(&root, "world_sky");
        create_sky1(&mut coord, &mut host);
        drain(&mut coord, &mut host);

        coord.begin_edit("Steve", "sky1").unwrap();
        run_next_failing_cleanup(&mut coord, &mut host);
        assert_eq!(coord.phase("sky1"), Some(ArenaPhase::EditingLive));
        assert!(coord.session("Steve").is_some());
        assert!(coord.settings().world_dir("world_sky").join("level.dat").is_file());
        assert!(!coord.settings().archive_path("world_sky").exists());

        coord.end_edit(&mut host, "sky1").unwrap();
        run_next(&mut coord, &mut host);
        assert_eq!(coord.phase("sky1"), Some(ArenaPhase::Ready));
        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn new_arena_survives_failed_world_cleanup() {
        let (root, mut coord, mut host) = setup_coordinator();
        world_folder(&root, "world_sky");
        create_sky1(&mut coord, &mut host);

        run_next_failing_cleanup(&mut coord, &mut host);
        assert_eq!(coord.phase("sky1"), Some(ArenaPhase::Archived));
        assert!(coord.arenas().get("sky1").unwrap().is_some());
        assert!(coord.settings().archive_path("world_sky").is_file());
        assert!(!host.messages_for("Steve").iter().any(|m| m.contains("Could not archive")));
        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn delete_waits_for_jobs_and_keeps_archive() {
        let (root, mut coord, mut host) = setup_coordinator();
        world_folder(&root, "world_sky");
        create_sky1(&mut coord, &mut host);
        assert!(matches!(
            coord.delete_arena("sky1"),
            Err(SetupError::ArchiveInProgress(_))
        ));
        drain(&mut coord, &mut host);

        coord.delete_arena("sky1").unwrap();
        assert_eq!(coord.phase("sky1"), None);
        assert!(coord.arenas().get("sky1").unwrap().is_none());
        assert!(coord.settings().archive_path("world_sky").is_file());
        assert!(matches!(
            coord.delete_arena("sky1"),
            Err(SetupError::UnknownArena(_))
        ));
        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn startup_marks_unpacked_worlds_live() {
        let (root, mut coord, mut host) = setup_coordinator();
        world_folder(&root, "world_sky");
        create_sky1(&mut coord, &mut host);
        drain(&mut coord, &mut host);
        // An edit that never finished: the folder exists, the zip does not.
        world_folder(&root, "world_void");
        let mut stale = skywars_api::Arena::new("sky2", "world_void");
        stale.max_players = 4;
        coord.stores.arenas.put(&stale).unwrap();

        assert_eq!(coord.load_arenas().unwrap(), 2);
        assert_eq!(coord.phase("sky1"), Some(ArenaPhase::Ready));
        assert_eq!(coord.phase("sky2"), Some(ArenaPhase::EditingLive));

        coord.end_edit(&mut host, "sky2").unwrap();
        run_next(&mut coord, &mut host);
        assert_eq!(coord.phase("sky2"), Some(ArenaPhase::Ready));
        assert!(coord.settings().archive_path("world_void").is_file());
        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn unknown_job_is_ignored() {
        let (root, mut coord, mut host) = setup_coordinator();
        coord.on_job_complete(
            &mut host,
            JobOutcome {
                id: JobId(99),
                job: ArchiveJob::pack(root.join("a"), root.join("a.zip"), true),
                result: Err(skywars_archive::ArchiveError::SourceMissing(root.join("a"))),
            },
        );
        assert_eq!(coord.jobs_in_flight(), 0);
        fs::remove_dir_all(&root).ok();
    }
}
