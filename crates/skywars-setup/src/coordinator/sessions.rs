use skywars_api::{EventResult, TouchedBlock};

use super::*;
use crate::capture::{CaptureEventHandler, CaptureOutcome};

impl<J: ArchiveScheduler> ArenaEditCoordinator<J> {
    /// Capture one spawn pedestal per player slot. The arena world is
    /// unpacked first; the session starts when that finishes.
    pub fn begin_spawn_capture(&mut self, player: &str, name: &str) -> Result<JobId, SetupError> {
        self.open_live(player, name, SessionKind::SpawnCapture)
    }

    pub fn begin_spectator_capture(&mut self, player: &str, name: &str) -> Result<JobId, SetupError> {
        self.open_live(player, name, SessionKind::SpectatorSpawnCapture)
    }

    /// Capture the join sign. Signs live wherever the player stands, so no
    /// world needs unpacking.
    pub fn begin_sign_capture(
        &mut self,
        host: &mut dyn ArenaHost,
        player: &str,
        name: &str,
    ) -> Result<(), SetupError> {
        if !self.phases.contains_key(name) {
            return Err(SetupError::UnknownArena(name.to_string()));
        }
        self.start_session(host, player, SessionKind::JoinSignCapture, Some(name), 1)
    }

    /// Capture the three lobby NPC anchors.
    pub fn begin_npc_capture(&mut self, host: &mut dyn ArenaHost, player: &str) -> Result<(), SetupError> {
        self.start_session(
            host,
            player,
            SessionKind::NpcAnchorCapture,
            None,
            SessionKind::NPC_ANCHORS,
        )
    }

    fn start_session(
        &mut self,
        host: &mut dyn ArenaHost,
        player: &str,
        kind: SessionKind,
        arena: Option<&str>,
        bound: u32,
    ) -> Result<(), SetupError> {
        self.ensure_idle(player)?;
        self.tracker.begin(player, kind, arena, bound)?;
        self.lease.acquire(host, player);
        host.send_message(player, &self.messages.render(&self.messages.panel_spawn_wand));
        Ok(())
    }

    /// A player touched a block. Returns whether the host should apply the
    /// touch's normal effect.
    pub fn on_capture_event(
        &mut self,
        host: &mut dyn ArenaHost,
        player: &str,
        block: &TouchedBlock,
        held: &ItemStack,
    ) -> EventResult {
        let mut handler = CaptureEventHandler {
            tracker: &mut self.tracker,
            lease: &self.lease,
            arenas: &mut *self.stores.arenas,
            anchors: &mut *self.stores.anchors,
            messages: &self.messages,
        };

        match handler.handle(host, player, block, held) {
            Ok(CaptureOutcome::Completed(session)) => {
                self.complete_session(host, player, session);
                EventResult::Cancelled
            }
            Ok(outcome) => outcome.event_result(),
            Err(e) => {
                warn!("Capture by {player} failed: {e}");
                self.report(host, player, &e);
                if matches!(e, SetupError::UnknownArena(_)) {
                    self.finish_session(host, player);
                }
                EventResult::Cancelled
            }
        }
    }

    /// Sessions inside an arena world end by packing it; the others just
    /// tear down.
    fn complete_session(&mut self, host: &mut dyn ArenaHost, player: &str, session: InteractionSession) {
        match session.arena.as_deref() {
            Some(arena) if session.kind.needs_live_world() => self.repack(host, arena),
            _ => {}
        }
        self.finish_session(host, player);
    }

    /// Drop everything a player has in progress. Used when they quit.
    ///
    /// A pending extract cannot be stopped; it is marked so the world is
    /// packed again as soon as it lands.
    pub fn abandon(&mut self, host: &mut dyn ArenaHost, player: &str) {
        let key = PlayerKey::new(player);
        self.discard_form(player);

        if let Some(id) = self.waiting.remove(&key) {
            if let Some(PendingJob {
                continuation: Continuation::Opened { abandoned, .. },
                ..
            }) = self.jobs.get_mut(&id)
            {
                *abandoned = true;
            }
        }

        let live_arena = self
            .tracker
            .get(player)
            .filter(|s| s.kind.needs_live_world())
            .and_then(|s| s.arena.clone());
        if let Some(arena) = live_arena {
            self.repack(host, &arena);
        }
        self.finish_session(host, player);
    }

    pub fn on_player_quit(&mut self, host: &mut dyn ArenaHost, player: &str) {
        debug!("{player} quit, abandoning setup state");
        self.abandon(host, player);
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
