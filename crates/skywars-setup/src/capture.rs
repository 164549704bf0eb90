//! Turning capture-tool block touches into configuration writes.

use skywars_api::{
    AnchorStore, Arena, ArenaHost, ArenaStore, EventResult, ItemStack, NpcAnchor, SignLocation,
    SpawnPoint, TouchedBlock,
};
use tracing::debug;

use crate::error::SetupError;
use crate::lease::ToolLease;
use crate::messages::Messages;
use crate::session::{InteractionSession, InteractionStateTracker, SessionKind};

/// What a touch did to the player's session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// No session, or the player was not holding the tool.
    Ignored,
    /// Value `index` was written; the session continues.
    Progress { index: u32 },
    /// The last value was written. The session is still registered and
    /// must be torn down by the caller.
    Completed(InteractionSession),
}

impl CaptureOutcome {
    /// Ignored touches keep their normal effect; captures never break the block.
    pub fn event_result(&self) -> EventResult {
        match self {
            CaptureOutcome::Ignored => EventResult::Continue,
            _ => EventResult::Cancelled,
        }
    }
}

/// Borrowed view over the state a capture touches.
pub struct CaptureEventHandler<'a> {
    pub tracker: &'a mut InteractionStateTracker,
    pub lease: &'a ToolLease,
    pub arenas: &'a mut dyn ArenaStore,
    pub anchors: &'a mut dyn AnchorStore,
    pub messages: &'a Messages,
}

impl CaptureEventHandler<'_> {
    pub fn handle(
        &mut self,
        host: &mut dyn ArenaHost,
        player: &str,
        block: &TouchedBlock,
        held: &ItemStack,
    ) -> Result<CaptureOutcome, SetupError> {
        let Some(session) = self.tracker.get(player).cloned() else {
            return Ok(CaptureOutcome::Ignored);
        };
        if !self.lease.is_tool(held) {
            return Ok(CaptureOutcome::Ignored);
        }

        let index = session.progress;
        let (x, y, z) = (
            f64::from(block.position.x),
            f64::from(block.position.y),
            f64::from(block.position.z),
        );

        match session.kind {
            SessionKind::SpawnCapture => {
                let mut arena = self.arena(&session)?;
                arena.set_spawn(index, SpawnPoint::new(x, y + 1.0, z));
                self.arenas.put(&arena)?;
                host.send_message(player, &self.messages.spawn_pos(index));
            }
            SessionKind::SpectatorSpawnCapture => {
                let mut arena = self.arena(&session)?;
                arena.spectator_spawn = Some(SpawnPoint::new(x, y, z));
                self.arenas.put(&arena)?;
                host.send_message(player, &self.messages.render(&self.messages.panel_join_spect));
            }
            SessionKind::JoinSignCapture => {
                let mut arena = self.arena(&session)?;
                arena.join_sign = Some(SignLocation {
                    position: block.position,
                    world: block.world.clone(),
                });
                self.arenas.put(&arena)?;
                host.send_message(player, &self.messages.render(&self.messages.panel_join_sign));
            }
            SessionKind::NpcAnchorCapture => {
                let lift = if block.is_slab { 0.5 } else { 1.0 };
                let anchor = NpcAnchor {
                    x: x + 0.5,
                    y: y + lift,
                    z: z + 0.5,
                    world: block.world.clone(),
                };
                self.anchors.set_anchor(index, anchor)?;
                host.send_message(player, &self.messages.spawn_pos(index));
            }
            SessionKind::WorldEditExit => {
                host.send_message(player, &self.messages.render(&self.messages.edit_finished));
            }
        }

        self.tracker.advance(player)?;
        debug!("{player} captured {:?} #{index}", session.kind);

        match self.tracker.get(player) {
            Some(done) if done.is_complete() => {
                if done.kind == SessionKind::SpawnCapture {
                    host.send_message(player, &self.messages.render(&self.messages.panel_spawn_set));
                }
                Ok(CaptureOutcome::Completed(done.clone()))
            }
            _ => Ok(CaptureOutcome::Progress { index }),
        }
    }

    fn arena(&self, session: &InteractionSession) -> Result<Arena, SetupError> {
        let name = session.arena.as_deref().unwrap_or_default();
        self.arenas
            .get(name)?
            .ok_or_else(|| SetupError::UnknownArena(name.to_string()))
    }
}
