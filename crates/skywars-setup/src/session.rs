//! Per-player capture sessions.

use std::collections::HashMap;

use skywars_api::PlayerKey;

use crate::error::SetupError;

/// What a player's clicks with the capture tool currently mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKind {
    /// One click per player pedestal, in order.
    SpawnCapture,
    SpectatorSpawnCapture,
    JoinSignCapture,
    /// Three clicks for the lobby top-winner NPCs.
    NpcAnchorCapture,
    /// A single click leaves world-edit mode.
    WorldEditExit,
}

impl SessionKind {
    pub const NPC_ANCHORS: u32 = 3;

    /// Clicks needed to finish a session of this kind.
    pub fn bound(self, max_players: u32) -> u32 {
        match self {
            SessionKind::SpawnCapture => max_players,
            SessionKind::NpcAnchorCapture => Self::NPC_ANCHORS,
            _ => 1,
        }
    }

    /// Kinds whose clicks land inside the arena world, which must be unpacked
    /// and loaded for the duration of the session.
    pub fn needs_live_world(self) -> bool {
        matches!(
            self,
            SessionKind::SpawnCapture
                | SessionKind::SpectatorSpawnCapture
                | SessionKind::WorldEditExit
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionSession {
    pub kind: SessionKind,
    /// Target arena; `None` for NPC anchors, which are global.
    pub arena: Option<String>,
    /// 1-based index of the next click.
    pub progress: u32,
    pub bound: u32,
}

impl InteractionSession {
    pub fn is_complete(&self) -> bool {
        self.progress == self.bound + 1
    }
}

/// Returned by [`InteractionStateTracker::begin`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHandle {
    pub player: PlayerKey,
    pub kind: SessionKind,
}

/// Registry of active capture sessions, at most one per player.
#[derive(Debug, Default)]
pub struct InteractionStateTracker {
    sessions: HashMap<PlayerKey, InteractionSession>,
}

impl InteractionStateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session. Rejects players that already have one.
    pub fn begin(
        &mut self,
        player: &str,
        kind: SessionKind,
        arena: Option<&str>,
        bound: u32,
    ) -> Result<SessionHandle, SetupError> {
        let key = PlayerKey::new(player);
        if self.sessions.contains_key(&key) {
            return Err(SetupError::AlreadyActive(player.to_string()));
        }
        self.sessions.insert(
            key.clone(),
            InteractionSession {
                kind,
                arena: arena.map(str::to_string),
                progress: 1,
                bound: bound.max(1),
            },
        );
        Ok(SessionHandle { player: key, kind })
    }

    pub fn get(&self, player: &str) -> Option<&InteractionSession> {
        self.sessions.get(&PlayerKey::new(player))
    }

    pub fn is_active(&self, player: &str) -> bool {
        self.get(player).is_some()
    }

    /// `(progress, bound)` of the player's session.
    pub fn progress(&self, player: &str) -> Result<(u32, u32), SetupError> {
        self.get(player)
            .map(|s| (s.progress, s.bound))
            .ok_or_else(|| SetupError::NoActiveSession(player.to_string()))
    }

    /// Count one capture. Returns the new progress value.
    pub fn advance(&mut self, player: &str) -> Result<u32, SetupError> {
        let session = self
            .sessions
            .get_mut(&PlayerKey::new(player))
            .ok_or_else(|| SetupError::NoActiveSession(player.to_string()))?;
        session.progress += 1;
        Ok(session.progress)
    }

    pub fn is_complete(&self, player: &str) -> bool {
        self.get(player).is_some_and(InteractionSession::is_complete)
    }

    /// Remove the player's session, if any.
    pub fn end(&mut self, player: &str) -> Option<InteractionSession> {
        self.sessions.remove(&PlayerKey::new(player))
    }

    /// Players currently capturing for `arena`.
    pub fn players_for_arena(&self, arena: &str) -> Vec<PlayerKey> {
        self.sessions
            .iter()
            .filter(|(_, s)| s.arena.as_deref() == Some(arena))
            .map(|(k, _)| k.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
