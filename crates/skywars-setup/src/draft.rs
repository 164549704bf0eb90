//! Arena fields gathered from the setup form before they are committed.

use skywars_api::Arena;

/// Draft of a new arena, alive between form submission and the end of the
/// setup flow it started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEdit {
    pub arena: String,
    pub world: String,
    pub max_players: u32,
    pub min_players: u32,
    pub spectator_mode: bool,
    pub start_on_full: bool,
}

impl PendingEdit {
    pub fn new(arena: &str, world: &str) -> Self {
        let defaults = Arena::new(arena, world);
        Self::from_arena(&defaults)
    }

    pub fn from_arena(arena: &Arena) -> Self {
        Self {
            arena: arena.name.clone(),
            world: arena.world.clone(),
            max_players: arena.max_players,
            min_players: arena.min_players,
            spectator_mode: arena.spectator_mode,
            start_on_full: arena.start_on_full,
        }
    }

    pub fn with_players(mut self, max: u32, min: u32) -> Self {
        self.max_players = max;
        self.min_players = min;
        self
    }

    /// Build the arena config to persist.
    pub fn to_arena(&self) -> Arena {
        let mut arena = Arena::new(&self.arena, &self.world);
        arena.set_player_counts(self.max_players, self.min_players);
        arena.spectator_mode = self.spectator_mode;
        arena.start_on_full = self.start_on_full;
        arena
    }
}
