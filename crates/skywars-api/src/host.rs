//! Interfaces of the collaborators the setup workflow drives.
//!
//! The host server owns players and worlds; the stores own persisted data.
//! All calls happen on the interactive thread.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Arena, Form, GameMode, ItemStack, NpcAnchor};

// ─── Host server ─────────────────────────────────────────────────────────────

/// World and inventory operations of the game server.
///
/// Player arguments are display names; hosts must match them
/// case-insensitively. Operations on offline players are ignored.
pub trait ArenaHost {
    // --- Players ---
    fn send_message(&mut self, player: &str, message: &str);
    /// Present a form. The answer comes back tagged with `form_id`.
    fn show_form(&mut self, player: &str, form_id: u32, form: &Form);
    /// Teleport to the spawn location of a loaded world.
    fn teleport_to_spawn(&mut self, player: &str, world: &str);
    /// Teleport to the safe spawn of the default (lobby) world.
    fn teleport_to_lobby(&mut self, player: &str);
    fn set_gamemode(&mut self, player: &str, mode: GameMode);
    fn clear_inventory(&mut self, player: &str);

    // --- Hotbar ---
    fn held_slot(&self, player: &str) -> Option<u8>;
    fn set_held_slot(&mut self, player: &str, slot: u8);
    fn hotbar_item(&self, player: &str, slot: u8) -> Option<ItemStack>;
    fn set_hotbar_item(&mut self, player: &str, slot: u8, item: ItemStack);

    // --- Worlds ---
    fn is_world_loaded(&self, world: &str) -> bool;
    /// Load a world from the worlds directory. Returns false if it cannot be loaded.
    fn load_world(&mut self, world: &str) -> bool;
    fn unload_world(&mut self, world: &str, save: bool);
    fn save_world(&mut self, world: &str);
    fn set_auto_save(&mut self, world: &str, enabled: bool);
    /// Set the time of day and stop the daylight cycle.
    fn freeze_time(&mut self, world: &str, time: i64);
}

// ─── Stores ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Durable arena configuration store, keyed by arena name.
pub trait ArenaStore {
    fn get(&self, name: &str) -> Result<Option<Arena>, StoreError>;
    fn put(&mut self, arena: &Arena) -> Result<(), StoreError>;
    fn delete(&mut self, name: &str) -> Result<(), StoreError>;
    fn list(&self) -> Result<Vec<Arena>, StoreError>;

    fn exists(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.get(name)?.is_some())
    }

    /// Name of the arena backed by `world`, if any.
    fn owner_of_world(&self, world: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .list()?
            .into_iter()
            .find(|a| a.world == world)
            .map(|a| a.name))
    }
}

/// Store for the three lobby NPC anchors (indices 1–3).
pub trait AnchorStore {
    fn set_anchor(&mut self, index: u32, anchor: NpcAnchor) -> Result<(), StoreError>;
    fn anchors(&self) -> Result<Vec<(u32, NpcAnchor)>, StoreError>;
}

/// Per-player statistics kept by the minigame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub player: String,
    pub kills: u32,
    pub deaths: u32,
    pub wins: u32,
    pub losses: u32,
}

pub trait StatsDatabase {
    /// Stats for `player`; a zeroed record when none exist.
    fn player_data(&self, player: &str) -> Result<PlayerRecord, StoreError>;
}

// ─── Tests ───────────────────────────────────────────────────────────────────
