//! Shared types for the SkyWars arena setup workflow.
//!
//! This crate defines the data model and the interfaces of the collaborators
//! the setup core talks to (host server, arena store, stats database, forms).
//! It has no dependency on the archive pipeline or the server binary.

pub mod arena;
pub mod forms;
pub mod host;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use arena::{Arena, NpcAnchor, SignLocation, SpawnPoint};
pub use forms::{Form, FormElement, FormError, FormResponse, FormValue};
pub use host::{AnchorStore, ArenaHost, ArenaStore, PlayerRecord, StatsDatabase, StoreError};

// ─── Player identity ─────────────────────────────────────────────────────────

/// Case-insensitive player identity.
///
/// Display names may arrive with different casing ("Steve" vs "STEVE"), so
/// every per-player map in the workflow is keyed by the lowercased name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerKey(String);

impl PlayerKey {
    pub fn new(name: &str) -> Self {
        Self(name.to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for PlayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ─── Blocks & items ──────────────────────────────────────────────────────────

/// Integer block coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

/// A block a player touched, as reported by the host's interaction dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchedBlock {
    pub position: BlockPos,
    /// Folder name of the world containing the block.
    pub world: String,
    /// Half-height block (slab); anchors placed on it sit half a block lower.
    pub is_slab: bool,
}

/// An item in a player's inventory. `id == "minecraft:air"` means empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub id: String,
    pub count: u16,
    #[serde(default)]
    pub metadata: u16,
}

impl ItemStack {
    pub const AIR: &'static str = "minecraft:air";

    /// An empty slot (air).
    pub fn empty() -> Self {
        Self {
            id: Self::AIR.to_string(),
            count: 0,
            metadata: 0,
        }
    }

    /// A plain stack with no metadata.
    pub fn new(id: impl Into<String>, count: u16) -> Self {
        Self {
            id: id.into(),
            count,
            metadata: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.id == Self::AIR || self.count == 0
    }

    /// Whether two stacks are the same kind of item, ignoring count.
    pub fn same_item(&self, other: &ItemStack) -> bool {
        self.id == other.id && self.metadata == other.metadata
    }
}

/// Player game mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Survival,
    Creative,
    Adventure,
    Spectator,
}

/// Result of handing an interaction event to the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// The host should apply the event's default effect.
    Continue,
    /// The event was consumed; the host must not mutate the world.
    Cancelled,
}

/// Translate `&` colour codes into section-sign codes.
pub fn colorize(text: &str) -> String {
    text.replace('&', "§")
}

// ─── Tests ───────────────────────────────────────────────────────────────────
