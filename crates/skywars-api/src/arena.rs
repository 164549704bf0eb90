//! Persisted arena configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::BlockPos;

/// A player spawn pedestal or spectator spawn, in block-space coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl SpawnPoint {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Location of an arena's join sign. Signs usually live in the lobby world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignLocation {
    pub position: BlockPos,
    pub world: String,
}

/// Anchor for one of the three top-winner NPCs shown in the lobby.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcAnchor {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub world: String,
}

/// A named minigame map configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub name: String,
    /// Folder name of the backing world.
    pub world: String,
    pub min_players: u32,
    pub max_players: u32,
    /// Spawn pedestals keyed by 1-based capture order.
    #[serde(default)]
    pub spawns: BTreeMap<u32, SpawnPoint>,
    #[serde(default)]
    pub spectator_spawn: Option<SpawnPoint>,
    #[serde(default)]
    pub join_sign: Option<SignLocation>,
    /// Join sign status lines; `&` colour codes and `%alive`, `%dead`,
    /// `%status`, `%world`, `%max` placeholders are expanded by the sign renderer.
    #[serde(default = "default_sign_lines")]
    pub sign_lines: [String; 4],
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub spectator_mode: bool,
    #[serde(default = "default_true")]
    pub start_on_full: bool,
    /// Seconds of no-PvP at round start.
    #[serde(default)]
    pub grace_timer: u32,
}

fn default_sign_lines() -> [String; 4] {
    [
        "&b[SkyWars]".into(),
        "&f%world".into(),
        "&a%alive&7/&a%max".into(),
        "&e%status".into(),
    ]
}

fn default_true() -> bool {
    true
}

impl Arena {
    /// A fresh arena with default settings for the given world.
    pub fn new(name: &str, world: &str) -> Self {
        Self {
            name: name.to_string(),
            world: world.to_string(),
            min_players: 2,
            max_players: 8,
            spawns: BTreeMap::new(),
            spectator_spawn: None,
            join_sign: None,
            sign_lines: default_sign_lines(),
            enabled: false,
            spectator_mode: true,
            start_on_full: true,
            grace_timer: 0,
        }
    }

    /// Set player limits. The maximum is raised to the minimum if it is smaller.
    pub fn set_player_counts(&mut self, max: u32, min: u32) {
        self.max_players = max.max(min);
        self.min_players = min;
    }

    /// Write spawn pedestal `index` (1-based).
    pub fn set_spawn(&mut self, index: u32, point: SpawnPoint) {
        self.spawns.insert(index, point);
    }

    pub fn clear_spawns(&mut self) {
        self.spawns.clear();
    }

    /// Every pedestal from 1 to `max_players` has been captured.
    pub fn spawns_complete(&self) -> bool {
        self.max_players > 0 && (1..=self.max_players).all(|i| self.spawns.contains_key(&i))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
