use serde::Deserialize;
use std::path::{Path, PathBuf};

use skywars_api::ItemStack;
use skywars_setup::{Messages, SetupSettings};

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub setup: SetupSection,
    pub logging: LoggingSection,
    #[serde(default)]
    pub messages: Messages,
}

#[derive(Debug, Deserialize)]
pub struct SetupSection {
    /// Directory holding the live world folders.
    #[serde(default = "default_worlds_dir")]
    pub worlds_dir: PathBuf,
    /// Plugin data: arena configs, NPC anchors, player stats, world archives.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_lobby_world")]
    pub lobby_world: String,
    /// Item id handed out for position capture.
    #[serde(default = "default_capture_tool")]
    pub capture_tool: String,
}

fn default_worlds_dir() -> PathBuf {
    "worlds".into()
}

fn default_data_dir() -> PathBuf {
    "plugin_data/SkyWars".into()
}

fn default_lobby_world() -> String {
    "world".into()
}

fn default_capture_tool() -> String {
    "minecraft:blaze_rod".into()
}

impl Default for SetupSection {
    fn default() -> Self {
        Self {
            worlds_dir: default_worlds_dir(),
            data_dir: default_data_dir(),
            lobby_world: default_lobby_world(),
            capture_tool: default_capture_tool(),
        }
    }
}

impl SetupSection {
    pub fn arenas_dir(&self) -> PathBuf {
        self.data_dir.join("arenas")
    }

    /// World archives live next to the arena configs.
    pub fn archive_dir(&self) -> PathBuf {
        self.arenas_dir().join("worlds")
    }

    pub fn npc_file(&self) -> PathBuf {
        self.data_dir.join("npc.json")
    }

    pub fn players_dir(&self) -> PathBuf {
        self.data_dir.join("players")
    }

    pub fn settings(&self) -> SetupSettings {
        SetupSettings {
            worlds_dir: self.worlds_dir.clone(),
            archive_dir: self.archive_dir(),
            lobby_world: self.lobby_world.clone(),
            capture_tool: ItemStack::new(self.capture_tool.clone(), 1),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    pub level: String,
}

impl ServerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }
}
