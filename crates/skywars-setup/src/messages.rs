//! Player-facing message table.
//!
//! Every entry can be overridden from the `[messages]` table of the server
//! config. `&` colour codes are translated when a message is rendered.

use serde::Deserialize;
use skywars_api::colorize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub prefix: String,
    pub no_world: String,
    pub arena_exists: String,
    pub panel_low_arguments: String,
    pub panel_cancelled: String,
    pub panel_spawn_wand: String,
    pub panel_join_sign: String,
    pub panel_join_spect: String,
    /// `{COUNT}` is replaced by the pedestal index.
    pub panel_spawn_pos: String,
    pub panel_spawn_set: String,
    /// `{ARENA}` is replaced by the arena name.
    pub arena_delete: String,
    pub edit_started: String,
    pub edit_finished: String,
    pub arena_ready: String,
    pub archive_failed: String,
    pub extract_failed: String,
    pub arena_updated: String,
    pub sign_updated: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            prefix: "&e[&bSkyWars&e] &r".into(),
            no_world: "&cThere is no free world to turn into an arena.".into(),
            arena_exists: "&cAn arena with that name already exists.".into(),
            panel_low_arguments: "&cPlease fill in every field.".into(),
            panel_cancelled: "&cSetup cancelled.".into(),
            panel_spawn_wand: "&aBreak blocks with the blaze rod to set the positions.".into(),
            panel_join_sign: "&aJoin sign location saved.".into(),
            panel_join_spect: "&aSpectator spawn saved.".into(),
            panel_spawn_pos: "&aPosition &e{COUNT}&a saved.".into(),
            panel_spawn_set: "&aAll spawn positions are set.".into(),
            arena_delete: "&aArena &e{ARENA}&a deleted. Its world was kept.".into(),
            edit_started: "&aYou can now edit this world. Use the blaze rod when you are done.".into(),
            edit_finished: "&aTeleporting you back to the main world.".into(),
            arena_ready: "&aArena &e{ARENA}&a is saved and ready.".into(),
            archive_failed: "&cCould not archive the arena world: {ERROR}".into(),
            extract_failed: "&cCould not restore the arena world: {ERROR}".into(),
            arena_updated: "&aSuccessfully updated arena &e{ARENA}".into(),
            sign_updated: "&aSuccessfully updated sign lines for &e{ARENA}".into(),
        }
    }
}

impl Messages {
    /// Prefix and colourize a raw message.
    pub fn render(&self, message: &str) -> String {
        colorize(&format!("{}{}", self.prefix, message))
    }

    pub fn spawn_pos(&self, count: u32) -> String {
        self.render(&self.panel_spawn_pos.replace("{COUNT}", &count.to_string()))
    }

    pub fn arena_delete(&self, arena: &str) -> String {
        self.render(&self.arena_delete.replace("{ARENA}", arena))
    }

    pub fn arena_ready(&self, arena: &str) -> String {
        self.render(&self.arena_ready.replace("{ARENA}", arena))
    }

    pub fn arena_updated(&self, arena: &str) -> String {
        self.render(&self.arena_updated.replace("{ARENA}", arena))
    }

    pub fn sign_updated(&self, arena: &str) -> String {
        self.render(&self.sign_updated.replace("{ARENA}", arena))
    }

    /// Generic red error line.
    pub fn failure(&self, reason: &str) -> String {
        self.render(&format!("&c{reason}"))
    }

    pub fn archive_failed(&self, error: &str) -> String {
        self.render(&self.archive_failed.replace("{ERROR}", error))
    }

    pub fn extract_failed(&self, error: &str) -> String {
        self.render(&self.extract_failed.replace("{ERROR}", error))
    }
}
