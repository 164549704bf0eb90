//! In-process game host driven from the console.
//!
//! Keeps just enough player and world state for the setup workflow: a
//! 9-slot hotbar per player, loaded worlds with their autosave and time
//! flags, and the last form each player was shown.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use tracing::{debug, info, warn};

use skywars_api::{colorize, ArenaHost, Form, GameMode, ItemStack, PlayerKey};

const HOTBAR_SLOTS: usize = 9;

#[derive(Debug, Clone)]
pub struct OnlinePlayer {
    /// Display name as the player joined.
    pub name: String,
    pub held_slot: u8,
    pub hotbar: [ItemStack; HOTBAR_SLOTS],
    pub gamemode: GameMode,
    pub world: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldState {
    pub auto_save: bool,
    /// Frozen time of day; `None` while the daylight cycle runs.
    pub frozen_time: Option<i64>,
}

impl Default for WorldState {
    fn default() -> Self {
        Self {
            auto_save: true,
            frozen_time: None,
        }
    }
}

pub struct ConsoleHost {
    worlds_dir: PathBuf,
    lobby_world: String,
    players: HashMap<PlayerKey, OnlinePlayer>,
    worlds: BTreeMap<String, WorldState>,
    forms: HashMap<PlayerKey, (u32, Form)>,
}

impl ConsoleHost {
    /// A host with only the lobby world loaded.
    pub fn new(worlds_dir: impl Into<PathBuf>, lobby_world: impl Into<String>) -> Self {
        let lobby_world = lobby_world.into();
        let mut worlds = BTreeMap::new();
        worlds.insert(lobby_world.clone(), WorldState::default());
        Self {
            worlds_dir: worlds_dir.into(),
            lobby_world,
            players: HashMap::new(),
            worlds,
            forms: HashMap::new(),
        }
    }

    /// Bring a player online in the lobby. Returns false if already online.
    pub fn join(&mut self, name: &str) -> bool {
        let key = PlayerKey::new(name);
        if self.players.contains_key(&key) {
            return false;
        }
        self.players.insert(
            key,
            OnlinePlayer {
                name: name.to_string(),
                held_slot: 0,
                hotbar: std::array::from_fn(|_| ItemStack::empty()),
                gamemode: GameMode::Survival,
                world: self.lobby_world.clone(),
            },
        );
        info!("{name} joined the game");
        true
    }

    /// Take a player offline. Returns false if they were not online.
    pub fn quit(&mut self, name: &str) -> bool {
        let key = PlayerKey::new(name);
        self.forms.remove(&key);
        match self.players.remove(&key) {
            Some(player) => {
                info!("{} left the game", player.name);
                true
            }
            None => false,
        }
    }

    pub fn player(&self, name: &str) -> Option<&OnlinePlayer> {
        self.players.get(&PlayerKey::new(name))
    }

    pub fn is_online(&self, name: &str) -> bool {
        self.players.contains_key(&PlayerKey::new(name))
    }

    /// The item in the player's held slot.
    pub fn held_item(&self, name: &str) -> ItemStack {
        self.player(name)
            .map(|p| p.hotbar[p.held_slot as usize].clone())
            .unwrap_or_else(ItemStack::empty)
    }

    /// The form the player is currently looking at.
    pub fn last_form(&self, name: &str) -> Option<&(u32, Form)> {
        self.forms.get(&PlayerKey::new(name))
    }

    /// Drop the player's open form once answered.
    pub fn close_form(&mut self, name: &str) {
        self.forms.remove(&PlayerKey::new(name));
    }

    pub fn world(&self, name: &str) -> Option<&WorldState> {
        self.worlds.get(name)
    }

    fn player_mut(&mut self, name: &str) -> Option<&mut OnlinePlayer> {
        self.players.get_mut(&PlayerKey::new(name))
    }
}

impl ArenaHost for ConsoleHost {
    fn send_message(&mut self, player: &str, message: &str) {
        info!(target: "chat", "[{player}] {}", plain(message));
    }

    fn show_form(&mut self, player: &str, form_id: u32, form: &Form) {
        if !self.is_online(player) {
            return;
        }
        info!(target: "forms", "[{player}] form #{form_id}: {}", form.to_json());
        self.forms
            .insert(PlayerKey::new(player), (form_id, form.clone()));
    }

    fn teleport_to_spawn(&mut self, player: &str, world: &str) {
        if !self.worlds.contains_key(world) {
            warn!("Cannot teleport {player} to unloaded world {world}");
            return;
        }
        if let Some(p) = self.player_mut(player) {
            p.world = world.to_string();
            debug!("Teleported {player} to the spawn of {world}");
        }
    }

    fn teleport_to_lobby(&mut self, player: &str) {
        let lobby = self.lobby_world.clone();
        self.teleport_to_spawn(player, &lobby);
    }

    fn set_gamemode(&mut self, player: &str, mode: GameMode) {
        if let Some(p) = self.player_mut(player) {
            p.gamemode = mode;
        }
    }

    fn clear_inventory(&mut self, player: &str) {
        if let Some(p) = self.player_mut(player) {
            p.hotbar = std::array::from_fn(|_| ItemStack::empty());
        }
    }

    fn held_slot(&self, player: &str) -> Option<u8> {
        self.player(player).map(|p| p.held_slot)
    }

    fn set_held_slot(&mut self, player: &str, slot: u8) {
        if (slot as usize) < HOTBAR_SLOTS {
            if let Some(p) = self.player_mut(player) {
                p.held_slot = slot;
            }
        }
    }

    fn hotbar_item(&self, player: &str, slot: u8) -> Option<ItemStack> {
        self.player(player)
            .and_then(|p| p.hotbar.get(slot as usize).cloned())
    }

    fn set_hotbar_item(&mut self, player: &str, slot: u8, item: ItemStack) {
        if let Some(s) = self
            .player_mut(player)
            .and_then(|p| p.hotbar.get_mut(slot as usize))
        {
            *s = item;
        }
    }

    fn is_world_loaded(&self, world: &str) -> bool {
        self.worlds.contains_key(world)
    }

    fn load_world(&mut self, world: &str) -> bool {
        if self.worlds.contains_key(world) {
            return true;
        }
        if !self.worlds_dir.join(world).is_dir() {
            warn!("World folder {world} not found in {}", self.worlds_dir.display());
            return false;
        }
        self.worlds.insert(world.to_string(), WorldState::default());
        info!("Loaded world {world}");
        true
    }

    fn unload_world(&mut self, world: &str, save: bool) {
        if world == self.lobby_world {
            warn!("Refusing to unload the lobby world");
            return;
        }
        if self.worlds.remove(world).is_none() {
            return;
        }
        let lobby = self.lobby_world.clone();
        for p in self.players.values_mut().filter(|p| p.world == world) {
            warn!("{} was still in {world}, moved to the lobby", p.name);
            p.world = lobby.clone();
        }
        info!("Unloaded world {world} (save={save})");
    }

    fn save_world(&mut self, world: &str) {
        if self.worlds.contains_key(world) {
            info!("Saved world {world}");
        }
    }

    fn set_auto_save(&mut self, world: &str, enabled: bool) {
        if let Some(state) = self.worlds.get_mut(world) {
            state.auto_save = enabled;
        }
    }

    fn freeze_time(&mut self, world: &str, time: i64) {
        if let Some(state) = self.worlds.get_mut(world) {
            state.frozen_time = Some(time);
        }
    }
}

/// Strip colour codes for console output.
pub fn plain(message: &str) -> String {
    let colored = colorize(message);
    let mut out = String::with_capacity(colored.len());
    let mut chars = colored.chars();
    while let Some(c) = chars.next() {
        if c == '§' {
            chars.next();
        } else {
            out.push(c);
        }
    }
    out
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn host_with_world() -> (PathBuf, ConsoleHost) {
        let root = std::env::temp_dir().join(format!("skywars_host_{}", rand::random::<u64>()));
        std::fs::create_dir_all(root.join("world_sky")).unwrap();
        let mut host = ConsoleHost::new(&root, "lobby");
        host.join("Steve");
        (root, host)
    }

    #[test]
    fn players_are_case_insensitive() {
        let (root, mut host) = host_with_world();
        assert!(!host.join("STEVE"));
        host.set_hotbar_item("steve", 0, ItemStack::new("minecraft:bow", 1));
        assert_eq!(host.held_item("Steve").id, "minecraft:bow");
        assert!(host.quit("sTeVe"));
        assert!(!host.is_online("Steve"));
        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn load_needs_a_world_folder() {
        let (root, mut host) = host_with_world();
        assert!(!host.load_world("missing"));
        assert!(host.load_world("world_sky"));
        host.teleport_to_spawn("Steve", "world_sky");
        host.freeze_time("world_sky", 1000);
        assert_eq!(host.world("world_sky").unwrap().frozen_time, Some(1000));

        host.unload_world("world_sky", false);
        assert!(!host.is_world_loaded("world_sky"));
        assert_eq!(host.player("Steve").unwrap().world, "lobby");

        host.unload_world("lobby", true);
        assert!(host.is_world_loaded("lobby"));
        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn keeps_last_form_per_player() {
        let (root, mut host) = host_with_world();
        host.show_form("Steve", 1, &Form::modal("", "a", "yes", "no"));
        host.show_form("Steve", 2, &Form::modal("", "b", "yes", "no"));
        host.show_form("Alex", 3, &Form::modal("", "c", "yes", "no"));
        assert_eq!(host.last_form("steve").map(|(id, _)| *id), Some(2));
        assert!(host.last_form("Alex").is_none());
        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn plain_strips_colour_codes() {
        assert_eq!(plain("&e[&bSkyWars&e] &rhi"), "[SkyWars] hi");
    }
}
