//! JSON file persistence for arena configs, NPC anchors and player stats.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use skywars_api::{
    AnchorStore, Arena, ArenaStore, NpcAnchor, PlayerKey, PlayerRecord, StatsDatabase, StoreError,
};

/// Read and parse a JSON file. A missing file is `Ok(None)`.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_str(&data)?))
}

/// Write pretty JSON, creating parent directories.
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}

// ─── Arenas ─────────────────────────────────────────────────────────────────

/// One `<name>.json` per arena.
pub struct JsonArenaStore {
    dir: PathBuf,
}

impl JsonArenaStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }
}

impl ArenaStore for JsonArenaStore {
    fn get(&self, name: &str) -> Result<Option<Arena>, StoreError> {
        read_json(&self.path(name))
    }

    fn put(&mut self, arena: &Arena) -> Result<(), StoreError> {
        write_json(&self.path(&arena.name), arena)
    }

    fn delete(&mut self, name: &str) -> Result<(), StoreError> {
        match std::fs::remove_file(self.path(name)) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    fn list(&self) -> Result<Vec<Arena>, StoreError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut arenas = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match read_json::<Arena>(&path) {
                Ok(Some(arena)) => arenas.push(arena),
                Ok(None) => {}
                Err(e) => warn!("Skipping unreadable arena file {}: {e}", path.display()),
            }
        }
        arenas.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(arenas)
    }
}

// ─── NPC anchors ────────────────────────────────────────────────────────────

/// All three anchors in one `npc.json`, keyed by index.
pub struct JsonAnchorStore {
    path: PathBuf,
}

impl JsonAnchorStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<BTreeMap<u32, NpcAnchor>, StoreError> {
        Ok(read_json(&self.path)?.unwrap_or_default())
    }
}

impl AnchorStore for JsonAnchorStore {
    fn set_anchor(&mut self, index: u32, anchor: NpcAnchor) -> Result<(), StoreError> {
        let mut anchors = self.load()?;
        anchors.insert(index, anchor);
        write_json(&self.path, &anchors)
    }

    fn anchors(&self) -> Result<Vec<(u32, NpcAnchor)>, StoreError> {
        Ok(self.load()?.into_iter().collect())
    }
}

// ─── Player stats ───────────────────────────────────────────────────────────

/// One `<lowercase name>.json` per player.
pub struct JsonStatsDatabase {
    dir: PathBuf,
}

impl JsonStatsDatabase {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, player: &str) -> PathBuf {
        self.dir.join(format!("{}.json", PlayerKey::new(player)))
    }

    #[cfg(test)]
    fn save(&self, record: &PlayerRecord) -> Result<(), StoreError> {
        write_json(&self.path(&record.player), record)
    }
}

impl StatsDatabase for JsonStatsDatabase {
    fn player_data(&self, player: &str) -> Result<PlayerRecord, StoreError> {
        let fresh = || PlayerRecord {
            player: player.to_string(),
            ..Default::default()
        };
        match read_json(&self.path(player)) {
            Ok(record) => Ok(record.unwrap_or_else(fresh)),
            Err(StoreError::Json(e)) => {
                warn!("Failed to parse stats for {player}: {e}");
                Ok(fresh())
            }
            Err(e) => Err(e),
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
