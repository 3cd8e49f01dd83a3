//! Platform key-value preference stores and the save-blob codec.
//!
//! The whole `GameData` record is one pretty-printed JSON string stored under
//! a single key. Native builds keep one `<key>.json` per key in a directory;
//! browser builds use `localStorage`.

use bevy::prelude::*;
use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::fs;
#[cfg(not(target_arch = "wasm32"))]
use std::path::{Path, PathBuf};

use crate::shared::GameData;

// ═══════════════════════════════════════════════════════════════════════
// STORE TRAIT
// ═══════════════════════════════════════════════════════════════════════

/// String key-value persistence, the shape of an engine preference store.
pub trait PrefsStore {
    fn get_string(&self, key: &str) -> Option<String>;
    fn set_string(&mut self, key: &str, value: &str) -> Result<(), String>;

    fn has_key(&self, key: &str) -> bool {
        self.get_string(key).is_some()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// IN-MEMORY STORE
// ═══════════════════════════════════════════════════════════════════════

/// Volatile store, used by tests and by hosts that do not persist.
#[derive(Debug, Clone, Default)]
pub struct MemoryPrefs {
    entries: HashMap<String, String>,
}

impl MemoryPrefs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }
}

impl PrefsStore for MemoryPrefs {
    fn get_string(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set_string(&mut self, key: &str, value: &str) -> Result<(), String> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// FILESYSTEM STORE (native)
// ═══════════════════════════════════════════════════════════════════════

/// `saves/` next to the executable, falling back to the working directory.
#[cfg(not(target_arch = "wasm32"))]
pub fn default_saves_directory() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));
    exe_dir.join("saves")
}

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FilePrefs {
    dir: PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FilePrefs {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl PrefsStore for FilePrefs {
    fn get_string(&self, key: &str) -> Option<String> {
        let path = self.key_path(key);
        match fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!("[Prefs] Read failed for {}: {}", path.display(), e);
                None
            }
        }
    }

    fn set_string(&mut self, key: &str, value: &str) -> Result<(), String> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|e| {
                format!("Could not create {}: {}", self.dir.display(), e)
            })?;
        }

        let path = self.key_path(key);
        // Write to a temp file first, then rename for atomicity
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, value)
            .map_err(|e| format!("Write failed for {}: {}", tmp_path.display(), e))?;
        fs::rename(&tmp_path, &path).map_err(|e| format!("Rename failed: {}", e))?;
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// BROWSER STORE (wasm32)
// ═══════════════════════════════════════════════════════════════════════

#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStoragePrefs;

#[cfg(target_arch = "wasm32")]
impl LocalStoragePrefs {
    fn storage() -> Result<web_sys::Storage, String> {
        web_sys::window()
            .ok_or_else(|| "No window".to_string())?
            .local_storage()
            .map_err(|_| "localStorage access denied".to_string())?
            .ok_or_else(|| "localStorage unavailable".to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl PrefsStore for LocalStoragePrefs {
    fn get_string(&self, key: &str) -> Option<String> {
        Self::storage().ok()?.get_item(key).ok().flatten()
    }

    fn set_string(&mut self, key: &str, value: &str) -> Result<(), String> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|_| format!("localStorage write failed for {}", key))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SAVE BLOB
// ═══════════════════════════════════════════════════════════════════════

/// Reads the save record. Never fails: an absent blob or one that does not
/// parse yields the empty record.
pub fn load_game_data(store: &dyn PrefsStore, key: &str) -> GameData {
    let Some(json) = store.get_string(key) else {
        info!("[Save] No save under '{}', starting fresh.", key);
        return GameData::default();
    };

    match serde_json::from_str::<GameData>(&json) {
        Ok(data) => {
            info!("[Save] Loaded save '{}' (has_save: {}).", key, data.has_save);
            data
        }
        Err(e) => {
            warn!("[Save] Save '{}' is unreadable, using defaults: {}", key, e);
            GameData::default()
        }
    }
}

pub fn write_game_data(
    store: &mut dyn PrefsStore,
    key: &str,
    data: &GameData,
) -> Result<(), String> {
    let json =
        serde_json::to_string_pretty(data).map_err(|e| format!("Serialization failed: {}", e))?;
    store.set_string(key, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::SavedVec3;

    #[test]
    fn test_missing_blob_gives_empty_record() {
        let store = MemoryPrefs::new();
        assert_eq!(load_game_data(&store, "save"), GameData::default());
    }

    #[test]
    fn test_corrupt_blob_gives_empty_record() {
        let store = MemoryPrefs::new().with_entry("save", "{ not json");
        assert_eq!(load_game_data(&store, "save"), GameData::default());
    }

    #[test]
    fn test_empty_object_decodes_to_empty_record() {
        let store = MemoryPrefs::new().with_entry("save", "{}");
        assert_eq!(load_game_data(&store, "save"), GameData::default());
    }

    #[test]
    fn test_write_then_load() {
        let mut store = MemoryPrefs::new();
        let mut data = GameData::default();
        data.has_save = true;
        data.player_position = SavedVec3 { x: 1.0, y: 2.0, z: -3.5 };
        data.inventory = Some(HashMap::from([("wood".to_string(), 4)]));

        write_game_data(&mut store, "save", &data).unwrap();
        assert!(store.has_key("save"));
        assert_eq!(load_game_data(&store, "save"), data);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_file_prefs_writes_one_file_per_key() {
        let dir = std::env::temp_dir().join(format!("duskraid_prefs_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);

        let mut store = FilePrefs::new(&dir);
        assert_eq!(store.get_string("save"), None);

        store.set_string("save", "{\"has_save\":true}").unwrap();
        assert!(dir.join("save.json").exists());
        assert!(!dir.join("save.json.tmp").exists(), "temp file is renamed away");
        assert_eq!(
            store.get_string("save").as_deref(),
            Some("{\"has_save\":true}")
        );

        let _ = fs::remove_dir_all(&dir);
    }
}
