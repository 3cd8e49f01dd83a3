//! Game configuration, read once at startup from a RON file.
//!
//! Every field has a default, so a partial file only overrides what it
//! names. A missing file is normal; a malformed one is reported and ignored.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::enemy::EnemyTuning;
use crate::features::{DEFAULT_DAY_LENGTH, DEFAULT_NIGHT_LENGTH};
use crate::interaction::InteractionSettings;
use crate::player::CharacterTuning;
use crate::shared::SAVE_KEY;

pub const DEFAULT_CONFIG_PATH: &str = "config/game.ron";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayNightConfig {
    pub day_length: f32,
    pub night_length: f32,
}

impl Default for DayNightConfig {
    fn default() -> Self {
        Self {
            day_length: DEFAULT_DAY_LENGTH,
            night_length: DEFAULT_NIGHT_LENGTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveConfig {
    pub key: String,
    /// Native save directory; `None` means `saves/` next to the executable.
    pub directory: Option<String>,
}

impl Default for SaveConfig {
    fn default() -> Self {
        Self {
            key: SAVE_KEY.to_string(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpawn {
    pub item_id: String,
    pub amount: u32,
    pub position: (f32, f32, f32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// The arena is the square [-half_extent, half_extent] on x and z.
    pub arena_half_extent: f32,
    pub player_spawn: (f32, f32, f32),
    pub enemy_spawns: Vec<(f32, f32, f32)>,
    pub resource_nodes: Vec<NodeSpawn>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            arena_half_extent: 20.0,
            player_spawn: (0.0, 0.0, 0.0),
            enemy_spawns: vec![(6.0, 0.0, -6.0), (-8.0, 0.0, 4.0)],
            resource_nodes: vec![
                NodeSpawn {
                    item_id: "wood".into(),
                    amount: 3,
                    position: (0.0, 1.5, -2.0),
                },
                NodeSpawn {
                    item_id: "stone".into(),
                    amount: 2,
                    position: (3.0, 1.5, -3.0),
                },
            ],
        }
    }
}

#[derive(Resource, Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub character: CharacterTuning,
    pub enemy: EnemyTuning,
    pub day_night: DayNightConfig,
    pub interaction: InteractionSettings,
    pub save: SaveConfig,
    pub world: WorldConfig,
    /// Seeds the enemy RNG so headless runs are reproducible.
    pub seed: u64,
}

impl GameConfig {
    pub fn from_ron_str(text: &str) -> Result<Self, String> {
        ron::from_str(text).map_err(|e| format!("Config parse failed: {}", e))
    }

    /// Never fails: falls back to defaults when the file is absent or bad.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("[Config] {} not found, using defaults.", path.display());
                return Self::default();
            }
            Err(e) => {
                warn!("[Config] Could not read {}: {}. Using defaults.", path.display(), e);
                return Self::default();
            }
        };

        match Self::from_ron_str(&text) {
            Ok(config) => {
                info!("[Config] Loaded {}", path.display());
                config
            }
            Err(e) => {
                warn!("[Config] {} in {}. Using defaults.", e, path.display());
                Self::default()
            }
        }
    }

    pub fn to_ron_string(&self) -> Result<String, String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::new())
            .map_err(|e| format!("Config serialization failed: {}", e))
    }
}
