//! Shared states, events, and save-record types for Duskraid.
//!
//! This is the type contract. Features, the player rig and the host all
//! import from here; no domain reaches into another domain's internals.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE — top-level state machine
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameState {
    #[default]
    None,
    MainMenu,
    Loading,
    Playing,
    Paused,
    GameOver,
}

// ═══════════════════════════════════════════════════════════════════════
// DAY / NIGHT
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DayPhase {
    #[default]
    Day,
    Night,
}

impl DayPhase {
    pub fn flipped(self) -> Self {
        match self {
            DayPhase::Day => DayPhase::Night,
            DayPhase::Night => DayPhase::Day,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// ITEMS
// ═══════════════════════════════════════════════════════════════════════

/// String item ids keep the save blob and the data tables loosely coupled.
pub type ItemId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ItemKind {
    #[default]
    Resource,
    Tool,
    Consumable,
    Material,
    Quest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub kind: ItemKind,
    pub stackable: bool,
    pub max_stack: u32,
    /// Hits needed to fully gather the item from a node; 0 = instant.
    pub hits_to_harvest: u32,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct ItemRegistry {
    pub items: HashMap<ItemId, ItemDef>,
}

impl ItemRegistry {
    pub fn get(&self, id: &str) -> Option<&ItemDef> {
        self.items.get(id)
    }

    /// Display name, falling back to the id for unknown items.
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.get(id).map_or(id, |def| def.name.as_str())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLAYER TRANSFORM
// ═══════════════════════════════════════════════════════════════════════

/// The player's world transform, shared between the host (which moves it)
/// and the persistence feature (which saves and restores it).
pub type SharedTransform = Rc<RefCell<Transform>>;

pub fn shared_transform(transform: Transform) -> SharedTransform {
    Rc::new(RefCell::new(transform))
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS — published on the feature event bus
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameStateEntered {
    pub state: GameState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameStateExited {
    pub state: GameState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayPhaseChanged {
    pub phase: DayPhase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaidStarted;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaidEnded;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceCollected {
    pub item_id: ItemId,
    pub amount: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerDamaged {
    pub amount: i32,
    pub remaining: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerDied;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyDied {
    pub position: Vec3,
}

// ═══════════════════════════════════════════════════════════════════════
// SAVE DATA
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SavedVec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<Vec3> for SavedVec3 {
    fn from(v: Vec3) -> Self {
        Self { x: v.x, y: v.y, z: v.z }
    }
}

impl From<SavedVec3> for Vec3 {
    fn from(v: SavedVec3) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavedQuat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for SavedQuat {
    fn default() -> Self {
        Quat::IDENTITY.into()
    }
}

impl From<Quat> for SavedQuat {
    fn from(q: Quat) -> Self {
        Self { x: q.x, y: q.y, z: q.z, w: q.w }
    }
}

impl From<SavedQuat> for Quat {
    fn from(q: SavedQuat) -> Self {
        Quat::from_xyzw(q.x, q.y, q.z, q.w)
    }
}

/// The persisted save record. Every feature writes its own slice of it in
/// `on_save`; the registry serializes the whole thing under one key.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameData {
    pub has_save: bool,
    pub player_position: SavedVec3,
    pub player_rotation: Option<SavedQuat>,
    /// `None` until the inventory feature has saved at least once.
    pub inventory: Option<HashMap<ItemId, u32>>,
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

/// Preference-store key the save blob lives under.
pub const SAVE_KEY: &str = "save";

/// Fixed physics step used by the headless host (matches the 50 Hz default
/// the tuning values were authored against).
pub const FIXED_STEP_SECONDS: f32 = 0.02;

pub const DEFAULT_GRAVITY: f32 = -9.81;
