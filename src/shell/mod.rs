//! Bevy host for the feature runtime.
//!
//! `ShellPlugin` owns the `FeatureRegistry` as a non-send resource and drives
//! it from the schedule: reset hooks and `start` at Startup, input and
//! interaction in Update, feature ticks and physics in FixedUpdate, and the
//! save in Last when the app is asked to exit. Player, enemies and resource
//! nodes run against a flat arena so the whole loop works headless.

mod arena;
mod body;
mod systems;

pub use arena::ArenaBounds;
pub use body::{KinematicBody, STANDING_CAPSULE};
pub use systems::*;

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

use crate::config::{GameConfig, SaveConfig};
use crate::data::DataPlugin;
use crate::enemy::PatrolEnemy;
use crate::features::register_default_features;
use crate::interaction::{InteractionDetector, InteractionSettings, ResourceNode, TargetId};
use crate::player::{CameraBasis, CharacterTuning, PlayerController, RecordingAnimator, ScriptedInput};
use crate::runtime::{FeatureRegistry, ResetRegistry};
use crate::save::{MemoryPrefs, PrefsStore};
use crate::shared::*;

/// Camera height above the player's feet.
pub const EYE_HEIGHT: f32 = 1.5;

// ═══════════════════════════════════════════════════════════════════════
// PREFERENCE BACKENDS
// ═══════════════════════════════════════════════════════════════════════

/// Which store the registry's save record lives in.
#[derive(Debug, Clone)]
pub enum PrefsBackend {
    Memory(MemoryPrefs),
    #[cfg(not(target_arch = "wasm32"))]
    Files(PathBuf),
    #[cfg(target_arch = "wasm32")]
    LocalStorage,
}

impl PrefsBackend {
    /// The platform store, honoring a configured save directory.
    pub fn from_config(save: &SaveConfig) -> Self {
        #[cfg(not(target_arch = "wasm32"))]
        {
            let dir = save
                .directory
                .as_ref()
                .map(PathBuf::from)
                .unwrap_or_else(crate::save::default_saves_directory);
            Self::Files(dir)
        }
        #[cfg(target_arch = "wasm32")]
        {
            let _ = save;
            Self::LocalStorage
        }
    }

    pub fn open(&self) -> Box<dyn PrefsStore> {
        match self {
            Self::Memory(prefs) => Box::new(prefs.clone()),
            #[cfg(not(target_arch = "wasm32"))]
            Self::Files(dir) => Box::new(crate::save::FilePrefs::new(dir.clone())),
            #[cfg(target_arch = "wasm32")]
            Self::LocalStorage => Box::new(crate::save::LocalStoragePrefs),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// RESOURCES, COMPONENTS, EVENTS
// ═══════════════════════════════════════════════════════════════════════

/// The feature registry plus the player transform it shares with
/// `PlayerFeature`. Non-send: both hold `Rc`s.
pub struct Features {
    pub registry: FeatureRegistry,
    pub player: SharedTransform,
}

/// The controlled character and everything it is wired to.
#[derive(Resource)]
pub struct PlayerRig {
    pub controller: PlayerController,
    pub body: KinematicBody,
    pub animator: RecordingAnimator,
    pub input: ScriptedInput,
    /// Radians about +Y; zero looks down -Z.
    pub camera_yaw: f32,
    tuning: CharacterTuning,
    spawn: Vec3,
}

impl PlayerRig {
    pub fn new(tuning: CharacterTuning, spawn: Vec3, input: ScriptedInput) -> Self {
        Self {
            controller: PlayerController::new(tuning.clone()),
            body: KinematicBody::new(spawn, &tuning),
            animator: RecordingAnimator::default(),
            input,
            camera_yaw: 0.0,
            tuning,
            spawn,
        }
    }

    pub fn camera(&self) -> CameraBasis {
        CameraBasis::from_yaw(self.body.position + Vec3::Y * EYE_HEIGHT, self.camera_yaw)
    }

    /// Fresh controller, body and animator at the spawn point. Queued input
    /// and the camera are kept.
    pub fn reset(&mut self) {
        self.controller = PlayerController::new(self.tuning.clone());
        self.body = KinematicBody::new(self.spawn, &self.tuning);
        self.animator = RecordingAnimator::default();
    }
}

/// Resource nodes by stable id, and the detector aiming at them.
#[derive(Resource, Default)]
pub struct ResourceField {
    pub nodes: HashMap<TargetId, ResourceNode>,
    pub detector: InteractionDetector,
    next_id: TargetId,
}

impl ResourceField {
    pub fn new(settings: InteractionSettings) -> Self {
        Self {
            nodes: HashMap::new(),
            detector: InteractionDetector::new(settings),
            next_id: 1,
        }
    }

    pub fn insert(&mut self, node: ResourceNode) -> TargetId {
        let id = self.next_id;
        self.next_id += 1;
        self.nodes.insert(id, node);
        id
    }
}

#[derive(Component, Debug, Clone)]
pub struct Enemy(pub PatrolEnemy);

#[derive(Resource)]
pub struct EnemyRng(pub StdRng);

#[derive(Resource, Default)]
pub struct ResetHooks(pub ResetRegistry<World>);

/// Damage dealt to the player from outside the controller.
#[derive(Event, Debug, Clone, Copy)]
pub struct PlayerHit {
    pub amount: i32,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct EnemyHit {
    pub enemy: Entity,
    pub amount: i32,
}

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct ShellPlugin {
    pub config: GameConfig,
    pub prefs: PrefsBackend,
    pub script: ScriptedInput,
}

impl ShellPlugin {
    pub fn new(config: GameConfig, prefs: PrefsBackend) -> Self {
        Self {
            config,
            prefs,
            script: ScriptedInput::new(),
        }
    }

    pub fn with_script(mut self, script: ScriptedInput) -> Self {
        self.script = script;
        self
    }
}

impl Plugin for ShellPlugin {
    fn build(&self, app: &mut App) {
        let config = self.config.clone();
        let spawn = Vec3::from(config.world.player_spawn);

        let player = shared_transform(Transform::from_translation(spawn));
        let mut registry = FeatureRegistry::with_save_key(self.prefs.open(), config.save.key.clone());
        register_default_features(
            &mut registry,
            player.clone(),
            config.day_night.day_length,
            config.day_night.night_length,
        );

        app.add_plugins(DataPlugin)
            .insert_resource(Time::<Fixed>::from_seconds(FIXED_STEP_SECONDS as f64))
            .insert_resource(ArenaBounds::new(config.world.arena_half_extent))
            .insert_resource(EnemyRng(StdRng::seed_from_u64(config.seed)))
            .insert_resource(PlayerRig::new(config.character.clone(), spawn, self.script.clone()))
            .insert_resource(ResourceField::new(config.interaction.clone()))
            .insert_resource(default_reset_hooks(config.seed))
            .insert_non_send_resource(Features { registry, player })
            .insert_resource(config)
            .add_event::<PlayerHit>()
            .add_event::<EnemyHit>()
            .add_systems(Startup, (run_reset_hooks, spawn_world, start_features).chain())
            .add_systems(Update, (read_player_input, update_interaction).chain())
            .add_systems(
                FixedUpdate,
                (tick_features, step_player, step_enemies, apply_enemy_hits).chain(),
            )
            .add_systems(Last, save_on_exit);
    }
}

/// Hooks that put the shell's own resources back to a fresh session.
fn default_reset_hooks(seed: u64) -> ResetHooks {
    let mut hooks = ResetHooks::default();
    hooks.0.register("player_rig", 0, |world: &mut World| {
        let mut rig = world
            .get_resource_mut::<PlayerRig>()
            .ok_or_else(|| "PlayerRig missing".to_string())?;
        rig.reset();
        Ok(())
    });
    hooks.0.register("resource_field", 10, |world: &mut World| {
        let mut field = world
            .get_resource_mut::<ResourceField>()
            .ok_or_else(|| "ResourceField missing".to_string())?;
        let field = &mut *field;
        field.detector.clear_hover(&mut field.nodes);
        Ok(())
    });
    hooks.0.register("enemy_rng", 20, move |world: &mut World| {
        world.insert_resource(EnemyRng(StdRng::seed_from_u64(seed)));
        Ok(())
    });
    hooks
}
