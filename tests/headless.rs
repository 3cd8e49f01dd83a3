//! Headless integration tests for Duskraid.
//!
//! These tests drive the full host without a window: `MinimalPlugins` ticks
//! the app, time advances by exactly one fixed step per update, and input
//! comes from a scripted queue, so every run is reproducible.
//!
//! Run with: `cargo test --test headless`

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use duskraid::config::GameConfig;
use duskraid::features::{
    register_default_features, GameStateMachine, InventoryFeature, TimeSystem,
};
use duskraid::player::{InputFrame, ScriptedInput};
use duskraid::runtime::FeatureRegistry;
use duskraid::save::{load_game_data, MemoryPrefs, PrefsStore};
use duskraid::shared::*;
use duskraid::shell::{
    Enemy, EnemyHit, Features, PlayerHit, PlayerRig, PrefsBackend, ResourceField, ShellPlugin,
};

// ─────────────────────────────────────────────────────────────────────────────
// Test App Builder
// ─────────────────────────────────────────────────────────────────────────────

/// Builds the host app with an in-memory store. One `update` advances
/// exactly one fixed step, except the very first, which only runs Startup.
fn build_test_app(config: GameConfig, prefs: MemoryPrefs, script: ScriptedInput) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
        FIXED_STEP_SECONDS as f64,
    )));
    app.add_plugins(ShellPlugin::new(config, PrefsBackend::Memory(prefs)).with_script(script));
    app
}

fn run(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

fn features(app: &App) -> &Features {
    app.world().non_send_resource::<Features>()
}

fn game_state(app: &App) -> GameState {
    features(app)
        .registry
        .get::<GameStateMachine>()
        .map(|machine| machine.current())
        .unwrap_or_default()
}

fn held(app: &App, item: &str) -> u32 {
    features(app)
        .registry
        .get::<InventoryFeature>()
        .map_or(0, |inventory| inventory.amount(item))
}

fn enemy_positions(app: &mut App) -> Vec<Vec3> {
    let mut query = app.world_mut().query_filtered::<&Transform, With<Enemy>>();
    query.iter(app.world()).map(|t| t.translation).collect()
}

/// Waits a few frames, then presses interact once.
fn interact_script() -> ScriptedInput {
    let mut script = ScriptedInput::new();
    script
        .push_repeated(InputFrame::default(), 3)
        .push(InputFrame::interact());
    script
}

// ─────────────────────────────────────────────────────────────────────────────
// Boot
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_headless_boot_reaches_playing() {
    let config = GameConfig::default();
    let node_count = config.world.resource_nodes.len();
    let enemy_count = config.world.enemy_spawns.len();

    let mut app = build_test_app(config, MemoryPrefs::new(), ScriptedInput::new());
    run(&mut app, 3);

    assert_eq!(game_state(&app), GameState::Playing);
    assert_eq!(features(&app).registry.len(), 5);
    assert!(features(&app).registry.is_started());
    assert!(!features(&app).registry.data().has_save, "fresh store has no save");

    assert_eq!(app.world().resource::<ResourceField>().nodes.len(), node_count);
    assert_eq!(enemy_positions(&mut app).len(), enemy_count);
    assert!(!app.world().resource::<ItemRegistry>().items.is_empty());
}

#[test]
fn test_player_settles_on_the_ground() {
    let mut config = GameConfig::default();
    config.world.player_spawn = (0.0, 2.0, 0.0);

    let mut app = build_test_app(config, MemoryPrefs::new(), ScriptedInput::new());
    run(&mut app, 80);

    let rig = app.world().resource::<PlayerRig>();
    assert!(rig.controller.is_grounded());
    assert!(rig.body.position.y.abs() < 1e-3);
}

// ─────────────────────────────────────────────────────────────────────────────
// Interaction and inventory
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_interact_collects_node_into_inventory() {
    let config = GameConfig::default();
    let node_count = config.world.resource_nodes.len();

    let mut app = build_test_app(config, MemoryPrefs::new(), interact_script());
    run(&mut app, 2);
    assert_eq!(held(&app, "wood"), 0);

    run(&mut app, 6);

    // The wood node sits straight ahead of the spawn.
    assert_eq!(held(&app, "wood"), 3);
    let field = app.world().resource::<ResourceField>();
    assert_eq!(field.nodes.len(), node_count - 1, "collected node is removed");
    assert!(field.nodes.values().all(|node| node.item_id != "wood"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Save and load
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_save_on_exit_round_trips_into_a_new_session() {
    let mut script = interact_script();
    script.push_repeated(InputFrame::moving(Vec2::X), 30);

    let mut app = build_test_app(GameConfig::default(), MemoryPrefs::new(), script);
    run(&mut app, 45);
    app.world_mut().send_event(AppExit::Success);
    app.update();

    let blob = features(&app)
        .registry
        .store()
        .get_string(SAVE_KEY)
        .expect("save written on exit");
    let saved: GameData = serde_json::from_str(&blob).unwrap();
    assert!(saved.has_save);
    assert!(saved.player_position.x > 0.5, "player walked right before saving");
    assert_eq!(saved.inventory.as_ref().and_then(|items| items.get("wood")), Some(&3));

    // A new session over the same blob picks up where the last one stopped.
    let mut next = build_test_app(
        GameConfig::default(),
        MemoryPrefs::new().with_entry(SAVE_KEY, blob),
        ScriptedInput::new(),
    );
    next.update();

    assert_eq!(held(&next, "wood"), 3);
    let restored = next.world().resource::<PlayerRig>().body.position;
    assert!(restored.abs_diff_eq(saved.player_position.into(), 1e-4));
}

#[test]
fn test_corrupt_save_starts_a_fresh_session() {
    let prefs = MemoryPrefs::new().with_entry(SAVE_KEY, "{ not json");
    let mut app = build_test_app(GameConfig::default(), prefs, ScriptedInput::new());
    run(&mut app, 2);

    assert_eq!(features(&app).registry.data(), &GameData::default());
    assert_eq!(game_state(&app), GameState::Playing);
    assert_eq!(held(&app, "wood"), 0);
}

#[test]
fn test_registry_round_trip_without_host() {
    let player = shared_transform(Transform::default());
    let mut registry = FeatureRegistry::new(Box::new(MemoryPrefs::new()));
    register_default_features(&mut registry, player.clone(), 10.0, 5.0);
    registry.start();

    player.borrow_mut().translation = Vec3::new(4.0, 0.0, -2.0);
    if let Some(inventory) = registry.get_mut::<InventoryFeature>() {
        inventory.add_item("stone", 7);
    }
    registry.save().unwrap();

    let data = load_game_data(registry.store(), SAVE_KEY);
    assert!(data.has_save);

    let blob = registry.store().get_string(SAVE_KEY).unwrap();
    let restored_player = shared_transform(Transform::default());
    let mut restored = FeatureRegistry::new(Box::new(MemoryPrefs::new().with_entry(SAVE_KEY, blob)));
    register_default_features(&mut restored, restored_player.clone(), 10.0, 5.0);
    restored.start();

    assert_eq!(restored_player.borrow().translation, Vec3::new(4.0, 0.0, -2.0));
    assert_eq!(
        restored.get::<InventoryFeature>().map(|inv| inv.amount("stone")),
        Some(7)
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Damage, death and raids
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_fatal_hit_ends_the_game() {
    let mut app = build_test_app(GameConfig::default(), MemoryPrefs::new(), ScriptedInput::new());
    run(&mut app, 2);

    let damaged = Rc::new(Cell::new(0));
    let counter = damaged.clone();
    features(&app)
        .registry
        .bus()
        .subscribe(move |_: &PlayerDamaged| counter.set(counter.get() + 1));

    app.world_mut().send_event(PlayerHit { amount: 3 });
    run(&mut app, 2);
    assert_eq!(damaged.get(), 1);
    assert_eq!(
        app.world().resource::<PlayerRig>().controller.health().current(),
        7
    );

    // Still inside the hit invulnerability window: ignored.
    app.world_mut().send_event(PlayerHit { amount: 3 });
    run(&mut app, 2);
    assert_eq!(damaged.get(), 1);

    run(&mut app, 30);
    app.world_mut().send_event(PlayerHit { amount: 100 });
    run(&mut app, 3);

    let rig = app.world().resource::<PlayerRig>();
    assert!(rig.controller.is_dead());
    assert!(!rig.body.collider_enabled());
    assert_eq!(game_state(&app), GameState::GameOver);
}

#[test]
fn test_short_days_raise_and_end_raids() {
    let mut config = GameConfig::default();
    config.day_night.day_length = 0.1;
    config.day_night.night_length = 0.1;

    let mut app = build_test_app(config, MemoryPrefs::new(), ScriptedInput::new());
    let started = Rc::new(Cell::new(0));
    let ended = Rc::new(Cell::new(0));
    {
        let bus = features(&app).registry.bus();
        let s = started.clone();
        bus.subscribe(move |_: &RaidStarted| s.set(s.get() + 1));
        let e = ended.clone();
        bus.subscribe(move |_: &RaidEnded| e.set(e.get() + 1));
    }

    run(&mut app, 8);
    assert_eq!(started.get(), 1);
    assert_eq!(ended.get(), 0);
    let phase = features(&app).registry.get::<TimeSystem>().map(|t| t.phase());
    assert_eq!(phase, Some(DayPhase::Night));

    run(&mut app, 6);
    assert_eq!(ended.get(), 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Enemies
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_enemy_killed_by_hits_is_despawned() {
    let mut app = build_test_app(GameConfig::default(), MemoryPrefs::new(), ScriptedInput::new());
    run(&mut app, 2);

    let died = Rc::new(Cell::new(0));
    let counter = died.clone();
    features(&app)
        .registry
        .bus()
        .subscribe(move |_: &EnemyDied| counter.set(counter.get() + 1));

    let target = {
        let mut query = app.world_mut().query_filtered::<Entity, With<Enemy>>();
        query.iter(app.world()).next().expect("enemies spawned")
    };

    app.world_mut().send_event(EnemyHit { enemy: target, amount: 4 });
    run(&mut app, 2);
    assert!(app.world().get::<Enemy>(target).is_some_and(|e| e.0.is_stunned()));
    assert_eq!(died.get(), 0);

    app.world_mut().send_event(EnemyHit { enemy: target, amount: 100 });
    run(&mut app, 2);
    assert_eq!(died.get(), 1);
    assert!(app.world().get::<Enemy>(target).is_none());
    assert_eq!(enemy_positions(&mut app).len(), 1);
}

#[test]
fn test_patrols_are_deterministic_and_stay_in_the_arena() {
    let mut first = build_test_app(GameConfig::default(), MemoryPrefs::new(), ScriptedInput::new());
    let mut second = build_test_app(GameConfig::default(), MemoryPrefs::new(), ScriptedInput::new());
    run(&mut first, 300);
    run(&mut second, 300);

    let a = enemy_positions(&mut first);
    let b = enemy_positions(&mut second);
    assert_eq!(a, b, "same seed, same patrol");

    let half = GameConfig::default().world.arena_half_extent;
    assert!(a.iter().all(|p| p.x.abs() <= half && p.z.abs() <= half));
}
