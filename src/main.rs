use std::time::Duration;

use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

use duskraid::config::{GameConfig, DEFAULT_CONFIG_PATH};
use duskraid::player::{InputFrame, ScriptedInput};
use duskraid::shared::{GameData, FIXED_STEP_SECONDS};
use duskraid::shell::{Features, PlayerRig, PrefsBackend, ResourceField, ShellPlugin};

/// Frames to simulate when no count is given on the command line.
const DEFAULT_FRAMES: u32 = 600;

fn main() {
    let frames = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<u32>().ok())
        .unwrap_or(DEFAULT_FRAMES);

    let config = GameConfig::load(DEFAULT_CONFIG_PATH);
    let prefs = PrefsBackend::from_config(&config.save);

    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(LogPlugin::default())
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
            FIXED_STEP_SECONDS as f64,
        )))
        .add_plugins(ShellPlugin::new(config, prefs).with_script(demo_script()));

    for frame in 0..frames {
        app.update();

        if frame % 100 == 0 {
            let rig = app.world().resource::<PlayerRig>();
            let nodes = app.world().resource::<ResourceField>().nodes.len();
            info!(
                "[Main] Frame {}: player at {:?}, health {}, {} nodes left",
                frame,
                rig.body.position,
                rig.controller.health().current(),
                nodes
            );
        }
    }

    app.world_mut().send_event(AppExit::Success);
    app.update();

    let features = app.world().non_send_resource::<Features>();
    log_summary(features.registry.data());
}

/// Gathers the wood ahead of the spawn, then walks, jumps and rolls.
fn demo_script() -> ScriptedInput {
    let mut script = ScriptedInput::new();
    script
        .push_repeated(InputFrame::default(), 10)
        .push(InputFrame::interact())
        .push_repeated(InputFrame::moving(Vec2::X), 40)
        .push(InputFrame::jump_press())
        .push_repeated(InputFrame::jump_hold(), 20)
        .push_repeated(InputFrame::moving(Vec2::Y), 30)
        .push(InputFrame::roll())
        .push_repeated(InputFrame::moving(Vec2::new(-1.0, 0.5)), 60);
    script
}

fn log_summary(data: &GameData) {
    info!(
        "[Main] Saved: has_save={} position={:?} items={}",
        data.has_save,
        data.player_position,
        data.inventory.as_ref().map_or(0, |items| items.len())
    );
}
