use bevy::prelude::*;

use super::{
    ArenaBounds, Enemy, EnemyHit, EnemyRng, Features, PlayerHit, PlayerRig, ResetHooks,
    ResourceField,
};
use crate::config::GameConfig;
use crate::enemy::PatrolEnemy;
use crate::features::InventoryFeature;
use crate::interaction::{ResourceNode, SphereCastProbe};
use crate::player::DamageOutcome;
use crate::shared::*;

// ═══════════════════════════════════════════════════════════════════════
// STARTUP
// ═══════════════════════════════════════════════════════════════════════

pub fn run_reset_hooks(world: &mut World) {
    world.resource_scope(|world, mut hooks: Mut<ResetHooks>| {
        let report = hooks.0.reset_all(world);
        if !report.failed.is_empty() {
            warn!("[Shell] Starting with stale state from: {}", report.failed.join(", "));
        }
    });
}

pub fn spawn_world(
    mut commands: Commands,
    config: Res<GameConfig>,
    arena: Res<ArenaBounds>,
    items: Res<ItemRegistry>,
    mut rng: ResMut<EnemyRng>,
    mut field: ResMut<ResourceField>,
) {
    for &spawn in &config.world.enemy_spawns {
        let position = Vec3::from(spawn);
        let enemy = PatrolEnemy::new(config.enemy.clone(), position, &*arena, &mut rng.0);
        commands.spawn((Enemy(enemy), Transform::from_translation(position)));
    }

    for spawn in &config.world.resource_nodes {
        let name = items.display_name(&spawn.item_id).to_string();
        field.insert(ResourceNode::new(
            spawn.item_id.clone(),
            name,
            spawn.amount,
            Vec3::from(spawn.position),
        ));
    }

    info!(
        "[Shell] Spawned {} enemies and {} resource nodes",
        config.world.enemy_spawns.len(),
        field.nodes.len()
    );
}

/// Starts the registry, then moves the rig to wherever the save put the
/// player.
pub fn start_features(mut features: NonSendMut<Features>, mut rig: ResMut<PlayerRig>) {
    features.registry.start();

    let restored = *features.player.borrow();
    rig.body.position = restored.translation;
    rig.controller.set_model_rotation(restored.rotation);
}

// ═══════════════════════════════════════════════════════════════════════
// UPDATE
// ═══════════════════════════════════════════════════════════════════════

pub fn read_player_input(time: Res<Time>, mut rig: ResMut<PlayerRig>) {
    let rig = &mut *rig;
    let camera = rig.camera();
    rig.controller.update(time.delta_secs(), &mut rig.input, &camera);
}

/// Re-aims the detector, uses the hovered node on an interact press and
/// drops nodes that were used up.
pub fn update_interaction(
    mut field: ResMut<ResourceField>,
    rig: Res<PlayerRig>,
    features: NonSend<Features>,
) {
    let field = &mut *field;
    let camera = rig.camera();
    let probe = SphereCastProbe::from_targets(&field.nodes);
    let inventory = features.registry.get::<InventoryFeature>();
    field
        .detector
        .update(&camera, &probe, &mut field.nodes, inventory);

    if !rig.controller.input().interact_pressed() {
        return;
    }
    if field
        .detector
        .try_interact(&mut field.nodes, features.registry.bus())
    {
        field.detector.clear_hover(&mut field.nodes);
        field.nodes.retain(|_, node| !node.should_despawn());
    }
}

// ═══════════════════════════════════════════════════════════════════════
// FIXED UPDATE
// ═══════════════════════════════════════════════════════════════════════

pub fn tick_features(time: Res<Time>, mut features: NonSendMut<Features>) {
    features.registry.tick(time.delta_secs());
}

pub fn step_player(
    time: Res<Time>,
    mut rig: ResMut<PlayerRig>,
    mut hits: EventReader<PlayerHit>,
    features: NonSend<Features>,
) {
    let dt = time.delta_secs();
    let rig = &mut *rig;
    let bus = features.registry.bus();

    for hit in hits.read() {
        match rig
            .controller
            .take_damage(hit.amount, &mut rig.body, &mut rig.animator)
        {
            DamageOutcome::Ignored => {}
            DamageOutcome::Damaged { remaining } => bus.publish(PlayerDamaged {
                amount: hit.amount,
                remaining,
            }),
            DamageOutcome::Died => {
                bus.publish(PlayerDamaged {
                    amount: hit.amount,
                    remaining: 0,
                });
                bus.publish(PlayerDied);
            }
        }
    }

    let camera = rig.camera();
    rig.controller
        .fixed_update(dt, &mut rig.body, &mut rig.animator, &camera);
    if rig.controller.is_active() {
        rig.body.integrate(dt);
    }

    let mut shared = features.player.borrow_mut();
    shared.translation = rig.body.position;
    shared.rotation = rig.controller.model_rotation();
}

pub fn step_enemies(
    time: Res<Time>,
    rig: Res<PlayerRig>,
    arena: Res<ArenaBounds>,
    mut rng: ResMut<EnemyRng>,
    mut enemies: Query<(&mut Transform, &mut Enemy)>,
) {
    let dt = time.delta_secs();
    let player = rig.body.position;

    for (mut transform, mut enemy) in &mut enemies {
        enemy
            .0
            .fixed_update(dt, transform.translation, Some(player), &*arena, &mut rng.0);
        let next = transform.translation + enemy.0.velocity() * dt;
        transform.translation = arena.clamp(next);
    }
}

pub fn apply_enemy_hits(
    mut commands: Commands,
    mut hits: EventReader<EnemyHit>,
    mut enemies: Query<(&Transform, &mut Enemy)>,
    features: NonSend<Features>,
) {
    for hit in hits.read() {
        let Ok((transform, mut enemy)) = enemies.get_mut(hit.enemy) else {
            continue;
        };
        if enemy.0.apply_damage(hit.amount) {
            features.registry.bus().publish(EnemyDied {
                position: transform.translation,
            });
            commands.entity(hit.enemy).despawn();
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// LAST
// ═══════════════════════════════════════════════════════════════════════

/// Saves once when an `AppExit` arrives. A failed save is reported and the
/// exit goes ahead.
pub fn save_on_exit(mut exits: EventReader<AppExit>, mut features: NonSendMut<Features>) {
    if exits.is_empty() {
        return;
    }
    exits.clear();

    match features.registry.save() {
        Ok(()) => info!("[Shell] Game saved on exit"),
        Err(e) => error!("[Shell] Save on exit failed: {}", e),
    }
}
