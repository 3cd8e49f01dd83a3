use serde::{Deserialize, Serialize};

use crate::shared::DEFAULT_GRAVITY;

/// Authoring values for the player character. Times are in seconds, speeds
/// in units per second, `rotation_speed` in degrees per second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterTuning {
    // Movement
    pub move_speed: f32,
    pub rotation_speed: f32,
    pub acceleration_time: f32,
    pub deceleration_time: f32,

    // Jump
    pub jump_force: f32,
    /// Vertical speed is multiplied by this when jump is released early.
    pub jump_cut_multiplier: f32,
    pub coyote_time: f32,
    pub jump_buffer_time: f32,
    pub jump_cooldown: f32,

    // Gravity shaping
    pub fall_gravity_multiplier: f32,
    /// Below 1.0 softens the arc while |vy| is under `apex_threshold`.
    pub apex_gravity_multiplier: f32,
    pub apex_threshold: f32,
    pub max_fall_speed: f32,
    pub gravity: f32,

    // Roll
    pub roll_speed: f32,
    pub roll_duration: f32,
    pub roll_cooldown: f32,
    pub roll_invulnerable_time: f32,

    // Health
    pub max_health: i32,
    pub invulnerable_on_hit: f32,

    // Collider in air
    pub air_collider_height_mul: f32,
    pub ground_check_air_offset: f32,
}

impl Default for CharacterTuning {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            rotation_speed: 720.0,
            acceleration_time: 0.1,
            deceleration_time: 0.25,

            jump_force: 5.0,
            jump_cut_multiplier: 0.35,
            coyote_time: 0.12,
            jump_buffer_time: 0.15,
            jump_cooldown: 0.8,

            fall_gravity_multiplier: 2.5,
            apex_gravity_multiplier: 0.5,
            apex_threshold: 1.5,
            max_fall_speed: 25.0,
            gravity: DEFAULT_GRAVITY,

            roll_speed: 14.0,
            roll_duration: 0.35,
            roll_cooldown: 0.8,
            roll_invulnerable_time: 0.25,

            max_health: 10,
            invulnerable_on_hit: 0.5,

            air_collider_height_mul: 0.7,
            ground_check_air_offset: -0.05,
        }
    }
}
