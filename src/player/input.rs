//! Input seam and the camera-relative input handler.
//!
//! The handler turns raw device state into commands: a world-space move
//! direction, jump press/hold/release edges, and roll and interact presses. It knows
//! nothing about what the character is allowed to do.

use bevy::prelude::*;
use std::collections::VecDeque;

/// One poll of the input device.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputFrame {
    /// x = right, y = forward, each in [-1, 1].
    pub move_axis: Vec2,
    pub jump_held: bool,
    /// Jump went down this frame.
    pub jump_triggered: bool,
    pub roll_triggered: bool,
    pub interact_triggered: bool,
}

impl InputFrame {
    pub fn moving(axis: Vec2) -> Self {
        Self {
            move_axis: axis,
            ..default()
        }
    }

    pub fn jump_press() -> Self {
        Self {
            jump_held: true,
            jump_triggered: true,
            ..default()
        }
    }

    pub fn jump_hold() -> Self {
        Self {
            jump_held: true,
            ..default()
        }
    }

    pub fn roll() -> Self {
        Self {
            roll_triggered: true,
            ..default()
        }
    }

    pub fn interact() -> Self {
        Self {
            interact_triggered: true,
            ..default()
        }
    }
}

pub trait InputSource {
    fn poll(&mut self) -> InputFrame;
}

/// Plays back queued frames, then repeats `idle` forever.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    frames: VecDeque<InputFrame>,
    pub idle: InputFrame,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: InputFrame) -> &mut Self {
        self.frames.push_back(frame);
        self
    }

    pub fn push_repeated(&mut self, frame: InputFrame, count: usize) -> &mut Self {
        for _ in 0..count {
            self.frames.push_back(frame);
        }
        self
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> InputFrame {
        self.frames.pop_front().unwrap_or(self.idle)
    }
}

/// Where the camera is and which way it faces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraBasis {
    pub position: Vec3,
    pub forward: Vec3,
    pub right: Vec3,
    /// Radians about +Y; zero looks down -Z.
    pub yaw: f32,
}

impl Default for CameraBasis {
    fn default() -> Self {
        Self::from_yaw(Vec3::ZERO, 0.0)
    }
}

impl CameraBasis {
    pub fn from_yaw(position: Vec3, yaw: f32) -> Self {
        let rotation = Quat::from_rotation_y(yaw);
        Self {
            position,
            forward: rotation * Vec3::NEG_Z,
            right: rotation * Vec3::X,
            yaw,
        }
    }

    pub fn from_transform(transform: &Transform) -> Self {
        let forward: Vec3 = transform.forward().into();
        let right: Vec3 = transform.right().into();
        Self {
            position: transform.translation,
            forward,
            right,
            yaw: (-forward.x).atan2(-forward.z),
        }
    }

    /// Yaw in degrees, wrapped to [0, 360).
    pub fn yaw_degrees(&self) -> f32 {
        self.yaw.to_degrees().rem_euclid(360.0)
    }

    /// Forward projected onto the ground plane.
    pub fn flat_forward(&self) -> Vec3 {
        Vec3::new(self.forward.x, 0.0, self.forward.z).normalize_or_zero()
    }

    pub fn flat_right(&self) -> Vec3 {
        Vec3::new(self.right.x, 0.0, self.right.z).normalize_or_zero()
    }
}

#[derive(Debug, Clone)]
pub struct PlayerInputHandler {
    raw_move: Vec2,
    move_direction: Vec3,
    last_non_zero_direction: Vec3,
    jump_pressed: bool,
    jump_released: bool,
    jump_held: bool,
    roll_pressed: bool,
    interact_pressed: bool,
    enabled: bool,
}

impl Default for PlayerInputHandler {
    fn default() -> Self {
        Self {
            raw_move: Vec2::ZERO,
            move_direction: Vec3::ZERO,
            last_non_zero_direction: Vec3::NEG_Z,
            jump_pressed: false,
            jump_released: false,
            jump_held: false,
            roll_pressed: false,
            interact_pressed: false,
            enabled: true,
        }
    }
}

impl PlayerInputHandler {
    /// Polls `source` once. While disabled nothing is polled and every
    /// per-frame command reads as idle.
    pub fn read(&mut self, source: &mut dyn InputSource, camera: &CameraBasis) {
        if !self.enabled {
            self.clear_frame();
            return;
        }

        let frame = source.poll();
        self.raw_move = frame.move_axis;

        let mut dir = camera.flat_forward() * self.raw_move.y + camera.flat_right() * self.raw_move.x;
        if dir.length_squared() > 1.0 {
            dir = dir.normalize();
        }
        self.move_direction = dir;
        if dir.length_squared() > 0.01 {
            self.last_non_zero_direction = dir.normalize();
        }

        self.jump_pressed = frame.jump_triggered;
        let was_held = self.jump_held;
        self.jump_held = frame.jump_held;
        self.jump_released = was_held && !self.jump_held;

        self.roll_pressed = frame.roll_triggered;
        self.interact_pressed = frame.interact_triggered;
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Also clears held state, so re-enabling never reports a stale release.
    pub fn disable(&mut self) {
        self.enabled = false;
        self.clear_frame();
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn clear_frame(&mut self) {
        self.raw_move = Vec2::ZERO;
        self.move_direction = Vec3::ZERO;
        self.jump_pressed = false;
        self.jump_released = false;
        self.jump_held = false;
        self.roll_pressed = false;
        self.interact_pressed = false;
    }

    pub fn raw_move(&self) -> Vec2 {
        self.raw_move
    }

    pub fn move_direction(&self) -> Vec3 {
        self.move_direction
    }

    pub fn last_non_zero_direction(&self) -> Vec3 {
        self.last_non_zero_direction
    }

    pub fn jump_pressed(&self) -> bool {
        self.jump_pressed
    }

    pub fn jump_released(&self) -> bool {
        self.jump_released
    }

    pub fn jump_held(&self) -> bool {
        self.jump_held
    }

    pub fn roll_pressed(&self) -> bool {
        self.roll_pressed
    }

    pub fn interact_pressed(&self) -> bool {
        self.interact_pressed
    }
}
