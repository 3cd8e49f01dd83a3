//! A flat-ground kinematic body standing in for a rigidbody and capsule.

use bevy::prelude::*;

use crate::player::{CapsuleShape, CharacterMotor, CharacterTuning, ColliderProfile};

/// Standing capsule: two units tall, feet at the body origin.
pub const STANDING_CAPSULE: CapsuleShape = CapsuleShape {
    height: 2.0,
    center: Vec3::new(0.0, 1.0, 0.0),
    ground_check: Vec3::ZERO,
};

#[derive(Debug, Clone)]
pub struct KinematicBody {
    pub position: Vec3,
    pub velocity: Vec3,
    pub mass: f32,
    pub gravity: f32,
    pub ground_height: f32,
    pub ground_check_radius: f32,
    profile: ColliderProfile,
    shape: CapsuleShape,
    grounded: bool,
    collider_enabled: bool,
}

impl KinematicBody {
    pub fn new(position: Vec3, tuning: &CharacterTuning) -> Self {
        let profile = ColliderProfile::new(
            STANDING_CAPSULE,
            tuning.air_collider_height_mul,
            tuning.ground_check_air_offset,
        );
        Self {
            position,
            velocity: Vec3::ZERO,
            mass: 1.0,
            gravity: tuning.gravity,
            ground_height: 0.0,
            ground_check_radius: 0.2,
            profile,
            shape: profile.grounded,
            grounded: false,
            collider_enabled: true,
        }
    }

    pub fn shape(&self) -> CapsuleShape {
        self.shape
    }

    pub fn collider_enabled(&self) -> bool {
        self.collider_enabled
    }

    /// One physics step: gravity, integration, then the capsule bottom is
    /// pushed out of the ground plane.
    pub fn integrate(&mut self, dt: f32) {
        self.velocity.y += self.gravity * dt;
        self.position += self.velocity * dt;

        if !self.collider_enabled {
            return;
        }
        let bottom = self.position.y + self.shape.center.y - self.shape.height * 0.5;
        if bottom < self.ground_height {
            self.position.y += self.ground_height - bottom;
            if self.velocity.y < 0.0 {
                self.velocity.y = 0.0;
            }
        }
    }
}

impl CharacterMotor for KinematicBody {
    fn update_ground_state(&mut self) {
        let probe_y = self.position.y + self.shape.ground_check.y;
        self.grounded =
            self.collider_enabled && probe_y <= self.ground_height + self.ground_check_radius;
    }

    fn is_grounded(&self) -> bool {
        self.grounded
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    fn mass(&self) -> f32 {
        self.mass
    }

    fn update_collider(&mut self, in_air: bool) {
        self.shape = self.profile.shape(in_air);
    }

    fn set_collider_enabled(&mut self, enabled: bool) {
        self.collider_enabled = enabled;
    }
}
