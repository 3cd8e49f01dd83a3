//! The physics seam: everything the controller asks of a rigidbody, its
//! capsule collider and its ground probe.

use bevy::prelude::*;

pub trait CharacterMotor {
    /// Re-probes the ground. Called once at the start of each fixed step.
    fn update_ground_state(&mut self);
    fn is_grounded(&self) -> bool;

    fn velocity(&self) -> Vec3;
    fn set_velocity(&mut self, velocity: Vec3);

    fn mass(&self) -> f32 {
        1.0
    }

    /// Shrinks the collider while airborne, restores it on the ground.
    fn update_collider(&mut self, in_air: bool);
    fn set_collider_enabled(&mut self, enabled: bool);

    /// Replaces x/z, keeps the vertical component.
    fn set_horizontal_velocity(&mut self, horizontal: Vec3) {
        let v = self.velocity();
        self.set_velocity(Vec3::new(horizontal.x, v.y, horizontal.z));
    }

    /// Zeroes vertical speed, then applies an upward impulse.
    fn add_vertical_impulse(&mut self, force: f32) {
        let v = self.velocity();
        let mass = self.mass().max(f32::EPSILON);
        self.set_velocity(Vec3::new(v.x, force / mass, v.z));
    }

    fn multiply_vertical_velocity(&mut self, multiplier: f32) {
        let v = self.velocity();
        self.set_velocity(Vec3::new(v.x, v.y * multiplier, v.z));
    }

    fn add_velocity(&mut self, delta: Vec3) {
        let v = self.velocity();
        self.set_velocity(v + delta);
    }

    fn clamp_fall_speed(&mut self, max_fall_speed: f32) {
        let v = self.velocity();
        if v.y < -max_fall_speed {
            self.set_velocity(Vec3::new(v.x, -max_fall_speed, v.z));
        }
    }

    fn stop(&mut self) {
        self.set_velocity(Vec3::ZERO);
    }
}

/// Capsule dimensions and ground-probe placement, in the body's local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapsuleShape {
    pub height: f32,
    pub center: Vec3,
    pub ground_check: Vec3,
}

/// The grounded capsule and how it shrinks in the air.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderProfile {
    pub grounded: CapsuleShape,
    pub air_height_mul: f32,
    pub ground_check_air_offset: Vec3,
}

impl ColliderProfile {
    pub fn new(grounded: CapsuleShape, air_height_mul: f32, ground_check_air_offset: f32) -> Self {
        Self {
            grounded,
            air_height_mul: air_height_mul.clamp(0.3, 1.0),
            ground_check_air_offset: Vec3::new(0.0, ground_check_air_offset, 0.0),
        }
    }

    /// In the air the capsule shrinks from the bottom up, so its top stays
    /// put, and the ground probe follows the new bottom.
    pub fn shape(&self, in_air: bool) -> CapsuleShape {
        if !in_air {
            return self.grounded;
        }

        let height = self.grounded.height * self.air_height_mul;
        let shift = (self.grounded.height - height) * 0.5;
        let center = self.grounded.center + Vec3::Y * shift;
        let bottom = center.y - height * 0.5;
        let ground_check = Vec3::new(
            self.grounded.ground_check.x + self.ground_check_air_offset.x,
            bottom + self.ground_check_air_offset.y,
            self.grounded.ground_check.z + self.ground_check_air_offset.z,
        );

        CapsuleShape {
            height,
            center,
            ground_check,
        }
    }
}
