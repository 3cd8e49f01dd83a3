use bevy::prelude::*;

/// An in-progress roll, advanced one fixed step at a time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollState {
    pub direction: Vec3,
    pub elapsed: f32,
    pub duration: f32,
}

impl RollState {
    pub fn new(direction: Vec3, duration: f32) -> Self {
        Self {
            direction,
            elapsed: 0.0,
            duration,
        }
    }

    /// Horizontal roll velocity with the given vertical component.
    pub fn velocity(&self, speed: f32, vertical: f32) -> Vec3 {
        Vec3::new(self.direction.x * speed, vertical, self.direction.z * speed)
    }

    /// Returns true once the roll has run its full duration.
    pub fn advance(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        self.is_finished()
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}
