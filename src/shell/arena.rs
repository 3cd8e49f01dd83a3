use bevy::prelude::*;

use crate::enemy::ObstacleProbe;

/// The square play area. Its edges are the only walls enemies can see.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct ArenaBounds {
    pub half_extent: f32,
}

impl ArenaBounds {
    pub fn new(half_extent: f32) -> Self {
        Self {
            half_extent: half_extent.abs(),
        }
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.x.abs() <= self.half_extent && point.z.abs() <= self.half_extent
    }

    pub fn clamp(&self, point: Vec3) -> Vec3 {
        let h = self.half_extent;
        Vec3::new(point.x.clamp(-h, h), point.y, point.z.clamp(-h, h))
    }
}

impl ObstacleProbe for ArenaBounds {
    fn blocked(&self, origin: Vec3, direction: Vec3, distance: f32) -> bool {
        !self.contains(origin + direction.normalize_or_zero() * distance)
    }
}
