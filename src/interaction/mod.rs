//! World interaction: things the player can look at and use, the probe that
//! finds them, and the detector that tracks what is under the crosshair.

mod detector;
mod node;

pub use detector::InteractionDetector;
pub use node::ResourceNode;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::runtime::EventBus;

/// Stable key of an interactable in the host's target map.
pub type TargetId = u32;

pub trait Interactable {
    fn display_name(&self) -> &str;
    fn position(&self) -> Vec3;

    /// Radius of the target's bounding sphere.
    fn radius(&self) -> f32 {
        0.5
    }

    fn can_interact(&self) -> bool;
    fn interact(&mut self, bus: &EventBus);
    fn set_highlighted(&mut self, highlighted: bool);

    /// The item this target yields, if it is a resource.
    fn item_id(&self) -> Option<&str> {
        None
    }

    fn amount(&self) -> u32 {
        0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionSettings {
    pub interaction_distance: f32,
    pub sphere_radius: f32,
    pub show_debug_logs: bool,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            interaction_distance: 3.0,
            sphere_radius: 0.5,
            show_debug_logs: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeHit {
    pub target: TargetId,
    /// Contact point on the target's surface.
    pub point: Vec3,
}

/// The physics query the detector relies on.
pub trait InteractionProbe {
    fn sphere_cast(
        &self,
        origin: Vec3,
        direction: Vec3,
        radius: f32,
        max_distance: f32,
    ) -> Option<ProbeHit>;
}

/// Sphere cast against a snapshot of target bounding spheres.
#[derive(Debug, Clone, Default)]
pub struct SphereCastProbe {
    spheres: Vec<(TargetId, Vec3, f32)>,
}

impl SphereCastProbe {
    pub fn from_targets<T: Interactable>(targets: &HashMap<TargetId, T>) -> Self {
        let mut spheres: Vec<_> = targets
            .iter()
            .map(|(&id, t)| (id, t.position(), t.radius()))
            .collect();
        spheres.sort_by_key(|s| s.0);
        Self { spheres }
    }
}

impl InteractionProbe for SphereCastProbe {
    fn sphere_cast(
        &self,
        origin: Vec3,
        direction: Vec3,
        radius: f32,
        max_distance: f32,
    ) -> Option<ProbeHit> {
        let dir = direction.normalize_or_zero();
        if dir == Vec3::ZERO {
            return None;
        }

        let mut best: Option<(f32, ProbeHit)> = None;
        for &(id, center, target_radius) in &self.spheres {
            let reach = radius + target_radius;
            let to_center = center - origin;
            let along = to_center.dot(dir);
            let perp_sq = to_center.length_squared() - along * along;
            if perp_sq > reach * reach {
                continue;
            }

            let half_chord = (reach * reach - perp_sq).sqrt();
            if along + half_chord < 0.0 {
                // Entirely behind the origin.
                continue;
            }
            let t = (along - half_chord).max(0.0);
            if t > max_distance {
                continue;
            }
            if best.as_ref().is_some_and(|(best_t, _)| *best_t <= t) {
                continue;
            }

            let sphere_center = origin + dir * t;
            let point = center + (sphere_center - center).normalize_or_zero() * target_radius;
            best = Some((t, ProbeHit { target: id, point }));
        }
        best.map(|(_, hit)| hit)
    }
}
