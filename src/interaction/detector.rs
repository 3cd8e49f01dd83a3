use bevy::prelude::*;
use std::collections::HashMap;

use super::{Interactable, InteractionProbe, InteractionSettings, TargetId};
use crate::features::InventoryFeature;
use crate::player::CameraBasis;
use crate::runtime::EventBus;

/// Tracks the single interactable under the camera's aim and highlights it.
#[derive(Debug, Clone, Default)]
pub struct InteractionDetector {
    pub settings: InteractionSettings,
    hovered: Option<TargetId>,
}

impl InteractionDetector {
    pub fn new(settings: InteractionSettings) -> Self {
        Self {
            settings,
            hovered: None,
        }
    }

    pub fn current_target(&self) -> Option<TargetId> {
        self.hovered
    }

    /// Re-aims from the camera. `inventory` only feeds the hover log.
    pub fn update<T: Interactable>(
        &mut self,
        camera: &CameraBasis,
        probe: &dyn InteractionProbe,
        targets: &mut HashMap<TargetId, T>,
        inventory: Option<&InventoryFeature>,
    ) {
        let distance = self.settings.interaction_distance;
        let Some(hit) = probe.sphere_cast(
            camera.position,
            camera.forward,
            self.settings.sphere_radius,
            distance,
        ) else {
            self.clear_hover(targets);
            return;
        };

        let real_distance = camera.position.distance(hit.point);
        if real_distance > distance {
            self.clear_hover(targets);
            return;
        }

        let usable = targets.get(&hit.target).is_some_and(|t| t.can_interact());
        if !usable {
            self.clear_hover(targets);
            return;
        }
        if self.hovered == Some(hit.target) {
            return;
        }

        self.clear_hover(targets);
        self.hovered = Some(hit.target);
        if let Some(target) = targets.get_mut(&hit.target) {
            target.set_highlighted(true);
            if self.settings.show_debug_logs {
                log_hover(&*target, real_distance, inventory);
            }
        }
    }

    /// Un-highlights the hovered target, if it still exists.
    pub fn clear_hover<T: Interactable>(&mut self, targets: &mut HashMap<TargetId, T>) {
        if let Some(id) = self.hovered.take() {
            if let Some(target) = targets.get_mut(&id) {
                target.set_highlighted(false);
            }
        }
    }

    /// Interacts with the hovered target. Returns whether anything happened.
    pub fn try_interact<T: Interactable>(
        &mut self,
        targets: &mut HashMap<TargetId, T>,
        bus: &EventBus,
    ) -> bool {
        let Some(id) = self.hovered else {
            return false;
        };
        let Some(target) = targets.get_mut(&id) else {
            return false;
        };

        if !target.can_interact() {
            if self.settings.show_debug_logs {
                info!("[Interact] {} can't be used right now", target.display_name());
            }
            return false;
        }

        if self.settings.show_debug_logs {
            info!("[Interact] Using {}", target.display_name());
        }
        target.interact(bus);
        true
    }
}

fn log_hover(target: &dyn Interactable, distance: f32, inventory: Option<&InventoryFeature>) {
    match target.item_id() {
        Some(item_id) => {
            let held = inventory.map_or(0, |inv| inv.amount(item_id));
            info!(
                "[Interact] Hover: {} | Node amount: {} | In inventory: {} | Distance: {:.2}m",
                target.display_name(),
                target.amount(),
                held,
                distance
            );
        }
        None => info!(
            "[Interact] Hover: {} | Distance: {:.2}m",
            target.display_name(),
            distance
        ),
    }
}
