use bevy::prelude::*;

use crate::runtime::{Feature, FeatureContext};
use crate::shared::*;

/// Persists the player's transform through the save record.
#[derive(Default)]
pub struct PlayerFeature {
    transform: Option<SharedTransform>,
}

impl PlayerFeature {
    pub fn new(transform: SharedTransform) -> Self {
        Self {
            transform: Some(transform),
        }
    }

    pub fn transform(&self) -> Option<&SharedTransform> {
        self.transform.as_ref()
    }
}

impl Feature for PlayerFeature {
    fn start(&mut self, ctx: &mut FeatureContext<'_>) {
        let Some(transform) = &self.transform else {
            warn!("[Player] No player transform to restore into");
            return;
        };
        if !ctx.data.has_save {
            return;
        }

        let mut transform = transform.borrow_mut();
        transform.translation = ctx.data.player_position.into();
        if let Some(rotation) = ctx.data.player_rotation {
            transform.rotation = rotation.into();
        }
        info!("[Player] Restored position {:?}", transform.translation);
    }

    fn on_save(&mut self, data: &mut GameData) -> Result<(), String> {
        let Some(transform) = &self.transform else {
            return Ok(());
        };

        let transform = transform.borrow();
        data.has_save = true;
        data.player_position = transform.translation.into();
        data.player_rotation = Some(transform.rotation.into());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::FeatureRegistry;
    use crate::save::MemoryPrefs;

    #[test]
    fn test_no_transform_leaves_record_untouched() {
        let mut data = GameData::default();
        PlayerFeature::default().on_save(&mut data).unwrap();
        assert_eq!(data, GameData::default());
    }

    #[test]
    fn test_save_writes_position_and_rotation() {
        let shared = shared_transform(
            Transform::from_xyz(1.0, 2.0, 3.0).with_rotation(Quat::from_rotation_y(0.5)),
        );
        let mut data = GameData::default();
        PlayerFeature::new(shared).on_save(&mut data).unwrap();

        assert!(data.has_save);
        assert_eq!(Vec3::from(data.player_position), Vec3::new(1.0, 2.0, 3.0));
        let rotation: Quat = data.player_rotation.unwrap().into();
        assert!(rotation.abs_diff_eq(Quat::from_rotation_y(0.5), 1e-6));
    }

    #[test]
    fn test_start_ignores_record_without_save_flag() {
        let mut data = GameData::default();
        data.player_position = Vec3::splat(9.0).into();
        let json = serde_json::to_string(&data).unwrap();

        let shared = shared_transform(Transform::default());
        let mut registry =
            FeatureRegistry::new(Box::new(MemoryPrefs::new().with_entry(SAVE_KEY, json)));
        registry.add_feature(PlayerFeature::new(shared.clone()));
        registry.start();

        assert_eq!(shared.borrow().translation, Vec3::ZERO);
    }

    #[test]
    fn test_start_restores_position_without_rotation() {
        let mut data = GameData::default();
        data.has_save = true;
        data.player_position = Vec3::new(4.0, 0.0, -2.0).into();
        let json = serde_json::to_string(&data).unwrap();

        let start_rotation = Quat::from_rotation_y(1.0);
        let shared = shared_transform(Transform::default().with_rotation(start_rotation));
        let mut registry =
            FeatureRegistry::new(Box::new(MemoryPrefs::new().with_entry(SAVE_KEY, json)));
        registry.add_feature(PlayerFeature::new(shared.clone()));
        registry.start();

        assert_eq!(shared.borrow().translation, Vec3::new(4.0, 0.0, -2.0));
        assert_eq!(shared.borrow().rotation, start_rotation);
    }
}
