//! The gameplay features composed into the `FeatureRegistry`, plus the
//! standard registration order the host uses.

mod game_manager;
mod game_state;
mod inventory;
mod player_feature;
mod time_system;

pub use game_manager::GameManager;
pub use game_state::GameStateMachine;
pub use inventory::{InventoryFeature, InventoryModel};
pub use player_feature::PlayerFeature;
pub use time_system::{TimeSystem, DEFAULT_DAY_LENGTH, DEFAULT_NIGHT_LENGTH};

use crate::runtime::FeatureRegistry;
use crate::shared::SharedTransform;

/// Registers the game's features. The state machine and the clock come
/// before the manager that drives them.
pub fn register_default_features(
    registry: &mut FeatureRegistry,
    player: SharedTransform,
    day_length: f32,
    night_length: f32,
) {
    registry
        .add::<GameStateMachine>()
        .add_feature(TimeSystem::new(day_length, night_length))
        .add::<GameManager>()
        .add_feature(PlayerFeature::new(player))
        .add::<InventoryFeature>();
}
