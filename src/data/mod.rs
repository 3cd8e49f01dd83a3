//! Data layer — populates the item registry at startup from the hard-coded
//! game-design tables in submodules.

mod items;

use bevy::prelude::*;
use crate::shared::*;

pub use items::populate_items;

pub struct DataPlugin;

impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ItemRegistry>()
            .add_systems(PreStartup, load_all_data);
    }
}

fn load_all_data(mut item_registry: ResMut<ItemRegistry>) {
    populate_items(&mut item_registry);
    info!("[Data] Items loaded: {}", item_registry.items.len());
}
