use std::any::TypeId;

use bevy::prelude::*;

use super::bus::EventBus;
use super::feature::{downcast_mut, downcast_ref, Feature, FeatureContext};
use crate::save::{load_game_data, write_game_data, PrefsStore};
use crate::shared::{GameData, SAVE_KEY};

/// Composition root: owns the ordered feature list, the shared save record,
/// the event bus and the preference store the record lives in.
pub struct FeatureRegistry {
    features: Vec<Box<dyn Feature>>,
    types: Vec<TypeId>,
    bus: EventBus,
    data: GameData,
    store: Box<dyn PrefsStore>,
    save_key: String,
    started: bool,
}

impl FeatureRegistry {
    pub fn new(store: Box<dyn PrefsStore>) -> Self {
        Self::with_save_key(store, SAVE_KEY)
    }

    pub fn with_save_key(store: Box<dyn PrefsStore>, save_key: impl Into<String>) -> Self {
        Self {
            features: Vec::new(),
            types: Vec::new(),
            bus: EventBus::new(),
            data: GameData::default(),
            store,
            save_key: save_key.into(),
            started: false,
        }
    }

    pub fn add<T: Feature + Default>(&mut self) -> &mut Self {
        self.add_feature(T::default())
    }

    /// Runs `setup` and appends. Features must all be added before `start`.
    pub fn add_feature<T: Feature>(&mut self, mut feature: T) -> &mut Self {
        let type_id = TypeId::of::<T>();
        if self.types.contains(&type_id) {
            warn!(
                "[Registry] {} added twice; lookups only ever see the first one.",
                feature.name()
            );
        }
        if self.started {
            warn!("[Registry] {} added after start; its start hook will not run.", feature.name());
        }

        feature.setup(&self.bus);
        debug!("[Registry] Added {}", feature.name());
        self.types.push(type_id);
        self.features.push(Box::new(feature));
        self
    }

    pub fn get<T: Feature>(&self) -> Option<&T> {
        self.features.iter().find_map(|f| downcast_ref::<T>(f.as_ref()))
    }

    pub fn get_mut<T: Feature>(&mut self) -> Option<&mut T> {
        self.features
            .iter_mut()
            .find_map(|f| downcast_mut::<T>(f.as_mut()))
    }

    /// Loads the save record, then starts every feature in insertion order.
    pub fn start(&mut self) {
        self.data = load_game_data(self.store.as_ref(), &self.save_key);
        for_each_feature(&mut self.features, &self.bus, &mut self.data, |feature, ctx| {
            feature.start(ctx)
        });
        self.started = true;
        info!("[Registry] Started {} features.", self.features.len());
    }

    pub fn tick(&mut self, dt: f32) {
        for_each_feature(&mut self.features, &self.bus, &mut self.data, |feature, ctx| {
            feature.tick(dt, ctx)
        });
    }

    /// Collects every feature's slice of the record and writes the blob. The
    /// first failing feature aborts the save before anything is written.
    pub fn save(&mut self) -> Result<(), String> {
        for feature in self.features.iter_mut() {
            feature
                .on_save(&mut self.data)
                .map_err(|e| format!("{} failed to save: {}", feature.name(), e))?;
        }
        write_game_data(self.store.as_mut(), &self.save_key, &self.data)?;
        info!("[Registry] Saved under '{}'.", self.save_key);
        Ok(())
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn data(&self) -> &GameData {
        &self.data
    }

    pub fn store(&self) -> &dyn PrefsStore {
        self.store.as_ref()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }
}

/// Runs `f` on each feature in order, handing it a context over the others.
fn for_each_feature(
    features: &mut [Box<dyn Feature>],
    bus: &EventBus,
    data: &mut GameData,
    mut f: impl FnMut(&mut dyn Feature, &mut FeatureContext<'_>),
) {
    for i in 0..features.len() {
        let (before, rest) = features.split_at_mut(i);
        let Some((current, after)) = rest.split_first_mut() else {
            break;
        };
        let mut ctx = FeatureContext::new(bus, data, before, after);
        f(current.as_mut(), &mut ctx);
    }
}
