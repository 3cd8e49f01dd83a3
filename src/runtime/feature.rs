use std::any::Any;

use super::bus::EventBus;
use crate::shared::GameData;

/// Downcasting support for boxed features. Blanket-implemented, never
/// implement it by hand.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A self-contained gameplay subsystem composed into the `FeatureRegistry`.
///
/// Every hook has an empty default, so a feature only overrides what it
/// uses. Hooks run in registration order.
pub trait Feature: AsAny {
    /// Called once, when the feature is added to the registry.
    fn setup(&mut self, _bus: &EventBus) {}

    /// Called once from `FeatureRegistry::start`, after the save data has
    /// been loaded.
    fn start(&mut self, _ctx: &mut FeatureContext<'_>) {}

    /// Called once per fixed step.
    fn tick(&mut self, _dt: f32, _ctx: &mut FeatureContext<'_>) {}

    /// Write this feature's slice of the save record. An error aborts the
    /// whole save.
    fn on_save(&mut self, _data: &mut GameData) -> Result<(), String> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

pub(crate) fn downcast_ref<T: Feature>(feature: &dyn Feature) -> Option<&T> {
    feature.as_any().downcast_ref::<T>()
}

pub(crate) fn downcast_mut<T: Feature>(feature: &mut dyn Feature) -> Option<&mut T> {
    feature.as_any_mut().downcast_mut::<T>()
}

/// What a feature sees while one of its `start`/`tick` hooks runs: the
/// shared bus and save record, and every feature except itself.
pub struct FeatureContext<'a> {
    pub bus: &'a EventBus,
    pub data: &'a mut GameData,
    before: &'a mut [Box<dyn Feature>],
    after: &'a mut [Box<dyn Feature>],
}

impl<'a> FeatureContext<'a> {
    pub(crate) fn new(
        bus: &'a EventBus,
        data: &'a mut GameData,
        before: &'a mut [Box<dyn Feature>],
        after: &'a mut [Box<dyn Feature>],
    ) -> Self {
        Self {
            bus,
            data,
            before,
            after,
        }
    }

    /// First other feature of type `T`, in registration order.
    pub fn get<T: Feature>(&self) -> Option<&T> {
        self.before
            .iter()
            .chain(self.after.iter())
            .find_map(|f| downcast_ref::<T>(f.as_ref()))
    }

    pub fn get_mut<T: Feature>(&mut self) -> Option<&mut T> {
        self.before
            .iter_mut()
            .chain(self.after.iter_mut())
            .find_map(|f| downcast_mut::<T>(f.as_mut()))
    }
}
