//! Feature composition: the registry, the feature trait, the event bus and
//! the reset-hook registry.

pub mod bus;
pub mod feature;
pub mod registry;
pub mod reset;

pub use bus::{EventBus, Handler, SubscriptionId, WeakEventBus};
pub use feature::{AsAny, Feature, FeatureContext};
pub use registry::FeatureRegistry;
pub use reset::{ResetFn, ResetRegistry, ResetReport};
