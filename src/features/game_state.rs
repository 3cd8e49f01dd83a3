use bevy::prelude::*;

use crate::runtime::{EventBus, Feature, FeatureContext};
use crate::shared::*;

/// Top-level finite state machine. Every transition is announced on the bus
/// as an exit of the old state followed by an entry into the new one.
#[derive(Default)]
pub struct GameStateMachine {
    current: GameState,
    bus: Option<EventBus>,
}

impl GameStateMachine {
    pub fn current(&self) -> GameState {
        self.current
    }

    /// No-op when `state` is already current. Entered-handlers observe the
    /// new state.
    pub fn change_state(&mut self, state: GameState) {
        if self.current == state {
            return;
        }

        let previous = self.current;
        if let Some(bus) = &self.bus {
            bus.publish(GameStateExited { state: previous });
        }
        self.current = state;
        info!("[GameState] {:?} -> {:?}", previous, state);
        if let Some(bus) = &self.bus {
            bus.publish(GameStateEntered { state });
        }
    }
}

impl Feature for GameStateMachine {
    fn setup(&mut self, bus: &EventBus) {
        self.bus = Some(bus.clone());
    }

    fn start(&mut self, _ctx: &mut FeatureContext<'_>) {
        self.change_state(GameState::Loading);
    }
}
