use std::cell::Cell;
use std::rc::Rc;

use bevy::prelude::*;

use super::GameStateMachine;
use crate::runtime::{Feature, FeatureContext};
use crate::shared::*;

/// Wires game-level reactions: day/night turns into raid events, the game
/// enters `Playing` on start and `GameOver` once the player dies.
#[derive(Default)]
pub struct GameManager {
    player_died: Rc<Cell<bool>>,
}

impl Feature for GameManager {
    fn start(&mut self, ctx: &mut FeatureContext<'_>) {
        ctx.bus.subscribe(|e: &GameStateEntered| {
            if e.state == GameState::Playing {
                info!("[GameManager] Playing");
            }
        });

        let bus = ctx.bus.downgrade();
        ctx.bus.subscribe(move |e: &DayPhaseChanged| match e.phase {
            DayPhase::Night => bus.publish(RaidStarted),
            DayPhase::Day => bus.publish(RaidEnded),
        });

        let died = self.player_died.clone();
        ctx.bus.subscribe(move |_: &PlayerDied| died.set(true));

        match ctx.get_mut::<GameStateMachine>() {
            Some(machine) => machine.change_state(GameState::Playing),
            None => warn!("[GameManager] No GameStateMachine registered"),
        }
    }

    fn tick(&mut self, _dt: f32, ctx: &mut FeatureContext<'_>) {
        if !self.player_died.replace(false) {
            return;
        }
        if let Some(machine) = ctx.get_mut::<GameStateMachine>() {
            machine.change_state(GameState::GameOver);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::TimeSystem;
    use crate::runtime::FeatureRegistry;
    use crate::save::MemoryPrefs;
    use std::cell::RefCell;

    #[derive(Debug, PartialEq)]
    enum Raid {
        Started,
        Ended,
    }

    fn registry() -> FeatureRegistry {
        let mut registry = FeatureRegistry::new(Box::new(MemoryPrefs::new()));
        registry
            .add::<GameStateMachine>()
            .add_feature(TimeSystem::new(1.0, 1.0))
            .add::<GameManager>();
        registry
    }

    #[test]
    fn test_start_requests_playing() {
        let mut registry = registry();
        registry.start();
        assert_eq!(
            registry.get::<GameStateMachine>().unwrap().current(),
            GameState::Playing
        );
    }

    #[test]
    fn test_day_night_cycle_translates_to_raids() {
        let mut registry = registry();
        let raids = Rc::new(RefCell::new(Vec::new()));
        let log = raids.clone();
        registry
            .bus()
            .subscribe(move |_: &RaidStarted| log.borrow_mut().push(Raid::Started));
        let log = raids.clone();
        registry
            .bus()
            .subscribe(move |_: &RaidEnded| log.borrow_mut().push(Raid::Ended));

        registry.start();
        registry.tick(1.0);
        registry.tick(1.0);

        assert_eq!(*raids.borrow(), vec![Raid::Started, Raid::Ended]);
    }

    #[test]
    fn test_player_death_moves_to_game_over_on_next_tick() {
        let mut registry = registry();
        registry.start();

        registry.bus().publish(PlayerDied);
        assert_eq!(
            registry.get::<GameStateMachine>().unwrap().current(),
            GameState::Playing
        );

        registry.tick(0.02);
        assert_eq!(
            registry.get::<GameStateMachine>().unwrap().current(),
            GameState::GameOver
        );
    }
}
