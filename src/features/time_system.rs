use bevy::prelude::*;

use crate::runtime::{EventBus, Feature, FeatureContext};
use crate::shared::*;

pub const DEFAULT_DAY_LENGTH: f32 = 600.0;
pub const DEFAULT_NIGHT_LENGTH: f32 = 180.0;

/// Day/night driver. Accumulates fixed-step time against the current phase
/// length and flips the phase when it is reached.
pub struct TimeSystem {
    pub day_length: f32,
    pub night_length: f32,
    current_time: f32,
    phase: DayPhase,
    bus: Option<EventBus>,
}

impl Default for TimeSystem {
    fn default() -> Self {
        Self::new(DEFAULT_DAY_LENGTH, DEFAULT_NIGHT_LENGTH)
    }
}

impl TimeSystem {
    pub fn new(day_length: f32, night_length: f32) -> Self {
        Self {
            day_length,
            night_length,
            current_time: 0.0,
            phase: DayPhase::Day,
            bus: None,
        }
    }

    pub fn phase(&self) -> DayPhase {
        self.phase
    }

    /// Seconds spent in the current phase.
    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    pub fn phase_length(&self) -> f32 {
        match self.phase {
            DayPhase::Day => self.day_length,
            DayPhase::Night => self.night_length,
        }
    }

    /// 0.0 at the start of the phase, 1.0 at the flip.
    pub fn phase_progress(&self) -> f32 {
        let length = self.phase_length();
        if length <= 0.0 {
            return 1.0;
        }
        (self.current_time / length).clamp(0.0, 1.0)
    }

    fn switch_phase(&mut self) {
        // Overshoot is discarded: at most one flip per tick.
        self.current_time = 0.0;
        self.phase = self.phase.flipped();
        info!("[Time] Phase changed to {:?}", self.phase);
        if let Some(bus) = &self.bus {
            bus.publish(DayPhaseChanged { phase: self.phase });
        }
    }
}

impl Feature for TimeSystem {
    fn setup(&mut self, bus: &EventBus) {
        self.bus = Some(bus.clone());
    }

    fn start(&mut self, _ctx: &mut FeatureContext<'_>) {
        self.current_time = 0.0;
    }

    fn tick(&mut self, dt: f32, _ctx: &mut FeatureContext<'_>) {
        self.current_time += dt;
        if self.current_time >= self.phase_length() {
            self.switch_phase();
        }
    }
}
