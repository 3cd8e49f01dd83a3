use bevy::prelude::*;
use std::collections::HashMap;

/// Animator parameters the controller drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimParam {
    Direction,
    IsGrounded,
    IsRolling,
    IsDead,
    IsAirborne,
    CameraRotation,
    Jump,
    Roll,
    Hurt,
    Land,
}

impl AnimParam {
    pub fn name(self) -> &'static str {
        match self {
            AnimParam::Direction => "Direction",
            AnimParam::IsGrounded => "IsGrounded",
            AnimParam::IsRolling => "IsRolling",
            AnimParam::IsDead => "IsDead",
            AnimParam::IsAirborne => "IsAirborne",
            AnimParam::CameraRotation => "CameraRotation",
            AnimParam::Jump => "Jump",
            AnimParam::Roll => "Roll",
            AnimParam::Hurt => "Hurt",
            AnimParam::Land => "Land",
        }
    }
}

/// The animation-graph seam. Blending and state graphs live in the host.
pub trait Animator {
    fn set_bool(&mut self, param: AnimParam, value: bool);
    fn set_float(&mut self, param: AnimParam, value: f32);
    fn set_integer(&mut self, param: AnimParam, value: i32);
    fn set_trigger(&mut self, param: AnimParam);
    fn reset_trigger(&mut self, param: AnimParam);

    /// Re-arms a trigger so repeated fires are never coalesced.
    fn fire(&mut self, param: AnimParam) {
        self.reset_trigger(param);
        self.set_trigger(param);
    }
}

/// No animator attached.
impl Animator for () {
    fn set_bool(&mut self, _param: AnimParam, _value: bool) {}
    fn set_float(&mut self, _param: AnimParam, _value: f32) {}
    fn set_integer(&mut self, _param: AnimParam, _value: i32) {}
    fn set_trigger(&mut self, _param: AnimParam) {}
    fn reset_trigger(&mut self, _param: AnimParam) {}
}

/// Keeps the latest parameter values and every fired trigger, for headless
/// hosts and assertions.
#[derive(Debug, Default, Clone)]
pub struct RecordingAnimator {
    pub bools: HashMap<AnimParam, bool>,
    pub floats: HashMap<AnimParam, f32>,
    pub integers: HashMap<AnimParam, i32>,
    pub triggers: Vec<AnimParam>,
}

impl RecordingAnimator {
    pub fn bool(&self, param: AnimParam) -> bool {
        self.bools.get(&param).copied().unwrap_or(false)
    }

    pub fn integer(&self, param: AnimParam) -> i32 {
        self.integers.get(&param).copied().unwrap_or(0)
    }

    pub fn float(&self, param: AnimParam) -> f32 {
        self.floats.get(&param).copied().unwrap_or(0.0)
    }

    pub fn fired(&self, param: AnimParam) -> usize {
        self.triggers.iter().filter(|&&t| t == param).count()
    }
}

impl Animator for RecordingAnimator {
    fn set_bool(&mut self, param: AnimParam, value: bool) {
        self.bools.insert(param, value);
    }

    fn set_float(&mut self, param: AnimParam, value: f32) {
        self.floats.insert(param, value);
    }

    fn set_integer(&mut self, param: AnimParam, value: i32) {
        self.integers.insert(param, value);
    }

    fn set_trigger(&mut self, param: AnimParam) {
        self.triggers.push(param);
    }

    fn reset_trigger(&mut self, _param: AnimParam) {}
}

/// Locomotion bucket fed to the animator's `Direction` integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum AnimDirection {
    #[default]
    Idle = 0,
    Forward = 1,
    Back = 2,
    Left = 3,
    Right = 4,
    ForwardLeft = 5,
    ForwardRight = 6,
    BackLeft = 7,
    BackRight = 8,
}

impl AnimDirection {
    /// Clockwise from forward, each bucket spans 45 degrees.
    const COMPASS: [AnimDirection; 8] = [
        AnimDirection::Forward,
        AnimDirection::ForwardRight,
        AnimDirection::Right,
        AnimDirection::BackRight,
        AnimDirection::Back,
        AnimDirection::BackLeft,
        AnimDirection::Left,
        AnimDirection::ForwardLeft,
    ];

    /// Buckets raw stick input (x = right, y = forward).
    pub fn from_input(input: Vec2) -> Self {
        if input.length_squared() < 0.1 {
            return AnimDirection::Idle;
        }

        let angle = input.x.atan2(input.y).to_degrees().rem_euclid(360.0);
        let bucket = ((angle + 22.5) / 45.0).floor() as usize % 8;
        Self::COMPASS[bucket]
    }

    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

/// Shortest signed difference from `from` to `to`, in degrees.
pub fn delta_angle(from: f32, to: f32) -> f32 {
    let mut delta = (to - from).rem_euclid(360.0);
    if delta > 180.0 {
        delta -= 360.0;
    }
    delta
}
