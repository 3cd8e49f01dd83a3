//! Player character: camera-relative movement, buffered and coyote jumps,
//! jump cut, gravity shaping, roll and health.
//!
//! The engine is reached only through the `CharacterMotor`, `Animator` and
//! `InputSource` traits, so the same controller runs under the bevy host and
//! under plain unit tests.

pub mod animation;
pub mod controller;
pub mod health;
pub mod input;
pub mod motor;
pub mod roll;
pub mod tuning;

pub use animation::{AnimDirection, AnimParam, Animator, RecordingAnimator};
pub use controller::PlayerController;
pub use health::{DamageOutcome, Health};
pub use input::{CameraBasis, InputFrame, InputSource, PlayerInputHandler, ScriptedInput};
pub use motor::{CapsuleShape, CharacterMotor, ColliderProfile};
pub use roll::RollState;
pub use tuning::CharacterTuning;
