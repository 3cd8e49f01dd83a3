//! Duskraid library crate: the feature runtime, the character and enemy
//! logic, and the bevy host that drives them.
//!
//! The binary crate (`main.rs`) runs the host headless. Everything is
//! exported here so `tests/` integration tests can build the same app.

pub mod shared;
pub mod runtime;
pub mod save;
pub mod features;
pub mod player;
pub mod enemy;
pub mod interaction;
pub mod data;
pub mod config;
pub mod shell;
