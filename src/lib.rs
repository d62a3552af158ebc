//! Hearth Sim - a rules engine for a two-player minion card game
//!
//! Every state change is a reversible action, so a search can play a line
//! and rewind it instead of copying the whole game.

pub mod core;
pub mod error;
pub mod game;
pub mod loader;
pub mod tournament;
pub mod undo;
pub mod zones;

pub use error::{Result, SimError};
