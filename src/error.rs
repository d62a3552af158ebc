//! Error types for the simulator
//!
//! Only caller misuse is reported as an error. Ordinary game-rule dead ends
//! (full board, empty deck, no redirect target) resolve silently by policy.

use crate::core::{EntityId, PlayerId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    #[error("Invalid game action: {0}")]
    InvalidAction(String),

    #[error("Insufficient mana: need {needed}, have {available}")]
    InsufficientMana { needed: i32, available: i32 },

    #[error("Card {card} is not owned by player {player}")]
    CardNotOwned { card: EntityId, player: PlayerId },

    #[error("Unknown descriptor: {0}")]
    UnknownDescriptor(String),

    #[error("Invalid card format: {0}")]
    InvalidCardFormat(String),

    #[error("Invalid deck format: {0}")]
    InvalidDeckFormat(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
