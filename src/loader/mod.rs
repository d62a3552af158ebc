//! Content and deck loaders
//!
//! The card database is read from JSON; deck lists use a small line format.

pub mod database;
pub mod deck;
pub mod game_init;

pub use database::{CardDatabase, CardSet};
pub use deck::{DeckEntry, DeckList, DeckLoader};
pub use game_init::GameInitializer;
