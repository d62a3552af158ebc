//! Game initialization from decks
//!
//! Creates games from deck lists and the card database

use crate::game::{Game, GameConfig, PlayerSetup};
use crate::loader::{CardDatabase, DeckList};
use crate::{Result, SimError};
use std::sync::Arc;

/// Game builder for initializing games from decks
pub struct GameInitializer<'a> {
    db: &'a Arc<CardDatabase>,
}

impl<'a> GameInitializer<'a> {
    /// Create a new game initializer with a card database
    pub fn new(db: &'a Arc<CardDatabase>) -> Self {
        GameInitializer { db }
    }

    /// Resolve a deck list into what a player brings to the table
    pub fn player_setup(&self, name: impl Into<String>, deck: &DeckList) -> Result<PlayerSetup> {
        let cards = deck
            .card_ids()
            .map(|id| {
                self.db
                    .card(id)
                    .map_err(|_| SimError::InvalidDeckFormat(format!("Card not found in database: {id}")))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut setup = PlayerSetup::named(name).with_deck(cards);
        if let Some(power) = &deck.hero_power {
            setup = setup.with_hero_power(self.db.hero_power(power)?);
        }
        Ok(setup)
    }

    /// Initialize a two-player game from two decks
    ///
    /// The game is not begun; call `Game::begin` to shuffle and deal.
    pub fn init_game(
        &self,
        player1_name: impl Into<String>,
        player1_deck: &DeckList,
        player2_name: impl Into<String>,
        player2_deck: &DeckList,
        config: GameConfig,
    ) -> Result<Game> {
        let first = self.player_setup(player1_name, player1_deck)?;
        let second = self.player_setup(player2_name, player2_deck)?;
        Game::new_two_player(Arc::clone(self.db), config, first, second)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PlayerId;
    use crate::loader::{DeckEntry, DeckLoader};

    #[test]
    fn test_init_simple_game() {
        let db = Arc::new(CardDatabase::builtin().unwrap());
        let deck = DeckLoader::parse("hero_power: fireblast\n10 wisp\n10 chillwind_yeti\n").unwrap();

        let game = GameInitializer::new(&db)
            .init_game("Alice", &deck, "Bob", &deck, GameConfig::default())
            .unwrap();

        for player in PlayerId::both() {
            assert_eq!(game.player(player).deck.len(), 20);
            assert!(game.player(player).hero.power.is_some());
        }
        assert_eq!(game.player(PlayerId::FIRST).name.as_str(), "Alice");
        assert_eq!(game.turn.number, 0);
    }

    #[test]
    fn test_missing_card_error() {
        let db = Arc::new(CardDatabase::builtin().unwrap());
        let deck = DeckList {
            hero_power: None,
            entries: vec![DeckEntry {
                card_id: "nonexistent_card".to_string(),
                count: 1,
            }],
        };

        let result = GameInitializer::new(&db).init_game("Alice", &deck, "Bob", &deck, GameConfig::default());
        assert!(result.is_err());
    }
}
