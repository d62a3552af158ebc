//! Player representation

use crate::core::{Hero, HeroPowerDescr, ManaPool, PlayerId, PlayerName};
use crate::game::GameConfig;
use crate::zones::{BoardSide, Deck, Graveyard, Hand, SecretContainer};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Per-player bookkeeping that resets or accumulates over turns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerCounters {
    pub cards_played_this_turn: u32,
    pub minions_played_this_turn: u32,
    pub hero_power_used: bool,
    /// Damage the next empty-deck draw deals, minus one
    pub fatigue: i32,
}

/// One side of the table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: PlayerName,
    pub hero: Hero,
    pub board: BoardSide,
    pub hand: Hand,
    pub deck: Deck,
    pub graveyard: Graveyard,
    pub secrets: SecretContainer,
    pub mana: ManaPool,
    pub counters: PlayerCounters,
}

impl Player {
    pub fn new(
        id: PlayerId,
        name: impl Into<PlayerName>,
        power: Option<Arc<HeroPowerDescr>>,
        deck: Deck,
        config: &GameConfig,
    ) -> Self {
        Player {
            id,
            name: name.into(),
            hero: Hero::new(id, config.starting_health, power),
            board: BoardSide::new(config.board_size),
            hand: Hand::new(id, config.hand_size),
            deck,
            graveyard: Graveyard::default(),
            secrets: SecretContainer::new(config.secret_capacity),
            mana: ManaPool::new(),
            counters: PlayerCounters::default(),
        }
    }

    pub fn is_dead(&self) -> bool {
        self.hero.health.is_dead()
    }
}
