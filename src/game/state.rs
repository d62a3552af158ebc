//! Main game state structure

use crate::core::{
    CardDescr, CharacterMut, CharacterRef, DescrId, EntityId, EntityStore, Hero, HeroPowerDescr, Minion, Player,
    PlayerId,
};
use crate::game::{AuraRegistry, EventBus, FirstChoiceAgent, GameLogger, RandomProvider, SeededRandom, UserAgent};
use crate::loader::CardDatabase;
use crate::undo::{Undo, UndoAction, UndoBuilder};
use crate::zones::Deck;
use crate::{Result, SimError};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::path::Path;
use std::sync::Arc;

/// Table rules that vary between setups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub board_size: usize,
    pub hand_size: usize,
    pub secret_capacity: usize,
    pub starting_health: i32,
    pub max_mana: i32,
    /// Opening hand size of the first and the second player
    pub opening_hand: [usize; 2],
    /// Shuffle both decks when the game begins
    pub shuffle_decks: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            board_size: 7,
            hand_size: 10,
            secret_capacity: 5,
            starting_health: 30,
            max_mana: 10,
            opening_hand: [3, 4],
            shuffle_decks: true,
        }
    }
}

impl GameConfig {
    /// Load overrides from a JSON file; missing fields keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    /// Player whose turn it is
    pub owner: PlayerId,
    /// 0 before the game begins, then 1, 2, ... (both players' turns count)
    pub number: u32,
}

/// Latched outcome: the players whose hero died
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub dead_players: SmallVec<[PlayerId; 2]>,
}

impl GameResult {
    pub fn winner(&self) -> Option<PlayerId> {
        match self.dead_players.as_slice() {
            [loser] => Some(loser.opponent()),
            _ => None,
        }
    }

    pub fn is_draw(&self) -> bool {
        self.dead_players.len() == 2
    }
}

/// What a player brings to the table
#[derive(Debug, Clone, Default)]
pub struct PlayerSetup {
    pub name: String,
    pub hero_power: Option<Arc<HeroPowerDescr>>,
    /// Deck from bottom to top
    pub deck: Vec<Arc<CardDescr>>,
}

impl PlayerSetup {
    pub fn named(name: impl Into<String>) -> Self {
        PlayerSetup {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_hero_power(mut self, power: Arc<HeroPowerDescr>) -> Self {
        self.hero_power = Some(power);
        self
    }

    pub fn with_deck(mut self, deck: Vec<Arc<CardDescr>>) -> Self {
        self.deck = deck;
        self
    }
}

/// Complete game state
///
/// Everything is owned by value, so `Clone` is the deep copy used for
/// search. A clone has its own event bus, aura registry, random provider and
/// agent; nothing is shared with the original except immutable descriptors.
#[derive(Debug, Clone)]
pub struct Game {
    pub players: [Player; 2],

    /// Every minion that was ever summoned, addressed by id
    pub minions: EntityStore<Minion>,

    pub turn: TurnState,

    /// Logical clock, the source of birth order
    pub next_timestamp: u64,

    /// `None` until a hero dies; never reverts once set
    pub result: Option<GameResult>,

    pub auras: AuraRegistry,

    pub bus: EventBus,

    pub db: Arc<CardDatabase>,

    pub config: GameConfig,

    pub random: Box<dyn RandomProvider>,

    pub agent: Box<dyn UserAgent>,

    pub logger: GameLogger,
}

impl Game {
    /// Create a game that has not begun yet (see `begin`)
    pub fn new_two_player(
        db: Arc<CardDatabase>,
        config: GameConfig,
        first: PlayerSetup,
        second: PlayerSetup,
    ) -> Result<Self> {
        let make = |id: PlayerId, setup: PlayerSetup| {
            Player::new(id, setup.name, setup.hero_power, Deck::new(setup.deck), &config)
        };
        let players = [make(PlayerId::FIRST, first), make(PlayerId::SECOND, second)];

        Ok(Game {
            players,
            minions: EntityStore::new(),
            turn: TurnState {
                owner: PlayerId::FIRST,
                number: 0,
            },
            next_timestamp: 1,
            result: None,
            auras: AuraRegistry::default(),
            bus: EventBus::new(),
            db,
            config,
            random: Box::new(SeededRandom::new(0)),
            agent: Box::new(FirstChoiceAgent),
            logger: GameLogger::new(),
        })
    }

    pub fn with_random(mut self, random: Box<dyn RandomProvider>) -> Self {
        self.random = random;
        self
    }

    pub fn with_agent(mut self, agent: Box<dyn UserAgent>) -> Self {
        self.agent = agent;
        self
    }

    pub fn with_logger(mut self, logger: GameLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Independent copy for speculative search
    pub fn deep_copy(&self) -> Game {
        self.clone()
    }

    pub fn is_over(&self) -> bool {
        self.result.is_some()
    }

    pub fn current_player(&self) -> PlayerId {
        self.turn.owner
    }

    pub fn player(&self, id: PlayerId) -> &Player {
        &self.players[id.index()]
    }

    pub fn player_mut(&mut self, id: PlayerId) -> &mut Player {
        &mut self.players[id.index()]
    }

    pub fn player_by_name(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name.as_str() == name)
    }

    pub fn minion(&self, id: EntityId) -> Result<&Minion> {
        self.minions.get(id)
    }

    pub fn hero_owner(&self, id: EntityId) -> Option<PlayerId> {
        self.players.iter().find(|p| p.hero.id == id).map(|p| p.id)
    }

    pub fn hero_by_id_mut(&mut self, id: EntityId) -> Result<&mut Hero> {
        self.players
            .iter_mut()
            .find(|p| p.hero.id == id)
            .map(|p| &mut p.hero)
            .ok_or(SimError::EntityNotFound(id))
    }

    pub fn character(&self, id: EntityId) -> Option<CharacterRef<'_>> {
        if let Some(player) = self.players.iter().find(|p| p.hero.id == id) {
            return Some(CharacterRef::Hero(&player.hero));
        }
        self.minions.find(id).map(CharacterRef::Minion)
    }

    pub fn character_mut(&mut self, id: EntityId) -> Result<CharacterMut<'_>> {
        if let Some(pos) = self.players.iter().position(|p| p.hero.id == id) {
            return Ok(CharacterMut::Hero(&mut self.players[pos].hero));
        }
        self.minions.get_mut(id).map(CharacterMut::Minion)
    }

    pub fn owner_of(&self, id: EntityId) -> Option<PlayerId> {
        self.character(id).map(|c| c.owner())
    }

    pub fn is_minion(&self, id: EntityId) -> bool {
        self.minions.contains(id)
    }

    /// A hero, or a minion on the board that is not on its way out
    pub fn is_live_character(&self, id: EntityId) -> bool {
        match self.character(id) {
            Some(CharacterRef::Hero(_)) => true,
            Some(CharacterRef::Minion(m)) => m.is_alive() && self.player(m.owner).board.contains(id),
            None => false,
        }
    }

    /// Live minions of one player in board order
    pub fn live_minions(&self, player: PlayerId) -> Vec<EntityId> {
        self.player(player)
            .board
            .ids()
            .iter()
            .copied()
            .filter(|&id| self.minions.find(id).is_some_and(|m| m.is_alive()))
            .collect()
    }

    pub fn hero_id(&self, player: PlayerId) -> EntityId {
        self.player(player).hero.id
    }

    /// Look up a minion on the board by descriptor id, leftmost first
    pub fn find_minion(&self, player: PlayerId, descr: &DescrId) -> Option<EntityId> {
        self.player(player)
            .board
            .ids()
            .iter()
            .copied()
            .find(|&id| self.minions.find(id).is_some_and(|m| &m.descr.id == descr))
    }

    /// Apply one primitive mutation
    pub fn perform(&mut self, action: UndoAction) -> Result<Undo> {
        let inverse = action.apply(self)?;
        Ok(Undo::single(inverse))
    }

    /// Take the next birth timestamp
    pub fn next_birth(&mut self) -> Result<(Undo, u64)> {
        let birth = self.next_timestamp;
        let undo = self.perform(UndoAction::SetClock {
            next_timestamp: birth + 1,
        })?;
        Ok((undo, birth))
    }

    /// Run a command body, rolling back what it recorded if it fails
    pub(crate) fn run_command<F>(&mut self, body: F) -> Result<Undo>
    where
        F: FnOnce(&mut Game, &mut UndoBuilder) -> Result<()>,
    {
        let mut builder = UndoBuilder::new();
        match body(self, &mut builder) {
            Ok(()) => Ok(builder.build()),
            Err(e) => {
                self.bus.clear_deferred();
                builder.build().undo(self)?;
                Err(e)
            }
        }
    }

    pub fn log_minimal(&self, message: &str) {
        self.logger.minimal(message);
    }

    pub fn log_normal(&self, message: &str) {
        self.logger.normal(message);
    }

    pub fn log_verbose(&self, message: &str) {
        self.logger.verbose(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_game() -> Game {
        let db = Arc::new(CardDatabase::builtin().unwrap());
        Game::new_two_player(db, GameConfig::default(), PlayerSetup::named("Alice"), PlayerSetup::named("Bob")).unwrap()
    }

    #[test]
    fn test_new_game() {
        let game = new_game();
        assert_eq!(game.turn.number, 0);
        assert_eq!(game.current_player(), PlayerId::FIRST);
        assert!(!game.is_over());
        assert_eq!(game.player_by_name("Bob").unwrap().id, PlayerId::SECOND);
    }

    #[test]
    fn test_character_lookup() {
        let game = new_game();
        let hero = game.hero_id(PlayerId::SECOND);
        assert_eq!(game.owner_of(hero), Some(PlayerId::SECOND));
        assert!(game.is_live_character(hero));
        assert!(!game.is_minion(hero));
        assert!(game.character(EntityId::fresh()).is_none());
    }

    #[test]
    fn test_game_result() {
        let mut result = GameResult {
            dead_players: SmallVec::from_slice(&[PlayerId::SECOND]),
        };
        assert_eq!(result.winner(), Some(PlayerId::FIRST));
        result.dead_players.push(PlayerId::FIRST);
        assert!(result.is_draw());
        assert_eq!(result.winner(), None);
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: GameConfig = serde_json::from_str(r#"{"board_size": 5}"#).unwrap();
        assert_eq!(config.board_size, 5);
        assert_eq!(config.hand_size, 10);
        assert_eq!(config.opening_hand, [3, 4]);
    }

    #[test]
    fn test_deep_copy_is_independent() {
        let mut game = new_game();
        let copy = game.deep_copy();
        game.player_mut(PlayerId::FIRST).hero.armor = 4;
        assert_eq!(copy.player(PlayerId::FIRST).hero.armor, 0);
    }
}
