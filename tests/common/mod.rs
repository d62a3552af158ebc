//! Shared fixtures for the integration tests
#![allow(dead_code)]

use hearth_sim::core::{Card, EntityId, PlayerId};
use hearth_sim::game::{Game, GameConfig, GameLogger, PlayerSetup, SeededRandom, VerbosityLevel};
use hearth_sim::loader::CardDatabase;
use std::sync::Arc;

pub const P1: PlayerId = PlayerId::FIRST;
pub const P2: PlayerId = PlayerId::SECOND;

pub fn builtin_db() -> Arc<CardDatabase> {
    Arc::new(CardDatabase::builtin().expect("built-in content set loads"))
}

/// Rules with no shuffling and no opening hands, so draws are predictable
pub fn fixed_config() -> GameConfig {
    GameConfig {
        shuffle_decks: false,
        opening_hand: [0, 0],
        ..GameConfig::default()
    }
}

/// A begun game; each deck is listed bottom to top
pub fn table(first: &[&str], second: &[&str]) -> Game {
    let db = builtin_db();
    let deck = |ids: &[&str]| ids.iter().map(|id| db.card(id).unwrap()).collect::<Vec<_>>();
    let first = PlayerSetup::named("Alice").with_deck(deck(first));
    let second = PlayerSetup::named("Bob").with_deck(deck(second));
    let mut game = Game::new_two_player(Arc::clone(&db), fixed_config(), first, second)
        .unwrap()
        .with_random(Box::new(SeededRandom::new(11)))
        .with_logger(GameLogger::with_verbosity(VerbosityLevel::Silent));
    game.begin().unwrap();
    game
}

/// A game that skips the opening: turn 1, first player to act, empty hands
pub fn bare_game() -> Game {
    let mut game = Game::new_two_player(
        builtin_db(),
        fixed_config(),
        PlayerSetup::named("Alice"),
        PlayerSetup::named("Bob"),
    )
    .unwrap()
    .with_logger(GameLogger::with_verbosity(VerbosityLevel::Silent));
    game.turn.number = 1;
    game
}

/// Hand the turn to `player` without running turn start or end
pub fn set_turn(game: &mut Game, player: PlayerId) {
    game.turn.owner = player;
}

pub fn give_mana(game: &mut Game, player: PlayerId, amount: i32) {
    let mana = &mut game.player_mut(player).mana;
    mana.crystals = amount;
    mana.current = amount;
}

/// Put a card into the hand and return its index
pub fn give_card(game: &mut Game, player: PlayerId, id: &str) -> usize {
    let descr = game.db.card(id).unwrap();
    let hand = &mut game.player_mut(player).hand;
    let end = hand.len();
    hand.insert(end, Card::new(descr, player)).unwrap()
}

/// Summon at the right end of the board
pub fn summon(game: &mut Game, player: PlayerId, id: &str) -> EntityId {
    summon_at(game, player, id, usize::MAX)
}

pub fn summon_at(game: &mut Game, player: PlayerId, id: &str, position: usize) -> EntityId {
    let descr = game.db.minion(id).unwrap();
    let minion = game.summon(player, descr, position).unwrap().1.unwrap();
    game.apply_auras().unwrap();
    minion
}

/// Summon a minion that can attack right away
pub fn ready(game: &mut Game, player: PlayerId, id: &str) -> EntityId {
    let minion = summon(game, player, id);
    game.minions.get_mut(minion).unwrap().attack.summoning_sick = false;
    minion
}

pub fn health(game: &Game, id: EntityId) -> i32 {
    use hearth_sim::core::Damageable;
    game.character(id).unwrap().health().current()
}

pub fn attack_of(game: &Game, id: EntityId) -> i32 {
    use hearth_sim::core::Targetable;
    game.character(id).unwrap().attack_value()
}

pub fn hero_health(game: &Game, player: PlayerId) -> i32 {
    game.player(player).hero.health.current()
}

pub fn board_names(game: &Game, player: PlayerId) -> Vec<String> {
    game.player(player)
        .board
        .ids()
        .iter()
        .map(|&id| game.minion(id).unwrap().descr.id.to_string())
        .collect()
}
