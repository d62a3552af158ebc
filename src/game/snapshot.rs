//! Observable game view and state hashing
//!
//! `GameView` is what a player could observe: health, board order, hand,
//! mana, secrets and the result. It leaves out entity ids, which differ
//! between independent runs, so two runs with the same seed produce equal
//! views. Minions are named by descriptor and birth instead.

use crate::core::{DescrId, Keyword, PlayerId};
use crate::game::{Game, GameResult, TurnState};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinionView {
    pub descr: DescrId,
    pub birth: u64,
    pub attack: i32,
    pub health: i32,
    pub max_health: i32,
    pub keywords: Vec<Keyword>,
    pub frozen: bool,
    pub attack_count: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponView {
    pub descr: DescrId,
    pub attack: i32,
    pub durability: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub health: i32,
    pub max_health: i32,
    pub armor: i32,
    pub hero_attack: i32,
    pub hero_keywords: Vec<Keyword>,
    pub weapon: Option<WeaponView>,
    pub mana: i32,
    pub crystals: i32,
    pub overloaded: i32,
    pub board: Vec<MinionView>,
    pub hand: Vec<DescrId>,
    pub deck: Vec<DescrId>,
    /// Descriptor and birth of each dead minion, oldest death first
    pub graveyard: Vec<(DescrId, u64)>,
    pub secrets: Vec<DescrId>,
    pub cards_played_this_turn: u32,
    pub hero_power_used: bool,
    pub fatigue: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    pub turn: TurnState,
    pub next_timestamp: u64,
    pub result: Option<GameResult>,
    pub players: Vec<PlayerView>,
    pub listeners: usize,
    /// Number of auras in play and of targets they currently affect
    pub auras: usize,
    pub aura_targets: usize,
}

impl GameView {
    pub fn of(game: &Game) -> Self {
        GameView {
            turn: game.turn,
            next_timestamp: game.next_timestamp,
            result: game.result.clone(),
            players: PlayerId::both().into_iter().map(|p| player_view(game, p)).collect(),
            listeners: game.bus.len(),
            auras: game.auras.len(),
            aura_targets: game.auras.iter().map(|a| a.applied.len()).sum(),
        }
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn player_view(game: &Game, id: PlayerId) -> PlayerView {
    let player = game.player(id);
    let hero = &player.hero;
    let board = player
        .board
        .ids()
        .iter()
        .filter_map(|&m| game.minions.find(m))
        .map(|m| MinionView {
            descr: m.descr.id.clone(),
            birth: m.birth,
            attack: m.attack.value(),
            health: m.health.current(),
            max_health: m.health.max(),
            keywords: m.keywords.active(),
            frozen: m.attack.frozen,
            attack_count: m.attack.attack_count,
        })
        .collect();

    PlayerView {
        health: hero.health.current(),
        max_health: hero.health.max(),
        armor: hero.armor,
        hero_attack: hero.attack_value(),
        hero_keywords: hero.keywords.active(),
        weapon: hero.weapon.as_ref().map(|w| WeaponView {
            descr: w.descr.id.clone(),
            attack: w.attack,
            durability: w.durability,
        }),
        mana: player.mana.current,
        crystals: player.mana.crystals,
        overloaded: player.mana.overloaded,
        board,
        hand: player.hand.iter().map(|c| c.descr.id.clone()).collect(),
        deck: player.deck.iter().map(|c| c.id.clone()).collect(),
        graveyard: player.graveyard.iter().map(|g| (g.descr.id.clone(), g.birth)).collect(),
        secrets: player.secrets.iter().map(|s| s.descr.id.clone()).collect(),
        cards_played_this_turn: player.counters.cards_played_this_turn,
        hero_power_used: player.counters.hero_power_used,
        fatigue: player.counters.fatigue,
    }
}

/// Deterministic hash of the observable state
///
/// Serializes the view to canonical JSON and hashes the text, so equal views
/// always hash equal.
pub fn state_hash(game: &Game) -> u64 {
    let canonical = match serde_json::to_string(&GameView::of(game)) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Warning: Failed to serialize game view for hashing: {}", e);
            return 0;
        }
    };
    let mut hasher = DefaultHasher::new();
    canonical.hash(&mut hasher);
    hasher.finish()
}

/// Format a hash for display (shows first 8 hex digits)
pub fn format_hash(hash: u64) -> String {
    format!("{:08x}", (hash >> 32) as u32)
}
