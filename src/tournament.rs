//! Tournament mode: many seeded random games between deck pairings
//!
//! Games run in parallel with rayon. Every game derives its pairing and
//! seeds from the tournament seed and its own index, so results do not
//! depend on thread scheduling.

use crate::{
    game::{GameConfig, GameEndReason, GameLogger, GameLoop, SeededRandom, VerbosityLevel},
    loader::{CardDatabase, DeckList, GameInitializer},
    Result, SimError,
};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A deck entered into the tournament under a display name
#[derive(Debug, Clone)]
pub struct Entrant {
    pub name: String,
    pub deck: DeckList,
}

#[derive(Debug, Clone)]
pub struct TournamentSettings {
    pub games: usize,
    pub seed: u64,
    pub max_turns: u32,
    pub config: GameConfig,
}

impl Default for TournamentSettings {
    fn default() -> Self {
        TournamentSettings {
            games: 100,
            seed: 42,
            max_turns: 200,
            config: GameConfig::default(),
        }
    }
}

/// Wins of the first deck, wins of the second, draws and unfinished games
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Matchup {
    pub first_wins: usize,
    pub second_wins: usize,
    pub draws: usize,
    pub unfinished: usize,
}

impl Matchup {
    pub fn total(&self) -> usize {
        self.first_wins + self.second_wins + self.draws + self.unfinished
    }
}

/// Statistics collected over a tournament
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TournamentStats {
    pub p1_wins: usize,
    pub p2_wins: usize,
    pub draws: usize,
    /// Games stopped by the turn cap
    pub unfinished: usize,
    pub total_turns: u64,
    pub deck_wins: BTreeMap<String, usize>,
    pub deck_games: BTreeMap<String, usize>,
    /// Keyed by deck names in sorted order
    pub matchups: BTreeMap<(String, String), Matchup>,
}

/// One finished game
#[derive(Debug, Clone)]
struct GameRecord {
    first: usize,
    second: usize,
    end: GameEndReason,
    turns: u32,
}

impl TournamentStats {
    pub fn games(&self) -> usize {
        self.p1_wins + self.p2_wins + self.draws + self.unfinished
    }

    fn record(&mut self, entrants: &[Entrant], game: &GameRecord) {
        let first = &entrants[game.first].name;
        let second = &entrants[game.second].name;
        *self.deck_games.entry(first.clone()).or_insert(0) += 1;
        *self.deck_games.entry(second.clone()).or_insert(0) += 1;
        self.total_turns += u64::from(game.turns);

        let swapped = first > second;
        let key = if swapped {
            (second.clone(), first.clone())
        } else {
            (first.clone(), second.clone())
        };
        let matchup = self.matchups.entry(key).or_default();

        match game.end {
            GameEndReason::PlayerDeath(loser) => {
                let first_won = loser.index() == 1;
                let winner = if first_won { first } else { second };
                if first_won {
                    self.p1_wins += 1;
                } else {
                    self.p2_wins += 1;
                }
                *self.deck_wins.entry(winner.clone()).or_insert(0) += 1;
                if first_won != swapped {
                    matchup.first_wins += 1;
                } else {
                    matchup.second_wins += 1;
                }
            }
            GameEndReason::Draw => {
                self.draws += 1;
                matchup.draws += 1;
            }
            GameEndReason::TurnLimit => {
                self.unfinished += 1;
                matchup.unfinished += 1;
            }
        }
    }
}

/// Play `settings.games` games between randomly paired entrants
pub fn run_tournament(
    db: &Arc<CardDatabase>,
    entrants: &[Entrant],
    settings: &TournamentSettings,
) -> Result<TournamentStats> {
    if entrants.is_empty() {
        return Err(SimError::InvalidAction("Tournament requires at least 1 deck".to_string()));
    }

    let records = (0..settings.games)
        .into_par_iter()
        .map(|index| play_one(db, entrants, settings, index))
        .collect::<Result<Vec<_>>>()?;

    let mut stats = TournamentStats::default();
    for record in &records {
        stats.record(entrants, record);
    }
    Ok(stats)
}

fn play_one(db: &Arc<CardDatabase>, entrants: &[Entrant], settings: &TournamentSettings, index: usize) -> Result<GameRecord> {
    let mut pairing = Xoshiro256PlusPlus::seed_from_u64(settings.seed.wrapping_add(index as u64));
    let first = pairing.gen_range(0..entrants.len());
    let second = pairing.gen_range(0..entrants.len());

    let game_seed = settings
        .seed
        .wrapping_add((index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    let mut game = GameInitializer::new(db)
        .init_game(
            "Player 1",
            &entrants[first].deck,
            "Player 2",
            &entrants[second].deck,
            settings.config.clone(),
        )?
        .with_random(Box::new(SeededRandom::new(game_seed)))
        .with_logger(GameLogger::with_verbosity(VerbosityLevel::Silent));

    let (outcome, _) = GameLoop::new(&mut game)
        .with_max_turns(settings.max_turns)
        .with_policy(Box::new(SeededRandom::new(game_seed ^ 0x1234_5678_9ABC_DEF0)))
        .run()?;

    Ok(GameRecord {
        first,
        second,
        end: outcome.end_reason,
        turns: outcome.turns_played,
    })
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * part as f64 / total as f64
    }
}

/// Print the position, deck and matchup tables
pub fn print_report(stats: &TournamentStats) {
    let total = stats.games();
    println!("=== Player Position Statistics ===");
    println!("P1 wins: {} ({:.1}%)", stats.p1_wins, percent(stats.p1_wins, total));
    println!("P2 wins: {} ({:.1}%)", stats.p2_wins, percent(stats.p2_wins, total));
    println!("Draws: {} ({:.1}%)", stats.draws, percent(stats.draws, total));
    if stats.unfinished > 0 {
        println!("Unfinished: {} ({:.1}%)", stats.unfinished, percent(stats.unfinished, total));
    }
    if total > 0 {
        println!("Average length: {:.1} turns", stats.total_turns as f64 / total as f64);
    }

    println!("\n=== Deck Win Rates ===");
    for (name, games) in &stats.deck_games {
        let wins = stats.deck_wins.get(name).copied().unwrap_or(0);
        println!("  {}: {}/{} ({:.1}%)", name, wins, games, percent(wins, *games));
    }

    println!("\n=== Matchup Results ===");
    for ((first, second), result) in &stats.matchups {
        let games = result.total();
        if first == second {
            println!("  {} (mirror): {} games", first, games);
            continue;
        }
        println!("  {} vs {}: {} games", first, second, games);
        println!("    {} wins: {} ({:.1}%)", first, result.first_wins, percent(result.first_wins, games));
        println!("    {} wins: {} ({:.1}%)", second, result.second_wins, percent(result.second_wins, games));
        if result.draws > 0 {
            println!("    Draws: {} ({:.1}%)", result.draws, percent(result.draws, games));
        }
    }
}
