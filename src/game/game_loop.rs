//! Random playout driver
//!
//! Plays a game to the end by picking uniformly among the legal commands.
//! The policy has its own random stream, separate from the game's, so the
//! same pair of seeds always replays the same game.

use crate::core::PlayerId;
use crate::game::{Command, Game, RandomProvider, SeededRandom, VerbosityLevel};
use crate::undo::{Undo, UndoBuilder};
use crate::Result;

/// Result of running a game to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOutcome {
    /// Winner of the game (None if draw or the game didn't complete)
    pub winner: Option<PlayerId>,
    /// Value of the turn counter when the loop stopped
    pub turns_played: u32,
    /// Commands executed, turn ends included
    pub commands: usize,
    pub end_reason: GameEndReason,
}

/// Reason the game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEndReason {
    /// The hero of this player died
    PlayerDeath(PlayerId),
    /// Both heroes died at once
    Draw,
    /// Game reached maximum turn limit
    TurnLimit,
}

/// Game loop manager
pub struct GameLoop<'a> {
    pub game: &'a mut Game,
    /// Maximum turns before stopping without a result
    max_turns: u32,
    /// Commands a single turn may take before the turn is ended for it
    max_commands_per_turn: usize,
    policy: Box<dyn RandomProvider>,
    pub verbosity: VerbosityLevel,
}

impl<'a> GameLoop<'a> {
    pub fn new(game: &'a mut Game) -> Self {
        let verbosity = game.logger.verbosity();
        GameLoop {
            game,
            max_turns: 200,
            max_commands_per_turn: 40,
            policy: Box::new(SeededRandom::new(0)),
            verbosity,
        }
    }

    /// Set maximum turns before stopping
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Random stream used to pick commands
    pub fn with_policy(mut self, policy: Box<dyn RandomProvider>) -> Self {
        self.policy = policy;
        self
    }

    /// Play until a hero dies or the turn cap is hit
    ///
    /// Returns the outcome and the undo of the whole playout.
    pub fn run(&mut self) -> Result<(GameOutcome, Undo)> {
        let mut history = UndoBuilder::new();
        let mut commands = 0;

        if self.game.turn.number == 0 {
            history.add(self.game.begin()?);
        }

        let mut this_turn = 0;
        while !self.game.is_over() && self.game.turn.number <= self.max_turns {
            let command = self.pick_command(this_turn);
            let turn = self.game.turn.number;
            history.add(self.game.execute(&command)?);
            commands += 1;
            this_turn = if self.game.turn.number == turn { this_turn + 1 } else { 0 };
        }

        let outcome = self.outcome(commands);
        self.report(&outcome);
        Ok((outcome, history.build()))
    }

    fn pick_command(&mut self, this_turn: usize) -> Command {
        if this_turn >= self.max_commands_per_turn {
            return Command::EndTurn;
        }
        let mut legal = self.game.legal_commands();
        if legal.is_empty() {
            return Command::EndTurn;
        }
        let index = self.policy.roll(legal.len()).min(legal.len() - 1);
        legal.swap_remove(index)
    }

    fn outcome(&self, commands: usize) -> GameOutcome {
        let (winner, end_reason) = match &self.game.result {
            Some(result) if result.is_draw() => (None, GameEndReason::Draw),
            Some(result) => match result.dead_players.first() {
                Some(&loser) => (result.winner(), GameEndReason::PlayerDeath(loser)),
                None => (None, GameEndReason::Draw),
            },
            None => (None, GameEndReason::TurnLimit),
        };
        GameOutcome {
            winner,
            turns_played: self.game.turn.number,
            commands,
            end_reason,
        }
    }

    fn report(&self, outcome: &GameOutcome) {
        let message = match outcome.end_reason {
            GameEndReason::PlayerDeath(loser) => format!(
                "{} wins after {} turns",
                self.game.player(loser.opponent()).name,
                outcome.turns_played
            ),
            GameEndReason::Draw => format!("Draw after {} turns", outcome.turns_played),
            GameEndReason::TurnLimit => format!("No winner after {} turns", outcome.turns_played),
        };
        self.game.log_minimal(&message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameConfig, GameLogger, PlayerSetup};
    use crate::loader::CardDatabase;
    use std::sync::Arc;

    fn new_game(seed: u64) -> Game {
        let db = Arc::new(CardDatabase::builtin().unwrap());
        let deck: Vec<_> = ["wisp", "bloodfen_raptor", "chillwind_yeti", "fireball"]
            .iter()
            .cycle()
            .take(20)
            .map(|id| db.card(id).unwrap())
            .collect();
        let first = PlayerSetup::named("Alice").with_deck(deck.clone());
        let second = PlayerSetup::named("Bob").with_deck(deck);
        Game::new_two_player(db, GameConfig::default(), first, second)
            .unwrap()
            .with_random(Box::new(SeededRandom::new(seed)))
            .with_logger(GameLogger::with_verbosity(VerbosityLevel::Silent))
    }

    #[test]
    fn test_playout_reaches_an_end() {
        let mut game = new_game(7);
        let (outcome, history) = GameLoop::new(&mut game).with_max_turns(300).run().unwrap();
        assert!(outcome.commands > 0);
        assert!(!history.is_noop());
        assert!(game.is_over() || outcome.end_reason == GameEndReason::TurnLimit);
    }

    #[test]
    fn test_turn_limit() {
        let mut game = new_game(3);
        let (outcome, _) = GameLoop::new(&mut game).with_max_turns(2).run().unwrap();
        assert!(outcome.turns_played <= 3);
    }
}
