//! End-to-end tests for undo and redo
//!
//! Whole playouts are rewound and replayed to check that the recorded
//! actions restore every observable detail of the game.

use hearth_sim::game::{Game, GameConfig, GameEndReason, GameLogger, GameLoop, GameView, RandomProvider, SeededRandom, VerbosityLevel};
use hearth_sim::loader::{CardDatabase, DeckLoader, GameInitializer};
use hearth_sim::undo::Undo;
use hearth_sim::Result;
use std::path::PathBuf;
use std::sync::Arc;

fn load_game(first: &str, second: &str, seed: u64) -> Result<Game> {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_decks");
    let db = Arc::new(CardDatabase::builtin()?);
    let first = DeckLoader::load_from_file(&dir.join(first))?;
    let second = DeckLoader::load_from_file(&dir.join(second))?;
    let game = GameInitializer::new(&db).init_game("Alice", &first, "Bob", &second, GameConfig::default())?;
    Ok(game
        .with_random(Box::new(SeededRandom::new(seed)))
        .with_logger(GameLogger::with_verbosity(VerbosityLevel::Silent)))
}

/// Execute up to `limit` random legal commands, one undo per command
fn play_steps(game: &mut Game, policy_seed: u64, limit: usize) -> Result<Vec<Undo>> {
    let mut policy = SeededRandom::new(policy_seed);
    let mut steps = Vec::new();
    while steps.len() < limit && !game.is_over() {
        let legal = game.legal_commands();
        let command = &legal[policy.roll(legal.len())];
        steps.push(game.execute(command)?);
    }
    Ok(steps)
}

#[test]
fn test_full_playout_rewinds_and_replays() -> Result<()> {
    let mut game = load_game("mage_tempo.deck", "warrior_control.deck", 21)?;
    let initial = GameView::of(&game);

    let (outcome, history) = GameLoop::new(&mut game)
        .with_policy(Box::new(SeededRandom::new(4)))
        .run()?;
    assert!(outcome.commands > 10);
    let finished = GameView::of(&game);
    assert_ne!(initial, finished);

    let redo = history.undo(&mut game)?;
    assert_eq!(GameView::of(&game), initial);
    assert_eq!(game.turn.number, 0);
    assert!(game.result.is_none());

    redo.undo(&mut game)?;
    assert_eq!(GameView::of(&game), finished);
    assert_eq!(game.is_over(), outcome.end_reason != GameEndReason::TurnLimit);
    Ok(())
}

#[test]
fn test_stepwise_rewind_to_the_midpoint() -> Result<()> {
    let mut game = load_game("beast_rush.deck", "mage_tempo.deck", 8)?;
    game.begin()?;

    let mut views = vec![GameView::of(&game)];
    let mut policy = SeededRandom::new(13);
    let mut steps = Vec::new();
    while steps.len() < 120 && !game.is_over() {
        let legal = game.legal_commands();
        let command = &legal[policy.roll(legal.len())];
        steps.push(game.execute(command)?);
        views.push(GameView::of(&game));
    }
    assert!(steps.len() > 20);

    let midpoint = steps.len() / 2;
    while steps.len() > midpoint {
        if let Some(step) = steps.pop() {
            step.undo(&mut game)?;
        }
        assert_eq!(GameView::of(&game), views[steps.len()]);
    }

    // The listeners and auras came back with the state
    assert_eq!(game.bus.len(), views[midpoint].listeners);
    assert_eq!(game.auras.len(), views[midpoint].auras);
    Ok(())
}

#[test]
fn test_deep_copy_matches_undo() -> Result<()> {
    let mut game = load_game("warrior_control.deck", "beast_rush.deck", 30)?;
    game.begin()?;
    play_steps(&mut game, 2, 40)?;
    if game.is_over() {
        return Ok(());
    }

    let copy = game.deep_copy();
    assert_eq!(GameView::of(&copy), GameView::of(&game));

    let later = play_steps(&mut game, 9, 60)?;
    for step in later.into_iter().rev() {
        step.undo(&mut game)?;
    }
    assert_eq!(GameView::of(&game), GameView::of(&copy));
    Ok(())
}

#[test]
fn test_deep_copy_is_independent() -> Result<()> {
    let mut game = load_game("mage_tempo.deck", "mage_tempo.deck", 5)?;
    game.begin()?;
    let before = GameView::of(&game);

    let mut copy = game.deep_copy();
    play_steps(&mut copy, 1, 30)?;

    assert_eq!(GameView::of(&game), before);
    assert_ne!(GameView::of(&copy), before);
    Ok(())
}
