//! Performance benchmarks for the game engine
//!
//! Measures random playouts using Criterion.rs in three iteration modes:
//!
//! 1. **Fresh** - Build a new game from the deck lists for each iteration
//! 2. **Snapshot** - Deep copy a prepared game each iteration
//! 3. **Rewind** - Play once, then undo back to the start each iteration
//!
//! Both players use mage_tempo.deck and uniformly random legal commands.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hearth_sim::{
    game::{Game, GameConfig, GameLogger, GameLoop, SeededRandom, VerbosityLevel},
    loader::{CardDatabase, DeckList, DeckLoader, GameInitializer},
    Result,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Metrics collected during one playout
#[derive(Debug, Clone)]
struct GameMetrics {
    turns: u32,
    commands: usize,
    /// Undo actions recorded for the whole playout
    actions: usize,
    duration: Duration,
}

impl GameMetrics {
    fn games_per_sec(&self) -> f64 {
        1.0 / self.duration.as_secs_f64()
    }

    fn actions_per_sec(&self) -> f64 {
        self.actions as f64 / self.duration.as_secs_f64()
    }

    fn actions_per_turn(&self) -> f64 {
        if self.turns == 0 {
            0.0
        } else {
            self.actions as f64 / self.turns as f64
        }
    }
}

/// Loaded once, reused across iterations
struct BenchmarkSetup {
    db: Arc<CardDatabase>,
    deck: DeckList,
}

impl BenchmarkSetup {
    fn load() -> Result<Self> {
        let db = Arc::new(CardDatabase::builtin()?);
        let deck_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_decks/mage_tempo.deck");
        let deck = DeckLoader::load_from_file(&deck_path)?;
        Ok(BenchmarkSetup { db, deck })
    }

    fn new_game(&self, seed: u64) -> Result<Game> {
        let game = GameInitializer::new(&self.db).init_game("Alice", &self.deck, "Bob", &self.deck, GameConfig::default())?;
        Ok(game
            .with_random(Box::new(SeededRandom::new(seed)))
            .with_logger(GameLogger::with_verbosity(VerbosityLevel::Silent)))
    }
}

fn play(game: &mut Game, seed: u64) -> Result<(GameMetrics, hearth_sim::undo::Undo)> {
    let start = Instant::now();
    let (outcome, history) = GameLoop::new(game)
        .with_policy(Box::new(SeededRandom::new(seed + 1)))
        .run()?;
    let metrics = GameMetrics {
        turns: outcome.turns_played,
        commands: outcome.commands,
        actions: history.len(),
        duration: start.elapsed(),
    };
    Ok((metrics, history))
}

fn bench_game_fresh(c: &mut Criterion) {
    let setup = match BenchmarkSetup::load() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Skipping benchmark - failed to load resources: {}", e);
            return;
        }
    };

    let mut group = c.benchmark_group("game_execution");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(10));

    let seed = 42u64;
    println!("\nWarmup game (seed {}):", seed);
    if let Ok((metrics, _)) = setup.new_game(seed).and_then(|mut game| play(&mut game, seed)) {
        println!("  Turns: {}", metrics.turns);
        println!("  Commands: {}", metrics.commands);
        println!("  Actions: {}", metrics.actions);
        println!("  Duration: {:?}", metrics.duration);
        println!("  Games/sec: {:.2}", metrics.games_per_sec());
        println!("  Actions/sec: {:.2}", metrics.actions_per_sec());
        println!("  Actions/turn: {:.2}", metrics.actions_per_turn());
    }

    group.bench_with_input(BenchmarkId::new("fresh", seed), &seed, |b, &seed| {
        b.iter(|| {
            let mut game = setup.new_game(black_box(seed)).expect("game builds");
            play(&mut game, seed).expect("game completes")
        });
    });

    group.finish();
}

fn bench_game_snapshot(c: &mut Criterion) {
    let setup = match BenchmarkSetup::load() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Skipping benchmark - failed to load resources: {}", e);
            return;
        }
    };

    let mut group = c.benchmark_group("game_execution");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(10));

    let seed = 42u64;
    let initial = setup.new_game(seed).expect("game builds");

    group.bench_function(BenchmarkId::new("snapshot", seed), |b| {
        b.iter(|| {
            let mut game = initial.deep_copy();
            play(&mut game, black_box(seed)).expect("game completes")
        });
    });

    group.finish();
}

/// Rewind mode: the undo of a finished playout restores the start
fn bench_game_rewind(c: &mut Criterion) {
    let setup = match BenchmarkSetup::load() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Skipping benchmark - failed to load resources: {}", e);
            return;
        }
    };

    let mut group = c.benchmark_group("game_execution");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(10));

    let seed = 42u64;
    let mut game = setup.new_game(seed).expect("game builds");
    let (_, history) = play(&mut game, seed).expect("game completes");
    let mut pending = Some(history);

    // Each iteration undoes the playout and redoes it again
    group.bench_function(BenchmarkId::new("rewind", seed), |b| {
        b.iter(|| {
            if let Some(history) = pending.take() {
                let redo = history.undo(&mut game).expect("undo succeeds");
                let again = redo.undo(black_box(&mut game)).expect("redo succeeds");
                pending = Some(again);
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_game_fresh, bench_game_snapshot, bench_game_rewind);
criterion_main!(benches);
