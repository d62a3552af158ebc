//! hsim - command line driver for the card game engine
//!
//! Plays seeded random games between two decks, lists the content set, and
//! checks content and deck files.

use clap::{Parser, Subcommand};
use hearth_sim::{
    game::{format_hash, state_hash, GameConfig, GameLogger, GameLoop, GameView, SeededRandom, VerbosityLevel},
    loader::{CardDatabase, DeckList, DeckLoader, GameInitializer},
    tournament::{print_report, run_tournament, Entrant, TournamentSettings},
    Result,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Verbosity level for game output (custom parser supporting both names and numbers)
#[derive(Debug, Clone, Copy)]
struct VerbosityArg(VerbosityLevel);

impl std::str::FromStr for VerbosityArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "0" => Ok(VerbosityArg(VerbosityLevel::Silent)),
            "minimal" | "1" => Ok(VerbosityArg(VerbosityLevel::Minimal)),
            "normal" | "2" => Ok(VerbosityArg(VerbosityLevel::Normal)),
            "verbose" | "3" => Ok(VerbosityArg(VerbosityLevel::Verbose)),
            _ => Err(format!(
                "invalid verbosity level '{s}' (expected: silent/0, minimal/1, normal/2, verbose/3)"
            )),
        }
    }
}

impl From<VerbosityArg> for VerbosityLevel {
    fn from(arg: VerbosityArg) -> Self {
        arg.0
    }
}

#[derive(Parser)]
#[command(name = "hsim")]
#[command(about = "Card game rules engine with reversible actions", long_about = None)]
struct Cli {
    /// Content file (JSON); the built-in set is used when omitted
    #[arg(long, global = true, value_name = "CARDS_JSON")]
    cards: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one seeded random game between two decks
    Duel {
        /// Deck file (.deck) for player 1
        #[arg(value_name = "PLAYER1_DECK")]
        deck1: PathBuf,

        /// Deck file (.deck) for player 2
        #[arg(value_name = "PLAYER2_DECK")]
        deck2: PathBuf,

        /// Player 1 name
        #[arg(long, default_value = "Player 1")]
        p1_name: String,

        /// Player 2 name
        #[arg(long, default_value = "Player 2")]
        p2_name: String,

        /// Seed for the game's own random stream (shuffles, random targets)
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Seed for the random command picker
        #[arg(long, default_value_t = 1)]
        policy_seed: u64,

        /// Stop without a result after this many turns
        #[arg(long, default_value_t = 200)]
        max_turns: u32,

        /// Table rules overrides (JSON)
        #[arg(long, value_name = "CONFIG_JSON")]
        config: Option<PathBuf>,

        /// Print the final observable state as JSON
        #[arg(long)]
        dump_state: bool,

        /// Verbosity level for game output (0=silent, 1=minimal, 2=normal, 3=verbose)
        #[arg(long, default_value = "normal", short = 'v')]
        verbosity: VerbosityArg,
    },

    /// Run many games for profiling
    Profile {
        /// Number of games to run
        #[arg(long, short = 'g', default_value_t = 1000)]
        games: usize,

        /// Random seed for deterministic profiling
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Deck file to use (uses same deck for both players)
        #[arg(long, short = 'd', default_value = "test_decks/mage_tempo.deck")]
        deck: PathBuf,
    },

    /// Play many games between random deck pairings in parallel
    Tourney {
        /// Deck files (.deck) to enter
        #[arg(value_name = "DECK", required = true)]
        decks: Vec<PathBuf>,

        /// Number of games to play
        #[arg(long, short = 'g', default_value_t = 100)]
        games: usize,

        /// Tournament seed; every game derives its seeds from it
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Stop a game without a result after this many turns
        #[arg(long, default_value_t = 200)]
        max_turns: u32,
    },

    /// List the cards in the content set
    Cards,

    /// Check the content set and optional deck files
    Validate {
        #[arg(value_name = "DECK")]
        decks: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let db = Arc::new(load_database(cli.cards.as_deref())?);

    match cli.command {
        Commands::Duel {
            deck1,
            deck2,
            p1_name,
            p2_name,
            seed,
            policy_seed,
            max_turns,
            config,
            dump_state,
            verbosity,
        } => {
            let config = match config {
                Some(path) => GameConfig::load(&path)?,
                None => GameConfig::default(),
            };
            let duel = DuelArgs {
                deck1: DeckLoader::load_from_file(&deck1)?,
                deck2: DeckLoader::load_from_file(&deck2)?,
                p1_name,
                p2_name,
                seed,
                policy_seed,
                max_turns,
                config,
                dump_state,
                verbosity: verbosity.into(),
            };
            run_duel(&db, duel)?
        }
        Commands::Profile { games, seed, deck } => run_profile(&db, games, seed, &deck)?,
        Commands::Tourney {
            decks,
            games,
            seed,
            max_turns,
        } => {
            let settings = TournamentSettings {
                games,
                seed,
                max_turns,
                ..TournamentSettings::default()
            };
            run_tourney(&db, &decks, &settings)?
        }
        Commands::Cards => list_cards(&db),
        Commands::Validate { decks } => validate(&db, &decks)?,
    }

    Ok(())
}

fn load_database(path: Option<&Path>) -> Result<CardDatabase> {
    match path {
        Some(path) => CardDatabase::load_from_file(path),
        None => CardDatabase::builtin(),
    }
}

struct DuelArgs {
    deck1: DeckList,
    deck2: DeckList,
    p1_name: String,
    p2_name: String,
    seed: u64,
    policy_seed: u64,
    max_turns: u32,
    config: GameConfig,
    dump_state: bool,
    verbosity: VerbosityLevel,
}

fn run_duel(db: &Arc<CardDatabase>, args: DuelArgs) -> Result<()> {
    let mut game = GameInitializer::new(db)
        .init_game(args.p1_name, &args.deck1, args.p2_name, &args.deck2, args.config)?
        .with_random(Box::new(SeededRandom::new(args.seed)))
        .with_logger(GameLogger::with_verbosity(args.verbosity));

    let (outcome, _) = GameLoop::new(&mut game)
        .with_max_turns(args.max_turns)
        .with_policy(Box::new(SeededRandom::new(args.policy_seed)))
        .run()?;

    println!(
        "Turns: {}  Commands: {}  Result: {:?}",
        outcome.turns_played, outcome.commands, outcome.end_reason
    );
    println!("State hash: {}", format_hash(state_hash(&game)));
    if args.dump_state {
        println!("{}", GameView::of(&game).to_json()?);
    }
    Ok(())
}

fn run_profile(db: &Arc<CardDatabase>, iterations: usize, seed: u64, deck_path: &Path) -> Result<()> {
    println!("=== hsim - Profiling Mode ===\n");

    let deck = DeckLoader::load_from_file(deck_path)?;
    println!("  Deck: {} cards\n", deck.total_cards());

    println!("Running {iterations} games with seed {seed}");
    let start = std::time::Instant::now();
    let mut total_turns = 0u64;
    let mut decided = 0usize;

    for i in 0..iterations {
        let game_seed = seed.wrapping_add(i as u64);
        let mut game = GameInitializer::new(db)
            .init_game("Player 1", &deck, "Player 2", &deck, GameConfig::default())?
            .with_random(Box::new(SeededRandom::new(game_seed)))
            .with_logger(GameLogger::with_verbosity(VerbosityLevel::Silent));

        let (outcome, _) = GameLoop::new(&mut game)
            .with_policy(Box::new(SeededRandom::new(game_seed ^ 0x5eed)))
            .run()?;
        total_turns += u64::from(outcome.turns_played);
        if outcome.winner.is_some() {
            decided += 1;
        }

        // Print progress every 100 games
        if (i + 1) % 100 == 0 {
            println!("Completed {} games", i + 1);
        }
    }

    let duration = start.elapsed();
    println!();
    println!(
        "Profiling complete! {iterations} games in {:.2}ms ({decided} decided, {:.1} turns on average)",
        duration.as_secs_f64() * 1000.0,
        total_turns as f64 / iterations.max(1) as f64
    );
    Ok(())
}

fn run_tourney(db: &Arc<CardDatabase>, deck_paths: &[PathBuf], settings: &TournamentSettings) -> Result<()> {
    println!("=== hsim - Tournament Mode ===\n");

    let mut entrants = Vec::new();
    for path in deck_paths {
        let deck = DeckLoader::load_from_file(path)?;
        println!("  {}: {} cards", path.display(), deck.total_cards());
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        entrants.push(Entrant { name, deck });
    }
    println!("\nRunning {} games with seed {}\n", settings.games, settings.seed);

    let start = std::time::Instant::now();
    let stats = run_tournament(db, &entrants, settings)?;
    let elapsed = start.elapsed();

    println!("=== Tournament Complete ===");
    println!("Total games played: {}", stats.games());
    println!("Elapsed time: {:.2}s", elapsed.as_secs_f64());
    println!("Games per second: {:.2}\n", stats.games() as f64 / elapsed.as_secs_f64());
    print_report(&stats);
    Ok(())
}

fn list_cards(db: &CardDatabase) {
    for card in db.cards() {
        let overload = if card.overload > 0 {
            format!(" (overload {})", card.overload)
        } else {
            String::new()
        };
        let stats = match (&card.minion_descr, &card.weapon_descr) {
            (Some(m), _) => format!(" {}/{}", m.attack, m.health),
            (_, Some(w)) => format!(" {}/{}", w.attack, w.durability),
            _ if card.is_secret() => " secret".to_string(),
            _ => " spell".to_string(),
        };
        println!("{:>2}  {:<24} {}{}{}", card.cost, card.id, card.name, stats, overload);
    }
    println!();
    for power in db.hero_powers() {
        println!("{:>2}  {:<24} {} (hero power)", power.cost, power.id, power.name);
    }
}

fn validate(db: &Arc<CardDatabase>, decks: &[PathBuf]) -> Result<()> {
    println!("Content set OK: {} cards", db.len());
    for path in decks {
        let deck = DeckLoader::load_from_file(path)?;
        GameInitializer::new(db).player_setup("check", &deck)?;
        println!("{}: OK ({} cards)", path.display(), deck.total_cards());
    }
    Ok(())
}
