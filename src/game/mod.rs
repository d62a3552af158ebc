//! Game state, event bus and rules engine

/// Macro for conditional logging that avoids allocation when feature is disabled
///
/// When verbose-logging feature is disabled, this becomes a no-op at compile time,
/// eliminating all format! allocations in hot search loops.
macro_rules! log_if_verbose {
    (@verbose $self:expr, $($arg:tt)*) => {{
        #[cfg(feature = "verbose-logging")]
        {
            $self.log_verbose(&format!($($arg)*));
        }
        #[cfg(not(feature = "verbose-logging"))]
        {
            let _ = &$self; // Suppress unused variable warning
        }
    }};
    ($self:expr, $($arg:tt)*) => {{
        #[cfg(feature = "verbose-logging")]
        {
            $self.log_normal(&format!($($arg)*));
        }
        #[cfg(not(feature = "verbose-logging"))]
        {
            let _ = &$self; // Suppress unused variable warning
        }
    }};
}

pub mod actions;
pub mod agent;
pub mod aura;
pub mod bus;
pub mod combat;
pub mod commands;
pub mod death;
pub mod effect_exec;
pub mod events;
pub mod game_loop;
pub mod logger;
pub mod snapshot;
pub mod state;
pub mod triggers;

pub use agent::{FirstChoiceAgent, RandomAgent, RandomProvider, ScriptedAgent, ScriptedRandom, SeededRandom, UserAgent};
pub use aura::{ActiveAura, AuraRegistry};
pub use bus::{EventBus, Registration};
pub use commands::{Command, TargetRequest};
pub use effect_exec::EffectContext;
pub use events::{Event, EventKind};
pub use game_loop::{GameEndReason, GameLoop, GameOutcome};
pub use logger::{GameLogger, LogEntry, OutputMode, VerbosityLevel};
pub use snapshot::{format_hash, state_hash, GameView, MinionView, PlayerView};
pub use state::{Game, GameConfig, GameResult, PlayerSetup, TurnState};
