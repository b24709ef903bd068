//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only arrives as `now` arguments (ms), never read from a clock
//! - Seeded RNG only
//! - Timers are jobs in one ordered queue
//! - No DOM or platform dependencies

pub mod preview;
pub mod scheduler;
pub mod scoring;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod timer;

pub use preview::{PreviewState, PreviewTarget};
pub use scheduler::{Job, Scheduler};
pub use scoring::{
    AccuracyView, HitResult, Rating, accuracy, multiplier, rate_reaction, resolve_hit,
    resolve_miss,
};
pub use spawner::{random_color, random_position, spawn_bounds};
pub use state::{
    GameEvent, GamePhase, GameState, Hud, MissCause, RoundState, RoundSummary, Target,
    TargetColor, TargetState,
};
pub use tick::{Command, PointerOutcome, TickInput, tick};
pub use timer::{RoundTimer, TimerMode, TimerTick};
