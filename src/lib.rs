//! OBZVON - a reflex/aim arcade mini-game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (scoring, spawning, round lifecycle, scheduler)
//! - `settings`: Tunable parameters, game modes and difficulty tiers
//! - `highscores`: Per-tier best score / best combo record
//! - `persistence`: Key-value storage (LocalStorage on web, in-memory elsewhere)
//! - `platform`: Browser/native platform abstraction (time, keyboard)

pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;

pub use highscores::{HighScores, RecordOutcome};
pub use settings::{Difficulty, DifficultyProfile, GameMode, Settings};

/// Game configuration constants
pub mod consts {
    /// Reaction time thresholds (ms) for the rating tiers
    pub const PERFECT_BELOW_MS: f64 = 200.0;
    pub const GREAT_BELOW_MS: f64 = 400.0;
    pub const GOOD_BELOW_MS: f64 = 700.0;

    /// Base points per rating tier
    pub const PERFECT_POINTS: u32 = 50;
    pub const GREAT_POINTS: u32 = 35;
    pub const GOOD_POINTS: u32 = 22;
    pub const SLOW_POINTS: u32 = 12;

    /// Combo needed for each multiplier step
    pub const COMBO_TIER_1: u32 = 5;
    pub const COMBO_TIER_2: u32 = 10;
    pub const MULTIPLIER_BASE: f64 = 1.0;
    pub const MULTIPLIER_TIER_1: f64 = 1.4;
    pub const MULTIPLIER_TIER_2: f64 = 1.9;

    /// Round clock resolution
    pub const TIMER_PERIOD_MS: f64 = 1000.0;

    /// Cosmetic delay between expiry and removal
    pub const EXPIRE_FADE_MS: f64 = 200.0;
    /// Cosmetic delay between a hit and removal
    pub const HIT_REMOVE_MS: f64 = 300.0;
    /// Preview target fade-out duration
    pub const PREVIEW_FADE_MS: f64 = 300.0;

    /// Default play area (used by the headless driver)
    pub const DEFAULT_AREA_WIDTH: f32 = 960.0;
    pub const DEFAULT_AREA_HEIGHT: f32 = 600.0;
}

/// Format whole seconds as `m:ss`
pub fn format_time(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Format milliseconds as a one-decimal seconds label (slider readout)
pub fn format_seconds_label(ms: u32) -> String {
    format!("{:.1} сек", ms as f64 / 1000.0)
}
