//! Game settings, modes and difficulty tiers
//!
//! Persisted separately from the high-score record.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, load_json, save_json};
use crate::sim::TimerMode;

/// Slider limits
pub const TARGET_SIZE_MIN: f32 = 30.0;
pub const TARGET_SIZE_MAX: f32 = 120.0;
pub const SPAWN_INTERVAL_MIN_MS: u32 = 200;
pub const SPAWN_INTERVAL_MAX_MS: u32 = 2000;
pub const TARGET_LIFETIME_MIN_MS: u32 = 400;
pub const TARGET_LIFETIME_MAX_MS: u32 = 3000;
pub const ROUND_DURATION_MIN_SECS: u32 = 15;
pub const ROUND_DURATION_MAX_SECS: u32 = 300;

/// Difficulty tiers (ranked mode)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "med" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Preset bundled with this tier
    pub fn profile(&self) -> DifficultyProfile {
        match self {
            Difficulty::Easy => DifficultyProfile {
                target_size: 80.0,
                spawn_interval_ms: 900,
                target_lifetime_ms: 1600,
            },
            Difficulty::Medium => DifficultyProfile {
                target_size: 65.0,
                spawn_interval_ms: 650,
                target_lifetime_ms: 1200,
            },
            Difficulty::Hard => DifficultyProfile {
                target_size: 50.0,
                spawn_interval_ms: 450,
                target_lifetime_ms: 850,
            },
        }
    }
}

/// Target size and cadence used for a round
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    /// Target diameter (px), also the spawn padding
    pub target_size: f32,
    pub spawn_interval_ms: u32,
    pub target_lifetime_ms: u32,
}

/// Which variant of the game is played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GameMode {
    /// Count-up timer, runs until the player stops
    #[default]
    FreePlay,
    /// Countdown with free-form parameters
    Timed,
    /// Countdown with a difficulty preset and per-tier records
    Ranked,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::FreePlay => "Free play",
            GameMode::Timed => "Timed",
            GameMode::Ranked => "Ranked",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "free" | "freeplay" | "free play" => Some(GameMode::FreePlay),
            "timed" => Some(GameMode::Timed),
            "ranked" => Some(GameMode::Ranked),
            _ => None,
        }
    }

    /// Whether rounds in this mode update the high-score record
    pub fn tracks_records(&self) -> bool {
        *self == GameMode::Ranked
    }

    /// Whether the round clock counts down
    pub fn is_countdown(&self) -> bool {
        *self != GameMode::FreePlay
    }
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub mode: GameMode,
    /// Tier used in ranked mode
    pub difficulty: Difficulty,

    // === Free-form parameters (free play / timed) ===
    /// Target diameter in px
    pub target_size: f32,
    pub spawn_interval_ms: u32,
    pub target_lifetime_ms: u32,
    /// Countdown length for timed/ranked rounds
    pub round_duration_secs: u32,

    /// Keep active targets from expiring while the round is paused
    pub freeze_targets_on_pause: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: GameMode::FreePlay,
            difficulty: Difficulty::Medium,

            target_size: 70.0,
            spawn_interval_ms: 500,
            target_lifetime_ms: 1100,
            round_duration_secs: 60,

            freeze_targets_on_pause: false,
        }
    }
}

impl Settings {
    /// LocalStorage key
    pub const STORAGE_KEY: &'static str = "obzvon_settings";

    /// Settings for a ranked round on the given tier
    pub fn ranked(difficulty: Difficulty) -> Self {
        Self {
            mode: GameMode::Ranked,
            difficulty,
            ..Self::default()
        }
    }

    /// Parameters in effect for the next round
    pub fn profile(&self) -> DifficultyProfile {
        match self.mode {
            GameMode::Ranked => self.difficulty.profile(),
            GameMode::FreePlay | GameMode::Timed => DifficultyProfile {
                target_size: self.target_size,
                spawn_interval_ms: self.spawn_interval_ms,
                target_lifetime_ms: self.target_lifetime_ms,
            },
        }
    }

    /// Round clock configuration for the current mode
    pub fn timer_mode(&self) -> TimerMode {
        if self.mode.is_countdown() {
            TimerMode::Countdown {
                duration_secs: self.round_duration_secs,
            }
        } else {
            TimerMode::CountUp
        }
    }

    /// Tier whose record a finished round is compared against
    pub fn record_tier(&self) -> Option<Difficulty> {
        self.mode.tracks_records().then_some(self.difficulty)
    }

    pub fn set_target_size(&mut self, px: f32) {
        self.target_size = px.clamp(TARGET_SIZE_MIN, TARGET_SIZE_MAX);
    }

    pub fn set_spawn_interval(&mut self, ms: u32) {
        self.spawn_interval_ms = ms.clamp(SPAWN_INTERVAL_MIN_MS, SPAWN_INTERVAL_MAX_MS);
    }

    pub fn set_target_lifetime(&mut self, ms: u32) {
        self.target_lifetime_ms = ms.clamp(TARGET_LIFETIME_MIN_MS, TARGET_LIFETIME_MAX_MS);
    }

    pub fn set_round_duration(&mut self, secs: u32) {
        self.round_duration_secs = secs.clamp(ROUND_DURATION_MIN_SECS, ROUND_DURATION_MAX_SECS);
    }

    /// Clamp every free-form value into its slider range (after loading)
    pub fn sanitize(&mut self) {
        self.set_target_size(self.target_size);
        self.set_spawn_interval(self.spawn_interval_ms);
        self.set_target_lifetime(self.target_lifetime_ms);
        self.set_round_duration(self.round_duration_secs);
    }

    /// Load settings from the store
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let mut settings: Settings = load_json(store, Self::STORAGE_KEY);
        settings.sanitize();
        settings
    }

    /// Save settings to the store
    pub fn save(&self, store: &mut dyn KeyValueStore) {
        if save_json(store, Self::STORAGE_KEY, self) {
            log::info!("Settings saved");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_difficulty_from_str() {
        assert_eq!(Difficulty::from_str("EASY"), Some(Difficulty::Easy));
        assert_eq!(Difficulty::from_str("med"), Some(Difficulty::Medium));
        assert_eq!(Difficulty::from_str("nightmare"), None);
        for d in Difficulty::ALL {
            assert_eq!(Difficulty::from_str(d.as_str()), Some(d));
        }
    }

    #[test]
    fn test_harder_tiers_are_tighter() {
        let easy = Difficulty::Easy.profile();
        let hard = Difficulty::Hard.profile();
        assert!(hard.target_size < easy.target_size);
        assert!(hard.spawn_interval_ms < easy.spawn_interval_ms);
        assert!(hard.target_lifetime_ms < easy.target_lifetime_ms);
    }

    #[test]
    fn test_profile_follows_mode() {
        let mut settings = Settings::default();
        settings.set_target_size(90.0);
        assert_eq!(settings.profile().target_size, 90.0);

        settings.mode = GameMode::Ranked;
        settings.difficulty = Difficulty::Hard;
        assert_eq!(settings.profile(), Difficulty::Hard.profile());
    }

    #[test]
    fn test_timer_mode_and_record_tier() {
        let mut settings = Settings::default();
        assert_eq!(settings.timer_mode(), TimerMode::CountUp);
        assert_eq!(settings.record_tier(), None);

        settings.mode = GameMode::Timed;
        settings.set_round_duration(45);
        assert_eq!(settings.timer_mode(), TimerMode::Countdown { duration_secs: 45 });
        assert_eq!(settings.record_tier(), None);

        let ranked = Settings::ranked(Difficulty::Easy);
        assert_eq!(ranked.record_tier(), Some(Difficulty::Easy));
    }

    #[test]
    fn test_setters_clamp() {
        let mut settings = Settings::default();
        settings.set_target_size(5.0);
        settings.set_spawn_interval(99_999);
        settings.set_target_lifetime(0);
        settings.set_round_duration(1);
        assert_eq!(settings.target_size, TARGET_SIZE_MIN);
        assert_eq!(settings.spawn_interval_ms, SPAWN_INTERVAL_MAX_MS);
        assert_eq!(settings.target_lifetime_ms, TARGET_LIFETIME_MIN_MS);
        assert_eq!(settings.round_duration_secs, ROUND_DURATION_MIN_SECS);
    }

    #[test]
    fn test_load_partial_json_fills_defaults() {
        let mut store = MemoryStore::new();
        store.set_item(Settings::STORAGE_KEY, r#"{"mode":"Timed","target_size":9000}"#);
        let settings = Settings::load(&store);
        assert_eq!(settings.mode, GameMode::Timed);
        assert_eq!(settings.target_size, TARGET_SIZE_MAX);
        assert_eq!(settings.spawn_interval_ms, 500);
    }

    #[test]
    fn test_save_roundtrip() {
        let mut store = MemoryStore::new();
        let settings = Settings::ranked(Difficulty::Hard);
        settings.save(&mut store);
        assert_eq!(Settings::load(&store), settings);
    }
}
