//! Game state and core simulation types
//!
//! `GameState` owns everything a running game mutates: settings, the current
//! round, live targets, the job queue, the RNG and the outgoing event queue.
//! Lifecycle and input handling live in `tick.rs`.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::preview::PreviewState;
use super::scheduler::Scheduler;
use super::scoring::{AccuracyView, HitResult, accuracy, multiplier};
use super::timer::{RoundTimer, TimerMode};
use crate::consts::{DEFAULT_AREA_HEIGHT, DEFAULT_AREA_WIDTH};
use crate::highscores::{HighScores, RecordOutcome};
use crate::persistence::KeyValueStore;
use crate::settings::{Difficulty, DifficultyProfile, GameMode, Settings};

/// Which screen the game is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen
    Menu,
    /// Settings screen with live preview
    Settings,
    /// Round in progress
    Running,
    /// Round suspended, clocks tick without effect
    Paused,
    /// Round over, summary on screen
    Ended,
}

impl GamePhase {
    /// No round exists (menu or settings)
    pub fn is_idle(&self) -> bool {
        matches!(self, GamePhase::Menu | GamePhase::Settings)
    }

    /// A round exists and can still change
    pub fn in_round(&self) -> bool {
        matches!(self, GamePhase::Running | GamePhase::Paused)
    }
}

/// Color tag (cosmetic)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetColor {
    Purple,
    Yellow,
    Green,
}

impl TargetColor {
    pub const ALL: [TargetColor; 3] = [TargetColor::Purple, TargetColor::Yellow, TargetColor::Green];

    /// CSS class
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetColor::Purple => "purple",
            TargetColor::Yellow => "yellow",
            TargetColor::Green => "green",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetState {
    Active,
    Hit,
    Expired,
}

/// A clickable target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub id: u32,
    /// Center, in play-area coordinates
    pub pos: Vec2,
    /// Diameter in px
    pub size: f32,
    pub color: TargetColor,
    /// Spawn time (ms)
    pub spawned_at: f64,
    pub lifetime_ms: f64,
    /// Absolute expiry time (ms), shifted on resume when expiry is frozen
    pub expires_at: f64,
    pub state: TargetState,
}

impl Target {
    pub fn is_active(&self) -> bool {
        self.state == TargetState::Active
    }

    /// Whether a pointer position lands on the target
    pub fn contains(&self, point: Vec2) -> bool {
        self.pos.distance(point) <= self.size / 2.0
    }

    /// Reaction time for a hit at `now`
    pub fn reaction_time(&self, now: f64) -> f64 {
        (now - self.spawned_at).max(0.0)
    }

    /// Top-left corner, for absolute positioning
    pub fn top_left(&self) -> Vec2 {
        self.pos - Vec2::splat(self.size / 2.0)
    }
}

/// Counters for one round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundState {
    pub score: u64,
    pub combo: u32,
    pub max_combo: u32,
    pub hits: u32,
    pub misses: u32,
    pub timer: RoundTimer,
}

impl RoundState {
    pub fn new(mode: TimerMode) -> Self {
        Self {
            score: 0,
            combo: 0,
            max_combo: 0,
            hits: 0,
            misses: 0,
            timer: RoundTimer::new(mode),
        }
    }

    /// Current combo multiplier (never stored)
    pub fn multiplier(&self) -> f64 {
        multiplier(self.combo)
    }

    pub fn accuracy(&self, view: AccuracyView) -> u32 {
        accuracy(self.hits, self.misses, view)
    }
}

/// Why a miss was counted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissCause {
    /// Click/tap on empty play area
    Click,
    /// Target lifetime ran out
    Expired,
}

/// End-of-round report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub mode: GameMode,
    /// Tier compared against the record (ranked only)
    pub difficulty: Option<Difficulty>,
    pub score: u64,
    /// Seconds actually played
    pub time_secs: u32,
    pub hits: u32,
    pub misses: u32,
    /// Summary accuracy (0% when nothing was attempted)
    pub accuracy: u32,
    pub max_combo: u32,
    pub records: RecordOutcome,
    pub new_record: bool,
}

/// HUD readout
#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    pub score: u64,
    pub combo: u32,
    pub time_label: String,
    pub accuracy: u32,
    pub multiplier_label: String,
    /// Multiplier above x1.0
    pub boosted: bool,
}

/// Things the presentation layer should react to
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    RoundStarted { generation: u32, mode: GameMode },
    TargetSpawned { id: u32, pos: Vec2, size: f32, color: TargetColor },
    TargetHit { id: u32, pos: Vec2, hit: HitResult },
    TargetExpired { id: u32, pos: Vec2 },
    TargetRemoved { id: u32 },
    Missed { pos: Vec2, cause: MissCause },
    TimerTick { display_secs: u32 },
    Paused,
    Resumed,
    RoundEnded(RoundSummary),
    RoundQuit,
    PreviewSpawned { id: u32, pos: Vec2, size: f32, color: TargetColor },
    PreviewFading { id: u32 },
    PreviewRemoved { id: u32 },
    PhaseChanged(GamePhase),
}

/// Complete game state
pub struct GameState {
    pub settings: Settings,
    pub high_scores: HighScores,
    pub phase: GamePhase,
    /// Current (or last finished) round
    pub round: RoundState,
    /// Parameters locked in at round start
    pub profile: DifficultyProfile,
    /// Mode locked in at round start
    pub round_mode: GameMode,
    /// Record tier locked in at round start (ranked only)
    pub round_tier: Option<Difficulty>,
    /// Play area size (px)
    pub area: Vec2,
    /// Live targets, in spawn order
    pub targets: Vec<Target>,
    pub preview: PreviewState,
    pub last_summary: Option<RoundSummary>,
    /// Bumped on every round start
    pub(crate) generation: u32,
    pub(crate) paused_at: Option<f64>,
    pub(crate) freeze_expiry: bool,
    pub(crate) scheduler: Scheduler,
    pub(crate) rng: Pcg32,
    pub(crate) store: Box<dyn KeyValueStore>,
    pub(crate) events: Vec<GameEvent>,
    /// Latest time the scheduler has been advanced to
    pub(crate) now: f64,
    next_id: u32,
}

impl GameState {
    /// Create a game, loading settings and records from `store`
    pub fn new(seed: u64, store: Box<dyn KeyValueStore>) -> Self {
        let settings = Settings::load(store.as_ref());
        let high_scores = HighScores::load(store.as_ref());
        Self::with_settings(seed, settings, high_scores, store)
    }

    /// Create a game with explicit settings and records
    pub fn with_settings(
        seed: u64,
        mut settings: Settings,
        high_scores: HighScores,
        store: Box<dyn KeyValueStore>,
    ) -> Self {
        settings.sanitize();
        let profile = settings.profile();
        let round = RoundState::new(settings.timer_mode());
        Self {
            round_mode: settings.mode,
            round_tier: settings.record_tier(),
            freeze_expiry: settings.freeze_targets_on_pause,
            settings,
            high_scores,
            phase: GamePhase::Menu,
            round,
            profile,
            area: Vec2::new(DEFAULT_AREA_WIDTH, DEFAULT_AREA_HEIGHT),
            targets: Vec::new(),
            preview: PreviewState::default(),
            last_summary: None,
            generation: 0,
            paused_at: None,
            scheduler: Scheduler::new(),
            rng: Pcg32::seed_from_u64(seed),
            store,
            events: Vec::new(),
            now: 0.0,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub(crate) fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take every event produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Resize the play area (layout change)
    pub fn set_area(&mut self, width: f32, height: f32) {
        self.area = Vec2::new(width, height);
    }

    pub fn target(&self, id: u32) -> Option<&Target> {
        self.targets.iter().find(|t| t.id == id)
    }

    pub fn active_targets(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter().filter(|t| t.is_active())
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Latest time the simulation has seen
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Time of the next pending job, if any
    pub fn next_job_at(&self) -> Option<f64> {
        self.scheduler.next_at()
    }

    /// HUD values for the current round
    pub fn hud(&self) -> Hud {
        let multiplier = self.round.multiplier();
        Hud {
            score: self.round.score,
            combo: self.round.combo,
            time_label: self.round.timer.label(),
            accuracy: self.round.accuracy(AccuracyView::Hud),
            multiplier_label: format!("x{:.1}", multiplier),
            boosted: multiplier > 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_target_hit_test() {
        let target = Target {
            id: 1,
            pos: Vec2::new(100.0, 100.0),
            size: 40.0,
            color: TargetColor::Green,
            spawned_at: 0.0,
            lifetime_ms: 1000.0,
            expires_at: 1000.0,
            state: TargetState::Active,
        };
        assert!(target.contains(Vec2::new(100.0, 100.0)));
        assert!(target.contains(Vec2::new(120.0, 100.0)));
        assert!(!target.contains(Vec2::new(121.0, 100.0)));
        assert!(!target.contains(Vec2::new(115.0, 115.0)));
        assert_eq!(target.top_left(), Vec2::new(80.0, 80.0));
        assert_eq!(target.reaction_time(250.0), 250.0);
    }

    #[test]
    fn test_new_state_is_idle() {
        let state = GameState::new(1, Box::new(MemoryStore::new()));
        assert_eq!(state.phase, GamePhase::Menu);
        assert!(state.phase.is_idle());
        assert!(state.targets.is_empty());
        assert_eq!(state.settings, Settings::default());
        assert_eq!(state.high_scores, HighScores::new());
    }

    #[test]
    fn test_hud_before_first_attempt() {
        let state = GameState::new(1, Box::new(MemoryStore::new()));
        let hud = state.hud();
        assert_eq!(hud.accuracy, 100);
        assert_eq!(hud.multiplier_label, "x1.0");
        assert!(!hud.boosted);
        assert_eq!(hud.time_label, "0:00");
    }

    #[test]
    fn test_new_loads_stored_records() {
        let mut store = MemoryStore::new();
        store.set_item(HighScores::STORAGE_KEY, r#"{"highScores":{"easy":500}}"#);
        let state = GameState::new(1, Box::new(store));
        assert_eq!(state.high_scores.best_score(Difficulty::Easy), 500);
    }
}
