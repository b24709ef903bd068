//! Settings-screen preview: non-scoring targets at the configured cadence

use glam::Vec2;

use super::scheduler::Job;
use super::spawner::{random_color, random_position};
use super::state::{GameEvent, GameState, TargetColor};
use crate::consts::{DEFAULT_AREA_HEIGHT, DEFAULT_AREA_WIDTH, PREVIEW_FADE_MS};

#[derive(Debug, Clone)]
pub struct PreviewTarget {
    pub id: u32,
    pub pos: Vec2,
    pub size: f32,
    pub color: TargetColor,
    pub fading: bool,
}

#[derive(Debug, Clone)]
pub struct PreviewState {
    pub running: bool,
    /// Preview area size (px)
    pub area: Vec2,
    pub targets: Vec<PreviewTarget>,
}

impl Default for PreviewState {
    fn default() -> Self {
        Self {
            running: false,
            area: Vec2::new(DEFAULT_AREA_WIDTH / 2.0, DEFAULT_AREA_HEIGHT / 2.0),
            targets: Vec::new(),
        }
    }
}

impl GameState {
    /// Resize the preview area
    pub fn set_preview_area(&mut self, width: f32, height: f32) {
        self.preview.area = Vec2::new(width, height);
    }

    /// Start (or restart) the preview: one target now, then one per interval
    pub(crate) fn start_preview(&mut self, now: f64) {
        self.stop_preview();
        self.preview.running = true;
        self.spawn_preview_target(now);
        let interval = self.preview_interval();
        self.scheduler.schedule(now + interval, Job::PreviewSpawn);
    }

    /// Stop the preview and drop its targets
    pub(crate) fn stop_preview(&mut self) {
        self.scheduler.cancel(Job::is_preview);
        self.preview.running = false;
        for target in std::mem::take(&mut self.preview.targets) {
            self.emit(GameEvent::PreviewRemoved { id: target.id });
        }
    }

    pub(crate) fn run_preview_job(&mut self, at: f64, job: Job) {
        if !self.preview.running {
            return;
        }
        match job {
            Job::PreviewSpawn => {
                let interval = self.preview_interval();
                self.scheduler.schedule(at + interval, Job::PreviewSpawn);
                self.spawn_preview_target(at);
            }
            Job::PreviewFade { target_id } => {
                if let Some(target) = self.preview.targets.iter_mut().find(|t| t.id == target_id) {
                    target.fading = true;
                    self.emit(GameEvent::PreviewFading { id: target_id });
                    self.scheduler
                        .schedule(at + PREVIEW_FADE_MS, Job::PreviewRemove { target_id });
                }
            }
            Job::PreviewRemove { target_id } => {
                let before = self.preview.targets.len();
                self.preview.targets.retain(|t| t.id != target_id);
                if self.preview.targets.len() != before {
                    self.emit(GameEvent::PreviewRemoved { id: target_id });
                }
            }
            _ => {}
        }
    }

    /// Cadence of the round these settings would start
    fn preview_interval(&self) -> f64 {
        f64::from(self.settings.profile().spawn_interval_ms.max(1))
    }

    fn spawn_preview_target(&mut self, at: f64) {
        let profile = self.settings.profile();
        let size = profile.target_size;
        let Some(pos) = random_position(&mut self.rng, self.preview.area, size) else {
            return;
        };
        let color = random_color(&mut self.rng);
        let id = self.next_entity_id();
        self.preview.targets.push(PreviewTarget {
            id,
            pos,
            size,
            color,
            fading: false,
        });
        self.emit(GameEvent::PreviewSpawned {
            id,
            pos,
            size,
            color,
        });
        let lifetime = f64::from(profile.target_lifetime_ms);
        self.scheduler
            .schedule(at + lifetime, Job::PreviewFade { target_id: id });
    }
}

#[cfg(test)]
mod tests {
    use crate::persistence::MemoryStore;
    use crate::settings::{Difficulty, GameMode};
    use crate::sim::{GameEvent, GamePhase, GameState};

    fn settings_screen() -> GameState {
        let mut state = GameState::new(3, Box::new(MemoryStore::new()));
        state.set_preview_area(400.0, 300.0);
        state.open_settings(0.0);
        state
    }

    #[test]
    fn test_preview_spawns_on_cadence() {
        let mut state = settings_screen();
        assert_eq!(state.phase, GamePhase::Settings);
        assert_eq!(state.preview.targets.len(), 1);

        // Default cadence 500 ms, lifetime 1100 ms, fade 300 ms
        state.advance(1000.0);
        assert_eq!(state.preview.targets.len(), 3);

        state.advance(1100.0);
        assert!(state.preview.targets[0].fading);

        state.advance(1400.0);
        assert!(state.preview.targets.iter().all(|t| t.id != 1));
    }

    #[test]
    fn test_preview_never_scores() {
        let mut state = settings_screen();
        state.advance(5000.0);
        assert_eq!(state.round.score, 0);
        assert_eq!(state.round.misses, 0);
    }

    #[test]
    fn test_interval_change_restarts_preview() {
        let mut state = settings_screen();
        state.advance(1000.0);
        state.drain_events();

        state.update_settings(1000.0, |s| {
            s.set_spawn_interval(2000);
            s.set_target_lifetime(3000);
        });
        let events = state.drain_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::PreviewRemoved { .. })));
        assert_eq!(state.preview.targets.len(), 1);

        // Next spawn only after the new interval
        state.advance(2999.0);
        assert_eq!(state.preview.targets.len(), 1);
        state.advance(3000.0);
        assert_eq!(state.preview.targets.len(), 2);
    }

    #[test]
    fn test_ranked_preview_uses_tier_cadence() {
        let mut state = GameState::new(3, Box::new(MemoryStore::new()));
        state.update_settings(0.0, |s| {
            s.mode = GameMode::Ranked;
            s.difficulty = Difficulty::Easy;
        });
        state.set_preview_area(400.0, 300.0);
        state.open_settings(0.0);

        // Easy tier: 80 px every 900 ms, the 500 ms slider value is ignored
        state.advance(899.0);
        assert_eq!(state.preview.targets.len(), 1);
        assert_eq!(state.preview.targets[0].size, 80.0);
        state.advance(900.0);
        assert_eq!(state.preview.targets.len(), 2);
    }

    #[test]
    fn test_tier_switch_restarts_preview() {
        let mut state = settings_screen();
        state.advance(100.0);
        state.drain_events();

        state.update_settings(100.0, |s| {
            s.mode = GameMode::Ranked;
            s.difficulty = Difficulty::Hard;
        });
        let events = state.drain_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::PreviewRemoved { .. })));
        assert_eq!(state.preview.targets.len(), 1);
        assert_eq!(state.preview.targets[0].size, 50.0);

        // Hard tier cadence is 450 ms from the restart
        state.advance(549.0);
        assert_eq!(state.preview.targets.len(), 1);
        state.advance(550.0);
        assert_eq!(state.preview.targets.len(), 2);
    }

    #[test]
    fn test_same_cadence_keeps_preview() {
        let mut state = settings_screen();
        state.drain_events();
        // Timed mode keeps the slider cadence
        state.update_settings(100.0, |s| s.mode = GameMode::Timed);
        assert!(state.drain_events().is_empty());
        assert_eq!(state.preview.targets.len(), 1);
    }

    #[test]
    fn test_leaving_settings_stops_preview() {
        let mut state = settings_screen();
        assert!(state.close_settings());
        assert_eq!(state.phase, GamePhase::Menu);
        assert!(!state.close_settings());
        assert!(!state.preview.running);
        assert!(state.preview.targets.is_empty());
        state.advance(10_000.0);
        assert!(state.preview.targets.is_empty());
    }

    #[test]
    fn test_tiny_preview_area_skips() {
        let mut state = GameState::new(3, Box::new(MemoryStore::new()));
        state.set_preview_area(100.0, 100.0);
        state.open_settings(0.0);
        state.advance(3000.0);
        assert!(state.preview.targets.is_empty());
    }
}
