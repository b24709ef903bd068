//! Round lifecycle and input handling
//!
//! Every entry point takes the current time in ms and first advances the job
//! queue to it, so callers never need to tick separately before an input.

use glam::Vec2;

use super::scheduler::Job;
use super::scoring::{AccuracyView, HitResult, resolve_hit, resolve_miss};
use super::spawner::{random_color, random_position};
use super::state::{
    GameEvent, GamePhase, GameState, MissCause, RoundState, RoundSummary, Target, TargetState,
};
use super::timer::TimerTick;
use crate::consts::*;
use crate::highscores::RecordOutcome;
use crate::settings::Settings;

/// Player-level commands (buttons, keyboard shortcuts)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Menu → settings
    OpenSettings,
    /// Start a round (from settings) or restart (from the summary)
    Start,
    TogglePause,
    /// Finish the round now and show the summary
    End,
    /// Abandon the round without a summary
    Quit,
    /// Back to the title screen
    Menu,
}

impl Command {
    /// Screen this command opens from `phase` when that screen spawns targets
    /// right away, so its area has to be visible and measured beforehand
    pub fn spawning_phase(&self, phase: GamePhase) -> Option<GamePhase> {
        match self {
            Command::OpenSettings if matches!(phase, GamePhase::Menu | GamePhase::Ended) => {
                Some(GamePhase::Settings)
            }
            Command::Start if !phase.in_round() => Some(GamePhase::Running),
            _ => None,
        }
    }
}

/// Result of a pointer-down in the play area
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerOutcome {
    Hit(HitResult),
    Miss,
    /// Not running, or landed on a target that is already resolved
    Ignored,
}

/// Inputs collected during one frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub commands: Vec<Command>,
    /// Pointer-down position in play-area coordinates
    pub pointer: Option<Vec2>,
    /// Direct hit on a known target element
    pub hit_target: Option<u32>,
}

/// Advance the game to `now` and apply one frame of input
pub fn tick(state: &mut GameState, input: &TickInput, now: f64) {
    state.advance(now);

    for command in &input.commands {
        state.apply(*command, now);
    }

    if let Some(id) = input.hit_target {
        state.hit_target(id, now);
    }

    if let Some(pos) = input.pointer {
        state.pointer_down(pos, now);
    }
}

impl GameState {
    /// Run every job due at or before `now`, in time order
    pub fn advance(&mut self, now: f64) {
        while let Some((at, job)) = self.scheduler.pop_due(now) {
            self.now = self.now.max(at);
            self.run_job(at, job);
        }
        self.now = self.now.max(now);
    }

    /// Apply a command, returns whether it changed anything
    pub fn apply(&mut self, command: Command, now: f64) -> bool {
        match command {
            Command::OpenSettings => self.open_settings(now),
            Command::Start => {
                if self.phase == GamePhase::Ended {
                    self.restart(now)
                } else {
                    self.start(now)
                }
            }
            Command::TogglePause => self.toggle_pause(now),
            Command::End => self.end(now).is_some(),
            Command::Quit => self.quit(now),
            Command::Menu => {
                if self.phase.in_round() {
                    self.quit(now)
                } else {
                    self.menu()
                }
            }
        }
    }

    // === Screens ===

    /// Menu → Settings, starts the preview
    pub fn open_settings(&mut self, now: f64) -> bool {
        self.advance(now);
        if !matches!(self.phase, GamePhase::Menu | GamePhase::Ended) {
            return false;
        }
        self.set_phase(GamePhase::Settings);
        self.start_preview(now);
        true
    }

    /// Settings/Ended → Menu
    pub fn menu(&mut self) -> bool {
        if self.phase.in_round() || self.phase == GamePhase::Menu {
            return false;
        }
        self.stop_preview();
        self.set_phase(GamePhase::Menu);
        true
    }

    /// Settings → Menu, stops the preview
    pub fn close_settings(&mut self) -> bool {
        if self.phase != GamePhase::Settings {
            return false;
        }
        self.menu()
    }

    /// Edit settings, persist them and refresh the preview on a cadence change
    pub fn update_settings(&mut self, now: f64, edit: impl FnOnce(&mut Settings)) {
        self.advance(now);
        // Effective cadence: ranked tiers override the slider
        let old_interval = self.settings.profile().spawn_interval_ms;

        edit(&mut self.settings);
        self.settings.sanitize();
        self.settings.save(self.store.as_mut());

        if self.phase == GamePhase::Settings
            && self.settings.profile().spawn_interval_ms != old_interval
        {
            self.start_preview(now);
        }
    }

    // === Round lifecycle ===

    /// Idle/Ended → Running: reset counters, arm clocks, spawn one target now
    pub fn start(&mut self, now: f64) -> bool {
        self.advance(now);
        if self.phase.in_round() {
            return false;
        }

        self.stop_preview();
        self.scheduler.cancel(Job::is_round_clock);

        self.generation += 1;
        self.settings.sanitize();
        self.profile = self.settings.profile();
        self.round_mode = self.settings.mode;
        self.round_tier = self.settings.record_tier();
        self.freeze_expiry = self.settings.freeze_targets_on_pause;
        self.round = RoundState::new(self.settings.timer_mode());
        self.targets.clear();
        self.paused_at = None;
        self.last_summary = None;

        self.set_phase(GamePhase::Running);
        let period = self.spawn_period();
        self.scheduler.schedule(now + period, Job::SpawnTick);
        self.scheduler.schedule(now + TIMER_PERIOD_MS, Job::TimerTick);

        log::info!(
            "Round {} started ({}, {}px, every {}ms, {}ms lifetime)",
            self.generation,
            self.round_mode.as_str(),
            self.profile.target_size,
            self.profile.spawn_interval_ms,
            self.profile.target_lifetime_ms
        );
        self.emit(GameEvent::RoundStarted {
            generation: self.generation,
            mode: self.round_mode,
        });

        self.spawn_target(now);
        true
    }

    /// Ended → Running
    pub fn restart(&mut self, now: f64) -> bool {
        if self.phase != GamePhase::Ended {
            return false;
        }
        self.start(now)
    }

    /// Running ↔ Paused
    pub fn toggle_pause(&mut self, now: f64) -> bool {
        self.advance(now);
        match self.phase {
            GamePhase::Running => {
                self.paused_at = Some(now);
                self.set_phase(GamePhase::Paused);
                self.emit(GameEvent::Paused);
                true
            }
            GamePhase::Paused => {
                let paused_for = self.paused_at.take().map_or(0.0, |t| (now - t).max(0.0));
                if self.freeze_expiry && paused_for > 0.0 {
                    let generation = self.generation;
                    for target in self.targets.iter_mut().filter(|t| t.is_active()) {
                        target.spawned_at += paused_for;
                        target.expires_at += paused_for;
                        self.scheduler.schedule(
                            target.expires_at,
                            Job::Expire {
                                generation,
                                target_id: target.id,
                            },
                        );
                    }
                }
                self.set_phase(GamePhase::Running);
                self.emit(GameEvent::Resumed);
                true
            }
            _ => false,
        }
    }

    /// Running/Paused → Menu, discarding the round
    pub fn quit(&mut self, now: f64) -> bool {
        self.advance(now);
        if !self.phase.in_round() {
            return false;
        }

        self.scheduler.cancel(Job::is_round_clock);
        self.targets.clear();
        self.paused_at = None;
        self.round = RoundState::new(self.settings.timer_mode());

        log::info!("Round {} abandoned", self.generation);
        self.emit(GameEvent::RoundQuit);
        self.set_phase(GamePhase::Menu);
        true
    }

    /// Running/Paused → Ended, returns the summary
    pub fn end(&mut self, now: f64) -> Option<RoundSummary> {
        self.advance(now);
        if !self.phase.in_round() {
            return None;
        }
        Some(self.finish_round())
    }

    // === Input ===

    /// Pointer-down at `pos`: hit the topmost live target under it, or miss
    pub fn pointer_down(&mut self, pos: Vec2, now: f64) -> PointerOutcome {
        self.advance(now);
        if self.phase != GamePhase::Running {
            return PointerOutcome::Ignored;
        }

        // Later targets are drawn on top
        match self.targets.iter().rposition(|t| t.contains(pos)) {
            Some(idx) if self.targets[idx].is_active() => {
                PointerOutcome::Hit(self.hit_at(idx, now))
            }
            Some(_) => PointerOutcome::Ignored,
            None => {
                resolve_miss(&mut self.round);
                self.emit(GameEvent::Missed {
                    pos,
                    cause: MissCause::Click,
                });
                PointerOutcome::Miss
            }
        }
    }

    /// Hit a target by id (element click), `None` if not hittable
    pub fn hit_target(&mut self, id: u32, now: f64) -> Option<HitResult> {
        self.advance(now);
        if self.phase != GamePhase::Running {
            return None;
        }
        let idx = self
            .targets
            .iter()
            .position(|t| t.id == id && t.is_active())?;
        Some(self.hit_at(idx, now))
    }

    // === Internals ===

    fn set_phase(&mut self, phase: GamePhase) {
        if self.phase != phase {
            self.phase = phase;
            self.emit(GameEvent::PhaseChanged(phase));
        }
    }

    fn spawn_period(&self) -> f64 {
        f64::from(self.profile.spawn_interval_ms.max(1))
    }

    fn run_job(&mut self, at: f64, job: Job) {
        match job {
            Job::SpawnTick => {
                let period = self.spawn_period();
                self.scheduler.schedule(at + period, Job::SpawnTick);
                if self.phase == GamePhase::Running {
                    self.spawn_target(at);
                }
            }
            Job::TimerTick => {
                self.scheduler.schedule(at + TIMER_PERIOD_MS, Job::TimerTick);
                if !self.phase.in_round() {
                    return;
                }
                let paused = self.phase == GamePhase::Paused;
                let outcome = self.round.timer.tick(paused);
                if outcome == TimerTick::Frozen {
                    return;
                }
                let display_secs = self.round.timer.display_secs();
                self.emit(GameEvent::TimerTick { display_secs });
                if outcome == TimerTick::Finished {
                    log::info!("Time up");
                    self.finish_round();
                }
            }
            Job::Expire {
                generation,
                target_id,
            } => self.expire_target(at, generation, target_id),
            Job::Remove {
                generation,
                target_id,
            } => self.remove_target(generation, target_id),
            Job::PreviewSpawn | Job::PreviewFade { .. } | Job::PreviewRemove { .. } => {
                self.run_preview_job(at, job)
            }
        }
    }

    fn spawn_target(&mut self, at: f64) {
        let size = self.profile.target_size;
        let Some(pos) = random_position(&mut self.rng, self.area, size) else {
            log::debug!(
                "Play area {}x{} too small for {}px targets, spawn skipped",
                self.area.x,
                self.area.y,
                size
            );
            return;
        };
        let color = random_color(&mut self.rng);
        let id = self.next_entity_id();
        let lifetime_ms = f64::from(self.profile.target_lifetime_ms);

        self.targets.push(Target {
            id,
            pos,
            size,
            color,
            spawned_at: at,
            lifetime_ms,
            expires_at: at + lifetime_ms,
            state: TargetState::Active,
        });
        self.scheduler.schedule(
            at + lifetime_ms,
            Job::Expire {
                generation: self.generation,
                target_id: id,
            },
        );
        self.emit(GameEvent::TargetSpawned {
            id,
            pos,
            size,
            color,
        });
    }

    fn hit_at(&mut self, idx: usize, now: f64) -> HitResult {
        let target = &mut self.targets[idx];
        target.state = TargetState::Hit;
        let (id, pos) = (target.id, target.pos);
        let reaction = target.reaction_time(now);

        let hit = resolve_hit(&mut self.round, reaction);
        log::debug!(
            "Hit target {} in {:.0}ms: +{} ({})",
            id,
            reaction,
            hit.points,
            hit.rating.as_str()
        );

        self.scheduler.schedule(
            now + HIT_REMOVE_MS,
            Job::Remove {
                generation: self.generation,
                target_id: id,
            },
        );
        self.emit(GameEvent::TargetHit { id, pos, hit });
        hit
    }

    fn expire_target(&mut self, at: f64, generation: u32, target_id: u32) {
        // Stale callbacks from an older round or after the round is over
        if generation != self.generation || !self.phase.in_round() {
            return;
        }
        // Frozen targets get a fresh expiry on resume
        if self.phase == GamePhase::Paused && self.freeze_expiry {
            return;
        }
        let Some(target) = self.targets.iter_mut().find(|t| t.id == target_id) else {
            return;
        };
        if !target.is_active() || at < target.expires_at {
            return;
        }

        target.state = TargetState::Expired;
        let pos = target.pos;
        resolve_miss(&mut self.round);

        self.emit(GameEvent::TargetExpired { id: target_id, pos });
        self.emit(GameEvent::Missed {
            pos,
            cause: MissCause::Expired,
        });
        self.scheduler
            .schedule(at + EXPIRE_FADE_MS, Job::Remove { generation, target_id });
    }

    fn remove_target(&mut self, generation: u32, target_id: u32) {
        if generation != self.generation {
            return;
        }
        if let Some(idx) = self.targets.iter().position(|t| t.id == target_id) {
            self.targets.remove(idx);
            self.emit(GameEvent::TargetRemoved { id: target_id });
        }
    }

    fn finish_round(&mut self) -> RoundSummary {
        self.scheduler.cancel(Job::is_round_clock);
        self.paused_at = None;

        let records = match self.round_tier {
            Some(tier) => {
                let outcome =
                    self.high_scores
                        .record(tier, self.round.score, self.round.max_combo);
                if outcome.is_new_record() {
                    log::info!("New {} record", tier.as_str());
                    self.high_scores.save(self.store.as_mut());
                }
                outcome
            }
            None => RecordOutcome::default(),
        };

        let summary = RoundSummary {
            mode: self.round_mode,
            difficulty: self.round_tier,
            score: self.round.score,
            time_secs: self.round.timer.elapsed_secs,
            hits: self.round.hits,
            misses: self.round.misses,
            accuracy: self.round.accuracy(AccuracyView::Summary),
            max_combo: self.round.max_combo,
            records,
            new_record: records.is_new_record(),
        };

        log::info!(
            "Round {} over: score {}, {} hits, {} misses, max combo {}",
            self.generation,
            summary.score,
            summary.hits,
            summary.misses,
            summary.max_combo
        );

        self.last_summary = Some(summary.clone());
        self.set_phase(GamePhase::Ended);
        self.emit(GameEvent::RoundEnded(summary.clone()));
        summary
    }
}
