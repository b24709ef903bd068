//! OBZVON entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlInputElement, KeyboardEvent, PointerEvent};

    use obzvon::persistence::default_store;
    use obzvon::platform::input::should_prevent_default;
    use obzvon::platform::{command_for_key, now_ms, time_seed};
    use obzvon::sim::{Command, GameEvent, GamePhase, GameState, RoundSummary};
    use obzvon::{Difficulty, GameMode, format_seconds_label, format_time};

    /// How long score/miss popups stay on screen
    const POPUP_MS: f64 = 800.0;

    const PAUSED_OVERLAY: &str = "<div class=\"game-paused\" id=\"gamePaused\"><h2>PAUSED</h2>\
        <p>Нажми <kbd>P</kbd> чтобы продолжить</p>\
        <p>Нажми <kbd>ESC</kbd> чтобы выйти</p></div>";

    /// Game instance holding all state
    struct Game {
        state: GameState,
        document: Document,
        /// Popup elements and their removal time
        popups: Vec<(Element, f64)>,
    }

    impl Game {
        fn new(document: Document) -> Self {
            Self {
                state: GameState::new(time_seed(), default_store()),
                document,
                popups: Vec::new(),
            }
        }

        fn element(&self, id: &str) -> Option<Element> {
            self.document.get_element_by_id(id)
        }

        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.element(id) {
                el.set_text_content(Some(text));
            }
        }

        fn toggle_class(&self, id: &str, class: &str, on: bool) {
            if let Some(el) = self.element(id) {
                let _ = el.class_list().toggle_with_force(class, on);
            }
        }

        /// Measure the area visible in `phase`; hidden areas read as 0x0
        fn sync_area_sizes(&mut self, phase: GamePhase) {
            if phase.in_round() {
                if let Some(area) = self.element("gameArea") {
                    let rect = area.get_bounding_client_rect();
                    self.state.set_area(rect.width() as f32, rect.height() as f32);
                }
            }
            if phase == GamePhase::Settings {
                if let Some(area) = self.element("previewArea") {
                    let rect = area.get_bounding_client_rect();
                    self.state
                        .set_preview_area(rect.width() as f32, rect.height() as f32);
                }
            }
        }

        /// Convert a client position to play-area coordinates
        fn to_area_pos(&self, client_x: i32, client_y: i32) -> Option<Vec2> {
            let rect = self.element("gameArea")?.get_bounding_client_rect();
            Some(Vec2::new(
                client_x as f32 - rect.left() as f32,
                client_y as f32 - rect.top() as f32,
            ))
        }

        fn run_command(&mut self, command: Command) {
            let now = now_ms();
            // The first target spawns inside `apply`, so its area must be laid out first
            if let Some(next) = command.spawning_phase(self.state.phase) {
                self.show_screen(next);
                self.sync_area_sizes(next);
            }
            if self.state.apply(command, now) {
                log::debug!("{:?} -> {:?}", command, self.state.phase);
            }
            self.flush(now);
            self.show_screen(self.state.phase);
        }

        /// One animation frame
        fn frame(&mut self, now: f64) {
            self.sync_area_sizes(self.state.phase);
            self.state.advance(now);
            self.flush(now);
        }

        fn flush(&mut self, now: f64) {
            for event in self.state.drain_events() {
                self.apply_event(event, now);
            }
            self.expire_popups(now);
            self.update_hud();
        }

        fn apply_event(&mut self, event: GameEvent, now: f64) {
            match event {
                GameEvent::PhaseChanged(phase) => self.show_screen(phase),
                GameEvent::RoundStarted { .. } => {
                    if let Some(area) = self.element("gameArea") {
                        area.set_inner_html(PAUSED_OVERLAY);
                    }
                    self.popups.clear();
                }
                GameEvent::TargetSpawned {
                    id,
                    pos,
                    size,
                    color,
                } => {
                    let class = format!("target {}", color.as_str());
                    self.spawn_element("gameArea", &format!("target-{}", id), &class, pos, size);
                }
                GameEvent::TargetHit { id, pos, hit } => {
                    self.toggle_class(&format!("target-{}", id), "hit", true);
                    let size = self.state.profile.target_size;
                    let at = pos - Vec2::new(0.0, size / 2.0);
                    self.show_popup(at, &format!("+{}", hit.points), hit.rating.as_str(), now);
                }
                GameEvent::TargetExpired { id, .. } => {
                    self.toggle_class(&format!("target-{}", id), "expired", true);
                }
                GameEvent::Missed { pos, .. } => {
                    self.show_popup(pos, "MISS", "miss", now);
                }
                GameEvent::TargetRemoved { id } => self.remove_element(&format!("target-{}", id)),
                GameEvent::Paused => self.toggle_class("gamePaused", "active", true),
                GameEvent::Resumed => self.toggle_class("gamePaused", "active", false),
                GameEvent::RoundEnded(summary) => self.show_summary(&summary),
                GameEvent::RoundQuit => log::info!("Round abandoned"),
                GameEvent::TimerTick { .. } => {}
                GameEvent::PreviewSpawned {
                    id,
                    pos,
                    size,
                    color,
                } => {
                    let class = format!("preview-target {}", color.as_str());
                    self.spawn_element("previewArea", &format!("preview-{}", id), &class, pos, size);
                }
                GameEvent::PreviewFading { id } => {
                    self.toggle_class(&format!("preview-{}", id), "fade-out", true);
                }
                GameEvent::PreviewRemoved { id } => {
                    self.remove_element(&format!("preview-{}", id));
                }
            }
        }

        fn spawn_element(&self, parent: &str, id: &str, class: &str, pos: Vec2, size: f32) {
            let Some(parent) = self.element(parent) else {
                return;
            };
            let Ok(el) = self.document.create_element("div") else {
                return;
            };
            el.set_id(id);
            el.set_class_name(class);
            let corner = pos - Vec2::splat(size / 2.0);
            let _ = el.set_attribute(
                "style",
                &format!(
                    "width:{size}px;height:{size}px;left:{}px;top:{}px",
                    corner.x, corner.y
                ),
            );
            let _ = parent.append_child(&el);
        }

        fn remove_element(&self, id: &str) {
            if let Some(el) = self.element(id) {
                el.remove();
            }
        }

        fn show_popup(&mut self, pos: Vec2, text: &str, kind: &str, now: f64) {
            let Some(area) = self.element("gameArea") else {
                return;
            };
            let Ok(el) = self.document.create_element("div") else {
                return;
            };
            el.set_class_name(&format!("score-popup {}", kind));
            el.set_text_content(Some(text));
            let _ = el.set_attribute("style", &format!("left:{}px;top:{}px", pos.x, pos.y));
            let _ = area.append_child(&el);
            self.popups.push((el, now + POPUP_MS));
        }

        fn expire_popups(&mut self, now: f64) {
            self.popups.retain(|(el, until)| {
                if *until <= now {
                    el.remove();
                    false
                } else {
                    true
                }
            });
        }

        fn show_screen(&self, phase: GamePhase) {
            let menu = phase == GamePhase::Menu;
            self.toggle_class("hero", "hidden", !menu);
            self.toggle_class("footer", "hidden", !menu);
            self.toggle_class("settingsScreen", "active", phase == GamePhase::Settings);
            self.toggle_class("gameScreen", "active", phase.in_round());
            self.toggle_class("gameOver", "active", phase == GamePhase::Ended);
            if phase == GamePhase::Settings {
                self.sync_setting_controls();
            }
        }

        fn show_summary(&self, summary: &RoundSummary) {
            self.set_text("finalScore", &summary.score.to_string());
            self.set_text("finalTime", &format_time(summary.time_secs));
            self.set_text("finalHits", &summary.hits.to_string());
            self.set_text("finalAccuracy", &format!("{}%", summary.accuracy));
            self.set_text("finalMaxCombo", &summary.max_combo.to_string());
            self.toggle_class("newRecord", "active", summary.new_record);
        }

        fn update_hud(&self) {
            if !self.state.phase.in_round() {
                return;
            }
            let hud = self.state.hud();
            self.set_text("score", &hud.score.to_string());
            self.set_text("combo", &format!("x{}", hud.combo));
            self.set_text("timer", &hud.time_label);
            self.set_text("accuracy", &format!("{}%", hud.accuracy));
            self.set_text("multiplier", &hud.multiplier_label);
            self.toggle_class("multiplier", "boosted", hud.boosted);
        }

        /// Mirror loaded settings into the settings-screen controls
        fn sync_setting_controls(&self) {
            let settings = &self.state.settings;
            set_input_value(&self.document, "targetSize", &settings.target_size.to_string());
            set_input_value(&self.document, "spawnSpeed", &settings.spawn_interval_ms.to_string());
            set_input_value(&self.document, "targetLife", &settings.target_lifetime_ms.to_string());
            set_input_value(&self.document, "roundDuration", &settings.round_duration_secs.to_string());
            self.update_setting_labels();
        }

        fn update_setting_labels(&self) {
            let settings = &self.state.settings;
            self.set_text("targetSizeValue", &format!("{}px", settings.target_size));
            self.set_text(
                "spawnSpeedValue",
                &format_seconds_label(settings.spawn_interval_ms),
            );
            self.set_text(
                "targetLifeValue",
                &format_seconds_label(settings.target_lifetime_ms),
            );
            self.set_text(
                "roundDurationValue",
                &format_time(settings.round_duration_secs),
            );
            self.set_text("modeValue", settings.mode.as_str());
            self.set_text("difficultyValue", settings.difficulty.as_str());
            self.set_text(
                "bestScore",
                &self.state.high_scores.best_score(settings.difficulty).to_string(),
            );
            self.set_text(
                "bestCombo",
                &self.state.high_scores.best_combo(settings.difficulty).to_string(),
            );
        }
    }

    fn set_input_value(document: &Document, id: &str, value: &str) {
        if let Some(input) = document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        {
            input.set_value(value);
        }
    }

    fn input_value(document: &Document, id: &str) -> Option<String> {
        document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            .map(|input| input.value())
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("OBZVON starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let game = Rc::new(RefCell::new(Game::new(document.clone())));
        {
            let mut g = game.borrow_mut();
            g.show_screen(GamePhase::Menu);
        }

        setup_buttons(&document, game.clone());
        setup_settings_inputs(&document, game.clone());
        setup_play_area(&document, game.clone());
        setup_keyboard(game.clone());

        request_animation_frame(game);

        log::info!("OBZVON running!");
    }

    fn on_click(document: &Document, id: &str, mut handler: impl FnMut() + 'static) {
        let Some(btn) = document.get_element_by_id(id) else {
            log::warn!("Missing button #{}", id);
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| handler());
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        let commands = [
            ("startBtn", Command::OpenSettings),
            ("playBtn", Command::Start),
            ("backBtn", Command::Menu),
            ("pauseBtn", Command::TogglePause),
            ("quitBtn", Command::End),
            ("restartBtn", Command::Start),
            ("menuBtn", Command::Menu),
        ];
        for (id, command) in commands {
            let game = game.clone();
            on_click(document, id, move || game.borrow_mut().run_command(command));
        }

        let modes = [
            ("modeFree", GameMode::FreePlay),
            ("modeTimed", GameMode::Timed),
            ("modeRanked", GameMode::Ranked),
        ];
        for (id, mode) in modes {
            let game = game.clone();
            on_click(document, id, move || {
                let mut g = game.borrow_mut();
                let now = now_ms();
                g.state.update_settings(now, |s| s.mode = mode);
                g.flush(now);
                g.update_setting_labels();
            });
        }

        for difficulty in Difficulty::ALL {
            let id = format!("diff-{}", difficulty.as_str());
            let game = game.clone();
            on_click(document, &id, move || {
                let mut g = game.borrow_mut();
                let now = now_ms();
                g.state.update_settings(now, |s| s.difficulty = difficulty);
                g.flush(now);
                g.update_setting_labels();
            });
        }
    }

    fn setup_settings_inputs(document: &Document, game: Rc<RefCell<Game>>) {
        let sliders: [(&'static str, fn(&mut obzvon::Settings, &str)); 4] = [
            ("targetSize", |s, v| {
                if let Ok(px) = v.parse::<f32>() {
                    s.set_target_size(px);
                }
            }),
            ("spawnSpeed", |s, v| {
                if let Ok(ms) = v.parse::<u32>() {
                    s.set_spawn_interval(ms);
                }
            }),
            ("targetLife", |s, v| {
                if let Ok(ms) = v.parse::<u32>() {
                    s.set_target_lifetime(ms);
                }
            }),
            ("roundDuration", |s, v| {
                if let Ok(secs) = v.parse::<u32>() {
                    s.set_round_duration(secs);
                }
            }),
        ];

        for (id, apply) in sliders {
            let Some(input) = document.get_element_by_id(id) else {
                continue;
            };
            let game = game.clone();
            let doc = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let Some(value) = input_value(&doc, id) else {
                    return;
                };
                let mut g = game.borrow_mut();
                let phase = g.state.phase;
                g.sync_area_sizes(phase);
                let now = now_ms();
                g.state.update_settings(now, |s| apply(s, &value));
                g.flush(now);
                g.update_setting_labels();
            });
            let _ = input.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_play_area(document: &Document, game: Rc<RefCell<Game>>) {
        let Some(area) = document.get_element_by_id("gameArea") else {
            log::error!("Missing #gameArea");
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
            let mut g = game.borrow_mut();
            if g.state.phase != GamePhase::Running {
                return;
            }
            event.prevent_default();
            let Some(pos) = g.to_area_pos(event.client_x(), event.client_y()) else {
                return;
            };
            let now = now_ms();
            g.state.pointer_down(pos, now);
            g.flush(now);
        });
        let _ = area.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            let code = event.code();
            if should_prevent_default(&code) {
                event.prevent_default();
            }
            let mut g = game.borrow_mut();
            let mode = if g.state.phase.in_round() {
                g.state.round_mode
            } else {
                g.state.settings.mode
            };
            if let Some(command) = command_for_key(&code, g.state.phase, mode) {
                g.run_command(command);
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        game.borrow_mut().frame(time);
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    //! Scripted player for the native build: plays a few rounds with a
    //! simulated clock and logs the summaries.

    use glam::Vec2;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use obzvon::persistence::MemoryStore;
    use obzvon::sim::{Command, GameEvent, GamePhase, GameState, RoundSummary};
    use obzvon::{Difficulty, GameMode, Settings, format_time};

    /// Simulated frame length (ms)
    const FRAME_MS: f64 = 16.0;
    /// How long free-play rounds run before the bot stops
    const FREE_PLAY_MS: f64 = 30_000.0;
    /// Chance a planned click lands on empty space instead
    const STRAY_CLICK_CHANCE: f64 = 0.1;

    struct Bot {
        rng: Pcg32,
        /// Pending clicks (time, position)
        clicks: Vec<(f64, Vec2)>,
    }

    impl Bot {
        fn new(seed: u64) -> Self {
            Self {
                rng: Pcg32::seed_from_u64(seed ^ 0x9e37_79b9_7f4a_7c15),
                clicks: Vec::new(),
            }
        }

        fn plan(&mut self, now: f64, pos: Vec2, area: Vec2) {
            let reaction = self.rng.random_range(120.0..1000.0);
            let pos = if self.rng.random_bool(STRAY_CLICK_CHANCE) {
                Vec2::new(
                    self.rng.random_range(0.0..area.x),
                    self.rng.random_range(0.0..area.y),
                )
            } else {
                pos
            };
            self.clicks.push((now + reaction, pos));
        }

        fn due(&mut self, now: f64) -> Vec<(f64, Vec2)> {
            let (due, pending): (Vec<_>, Vec<_>) =
                self.clicks.drain(..).partition(|(at, _)| *at <= now);
            self.clicks = pending;
            due
        }
    }

    fn play_round(state: &mut GameState, bot: &mut Bot, start: f64) -> (f64, Option<RoundSummary>) {
        bot.clicks.clear();
        state.apply(Command::Start, start);
        let limit = match state.round_mode {
            GameMode::FreePlay => start + FREE_PLAY_MS,
            GameMode::Timed | GameMode::Ranked => f64::INFINITY,
        };

        let mut now = start;
        loop {
            for event in state.drain_events() {
                if let GameEvent::TargetSpawned { id, pos, .. } = event {
                    let spawned_at = state.target(id).map_or(state.now(), |t| t.spawned_at);
                    bot.plan(spawned_at, pos, state.area);
                }
            }
            if state.phase == GamePhase::Ended {
                return (now, state.last_summary.clone());
            }
            if now >= limit {
                return (now, state.end(now));
            }

            now += FRAME_MS;
            let mut due = bot.due(now);
            due.sort_by(|a, b| a.0.total_cmp(&b.0));
            for (at, pos) in due {
                state.pointer_down(pos, at);
            }
            state.advance(now);
        }
    }

    fn report(label: &str, summary: &RoundSummary) {
        println!(
            "{:<16} score {:>6}  time {:>5}  hits {:>4}  misses {:>4}  accuracy {:>3}%  max combo {:>3}{}",
            label,
            summary.score,
            format_time(summary.time_secs),
            summary.hits,
            summary.misses,
            summary.accuracy,
            summary.max_combo,
            if summary.new_record { "  NEW RECORD" } else { "" }
        );
    }

    pub fn run(seed: u64) {
        log::info!("Headless run with seed {}", seed);

        let mut state = GameState::new(seed, Box::new(MemoryStore::new()));
        let mut bot = Bot::new(seed);
        let mut now = 0.0;

        let mut rounds: Vec<(String, Settings)> = vec![
            ("free play".to_string(), Settings::default()),
            (
                "timed".to_string(),
                Settings {
                    mode: GameMode::Timed,
                    round_duration_secs: 30,
                    ..Settings::default()
                },
            ),
        ];
        for difficulty in Difficulty::ALL {
            rounds.push((
                format!("ranked {}", difficulty.as_str()),
                Settings::ranked(difficulty),
            ));
        }

        for (label, settings) in rounds {
            state.update_settings(now, |s| *s = settings);
            let (end, summary) = play_round(&mut state, &mut bot, now);
            now = end + 1000.0;
            match summary {
                Some(summary) => report(&label, &summary),
                None => log::warn!("{} round produced no summary", label),
            }
            state.apply(Command::Menu, now);
        }

        for difficulty in Difficulty::ALL {
            log::info!(
                "Record {}: score {}, combo {}",
                difficulty.as_str(),
                state.high_scores.best_score(difficulty),
                state.high_scores.best_combo(difficulty)
            );
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("OBZVON (native) starting...");
    log::info!("Native mode plays scripted rounds - run with `trunk serve` for the web version");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(obzvon::platform::time_seed);
    headless::run(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
