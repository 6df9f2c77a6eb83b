//! Stadium Runner entry point
//!
//! On wasm32 this exports `StadiumGame` for the browser page, which owns
//! rendering, audio and input and forwards one input snapshot per frame.
//! Natively it runs a scripted headless match of every mode.

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use glam::Vec2;
    use wasm_bindgen::prelude::*;

    use stadium_runner::presentation::{Presentation, SoundCue, VisualHandle, VisualKind};
    use stadium_runner::sim::InputSnapshot;
    use stadium_runner::{
        App, Country, GameMode, PersistenceStore, Profile, ProfileRegistry, Screen,
    };

    /// Forwards presentation calls to a JS function
    ///
    /// The callback receives `("visual", name, x, y, handle, points)`,
    /// `("sound", name)` or `("shake", intensity, duration_ms)`.
    struct JsPresentation {
        callback: js_sys::Function,
        next_handle: u32,
    }

    impl JsPresentation {
        fn emit(&self, args: &[JsValue]) {
            let array: js_sys::Array = args.iter().collect();
            if let Err(e) = self.callback.apply(&JsValue::NULL, &array) {
                log::warn!("Presentation callback failed: {:?}", e);
            }
        }
    }

    impl Presentation for JsPresentation {
        fn spawn_visual(&mut self, kind: VisualKind, pos: Vec2) -> VisualHandle {
            self.next_handle += 1;
            let points = match kind {
                VisualKind::ScorePopup { points } => points as f64,
                _ => 0.0,
            };
            self.emit(&[
                JsValue::from_str("visual"),
                JsValue::from_str(kind.name()),
                JsValue::from_f64(pos.x as f64),
                JsValue::from_f64(pos.y as f64),
                JsValue::from_f64(self.next_handle as f64),
                JsValue::from_f64(points),
            ]);
            VisualHandle(self.next_handle)
        }

        fn play_sound(&mut self, cue: SoundCue) {
            self.emit(&[JsValue::from_str("sound"), JsValue::from_str(cue.name())]);
        }

        fn camera_shake(&mut self, intensity: f32, duration_ms: u32) {
            self.emit(&[
                JsValue::from_str("shake"),
                JsValue::from_f64(intensity as f64),
                JsValue::from_f64(duration_ms as f64),
            ]);
        }
    }

    /// Game instance handed to the page
    #[wasm_bindgen]
    pub struct StadiumGame {
        app: App,
        presentation: JsPresentation,
    }

    #[wasm_bindgen]
    impl StadiumGame {
        #[wasm_bindgen(constructor)]
        pub fn new(callback: js_sys::Function) -> StadiumGame {
            console_error_panic_hook::set_once();
            if console_log::init_with_level(log::Level::Info).is_err() {
                log::debug!("Logger already initialized");
            }

            let seed = js_sys::Date::now() as u64;
            log::info!("Stadium Runner starting with seed: {}", seed);
            StadiumGame {
                app: App::new(PersistenceStore::browser(), seed),
                presentation: JsPresentation {
                    callback,
                    next_handle: 0,
                },
            }
        }

        /// Advance one display frame
        #[allow(clippy::too_many_arguments)]
        pub fn frame(
            &mut self,
            dt: f32,
            move_x: f32,
            move_y: f32,
            action_held: bool,
            action_pressed: bool,
            special_pressed: bool,
            sprint_held: bool,
        ) -> u32 {
            let input = InputSnapshot {
                movement: Vec2::new(move_x, move_y),
                action_held,
                action_just_pressed: action_pressed,
                special_just_pressed: special_pressed,
                sprint_held,
            };
            self.app.frame(dt, &input, &mut self.presentation)
        }

        /// `title | playing | results | leaderboard`
        pub fn screen(&self) -> String {
            match self.app.screen() {
                Screen::Title => "title",
                Screen::Playing => "playing",
                Screen::Results(_) => "results",
                Screen::Leaderboard(_) => "leaderboard",
            }
            .to_string()
        }

        pub fn menu_index(&self) -> u32 {
            self.app.menu().index() as u32
        }

        pub fn level(&self) -> u32 {
            self.app.session().map(|s| s.level()).unwrap_or(0)
        }

        pub fn score(&self) -> f64 {
            self.app.session().map(|s| s.score() as f64).unwrap_or(0.0)
        }

        pub fn is_holding(&self) -> bool {
            self.app.is_holding()
        }

        /// Start a mode by its leaderboard key
        pub fn start(&mut self, mode: &str) -> bool {
            match GameMode::from_key(mode) {
                Some(mode) => {
                    self.app.start(mode);
                    true
                }
                None => {
                    log::warn!("Unknown mode: {}", mode);
                    false
                }
            }
        }

        pub fn to_title(&mut self) {
            self.app.to_title();
        }

        /// Leaderboard rows for `mode` as JSON
        pub fn leaderboard_json(&self, mode: &str) -> String {
            let rows = GameMode::from_key(mode)
                .map(|mode| self.app.leaderboard(mode))
                .unwrap_or_default();
            serde_json::to_string(&rows).unwrap_or_else(|_| "[]".to_string())
        }

        /// Last results screen as JSON (`null` elsewhere)
        pub fn results_json(&self) -> String {
            match self.app.screen() {
                Screen::Results(summary) => serde_json::json!({
                    "mode": summary.mode.key(),
                    "level": summary.level,
                    "score": summary.score,
                    "distancePct": summary.distance_pct,
                    "result": summary.result,
                    "cause": format!("{:?}", summary.cause),
                })
                .to_string(),
                _ => "null".to_string(),
            }
        }

        /// Onboarding: create a profile and make it active
        pub fn create_profile(
            &mut self,
            name: &str,
            country: &str,
            club: &str,
        ) -> Result<f64, JsValue> {
            let country = country
                .parse::<Country>()
                .map_err(|e| JsValue::from_str(&e.to_string()))?;
            let profile =
                Profile::new(name, country, club).map_err(|e| JsValue::from_str(&e.to_string()))?;

            let registry = ProfileRegistry::new(self.app.store());
            let id = registry.save(profile);
            registry.set_active(id);
            Ok(id as f64)
        }

        pub fn active_profile_name(&self) -> Option<String> {
            self.app.active_profile().map(|p| p.name)
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use stadium_runner::presentation::HeadlessPresentation;
    use stadium_runner::sim::{InputSnapshot, ModeSession};
    use stadium_runner::{
        App, Country, GameMode, PersistenceStore, Profile, ProfileRegistry, Screen,
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Stadium Runner (native) starting headless demo...");

    let store = PersistenceStore::in_memory();
    match Profile::new("DEMO", Country::England, "Arsenal") {
        Ok(profile) => {
            let registry = ProfileRegistry::new(&store);
            let id = registry.save(profile);
            registry.set_active(id);
        }
        Err(e) => log::warn!("Demo profile rejected: {e}"),
    }

    let mut app = App::new(store, 2024);
    let mut presentation = HeadlessPresentation::new();
    let dt = 1.0 / 60.0;

    for mode in GameMode::ALL {
        app.start(mode);
        let mut frame = 0u32;
        // two minutes of play at most
        while matches!(app.screen(), Screen::Playing) && frame < 60 * 120 {
            let input = match app.session() {
                Some(ModeSession::Dodgeball(s)) => InputSnapshot {
                    movement: glam::Vec2::new(0.3, (frame as f32 * 0.05).sin()),
                    action_just_pressed: frame % 15 == 0 && s.kick_ready(),
                    ..Default::default()
                },
                Some(ModeSession::Dribble(s)) => InputSnapshot {
                    movement: glam::Vec2::new(1.0, ((frame / 40) % 2) as f32 * 2.0 - 1.0),
                    action_held: s.has_possession() && s.player().x > 520.0,
                    special_just_pressed: frame % 45 == 0,
                    sprint_held: s.stamina() > 30.0,
                    ..Default::default()
                },
                Some(ModeSession::Penalty(s)) => InputSnapshot {
                    movement: if s.is_shooting() {
                        glam::Vec2::new(0.6, -0.4)
                    } else if frame % 90 == 0 {
                        glam::Vec2::new(-1.0, 0.0)
                    } else {
                        glam::Vec2::ZERO
                    },
                    action_held: s.is_shooting() && frame % 80 < 50,
                    ..Default::default()
                },
                None => InputSnapshot::default(),
            };
            app.frame(dt, &input, &mut presentation);
            frame += 1;
        }

        match app.screen() {
            Screen::Results(summary) => log::info!(
                "{}: level {}, score {}, {:?}{}",
                summary.mode.title(),
                summary.level,
                summary.score,
                summary.cause,
                summary.result.as_deref().map(|r| format!(" ({r})")).unwrap_or_default()
            ),
            _ => log::info!("{}: still running after {} frames", mode.title(), frame),
        }
        app.to_title();
    }

    log::info!("{} presentation calls recorded", presentation.calls.len());
    for mode in GameMode::ALL {
        for (rank, entry) in app.leaderboard(mode).iter().enumerate() {
            println!(
                "{:<11} #{} {} ({}, {}) {}",
                mode.title(),
                rank + 1,
                entry.name,
                entry.club,
                entry.country.as_str(),
                entry.score
            );
        }
    }
    let bests = app.title_bests();
    println!(
        "Bests: dodgeball {}, dribble level {}, penalties {}",
        bests.dodgeball_score, bests.dribble_level, bests.penalty_score
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // the page constructs StadiumGame; nothing to do at start
}
