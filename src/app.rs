//! Menu flow and session driver
//!
//! The host calls [`App::frame`] once per display frame with the sampled
//! input. The app runs fixed substeps on the active session, honours the
//! display holds sessions ask for, and moves between the title, the results
//! screen and the leaderboard.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::consts::SIM_DT;
use crate::highscores::{HighScores, TitleBests};
use crate::leaderboard::{GameMode, LeaderboardEntry, LeaderboardService};
use crate::persistence::PersistenceStore;
use crate::persistence::migration::{self, MigrationReport};
use crate::presentation::{Presentation, SoundCue, VisualHandle, VisualKind};
use crate::profiles::{Profile, ProfileRegistry};
use crate::settings::Settings;
use crate::sim::{
    FixedStep, GameSummary, Handoff, InputSnapshot, ModeSession, SessionContext, SessionOutcome,
    TickStatus, session_rng,
};
use crate::tuning::Tuning;

/// Stick deflection that counts as a menu move
const NAV_THRESHOLD: f32 = 0.5;

/// What the player is looking at
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Title,
    Playing,
    Results(GameSummary),
    Leaderboard(GameMode),
}

/// Entries on the title screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleOption {
    Play(GameMode),
    Leaderboard,
}

impl TitleOption {
    pub const ALL: [TitleOption; 4] = [
        TitleOption::Play(GameMode::Dodgeball),
        TitleOption::Play(GameMode::Dribble),
        TitleOption::Play(GameMode::Penalties),
        TitleOption::Leaderboard,
    ];
}

/// Buttons on the results screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultsOption {
    /// Retry the same level with the score kept
    Continue,
    /// Start over from level 1
    Reset,
    /// New shootout
    PlayAgain,
    Leaderboard,
    Menu,
}

impl ResultsOption {
    pub fn for_mode(mode: GameMode) -> &'static [ResultsOption] {
        match mode {
            GameMode::Penalties => &[
                ResultsOption::PlayAgain,
                ResultsOption::Leaderboard,
                ResultsOption::Menu,
            ],
            _ => &[
                ResultsOption::Continue,
                ResultsOption::Reset,
                ResultsOption::Leaderboard,
                ResultsOption::Menu,
            ],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResultsOption::Continue => "Continue",
            ResultsOption::Reset => "Reset",
            ResultsOption::PlayAgain => "Play Again",
            ResultsOption::Leaderboard => "Leaderboard",
            ResultsOption::Menu => "Menu",
        }
    }
}

/// Highlighted menu entry, always within `0..len`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    index: usize,
    len: usize,
}

impl Selection {
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn next(&mut self) {
        self.set(self.index + 1);
    }

    pub fn prev(&mut self) {
        self.set(self.index.saturating_sub(1));
    }

    /// Select `index`, clamped to the last entry
    pub fn set(&mut self, index: usize) {
        self.index = index.min(self.len.saturating_sub(1));
    }
}

/// Presentation wrapper applying the player's settings
///
/// Drops shakes when shake is off, sound cues when muted and particle
/// visuals when particles are off. Banners always pass through.
pub struct SettingsGate<'a> {
    settings: &'a Settings,
    inner: &'a mut dyn Presentation,
}

impl<'a> SettingsGate<'a> {
    pub fn new(settings: &'a Settings, inner: &'a mut dyn Presentation) -> Self {
        Self { settings, inner }
    }
}

impl Presentation for SettingsGate<'_> {
    fn spawn_visual(&mut self, kind: VisualKind, pos: Vec2) -> VisualHandle {
        if kind.is_particle() && !self.settings.particles {
            return VisualHandle::NONE;
        }
        self.inner.spawn_visual(kind, pos)
    }

    fn play_sound(&mut self, cue: SoundCue) {
        if self.settings.effective_volume() > 0.0 {
            self.inner.play_sound(cue);
        }
    }

    fn camera_shake(&mut self, intensity: f32, duration_ms: u32) {
        if self.settings.effective_screen_shake() {
            self.inner.camera_shake(intensity, duration_ms);
        }
    }
}

/// Top-level game state
pub struct App {
    store: PersistenceStore,
    settings: Settings,
    tuning: Tuning,
    screen: Screen,
    session: Option<ModeSession>,
    /// Display hold remaining before the session ticks again
    hold_ms: f32,
    /// Terminal outcome waiting for its hold to elapse
    pending: Option<SessionOutcome>,
    clock: FixedStep,
    seeds: Pcg32,
    menu: Selection,
    prev_movement: Vec2,
    /// One-shot presses not yet consumed by a substep
    edges: InputSnapshot,
    migration: MigrationReport,
}

impl App {
    /// Open the store, migrate old records and load preferences
    pub fn new(store: PersistenceStore, seed: u64) -> Self {
        let migration = migration::run(&store);
        let settings = Settings::load(&store);
        let tuning = Tuning::load(&store);
        log::info!("App ready (seed {})", seed);

        Self {
            store,
            settings,
            tuning,
            screen: Screen::Title,
            session: None,
            hold_ms: 0.0,
            pending: None,
            clock: FixedStep::new(),
            seeds: session_rng(seed),
            menu: Selection::new(TitleOption::ALL.len()),
            prev_movement: Vec2::ZERO,
            edges: InputSnapshot::default(),
            migration,
        }
    }

    pub fn store(&self) -> &PersistenceStore {
        &self.store
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn session(&self) -> Option<&ModeSession> {
        self.session.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn menu(&self) -> Selection {
        self.menu
    }

    pub fn migration_report(&self) -> MigrationReport {
        self.migration
    }

    /// A result is on screen and the session is paused for it
    pub fn is_holding(&self) -> bool {
        self.hold_ms > 0.0
    }

    pub fn active_profile(&self) -> Option<Profile> {
        ProfileRegistry::new(&self.store).active()
    }

    pub fn title_bests(&self) -> TitleBests {
        HighScores::new(&self.store).title_bests()
    }

    pub fn leaderboard(&self, mode: GameMode) -> Vec<LeaderboardEntry> {
        LeaderboardService::new(&self.store).entries(mode)
    }

    pub fn set_settings(&mut self, settings: Settings) {
        settings.save(&self.store);
        self.settings = settings;
    }

    /// Enter `mode` from level 1
    pub fn start(&mut self, mode: GameMode) {
        self.start_with(mode, Handoff::default());
    }

    pub fn start_with(&mut self, mode: GameMode, handoff: Handoff) {
        let seed = self.seeds.random::<u64>();
        log::info!(
            "Starting {} at level {} (score {})",
            mode.key(),
            handoff.level,
            handoff.score
        );
        self.session = Some(ModeSession::start(mode, handoff, seed, &self.tuning));
        self.screen = Screen::Playing;
        self.hold_ms = 0.0;
        self.pending = None;
        self.clock = FixedStep::new();
        self.edges = InputSnapshot::default();
    }

    /// Results screen: same level, score kept
    pub fn continue_run(&mut self) {
        if let Screen::Results(summary) = &self.screen {
            let (mode, handoff) = (summary.mode, Handoff::new(summary.level, summary.score));
            self.start_with(mode, handoff);
        }
    }

    /// Results screen: back to level 1 with no score
    pub fn reset_run(&mut self) {
        if let Screen::Results(summary) = &self.screen {
            let mode = summary.mode;
            self.start(mode);
        }
    }

    pub fn show_leaderboard(&mut self, mode: GameMode) {
        self.session = None;
        self.screen = Screen::Leaderboard(mode);
        self.menu = Selection::new(GameMode::ALL.len());
        self.menu.set(GameMode::ALL.iter().position(|m| *m == mode).unwrap_or(0));
    }

    pub fn to_title(&mut self) {
        self.session = None;
        self.pending = None;
        self.hold_ms = 0.0;
        self.screen = Screen::Title;
        self.menu = Selection::new(TitleOption::ALL.len());
    }

    pub fn choose_result(&mut self, option: ResultsOption) {
        let Screen::Results(summary) = &self.screen else {
            return;
        };
        let mode = summary.mode;
        match option {
            ResultsOption::Continue => self.continue_run(),
            ResultsOption::Reset => self.reset_run(),
            ResultsOption::PlayAgain => self.start(mode),
            ResultsOption::Leaderboard => self.show_leaderboard(mode),
            ResultsOption::Menu => self.to_title(),
        }
    }

    /// Advance by one display frame; returns the substeps run
    pub fn frame(
        &mut self,
        frame_dt: f32,
        input: &InputSnapshot,
        presentation: &mut dyn Presentation,
    ) -> u32 {
        // presses survive frames too short for a substep
        self.edges.action_just_pressed |= input.action_just_pressed;
        self.edges.special_just_pressed |= input.special_just_pressed;
        let input = InputSnapshot {
            action_just_pressed: self.edges.action_just_pressed,
            special_just_pressed: self.edges.special_just_pressed,
            ..*input
        };

        if !matches!(self.screen, Screen::Playing) {
            self.edges = InputSnapshot::default();
            self.navigate(&input, presentation);
            self.prev_movement = input.movement;
            return 0;
        }

        let substeps = self.clock.advance(frame_dt);
        for i in 0..substeps {
            let step_input = if i == 0 { input } else { input.without_edges() };
            self.step(SIM_DT, &step_input, presentation);
        }
        if substeps > 0 {
            self.edges = InputSnapshot::default();
        }
        self.prev_movement = input.movement;
        substeps
    }

    /// One fixed substep of the active session
    pub fn step(&mut self, dt: f32, input: &InputSnapshot, presentation: &mut dyn Presentation) {
        if self.hold_ms > 0.0 {
            self.hold_ms -= dt * 1000.0;
            if self.hold_ms <= 0.0 {
                self.hold_ms = 0.0;
                self.apply_pending();
            }
            return;
        }

        let Some(session) = self.session.as_mut() else {
            return;
        };
        let mut gate = SettingsGate::new(&self.settings, presentation);
        let mut ctx = SessionContext::new(&self.store, &mut gate);

        match session.tick(dt, input, &mut ctx) {
            TickStatus::Running | TickStatus::Done => {}
            TickStatus::Hold(ms) => self.hold_ms = ms as f32,
            TickStatus::Finished {
                outcome,
                display_ms,
            } => {
                self.pending = Some(outcome);
                self.hold_ms = display_ms as f32;
                if display_ms == 0 {
                    self.apply_pending();
                }
            }
        }
    }

    fn apply_pending(&mut self) {
        let Some(outcome) = self.pending.take() else {
            return;
        };
        match outcome {
            SessionOutcome::Advance(handoff) => {
                if let Some(mode) = self.session.as_ref().map(ModeSession::mode) {
                    self.start_with(mode, handoff);
                }
            }
            SessionOutcome::Ended(summary) => {
                log::info!(
                    "{} over: level {}, score {}",
                    summary.mode.key(),
                    summary.level,
                    summary.score
                );
                self.session = None;
                self.menu = Selection::new(ResultsOption::for_mode(summary.mode).len());
                self.screen = Screen::Results(summary);
            }
        }
    }

    /// Menu input on the non-playing screens
    fn navigate(&mut self, input: &InputSnapshot, presentation: &mut dyn Presentation) {
        let left = input.movement.x < -NAV_THRESHOLD && self.prev_movement.x >= -NAV_THRESHOLD;
        let right = input.movement.x > NAV_THRESHOLD && self.prev_movement.x <= NAV_THRESHOLD;
        if left {
            self.menu.prev();
        } else if right {
            self.menu.next();
        }

        if let Screen::Leaderboard(mode) = self.screen {
            let shown = GameMode::ALL[self.menu.index()];
            if shown != mode {
                self.screen = Screen::Leaderboard(shown);
            }
        }

        if !input.action_just_pressed {
            return;
        }
        SettingsGate::new(&self.settings, presentation).play_sound(SoundCue::Select);

        match &self.screen {
            Screen::Title => match TitleOption::ALL[self.menu.index()] {
                TitleOption::Play(mode) => self.start(mode),
                TitleOption::Leaderboard => self.show_leaderboard(GameMode::Dodgeball),
            },
            Screen::Results(summary) => {
                let options = ResultsOption::for_mode(summary.mode);
                let option = options[self.menu.index().min(options.len() - 1)];
                self.choose_result(option);
            }
            Screen::Leaderboard(_) => self.to_title(),
            Screen::Playing => {}
        }
    }
}
