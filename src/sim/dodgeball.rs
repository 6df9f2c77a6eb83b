//! Dodgeball runner
//!
//! The player auto-runs right across a scrolling pitch while balls are lobbed
//! in from the stands. A ball is harmless while rising, dangerous once it
//! starts to fall, and keeps rolling (still dangerous) until it fades out.
//! Balls close to the player can be deflected for points. Covering the level
//! length advances; getting hit ends the run.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::collision::{Rect, circle_rect_overlap};
use super::state::{
    EndCause, GameSummary, Handoff, SessionContext, SessionOutcome, TerminalLatch, TickStatus,
    session_rng,
};
use super::tick::InputSnapshot;
use super::timers::TimerQueue;
use crate::consts::*;
use crate::highscores::{HighScoreKey, HighScores};
use crate::leaderboard::{GameMode, LeaderboardService, ScoreCandidate};
use crate::presentation::{Banner, SoundCue, VisualKind};
use crate::tuning::DodgeballTuning;
use crate::{distance, heading};

/// Player start position (world space)
pub const PLAYER_START: Vec2 = Vec2::new(80.0, GAME_H / 2.0);
/// Hazards are lobbed from just beyond the field edge
const SPAWN_MARGIN: f32 = 8.0;
/// Balls this close to the stands can't hit the player
const COLLISION_EDGE: f32 = 5.0;
/// Display hint after a hit
const LOSS_DISPLAY_MS: u32 = 800;
/// Display hint after a completed level
const WIN_DISPLAY_MS: u32 = 1800;

/// Flight stage of a hazard, derived from its age
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HazardPhase {
    /// Climbing toward the camera (harmless)
    Rising,
    /// Dropping onto the target spot
    Falling,
    /// Rolling along the pitch after the bounce
    Rolling,
    /// Rolling and fading out
    Fading,
    /// Ready to be dropped
    Gone,
}

/// A lobbed ball
#[derive(Debug, Clone)]
pub struct Hazard {
    pub id: u32,
    pub spawn: Vec2,
    pub target: Vec2,
    pub pos: Vec2,
    /// Apparent size (0.6 at launch, 1.3 at apex, 1.0 on the ground)
    pub scale: f32,
    age_ms: f32,
    flight_ms: f32,
    roll_vel: Vec2,
}

impl Hazard {
    fn new(id: u32, spawn: Vec2, target: Vec2, flight_ms: f32) -> Self {
        Self {
            id,
            spawn,
            target,
            pos: spawn,
            scale: 0.6,
            age_ms: 0.0,
            flight_ms,
            roll_vel: Vec2::ZERO,
        }
    }

    pub fn phase(&self, tuning: &DodgeballTuning) -> HazardPhase {
        let half = self.flight_ms * 0.5;
        if self.age_ms < half {
            HazardPhase::Rising
        } else if self.age_ms < self.flight_ms {
            HazardPhase::Falling
        } else if self.age_ms < self.flight_ms + tuning.roll_ms {
            HazardPhase::Rolling
        } else if self.age_ms < self.flight_ms + tuning.roll_ms + tuning.fade_ms {
            HazardPhase::Fading
        } else {
            HazardPhase::Gone
        }
    }

    /// Dangerous once past the apex
    pub fn is_collidable(&self) -> bool {
        self.age_ms >= self.flight_ms * 0.5
    }

    /// Collision radius at the current scale
    pub fn radius(&self) -> f32 {
        BALL_RADIUS * self.scale
    }

    /// Opacity for rendering (fades after rolling)
    pub fn opacity(&self, tuning: &DodgeballTuning) -> f32 {
        let fade_start = self.flight_ms + tuning.roll_ms;
        if self.age_ms <= fade_start || tuning.fade_ms <= 0.0 {
            1.0
        } else {
            (1.0 - (self.age_ms - fade_start) / tuning.fade_ms).clamp(0.0, 1.0)
        }
    }

    /// Advance the arc. Returns true on the step the ball lands.
    fn advance(&mut self, dt: f32, roll_speed: f32, tuning: &DodgeballTuning) -> bool {
        let was_airborne = self.age_ms < self.flight_ms;
        self.age_ms += dt * 1000.0;
        let half = self.flight_ms * 0.5;

        match self.phase(tuning) {
            HazardPhase::Rising => {
                // sine ease-out toward the landing spot while growing
                let t = (self.age_ms / half).clamp(0.0, 1.0);
                let e = (t * std::f32::consts::FRAC_PI_2).sin();
                self.pos = self.spawn.lerp(self.target, e);
                self.scale = 0.6 + 0.7 * e;
                false
            }
            HazardPhase::Falling => {
                let t = ((self.age_ms - half) / half).clamp(0.0, 1.0);
                let e = 1.0 - (t * std::f32::consts::FRAC_PI_2).cos();
                self.pos = self.target;
                self.scale = 1.3 - 0.3 * e;
                false
            }
            HazardPhase::Rolling | HazardPhase::Fading | HazardPhase::Gone => {
                let landed = was_airborne;
                if landed {
                    self.pos = self.target;
                    self.scale = 1.0;
                    self.roll_vel = heading(self.spawn, self.target) * roll_speed;
                }
                self.pos += self.roll_vel * dt;
                landed
            }
        }
    }
}

/// A deflected ball flying off harmlessly
#[derive(Debug, Clone)]
pub struct KickedBall {
    pub pos: Vec2,
    pub vel: Vec2,
    age_ms: f32,
}

/// One dodgeball level
#[derive(Debug)]
pub struct DodgeballSession {
    tuning: DodgeballTuning,
    rng: Pcg32,
    level: u32,
    score: u64,
    player: Vec2,
    distance: f32,
    kick_cooldown_ms: f32,
    spawn_timer_ms: f32,
    hazards: Vec<Hazard>,
    kicked: Vec<KickedBall>,
    timers: TimerQueue<Launch>,
    latch: TerminalLatch,
    started: bool,
    next_id: u32,
}

/// Staggered hazard launch
#[derive(Debug, Clone, Copy)]
struct Launch;

impl DodgeballSession {
    pub fn new(handoff: Handoff, seed: u64, tuning: DodgeballTuning) -> Self {
        log::info!("Dodgeball level {} (score {})", handoff.level, handoff.score);
        Self {
            tuning,
            rng: session_rng(seed),
            level: handoff.level.max(1),
            score: handoff.score,
            player: PLAYER_START,
            distance: 0.0,
            kick_cooldown_ms: 0.0,
            spawn_timer_ms: 0.0,
            hazards: Vec::new(),
            kicked: Vec::new(),
            timers: TimerQueue::new(),
            latch: TerminalLatch::default(),
            started: false,
            next_id: 1,
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn player(&self) -> Vec2 {
        self.player
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Level progress, 0-1
    pub fn progress(&self) -> f32 {
        (self.distance / self.tuning.level_length).clamp(0.0, 1.0)
    }

    pub fn hazards(&self) -> &[Hazard] {
        &self.hazards
    }

    pub fn kicked_balls(&self) -> &[KickedBall] {
        &self.kicked
    }

    pub fn kick_ready(&self) -> bool {
        self.kick_cooldown_ms <= 0.0
    }

    pub fn tuning(&self) -> &DodgeballTuning {
        &self.tuning
    }

    /// Left edge of the camera, following the player
    pub fn camera_scroll(&self) -> f32 {
        (self.player.x - GAME_W / 2.0).clamp(0.0, self.tuning.level_length)
    }

    pub fn tick(
        &mut self,
        dt: f32,
        input: &InputSnapshot,
        ctx: &mut SessionContext<'_>,
    ) -> TickStatus {
        if self.latch.is_fired() {
            return TickStatus::Done;
        }
        if !self.started {
            self.started = true;
            ctx.presentation
                .spawn_visual(VisualKind::Banner(Banner::LevelStart), self.player);
        }
        let dt_ms = dt * 1000.0;

        for Launch in self.timers.advance(dt_ms) {
            self.launch_hazard(ctx);
        }

        // Movement: auto-scroll plus steering, back is slower than forward
        let speed = PLAYER_SPEED;
        let steer = input.movement.clamp(Vec2::splat(-1.0), Vec2::splat(1.0));
        let vx = self.tuning.auto_scroll
            + if steer.x < 0.0 {
                steer.x * speed * self.tuning.back_factor
            } else {
                steer.x * speed * self.tuning.forward_factor
            };
        let vy = steer.y * speed;
        let world_w = self.tuning.level_length + GAME_W;
        self.player.x = (self.player.x + vx * dt).clamp(PLAYER_HALF_W, world_w - PLAYER_HALF_W);
        self.player.y = (self.player.y + vy * dt)
            .clamp(FIELD_TOP + PLAYER_HALF_H, FIELD_BOT - PLAYER_HALF_H);

        self.kick_cooldown_ms = (self.kick_cooldown_ms - dt_ms).max(0.0);
        if input.action_just_pressed {
            self.try_kick(ctx);
        }

        self.distance += vx * dt;

        if self.tuning.spawn_hazards {
            self.spawn_timer_ms += dt_ms;
            let interval = self.tuning.spawn_interval_ms(self.level);
            if self.spawn_timer_ms >= interval {
                self.spawn_timer_ms -= interval;
                let count = self.tuning.hazards_per_wave(self.level);
                for i in 0..count {
                    self.timers
                        .schedule(i as f32 * self.tuning.wave_stagger_ms, Launch);
                }
            }
        }

        self.update_balls(dt, ctx);

        let body = Rect::body(self.player);
        let hit = self.hazards.iter().any(|h| {
            h.is_collidable()
                && h.pos.y >= FIELD_TOP + COLLISION_EDGE
                && h.pos.y <= FIELD_BOT - COLLISION_EDGE
                && circle_rect_overlap(h.pos, h.radius(), &body)
        });
        if hit {
            return self.lose(ctx);
        }

        if self.distance >= self.tuning.level_length {
            return self.win(ctx);
        }

        TickStatus::Running
    }

    fn launch_hazard(&mut self, ctx: &mut SessionContext<'_>) {
        let from_top = self.rng.random_bool(0.5);
        let spawn = Vec2::new(
            self.player.x + self.rng.random_range(-100.0..=400.0),
            if from_top {
                FIELD_TOP - SPAWN_MARGIN
            } else {
                FIELD_BOT + SPAWN_MARGIN
            },
        );
        let target = Vec2::new(
            self.player.x + self.rng.random_range(-60.0..=200.0),
            self.rng.random_range(FIELD_TOP + 20.0..=FIELD_BOT - 20.0),
        );

        let id = self.next_id;
        self.next_id += 1;
        let flight_ms = self.tuning.flight_time_ms(self.level);
        self.hazards.push(Hazard::new(id, spawn, target, flight_ms));
        ctx.presentation.play_sound(SoundCue::Whoosh);
    }

    fn try_kick(&mut self, ctx: &mut SessionContext<'_>) {
        if !self.kick_ready() {
            return;
        }
        self.kick_cooldown_ms = self.tuning.kick_cooldown_ms;

        let player = self.player;
        let range = self.tuning.kick_range;
        let (in_range, rest): (Vec<Hazard>, Vec<Hazard>) = self
            .hazards
            .drain(..)
            .partition(|h| distance(player, h.pos) < range);
        self.hazards = rest;

        if in_range.is_empty() {
            return;
        }

        let points = self.tuning.points_per_kick * self.level as u64;
        for hazard in in_range {
            let dir = heading(player, hazard.pos);
            let dir = if dir == Vec2::ZERO { Vec2::X } else { dir };
            self.kicked.push(KickedBall {
                pos: hazard.pos,
                vel: dir * self.tuning.kick_speed,
                age_ms: 0.0,
            });
            self.score += points;
            ctx.presentation
                .spawn_visual(VisualKind::ScorePopup { points }, hazard.pos);
            ctx.presentation.spawn_visual(VisualKind::StarBurst, hazard.pos);
            ctx.presentation.play_sound(SoundCue::Points);
        }

        ctx.presentation.play_sound(SoundCue::Kick);
        ctx.presentation.camera_shake(0.005, 80);
        log::debug!("Deflect at {:.0}, score {}", self.distance, self.score);
    }

    fn update_balls(&mut self, dt: f32, ctx: &mut SessionContext<'_>) {
        let roll_speed = self.tuning.ball_speed(self.level) * self.tuning.roll_factor;
        let mut landed = 0;
        for hazard in &mut self.hazards {
            if hazard.advance(dt, roll_speed, &self.tuning) {
                landed += 1;
            }
        }
        for _ in 0..landed {
            ctx.presentation.play_sound(SoundCue::Bounce);
        }

        let scroll = self.camera_scroll();
        let tuning = &self.tuning;
        self.hazards.retain(|h| {
            h.phase(tuning) != HazardPhase::Gone
                && h.pos.x >= scroll - 100.0
                && h.pos.x <= scroll + GAME_W + 200.0
        });

        for ball in &mut self.kicked {
            ball.pos += ball.vel * dt;
            ball.age_ms += dt * 1000.0;
        }
        let lifetime = self.tuning.kicked_fade_ms;
        self.kicked.retain(|b| b.age_ms < lifetime);
    }

    fn lose(&mut self, ctx: &mut SessionContext<'_>) -> TickStatus {
        if !self.latch.fire() {
            return TickStatus::Done;
        }

        ctx.presentation.play_sound(SoundCue::Hit);
        ctx.presentation.spawn_visual(VisualKind::HitBurst, self.player);
        ctx.presentation.camera_shake(0.02, 300);

        let highscores = HighScores::new(ctx.store);
        highscores.submit(HighScoreKey::DodgeballLevel, self.level as u64);
        highscores.submit(HighScoreKey::DodgeballScore, self.score);
        LeaderboardService::new(ctx.store).add_entry(
            GameMode::Dodgeball,
            ScoreCandidate::with_level(self.score, self.level),
        );

        let distance_pct = (self.progress() * 100.0).floor() as u32;
        log::info!(
            "Dodgeball run over: level {} at {}%, score {}",
            self.level,
            distance_pct,
            self.score
        );
        TickStatus::Finished {
            outcome: SessionOutcome::Ended(GameSummary {
                mode: GameMode::Dodgeball,
                level: self.level,
                score: self.score,
                distance_pct: Some(distance_pct),
                result: None,
                cause: EndCause::Hit,
            }),
            display_ms: LOSS_DISPLAY_MS,
        }
    }

    fn win(&mut self, ctx: &mut SessionContext<'_>) -> TickStatus {
        if !self.latch.fire() {
            return TickStatus::Done;
        }

        ctx.presentation.play_sound(SoundCue::LevelUp);
        ctx.presentation
            .spawn_visual(VisualKind::Banner(Banner::LevelComplete), self.player);
        for _ in 0..5 {
            ctx.presentation.spawn_visual(VisualKind::StarBurst, self.player);
        }

        HighScores::new(ctx.store).submit(HighScoreKey::DodgeballLevel, self.level as u64);
        log::info!("Dodgeball level {} complete", self.level);

        TickStatus::Finished {
            outcome: SessionOutcome::Advance(Handoff::new(self.level + 1, self.score)),
            display_ms: WIN_DISPLAY_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::PersistenceStore;
    use crate::presentation::HeadlessPresentation;
    use crate::profiles::{Country, Profile, ProfileRegistry};

    fn quiet() -> DodgeballTuning {
        DodgeballTuning {
            spawn_hazards: false,
            ..Default::default()
        }
    }

    fn with_profile() -> PersistenceStore {
        let store = PersistenceStore::in_memory();
        let registry = ProfileRegistry::new(&store);
        let id = registry.save(Profile::new("ALEX", Country::Brazil, "Santos").unwrap());
        registry.set_active(id);
        store
    }

    /// A hazard sitting on `pos`, already past its apex
    fn falling_hazard_at(session: &DodgeballSession, pos: Vec2) -> Hazard {
        let flight_ms = session.tuning.flight_time_ms(session.level);
        let mut hazard = Hazard::new(99, pos, pos, flight_ms);
        hazard.age_ms = flight_ms * 0.5 + 1.0;
        hazard.scale = 1.2;
        hazard
    }

    #[test]
    fn test_distance_tracks_auto_scroll() {
        let store = PersistenceStore::in_memory();
        let mut pres = HeadlessPresentation::new();
        let mut ctx = SessionContext::new(&store, &mut pres);
        let mut session = DodgeballSession::new(Handoff::default(), 1, quiet());
        let input = InputSnapshot::default();

        for _ in 0..4 {
            assert_eq!(session.tick(0.25, &input, &mut ctx), TickStatus::Running);
        }
        assert_eq!(session.distance(), 100.0);

        // 3000 / 25 = 120 ticks: win exactly on the last one
        for _ in 4..119 {
            assert_eq!(session.tick(0.25, &input, &mut ctx), TickStatus::Running);
        }
        assert_eq!(session.distance(), 2975.0);
        assert_eq!(
            session.tick(0.25, &input, &mut ctx),
            TickStatus::Finished {
                outcome: SessionOutcome::Advance(Handoff { level: 2, score: 0 }),
                display_ms: 1800,
            }
        );
        assert_eq!(session.tick(0.25, &input, &mut ctx), TickStatus::Done);
        assert_eq!(HighScores::new(&store).get(HighScoreKey::DodgeballLevel), 1);
    }

    #[test]
    fn test_steering_speeds() {
        let store = PersistenceStore::in_memory();
        let mut pres = HeadlessPresentation::new();
        let mut ctx = SessionContext::new(&store, &mut pres);
        let mut session = DodgeballSession::new(Handoff::default(), 1, quiet());

        let back = InputSnapshot {
            movement: Vec2::new(-1.0, 0.0),
            ..Default::default()
        };
        session.tick(0.5, &back, &mut ctx);
        // 100 - 160 * 0.6 = 4 px/s
        assert!((session.distance() - 2.0).abs() < 1e-4);

        let up = InputSnapshot {
            movement: Vec2::new(0.0, -1.0),
            ..Default::default()
        };
        for _ in 0..10 {
            session.tick(0.5, &up, &mut ctx);
        }
        assert_eq!(session.player().y, FIELD_TOP + PLAYER_HALF_H);
    }

    #[test]
    fn test_deflect_awards_points_and_removes_hazard() {
        let store = PersistenceStore::in_memory();
        let mut pres = HeadlessPresentation::new();
        let mut ctx = SessionContext::new(&store, &mut pres);
        let mut session = DodgeballSession::new(Handoff::default(), 1, quiet());
        // level 1, hazard right on top of the player
        let hazard = falling_hazard_at(&session, session.player());
        session.hazards.push(hazard);

        let kick = InputSnapshot {
            action_just_pressed: true,
            ..Default::default()
        };
        assert_eq!(session.tick(SIM_DT, &kick, &mut ctx), TickStatus::Running);
        assert_eq!(session.score(), 10);
        assert!(session.hazards().is_empty());
        assert_eq!(session.kicked_balls().len(), 1);
        let speed = session.kicked_balls()[0].vel.length();
        assert!((speed - session.tuning().kick_speed).abs() < 1e-3);
        assert!(!session.kick_ready());
        assert_eq!(pres.count_sound(SoundCue::Kick), 1);

        // the deflected ball fades out
        let idle = InputSnapshot::default();
        for _ in 0..60 {
            session.tick(SIM_DT, &idle, &mut SessionContext::new(&store, &mut pres));
        }
        assert!(session.kicked_balls().is_empty());
    }

    #[test]
    fn test_deflect_scales_with_level_and_respects_cooldown() {
        let store = PersistenceStore::in_memory();
        let mut pres = HeadlessPresentation::new();
        let mut ctx = SessionContext::new(&store, &mut pres);
        let mut session = DodgeballSession::new(Handoff::new(3, 500), 1, quiet());
        let kick = InputSnapshot {
            action_just_pressed: true,
            ..Default::default()
        };

        // whiff starts the cooldown
        session.tick(SIM_DT, &kick, &mut ctx);
        let hazard = falling_hazard_at(&session, session.player() + Vec2::new(10.0, 0.0));
        session.hazards.push(hazard);
        session.hazards[0].age_ms = 0.0;
        session.tick(SIM_DT, &kick, &mut ctx);
        assert_eq!(session.score(), 500);

        for _ in 0..20 {
            session.tick(SIM_DT, &InputSnapshot::default(), &mut ctx);
        }
        session.hazards.clear();
        let hazard = falling_hazard_at(&session, session.player());
        session.hazards.push(hazard);
        session.tick(SIM_DT, &kick, &mut ctx);
        assert_eq!(session.score(), 530);
    }

    #[test]
    fn test_rising_hazard_is_harmless() {
        let store = PersistenceStore::in_memory();
        let mut pres = HeadlessPresentation::new();
        let mut ctx = SessionContext::new(&store, &mut pres);
        let mut session = DodgeballSession::new(Handoff::default(), 1, quiet());
        let pos = session.player();
        session.hazards.push(Hazard::new(1, pos, pos, 2200.0));

        assert_eq!(
            session.tick(SIM_DT, &InputSnapshot::default(), &mut ctx),
            TickStatus::Running
        );
    }

    #[test]
    fn test_hit_ends_run_and_records() {
        let store = with_profile();
        let mut pres = HeadlessPresentation::new();
        let mut ctx = SessionContext::new(&store, &mut pres);
        let mut session = DodgeballSession::new(Handoff::new(2, 40), 1, quiet());
        session.distance = 1500.0;
        let hazard = falling_hazard_at(&session, session.player());
        session.hazards.push(hazard);

        let status = session.tick(SIM_DT, &InputSnapshot::default(), &mut ctx);
        let TickStatus::Finished {
            outcome: SessionOutcome::Ended(summary),
            display_ms,
        } = status
        else {
            panic!("expected a loss, got {status:?}");
        };
        assert_eq!(display_ms, 800);
        assert_eq!(summary.cause, EndCause::Hit);
        assert_eq!(summary.level, 2);
        assert_eq!(summary.score, 40);
        assert_eq!(summary.distance_pct, Some(50));

        let scores = HighScores::new(&store);
        assert_eq!(scores.get(HighScoreKey::DodgeballLevel), 2);
        assert_eq!(scores.get(HighScoreKey::DodgeballScore), 40);
        let board = LeaderboardService::new(&store).entries(GameMode::Dodgeball);
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].level, Some(2));
    }

    #[test]
    fn test_ball_near_the_stands_is_ignored() {
        let store = PersistenceStore::in_memory();
        let mut pres = HeadlessPresentation::new();
        let mut ctx = SessionContext::new(&store, &mut pres);
        let mut session = DodgeballSession::new(Handoff::default(), 1, quiet());
        session.player.y = FIELD_TOP + PLAYER_HALF_H;
        let pos = Vec2::new(session.player.x, FIELD_TOP + 2.0);
        let hazard = falling_hazard_at(&session, pos);
        session.hazards.push(hazard);

        assert_eq!(
            session.tick(SIM_DT, &InputSnapshot::default(), &mut ctx),
            TickStatus::Running
        );
    }

    #[test]
    fn test_hit_and_finish_in_one_tick_latch_once() {
        let store = with_profile();
        let mut pres = HeadlessPresentation::new();
        let mut ctx = SessionContext::new(&store, &mut pres);
        let mut session = DodgeballSession::new(Handoff::default(), 1, quiet());
        session.distance = 2999.0;
        let hazard = falling_hazard_at(&session, session.player());
        session.hazards.push(hazard);

        let status = session.tick(SIM_DT, &InputSnapshot::default(), &mut ctx);
        assert!(matches!(
            status,
            TickStatus::Finished {
                outcome: SessionOutcome::Ended(_),
                ..
            }
        ));
        assert_eq!(session.tick(SIM_DT, &InputSnapshot::default(), &mut ctx), TickStatus::Done);
        assert_eq!(LeaderboardService::new(&store).entries(GameMode::Dodgeball).len(), 1);
        assert_eq!(pres.count_sound(SoundCue::Hit), 1);
        assert_eq!(pres.count_sound(SoundCue::LevelUp), 0);
    }

    #[test]
    fn test_waves_spawn_staggered() {
        let store = PersistenceStore::in_memory();
        let mut pres = HeadlessPresentation::new();
        let mut ctx = SessionContext::new(&store, &mut pres);
        // level 4: 1100 ms interval, 3 balls per wave
        let mut session = DodgeballSession::new(Handoff::new(4, 0), 7, DodgeballTuning::default());
        let idle = InputSnapshot::default();

        for _ in 0..60 {
            session.tick(SIM_DT, &idle, &mut ctx);
        }
        assert!(session.hazards().is_empty());

        for _ in 60..78 {
            session.tick(SIM_DT, &idle, &mut ctx);
        }
        assert_eq!(session.hazards().len(), 3);
        assert!(session.hazards().iter().all(|h| !h.is_collidable()));
        for h in session.hazards() {
            assert!(h.spawn.y == FIELD_TOP - 8.0 || h.spawn.y == FIELD_BOT + 8.0);
            assert!(h.target.y >= 80.0 && h.target.y <= 420.0);
        }
        assert_eq!(pres.count_sound(SoundCue::Whoosh), 3);
    }

    #[test]
    fn test_hazard_arc_phases() {
        let tuning = DodgeballTuning::default();
        let spawn = Vec2::new(100.0, 52.0);
        let target = Vec2::new(200.0, 250.0);
        let mut hazard = Hazard::new(1, spawn, target, 2000.0);

        assert_eq!(hazard.phase(&tuning), HazardPhase::Rising);
        hazard.advance(0.5, 10.0, &tuning);
        assert!(hazard.scale > 0.6 && hazard.scale < 1.3);
        assert!(hazard.pos.y > spawn.y && hazard.pos.y < target.y);

        hazard.advance(0.6, 10.0, &tuning);
        assert_eq!(hazard.phase(&tuning), HazardPhase::Falling);
        assert!(hazard.is_collidable());
        assert_eq!(hazard.pos, target);

        assert!(hazard.advance(1.0, 10.0, &tuning));
        assert_eq!(hazard.phase(&tuning), HazardPhase::Rolling);
        assert_eq!(hazard.scale, 1.0);
        // rolls along the launch heading
        assert!(hazard.pos.y > target.y);

        hazard.advance(1.5, 10.0, &tuning);
        assert_eq!(hazard.phase(&tuning), HazardPhase::Fading);
        assert!(hazard.opacity(&tuning) < 1.0);
        hazard.advance(1.0, 10.0, &tuning);
        assert_eq!(hazard.phase(&tuning), HazardPhase::Gone);
    }
}
