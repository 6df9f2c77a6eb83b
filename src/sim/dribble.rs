//! Dribble mode
//!
//! Single-screen pitch. The player carries the ball past `level` defenders
//! and scores into the right-hand goal. Holding action charges a shot; a skill
//! move jukes sideways and fakes out anyone close by.

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
use crate::tuning::DribbleTuning;
use crate::{distance, heading};

/// Playable area (player center is kept a body's half-extent inside)
pub const FIELD_BOUNDS: Rect = Rect {
    min: Vec2::new(20.0, FIELD_TOP + 8.0),
    max: Vec2::new(GAME_W - 20.0, FIELD_BOT - 8.0),
};
/// Goal zone at the right edge, 30x120
pub const GOAL_ZONE: Rect = Rect {
    min: Vec2::new(GAME_W - 35.0, GAME_H / 2.0 - 60.0),
    max: Vec2::new(GAME_W - 5.0, GAME_H / 2.0 + 60.0),
};
/// Shots aim at the goal line between the posts
const AIM_X: f32 = GAME_W - 20.0;
const AIM_TOP: f32 = GAME_H / 2.0 - 52.0;
const AIM_BOT: f32 = GAME_H / 2.0 + 52.0;

pub const PLAYER_START: Vec2 = Vec2::new(60.0, GAME_H / 2.0);
pub const KEEPER_START: Vec2 = Vec2::new(GAME_W - 50.0, GAME_H / 2.0);
const MAX_STAMINA: f32 = 100.0;
const MAX_POWER: f32 = 100.0;
/// Speed below which the player counts as standing still for a juke
const STILL_SPEED: f32 = 10.0;
/// Defenders stop walking home this close to their spot
const HOME_TOLERANCE: f32 = 5.0;
/// Keeper stops diving this close to the target
const DIVE_TOLERANCE: f32 = 4.0;
/// Ball bob phase rate (radians per ms)
const DRIBBLE_BOB_RATE: f32 = 0.008;

const TACKLE_DISPLAY_MS: u32 = 800;
const SHOT_FAILED_DISPLAY_MS: u32 = 1200;
const GOAL_DISPLAY_MS: u32 = 2000;

/// An outfield defender
#[derive(Debug, Clone)]
pub struct Defender {
    pub pos: Vec2,
    pub vel: Vec2,
    pub home: Vec2,
    pub stunned: bool,
    /// Bumped on every stun so stale recoveries are ignored
    stun_token: u32,
}

/// The goalkeeper
#[derive(Debug, Clone)]
pub struct Keeper {
    pub pos: Vec2,
    pub vel: Vec2,
    pub stunned: bool,
    stun_token: u32,
    /// Vertical target picked once per shot
    dive_target: Option<f32>,
}

#[derive(Debug, Clone, Copy)]
enum DribbleEvent {
    DefenderRecovers { index: usize, token: u32 },
    KeeperRecovers { token: u32 },
    ShotExpired,
}

/// One dribble level
#[derive(Debug)]
pub struct DribbleSession {
    tuning: DribbleTuning,
    rng: Pcg32,
    level: u32,
    score: u64,
    player: Vec2,
    player_vel: Vec2,
    stamina: f32,
    sprinting: bool,
    ball: Vec2,
    ball_vel: Vec2,
    bob_phase: f32,
    possession: bool,
    shot_in_flight: bool,
    charging: bool,
    power: f32,
    skill_cooldown_ms: f32,
    skill_timer_ms: f32,
    juke: Vec2,
    defenders: Vec<Defender>,
    keeper: Keeper,
    timers: TimerQueue<DribbleEvent>,
    latch: TerminalLatch,
    started: bool,
}

impl DribbleSession {
    pub fn new(handoff: Handoff, seed: u64, tuning: DribbleTuning) -> Self {
        let level = handoff.level.max(1);
        let mut rng = session_rng(seed);

        let count = tuning.defender_count(level);
        let spacing = FIELD_H / (count + 1) as f32;
        let defenders = (0..count)
            .map(|i| {
                let home = Vec2::new(
                    200.0 + rng.random::<f32>() * (GAME_W - 350.0),
                    FIELD_TOP + spacing * (i + 1) as f32,
                );
                Defender {
                    pos: home,
                    vel: Vec2::ZERO,
                    home,
                    stunned: false,
                    stun_token: 0,
                }
            })
            .collect();

        log::info!("Dribble level {} with {} defenders", level, count);
        let mut session = Self {
            tuning,
            rng,
            level,
            score: handoff.score,
            player: PLAYER_START,
            player_vel: Vec2::ZERO,
            stamina: MAX_STAMINA,
            sprinting: false,
            ball: PLAYER_START,
            ball_vel: Vec2::ZERO,
            bob_phase: 0.0,
            possession: true,
            shot_in_flight: false,
            charging: false,
            power: 0.0,
            skill_cooldown_ms: 0.0,
            skill_timer_ms: 0.0,
            juke: Vec2::ZERO,
            defenders,
            keeper: Keeper {
                pos: KEEPER_START,
                vel: Vec2::ZERO,
                stunned: false,
                stun_token: 0,
                dive_target: None,
            },
            timers: TimerQueue::new(),
            latch: TerminalLatch::default(),
            started: false,
        };
        session.carry_ball(0.0, 1.0);
        session
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

    pub fn ball(&self) -> Vec2 {
        self.ball
    }

    pub fn stamina(&self) -> f32 {
        self.stamina
    }

    pub fn is_sprinting(&self) -> bool {
        self.sprinting
    }

    pub fn has_possession(&self) -> bool {
        self.possession
    }

    pub fn shot_in_flight(&self) -> bool {
        self.shot_in_flight
    }

    /// Charged shot power while action is held (0-100)
    pub fn power(&self) -> f32 {
        if self.charging { self.power } else { 0.0 }
    }

    /// Where a shot fired now would be aimed
    pub fn aim_point(&self) -> Vec2 {
        Vec2::new(AIM_X, self.player.y.clamp(AIM_TOP, AIM_BOT))
    }

    pub fn skill_active(&self) -> bool {
        self.skill_timer_ms > 0.0
    }

    /// Skill cooldown remaining as a fraction (1 = just used)
    pub fn skill_cooldown(&self) -> f32 {
        (self.skill_cooldown_ms / self.tuning.skill_cooldown_ms).clamp(0.0, 1.0)
    }

    pub fn defenders(&self) -> &[Defender] {
        &self.defenders
    }

    pub fn keeper(&self) -> &Keeper {
        &self.keeper
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

        for event in self.timers.advance(dt_ms) {
            match event {
                DribbleEvent::DefenderRecovers { index, token } => {
                    if let Some(d) = self.defenders.get_mut(index) {
                        if d.stun_token == token {
                            d.stunned = false;
                            d.vel = Vec2::ZERO;
                        }
                    }
                }
                DribbleEvent::KeeperRecovers { token } => {
                    if self.keeper.stun_token == token {
                        self.keeper.stunned = false;
                        self.keeper.vel = Vec2::ZERO;
                    }
                }
                DribbleEvent::ShotExpired => {
                    if self.shot_in_flight {
                        return self.lose(EndCause::Missed, ctx);
                    }
                }
            }
        }

        self.move_player(dt, input);

        self.skill_cooldown_ms = (self.skill_cooldown_ms - dt_ms).max(0.0);
        self.skill_timer_ms = (self.skill_timer_ms - dt_ms).max(0.0);
        if input.special_just_pressed {
            self.perform_skill(input, ctx);
        }

        // burst sideways for the first part of the juke
        let burst_left = self.tuning.skill_duration_ms - self.tuning.skill_burst_ms;
        if self.skill_timer_ms > burst_left {
            self.player_vel = self.juke * self.tuning.skill_burst_speed;
        }
        let half = Vec2::new(PLAYER_HALF_W, PLAYER_HALF_H);
        let reach = Rect::new(FIELD_BOUNDS.min + half, FIELD_BOUNDS.max - half);
        self.player = reach.clamp(self.player + self.player_vel * dt);

        if self.possession && !self.shot_in_flight {
            if input.action_held {
                if !self.charging {
                    self.charging = true;
                    self.power = 0.0;
                }
                self.power = (self.power + self.tuning.charge_rate * dt).min(MAX_POWER);
            } else if self.charging {
                self.shoot(ctx);
            }
        }

        if self.possession {
            let facing = if self.player_vel.x >= 0.0 { 1.0 } else { -1.0 };
            self.carry_ball(dt_ms, facing);
        } else {
            self.ball += self.ball_vel * dt;
        }

        self.update_defenders(dt);
        self.update_keeper(dt);

        self.resolve_contacts(ctx)
    }

    fn move_player(&mut self, dt: f32, input: &InputSnapshot) {
        let steer = input.movement.clamp(Vec2::splat(-1.0), Vec2::splat(1.0));
        let moving = steer != Vec2::ZERO;
        self.sprinting = input.sprint_held && moving && self.stamina > 0.0;

        if self.sprinting {
            self.stamina = (self.stamina - self.tuning.stamina_drain * dt).max(0.0);
        } else {
            self.stamina = (self.stamina + self.tuning.stamina_regen * dt).min(MAX_STAMINA);
        }

        let speed = if self.sprinting {
            PLAYER_SPEED * self.tuning.sprint_factor
        } else {
            PLAYER_SPEED
        };
        let mut vel = steer * speed;
        if vel.x != 0.0 && vel.y != 0.0 {
            vel *= 0.707;
        }
        self.player_vel = vel;
    }

    /// Keep the ball at the player's feet with a small bob
    fn carry_ball(&mut self, dt_ms: f32, facing: f32) {
        self.bob_phase += dt_ms * DRIBBLE_BOB_RATE;
        let bob = Vec2::new(self.bob_phase.sin() * 3.0, (self.bob_phase * 1.5).cos() * 2.0);
        self.ball = self.player + Vec2::new(facing * 14.0, 6.0) + bob;
    }

    fn shoot(&mut self, ctx: &mut SessionContext<'_>) {
        let power = self.power;
        self.possession = false;
        self.shot_in_flight = true;
        self.charging = false;
        self.power = 0.0;

        let speed = self.tuning.shot_speed(power);
        self.ball_vel = heading(self.ball, self.aim_point()) * speed;
        self.timers
            .schedule(self.tuning.shot_timeout_ms, DribbleEvent::ShotExpired);
        ctx.presentation.play_sound(SoundCue::Kick);
        log::debug!("Shot at power {:.0} ({:.0} px/s)", power, speed);
    }

    fn perform_skill(&mut self, input: &InputSnapshot, ctx: &mut SessionContext<'_>) {
        if !self.possession || self.skill_cooldown_ms > 0.0 {
            return;
        }

        ctx.presentation.play_sound(SoundCue::Skill);
        self.skill_cooldown_ms = self.tuning.skill_cooldown_ms;
        self.skill_timer_ms = self.tuning.skill_duration_ms;

        // juke perpendicular to the run, upward when standing still
        let vel = self.player_vel;
        let juke = if vel.x.abs() > STILL_SPEED || vel.y.abs() > STILL_SPEED {
            let side = Vec2::new(-vel.y, vel.x);
            if input.movement.y > 0.0 { -side } else { side }
        } else {
            Vec2::new(0.0, -1.0)
        };
        self.juke = juke.normalize_or(Vec2::new(0.0, -1.0));

        let range = self.tuning.stun_range;
        let points = self.tuning.skill_points * self.level as u64;
        for (index, d) in self.defenders.iter_mut().enumerate() {
            if distance(self.player, d.pos) >= range {
                continue;
            }
            d.stunned = true;
            d.stun_token += 1;
            d.vel = -self.juke * self.tuning.defender_nudge;
            self.timers.schedule(
                self.tuning.defender_stun_ms,
                DribbleEvent::DefenderRecovers {
                    index,
                    token: d.stun_token,
                },
            );

            self.score += points;
            ctx.presentation
                .spawn_visual(VisualKind::ScorePopup { points }, d.pos);
            ctx.presentation.play_sound(SoundCue::Points);
        }

        if distance(self.player, self.keeper.pos) < range {
            self.keeper.stunned = true;
            self.keeper.stun_token += 1;
            self.keeper.vel = -self.juke * self.tuning.keeper_nudge;
            self.timers.schedule(
                self.tuning.keeper_stun_ms,
                DribbleEvent::KeeperRecovers {
                    token: self.keeper.stun_token,
                },
            );
        }

        for _ in 0..4 {
            ctx.presentation.spawn_visual(VisualKind::StarBurst, self.player);
        }
    }

    fn update_defenders(&mut self, dt: f32) {
        let speed = self.tuning.defender_speed(self.level);
        let chase_range = self.tuning.chase_range(self.level);
        let home_speed = speed * self.tuning.home_speed_factor;

        for d in &mut self.defenders {
            if !d.stunned {
                d.vel = if distance(d.pos, self.player) < chase_range {
                    heading(d.pos, self.player) * speed
                } else if distance(d.pos, d.home) > HOME_TOLERANCE {
                    heading(d.pos, d.home) * home_speed
                } else {
                    Vec2::ZERO
                };
            }
            d.pos += d.vel * dt;
        }
    }

    fn update_keeper(&mut self, dt: f32) {
        let keeper = &mut self.keeper;
        if !keeper.stunned {
            keeper.vel = Vec2::ZERO;
            if self.shot_in_flight {
                let jitter = self.tuning.keeper_dive_jitter;
                let ball_y = self.ball.y;
                let rng = &mut self.rng;
                let target = *keeper
                    .dive_target
                    .get_or_insert_with(|| ball_y + rng.random_range(-jitter..=jitter));
                let diff = target - keeper.pos.y;
                if diff.abs() > DIVE_TOLERANCE {
                    keeper.vel.y = diff.signum() * self.tuning.keeper_dive_speed(self.level);
                }
            } else {
                keeper.dive_target = None;
            }
        }
        keeper.pos = FIELD_BOUNDS.clamp(keeper.pos + keeper.vel * dt);
    }

    fn resolve_contacts(&mut self, ctx: &mut SessionContext<'_>) -> TickStatus {
        let body = Rect::body(self.player);
        let keeper_body = Rect::body(self.keeper.pos);

        if self.possession && !self.skill_active() {
            let tackled = keeper_body.overlaps(&body)
                || self
                    .defenders
                    .iter()
                    .any(|d| Rect::body(d.pos).overlaps(&body));
            if tackled {
                return self.lose(EndCause::Tackled, ctx);
            }
        }

        if circle_rect_overlap(self.ball, BALL_RADIUS, &GOAL_ZONE) {
            return self.win(ctx);
        }

        if self.shot_in_flight {
            let blocked = self
                .defenders
                .iter()
                .any(|d| circle_rect_overlap(self.ball, BALL_RADIUS, &Rect::body(d.pos)));
            if blocked {
                return self.lose(EndCause::Blocked, ctx);
            }
            if circle_rect_overlap(self.ball, BALL_RADIUS, &keeper_body) {
                return self.lose(EndCause::Saved, ctx);
            }
        }

        TickStatus::Running
    }

    fn lose(&mut self, cause: EndCause, ctx: &mut SessionContext<'_>) -> TickStatus {
        if !self.latch.fire() {
            return TickStatus::Done;
        }
        self.shot_in_flight = false;
        self.ball_vel = Vec2::ZERO;

        let (banner, display_ms) = match cause {
            EndCause::Tackled => {
                ctx.presentation.play_sound(SoundCue::Tackle);
                ctx.presentation.spawn_visual(VisualKind::HitBurst, self.player);
                ctx.presentation.camera_shake(0.02, 300);
                (Banner::Tackled, TACKLE_DISPLAY_MS)
            }
            EndCause::Blocked => {
                ctx.presentation.play_sound(SoundCue::Tackle);
                ctx.presentation.spawn_visual(VisualKind::HitBurst, self.ball);
                ctx.presentation.camera_shake(0.01, 150);
                (Banner::Blocked, SHOT_FAILED_DISPLAY_MS)
            }
            EndCause::Saved => {
                ctx.presentation.play_sound(SoundCue::Tackle);
                ctx.presentation.spawn_visual(VisualKind::HitBurst, self.keeper.pos);
                ctx.presentation.camera_shake(0.015, 200);
                (Banner::Saved, SHOT_FAILED_DISPLAY_MS)
            }
            _ => {
                ctx.presentation.play_sound(SoundCue::Hit);
                (Banner::Missed, SHOT_FAILED_DISPLAY_MS)
            }
        };
        let center = Vec2::new(GAME_W / 2.0, GAME_H / 2.0);
        ctx.presentation.spawn_visual(VisualKind::Banner(banner), center);

        HighScores::new(ctx.store).submit(HighScoreKey::DribbleLevel, self.level as u64);
        LeaderboardService::new(ctx.store).add_entry(
            GameMode::Dribble,
            ScoreCandidate::with_level(self.score, self.level),
        );
        log::info!(
            "Dribble run over ({:?}) at level {}, score {}",
            cause,
            self.level,
            self.score
        );

        TickStatus::Finished {
            outcome: SessionOutcome::Ended(GameSummary {
                mode: GameMode::Dribble,
                level: self.level,
                score: self.score,
                distance_pct: None,
                result: None,
                cause,
            }),
            display_ms,
        }
    }

    fn win(&mut self, ctx: &mut SessionContext<'_>) -> TickStatus {
        if !self.latch.fire() {
            return TickStatus::Done;
        }
        self.shot_in_flight = false;
        self.ball_vel = Vec2::ZERO;

        let points = self.tuning.goal_points * self.level as u64;
        self.score += points;

        let center = Vec2::new(GAME_W / 2.0, GAME_H / 2.0);
        ctx.presentation.play_sound(SoundCue::Goal);
        ctx.presentation
            .spawn_visual(VisualKind::Banner(Banner::Goal), center);
        ctx.presentation
            .spawn_visual(VisualKind::ScorePopup { points }, center);
        for _ in 0..8 {
            ctx.presentation.spawn_visual(VisualKind::StarBurst, GOAL_ZONE.center());
        }

        HighScores::new(ctx.store).submit(HighScoreKey::DribbleLevel, self.level as u64);
        log::info!("Dribble goal on level {}, score {}", self.level, self.score);

        TickStatus::Finished {
            outcome: SessionOutcome::Advance(Handoff::new(self.level + 1, self.score)),
            display_ms: GOAL_DISPLAY_MS,
        }
    }
}
