//! Penalty shootout
//!
//! Five rounds against the CPU. Each round the player first takes a kick
//! (aim the reticle, hold to charge, release to strike) and then keeps goal
//! against the CPU's kick by picking a dive zone before it shoots.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::collision::Rect;
use super::state::{
    EndCause, GameSummary, MatchResult, SessionContext, SessionOutcome, TerminalLatch, TickStatus,
    session_rng,
};
use super::tick::InputSnapshot;
use super::timers::TimerQueue;
use crate::consts::GAME_W;
use crate::distance;
use crate::highscores::{HighScoreKey, HighScores};
use crate::leaderboard::{GameMode, LeaderboardService, ScoreCandidate};
use crate::presentation::{Banner, SoundCue, VisualKind};
use crate::tuning::PenaltyTuning;

/// Goal mouth as seen from the spot
pub const GOAL: Rect = Rect {
    min: Vec2::new(300.0, 60.0),
    max: Vec2::new(500.0, 130.0),
};
/// Reticle stays this far inside the posts
const AIM_MARGIN: f32 = 10.0;
/// Keeper dive box (whole pixels)
const DIVE_X: (i32, i32) = (320, 480);
const DIVE_Y: (i32, i32) = (70, 120);
/// Stick deflection that counts as a dive input
const DIVE_THRESHOLD: f32 = 0.5;
/// CPU kick flight before the verdict shows
const SAVE_FLIGHT_MS: f32 = 1200.0;
const MAX_POWER: f32 = 100.0;

/// Where the keeper (player or CPU) commits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiveZone {
    Left,
    Center,
    Right,
}

impl DiveZone {
    pub const ALL: [DiveZone; 3] = [DiveZone::Left, DiveZone::Center, DiveZone::Right];

    /// Zone for a fresh stick deflection (left, down = center, right)
    fn from_edge(prev: Vec2, now: Vec2) -> Option<Self> {
        if now.x < -DIVE_THRESHOLD && prev.x >= -DIVE_THRESHOLD {
            Some(DiveZone::Left)
        } else if now.x > DIVE_THRESHOLD && prev.x <= DIVE_THRESHOLD {
            Some(DiveZone::Right)
        } else if now.y > DIVE_THRESHOLD && prev.y <= DIVE_THRESHOLD {
            Some(DiveZone::Center)
        } else {
            None
        }
    }

    /// Screen position for effects
    fn anchor(&self) -> Vec2 {
        let y = GOAL.center().y;
        match self {
            DiveZone::Left => Vec2::new(GOAL.min.x + 40.0, y),
            DiveZone::Center => Vec2::new(GOAL.center().x, y),
            DiveZone::Right => Vec2::new(GOAL.max.x - 40.0, y),
        }
    }
}

/// How the player's kick ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KickVerdict {
    Goal,
    Saved,
    Missed,
}

/// Player kick, for the results overlay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KickReport {
    pub power: f32,
    /// Where the ball ended up after aim error
    pub target: Vec2,
    /// Where the CPU keeper dove (none on a miss)
    pub keeper: Option<Vec2>,
    pub verdict: KickVerdict,
    pub points: u64,
}

/// CPU kick against the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveReport {
    pub cpu_side: DiveZone,
    pub dive: DiveZone,
}

impl SaveReport {
    pub fn saved(&self) -> bool {
        self.cpu_side == self.dive
    }
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Shoot {
        aim: Vec2,
        charging: bool,
        power: f32,
    },
    Save {
        cpu_side: DiveZone,
        choice: Option<DiveZone>,
    },
}

impl Phase {
    fn shoot() -> Self {
        Phase::Shoot {
            aim: GOAL.center(),
            charging: false,
            power: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum PenaltyEvent {
    CpuShoots,
}

/// Decide a kick that landed at `target` with the keeper at `keeper`
fn judge(target: Vec2, keeper: Vec2, save_radius: f32) -> KickVerdict {
    if !GOAL.contains(target) {
        KickVerdict::Missed
    } else if distance(target, keeper) < save_radius {
        KickVerdict::Saved
    } else {
        KickVerdict::Goal
    }
}

/// One shootout
#[derive(Debug)]
pub struct PenaltySession {
    tuning: PenaltyTuning,
    rng: Pcg32,
    round: u32,
    score: u64,
    player_goals: u32,
    cpu_goals: u32,
    kicks_taken: u32,
    saves_faced: u32,
    phase: Phase,
    prev_movement: Vec2,
    last_kick: Option<KickReport>,
    last_save: Option<SaveReport>,
    timers: TimerQueue<PenaltyEvent>,
    latch: TerminalLatch,
    started: bool,
}

impl PenaltySession {
    pub fn new(seed: u64, tuning: PenaltyTuning) -> Self {
        log::info!("Penalty shootout, {} rounds", tuning.rounds);
        Self {
            tuning,
            rng: session_rng(seed),
            round: 1,
            score: 0,
            player_goals: 0,
            cpu_goals: 0,
            kicks_taken: 0,
            saves_faced: 0,
            phase: Phase::shoot(),
            prev_movement: Vec2::ZERO,
            last_kick: None,
            last_save: None,
            timers: TimerQueue::new(),
            latch: TerminalLatch::default(),
            started: false,
        }
    }

    /// Current round, 1-based
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn rounds(&self) -> u32 {
        self.tuning.rounds
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn player_goals(&self) -> u32 {
        self.player_goals
    }

    pub fn cpu_goals(&self) -> u32 {
        self.cpu_goals
    }

    pub fn kicks_taken(&self) -> u32 {
        self.kicks_taken
    }

    pub fn saves_faced(&self) -> u32 {
        self.saves_faced
    }

    pub fn is_shooting(&self) -> bool {
        matches!(self.phase, Phase::Shoot { .. })
    }

    /// Reticle position during the shoot phase
    pub fn aim(&self) -> Option<Vec2> {
        match self.phase {
            Phase::Shoot { aim, .. } => Some(aim),
            Phase::Save { .. } => None,
        }
    }

    pub fn power(&self) -> f32 {
        match self.phase {
            Phase::Shoot { power, .. } => power,
            Phase::Save { .. } => 0.0,
        }
    }

    /// Dive the player has locked in during the save phase
    pub fn dive_choice(&self) -> Option<DiveZone> {
        match self.phase {
            Phase::Save { choice, .. } => choice,
            Phase::Shoot { .. } => None,
        }
    }

    pub fn last_kick(&self) -> Option<&KickReport> {
        self.last_kick.as_ref()
    }

    pub fn last_save(&self) -> Option<&SaveReport> {
        self.last_save.as_ref()
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
                .spawn_visual(VisualKind::Banner(Banner::LevelStart), GOAL.center());
        }

        // dive input counts even on the tick the CPU kicks
        let prev = std::mem::replace(&mut self.prev_movement, input.movement);
        if let Phase::Save { choice, .. } = &mut self.phase {
            if choice.is_none() {
                if let Some(zone) = DiveZone::from_edge(prev, input.movement) {
                    *choice = Some(zone);
                    ctx.presentation.play_sound(SoundCue::Select);
                    log::debug!("Dive locked: {:?}", zone);
                }
            }
        }

        for event in self.timers.advance(dt * 1000.0) {
            match event {
                PenaltyEvent::CpuShoots => {
                    if matches!(self.phase, Phase::Save { .. }) {
                        return self.cpu_kick(ctx);
                    }
                }
            }
        }

        let mut release = false;
        if let Phase::Shoot {
            aim,
            charging,
            power,
        } = &mut self.phase
        {
            let bounds = GOAL.inset(AIM_MARGIN);
            *aim = bounds.clamp(*aim + input.movement * self.tuning.aim_speed * dt);

            if input.action_held {
                *charging = true;
                *power = (*power + self.tuning.charge_rate * dt).min(MAX_POWER);
            } else if *charging {
                release = true;
            }
        }

        if release {
            return self.player_kick(ctx);
        }
        TickStatus::Running
    }

    fn player_kick(&mut self, ctx: &mut SessionContext<'_>) -> TickStatus {
        let Phase::Shoot { aim, power, .. } = self.phase else {
            return TickStatus::Running;
        };

        let scale = self.tuning.error_scale(power);
        let offset = Vec2::new(
            (self.rng.random::<f32>() - 0.5) * scale * 2.0,
            (self.rng.random::<f32>() - 0.5) * scale * 2.0,
        );
        let target = aim + offset;
        let flight_ms = self.tuning.flight_ms(power);
        self.kicks_taken += 1;
        ctx.presentation.play_sound(SoundCue::Kick);

        let keeper = GOAL.contains(target).then(|| {
            Vec2::new(
                self.rng.random_range(DIVE_X.0..=DIVE_X.1) as f32,
                self.rng.random_range(DIVE_Y.0..=DIVE_Y.1) as f32,
            )
        });
        let verdict = match keeper {
            Some(keeper) => judge(target, keeper, self.tuning.save_radius),
            None => KickVerdict::Missed,
        };

        let mut points = 0;
        let hold_ms = match verdict {
            KickVerdict::Goal => {
                points = (self.tuning.power_points_factor * power).floor() as u64;
                self.player_goals += 1;
                self.score += points;
                ctx.presentation.play_sound(SoundCue::Goal);
                ctx.presentation
                    .spawn_visual(VisualKind::Banner(Banner::Goal), target);
                ctx.presentation
                    .spawn_visual(VisualKind::ScorePopup { points }, target);
                ctx.presentation.spawn_visual(VisualKind::StarBurst, target);
                flight_ms + self.tuning.verdict_delay_ms + self.tuning.result_display_ms
            }
            KickVerdict::Saved => {
                ctx.presentation.play_sound(SoundCue::Hit);
                ctx.presentation
                    .spawn_visual(VisualKind::Banner(Banner::Saved), target);
                flight_ms + self.tuning.verdict_delay_ms + self.tuning.result_display_ms
            }
            KickVerdict::Missed => {
                ctx.presentation.play_sound(SoundCue::Whoosh);
                ctx.presentation
                    .spawn_visual(VisualKind::Banner(Banner::Missed), target);
                flight_ms + self.tuning.result_display_ms
            }
        };
        log::debug!(
            "Round {} kick: power {:.0}, {:?} at ({:.0}, {:.0})",
            self.round,
            power,
            verdict,
            target.x,
            target.y
        );

        self.last_kick = Some(KickReport {
            power,
            target,
            keeper,
            verdict,
            points,
        });

        let cpu_side = DiveZone::ALL[self.rng.random_range(0..DiveZone::ALL.len())];
        self.phase = Phase::Save {
            cpu_side,
            choice: None,
        };
        self.timers
            .schedule(self.tuning.shot_delay_ms, PenaltyEvent::CpuShoots);

        TickStatus::Hold(hold_ms.round() as u32)
    }

    fn cpu_kick(&mut self, ctx: &mut SessionContext<'_>) -> TickStatus {
        let Phase::Save { cpu_side, choice } = self.phase else {
            return TickStatus::Running;
        };
        let report = SaveReport {
            cpu_side,
            dive: choice.unwrap_or(DiveZone::Center),
        };
        self.saves_faced += 1;
        self.last_save = Some(report);

        let spot = cpu_side.anchor();
        ctx.presentation.play_sound(SoundCue::Kick);
        if report.saved() {
            let points = self.tuning.save_bonus;
            self.score += points;
            ctx.presentation.play_sound(SoundCue::Points);
            ctx.presentation
                .spawn_visual(VisualKind::Banner(Banner::Saved), spot);
            ctx.presentation
                .spawn_visual(VisualKind::ScorePopup { points }, spot);
        } else {
            self.cpu_goals += 1;
            ctx.presentation.camera_shake(0.01, 200);
            ctx.presentation
                .spawn_visual(VisualKind::Banner(Banner::GoalConceded), spot);
        }
        log::debug!(
            "Round {} save: CPU {:?}, dive {:?}",
            self.round,
            report.cpu_side,
            report.dive
        );

        let hold_ms = (SAVE_FLIGHT_MS + self.tuning.result_display_ms).round() as u32;
        if self.round >= self.tuning.rounds {
            return self.finish(hold_ms, ctx);
        }
        self.round += 1;
        self.phase = Phase::shoot();
        TickStatus::Hold(hold_ms)
    }

    fn finish(&mut self, display_ms: u32, ctx: &mut SessionContext<'_>) -> TickStatus {
        if !self.latch.fire() {
            return TickStatus::Done;
        }

        let result = MatchResult::from_goals(self.player_goals, self.cpu_goals);
        let text = result.describe(self.player_goals, self.cpu_goals);
        let banner = match result {
            MatchResult::Win => Banner::ShootoutWon,
            MatchResult::Loss => Banner::ShootoutLost,
            MatchResult::Draw => Banner::ShootoutDrawn,
        };
        ctx.presentation
            .spawn_visual(VisualKind::Banner(banner), Vec2::new(GAME_W / 2.0, 250.0));
        if result == MatchResult::Win {
            ctx.presentation.play_sound(SoundCue::LevelUp);
        }

        HighScores::new(ctx.store).submit(HighScoreKey::PenaltyScore, self.score);
        LeaderboardService::new(ctx.store).add_entry(
            GameMode::Penalties,
            ScoreCandidate::with_result(self.score, text.clone()),
        );
        log::info!("Shootout over: {} (score {})", text, self.score);

        TickStatus::Finished {
            outcome: SessionOutcome::Ended(GameSummary {
                mode: GameMode::Penalties,
                level: self.round,
                score: self.score,
                distance_pct: None,
                result: Some(text),
                cause: EndCause::ShootoutOver,
            }),
            display_ms,
        }
    }
}
